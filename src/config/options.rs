// src/config/options.rs

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

/// Per-script options. They can be declared at the top level of the config
/// (applied to every script) and inside script objects, where they win.
///
/// ```toml
/// allow = ["read", "net"]
///
/// [scripts.start]
/// cmd = "app.ts"
/// allow = "all"
/// unstable = true
/// ```
///
/// Every field is optional so that layers can be merged with
/// [`ScriptOptions::merged_with`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScriptOptions {
    /// Extra environment variables for the child process.
    #[serde(default)]
    pub env: Option<BTreeMap<String, String>>,

    /// `--allow-*` permission flags.
    #[serde(default)]
    pub allow: Option<AllowFlags>,

    #[serde(default)]
    pub importmap: Option<String>,

    #[serde(default)]
    pub lock: Option<String>,

    #[serde(default)]
    pub cert: Option<String>,

    /// Passed as `--log-level`.
    #[serde(default)]
    pub log: Option<String>,

    /// Passed as `--config`.
    #[serde(default)]
    pub tsconfig: Option<String>,

    #[serde(default)]
    pub inspect: Option<String>,

    #[serde(default, alias = "inspectBrk")]
    pub inspect_brk: Option<String>,

    #[serde(default)]
    pub unstable: Option<bool>,

    #[serde(default, alias = "noCheck")]
    pub no_check: Option<bool>,

    /// Restart on file changes. Defaults to `true`.
    #[serde(default)]
    pub watch: Option<bool>,

    #[serde(default)]
    pub stdin: Option<StdioPolicy>,

    #[serde(default)]
    pub stdout: Option<StdioPolicy>,

    #[serde(default)]
    pub stderr: Option<StdioPolicy>,
}

impl ScriptOptions {
    /// Effective `watch` toggle.
    pub fn watch_enabled(&self) -> bool {
        self.watch.unwrap_or(true)
    }

    pub fn stdin_policy(&self) -> StdioPolicy {
        self.stdin.unwrap_or_default()
    }

    pub fn stdout_policy(&self) -> StdioPolicy {
        self.stdout.unwrap_or_default()
    }

    pub fn stderr_policy(&self) -> StdioPolicy {
        self.stderr.unwrap_or_default()
    }
}

/// Permission flags, in one of three shapes:
///
/// - the literal `"all"` → `--allow-all`
/// - a list `["read", "net"]` → `--allow-read --allow-net`
/// - a map `{ read = "/tmp", net = true }` → `--allow-net --allow-read=/tmp`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawAllowFlags")]
pub enum AllowFlags {
    All,
    List(Vec<String>),
    Map(BTreeMap<String, AllowValue>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AllowValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl fmt::Display for AllowValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllowValue::Bool(b) => write!(f, "{b}"),
            AllowValue::Int(n) => write!(f, "{n}"),
            AllowValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAllowFlags {
    Word(String),
    List(Vec<String>),
    Map(BTreeMap<String, AllowValue>),
}

impl TryFrom<RawAllowFlags> for AllowFlags {
    type Error = String;

    fn try_from(raw: RawAllowFlags) -> Result<Self, Self::Error> {
        match raw {
            RawAllowFlags::Word(w) if w == "all" => Ok(AllowFlags::All),
            RawAllowFlags::Word(other) => Err(format!(
                "invalid allow value \"{other}\" (expected \"all\", a list or a map)"
            )),
            RawAllowFlags::List(list) => Ok(AllowFlags::List(list)),
            RawAllowFlags::Map(map) => Ok(AllowFlags::Map(map)),
        }
    }
}

/// What to connect a child's standard stream to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawStdioPolicy")]
pub enum StdioPolicy {
    #[default]
    Inherit,
    Piped,
    Null,
    /// An already-open file descriptor of this process.
    Fd(i32),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawStdioPolicy {
    Name(String),
    Fd(i32),
}

impl TryFrom<RawStdioPolicy> for StdioPolicy {
    type Error = String;

    fn try_from(raw: RawStdioPolicy) -> Result<Self, Self::Error> {
        match raw {
            RawStdioPolicy::Fd(fd) if fd >= 0 => Ok(StdioPolicy::Fd(fd)),
            RawStdioPolicy::Fd(fd) => Err(format!("invalid file descriptor {fd}")),
            RawStdioPolicy::Name(name) => match name.trim().to_lowercase().as_str() {
                "inherit" => Ok(StdioPolicy::Inherit),
                "piped" => Ok(StdioPolicy::Piped),
                "null" => Ok(StdioPolicy::Null),
                other => Err(format!(
                    "invalid stdio policy \"{other}\" (expected inherit, piped, null or a file descriptor)"
                )),
            },
        }
    }
}
