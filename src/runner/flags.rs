// src/runner/flags.rs

use crate::config::options::{AllowFlags, AllowValue, ScriptOptions};

/// Turn script options into interpreter flags.
///
/// The order is fixed: permissions, then the valued flags (`--importmap`,
/// `--lock`, `--log-level`, `--config`, `--cert`), then the inspector
/// addresses, then the boolean switches. `env`, stdio and `watch` are
/// consumed by the spawner and never show up here.
///
/// ```
/// use denon::config::{AllowFlags, ScriptOptions};
/// use denon::runner::build_flags;
///
/// let options = ScriptOptions {
///     allow: Some(AllowFlags::List(vec!["read".into(), "net".into()])),
///     unstable: Some(true),
///     ..Default::default()
/// };
/// assert_eq!(build_flags(&options), ["--allow-read", "--allow-net", "--unstable"]);
/// ```
pub fn build_flags(options: &ScriptOptions) -> Vec<String> {
    let mut flags = Vec::new();

    match &options.allow {
        Some(AllowFlags::All) => flags.push("--allow-all".to_string()),
        Some(AllowFlags::List(names)) => {
            flags.extend(names.iter().map(|name| format!("--allow-{name}")));
        }
        Some(AllowFlags::Map(entries)) => {
            for (name, value) in entries {
                match value {
                    AllowValue::Bool(true) => flags.push(format!("--allow-{name}")),
                    AllowValue::Bool(false) => {}
                    AllowValue::Text(text) if text.is_empty() => {
                        flags.push(format!("--allow-{name}"))
                    }
                    other => flags.push(format!("--allow-{name}={other}")),
                }
            }
        }
        None => {}
    }

    push_valued(&mut flags, "--importmap", &options.importmap);
    push_valued(&mut flags, "--lock", &options.lock);
    push_valued(&mut flags, "--log-level", &options.log);
    push_valued(&mut flags, "--config", &options.tsconfig);
    push_valued(&mut flags, "--cert", &options.cert);

    if let Some(addr) = non_empty(&options.inspect) {
        flags.push(format!("--inspect={addr}"));
    }
    if let Some(addr) = non_empty(&options.inspect_brk) {
        flags.push(format!("--inspect-brk={addr}"));
    }

    if options.no_check == Some(true) {
        flags.push("--no-check".to_string());
    }
    if options.unstable == Some(true) {
        flags.push("--unstable".to_string());
    }

    flags
}

fn push_valued(flags: &mut Vec<String>, flag: &str, value: &Option<String>) {
    if let Some(value) = non_empty(value) {
        flags.push(flag.to_string());
        flags.push(value.to_string());
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
