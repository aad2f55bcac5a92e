// src/runner/builder.rs

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::config::model::{DenonConfig, Script, ScriptObject, ScriptStep};
use crate::config::options::ScriptOptions;
use crate::errors::{DenonError, Result};
use crate::runner::command::Command;
use crate::runner::flags::build_flags;

/// `<interpreter>` followed by an action word, e.g. the ` run app.ts` part of
/// `deno run app.ts`.
static ACTION_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ +(\w+) *(.*)$").expect("valid action regex"));

/// A runnable file on its own: `app.ts`, `'my app.ts'`, `my\ app.js`.
static RUNNABLE_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^'(?:\\'|.)*?\.(ts|js)'|^"(?:\\"|.)*?\.(ts|js)"|^(?:\\ |\S)+\.(ts|js)$"#,
    )
    .expect("valid runnable file regex")
});

/// A bare interpreter subcommand typed on the command line: `run app.ts`.
static BARE_SUBCOMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(run|test|fmt|lint) *(.*)$").expect("valid subcommand regex"));

/// Compiles scripts into [`Command`] sequences.
///
/// The runner is built from a [`DenonConfig`] and the raw positional CLI
/// arguments (`["start", "--port", "8080"]`): the first one is the script
/// name, the rest are appended to the last command of the script. When the
/// name does not resolve, the whole argument list is run as an ad-hoc
/// command line instead.
#[derive(Debug, Clone)]
pub struct Runner {
    scripts: BTreeMap<String, Script>,
    global: ScriptOptions,
    interpreter: String,
    args: Vec<String>,
}

impl Runner {
    pub fn new(config: &DenonConfig, args: Vec<String>) -> Self {
        let defaults = ScriptOptions {
            watch: Some(true),
            ..ScriptOptions::default()
        };

        Self {
            scripts: config.scripts.clone(),
            global: defaults.merged_with(&config.options),
            interpreter: config.interpreter.clone(),
            args,
        }
    }

    /// Names of all declared scripts, sorted.
    pub fn script_names(&self) -> impl Iterator<Item = &str> {
        self.scripts.keys().map(String::as_str)
    }

    pub fn script(&self, name: &str) -> Option<&Script> {
        self.scripts.get(name)
    }

    /// Compile `name` into the commands to run, in order. The last one is the
    /// long-lived main command.
    pub fn build(&self, name: &str) -> Result<Vec<Command>> {
        let Some(script) = self.scripts.get(name) else {
            if self.args.is_empty() {
                return Err(DenonError::config(format!(
                    "script `{name}` does not exist and no command line was provided"
                )));
            }
            let command = self.build_cli_command(&self.args);
            debug!(script = %name, cmd = %command, "built ad-hoc command from CLI arguments");
            return Ok(vec![command]);
        };

        let mut commands = match script {
            Script::Command(line) => self.compile_line(name, line, &self.global)?,
            Script::Object(object) => self.compile_object(name, object)?,
            Script::Sequence(steps) => {
                let mut commands = Vec::new();
                for step in steps {
                    let mut compiled = match step {
                        ScriptStep::Command(line) => self.compile_line(name, line, &self.global)?,
                        ScriptStep::Object(object) => self.compile_object(name, object)?,
                    };
                    commands.append(&mut compiled);
                }
                commands
            }
        };

        let Some(last) = commands.last_mut() else {
            return Err(DenonError::config(format!(
                "script `{name}` does not contain any command"
            )));
        };
        if let Some(trailing) = self.args.get(1..) {
            last.argv.extend(trailing.iter().cloned());
        }

        debug!(script = %name, count = commands.len(), "built script commands");
        Ok(commands)
    }

    fn compile_object(&self, name: &str, object: &ScriptObject) -> Result<Vec<Command>> {
        let options = self.global.merged_with(&object.options);
        self.compile_line(name, &object.cmd, &options)
    }

    /// `a && b` runs `a` then `b`; each part is assembled on its own.
    fn compile_line(&self, name: &str, line: &str, options: &ScriptOptions) -> Result<Vec<Command>> {
        line.split("&&")
            .map(|part| {
                let tokens = split_tokens(part);
                if tokens.is_empty() {
                    return Err(DenonError::config(format!(
                        "script `{name}` contains an empty command in `{}`",
                        line.trim()
                    )));
                }
                Ok(self.assemble(&tokens, options))
            })
            .collect()
    }

    fn assemble(&self, tokens: &[String], options: &ScriptOptions) -> Command {
        let line = tokens.join(" ");

        let argv = if let Some((action, rest)) = self.split_action(&line) {
            let mut argv = vec![self.interpreter.clone(), action.to_string()];
            argv.extend(build_flags(options));
            argv.extend(split_tokens(rest));
            argv
        } else if RUNNABLE_FILE.is_match(&line) {
            let mut argv = vec![self.interpreter.clone(), "run".to_string()];
            argv.extend(build_flags(options));
            argv.extend(tokens.iter().cloned());
            argv
        } else {
            tokens.to_vec()
        };

        Command::new(argv, options.clone())
    }

    fn split_action<'a>(&self, line: &'a str) -> Option<(&'a str, &'a str)> {
        let tail = line.strip_prefix(self.interpreter.as_str())?;
        let caps = ACTION_TAIL.captures(tail)?;
        let action = caps.get(1)?.as_str();
        let rest = caps.get(2).map_or("", |m| m.as_str());
        Some((action, rest))
    }

    fn build_cli_command(&self, args: &[String]) -> Command {
        let line = args.join(" ");
        let tokens = split_tokens(&line);

        let argv = if RUNNABLE_FILE.is_match(&line) {
            let mut argv = vec![self.interpreter.clone(), "run".to_string()];
            argv.extend(tokens);
            argv
        } else if BARE_SUBCOMMAND.is_match(&line) {
            let mut argv = vec![self.interpreter.clone()];
            argv.extend(tokens);
            argv
        } else {
            tokens
        };

        Command::new(argv, self.global.clone())
    }
}

fn split_tokens(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}
