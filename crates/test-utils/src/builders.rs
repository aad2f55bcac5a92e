#![allow(dead_code)]

use std::path::PathBuf;

use denon::config::{
    AllowFlags, DenonConfig, Script, ScriptObject, ScriptOptions, ScriptStep, WatchConfig,
};

/// Builder for `DenonConfig` to simplify test setup.
pub struct ConfigBuilder {
    config: DenonConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: DenonConfig::default(),
        }
    }

    /// `name = "cmd"`
    pub fn with_command(mut self, name: &str, cmd: &str) -> Self {
        self.config
            .scripts
            .insert(name.to_string(), Script::Command(cmd.to_string()));
        self
    }

    pub fn with_object(mut self, name: &str, object: ScriptObject) -> Self {
        self.config
            .scripts
            .insert(name.to_string(), Script::Object(object));
        self
    }

    pub fn with_sequence(mut self, name: &str, steps: Vec<ScriptStep>) -> Self {
        self.config
            .scripts
            .insert(name.to_string(), Script::Sequence(steps));
        self
    }

    /// Top-level options applied to every script.
    pub fn with_global(mut self, options: ScriptOptions) -> Self {
        self.config.options = options;
        self
    }

    pub fn with_watcher(mut self, watcher: WatchConfig) -> Self {
        self.config.watcher = watcher;
        self
    }

    pub fn with_interpreter(mut self, interpreter: &str) -> Self {
        self.config.interpreter = interpreter.to_string();
        self
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.config_path = Some(path.into());
        self
    }

    pub fn build(self) -> DenonConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ScriptObject`.
pub struct ScriptBuilder {
    object: ScriptObject,
}

impl ScriptBuilder {
    pub fn new(cmd: &str) -> Self {
        Self {
            object: ScriptObject {
                cmd: cmd.to_string(),
                desc: None,
                options: ScriptOptions::default(),
            },
        }
    }

    pub fn desc(mut self, desc: &str) -> Self {
        self.object.desc = Some(desc.to_string());
        self
    }

    pub fn watch(mut self, val: bool) -> Self {
        self.object.options.watch = Some(val);
        self
    }

    pub fn allow_all(mut self) -> Self {
        self.object.options.allow = Some(AllowFlags::All);
        self
    }

    pub fn allow(mut self, names: &[&str]) -> Self {
        self.object.options.allow = Some(AllowFlags::List(
            names.iter().map(|n| n.to_string()).collect(),
        ));
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.object
            .options
            .env
            .get_or_insert_with(Default::default)
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn unstable(mut self, val: bool) -> Self {
        self.object.options.unstable = Some(val);
        self
    }

    pub fn options(mut self, options: ScriptOptions) -> Self {
        self.object.options = options;
        self
    }

    pub fn build(self) -> ScriptObject {
        self.object
    }
}
