// src/config/templates.rs

use std::fmt;
use std::str::FromStr;

/// Starter config written by `denon --init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub filename: &'static str,
    pub source: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFormat {
    Toml,
    Json,
    Yaml,
}

impl TemplateFormat {
    pub fn template(self) -> Template {
        match self {
            TemplateFormat::Toml => TOML,
            TemplateFormat::Json => JSON,
            TemplateFormat::Yaml => YAML,
        }
    }
}

impl FromStr for TemplateFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "toml" => Ok(TemplateFormat::Toml),
            "json" => Ok(TemplateFormat::Json),
            "yaml" | "yml" => Ok(TemplateFormat::Yaml),
            other => Err(format!("unknown template format \"{other}\" (expected toml, json or yaml)")),
        }
    }
}

impl fmt::Display for TemplateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TemplateFormat::Toml => "toml",
            TemplateFormat::Json => "json",
            TemplateFormat::Yaml => "yaml",
        };
        f.write_str(s)
    }
}

const TOML: Template = Template {
    filename: "denon.toml",
    source: r#"[scripts.start]
cmd = "deno run app.ts"
desc = "run my app.ts file"
"#,
};

const JSON: Template = Template {
    filename: "denon.json",
    source: r#"{
  "scripts": {
    "start": {
      "cmd": "deno run app.ts",
      "desc": "run my app.ts file"
    }
  }
}
"#,
};

const YAML: Template = Template {
    filename: "denon.yml",
    source: r#"scripts:
  start:
    cmd: "deno run app.ts"
    desc: "run my app.ts file"
"#,
};
