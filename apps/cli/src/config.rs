//! Layered CLI configuration.
//!
//! Sources, lowest priority first: built-in defaults, the user config file
//! (`<config dir>/tagrule/tagrule.toml`), `./tagrule.toml`, an explicit
//! `--config` file, `TAGRULE_*` environment variables (`__` separates
//! sections, e.g. `TAGRULE_ENGINE__FAIL_FAST=false`), then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use figment::Figment;
use figment::providers::{Env, Format as _, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tagrule::EngineConfig;

const FILE_NAME: &str = "tagrule.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub engine: EngineConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `warn` or `tagrule=debug`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            format: LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

/// Merges every file and environment layer.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<CliConfig> {
    let mut figment = Figment::from(Serialized::defaults(CliConfig::default()));

    if let Some(path) = user_config_path() {
        figment = figment.merge(Toml::file(path));
    }
    figment = figment.merge(Toml::file(FILE_NAME));

    if let Some(path) = explicit {
        anyhow::ensure!(path.is_file(), "config file {} not found", path.display());
        figment = figment.merge(Toml::file(path));
    }

    // `TAGRULE_LOG` is a plain level string, handled below.
    figment = figment.merge(Env::prefixed("TAGRULE_").ignore(&["log"]).split("__"));

    let mut config: CliConfig = figment.extract().context("invalid configuration")?;

    if let Ok(level) = std::env::var("TAGRULE_LOG") {
        config.log.level = level;
    } else if let Ok(level) = std::env::var("RUST_LOG") {
        config.log.level = level;
    }

    Ok(config)
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tagrule").join(FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert!(config.engine.fail_fast);
        assert_eq!(config.log.level, "warn");
        assert_eq!(config.log.format, LogFormat::Compact);
    }

    #[test]
    fn test_toml_layer() {
        let figment = Figment::from(Serialized::defaults(CliConfig::default())).merge(
            Toml::string(
                r#"
                [engine]
                fail_fast = false

                [log]
                format = "json"
                "#,
            ),
        );
        let config: CliConfig = figment.extract().unwrap();

        assert!(!config.engine.fail_fast);
        assert!(!config.engine.stop_on_first_failure);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
