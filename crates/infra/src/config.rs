//! Configuration loading and representation.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML file
//! (`twinapi.toml` unless overridden), then `TWINAPI_*` environment variables
//! with `__` between nested keys (e.g. `TWINAPI_SERVER__BIND_ADDR`).

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "twinapi.toml";

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logger: LoggerConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoggerConfig {
    /// Default `EnvFilter` directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Emit JSON lines instead of human-readable text.
    pub json: bool,
}

impl AppConfig {
    /// Load from [`DEFAULT_CONFIG_FILE`] (if present) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        defaults()?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("TWINAPI")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize::<AppConfig>()
    }

    /// Parse an inline TOML document layered over the defaults (no environment).
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize::<AppConfig>()
    }
}

fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    Config::builder()
        .set_default("server.bind_addr", "0.0.0.0:8080")?
        .set_default("logger.level", "info")?
        .set_default("logger.json", true)
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = AppConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(cfg.logger.level, "info");
        assert!(cfg.logger.json);
    }

    #[test]
    fn file_values_override_defaults() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [server]
            bind_addr = "127.0.0.1:9000"

            [logger]
            level = "debug"
            json = false
            "#,
        )
        .unwrap();

        assert_eq!(cfg.server.bind_addr, "127.0.0.1:9000");
        assert_eq!(cfg.logger.level, "debug");
        assert!(!cfg.logger.json);
    }

    #[test]
    fn wrong_types_are_rejected() {
        let err = AppConfig::from_toml_str("[logger]\njson = \"sometimes\"\n");
        assert!(err.is_err());
    }
}
