//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from an
//! optional TOML file overlaid with `EDGEHOOK__*` environment variables. Each
//! sub-module represents a logical configuration section.

pub mod host;
pub mod logging;
pub mod observers;

use std::path::Path;

use serde::{Deserialize, Serialize};

use self::host::HostConfig;
use self::logging::LoggingConfig;
use self::observers::ObserverConfig;

use crate::env::RuntimeEnv;
use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Built-in observer hooks.
    #[serde(default)]
    pub observers: ObserverConfig,
    /// Host binding settings.
    #[serde(default)]
    pub host: HostConfig,
    /// Values injected as the frozen runtime environment.
    #[serde(default)]
    pub env: Option<serde_json::Value>,
}

impl AppConfig {
    /// Load configuration from a TOML file and the environment.
    ///
    /// The file is optional. Environment variables prefixed with `EDGEHOOK`
    /// (nested keys separated by `__`) override file values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("EDGEHOOK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Builds the frozen runtime environment from the `env` section.
    pub fn runtime_env(&self) -> RuntimeEnv {
        RuntimeEnv::from_injected(self.env.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig::load(dir.path().join("absent.toml")).expect("load");
        assert_eq!(config.logging.level, "info");
        assert!(config.observers.fetch);
        assert!(!config.observers.crypto);
        assert_eq!(config.host.request_timeout_seconds, 30);
        assert!(config.runtime_env().is_empty());
    }

    #[test]
    fn test_file_sections_are_read() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("edgehook.toml");
        std::fs::write(
            &path,
            r#"
[logging]
level = "debug"
format = "json"

[observers]
crypto = true

[host]
upstream = "http://127.0.0.1:9000"

[env]
region = "eu"
"#,
        )
        .expect("write");

        let config = AppConfig::load(&path).expect("load");
        assert_eq!(config.logging.format, "json");
        assert!(config.observers.crypto);
        assert_eq!(config.host.upstream.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(config.runtime_env().get_str("region"), Some("eu"));
    }
}
