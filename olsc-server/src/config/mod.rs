//! Configuration module for olsc-server.
//!
//! Handles loading configuration from a TOML file with CLI overrides.

pub mod file;
pub mod runtime;

use crate::config::file::FileConfig;
pub use crate::config::runtime::RuntimeConfig;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// Reads the TOML file, applies CLI overrides and validates. A
    /// missing file yields the defaults so a fresh deployment can start
    /// without one.
    pub fn load(&self) -> Result<RuntimeConfig, ConfigError> {
        let mut file_config = match std::fs::read_to_string(&self.config_path) {
            Ok(content) => toml::from_str::<FileConfig>(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = ?self.config_path, "config file not found, using defaults");
                FileConfig::default()
            }
            Err(e) => return Err(e.into()),
        };

        // Apply CLI overrides
        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        self.validate(&file_config)?;

        Ok(RuntimeConfig {
            listen: file_config.server.listen,
            allowed_origins: file_config.cors.allowed_origins,
        })
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<RuntimeConfig, ConfigError> {
        self.load()
    }

    fn validate(&self, config: &FileConfig) -> Result<(), ConfigError> {
        for origin in &config.cors.allowed_origins {
            if origin.is_empty() {
                return Err(ConfigError::ValidationError(
                    "allowed_origins contains an empty entry".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let loader = ConfigLoader::new("/nonexistent/olsc-config.toml", None);
        let config = loader.load().unwrap();
        assert_eq!(config.listen.port(), 8080);
    }

    #[test]
    fn cli_override_wins_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nlisten = \"127.0.0.1:3000\"").unwrap();

        let override_addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        let loader = ConfigLoader::new(file.path(), Some(override_addr));
        let config = loader.load().unwrap();
        assert_eq!(config.listen, override_addr);
    }

    #[test]
    fn empty_origin_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cors]\nallowed_origins = [\"\"]").unwrap();

        let loader = ConfigLoader::new(file.path(), None);
        assert!(matches!(
            loader.load(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
