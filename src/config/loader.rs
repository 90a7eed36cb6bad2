//! Configuration loading from disk.

use std::path::Path;
use std::fs;
use crate::config::schema::BundlerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
    /// A required environment variable is missing or not unicode.
    MissingEnv(&'static str),
    /// An environment variable is present but unusable.
    InvalidEnv { key: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid_env(key: &'static str, reason: impl std::fmt::Display) -> Self {
        ConfigError::InvalidEnv { key, reason: reason.to_string() }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
            ConfigError::MissingEnv(key) => {
                write!(f, "missing or non-unicode environment variable: {}", key)
            }
            ConfigError::InvalidEnv { key, reason } => {
                write!(f, "invalid environment variable {}: {}", key, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<BundlerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: BundlerConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load from `path` when given, otherwise validated defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<BundlerConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = BundlerConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}
