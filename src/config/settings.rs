//! Application configuration loaded from a TOML file.
//!
//! Every section is optional. The file itself is optional too: when the
//! default path does not exist the built-in defaults are used. An explicitly
//! requested file that cannot be read is an error.

use crate::config::seed::SeedConfig;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "CASHBOOK_CONFIG";

/// Path used when [`CONFIG_PATH_ENV`] is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config file
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Database settings
    pub database: DatabaseConfig,
    /// Starter reference data
    pub seed: SeedConfig,
}

/// The `[server]` section
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// The `[database]` section
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SeaORM` connection URL; `DATABASE_URL` overrides it
    pub url: Option<String>,
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config file {}: {e}", path_ref.display()),
    })
}

/// Loads the application configuration.
///
/// Reads the file named by `CASHBOOK_CONFIG` if set (it must exist), otherwise
/// `config.toml` in the working directory if present, otherwise defaults.
pub fn load_app_configuration() -> Result<AppConfig> {
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => {
            let config = load_config(&path)?;
            info!("Loaded configuration from {}", path);
            Ok(config)
        }
        Err(_) => load_optional_config(DEFAULT_CONFIG_PATH),
    }
}

/// Loads `path` if it exists, falling back to [`AppConfig::default`].
pub fn load_optional_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path: PathBuf = path.as_ref().to_path_buf();
    if path.exists() {
        let config = load_config(&path)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    } else {
        info!(
            "No configuration file at {}, using defaults",
            path.display()
        );
        Ok(AppConfig::default())
    }
}
