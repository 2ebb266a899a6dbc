/// Database connection and schema management
pub mod database;

/// Starter reference data definitions
pub mod seed;

/// Application settings loaded from config.toml
pub mod settings;

pub use settings::{AppConfig, load_app_configuration};
