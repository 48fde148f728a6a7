use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{env, fs, path::Path};

const DEFAULT_DATABASE_PATH: &str = "data/mymoney.sqlite";

#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    /// Path to the SQLite database file. Created on first use.
    pub database_path: String,
}

/// Loads the application configuration.
///
/// Resolution order: the `MYMONEY_DATABASE_PATH` environment variable
/// (after attempting to load a `.env` file), then `config.toml` in the
/// working directory, then a built-in default path.
pub fn load_app_configuration() -> Result<AppConfig> {
    dotenvy::dotenv().ok(); // Non-fatal, env vars can be set externally

    if let Ok(database_path) = env::var("MYMONEY_DATABASE_PATH") {
        tracing::debug!("Using database path from environment: {}", database_path);
        return Ok(AppConfig { database_path });
    }

    let config_path = Path::new("config.toml");
    if config_path.exists() {
        return load_config(config_path);
    }

    tracing::debug!("No configuration found, using default database path.");
    Ok(AppConfig {
        database_path: DEFAULT_DATABASE_PATH.to_string(),
    })
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = fs::read_to_string(path_ref)
        .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path_ref, e)))?;
    let app_config: AppConfig = toml::from_str(&contents).map_err(|e| {
        Error::Config(format!(
            "Failed to parse TOML from config file {:?}: {}",
            path_ref, e
        ))
    })?;
    Ok(app_config)
}
