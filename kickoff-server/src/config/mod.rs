//! Configuration module for kickoff-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables.

pub mod file;

use crate::config::file::FileConfig;
use kickoff_core::config::{AuthConfig, MarketConfig, ServerConfig};
use kickoff_sdk::objects::market::MAX_PAGE_SIZE;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Shortest accepted token secret, in bytes.
const MIN_SECRET_LEN: usize = 32;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Loaded configuration result containing all parts.
#[derive(Debug)]
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub market: MarketConfig,
    pub pool_path: PathBuf,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
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

    /// Read the TOML file, apply CLI overrides, validate and build the
    /// runtime configuration.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let file_config: FileConfig = toml::from_str(&config_content)?;
        self.build(file_config)
    }

    fn build(&self, mut file_config: FileConfig) -> Result<LoadedConfig, ConfigError> {
        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        validate(&file_config)?;

        Ok(LoadedConfig {
            server: ServerConfig {
                listen: file_config.server.listen,
            },
            auth: AuthConfig {
                token_secret: file_config.auth.token_secret.into_bytes().into_boxed_slice(),
                token_ttl: time::Duration::hours(file_config.auth.token_ttl_hours),
            },
            market: MarketConfig {
                page_size: file_config.market.page_size,
            },
            pool_path: file_config.pool.path,
        })
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.auth.token_secret.len() < MIN_SECRET_LEN {
        return Err(ConfigError::ValidationError(format!(
            "auth.token_secret must be at least {MIN_SECRET_LEN} bytes"
        )));
    }
    if config.auth.token_ttl_hours <= 0 {
        return Err(ConfigError::ValidationError(
            "auth.token_ttl_hours must be positive".to_owned(),
        ));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&config.market.page_size) {
        return Err(ConfigError::ValidationError(format!(
            "market.page_size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    Ok(())
}

/// Read the database connection string from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}
