//! TOML file configuration structures.
//!
//! These structs directly map to the `kickoff-config.toml` file format.

use kickoff_sdk::objects::market::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub market: MarketConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Session token section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for session tokens. At least 32 bytes.
    pub token_secret: String,
    /// Token lifetime in hours.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

fn default_token_ttl_hours() -> i64 {
    kickoff_sdk::token::DEFAULT_TOKEN_TTL.whole_hours()
}

/// Squad pool section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// JSON file with the pre-built squads.
    #[serde(default = "default_pool_path")]
    pub path: PathBuf,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            path: default_pool_path(),
        }
    }
}

fn default_pool_path() -> PathBuf {
    PathBuf::from("./data/players_data.json")
}

/// Transfer market section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Default number of listings per page.
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}
