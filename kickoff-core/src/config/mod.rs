//! Configuration types for Kickoff.
//!
//! These types represent the validated runtime configuration used by the server
//! and shared with the core services. The actual config loading/parsing is
//! handled by the server crate.

mod auth;
mod market;
mod server;

pub use auth::AuthConfig;
pub use market::MarketConfig;
pub use server::ServerConfig;
