//! Shared API types, session tokens and (feature `client`) an HTTP client for
//! the Kickoff fantasy-football server.

#![forbid(unsafe_code)]

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
pub mod token;
