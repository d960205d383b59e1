#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod accounts;
pub mod allocation;
pub mod config;
pub mod entities;
pub mod errors;
pub mod framework;
pub mod market;
pub mod pool;
pub mod processors;
pub mod teams;
