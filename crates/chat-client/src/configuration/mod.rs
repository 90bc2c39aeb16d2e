//! Configuration management for the chat client.
//!
//! Values are resolved from built-in defaults, then `config.toml`, then
//! command-line arguments.

mod config;

pub use config::*;
