//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads the TOML configuration from the platform
//! config directory (or an explicit path), fills in defaults for anything
//! missing, and can write a fully populated file back out.

pub mod config;
