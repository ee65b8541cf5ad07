//! Configuration utilities.
//!
//! - [`config`] - OpenAI connection settings from the environment
//! - [`toml_config`] - Application defaults from a TOML file

#![allow(missing_docs)]

pub mod config;
pub mod toml_config;

pub use config::OpenAiSettings;
pub use toml_config::{ApplicationConfig, ConfigError};
