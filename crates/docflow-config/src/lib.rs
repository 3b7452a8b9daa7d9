//! Docflow Config - Configuration management for Docflow.

mod config;
mod error;
mod paths;

pub use config::*;
pub use error::{ConfigError, ConfigResult};
pub use paths::{AppPaths, LOCAL_CONFIG_FILE};
