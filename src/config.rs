//! Configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) gives a
//! gateway on `0.0.0.0:8080` running `trace` then `sse_headers`.
//!
//! ```toml
//! [server]
//! bind_address = "127.0.0.1:3000"
//!
//! [filters]
//! order = ["trace", "sse_headers"]
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub filters: FilterConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, Error> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// `host:port` to listen on.
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0:8080".to_owned() }
    }
}

/// Global filters by name, run first to last.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub order: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { order: vec!["trace".to_owned(), "sse_headers".to_owned()] }
    }
}
