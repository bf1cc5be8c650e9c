//! # Application Configuration
//!
//! The application reads a JSON file of defaults and an optional override
//! file. The override is merged into the defaults key by key, recursing into
//! nested objects, and the merged document is deserialized into `AppConfig`.
//! Missing sections and keys fall back to the built-in defaults.

pub mod errors;
pub mod loader;

use serde::{Deserialize, Serialize};

pub use errors::{ConfigError, ConfigResult};
pub use loader::{load, load_str, merge};

use crate::http_server::HttpServerConfig;
use crate::orm::DbConfig;

/// Session cookie settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Cookie name (default: "awesession")
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Secret mixed into the cookie signature
    #[serde(default = "default_secret")]
    pub secret: String,

    /// Cookie lifetime in seconds (default: 86400)
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
}

fn default_cookie_name() -> String {
    "awesession".to_string()
}

fn default_secret() -> String {
    "Awesome".to_string()
}

fn default_max_age() -> u64 {
    86400
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            secret: default_secret(),
            max_age_secs: default_max_age(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter directive, overridden by `RUST_LOG` (default: "info")
    #[serde(default = "default_level")]
    pub level: String,

    /// Colored output (default: true)
    #[serde(default = "default_ansi")]
    pub ansi: bool,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_ansi() -> bool {
    true
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            ansi: default_ansi(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub db: DbConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub server: HttpServerConfig,

    #[serde(default)]
    pub log: LogConfig,
}
