//! Database pool configuration

use serde::{Deserialize, Serialize};

/// Connection pool and write policy settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbConfig {
    /// Connection URL (default: "sqlite://awesome.db?mode=rwc")
    #[serde(default = "default_url")]
    pub url: String,

    /// Upper bound on pooled connections (default: 10)
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connections kept open while idle (default: 1)
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Seconds to wait for a free connection (default: 30)
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,

    /// Whether insert/update/delete commit on their own (default: true)
    #[serde(default = "default_true")]
    pub autocommit: bool,

    /// Fail writes that do not affect exactly one row (default: true)
    #[serde(default = "default_true")]
    pub strict_writes: bool,
}

fn default_url() -> String {
    "sqlite://awesome.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            autocommit: default_true(),
            strict_writes: default_true(),
        }
    }
}

impl DbConfig {
    /// Single connection in-memory database, for tests and demos
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        }
    }

    /// Each connection to `sqlite::memory:` opens a separate database
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DbConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert!(config.autocommit);
        assert!(config.strict_writes);
        assert!(!config.is_in_memory());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DbConfig = serde_json::from_str(r#"{"max_connections": 4}"#).unwrap();
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.url, "sqlite://awesome.db?mode=rwc");
    }

    #[test]
    fn test_in_memory() {
        assert!(DbConfig::in_memory().is_in_memory());
    }
}
