//! Config file loading and merging.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::info;

use super::errors::{ConfigError, ConfigResult};
use super::AppConfig;

/// Merge `overrides` into `defaults`. Keys absent from `defaults` are
/// ignored; nested objects merge recursively; any other override value
/// replaces the default.
pub fn merge(defaults: &Value, overrides: &Value) -> Value {
    match (defaults, overrides) {
        (Value::Object(base), Value::Object(top)) => {
            let merged = base
                .iter()
                .map(|(key, value)| {
                    let value = match top.get(key) {
                        Some(over) => merge(value, over),
                        None => value.clone(),
                    };
                    (key.clone(), value)
                })
                .collect();
            Value::Object(merged)
        }
        (_, over) => over.clone(),
    }
}

fn read_json(path: &Path) -> ConfigResult<Value> {
    let display = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: display,
        source,
    })
}

/// Load the defaults file, merged with the override file when given
pub fn load(defaults: &Path, overrides: Option<&Path>) -> ConfigResult<AppConfig> {
    let mut document = read_json(defaults)?;
    if let Some(path) = overrides {
        info!(path = %path.display(), "merging config override");
        document = merge(&document, &read_json(path)?);
    }
    Ok(serde_json::from_value(document)?)
}

/// Like `load`, from in-memory JSON documents
pub fn load_str(defaults: &str, overrides: Option<&str>) -> ConfigResult<AppConfig> {
    let mut document: Value = serde_json::from_str(defaults)?;
    if let Some(text) = overrides {
        document = merge(&document, &serde_json::from_str(text)?);
    }
    Ok(serde_json::from_value(document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_recurses_and_ignores_unknown_keys() {
        let defaults = json!({"db": {"url": "a", "max_connections": 10}, "debug": true});
        let overrides = json!({"db": {"url": "b"}, "extra": 1});
        assert_eq!(
            merge(&defaults, &overrides),
            json!({"db": {"url": "b", "max_connections": 10}, "debug": true})
        );
    }

    #[test]
    fn test_merge_replaces_non_objects() {
        let defaults = json!({"server": {"cors_origins": ["x", "y"]}});
        let overrides = json!({"server": {"cors_origins": ["z"]}});
        assert_eq!(
            merge(&defaults, &overrides),
            json!({"server": {"cors_origins": ["z"]}})
        );
    }

    #[test]
    fn test_load_str() {
        let config = load_str(
            r#"{"session": {"secret": "dev", "max_age_secs": 60}, "server": {"port": 9000}}"#,
            Some(r#"{"session": {"secret": "prod"}}"#),
        )
        .unwrap();
        assert_eq!(config.session.secret, "prod");
        assert_eq!(config.session.max_age_secs, 60);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.db.max_connections, 10);
    }

    #[test]
    fn test_load_str_rejects_bad_types() {
        let err = load_str(r#"{"server": {"port": "high"}}"#, None).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
