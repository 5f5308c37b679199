//! Where the item collection lives and how long a request may take.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_COLLECTION_PATH: &str = "/api/items";

const ENV_BASE_URL: &str = "TASKLIST_BASE_URL";
const ENV_COLLECTION_PATH: &str = "TASKLIST_COLLECTION_PATH";
const ENV_TIMEOUT_SECS: &str = "TASKLIST_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub collection_path: String,
    /// Per-request timeout handed to the transport. `None` leaves the
    /// transport's own behaviour in place.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            collection_path: DEFAULT_COLLECTION_PATH.to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `TASKLIST_BASE_URL`, `TASKLIST_COLLECTION_PATH`
    /// and `TASKLIST_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(path) = lookup(ENV_COLLECTION_PATH) {
            config.collection_path = path;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidTimeout {
                var: ENV_TIMEOUT_SECS,
                value: raw.clone(),
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Absolute URL of the collection resource, without a trailing slash.
    pub fn collection_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.collection_path.trim_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_local_api() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.collection_url(), "http://localhost:8080/api/items");
        assert!(config.timeout.is_none());
    }

    #[test]
    fn env_overrides_apply() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("TASKLIST_BASE_URL", "https://todo.example.com/"),
            ("TASKLIST_COLLECTION_PATH", "todolist/"),
            ("TASKLIST_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();
        assert_eq!(config.collection_url(), "https://todo.example.com/todolist");
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[("TASKLIST_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout { .. }));
    }

    #[test]
    fn empty_collection_path_uses_base() {
        let mut config = ClientConfig::new("http://host:1/items/");
        config.collection_path = String::new();
        assert_eq!(config.collection_url(), "http://host:1/items");
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let config: ClientConfig = serde_json::from_str(r#"{"base_url":"http://x"}"#).unwrap();
        assert_eq!(config.collection_path, DEFAULT_COLLECTION_PATH);
    }
}
