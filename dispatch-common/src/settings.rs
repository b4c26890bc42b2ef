//! Configuration value types shared by the ConfigProvider variants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which configuration source is active for this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    /// Process environment variables (plus any explicitly forwarded
    /// request credentials).
    Environment,
    /// Persisted settings document.
    Stored,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Environment => write!(f, "environment"),
            ConfigSource::Stored => write!(f, "stored"),
        }
    }
}

/// A credential for an external provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredKey {
    pub provider_id: String,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl StoredKey {
    pub fn new(provider_id: &str, key: &str) -> Self {
        Self {
            provider_id: provider_id.to_string(),
            key: key.to_string(),
            added_at: None,
        }
    }
}

/// Per-capability settings.
///
/// Absent or malformed data degrades to the default (enabled, no
/// options) rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilitySettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl Default for CapabilitySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            options: Map::new(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_settings_default_enabled() {
        let settings: CapabilitySettings = serde_json::from_str("{}").unwrap();
        assert!(settings.enabled);
        assert!(settings.options.is_empty());
    }

    #[test]
    fn test_capability_settings_disabled() {
        let settings: CapabilitySettings =
            serde_json::from_str(r#"{"enabled": false, "options": {"tone": "formal"}}"#).unwrap();
        assert!(!settings.enabled);
        assert_eq!(settings.options["tone"], "formal");
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(ConfigSource::Environment.to_string(), "environment");
        assert_eq!(ConfigSource::Stored.to_string(), "stored");
    }
}
