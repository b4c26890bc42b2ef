//! Credential and settings sources.
//!
//! The dispatch engine reads credentials and per-capability settings
//! through the [`ConfigProvider`] trait. Two variants exist: one backed
//! by process environment variables (server contexts), one backed by a
//! persisted settings document (contexts with local settings storage).
//! Exactly one variant is chosen per process; the engine reports which
//! via its diagnostics.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use dispatch_common::{CapabilitySettings, ConfigSource, StoredKey};

/// Source of credentials and capability settings.
///
/// Implementations never fail: absent or malformed data is reported as
/// `None` or defaults, distinct from a misconfiguration error. Reads
/// are side-effect-free and evaluated fresh on every call, so
/// credentials can change without a restart.
pub trait ConfigProvider: Send + Sync {
    /// Which variant is active, surfaced in engine diagnostics.
    fn source(&self) -> ConfigSource;

    /// Credential for a provider, if one is configured.
    fn stored_key(&self, provider_id: &str) -> Option<StoredKey>;

    /// Settings for a capability. Defaults to enabled with no options.
    fn capability_settings(&self, capability_id: &str) -> CapabilitySettings;
}

/// Reads credentials from process environment variables.
///
/// `stored_key("openai")` looks up `OPENAI_API_KEY`; non-alphanumeric
/// characters in the provider id map to underscores. Credentials
/// forwarded explicitly (e.g. from an inbound request in a trusted
/// context) take precedence over the environment.
#[derive(Debug, Default)]
pub struct EnvConfigProvider {
    forwarded: HashMap<String, String>,
}

impl EnvConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer explicitly forwarded credentials over the environment.
    pub fn with_forwarded(forwarded: HashMap<String, String>) -> Self {
        Self { forwarded }
    }

    fn key_var(provider_id: &str) -> String {
        let normalized: String = provider_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}_API_KEY", normalized)
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn source(&self) -> ConfigSource {
        ConfigSource::Environment
    }

    fn stored_key(&self, provider_id: &str) -> Option<StoredKey> {
        if let Some(key) = self.forwarded.get(provider_id) {
            return Some(StoredKey::new(provider_id, key));
        }
        std::env::var(Self::key_var(provider_id))
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| StoredKey::new(provider_id, &v))
    }

    fn capability_settings(&self, capability_id: &str) -> CapabilitySettings {
        // DISPATCHER_DISABLED_CAPABILITIES is a comma-separated list of
        // capability ids to turn off without a settings document.
        let disabled = std::env::var("DISPATCHER_DISABLED_CAPABILITIES").unwrap_or_default();
        let mut settings = CapabilitySettings::default();
        if disabled.split(',').any(|c| c.trim() == capability_id) {
            settings.enabled = false;
        }
        settings
    }
}

/// Persisted settings document shape.
#[derive(Debug, Default, Deserialize)]
struct SettingsDocument {
    #[serde(default)]
    provider_keys: HashMap<String, String>,
    #[serde(default)]
    capabilities: HashMap<String, CapabilitySettings>,
}

/// Reads a persisted JSON settings document from disk.
///
/// The document is re-read on every lookup so edits take effect without
/// a restart. A missing or malformed file degrades to an empty
/// document.
#[derive(Debug)]
pub struct StoredConfigProvider {
    path: PathBuf,
}

impl StoredConfigProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn document(&self) -> SettingsDocument {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return SettingsDocument::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Malformed settings document, treating as empty"
                );
                SettingsDocument::default()
            }
        }
    }
}

impl ConfigProvider for StoredConfigProvider {
    fn source(&self) -> ConfigSource {
        ConfigSource::Stored
    }

    fn stored_key(&self, provider_id: &str) -> Option<StoredKey> {
        self.document()
            .provider_keys
            .get(provider_id)
            .filter(|v| !v.trim().is_empty())
            .map(|v| StoredKey::new(provider_id, v))
    }

    fn capability_settings(&self, capability_id: &str) -> CapabilitySettings {
        self.document()
            .capabilities
            .remove(capability_id)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_env_key_var_mapping() {
        assert_eq!(EnvConfigProvider::key_var("openai"), "OPENAI_API_KEY");
        assert_eq!(
            EnvConfigProvider::key_var("stable-diffusion"),
            "STABLE_DIFFUSION_API_KEY"
        );
    }

    #[test]
    fn test_env_provider_reads_variable() {
        // Unique variable name to avoid clashing with parallel tests.
        std::env::set_var("ENVTEST_READS_API_KEY", "sk-test");
        let provider = EnvConfigProvider::new();
        let key = provider.stored_key("envtest-reads").unwrap();
        assert_eq!(key.key, "sk-test");
        assert_eq!(key.provider_id, "envtest-reads");
        std::env::remove_var("ENVTEST_READS_API_KEY");
    }

    #[test]
    fn test_env_provider_missing_is_none() {
        let provider = EnvConfigProvider::new();
        assert!(provider.stored_key("no-such-provider-xyz").is_none());
    }

    #[test]
    fn test_env_provider_blank_is_none() {
        std::env::set_var("ENVTEST_BLANK_API_KEY", "   ");
        let provider = EnvConfigProvider::new();
        assert!(provider.stored_key("envtest-blank").is_none());
        std::env::remove_var("ENVTEST_BLANK_API_KEY");
    }

    #[test]
    fn test_forwarded_credentials_take_precedence() {
        std::env::set_var("ENVTEST_FWD_API_KEY", "from-env");
        let mut forwarded = HashMap::new();
        forwarded.insert("envtest-fwd".to_string(), "from-request".to_string());
        let provider = EnvConfigProvider::with_forwarded(forwarded);
        assert_eq!(provider.stored_key("envtest-fwd").unwrap().key, "from-request");
        std::env::remove_var("ENVTEST_FWD_API_KEY");
    }

    #[test]
    fn test_stored_provider_reads_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "provider_keys": {{"openai": "sk-stored"}},
                "capabilities": {{"text:generate": {{"enabled": false}}}}
            }}"#
        )
        .unwrap();

        let provider = StoredConfigProvider::new(file.path().to_path_buf());
        assert_eq!(provider.stored_key("openai").unwrap().key, "sk-stored");
        assert!(provider.stored_key("anthropic").is_none());
        assert!(!provider.capability_settings("text:generate").enabled);
        assert!(provider.capability_settings("content:quality").enabled);
    }

    #[test]
    fn test_stored_provider_missing_file_degrades() {
        let provider = StoredConfigProvider::new(PathBuf::from("/nonexistent/settings.json"));
        assert!(provider.stored_key("openai").is_none());
        assert!(provider.capability_settings("text:generate").enabled);
    }

    #[test]
    fn test_stored_provider_malformed_file_degrades() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json at all").unwrap();

        let provider = StoredConfigProvider::new(file.path().to_path_buf());
        assert!(provider.stored_key("openai").is_none());
        assert!(provider.capability_settings("anything").enabled);
    }
}
