//! Service configuration for the dispatcher.
//!
//! This is the service's own config (listen address, timeouts, provider
//! endpoints), loaded through the `config` crate. Credentials and
//! per-capability settings come from the [`crate::provider`] boundary
//! instead.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

use crate::provider::{ConfigProvider, EnvConfigProvider, StoredConfigProvider};

/// Main configuration structure for the dispatcher service.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Dispatch loop tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Hard per-attempt deadline enforced by the engine, in seconds.
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_secs: default_attempt_timeout(),
        }
    }
}

impl DispatchConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }
}

/// Which credential/settings source to activate for this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsSource {
    #[default]
    Environment,
    Stored,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SettingsConfig {
    #[serde(default)]
    pub source: SettingsSource,
    /// Path to the persisted settings document (stored source only).
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_openai")]
    pub openai: ProviderConfig,
    #[serde(default = "default_perplexity")]
    pub perplexity: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openai: default_openai(),
            perplexity: default_perplexity(),
        }
    }
}

/// Endpoint configuration for one OpenAI-compatible provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub model: String,
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_attempt_timeout() -> u64 {
    30
}
fn default_openai() -> ProviderConfig {
    ProviderConfig {
        base_url: "https://api.openai.com/v1".to_string(),
        model: "gpt-4o-mini".to_string(),
    }
}
fn default_perplexity() -> ProviderConfig {
    ProviderConfig {
        base_url: "https://api.perplexity.ai".to_string(),
        model: "sonar-pro".to_string(),
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (DISPATCHER__SECTION__KEY format)
    /// 2. config.toml file (if present)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("DISPATCHER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // An empty source set still deserializes: every section has
        // serde defaults.
        config.try_deserialize()
    }

    /// Construct the active [`ConfigProvider`] variant.
    ///
    /// Chosen once per process; the engine only sees the trait object.
    pub fn config_provider(&self) -> Arc<dyn ConfigProvider> {
        match self.settings.source {
            SettingsSource::Environment => Arc::new(EnvConfigProvider::new()),
            SettingsSource::Stored => {
                let path = self
                    .settings
                    .path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("settings.json"));
                Arc::new(StoredConfigProvider::new(path))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_api_config() {
        let api = ApiConfig::default();
        assert_eq!(api.host, "0.0.0.0");
        assert_eq!(api.port, 8080);
    }

    #[test]
    fn test_default_dispatch_config() {
        let dispatch = DispatchConfig::default();
        assert_eq!(dispatch.attempt_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_settings_source_deserialization() {
        let settings: SettingsConfig =
            serde_json::from_str(r#"{"source": "stored", "path": "/tmp/settings.json"}"#).unwrap();
        assert_eq!(settings.source, SettingsSource::Stored);
        assert_eq!(settings.path, Some(PathBuf::from("/tmp/settings.json")));
    }

    #[test]
    fn test_provider_defaults() {
        let providers = ProvidersConfig::default();
        assert!(providers.openai.base_url.contains("openai"));
        assert!(providers.perplexity.base_url.contains("perplexity"));
    }
}
