//! Handler identity and routing metadata.

use serde::{Deserialize, Serialize};

/// Where a handler's implementation lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandlerSource {
    /// Pure in-process computation.
    Local,
    /// Delegation into a feature module.
    Integration,
    /// Proxy to an external AI provider.
    AiProvider,
}

impl std::fmt::Display for HandlerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerSource::Local => write!(f, "local"),
            HandlerSource::Integration => write!(f, "integration"),
            HandlerSource::AiProvider => write!(f, "ai-provider"),
        }
    }
}

/// Identity and routing metadata for a registered handler.
///
/// One canonical descriptor exists per handler id; for provider-backed
/// handlers `provider_id` names the credential the handler needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerDescriptor {
    /// Unique handler id. Re-registering an id replaces the handler.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Implementation source.
    pub source: HandlerSource,
    /// Provider whose credential this handler requires, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    /// Capability ids this handler can service. Every id must exist in
    /// the capability catalog.
    pub capabilities: Vec<String>,
    /// Dispatch priority; higher is tried first.
    pub priority: i32,
}

impl HandlerDescriptor {
    pub fn serves(&self, capability_id: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_serialization() {
        let json = serde_json::to_string(&HandlerSource::AiProvider).unwrap();
        assert_eq!(json, r#""ai-provider""#);
        let parsed: HandlerSource = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, HandlerSource::AiProvider);
    }

    #[test]
    fn test_serves() {
        let descriptor = HandlerDescriptor {
            id: "h".to_string(),
            name: "H".to_string(),
            source: HandlerSource::Local,
            provider_id: None,
            capabilities: vec!["a".to_string(), "b".to_string()],
            priority: 10,
        };
        assert!(descriptor.serves("a"));
        assert!(!descriptor.serves("c"));
    }
}
