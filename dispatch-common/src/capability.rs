//! Capability catalog types.

use serde::{Deserialize, Serialize};

/// A named unit of work the dispatcher can perform.
///
/// Capabilities are abstract: each one may be served by several
/// competing handlers (local computation, feature integrations,
/// external AI providers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    /// Globally unique identifier (e.g., "text:generate").
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Short description of what the capability does.
    pub description: String,
    /// Short glyph for UI surfaces.
    pub icon: String,
    /// Whether the capability is enabled in this deployment.
    pub is_enabled: bool,
}

/// Static per-process catalog of capabilities.
///
/// Populated once at engine construction and read-only afterward.
/// Ids are globally unique; [`CapabilityCatalog::new`] keeps the first
/// entry for a duplicated id.
#[derive(Debug, Clone, Default)]
pub struct CapabilityCatalog {
    entries: Vec<Capability>,
}

impl CapabilityCatalog {
    pub fn new(entries: Vec<Capability>) -> Self {
        let mut deduped: Vec<Capability> = Vec::with_capacity(entries.len());
        for entry in entries {
            if !deduped.iter().any(|e| e.id == entry.id) {
                deduped.push(entry);
            }
        }
        Self { entries: deduped }
    }

    /// Look up a capability by id.
    pub fn get(&self, id: &str) -> Option<&Capability> {
        self.entries.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All capabilities, in catalog order.
    pub fn all(&self) -> &[Capability] {
        &self.entries
    }

    pub fn enabled_count(&self) -> usize {
        self.entries.iter().filter(|c| c.is_enabled).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
