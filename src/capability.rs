use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Export name that marks a module as a shipped capability declaration.
///
/// Contract modules carry a capability's function signatures so packs can be
/// validated offline. They export the same names as a real implementation,
/// plus this marker, and are never recorded as implementations themselves.
pub const CONTRACT_MARKER_EXPORT: &str = "__capability_contract";

/// A capability a code unit may implement: a name plus the function exports
/// an implementation must provide.
///
/// An empty `requires` list is the universal capability — every loadable
/// unit that is not a contract declaration satisfies it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    /// Capability name (e.g. `"shape"`).
    pub name: String,
    /// Function exports an implementing unit must provide.
    #[serde(default)]
    pub requires: Vec<String>,
}

impl CapabilityDescriptor {
    pub fn new(name: impl Into<String>, requires: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            requires: requires.into_iter().map(Into::into).collect(),
        }
    }

    /// The universal capability: satisfied by every loadable non-contract unit.
    pub fn universal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requires: Vec::new(),
        }
    }
}

/// A code unit discovered inside a plugin pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredUnit {
    /// Fully-qualified dotted name derived from the entry path
    /// (`com/acme/Circle.wasm` → `com.acme.Circle`).
    pub name: String,
    /// The pack the unit was found in.
    pub archive: PathBuf,
}
