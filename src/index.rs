//! Capability index — associates capabilities with the units that implement
//! them.

use std::collections::HashMap;

use crate::capability::{CapabilityDescriptor, DiscoveredUnit};

/// Multi-map from a capability to the ordered list of units discovered to
/// satisfy it.
///
/// Per-capability insertion order is preserved and duplicates are retained:
/// the same unit matched from two separately scanned packs appears twice.
/// Lookup of a capability that was never inserted yields an empty slice, not
/// an error — "unknown capability" and "zero matches" are the same state.
#[derive(Debug, Default)]
pub struct CapabilityIndex {
    entries: HashMap<CapabilityDescriptor, Vec<DiscoveredUnit>>,
}

impl CapabilityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `unit` to the list for `capability`, creating the list on
    /// first use.
    pub fn put(&mut self, capability: &CapabilityDescriptor, unit: DiscoveredUnit) {
        self.entries
            .entry(capability.clone())
            .or_default()
            .push(unit);
    }

    /// The units recorded for `capability`, in insertion order. Empty for a
    /// capability never inserted.
    pub fn get(&self, capability: &CapabilityDescriptor) -> &[DiscoveredUnit] {
        self.entries
            .get(capability)
            .map_or(&[], Vec::as_slice)
    }

    /// Total match count across all capabilities — the sum of list lengths,
    /// not the key count. A unit satisfying two capabilities contributes 2.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of capabilities with at least one recorded unit.
    pub fn capability_count(&self) -> usize {
        self.entries.len()
    }

    /// Merges `other` into `self`, concatenating lists for shared
    /// capabilities.
    pub fn merge(&mut self, other: CapabilityIndex) {
        for (capability, units) in other.entries {
            self.entries.entry(capability).or_default().extend(units);
        }
    }

    /// Iterates over `(capability, units)` pairs. Iteration order is
    /// unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (&CapabilityDescriptor, &[DiscoveredUnit])> {
        self.entries.iter().map(|(c, u)| (c, u.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn unit(name: &str) -> DiscoveredUnit {
        DiscoveredUnit {
            name: name.into(),
            archive: PathBuf::from("fixtures/demo.pack"),
        }
    }

    #[test]
    fn fresh_index_is_empty_for_any_capability() {
        let index = CapabilityIndex::new();
        let cap = CapabilityDescriptor::universal("anything");
        assert!(index.get(&cap).is_empty());
        assert_eq!(index.len(), 0);
        assert!(index.is_empty());
    }

    #[test]
    fn put_preserves_order_and_duplicates() {
        let cap = CapabilityDescriptor::new("shape", ["area"]);
        let mut index = CapabilityIndex::new();
        index.put(&cap, unit("com.acme.Circle"));
        index.put(&cap, unit("com.acme.Square"));
        index.put(&cap, unit("com.acme.Circle"));

        let names: Vec<&str> = index.get(&cap).iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["com.acme.Circle", "com.acme.Square", "com.acme.Circle"]);
    }

    #[test]
    fn len_sums_across_capabilities() {
        let a = CapabilityDescriptor::new("a", ["f"]);
        let b = CapabilityDescriptor::new("b", ["g"]);
        let mut index = CapabilityIndex::new();
        index.put(&a, unit("u1"));
        index.put(&a, unit("u2"));
        index.put(&b, unit("u2"));

        assert_eq!(index.len(), 3);
        assert_eq!(index.capability_count(), 2);
    }

    #[test]
    fn merge_concatenates_shared_capabilities() {
        let cap = CapabilityDescriptor::new("shape", ["area"]);
        let mut left = CapabilityIndex::new();
        left.put(&cap, unit("x"));
        let mut right = CapabilityIndex::new();
        right.put(&cap, unit("y"));

        left.merge(right);
        let names: Vec<&str> = left.get(&cap).iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["x", "y"]);
    }

    #[test]
    fn merge_carries_disjoint_capabilities() {
        let a = CapabilityDescriptor::new("a", ["f"]);
        let b = CapabilityDescriptor::new("b", ["g"]);
        let mut left = CapabilityIndex::new();
        left.put(&a, unit("u1"));
        let mut right = CapabilityIndex::new();
        right.put(&b, unit("u2"));

        left.merge(right);
        assert_eq!(index_len(&left, &a), 1);
        assert_eq!(index_len(&left, &b), 1);
        assert_eq!(left.len(), 2);
    }

    fn index_len(index: &CapabilityIndex, cap: &CapabilityDescriptor) -> usize {
        index.get(cap).len()
    }
}
