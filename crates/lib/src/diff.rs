//! Diff computation between registries.
//!
//! Compares the registries of two consecutive snapshots and separates
//! their identifiers into three disjoint sets: present only in the
//! current snapshot, present only in the previous one, and present in
//! both with structurally different records. Membership checks are map
//! lookups, so a diff is linear in registry size.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::registry::AssetRegistry;

/// Identifier sets separating two consecutive snapshots.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct RegistryDiff {
  /// In current, absent from previous.
  pub added: BTreeSet<String>,
  /// In previous, absent from current.
  pub removed: BTreeSet<String>,
  /// In both, with field-by-field inequality (location and data included).
  pub changed: BTreeSet<String>,
}

impl RegistryDiff {
  /// Returns true when the two snapshots are structurally identical.
  pub fn is_empty(&self) -> bool {
    self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
  }

  /// Total number of identifiers that differ.
  pub fn len(&self) -> usize {
    self.added.len() + self.removed.len() + self.changed.len()
  }
}

/// Compute the diff from `previous` to `current`.
pub fn compute_diff(previous: &AssetRegistry, current: &AssetRegistry) -> RegistryDiff {
  let mut diff = RegistryDiff::default();

  for (id, entry) in &current.entries {
    match previous.entries.get(id) {
      None => {
        diff.added.insert(id.clone());
      }
      Some(previous_entry) if previous_entry != entry => {
        diff.changed.insert(id.clone());
      }
      Some(_) => {}
    }
  }

  for id in previous.entries.keys() {
    if !current.entries.contains_key(id) {
      diff.removed.insert(id.clone());
    }
  }

  diff
}
