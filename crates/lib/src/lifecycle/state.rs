//! Cumulative lifecycle state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The two disjoint identifier sets carried across the whole revision
/// sequence.
///
/// Every asset code that has ever appeared sits in exactly one of the
/// two sets; a code never seen is in neither. The state is a plain
/// value: classification takes it by reference and returns the advanced
/// state alongside the events, so single revisions can be processed (and
/// tested) in isolation.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleState {
  /// Codes currently present in the inventory.
  pub live: BTreeSet<String>,
  /// Codes that were present once and have been disposed of.
  pub disposed: BTreeSet<String>,
}

impl LifecycleState {
  pub fn is_live(&self, code: &str) -> bool {
    self.live.contains(code)
  }

  pub fn is_disposed(&self, code: &str) -> bool {
    self.disposed.contains(code)
  }

  /// True when the code has appeared at any point in the history so far.
  pub fn has_seen(&self, code: &str) -> bool {
    self.live.contains(code) || self.disposed.contains(code)
  }
}
