//! Lifecycle classification.
//!
//! Turns a registry diff into typed events against the cumulative
//! lifecycle state. Location entries move through diffs (their
//! appearance and disappearance changes the sets) but never produce
//! events; only assets have a lifecycle.

use thiserror::Error;
use tracing::debug;

use crate::changeset::{AssetRecord, Event};
use crate::diff::RegistryDiff;
use crate::registry::{AssetRegistry, Entry};

use super::state::LifecycleState;

/// Structural inconsistencies in the source history. None of these can
/// be repaired locally; the run is aborted so the offending revision
/// can be inspected.
#[derive(Debug, Error)]
pub enum ClassifyError {
  /// A code appeared while already live.
  #[error("asset '{code}' created while already live")]
  DuplicateCreation { code: String },

  /// A code disappeared without ever having been live.
  #[error("asset '{code}' disposed while not live")]
  DisposeUnknown { code: String },
}

/// Classify one revision's diff into events and the advanced state.
///
/// Added codes become `Add` (never seen) or `Restore` (seen and
/// disposed). Removed codes become `Dispose`. Changed codes become
/// `Move` when only the location differs, `Change` otherwise.
pub fn classify(
  diff: &RegistryDiff,
  previous: &AssetRegistry,
  current: &AssetRegistry,
  state: &LifecycleState,
) -> Result<(Vec<Event>, LifecycleState), ClassifyError> {
  let mut next = state.clone();
  let mut events = Vec::with_capacity(diff.len());

  for code in &diff.added {
    let Some(asset) = current.get(code).and_then(Entry::as_asset) else {
      continue;
    };
    if next.live.contains(code) {
      return Err(ClassifyError::DuplicateCreation { code: code.clone() });
    }
    if next.disposed.remove(code) {
      events.push(Event::Restore {
        asset: AssetRecord::from(asset),
      });
    } else {
      events.push(Event::Add {
        asset: AssetRecord::from(asset),
      });
    }
    next.live.insert(code.clone());
  }

  for code in &diff.removed {
    if previous.get(code).and_then(Entry::as_asset).is_none() {
      continue;
    }
    if !next.live.remove(code) {
      return Err(ClassifyError::DisposeUnknown { code: code.clone() });
    }
    events.push(Event::Dispose {
      asset_code: code.clone(),
    });
    next.disposed.insert(code.clone());
  }

  for code in &diff.changed {
    let (Some(old), Some(new)) = (
      previous.get(code).and_then(Entry::as_asset),
      current.get(code).and_then(Entry::as_asset),
    ) else {
      continue;
    };

    // The record counts as moved when substituting the new location
    // into the old record makes the two equal.
    let mut relocated = old.clone();
    relocated.location_ref = new.location_ref.clone();
    if relocated == *new {
      events.push(Event::Move {
        asset_code: code.clone(),
        old_location: old.location_ref.clone(),
        new_location: new.location_ref.clone(),
      });
    } else {
      events.push(Event::Change {
        asset_code: code.clone(),
        old: AssetRecord::from(old),
        new: AssetRecord::from(new),
      });
    }
  }

  debug!(events = events.len(), "classified revision diff");
  Ok((events, next))
}
