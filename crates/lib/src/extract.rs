//! End-to-end extraction pipeline.
//!
//! Replays the inventory history revision by revision, strictly in
//! chronological order: materialize the tree, build its registry, diff
//! against the previous registry, classify the diff into events,
//! order them by containment, and append the changeset to the log.
//! The lifecycle state and the previous registry thread through every
//! step, so no revision can be processed out of order.

use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::changeset::{ChangeSet, ChangesetError, ChangesetStore, Event};
use crate::diff::compute_diff;
use crate::history::{HistoryError, RevisionSource};
use crate::lifecycle::{ClassifyError, LifecycleState, OrderError, classify, order_events};
use crate::registry::{AssetRegistry, RegistryError, build};

/// Errors that abort an extraction run.
///
/// Apart from scratch-directory failures, every variant names the
/// revision it surfaced on so the operator can inspect it.
#[derive(Debug, Error)]
pub enum ExtractError {
  #[error(transparent)]
  History(#[from] HistoryError),

  #[error("failed to create scratch directory: {0}")]
  Scratch(#[source] std::io::Error),

  #[error("revision {hash}: {source}")]
  Registry {
    hash: String,
    #[source]
    source: RegistryError,
  },

  #[error("revision {hash}: {source}")]
  Classify {
    hash: String,
    #[source]
    source: ClassifyError,
  },

  #[error("revision {hash}: {source}")]
  Order {
    hash: String,
    #[source]
    source: OrderError,
  },

  #[error("revision {hash}: {source}")]
  Changeset {
    hash: String,
    #[source]
    source: ChangesetError,
  },
}

/// Totals for one extraction run.
#[derive(Debug, Default, Clone, PartialEq, serde::Serialize)]
pub struct ExtractSummary {
  pub revisions_seen: usize,
  pub merges_skipped: usize,
  pub no_op_revisions: usize,
  pub changesets_written: usize,
  pub events_emitted: usize,
}

/// Per-revision event counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, serde::Serialize)]
pub struct EventCounts {
  pub added: usize,
  pub disposed: usize,
  pub changed: usize,
  pub moved: usize,
  pub restored: usize,
}

impl EventCounts {
  pub fn tally(events: &[Event]) -> Self {
    let mut counts = EventCounts::default();
    for event in events {
      match event {
        Event::Add { .. } => counts.added += 1,
        Event::Dispose { .. } => counts.disposed += 1,
        Event::Change { .. } => counts.changed += 1,
        Event::Move { .. } => counts.moved += 1,
        Event::Restore { .. } => counts.restored += 1,
      }
    }
    counts
  }

  pub fn total(&self) -> usize {
    self.added + self.disposed + self.changed + self.moved + self.restored
  }
}

/// Replay the history of the repository at `repo_path` into a changeset
/// log under `out_dir`.
pub fn run(repo_path: &Path, out_dir: &Path) -> Result<ExtractSummary, ExtractError> {
  let source = RevisionSource::open(repo_path)?;
  let store = ChangesetStore::new(out_dir.to_path_buf());
  let revisions = source.revisions()?;

  let mut summary = ExtractSummary::default();
  let mut state = LifecycleState::default();
  let mut previous = AssetRegistry::default();

  for revision in &revisions {
    summary.revisions_seen += 1;

    if revision.is_merge() {
      debug!(hash = %revision.hash, "skipping merge revision");
      summary.merges_skipped += 1;
      continue;
    }

    let scratch = tempfile::tempdir().map_err(ExtractError::Scratch)?;
    source.materialize(revision, scratch.path())?;
    let current = build(scratch.path()).map_err(|e| ExtractError::Registry {
      hash: revision.hash.clone(),
      source: e,
    })?;

    let diff = compute_diff(&previous, &current);
    if diff.is_empty() {
      debug!(hash = %revision.hash, summary = %revision.summary, "no-op revision");
      summary.no_op_revisions += 1;
      previous = current;
      continue;
    }

    let (events, next_state) =
      classify(&diff, &previous, &current, &state).map_err(|e| ExtractError::Classify {
        hash: revision.hash.clone(),
        source: e,
      })?;

    // A diff of location entries alone produces no events.
    if events.is_empty() {
      debug!(hash = %revision.hash, "revision changed locations only");
      summary.no_op_revisions += 1;
      state = next_state;
      previous = current;
      continue;
    }

    let ordered = order_events(&current, events).map_err(|e| ExtractError::Order {
      hash: revision.hash.clone(),
      source: e,
    })?;

    let changeset = ChangeSet::new(
      revision.timestamp,
      revision.author.clone(),
      format!("{}: {}", revision.hash, revision.summary),
      ordered,
    )
    .map_err(|e| ExtractError::Changeset {
      hash: revision.hash.clone(),
      source: e,
    })?;

    store.write(&changeset, &revision.hash).map_err(|e| ExtractError::Changeset {
      hash: revision.hash.clone(),
      source: e,
    })?;

    let counts = EventCounts::tally(&changeset.events);
    info!(
      hash = %revision.hash,
      added = counts.added,
      disposed = counts.disposed,
      changed = counts.changed,
      moved = counts.moved,
      restored = counts.restored,
      summary = %revision.summary,
      "wrote changeset"
    );

    summary.changesets_written += 1;
    summary.events_emitted += counts.total();
    state = next_state;
    previous = current;
  }

  info!(
    changesets = summary.changesets_written,
    events = summary.events_emitted,
    "extraction finished"
  );
  Ok(summary)
}
