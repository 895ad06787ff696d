//! Changeset and event types.
//!
//! Events are a closed sum type so every consumer handles every kind;
//! the serialized form tags each event with an `event` field. A
//! changeset bundles one revision's ordered events with the revision's
//! metadata and is immutable once assembled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::{Asset, AssetData};

/// Snapshot of an asset as carried inside events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
  pub asset_code: String,
  pub asset_type: String,
  pub location: String,
  pub data: AssetData,
}

impl From<&Asset> for AssetRecord {
  fn from(asset: &Asset) -> Self {
    AssetRecord {
      asset_code: asset.code.clone(),
      asset_type: asset.asset_type.clone(),
      location: asset.location_ref.clone(),
      data: asset.data.clone(),
    }
  }
}

/// One lifecycle event.
///
/// A simultaneous location and data change is reported as a single
/// `Change` whose records carry both locations; no separate `Move` is
/// emitted for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
  /// A code appeared for the first time.
  Add { asset: AssetRecord },
  /// A live code left the inventory.
  Dispose { asset_code: String },
  /// A previously disposed code reappeared.
  Restore { asset: AssetRecord },
  /// Only the location changed.
  Move {
    asset_code: String,
    old_location: String,
    new_location: String,
  },
  /// Anything beyond the location changed.
  Change {
    asset_code: String,
    old: AssetRecord,
    new: AssetRecord,
  },
}

impl Event {
  /// Code of the asset this event concerns.
  pub fn asset_code(&self) -> &str {
    match self {
      Event::Add { asset } | Event::Restore { asset } => &asset.asset_code,
      Event::Dispose { asset_code }
      | Event::Move { asset_code, .. }
      | Event::Change { asset_code, .. } => asset_code,
    }
  }

  /// Tag the event is serialized under.
  pub fn kind(&self) -> &'static str {
    match self {
      Event::Add { .. } => "add",
      Event::Dispose { .. } => "dispose",
      Event::Restore { .. } => "restore",
      Event::Move { .. } => "move",
      Event::Change { .. } => "change",
    }
  }
}

/// Errors from changeset assembly and storage.
#[derive(Debug, Error)]
pub enum ChangesetError {
  /// Zero-diff revisions are filtered before assembly; an empty event
  /// list here is a pipeline bug, not valid input.
  #[error("changeset must contain at least one event")]
  Empty,

  #[error("failed to create changeset directory '{0}': {1}")]
  CreateDir(std::path::PathBuf, #[source] std::io::Error),

  #[error("failed to write changeset '{0}': {1}")]
  Write(std::path::PathBuf, #[source] std::io::Error),

  #[error("failed to serialize changeset: {0}")]
  Serialize(#[from] serde_yaml::Error),
}

/// The ordered, typed event record for one revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
  pub timestamp: DateTime<Utc>,
  pub author: String,
  pub comment: String,
  pub events: Vec<Event>,
}

impl ChangeSet {
  /// Assemble a changeset. Rejects empty event lists.
  pub fn new(
    timestamp: DateTime<Utc>,
    author: String,
    comment: String,
    events: Vec<Event>,
  ) -> Result<Self, ChangesetError> {
    if events.is_empty() {
      return Err(ChangesetError::Empty);
    }
    Ok(ChangeSet {
      timestamp,
      author,
      comment,
      events,
    })
  }
}
