//! Registry entry types.
//!
//! A registry is the typed view of one tree snapshot: every asset and
//! every grouping directory, keyed by identifier. Asset keys are codes
//! like `motor-sr0412`'s `sr0412`; location keys are slash-joined paths
//! relative to the snapshot root. The two key spaces never collide (a
//! code has no `/` and never equals a bare directory name that failed
//! the identifier pattern).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::ROOT_SENTINEL;

/// Metadata mapping parsed from an asset's YAML blob.
///
/// Empty when the blob was absent, unparseable, or not a mapping.
pub type AssetData = BTreeMap<String, serde_yaml::Value>;

/// A physical asset (leaf line-item).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
  /// Unique site-prefixed code.
  pub code: String,
  /// Type portion of the identifier, subtypes included.
  pub asset_type: String,
  /// Identifier of the entry this asset sits in: another asset's code
  /// when nested inside that asset, otherwise a location path.
  pub location_ref: String,
  /// Parsed metadata.
  pub data: AssetData,
}

/// A grouping directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
  /// Slash-joined path relative to the snapshot root.
  pub path: String,
  /// Nearest branching ancestor directory, or the root sentinel.
  /// Chains of single-child directories collapse into one node.
  pub parent_ref: String,
}

/// One registry entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entry {
  Asset(Asset),
  Location(Location),
}

impl Entry {
  /// The identifier this entry is registered under.
  pub fn id(&self) -> &str {
    match self {
      Entry::Asset(asset) => &asset.code,
      Entry::Location(location) => &location.path,
    }
  }

  /// The identifier of the entry containing this one.
  pub fn location_ref(&self) -> &str {
    match self {
      Entry::Asset(asset) => &asset.location_ref,
      Entry::Location(location) => &location.parent_ref,
    }
  }

  pub fn as_asset(&self) -> Option<&Asset> {
    match self {
      Entry::Asset(asset) => Some(asset),
      Entry::Location(_) => None,
    }
  }
}

/// All entries derived from one tree snapshot.
///
/// Uses [`BTreeMap`] so iteration, diffing, and serialization are
/// deterministic across runs of the same history.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRegistry {
  /// Entries keyed by identifier.
  pub entries: BTreeMap<String, Entry>,
}

impl AssetRegistry {
  pub fn get(&self, id: &str) -> Option<&Entry> {
    self.entries.get(id)
  }

  pub fn contains(&self, id: &str) -> bool {
    self.entries.contains_key(id)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Iterate over asset entries only, in key order.
  pub fn assets(&self) -> impl Iterator<Item = &Asset> {
    self.entries.values().filter_map(Entry::as_asset)
  }

  /// True when `reference` resolves within this registry or is the
  /// filesystem root sentinel.
  pub fn resolves(&self, reference: &str) -> bool {
    reference == ROOT_SENTINEL || self.entries.contains_key(reference)
  }
}
