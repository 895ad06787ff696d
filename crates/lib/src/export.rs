//! Export-side schema mapping.
//!
//! The core pipeline carries metadata untouched. Only the export path
//! narrows it down to the known key set and folds aliases in, as a pure
//! mapping over the registry.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::registry::{AssetData, AssetRegistry, Entry};

/// Metadata keys preserved by the export mapping.
pub const EXPORT_KEYS: &[&str] = &[
  "mac_address",
  "development",
  "description",
  "revision",
  "physical_condition",
  "bootloader_version",
  "supplier",
  "part_number",
  "labelled",
  "condition",
  "value",
];

/// Renames applied after filtering: source key to exported key.
pub const EXPORT_ALIASES: &[(&str, &str)] = &[("mac", "mac_address"), ("serial", "serial_number")];

/// Filter metadata down to the allowlist and fold aliases in.
pub fn export_data(data: &AssetData) -> AssetData {
  let mut exported: AssetData = data
    .iter()
    .filter(|(key, _)| EXPORT_KEYS.contains(&key.as_str()))
    .map(|(key, value)| (key.clone(), value.clone()))
    .collect();

  for (source, target) in EXPORT_ALIASES {
    if let Some(value) = data.get(*source) {
      exported.insert((*target).to_string(), value.clone());
    }
  }

  exported
}

/// One registry entry in the dump representation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExportedEntry {
  Asset {
    asset_code: String,
    asset_type: String,
    location: String,
    data: AssetData,
  },
  Location {
    path: String,
    location: String,
  },
}

/// Export a full registry, keyed by identifier.
pub fn export_registry(registry: &AssetRegistry) -> BTreeMap<String, ExportedEntry> {
  registry
    .entries
    .iter()
    .map(|(id, entry)| {
      let exported = match entry {
        Entry::Asset(asset) => ExportedEntry::Asset {
          asset_code: asset.code.clone(),
          asset_type: asset.asset_type.clone(),
          location: asset.location_ref.clone(),
          data: export_data(&asset.data),
        },
        Entry::Location(location) => ExportedEntry::Location {
          path: location.path.clone(),
          location: location.parent_ref.clone(),
        },
      };
      (id.clone(), exported)
    })
    .collect()
}
