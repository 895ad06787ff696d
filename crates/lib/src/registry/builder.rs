//! Registry construction from one tree snapshot.
//!
//! Walks a materialized snapshot and registers every file or directory
//! whose name follows the identifier pattern. A directory becomes an
//! asset through its `info` metadata file; any other matching file is an
//! asset by itself, with its content as the metadata blob. Grouping
//! directories become [`Location`] entries, with chains of single-child
//! directories collapsed away.
//!
//! After the walk, location parents are resolved bottom-up to a fixed
//! point (parents are discovered lazily, so a multi-level hierarchy can
//! take several passes to materialize), then entries whose location
//! reference still does not resolve are dropped with a warning.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::consts::{MAX_RESOLVE_PASSES, METADATA_FILENAME, ROOT_SENTINEL, SKIP_NAMES};

use super::pattern::parse_name;
use super::types::{Asset, AssetData, AssetRegistry, Entry, Location};

/// Errors that can occur while building a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
  /// Failure while walking the snapshot tree.
  #[error("failed to walk snapshot tree: {0}")]
  Walk(#[from] walkdir::Error),

  /// Failure reading a file or directory inside the snapshot.
  #[error("failed to read '{path}': {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The parent-resolution loop failed to reach a fixed point.
  #[error("location parent resolution did not settle after {passes} passes")]
  ResolveOverflow { passes: usize },
}

/// Build the registry for the snapshot rooted at `tree_root`.
pub fn build(tree_root: &Path) -> Result<AssetRegistry, RegistryError> {
  let mut entries: BTreeMap<String, Entry> = BTreeMap::new();

  let walker = WalkDir::new(tree_root)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|entry| {
      let name = entry.file_name().to_string_lossy();
      !SKIP_NAMES.contains(&name.as_ref())
    });

  for entry in walker {
    let entry = entry?;
    if !entry.file_type().is_file() {
      continue;
    }
    register_file(tree_root, entry.path(), &mut entries)?;
  }

  resolve_location_parents(tree_root, &mut entries)?;
  drop_dangling(&mut entries);

  Ok(AssetRegistry { entries })
}

/// Register the asset (if any) described by one file.
fn register_file(
  root: &Path,
  path: &Path,
  entries: &mut BTreeMap<String, Entry>,
) -> Result<(), RegistryError> {
  let Some(parent) = path.parent() else {
    return Ok(());
  };
  let file_name = path.file_name().unwrap_or_default().to_string_lossy();

  // An `info` file carries metadata for its containing directory; the
  // directory is the asset. Any other file is an asset of its own.
  let (asset_name, location_dir) = if file_name == METADATA_FILENAME {
    let Some(grandparent) = parent.parent() else {
      return Ok(());
    };
    let dir_name = parent.file_name().unwrap_or_default().to_string_lossy();
    (dir_name.into_owned(), grandparent)
  } else {
    (file_name.into_owned(), parent)
  };

  let Some(parsed) = parse_name(&asset_name) else {
    return Ok(());
  };

  let location_dir_name = location_dir
    .file_name()
    .unwrap_or_default()
    .to_string_lossy();
  let location_ref = if location_dir != root
    && let Some(container) = parse_name(&location_dir_name)
  {
    // Asset nested inside another asset: reference the container's code.
    container.code.to_string()
  } else {
    let location_path = relative_id(root, location_dir);
    if location_path != ROOT_SENTINEL && !entries.contains_key(&location_path) {
      let parent_ref = collapse_parent(root, location_dir)?;
      entries.insert(
        location_path.clone(),
        Entry::Location(Location {
          path: location_path.clone(),
          parent_ref,
        }),
      );
    }
    location_path
  };

  if entries.contains_key(parsed.code) {
    warn!(
      code = parsed.code,
      path = %path.display(),
      "duplicate asset code in snapshot, keeping first occurrence"
    );
    return Ok(());
  }

  let bytes = fs::read(path).map_err(|e| RegistryError::Io {
    path: path.to_path_buf(),
    source: e,
  })?;

  entries.insert(
    parsed.code.to_string(),
    Entry::Asset(Asset {
      code: parsed.code.to_string(),
      asset_type: parsed.asset_type.to_string(),
      location_ref,
      data: parse_metadata(&bytes),
    }),
  );

  Ok(())
}

/// Parse a metadata blob. Anything that is not a YAML mapping, including
/// content that fails to parse at all, degrades to an empty mapping.
fn parse_metadata(bytes: &[u8]) -> AssetData {
  match serde_yaml::from_slice::<serde_yaml::Value>(bytes) {
    Ok(serde_yaml::Value::Mapping(mapping)) => mapping
      .into_iter()
      .filter_map(|(key, value)| Some((key.as_str()?.to_string(), value)))
      .collect(),
    Ok(_) | Err(_) => AssetData::new(),
  }
}

/// Synthesize parents for locations until no pass adds a new entry.
fn resolve_location_parents(
  root: &Path,
  entries: &mut BTreeMap<String, Entry>,
) -> Result<(), RegistryError> {
  let mut passes = 0;
  loop {
    let missing: Vec<String> = entries
      .values()
      .filter_map(|entry| match entry {
        Entry::Location(location)
          if location.parent_ref != ROOT_SENTINEL && !entries.contains_key(&location.parent_ref) =>
        {
          Some(location.parent_ref.clone())
        }
        _ => None,
      })
      .collect();

    if missing.is_empty() {
      return Ok(());
    }

    passes += 1;
    if passes > MAX_RESOLVE_PASSES {
      return Err(RegistryError::ResolveOverflow { passes });
    }
    debug!(pass = passes, missing = missing.len(), "synthesizing location parents");

    for parent_path in missing {
      if entries.contains_key(&parent_path) {
        continue;
      }
      let parent_ref = collapse_parent(root, &root.join(&parent_path))?;
      entries.insert(
        parent_path.clone(),
        Entry::Location(Location {
          path: parent_path,
          parent_ref,
        }),
      );
    }
  }
}

/// Remove entries whose location reference does not resolve.
fn drop_dangling(entries: &mut BTreeMap<String, Entry>) {
  let dangling: Vec<String> = entries
    .iter()
    .filter(|(_, entry)| {
      let reference = entry.location_ref();
      reference != ROOT_SENTINEL && !entries.contains_key(reference)
    })
    .map(|(id, _)| id.clone())
    .collect();

  for id in dangling {
    warn!(id = %id, "dropping entry with unresolvable location reference");
    entries.remove(&id);
  }
}

/// Nearest ancestor of `dir` that holds more than one entry, as a
/// registry identifier. Single-child ancestors convey no branching
/// information and are skipped.
fn collapse_parent(root: &Path, dir: &Path) -> Result<String, RegistryError> {
  let mut current = dir.parent();
  while let Some(ancestor) = current {
    if ancestor == root || !ancestor.starts_with(root) {
      return Ok(ROOT_SENTINEL.to_string());
    }
    let children = fs::read_dir(ancestor)
      .map_err(|e| RegistryError::Io {
        path: ancestor.to_path_buf(),
        source: e,
      })?
      .count();
    if children != 1 {
      return Ok(relative_id(root, ancestor));
    }
    current = ancestor.parent();
  }
  Ok(ROOT_SENTINEL.to_string())
}

/// Identifier of a directory: its path relative to the snapshot root,
/// slash-joined, or the root sentinel for the root itself.
fn relative_id(root: &Path, dir: &Path) -> String {
  let relative = dir.strip_prefix(root).unwrap_or(dir);
  let parts: Vec<String> = relative
    .components()
    .map(|c| c.as_os_str().to_string_lossy().into_owned())
    .collect();
  if parts.is_empty() {
    ROOT_SENTINEL.to_string()
  } else {
    parts.join("/")
  }
}
