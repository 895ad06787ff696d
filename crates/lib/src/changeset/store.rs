//! Changeset log storage.
//!
//! One YAML file per emitted changeset, named by the revision's
//! timestamp and hash:
//!
//! ```text
//! {out_dir}/
//! ├── 2021-06-01T12:00:00-1f6e1c2….yaml
//! └── 2021-06-03T09:15:41-8bb7e30….yaml
//! ```
//!
//! Writes go through a temp file and rename, so re-deriving the log
//! from the same history overwrites each file with identical bytes
//! instead of corrupting or duplicating it.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use super::types::{ChangeSet, ChangesetError};

/// Append-only changeset log on disk.
#[derive(Debug, Clone)]
pub struct ChangesetStore {
  base_path: PathBuf,
}

impl ChangesetStore {
  pub fn new(base_path: PathBuf) -> Self {
    Self { base_path }
  }

  pub fn base_path(&self) -> &PathBuf {
    &self.base_path
  }

  /// File name for a changeset: ISO8601 timestamp plus revision hash.
  fn changeset_path(&self, changeset: &ChangeSet, revision_hash: &str) -> PathBuf {
    let stamp = changeset.timestamp.format("%Y-%m-%dT%H:%M:%S");
    self.base_path.join(format!("{stamp}-{revision_hash}.yaml"))
  }

  /// Write one changeset to the log.
  ///
  /// Returns the path written. Rewriting the same changeset is
  /// idempotent.
  pub fn write(&self, changeset: &ChangeSet, revision_hash: &str) -> Result<PathBuf, ChangesetError> {
    fs::create_dir_all(&self.base_path)
      .map_err(|e| ChangesetError::CreateDir(self.base_path.clone(), e))?;

    let path = self.changeset_path(changeset, revision_hash);
    let temp_path = path.with_extension("yaml.tmp");

    let content = serde_yaml::to_string(changeset)?;
    fs::write(&temp_path, &content).map_err(|e| ChangesetError::Write(temp_path.clone(), e))?;
    fs::rename(&temp_path, &path).map_err(|e| ChangesetError::Write(path.clone(), e))?;

    debug!(path = %path.display(), events = changeset.events.len(), "wrote changeset");
    Ok(path)
  }
}
