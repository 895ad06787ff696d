//! Revision enumeration and tree materialization.
//!
//! Opens the inventory's git repository, lists the commits reachable
//! from `HEAD` oldest first, and writes a commit's tree out to a
//! scratch directory for the registry builder to walk. Merge commits
//! are reported with their parent count so the pipeline can skip them.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while reading the source history.
#[derive(Debug, Error)]
pub enum HistoryError {
  /// Failed to open the repository.
  #[error("failed to open repository at '{path}': {source}")]
  Open {
    path: PathBuf,
    #[source]
    source: Box<gix::open::Error>,
  },

  /// Failed to resolve HEAD.
  #[error("failed to resolve HEAD: {0}")]
  ResolveHead(String),

  /// Failed to walk the commit graph.
  #[error("failed to walk history: {0}")]
  Walk(String),

  /// Failed to read an object from the repository.
  #[error("failed to read object '{id}': {source}")]
  ReadObject {
    id: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// A commit carries a timestamp outside the representable range.
  #[error("commit '{id}' has an out-of-range timestamp")]
  Timestamp { id: String },

  /// Failed to write part of a materialized tree.
  #[error("failed to write tree entry '{path}': {source}")]
  WriteTree {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// One revision of the inventory history.
#[derive(Debug, Clone, PartialEq)]
pub struct Revision {
  /// Full commit hash.
  pub hash: String,
  /// Author email.
  pub author: String,
  /// First line of the commit message.
  pub summary: String,
  /// Commit time, UTC.
  pub timestamp: DateTime<Utc>,
  /// Number of parent commits.
  pub parent_count: usize,
}

impl Revision {
  /// Merge revisions are skipped, never diffed.
  pub fn is_merge(&self) -> bool {
    self.parent_count > 1
  }
}

/// Git-backed revision source.
pub struct RevisionSource {
  repo: gix::Repository,
}

impl RevisionSource {
  /// Open the repository at `path`.
  pub fn open(path: &Path) -> Result<Self, HistoryError> {
    let repo = gix::open(path).map_err(|e| HistoryError::Open {
      path: path.to_path_buf(),
      source: Box::new(e),
    })?;
    Ok(Self { repo })
  }

  /// List the revisions reachable from HEAD, oldest first.
  pub fn revisions(&self) -> Result<Vec<Revision>, HistoryError> {
    let head_id = self
      .repo
      .head_id()
      .map_err(|e| HistoryError::ResolveHead(e.to_string()))?;

    let walk = self
      .repo
      .rev_walk([head_id.detach()])
      .all()
      .map_err(|e| HistoryError::Walk(e.to_string()))?;

    let mut revisions = Vec::new();
    for info in walk {
      let info = info.map_err(|e| HistoryError::Walk(e.to_string()))?;
      let commit = self.repo.find_commit(info.id).map_err(|e| HistoryError::ReadObject {
        id: info.id.to_string(),
        source: Box::new(e),
      })?;
      revisions.push(read_revision(&commit)?);
    }

    revisions.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    debug!(revisions = revisions.len(), "enumerated history");
    Ok(revisions)
  }

  /// Write the tree of `revision` into `dest`.
  pub fn materialize(&self, revision: &Revision, dest: &Path) -> Result<(), HistoryError> {
    let id = gix::ObjectId::from_hex(revision.hash.as_bytes()).map_err(|e| {
      HistoryError::ReadObject {
        id: revision.hash.clone(),
        source: Box::new(e),
      }
    })?;
    let commit = self.repo.find_commit(id).map_err(|e| HistoryError::ReadObject {
      id: revision.hash.clone(),
      source: Box::new(e),
    })?;
    let tree = commit.tree().map_err(|e| HistoryError::ReadObject {
      id: revision.hash.clone(),
      source: Box::new(e),
    })?;

    fs::create_dir_all(dest).map_err(|e| HistoryError::WriteTree {
      path: dest.to_path_buf(),
      source: e,
    })?;
    write_tree(&tree, dest)?;
    debug!(hash = %revision.hash, dest = %dest.display(), "materialized tree");
    Ok(())
  }
}

fn read_revision(commit: &gix::Commit<'_>) -> Result<Revision, HistoryError> {
  let id = commit.id.to_string();

  let author = commit.author().map_err(|e| HistoryError::ReadObject {
    id: id.clone(),
    source: Box::new(e),
  })?;
  let time = commit.time().map_err(|e| HistoryError::ReadObject {
    id: id.clone(),
    source: Box::new(e),
  })?;
  let timestamp =
    DateTime::from_timestamp(time.seconds, 0).ok_or(HistoryError::Timestamp { id: id.clone() })?;
  let message = commit.message().map_err(|e| HistoryError::ReadObject {
    id: id.clone(),
    source: Box::new(e),
  })?;

  Ok(Revision {
    author: author.email.to_string(),
    summary: message.summary().to_string(),
    timestamp,
    parent_count: commit.parent_ids().count(),
    hash: id,
  })
}

/// Recursively write a tree's blobs and subtrees under `dest`.
///
/// Symlinks and submodules do not occur in inventory trees and are
/// ignored.
fn write_tree(tree: &gix::Tree<'_>, dest: &Path) -> Result<(), HistoryError> {
  for entry in tree.iter() {
    let entry = entry.map_err(|e| HistoryError::ReadObject {
      id: tree.id.to_string(),
      source: Box::new(e),
    })?;
    let name = gix::path::from_bstr(entry.filename()).into_owned();
    let path = dest.join(name);

    if entry.mode().is_tree() {
      let object = entry.object().map_err(|e| HistoryError::ReadObject {
        id: entry.oid().to_string(),
        source: Box::new(e),
      })?;
      let subtree = object.try_into_tree().map_err(|e| HistoryError::ReadObject {
        id: entry.oid().to_string(),
        source: Box::new(e),
      })?;
      fs::create_dir_all(&path).map_err(|e| HistoryError::WriteTree {
        path: path.clone(),
        source: e,
      })?;
      write_tree(&subtree, &path)?;
    } else if entry.mode().is_blob() {
      let object = entry.object().map_err(|e| HistoryError::ReadObject {
        id: entry.oid().to_string(),
        source: Box::new(e),
      })?;
      fs::write(&path, &object.data).map_err(|e| HistoryError::WriteTree {
        path: path.clone(),
        source: e,
      })?;
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn merge_detection() {
    let revision = Revision {
      hash: "abc".to_string(),
      author: "a@example.org".to_string(),
      summary: "merge branch".to_string(),
      timestamp: Utc::now(),
      parent_count: 2,
    };
    assert!(revision.is_merge());

    let root = Revision {
      parent_count: 0,
      ..revision.clone()
    };
    assert!(!root.is_merge());
  }

  #[test]
  fn open_missing_repository_fails() {
    let result = RevisionSource::open(Path::new("/nonexistent/assetlog-test-repo"));
    assert!(matches!(result, Err(HistoryError::Open { .. })));
  }

  // NOTE: enumeration and materialization need a real repository with
  // commit objects; they are exercised end-to-end through the CLI
  // against the inventory history itself.
}
