//! Crate-wide constants.

/// Site prefix every asset code starts with.
pub const SITE_PREFIX: &str = "sr";

/// Directory and file names ignored during a snapshot walk.
pub const SKIP_NAMES: &[&str] = &[".git", ".github", ".meta", ".gitattributes", ".mailmap"];

/// Name of the metadata file that promotes its containing directory to an asset.
pub const METADATA_FILENAME: &str = "info";

/// Location reference of entries sitting at the top of the tree.
pub const ROOT_SENTINEL: &str = ".";

/// Upper bound on parent-resolution passes before the registry build is aborted.
pub const MAX_RESOLVE_PASSES: usize = 1000;
