//! Snapshot registry: entry types, the identifier pattern, and the
//! tree walk that turns one snapshot into an [`AssetRegistry`].

mod builder;
mod pattern;
mod types;

pub use builder::{RegistryError, build};
pub use pattern::{ParsedName, parse_name};
pub use types::{Asset, AssetData, AssetRegistry, Entry, Location};
