use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use assetlog_lib::registry::build;

use crate::output::print_info;

#[derive(Args, Debug)]
pub struct KeysArgs {
  /// Path to a checked-out inventory tree
  #[arg(default_value = ".")]
  pub tree: PathBuf,
}

/// Print each distinct metadata key once, with the asset it was first
/// seen on.
pub fn cmd_keys(args: KeysArgs) -> Result<()> {
  let registry = build(&args.tree)
    .with_context(|| format!("failed to read inventory tree at {}", args.tree.display()))?;

  let mut seen: BTreeSet<&str> = BTreeSet::new();
  for asset in registry.assets() {
    for key in asset.data.keys() {
      if seen.insert(key.as_str()) {
        println!("{} {} {}", key, asset.code, asset.location_ref);
      }
    }
  }

  print_info(&format!("{} distinct key(s)", seen.len()));
  Ok(())
}
