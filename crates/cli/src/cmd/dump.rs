use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use assetlog_lib::export::export_registry;
use assetlog_lib::registry::build;

use crate::output::print_json;

#[derive(Args, Debug)]
pub struct DumpArgs {
  /// Path to a checked-out inventory tree
  #[arg(default_value = ".")]
  pub tree: PathBuf,
}

pub fn cmd_dump(args: DumpArgs) -> Result<()> {
  let registry = build(&args.tree)
    .with_context(|| format!("failed to read inventory tree at {}", args.tree.display()))?;

  print_json(&export_registry(&registry))
}
