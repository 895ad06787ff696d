use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use assetlog_lib::extract;

use crate::output::{print_info, print_stat, print_success};

#[derive(Args, Debug)]
pub struct ExtractArgs {
  /// Path to the inventory git repository
  #[arg(default_value = ".")]
  pub repo: PathBuf,

  /// Directory the changeset log is written to
  #[arg(short, long, default_value = "changesets")]
  pub out: PathBuf,
}

pub fn cmd_extract(args: ExtractArgs) -> Result<()> {
  print_info(&format!(
    "Extracting history from {} into {}",
    args.repo.display(),
    args.out.display()
  ));

  let summary = extract::run(&args.repo, &args.out).context("extraction failed")?;

  print_stat("revisions", &summary.revisions_seen.to_string());
  print_stat("merges skipped", &summary.merges_skipped.to_string());
  print_stat("no-op revisions", &summary.no_op_revisions.to_string());
  print_stat("changesets", &summary.changesets_written.to_string());
  print_stat("events", &summary.events_emitted.to_string());
  print_success(&format!(
    "Wrote {} changeset(s), {} event(s) total",
    summary.changesets_written, summary.events_emitted
  ));

  Ok(())
}
