use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;
mod output;

/// Reconstruct asset lifecycle history from a git inventory tree.
#[derive(Parser)]
#[command(name = "assetlog")]
#[command(author, version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Replay the inventory history into a changeset log
  Extract(cmd::ExtractArgs),
  /// Dump the registry of a checked-out tree as JSON
  Dump(cmd::DumpArgs),
  /// List distinct metadata keys found in a tree
  Keys(cmd::KeysArgs),
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .without_time()
    .init();

  let cli = Cli::parse();
  match cli.command {
    Commands::Extract(args) => cmd::cmd_extract(args),
    Commands::Dump(args) => cmd::cmd_dump(args),
    Commands::Keys(args) => cmd::cmd_keys(args),
  }
}
