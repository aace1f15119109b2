//! Implementation of the `science export` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use science_lib::config;
use science_lib::consts::DEFAULT_CONFIG_NAME;
use science_lib::export::{ExportOptions, export};
use science_lib::fetch::HttpFetcher;

use super::parse_file_mappings;
use crate::output::Reporter;

#[derive(Args)]
pub struct ExportArgs {
  /// Path to the lift configuration file
  #[arg(default_value = DEFAULT_CONFIG_NAME)]
  config: PathBuf,

  /// Where to find a local file: `<name or key>=<path>` (repeatable; SCIENCE_EXPORT_FILE takes whitespace
  /// separated mappings)
  #[arg(long = "file", value_name = "ID=PATH")]
  files: Vec<String>,

  /// Directory to export platform sandboxes into [default: current directory]
  #[arg(long, env = "SCIENCE_EXPORT_DEST_DIR")]
  dest_dir: Option<PathBuf>,

  /// Replace existing platform sandboxes
  #[arg(long, env = "SCIENCE_EXPORT_FORCE")]
  force: bool,

  /// Record which science produced each manifest
  #[arg(long, env = "SCIENCE_EXPORT_INCLUDE_PROVENANCE")]
  include_provenance: bool,
}

/// Export a sandbox per platform and print each `lift.json` path.
pub fn cmd_export(args: ExportArgs, reporter: &Reporter) -> Result<()> {
  let file_mappings = parse_file_mappings(&args.files, "SCIENCE_EXPORT_FILE")?;
  let application = config::load(&args.config)?;
  let dest_dir = match args.dest_dir {
    Some(dest_dir) => dest_dir,
    None => std::env::current_dir().context("Failed to determine the current directory")?,
  };
  let options = ExportOptions {
    force: args.force,
    include_provenance: args.include_provenance,
  };

  let fetcher = HttpFetcher::new();
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  rt.block_on(export(
    &application,
    &file_mappings,
    &dest_dir,
    None,
    options,
    &fetcher,
    |platform, manifest| {
      info!(%platform, manifest = ?manifest, "exported");
      reporter.print_path(manifest);
    },
  ))
  .with_context(|| format!("Failed to export {}", application.name))?;
  Ok(())
}
