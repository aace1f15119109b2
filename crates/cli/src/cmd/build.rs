//! Implementation of the `science build` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use clap::builder::{PossibleValuesParser, TypedValueParser};

use science_lib::build::{BuildOptions, HashAlgorithm, build};
use science_lib::config;
use science_lib::consts::DEFAULT_CONFIG_NAME;
use science_lib::fetch::HttpFetcher;

use super::parse_file_mappings;
use crate::output::Reporter;

/// `--hash` values, listed in help from [`HashAlgorithm::ALL`].
fn hash_algorithm_parser() -> impl TypedValueParser<Value = HashAlgorithm> {
  PossibleValuesParser::new(HashAlgorithm::ALL.map(|algorithm| algorithm.as_str()))
    .try_map(|value| value.parse::<HashAlgorithm>())
}

#[derive(Args)]
pub struct BuildArgs {
  /// Path to the lift configuration file
  #[arg(default_value = DEFAULT_CONFIG_NAME)]
  config: PathBuf,

  /// Where to find a local file: `<name or key>=<path>` (repeatable; SCIENCE_BUILD_FILE takes whitespace
  /// separated mappings)
  #[arg(long = "file", value_name = "ID=PATH")]
  files: Vec<String>,

  /// Directory to write binaries into [default: current directory]
  #[arg(long, env = "SCIENCE_BUILD_DEST_DIR")]
  dest_dir: Option<PathBuf>,

  /// Keep the export sandbox for inspection
  #[arg(long, env = "SCIENCE_BUILD_PRESERVE_SANDBOX")]
  preserve_sandbox: bool,

  /// Pack with a custom scie-jump binary; restricts the build to the current platform
  #[arg(long, value_name = "PATH", env = "SCIENCE_BUILD_USE_JUMP")]
  use_jump: Option<PathBuf>,

  /// Record which science produced each scie
  #[arg(long, env = "SCIENCE_BUILD_INCLUDE_PROVENANCE")]
  include_provenance: bool,

  /// Write a `<binary>.<algorithm>` checksum file (repeatable; space separated in SCIENCE_BUILD_HASH)
  #[arg(
    long = "hash",
    value_name = "ALGORITHM",
    value_parser = hash_algorithm_parser(),
    value_delimiter = ' ',
    env = "SCIENCE_BUILD_HASH"
  )]
  hash_algorithms: Vec<HashAlgorithm>,

  /// Always name binaries `<name>-<platform>`
  #[arg(long, env = "SCIENCE_BUILD_USE_PLATFORM_SUFFIX")]
  use_platform_suffix: bool,
}

/// Build a scie per platform and print each binary path.
pub fn cmd_build(args: BuildArgs, reporter: &Reporter) -> Result<()> {
  let file_mappings = parse_file_mappings(&args.files, "SCIENCE_BUILD_FILE")?;
  let application = config::load(&args.config)?;
  let dest_dir = match args.dest_dir {
    Some(dest_dir) => dest_dir,
    None => std::env::current_dir().context("Failed to determine the current directory")?,
  };
  let options = BuildOptions {
    preserve_sandbox: args.preserve_sandbox,
    use_jump: args.use_jump,
    include_provenance: args.include_provenance,
    hash_algorithms: args.hash_algorithms,
    use_platform_suffix: args.use_platform_suffix,
  };

  let fetcher = HttpFetcher::new();
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  rt.block_on(build(&application, &file_mappings, &dest_dir, &options, &fetcher, |_, binary| {
    reporter.print_path(binary)
  }))
  .with_context(|| format!("Failed to build {}", application.name))?;
  Ok(())
}
