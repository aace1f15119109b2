//! science: ship interpreted applications as scies.

mod cmd;
mod output;

use std::process::ExitCode;

use clap::{ArgAction, CommandFactory, FromArgMatches, Parser, Subcommand};

use output::Reporter;

/// Ship your interpreted executables using science.
#[derive(Parser)]
#[command(name = "science")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Increase verbosity: -v for info logging, -vv for debug
  #[arg(short, long, global = true, action = ArgAction::Count)]
  verbose: u8,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Export the application as one lift manifest sandbox per platform
  Export(cmd::ExportArgs),

  /// Build the application executable(s)
  Build(cmd::BuildArgs),
}

fn main() -> ExitCode {
  // Set by the scie-jump to the name the scie was invoked as
  let mut command = Cli::command();
  if let Ok(argv0) = std::env::var("SCIE_ARGV0") {
    command = command.bin_name(argv0);
  }
  let cli = Cli::from_arg_matches(&command.get_matches()).unwrap_or_else(|e| e.exit());

  let reporter = Reporter::init(cli.verbose);
  let result = match cli.command {
    Commands::Export(args) => cmd::cmd_export(args, &reporter),
    Commands::Build(args) => cmd::cmd_build(args, &reporter),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => reporter.report(&err),
  }
}
