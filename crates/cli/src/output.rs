//! CLI output and error reporting.
//!
//! Result paths go to stdout, one per line, so they can be piped. Logs and
//! errors go to stderr.

use std::path::Path;
use std::process::ExitCode;

use owo_colors::{OwoColorize, Stream};
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the log filter derived from `-v`.
pub const LOG_ENV: &str = "SCIENCE_LOG";

/// Process-wide reporting state, created once at startup.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
  verbose: u8,
}

impl Reporter {
  /// Install the tracing subscriber and return the reporter.
  pub fn init(verbose: u8) -> Self {
    let level = match verbose {
      0 => "warn",
      1 => "info",
      _ => "debug",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
      .with_env_filter(filter)
      .with_writer(std::io::stderr)
      .without_time()
      .init();
    Self { verbose }
  }

  pub fn print_path(&self, path: &Path) {
    println!("{}", path.display());
  }

  /// Print `err` to stderr and return the failure exit code.
  ///
  /// Input errors get a single red line unless verbose. Anything else is
  /// printed with its full cause chain and category first.
  pub fn report(&self, err: &anyhow::Error) -> ExitCode {
    let lib_error = err
      .chain()
      .find_map(|cause| cause.downcast_ref::<science_lib::Error>());

    match lib_error {
      Some(input) if input.is_input_error() => {
        if self.verbose > 0 {
          print_trace(err, input.category());
        }
        print_error(&input.to_string());
      }
      Some(other) => {
        print_trace(err, other.category());
        print_error(&format!("{err:#}"));
      }
      None => {
        print_trace(err, "Unexpected");
        print_error(&format!("{err:#}"));
      }
    }
    ExitCode::FAILURE
  }
}

fn print_trace(err: &anyhow::Error, category: &str) {
  let trace = format!("{err:?}");
  eprintln!("{}", trace.if_supports_color(Stream::Stderr, |s| s.yellow()));
  let category = format!("Error category: {category}");
  eprintln!("{}", category.if_supports_color(Stream::Stderr, |s| s.yellow()));
}

fn print_error(message: &str) {
  eprintln!("{}", message.if_supports_color(Stream::Stderr, |s| s.red()));
}
