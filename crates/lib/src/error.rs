//! Error types for science-lib.
//!
//! Errors fall into two camps: input errors the user can fix by changing the
//! configuration or command line, and everything else. The CLI prints input
//! errors tersely and everything else with its full diagnostic chain.

use std::path::PathBuf;

use semver::Version;
use thiserror::Error;

/// Errors that can occur while exporting or building scies.
#[derive(Debug, Error)]
pub enum Error {
  /// A `--file` value did not contain an `=` separator.
  #[error("Invalid file mapping. A file mapping must be of the form `(<name>|<key>)=<path>`: {0}")]
  InvalidFileMapping(String),

  /// A local file was neither mapped nor present in the working directory.
  #[error(
    "The file for {id} is not mapped or cannot be found at {} relative to the cwd of {}.",
    .path.display(),
    .cwd.display()
  )]
  MissingFile { id: String, path: PathBuf, cwd: PathBuf },

  /// A resolved file does not match its declared digest.
  #[error(
    "The {} file has size {actual_size} and fingerprint {actual_fingerprint} but was expected to have size {expected_size} and fingerprint {expected_fingerprint}.",
    .path.display()
  )]
  DigestMismatch {
    path: PathBuf,
    expected_size: u64,
    expected_fingerprint: String,
    actual_size: u64,
    actual_fingerprint: String,
  },

  /// Two files in one export share an identifier.
  #[error("The file id {0} is used by more than one file.")]
  DuplicateFileId(String),

  /// The configured scie-jump predates cross-building support.
  #[error("A scie-jump version of {requested} was requested but science requires at least {minimum}.")]
  UnsupportedJumpVersion { requested: Version, minimum: Version },

  /// The lift configuration could not be parsed or validated.
  #[error("Invalid lift configuration {source_name}: {message}")]
  InvalidConfig { source_name: String, message: String },

  /// A custom scie-jump path does not exist.
  #[error("The custom scie-jump at {} does not exist.", .0.display())]
  MissingJump(PathBuf),

  /// The host is not one of the supported scie platforms.
  #[error("The current platform ({os}-{arch}) is not supported.")]
  UnsupportedPlatform { os: &'static str, arch: &'static str },

  /// HTTP request failed.
  #[error("fetch failed for {url}: {message}")]
  FetchFailed { url: String, message: String },

  /// SHA256 fingerprint mismatch after download.
  #[error("fingerprint mismatch for {url}: expected {expected}, got {actual}")]
  FingerprintMismatch {
    url: String,
    expected: String,
    actual: String,
  },

  /// The scie-jump exited unsuccessfully.
  #[error("scie-jump failed with exit code {code:?} packing {}", .manifest.display())]
  PackerFailed { manifest: PathBuf, code: Option<i32> },

  /// The scie-jump exited successfully but left no binary behind.
  #[error("scie-jump did not produce the expected binary at {}", .0.display())]
  PackerOutputMissing(PathBuf),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

impl Error {
  /// Returns true for errors the user can correct by changing their inputs.
  pub fn is_input_error(&self) -> bool {
    matches!(
      self,
      Error::InvalidFileMapping(_)
        | Error::MissingFile { .. }
        | Error::DigestMismatch { .. }
        | Error::DuplicateFileId(_)
        | Error::UnsupportedJumpVersion { .. }
        | Error::InvalidConfig { .. }
        | Error::MissingJump(_)
        | Error::UnsupportedPlatform { .. }
    )
  }

  /// A stable name for the kind of error, shown alongside unexpected failures.
  pub fn category(&self) -> &'static str {
    match self {
      Error::InvalidFileMapping(_) => "InvalidFileMapping",
      Error::MissingFile { .. } => "MissingFile",
      Error::DigestMismatch { .. } => "DigestMismatch",
      Error::DuplicateFileId(_) => "DuplicateFileId",
      Error::UnsupportedJumpVersion { .. } => "UnsupportedJumpVersion",
      Error::InvalidConfig { .. } => "InvalidConfig",
      Error::MissingJump(_) => "MissingJump",
      Error::UnsupportedPlatform { .. } => "UnsupportedPlatform",
      Error::FetchFailed { .. } => "FetchFailed",
      Error::FingerprintMismatch { .. } => "FingerprintMismatch",
      Error::PackerFailed { .. } => "PackerFailed",
      Error::PackerOutputMissing(_) => "PackerOutputMissing",
      Error::Io(_) => "Io",
      Error::Json(_) => "Json",
    }
  }
}

/// Result type for science-lib operations.
pub type Result<T> = std::result::Result<T, Error>;
