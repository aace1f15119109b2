//! The staging root builds export into.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::info;

use crate::error::Result;

/// A temporary staging directory, removed on drop unless preserved.
#[derive(Debug)]
pub enum Sandbox {
  Scoped(TempDir),
  Preserved(PathBuf),
}

impl Sandbox {
  pub fn new(preserve: bool) -> Result<Self> {
    let dir = tempfile::Builder::new().prefix("science-").tempdir()?;
    if preserve {
      let path = dir.keep();
      info!(path = ?path, "preserving sandbox");
      Ok(Self::Preserved(path))
    } else {
      Ok(Self::Scoped(dir))
    }
  }

  pub fn path(&self) -> &Path {
    match self {
      Self::Scoped(dir) => dir.path(),
      Self::Preserved(path) => path,
    }
  }
}
