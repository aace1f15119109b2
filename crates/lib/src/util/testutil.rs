//! Test utilities for science-lib.
//!
//! Offline stand-ins for the network and the scie-jump so the export and build
//! pipelines can be exercised end to end.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::util::hash::hash_bytes;

/// A [`Fetcher`] serving URLs from files written into a directory.
pub struct StaticFetcher {
  root: PathBuf,
  files: BTreeMap<String, PathBuf>,
  requests: RefCell<Vec<String>>,
}

impl StaticFetcher {
  pub fn new(root: &Path) -> Self {
    Self {
      root: root.to_path_buf(),
      files: BTreeMap::new(),
      requests: RefCell::new(Vec::new()),
    }
  }

  /// Serve `content` at `url`.
  pub fn serve(mut self, url: &str, content: &[u8]) -> Self {
    let path = self.root.join(format!("served-{}", self.files.len()));
    fs::write(&path, content).unwrap();
    self.files.insert(url.to_string(), path);
    self
  }

  /// Serve `content` at `url` and its sha256 at `<url>.sha256`, like a release asset.
  pub fn serve_release(self, url: &str, content: &[u8]) -> Self {
    let checksum = format!("{}  {}\n", hash_bytes(content), url.rsplit('/').next().unwrap());
    self.serve(url, content).serve(&format!("{url}.sha256"), checksum.as_bytes())
  }

  /// Every URL fetched so far, in order.
  pub fn requests(&self) -> Vec<String> {
    self.requests.borrow().clone()
  }
}

impl Fetcher for StaticFetcher {
  async fn fetch(&self, url: &str, fingerprint: Option<&str>, executable: bool) -> Result<PathBuf> {
    self.requests.borrow_mut().push(url.to_string());
    let path = self.files.get(url).cloned().ok_or_else(|| Error::FetchFailed {
      url: url.to_string(),
      message: "HTTP 404 Not Found".to_string(),
    })?;
    if let Some(expected) = fingerprint {
      let actual = hash_bytes(&fs::read(&path)?);
      if actual != expected {
        return Err(Error::FingerprintMismatch {
          url: url.to_string(),
          expected: expected.to_string(),
          actual,
        });
      }
    }
    #[cfg(unix)]
    if executable {
      use std::os::unix::fs::PermissionsExt;
      fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    }
    #[cfg(not(unix))]
    let _ = executable;
    Ok(path)
  }
}

/// Write an executable shell script standing in for the scie-jump.
///
/// Invoked as `<jump> -sj <embedded jump> <lift.json>`, it copies the manifest
/// to `binary_name` in its working directory, or exits with `exit_code` if
/// non-zero.
#[cfg(unix)]
pub fn fake_jump(dir: &Path, binary_name: &str, exit_code: i32) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let path = dir.join("fake-scie-jump");
  let script = if exit_code == 0 {
    format!("#!/bin/sh\n[ \"$1\" = \"-sj\" ] || exit 64\ncat \"$3\" > \"{binary_name}\"\n")
  } else {
    format!("#!/bin/sh\nexit {exit_code}\n")
  };
  fs::write(&path, script).unwrap();
  fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
  path
}
