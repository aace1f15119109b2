//! Fetch-and-verify.
//!
//! Remote files are downloaded into a local cache with optional SHA256
//! verification. The pipeline only talks to the [`Fetcher`] trait; the
//! [`HttpFetcher`] is the implementation used by the CLI.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::platform::paths;
use crate::util::hash::{digest_file, hash_bytes};

/// Downloads remote files to local paths.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
  /// Fetch `url` and return the path of a local copy.
  ///
  /// When `fingerprint` is given, the content's lowercase hex SHA256 must match
  /// it. When `executable` is set, the local copy is marked executable.
  async fn fetch(&self, url: &str, fingerprint: Option<&str>, executable: bool) -> Result<PathBuf>;
}

/// Fetches over HTTP(S) into a content cache directory.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
  client: reqwest::Client,
  cache_dir: PathBuf,
}

impl Default for HttpFetcher {
  fn default() -> Self {
    Self::new()
  }
}

impl HttpFetcher {
  /// A fetcher caching under the user's science cache directory.
  pub fn new() -> Self {
    Self::with_cache_dir(paths::cache_dir())
  }

  pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
    Self {
      client: reqwest::Client::new(),
      cache_dir: cache_dir.into(),
    }
  }

  /// Where a download of `url` is cached.
  ///
  /// Each URL gets its own directory so files with the same name from
  /// different URLs never collide.
  pub fn cache_path(&self, url: &str) -> PathBuf {
    self
      .cache_dir
      .join("downloads")
      .join(&hash_bytes(url.as_bytes())[..16])
      .join(url_to_filename(url))
  }

  async fn download(&self, url: &str) -> Result<Vec<u8>> {
    let fetch_failed = |message: String| Error::FetchFailed {
      url: url.to_string(),
      message,
    };

    let response = self
      .client
      .get(url)
      .send()
      .await
      .map_err(|e| fetch_failed(e.to_string()))?;

    if !response.status().is_success() {
      return Err(fetch_failed(format!("HTTP {}", response.status())));
    }

    let bytes = response.bytes().await.map_err(|e| fetch_failed(e.to_string()))?;
    Ok(bytes.to_vec())
  }
}

impl Fetcher for HttpFetcher {
  async fn fetch(&self, url: &str, fingerprint: Option<&str>, executable: bool) -> Result<PathBuf> {
    let dest_path = self.cache_path(url);

    // Check if file already exists with correct hash (cache hit)
    if fs::try_exists(&dest_path).await? {
      debug!(path = ?dest_path, "checking cached file");
      match fingerprint {
        None => {
          info!(path = ?dest_path, "using cached file");
          return Ok(dest_path);
        }
        Some(expected) => {
          let actual = digest_file(&dest_path).await?.fingerprint;
          if actual == expected {
            info!(path = ?dest_path, "using cached file");
            return Ok(dest_path);
          }
          debug!(expected = %expected, actual = %actual, "cached file hash mismatch, re-downloading");
        }
      }
    }

    info!(url = %url, "fetching URL");
    let bytes = self.download(url).await?;

    // Verify hash before writing
    if let Some(expected) = fingerprint {
      let actual = hash_bytes(&bytes);
      if actual != expected {
        return Err(Error::FingerprintMismatch {
          url: url.to_string(),
          expected: expected.to_string(),
          actual,
        });
      }
    }

    let parent = dest_path.parent().unwrap_or(&self.cache_dir);
    fs::create_dir_all(parent).await?;

    // Write next to the destination, then rename into place
    let partial = parent.join(format!(".{}.part", url_to_filename(url)));
    fs::write(&partial, &bytes).await?;
    if executable {
      mark_executable(&partial).await?;
    }
    fs::rename(&partial, &dest_path).await?;

    info!(path = ?dest_path, size = bytes.len(), "download complete");

    Ok(dest_path)
  }
}

#[cfg(unix)]
async fn mark_executable(path: &Path) -> Result<()> {
  use std::os::unix::fs::PermissionsExt;

  let mut permissions = fs::metadata(path).await?.permissions();
  permissions.set_mode(permissions.mode() | 0o111);
  fs::set_permissions(path, permissions).await?;
  Ok(())
}

#[cfg(not(unix))]
async fn mark_executable(_path: &Path) -> Result<()> {
  Ok(())
}

/// Convert a URL to a safe filename.
///
/// Takes the last path component and sanitizes it. Falls back to hash of URL
/// if no suitable filename can be extracted.
pub fn url_to_filename(url: &str) -> String {
  if let Some(filename) = url.rsplit('/').next() {
    // Remove query string
    let filename = filename.split('?').next().unwrap_or(filename);

    // Sanitize: only allow alphanumeric, dash, underscore, dot
    let sanitized: String = filename
      .chars()
      .map(|c| {
        if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
          c
        } else {
          '_'
        }
      })
      .collect();

    if !sanitized.is_empty() && sanitized != "." && sanitized != ".." {
      return sanitized;
    }
  }

  format!("download_{}", &hash_bytes(url.as_bytes())[..16])
}
