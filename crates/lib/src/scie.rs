//! Acquisition of the scie binaries science builds with.
//!
//! - the scie-jump, which packs a sandbox into a scie and is embedded in it
//! - ptex, which lazily fetches files when a scie first runs
//!
//! Both are published as GitHub release assets named per platform, each with a
//! `.sha256` side-car used to verify the download.

use std::path::{Path, PathBuf};

use semver::Version;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::model::{Digest, File, JumpSpec, PtexSpec, Source};
use crate::platform::Platform;
use crate::util::hash::check_digest;

const JUMP_REPO: &str = "a-scie/jump";
const PTEX_REPO: &str = "a-scie/ptex";
const DEFAULT_PTEX_ID: &str = "ptex";

/// URL of a release asset, pinned to `version` or the latest release.
pub fn release_url(repo: &str, asset: &str, version: Option<&Version>) -> String {
  match version {
    Some(version) => format!("https://github.com/{repo}/releases/download/v{version}/{asset}"),
    None => format!("https://github.com/{repo}/releases/latest/download/{asset}"),
  }
}

/// Fetch a release asset, verifying it against `digest` or its published `.sha256`.
async fn fetch_release_asset(fetcher: &impl Fetcher, url: &str, digest: Option<&Digest>) -> Result<PathBuf> {
  let fingerprint = match digest {
    Some(digest) => digest.fingerprint.clone(),
    None => published_fingerprint(fetcher, url).await?,
  };
  let path = fetcher.fetch(url, Some(&fingerprint), true).await?;
  if let Some(digest) = digest {
    check_digest(&path, digest).await?;
  }
  Ok(path)
}

/// Read the fingerprint from the `<url>.sha256` side-car (`<hex>  <name>`).
async fn published_fingerprint(fetcher: &impl Fetcher, url: &str) -> Result<String> {
  let checksum_url = format!("{url}.sha256");
  let path = fetcher.fetch(&checksum_url, None, false).await?;
  let content = tokio::fs::read_to_string(&path).await?;
  content
    .split_whitespace()
    .next()
    .map(str::to_lowercase)
    .ok_or_else(|| Error::FetchFailed {
      url: checksum_url,
      message: "empty checksum file".to_string(),
    })
}

/// Obtain the scie-jump for `platform`.
pub async fn jump(fetcher: &impl Fetcher, spec: Option<&JumpSpec>, platform: Platform) -> Result<PathBuf> {
  let version = spec.and_then(|spec| spec.version.as_ref());
  let url = release_url(JUMP_REPO, &format!("scie-jump-{platform}"), version);
  info!(%platform, url = %url, "obtaining scie-jump");
  fetch_release_asset(fetcher, &url, spec.and_then(|spec| spec.digest.as_ref())).await
}

/// Validate a user supplied scie-jump binary.
pub async fn custom_jump(path: &Path) -> Result<PathBuf> {
  if !tokio::fs::metadata(path).await.is_ok_and(|metadata| metadata.is_file()) {
    return Err(Error::MissingJump(path.to_path_buf()));
  }
  let path = dunce::simplified(&tokio::fs::canonicalize(path).await?).to_path_buf();
  debug!(path = ?path, "using custom scie-jump");
  Ok(path)
}

/// Obtain ptex for `platform`.
///
/// Returns the file to embed along with the local path it resolves to.
pub async fn ptex(fetcher: &impl Fetcher, spec: Option<&PtexSpec>, platform: Platform) -> Result<(File, PathBuf)> {
  let name = format!("ptex-{platform}");
  let version = spec.and_then(|spec| spec.version.as_ref());
  let url = release_url(PTEX_REPO, &name, version);
  info!(%platform, url = %url, "obtaining ptex");
  let path = fetch_release_asset(fetcher, &url, spec.and_then(|spec| spec.digest.as_ref())).await?;

  let file = File {
    name,
    key: Some(
      spec
        .and_then(|spec| spec.id.clone())
        .unwrap_or_else(|| DEFAULT_PTEX_ID.to_string()),
    ),
    digest: spec.and_then(|spec| spec.digest.clone()),
    file_type: None,
    is_executable: true,
    source: Source::Local,
  };
  Ok((file, path))
}
