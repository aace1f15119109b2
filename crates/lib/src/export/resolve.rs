//! File source resolution.
//!
//! Decides, per file, whether its content is supplied locally, fetched now, or
//! left for ptex to fetch when the scie runs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::model::{File, Source};
use crate::util::hash::check_digest;

/// Where a file's content ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
  /// A verified local path to link into the sandbox.
  Local(PathBuf),
  /// A URL for ptex to fetch at run time; nothing is embedded.
  Lazy(String),
}

/// Resolve `file` to a local path or a lazy URL.
///
/// Local files are looked up by id in `file_paths_by_id`, falling back to
/// `<cwd>/<name>`. Any locally resolved file carrying a digest is verified.
pub async fn resolve_file(
  file: &File,
  file_paths_by_id: &BTreeMap<String, PathBuf>,
  cwd: &Path,
  fetcher: &impl Fetcher,
) -> Result<Resolved> {
  let path = match &file.source {
    Source::Fetch { url, lazy: true } => {
      debug!(file = %file.name, url = %url, "deferring lazy fetch");
      return Ok(Resolved::Lazy(url.clone()));
    }
    Source::Fetch { url, lazy: false } => {
      let fingerprint = file.digest.as_ref().map(|digest| digest.fingerprint.as_str());
      fetcher.fetch(url, fingerprint, file.is_executable).await?
    }
    Source::Local => {
      let path = file_paths_by_id
        .get(file.id())
        .cloned()
        .unwrap_or_else(|| cwd.join(&file.name));
      if !tokio::fs::try_exists(&path).await? {
        return Err(Error::MissingFile {
          id: file.id().to_string(),
          path: path.strip_prefix(cwd).map(Path::to_path_buf).unwrap_or(path),
          cwd: cwd.to_path_buf(),
        });
      }
      path
    }
  };

  if let Some(digest) = &file.digest {
    check_digest(&path, digest).await?;
  }
  debug!(file = %file.name, path = ?path, "resolved file");
  Ok(Resolved::Local(path))
}
