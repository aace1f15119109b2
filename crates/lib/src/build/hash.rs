//! Checksum side-cars for built scies.
//!
//! Each requested algorithm gets a `<binary>.<algorithm>` file holding
//! `<hex digest> *<binary>`, the format `sha256sum -c` and friends accept.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use sha2::digest::DynDigest;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::consts::HASH_CHUNK_SIZE;
use crate::error::Result;

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

/// A digest algorithm available for checksum side-cars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashAlgorithm {
  Md5,
  Sha224,
  Sha256,
  Sha384,
  Sha512,
}

impl HashAlgorithm {
  pub const ALL: [HashAlgorithm; 5] = [Self::Md5, Self::Sha224, Self::Sha256, Self::Sha384, Self::Sha512];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Md5 => "md5",
      Self::Sha224 => "sha224",
      Self::Sha256 => "sha256",
      Self::Sha384 => "sha384",
      Self::Sha512 => "sha512",
    }
  }

  fn hasher(&self) -> Box<dyn DynDigest> {
    match self {
      Self::Md5 => Box::new(md5::Md5::default()),
      Self::Sha224 => Box::new(sha2::Sha224::default()),
      Self::Sha256 => Box::new(sha2::Sha256::default()),
      Self::Sha384 => Box::new(sha2::Sha384::default()),
      Self::Sha512 => Box::new(sha2::Sha512::default()),
    }
  }
}

impl fmt::Display for HashAlgorithm {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for HashAlgorithm {
  type Err = String;

  fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|algorithm| algorithm.as_str() == value)
      .ok_or_else(|| {
        format!(
          "unknown hash algorithm {value:?}, expected one of: {}",
          Self::ALL.map(|algorithm| algorithm.as_str()).join(", ")
        )
      })
  }
}

/// Write a checksum side-car next to `path` for each algorithm.
///
/// The file is read once; all digests are updated from the same chunks.
/// Existing side-cars are overwritten. Returns the side-car paths in
/// `algorithms` order.
pub async fn write_checksums(path: &Path, algorithms: &[HashAlgorithm]) -> Result<Vec<PathBuf>> {
  if algorithms.is_empty() {
    return Ok(Vec::new());
  }

  let mut hashers: Vec<(HashAlgorithm, Box<dyn DynDigest>)> =
    algorithms.iter().map(|algorithm| (*algorithm, algorithm.hasher())).collect();

  let mut file = fs::File::open(path).await?;
  let mut buffer = [0u8; HASH_CHUNK_SIZE];
  loop {
    let n = file.read(&mut buffer).await?;
    if n == 0 {
      break;
    }
    for (_, hasher) in hashers.iter_mut() {
      hasher.update(&buffer[..n]);
    }
  }

  let file_name = path
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_default();

  let mut checksums = Vec::with_capacity(hashers.len());
  for (algorithm, hasher) in hashers {
    let digest = hex::encode(hasher.finalize());
    let checksum_path = path.with_file_name(format!("{file_name}.{algorithm}"));
    fs::write(&checksum_path, format!("{digest} *{file_name}{LINE_ENDING}")).await?;
    debug!(algorithm = %algorithm, path = ?checksum_path, "wrote checksum");
    checksums.push(checksum_path);
  }
  Ok(checksums)
}
