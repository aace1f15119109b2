//! Hashing utilities for content verification.
//!
//! This module provides:
//! - `digest_file()`: size and sha256 fingerprint of a file, streamed
//! - `check_digest()`: verifies a file against a declared [`Digest`]
//! - `hash_bytes()`: sha256 of arbitrary bytes

use std::path::Path;

use sha2::{Digest as _, Sha256};
use tokio::fs;
use tokio::io::AsyncReadExt;

use crate::consts::HASH_CHUNK_SIZE;
use crate::error::{Error, Result};
use crate::model::Digest;

/// Compute the size and sha256 fingerprint of a file's contents.
///
/// Symlinks are followed, so a staged link digests the file it points at.
pub async fn digest_file(path: &Path) -> Result<Digest> {
  let mut file = fs::File::open(path).await?;

  let mut hasher = Sha256::new();
  let mut buffer = [0u8; HASH_CHUNK_SIZE];
  let mut size = 0u64;

  loop {
    let bytes_read = file.read(&mut buffer).await?;
    if bytes_read == 0 {
      break;
    }
    size += bytes_read as u64;
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(Digest {
    size,
    fingerprint: hex::encode(hasher.finalize()),
  })
}

/// Verify that the file at `path` matches `expected` in both size and fingerprint.
pub async fn check_digest(path: &Path, expected: &Digest) -> Result<()> {
  let actual = digest_file(path).await?;
  if actual != *expected {
    return Err(Error::DigestMismatch {
      path: path.to_path_buf(),
      expected_size: expected.size,
      expected_fingerprint: expected.fingerprint.clone(),
      actual_size: actual.size,
      actual_fingerprint: actual.fingerprint,
    });
  }
  Ok(())
}

/// Hash arbitrary bytes.
///
/// Returns the full 64-character lowercase hex SHA256.
pub fn hash_bytes(data: &[u8]) -> String {
  hex::encode(Sha256::digest(data))
}
