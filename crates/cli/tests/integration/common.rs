//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated test environment.
///
/// Each test gets its own temporary directory acting as the working
/// directory, with its own download cache.
pub struct TestEnv {
  pub temp: TempDir,
  pub config_path: PathBuf,
}

impl TestEnv {
  /// Create an environment whose `lift.toml` holds `config`.
  pub fn with_config(config: &str) -> Self {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("lift.toml");
    std::fs::write(&config_path, config).unwrap();
    Self { temp, config_path }
  }

  pub fn path(&self) -> &Path {
    self.temp.path()
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
  }

  /// Cache path for downloads (isolated per test).
  pub fn cache_path(&self) -> PathBuf {
    self.temp.path().join("cache")
  }

  /// Get a pre-configured Command for the science binary.
  ///
  /// Runs in the temp directory with `SCIENCE_CACHE_DIR` isolated and no
  /// `SCIENCE_LOG` override.
  pub fn science_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("science");
    cmd.current_dir(self.path());
    cmd.env("SCIENCE_CACHE_DIR", self.cache_path());
    cmd.env_remove("SCIENCE_LOG");
    cmd
  }

  /// Write a stand-in scie-jump that "packs" by copying the manifest to `binary_name`.
  #[cfg(unix)]
  pub fn fake_jump(&self, binary_name: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = format!("#!/bin/sh\n[ \"$1\" = \"-sj\" ] || exit 64\ncat \"$3\" > \"{binary_name}\"\n");
    let path = self.write_file("bin/scie-jump", &script);
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
  }
}
