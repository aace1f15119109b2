//! Building scies.
//!
//! A build exports each target platform into a temporary sandbox, packs the
//! sandbox with the scie-jump and moves the resulting binary to the
//! destination directory. Platforms are processed one at a time, in order; a
//! failure stops the build but leaves binaries already produced in place.

pub mod hash;
pub mod sandbox;

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::consts::MIN_JUMP_VERSION;
use crate::error::{Error, Result};
use crate::export::{ExportOptions, Exporter};
use crate::fetch::Fetcher;
use crate::model::{Application, FileMapping};
use crate::platform::Platform;
use crate::scie;

pub use hash::{HashAlgorithm, write_checksums};
pub use sandbox::Sandbox;

/// Options controlling a build.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
  /// Keep the export sandbox on disk for inspection.
  pub preserve_sandbox: bool,
  /// Pack with this scie-jump instead of a released one.
  pub use_jump: Option<PathBuf>,
  pub include_provenance: bool,
  /// Checksum side-cars to write next to each binary.
  pub hash_algorithms: Vec<HashAlgorithm>,
  /// Name binaries `<name>-<platform>` even for a build of just the current platform.
  pub use_platform_suffix: bool,
}

/// Build a scie per platform into `dest_dir`, returning the binary paths.
///
/// `on_built` sees each binary as soon as it and its checksums are in place.
pub async fn build(
  application: &Application,
  file_mappings: &[FileMapping],
  dest_dir: &Path,
  options: &BuildOptions,
  fetcher: &impl Fetcher,
  mut on_built: impl FnMut(Platform, &Path),
) -> Result<Vec<PathBuf>> {
  let current = Platform::detect()?;
  let mut platforms = application.platforms.clone();
  let use_platform_suffix = options.use_platform_suffix || platforms != [current];
  if options.use_jump.is_some() && use_platform_suffix {
    warn!(
      requested = %platforms.iter().map(Platform::name).collect::<Vec<_>>().join(", "),
      current = %current,
      "cannot use a custom scie-jump with a multi-platform configuration, restricting to the current platform"
    );
    platforms = vec![current];
  }

  if let Some(requested) = application.scie_jump.as_ref().and_then(|spec| spec.version.as_ref()) {
    if *requested < MIN_JUMP_VERSION {
      return Err(Error::UnsupportedJumpVersion {
        requested: requested.clone(),
        minimum: MIN_JUMP_VERSION,
      });
    }
  }

  let native_jump = match &options.use_jump {
    Some(path) => scie::custom_jump(path).await?,
    None => scie::jump(fetcher, application.scie_jump.as_ref(), current).await?,
  };
  debug!(path = ?native_jump, "packing with scie-jump");

  let sandbox = Sandbox::new(options.preserve_sandbox)?;
  let exporter = Exporter::new(
    application,
    file_mappings,
    sandbox.path(),
    ExportOptions {
      force: false,
      include_provenance: options.include_provenance,
    },
    fetcher,
  )?;

  let mut binaries = Vec::new();
  for platform in platforms {
    let lift_manifest = exporter.export_platform(platform).await?;
    let embedded_jump = match &options.use_jump {
      Some(_) => native_jump.clone(),
      None => scie::jump(fetcher, application.scie_jump.as_ref(), platform).await?,
    };
    let platform_dir = exporter.platform_dir(platform);
    pack(&native_jump, &embedded_jump, &lift_manifest, &platform_dir).await?;

    let binary_name = if use_platform_suffix {
      platform.qualified_binary_name(&application.name)
    } else {
      platform.binary_name(&application.name)
    };
    tokio::fs::create_dir_all(dest_dir).await?;
    let binary = dest_dir.join(binary_name);
    move_file(&platform_dir.join(current.binary_name(&application.name)), &binary).await?;

    write_checksums(&binary, &options.hash_algorithms).await?;
    info!(%platform, binary = ?binary, "built scie");
    on_built(platform, &binary);
    binaries.push(binary);
  }
  Ok(binaries)
}

/// Run `<native jump> -sj <embedded jump> <lift.json>` in the platform sandbox.
async fn pack(native_jump: &Path, embedded_jump: &Path, lift_manifest: &Path, platform_dir: &Path) -> Result<()> {
  debug!(manifest = ?lift_manifest, embedded = ?embedded_jump, "running scie-jump");
  let output = Command::new(native_jump)
    .arg("-sj")
    .arg(embedded_jump)
    .arg(lift_manifest)
    .current_dir(platform_dir)
    .stdout(Stdio::null())
    .stderr(Stdio::piped())
    .output()
    .await?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "scie-jump stderr");
    }
    return Err(Error::PackerFailed {
      manifest: lift_manifest.to_path_buf(),
      code: output.status.code(),
    });
  }
  Ok(())
}

/// Move `src` to `dst`, copying when a rename crosses filesystems.
async fn move_file(src: &Path, dst: &Path) -> Result<()> {
  if !tokio::fs::metadata(src).await.is_ok_and(|metadata| metadata.is_file()) {
    return Err(Error::PackerOutputMissing(src.to_path_buf()));
  }
  if tokio::fs::rename(src, dst).await.is_err() {
    tokio::fs::copy(src, dst).await?;
    tokio::fs::remove_file(src).await?;
  }
  Ok(())
}
