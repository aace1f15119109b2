//! Sandbox export.
//!
//! For each target platform, export creates a fresh sandbox directory holding:
//! - a symlink to every embedded file, under the file's name
//! - `lift.json`, the manifest the scie-jump packs from
//!
//! Lazily fetched files are never linked; they are listed in the manifest's
//! `ptex` table and ptex is embedded to fetch them when the scie runs.

pub mod manifest;
pub mod resolve;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::consts::{DEFAULT_PTEX_ARGV1, FETCH_BINDING_NAME, LIFT_MANIFEST_NAME};
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::model::{Application, Command, File, FileMapping};
use crate::platform::Platform;
use crate::scie;

pub use manifest::{BuildInfo, LiftManifest, emit_manifest};
pub use resolve::{Resolved, resolve_file};

/// Options controlling an export.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
  /// Remove pre-existing platform directories instead of failing.
  pub force: bool,
  /// Record which science produced the manifest.
  pub include_provenance: bool,
}

/// Exports an application's platform sandboxes under one destination directory.
pub struct Exporter<'a, F: Fetcher> {
  application: &'a Application,
  file_paths_by_id: BTreeMap<String, PathBuf>,
  dest_dir: PathBuf,
  cwd: PathBuf,
  options: ExportOptions,
  fetcher: &'a F,
}

impl<'a, F: Fetcher> Exporter<'a, F> {
  pub fn new(
    application: &'a Application,
    file_mappings: &[FileMapping],
    dest_dir: &Path,
    options: ExportOptions,
    fetcher: &'a F,
  ) -> Result<Self> {
    let file_paths_by_id: BTreeMap<String, PathBuf> = file_mappings
      .iter()
      .map(|mapping| Ok((mapping.id.clone(), std::path::absolute(&mapping.path)?)))
      .collect::<Result<_>>()?;
    Ok(Self {
      application,
      file_paths_by_id,
      dest_dir: dest_dir.to_path_buf(),
      cwd: std::env::current_dir()?,
      options,
      fetcher,
    })
  }

  /// Resolve unmapped local files against `cwd` instead of the process working directory.
  pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
    self.cwd = cwd.into();
    self
  }

  /// The sandbox directory for `platform`.
  pub fn platform_dir(&self, platform: Platform) -> PathBuf {
    self.dest_dir.join(platform.name())
  }

  /// Export one platform's sandbox and return the path of its manifest.
  pub async fn export_platform(&self, platform: Platform) -> Result<PathBuf> {
    let application = self.application;
    let chroot = self.platform_dir(platform);
    info!(%platform, dir = ?chroot, "exporting sandbox");

    if self.options.force && tokio::fs::try_exists(&chroot).await? {
      debug!(dir = ?chroot, "removing existing sandbox");
      tokio::fs::remove_dir_all(&chroot).await?;
    }
    if let Some(parent) = chroot.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }
    // Fails if the sandbox exists; exports never silently overwrite
    tokio::fs::create_dir(&chroot).await?;

    let mut distributions = Vec::new();
    let mut files: Vec<File> = Vec::new();
    for interpreter in &application.interpreters {
      if let Some(distribution) = interpreter.provider.distribution(platform) {
        files.push(distribution.file.clone());
        distributions.push(distribution);
      }
    }
    files.extend(application.files.iter().cloned());

    let mut file_paths_by_id = self.file_paths_by_id.clone();
    let mut bindings: Vec<Command> = Vec::new();
    if files.iter().any(File::is_lazy) {
      let (ptex, ptex_path) = scie::ptex(self.fetcher, application.ptex.as_ref(), platform).await?;
      let argv1 = application
        .ptex
        .as_ref()
        .and_then(|spec| spec.argv1.clone())
        .unwrap_or_else(|| DEFAULT_PTEX_ARGV1.to_string());
      bindings.push(Command {
        name: Some(FETCH_BINDING_NAME.to_string()),
        exe: ptex.placeholder(),
        args: vec![argv1],
        ..Default::default()
      });
      file_paths_by_id.insert(ptex.id().to_string(), ptex_path);
      files.push(ptex);
    }
    bindings.extend(application.bindings.iter().cloned());

    let mut seen = HashSet::new();
    if let Some(duplicate) = files.iter().find(|file| !seen.insert(file.id())) {
      return Err(Error::DuplicateFileId(duplicate.id().to_string()));
    }

    let mut fetch_urls = BTreeMap::new();
    for file in &files {
      match resolve_file(file, &file_paths_by_id, &self.cwd, self.fetcher).await? {
        Resolved::Lazy(url) => {
          fetch_urls.insert(file.name.clone(), url);
        }
        Resolved::Local(path) => link_file(&chroot, &file.name, &path).await?,
      }
    }

    let build_info = if self.options.include_provenance {
      Some(BuildInfo::new(Platform::detect()?))
    } else {
      None
    };

    let mut output = Vec::new();
    emit_manifest(
      &mut output,
      &LiftManifest {
        name: &application.name,
        description: application.description.as_deref(),
        load_dotenv: application.load_dotenv,
        scie_jump: application.scie_jump.as_ref(),
        platform,
        distributions: &distributions,
        interpreter_groups: &application.interpreter_groups,
        files: &files,
        commands: &application.commands,
        bindings: &bindings,
        fetch_urls: &fetch_urls,
        build_info: build_info.as_ref(),
      },
    )?;
    let lift_manifest = chroot.join(LIFT_MANIFEST_NAME);
    tokio::fs::write(&lift_manifest, output).await?;

    info!(%platform, manifest = ?lift_manifest, files = files.len(), lazy = fetch_urls.len(), "exported");
    Ok(lift_manifest)
  }
}

/// Export a sandbox for each platform, all of the application's by default.
///
/// `on_exported` sees each manifest as soon as its platform is done. The first
/// failure aborts the export; platforms after it are not attempted.
pub async fn export(
  application: &Application,
  file_mappings: &[FileMapping],
  dest_dir: &Path,
  platforms: Option<&[Platform]>,
  options: ExportOptions,
  fetcher: &impl Fetcher,
  mut on_exported: impl FnMut(Platform, &Path),
) -> Result<Vec<(Platform, PathBuf)>> {
  let exporter = Exporter::new(application, file_mappings, dest_dir, options, fetcher)?;
  let mut manifests = Vec::new();
  for &platform in platforms.unwrap_or(&application.platforms) {
    let lift_manifest = exporter.export_platform(platform).await?;
    on_exported(platform, &lift_manifest);
    manifests.push((platform, lift_manifest));
  }
  Ok(manifests)
}

/// Link `<chroot>/<name>` to `target`, creating parent directories.
///
/// An existing entry at the link path is left alone, so re-linking is a no-op.
pub async fn link_file(chroot: &Path, name: &str, target: &Path) -> Result<()> {
  let link = chroot.join(name);
  if tokio::fs::symlink_metadata(&link).await.is_ok() {
    debug!(link = ?link, "already linked");
    return Ok(());
  }
  if let Some(parent) = link.parent() {
    tokio::fs::create_dir_all(parent).await?;
  }
  create_symlink(target, &link).await?;
  debug!(link = ?link, target = ?target, "linked file");
  Ok(())
}

async fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
  #[cfg(unix)]
  {
    tokio::fs::symlink(target, link).await
  }
  #[cfg(windows)]
  {
    let is_dir = tokio::fs::metadata(target).await.is_ok_and(|metadata| metadata.is_dir());
    if is_dir {
      tokio::fs::symlink_dir(target, link).await
    } else {
      tokio::fs::symlink_file(target, link).await
    }
  }
}
