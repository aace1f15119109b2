//! Lift manifest emission.
//!
//! The manifest is the contract with the scie-jump: it describes one
//! platform's files, commands and bindings. Emission is deterministic so the
//! same inputs always produce byte-identical `lift.json` files:
//! - struct fields serialize in declaration order
//! - every table is a [`BTreeMap`]
//! - lists keep configuration order

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use crate::consts::{APP_NAME, PROVENANCE_NOTE, VERSION};
use crate::error::Result;
use crate::model::{Command, Distribution, File, FileType, InterpreterGroup, JumpSpec};
use crate::platform::Platform;

/// Provenance recorded when `--include-provenance` is requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
  pub note: String,
  pub version: String,
  pub url: String,
}

impl BuildInfo {
  /// Provenance naming the science release asset for `platform`.
  pub fn new(platform: Platform) -> Self {
    Self {
      note: PROVENANCE_NOTE.to_string(),
      version: VERSION.to_string(),
      url: format!(
        "https://github.com/a-scie/lift/releases/tag/v{VERSION}/{}",
        platform.qualified_binary_name(APP_NAME)
      ),
    }
  }
}

#[derive(Serialize)]
struct FileEntry<'a> {
  name: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  key: Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  size: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  hash: Option<&'a str>,
  #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
  file_type: Option<FileType>,
  is_executable: bool,
}

impl<'a> From<&'a File> for FileEntry<'a> {
  fn from(file: &'a File) -> Self {
    Self {
      name: &file.name,
      key: file.key.as_deref(),
      size: file.digest.as_ref().map(|digest| digest.size),
      hash: file.digest.as_ref().map(|digest| digest.fingerprint.as_str()),
      file_type: file.file_type,
      is_executable: file.is_executable,
    }
  }
}

#[derive(Serialize)]
struct DistributionEntry<'a> {
  id: &'a str,
  file: &'a str,
  placeholders: &'a BTreeMap<String, String>,
}

impl<'a> From<&'a Distribution> for DistributionEntry<'a> {
  fn from(distribution: &'a Distribution) -> Self {
    Self {
      id: &distribution.id,
      file: distribution.file.id(),
      placeholders: &distribution.placeholders,
    }
  }
}

/// One platform's fully resolved layout.
#[derive(Debug, Clone, Copy)]
pub struct LiftManifest<'a> {
  pub name: &'a str,
  pub description: Option<&'a str>,
  pub load_dotenv: bool,
  pub scie_jump: Option<&'a JumpSpec>,
  pub platform: Platform,
  pub distributions: &'a [Distribution],
  pub interpreter_groups: &'a [InterpreterGroup],
  pub files: &'a [File],
  pub commands: &'a [Command],
  pub bindings: &'a [Command],
  /// Lazily fetched files: name -> URL.
  pub fetch_urls: &'a BTreeMap<String, String>,
  pub build_info: Option<&'a BuildInfo>,
}

#[derive(Serialize)]
struct Document<'a> {
  name: &'a str,
  description: Option<&'a str>,
  load_dotenv: bool,
  scie_jump: Option<&'a JumpSpec>,
  platform: Platform,
  distributions: Vec<DistributionEntry<'a>>,
  interpreter_groups: &'a [InterpreterGroup],
  files: Vec<FileEntry<'a>>,
  commands: &'a [Command],
  bindings: &'a [Command],
  ptex: &'a BTreeMap<String, String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  science: Option<&'a BuildInfo>,
}

/// Serialize `manifest` as pretty-printed JSON followed by a newline.
pub fn emit_manifest(mut output: impl Write, manifest: &LiftManifest<'_>) -> Result<()> {
  let document = Document {
    name: manifest.name,
    description: manifest.description,
    load_dotenv: manifest.load_dotenv,
    scie_jump: manifest.scie_jump,
    platform: manifest.platform,
    distributions: manifest.distributions.iter().map(DistributionEntry::from).collect(),
    interpreter_groups: manifest.interpreter_groups,
    files: manifest.files.iter().map(FileEntry::from).collect(),
    commands: manifest.commands,
    bindings: manifest.bindings,
    ptex: manifest.fetch_urls,
    science: manifest.build_info,
  };
  serde_json::to_writer_pretty(&mut output, &document)?;
  output.write_all(b"\n")?;
  Ok(())
}
