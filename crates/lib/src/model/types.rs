use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::provider::Interpreter;
use crate::platform::Platform;

/// Expected size and sha256 fingerprint of a file's content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Digest {
  pub size: u64,
  /// Lowercase hex sha256.
  pub fingerprint: String,
}

/// How the scie-jump should treat a file's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
  #[serde(rename = "blob")]
  Blob,
  #[serde(rename = "directory")]
  Directory,
  #[serde(rename = "zip")]
  Zip,
  #[serde(rename = "tar")]
  Tar,
  #[serde(rename = "tar.bz2")]
  TarBzip2,
  #[serde(rename = "tar.gz")]
  TarGzip,
  #[serde(rename = "tar.xz")]
  TarLzma,
  #[serde(rename = "tar.zst")]
  TarZstd,
}

/// Where a file's content comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
  /// Supplied on the local filesystem, via a file mapping or the working directory.
  Local,
  /// Downloaded from `url`; eagerly at export time, or lazily by ptex when the scie runs.
  Fetch { url: String, lazy: bool },
}

/// A file the scie needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct File {
  pub name: String,
  pub key: Option<String>,
  pub digest: Option<Digest>,
  pub file_type: Option<FileType>,
  pub is_executable: bool,
  pub source: Source,
}

impl File {
  /// A local file with no digest; the common case for tests and synthesized files.
  pub fn local(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      key: None,
      digest: None,
      file_type: None,
      is_executable: false,
      source: Source::Local,
    }
  }

  /// The identifier file mappings refer to: the key if set, else the name.
  pub fn id(&self) -> &str {
    self.key.as_deref().unwrap_or(&self.name)
  }

  pub fn is_lazy(&self) -> bool {
    matches!(self.source, Source::Fetch { lazy: true, .. })
  }

  /// The scie-jump placeholder expanding to this file's extracted path.
  pub fn placeholder(&self) -> String {
    format!("{{{}}}", self.name)
  }
}

/// A named invocation; used both for commands and bindings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Command {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  pub exe: String,
  #[serde(default)]
  pub args: Vec<String>,
  #[serde(default)]
  pub env: BTreeMap<String, String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

/// Which scie-jump to pack with.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JumpSpec {
  pub version: Option<Version>,
  pub digest: Option<Digest>,
}

/// Which ptex to embed when any file is fetched lazily.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PtexSpec {
  pub id: Option<String>,
  pub version: Option<Version>,
  pub argv1: Option<String>,
  pub digest: Option<Digest>,
}

/// A set of interpreters the scie picks from at run time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterpreterGroup {
  pub id: String,
  pub selector: String,
  pub members: Vec<String>,
}

/// A fully parsed lift configuration.
#[derive(Debug)]
pub struct Application {
  pub name: String,
  pub description: Option<String>,
  pub load_dotenv: bool,
  pub platforms: Vec<Platform>,
  pub interpreters: Vec<Interpreter>,
  pub interpreter_groups: Vec<InterpreterGroup>,
  pub files: Vec<File>,
  pub commands: Vec<Command>,
  pub bindings: Vec<Command>,
  pub scie_jump: Option<JumpSpec>,
  pub ptex: Option<PtexSpec>,
}

impl Application {
  /// A minimal application targeting only the given platforms.
  pub fn new(name: impl Into<String>, platforms: Vec<Platform>) -> Self {
    Self {
      name: name.into(),
      description: None,
      load_dotenv: false,
      platforms,
      interpreters: Vec::new(),
      interpreter_groups: Vec::new(),
      files: Vec::new(),
      commands: Vec::new(),
      bindings: Vec::new(),
      scie_jump: None,
      ptex: None,
    }
  }
}

/// A user supplied `<id>=<path>` override for where a local file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMapping {
  pub id: String,
  pub path: PathBuf,
}

impl FileMapping {
  /// Parse `<id>=<path>`, splitting on the first `=` only.
  pub fn parse(value: &str) -> Result<Self, Error> {
    let (id, path) = value
      .split_once('=')
      .ok_or_else(|| Error::InvalidFileMapping(value.to_string()))?;
    Ok(Self {
      id: id.to_string(),
      path: PathBuf::from(path),
    })
  }
}

impl FromStr for FileMapping {
  type Err = Error;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    Self::parse(value)
  }
}
