//! Lift configuration loading.
//!
//! A `lift.toml` holds a single `[lift]` table. It is deserialized into raw
//! structs mirroring the TOML layout, then validated and converted into an
//! [`Application`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{
  Application, Command, Digest, File, FileType, Interpreter, InterpreterGroup, JumpSpec, PtexSpec, Source,
  StaticDistribution, StaticProvider,
};
use crate::platform::Platform;

const STATIC_PROVIDER: &str = "static";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
  lift: LiftConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LiftConfig {
  name: String,
  #[serde(default)]
  description: Option<String>,
  #[serde(default)]
  load_dotenv: bool,
  #[serde(default)]
  platforms: Option<Vec<String>>,
  #[serde(default)]
  scie_jump: Option<JumpSpec>,
  #[serde(default)]
  ptex: Option<PtexSpec>,
  #[serde(default)]
  interpreters: Vec<InterpreterConfig>,
  #[serde(default)]
  interpreter_groups: Vec<InterpreterGroup>,
  #[serde(default)]
  files: Vec<FileConfig>,
  #[serde(default)]
  commands: Vec<Command>,
  #[serde(default)]
  bindings: Vec<Command>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SourceConfig {
  url: String,
  #[serde(default)]
  lazy: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
  name: String,
  #[serde(default)]
  key: Option<String>,
  #[serde(default)]
  digest: Option<Digest>,
  #[serde(default, rename = "type")]
  file_type: Option<FileType>,
  #[serde(default)]
  is_executable: bool,
  #[serde(default)]
  source: Option<SourceConfig>,
}

impl From<FileConfig> for File {
  fn from(config: FileConfig) -> Self {
    Self {
      name: config.name,
      key: config.key,
      digest: config.digest,
      file_type: config.file_type,
      is_executable: config.is_executable,
      source: match config.source {
        Some(SourceConfig { url, lazy }) => Source::Fetch { url, lazy },
        None => Source::Local,
      },
    }
  }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DistributionConfig {
  name: String,
  #[serde(default)]
  key: Option<String>,
  #[serde(default)]
  digest: Option<Digest>,
  #[serde(default, rename = "type")]
  file_type: Option<FileType>,
  #[serde(default)]
  is_executable: bool,
  #[serde(default)]
  source: Option<SourceConfig>,
  #[serde(default)]
  placeholders: BTreeMap<String, String>,
}

impl From<DistributionConfig> for StaticDistribution {
  fn from(config: DistributionConfig) -> Self {
    let file = FileConfig {
      name: config.name,
      key: config.key,
      digest: config.digest,
      file_type: config.file_type,
      is_executable: config.is_executable,
      source: config.source,
    };
    Self {
      file: file.into(),
      placeholders: config.placeholders,
    }
  }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InterpreterConfig {
  id: String,
  provider: String,
  #[serde(default)]
  platforms: BTreeMap<String, DistributionConfig>,
}

/// Load the lift configuration at `path`.
pub fn load(path: &Path) -> Result<Application> {
  let source_name = path.display().to_string();
  let content = std::fs::read_to_string(path).map_err(|e| Error::InvalidConfig {
    source_name: source_name.clone(),
    message: format!("could not be read: {e}"),
  })?;
  parse_config(&content, &source_name)
}

/// Parse lift configuration `content`; `source_name` labels errors.
pub fn parse_config(content: &str, source_name: &str) -> Result<Application> {
  let invalid = |message: String| Error::InvalidConfig {
    source_name: source_name.to_string(),
    message,
  };

  let config: ConfigFile = toml::from_str(content).map_err(|e| invalid(e.to_string()))?;
  let lift = config.lift;

  let parse_platform = |name: &str| name.parse::<Platform>().map_err(&invalid);
  let platforms = match lift.platforms {
    Some(names) => {
      let mut platforms = Vec::new();
      for name in &names {
        let platform = parse_platform(name)?;
        if !platforms.contains(&platform) {
          platforms.push(platform);
        }
      }
      platforms
    }
    None => vec![Platform::detect()?],
  };

  let mut interpreters = Vec::new();
  for interpreter in lift.interpreters {
    if interpreter.provider != STATIC_PROVIDER {
      return Err(invalid(format!(
        "interpreter {} uses unknown provider {:?}",
        interpreter.id, interpreter.provider
      )));
    }
    let mut provider = StaticProvider {
      id: interpreter.id.clone(),
      ..Default::default()
    };
    for (name, distribution) in interpreter.platforms {
      provider.platforms.insert(parse_platform(&name)?, distribution.into());
    }
    interpreters.push(Interpreter {
      id: interpreter.id,
      provider: Box::new(provider),
    });
  }

  let interpreter_ids: BTreeSet<&str> = interpreters.iter().map(|interpreter| interpreter.id.as_str()).collect();
  for group in &lift.interpreter_groups {
    if let Some(member) = group
      .members
      .iter()
      .find(|member| !interpreter_ids.contains(member.as_str()))
    {
      return Err(invalid(format!(
        "interpreter group {} names unknown interpreter {member}",
        group.id
      )));
    }
  }

  debug!(
    source = source_name,
    name = %lift.name,
    platforms = platforms.len(),
    files = lift.files.len(),
    "loaded lift configuration"
  );

  Ok(Application {
    name: lift.name,
    description: lift.description,
    load_dotenv: lift.load_dotenv,
    platforms,
    interpreters,
    interpreter_groups: lift.interpreter_groups,
    files: lift.files.into_iter().map(File::from).collect(),
    commands: lift.commands,
    bindings: lift.bindings,
    scie_jump: lift.scie_jump,
    ptex: lift.ptex,
  })
}
