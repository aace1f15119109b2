mod build;
mod export;

pub use build::{BuildArgs, cmd_build};
pub use export::{ExportArgs, cmd_export};

use anyhow::Result;
use science_lib::FileMapping;

/// Parse `--file` values, failing on the first malformed one.
///
/// Without any `--file`, the whitespace separated mappings in `env_var` are used.
fn parse_file_mappings(values: &[String], env_var: &str) -> Result<Vec<FileMapping>> {
  if !values.is_empty() {
    return parse_all(values.iter().map(String::as_str));
  }
  match std::env::var(env_var) {
    Ok(value) => parse_all(value.split_whitespace()),
    Err(_) => Ok(Vec::new()),
  }
}

fn parse_all<'a>(values: impl Iterator<Item = &'a str>) -> Result<Vec<FileMapping>> {
  Ok(values.map(FileMapping::parse).collect::<science_lib::Result<_>>()?)
}
