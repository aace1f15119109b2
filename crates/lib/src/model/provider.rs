//! Interpreter providers.
//!
//! A provider knows how to produce an interpreter distribution for a platform.
//! Providers sit behind a trait so new kinds can be added without touching the
//! exporter.

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::model::File;
use crate::platform::Platform;

/// An interpreter resolved for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
  /// The id of the interpreter this came from.
  pub id: String,
  pub file: File,
  /// Named paths inside the distribution, e.g. `python -> python/bin/python3`.
  pub placeholders: BTreeMap<String, String>,
}

/// Produces at most one distribution per platform.
pub trait Provider: Debug + Send + Sync {
  fn distribution(&self, platform: Platform) -> Option<Distribution>;
}

/// A configured interpreter: an id plus the provider that resolves it.
#[derive(Debug)]
pub struct Interpreter {
  pub id: String,
  pub provider: Box<dyn Provider>,
}

/// One platform's entry in a [`StaticProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticDistribution {
  pub file: File,
  pub placeholders: BTreeMap<String, String>,
}

/// A provider configured with an explicit file per platform.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
  pub id: String,
  pub platforms: BTreeMap<Platform, StaticDistribution>,
}

impl Provider for StaticProvider {
  fn distribution(&self, platform: Platform) -> Option<Distribution> {
    self.platforms.get(&platform).map(|entry| Distribution {
      id: self.id.clone(),
      file: entry.file.clone(),
      placeholders: entry.placeholders.clone(),
    })
  }
}
