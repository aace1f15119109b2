//! The application model produced by parsing a lift configuration.
//!
//! An [`Application`] is built once by [`crate::config`] and read-only
//! thereafter. Everything the exporter derives from it per platform (resolved
//! files, distributions, the manifest) is created fresh on every export.

pub mod provider;
mod types;

pub use provider::{Distribution, Interpreter, Provider, StaticDistribution, StaticProvider};
pub use types::*;
