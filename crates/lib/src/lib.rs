//! science-lib: Core types and logic for science
//!
//! This crate turns a lift configuration into scies, one per target platform:
//! - `config`: parses `lift.toml` into an [`Application`]
//! - `export`: resolves files and writes a `lift.json` sandbox per platform
//! - `build`: packs each sandbox with the scie-jump and post-processes the result
//! - `fetch` / `scie`: downloads and verifies remote files and scie binaries

pub mod build;
pub mod config;
pub mod consts;
pub mod error;
pub mod export;
pub mod fetch;
pub mod model;
pub mod platform;
pub mod scie;
pub mod util;

pub use error::{Error, Result};
pub use model::{Application, FileMapping};
pub use platform::Platform;
