use semver::Version;

pub const APP_NAME: &str = "science";

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// File name of the lift manifest written into each platform sandbox.
pub const LIFT_MANIFEST_NAME: &str = "lift.json";

/// Default configuration file name.
pub const DEFAULT_CONFIG_NAME: &str = "lift.toml";

/// The first scie-jump release that supports cross-building with `-sj`.
pub const MIN_JUMP_VERSION: Version = Version::new(0, 9, 0);

/// Default argument handed to the ptex binding: the lift manifest itself.
pub const DEFAULT_PTEX_ARGV1: &str = "{scie.lift}";

/// Name of the binding synthesized to run ptex.
pub const FETCH_BINDING_NAME: &str = "fetch";

/// Read size used when streaming files through digests.
pub const HASH_CHUNK_SIZE: usize = 8192;

pub const PROVENANCE_NOTE: &str = "Generated by science.";
