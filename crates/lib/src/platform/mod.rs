pub mod arch;
pub mod os;
pub mod paths;

use std::fmt;
use std::str::FromStr;

use arch::Arch;
use os::Os;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// A scie target platform combining OS and architecture (e.g., "linux-x86_64")
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Platform {
  pub os: Os,
  pub arch: Arch,
}

impl Platform {
  /// Every platform the scie-jump ships for.
  pub const ALL: [Platform; 6] = [
    Platform::new(Os::Linux, Arch::Aarch64),
    Platform::new(Os::Linux, Arch::X86_64),
    Platform::new(Os::MacOs, Arch::Aarch64),
    Platform::new(Os::MacOs, Arch::X86_64),
    Platform::new(Os::Windows, Arch::Aarch64),
    Platform::new(Os::Windows, Arch::X86_64),
  ];

  pub const fn new(os: Os, arch: Arch) -> Self {
    Self { os, arch }
  }

  /// Detect the current platform at runtime
  ///
  /// Returns `None` if the OS or architecture is not supported
  pub fn current() -> Option<Self> {
    Some(Self {
      os: Os::current()?,
      arch: Arch::current()?,
    })
  }

  /// Like [`Platform::current`], but an unsupported host is an error.
  pub fn detect() -> Result<Self> {
    Self::current().ok_or(Error::UnsupportedPlatform {
      os: std::env::consts::OS,
      arch: std::env::consts::ARCH,
    })
  }

  /// Returns the platform name (e.g., "macos-aarch64")
  pub fn name(&self) -> String {
    format!("{}-{}", self.os, self.arch)
  }

  /// The file name of an executable called `name` on this platform.
  pub fn binary_name(&self, name: &str) -> String {
    format!("{}{}", name, self.os.exe_suffix())
  }

  /// The file name of an executable called `name`, qualified with this platform.
  ///
  /// Used whenever binaries for several platforms land in the same directory.
  pub fn qualified_binary_name(&self, name: &str) -> String {
    format!("{}-{}{}", name, self.name(), self.os.exe_suffix())
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}", self.os, self.arch)
  }
}

impl FromStr for Platform {
  type Err = String;

  fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
    let (os, arch) = value
      .split_once('-')
      .ok_or_else(|| format!("invalid platform {value:?}, expected <os>-<arch>"))?;
    match (Os::parse(os), Arch::parse(arch)) {
      (Some(os), Some(arch)) => Ok(Self { os, arch }),
      _ => Err(format!(
        "unsupported platform {value:?}, expected one of: {}",
        Self::ALL.iter().map(|p| p.name()).collect::<Vec<_>>().join(", ")
      )),
    }
  }
}

impl Serialize for Platform {
  fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.name())
  }
}

impl<'de> Deserialize<'de> for Platform {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
    let value = String::deserialize(deserializer)?;
    value.parse().map_err(serde::de::Error::custom)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn platform_name_format() {
    let platform = Platform::new(Os::MacOs, Arch::Aarch64);
    assert_eq!(platform.name(), "macos-aarch64");
    assert_eq!(platform.to_string(), "macos-aarch64");

    let platform = Platform::new(Os::Linux, Arch::X86_64);
    assert_eq!(platform.name(), "linux-x86_64");
  }

  #[test]
  fn parse_round_trips_every_platform() {
    for platform in Platform::ALL {
      assert_eq!(platform.name().parse::<Platform>(), Ok(platform));
    }
  }

  #[test]
  fn parse_rejects_unknown_platforms() {
    assert!("linux".parse::<Platform>().is_err());
    assert!("solaris-sparc".parse::<Platform>().is_err());
    assert!("linux-riscv64".parse::<Platform>().is_err());
  }

  #[test]
  fn binary_names_follow_os_conventions() {
    let linux = Platform::new(Os::Linux, Arch::X86_64);
    assert_eq!(linux.binary_name("app"), "app");
    assert_eq!(linux.qualified_binary_name("app"), "app-linux-x86_64");

    let windows = Platform::new(Os::Windows, Arch::Aarch64);
    assert_eq!(windows.binary_name("app"), "app.exe");
    assert_eq!(windows.qualified_binary_name("app"), "app-windows-aarch64.exe");
  }

  #[test]
  fn detect_matches_current() {
    assert_eq!(Platform::detect().ok(), Platform::current());
  }
}
