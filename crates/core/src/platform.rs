//! Host platform detection

use crate::error::{Error, Result};
use std::fmt;

/// Operating system the pipeline runs on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOs {
    /// macOS
    MacOs,
    /// Linux
    Linux,
    /// Anything else, carrying the raw `std::env::consts::OS` name
    Other(String),
}

impl HostOs {
    /// Detect the operating system this binary was built for
    #[must_use]
    pub fn detect() -> Self {
        Self::from_name(std::env::consts::OS)
    }

    /// Map an OS name as reported by `std::env::consts::OS`
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "macos" => Self::MacOs,
            "linux" => Self::Linux,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether toolchains can be installed on this OS
    #[must_use]
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Fail with an unsupported-platform error unless this OS is supported
    pub fn require_supported(&self, what: &str) -> Result<()> {
        if self.is_supported() {
            Ok(())
        } else {
            Err(Error::unsupported_platform(format!(
                "Unsupported OS for {what}: {self}. Use macOS or Linux."
            )))
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MacOs => write!(f, "macos"),
            Self::Linux => write!(f, "linux"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}
