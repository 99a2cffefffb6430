//! JDK verification
//!
//! The Android Gradle plugin needs a specific JDK major version. This step
//! only queries `java -version`; it never installs anything.

use aabkit_core::config::PipelineConfig;
use aabkit_core::process::{CommandRunner, Invocation};
use aabkit_core::{Error, Result};
use tracing::debug;

/// A Java runtime version as reported by `java -version`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaVersion {
    /// Major version, e.g. `17` or `8` for `1.8`
    pub major: u32,
    /// The quoted version token, e.g. `17.0.9`
    pub raw: String,
}

impl JavaVersion {
    /// Parse the first `version "..."` token in `java -version` output
    ///
    /// Handles both modern (`"17.0.9"`, `"21"`, `"17-ea"`) and legacy
    /// (`"1.8.0_392"`) numbering.
    pub fn parse(output: &str) -> Option<Self> {
        let start = output.find("version \"")? + "version \"".len();
        let rest = &output[start..];
        let raw = &rest[..rest.find('"')?];

        let mut parts = raw.split(['.', '-', '_', '+']);
        let first: u32 = parts.next()?.parse().ok()?;
        let major = if first == 1 {
            parts.next()?.parse().ok()?
        } else {
            first
        };

        Some(Self {
            major,
            raw: raw.to_string(),
        })
    }
}

/// Check that the configured JDK major version is the active `java`
pub fn verify_java(config: &PipelineConfig, runner: &dyn CommandRunner) -> Result<JavaVersion> {
    let required = config.settings.toolchain.java_major;
    let not_found = || {
        Error::missing_prerequisite("Java (JDK) not found").with_suggestion(format!(
            "Install Temurin {required}: macOS → brew install --cask temurin@{required}"
        ))
    };

    let result = match runner.capture(&Invocation::new("java").arg("-version")) {
        Ok(result) if result.success => result,
        Ok(result) => {
            debug!(exit_code = result.exit_code, "java -version failed");
            return Err(not_found());
        }
        Err(e) => return Err(not_found().with_source(e)),
    };

    // java prints its version banner on stderr
    let output = result.combined_output();
    match JavaVersion::parse(&output) {
        Some(version) if version.major == required => Ok(version),
        found => {
            let banner = output.lines().next().unwrap_or("").trim().to_string();
            let context = match found {
                Some(v) => format!("Found Java {} ({banner})", v.raw),
                None => format!("Unrecognised `java -version` output: {banner}"),
            };
            Err(Error::missing_prerequisite(format!("Java {required} required"))
                .with_context(context)
                .with_suggestion(format!("Please install JDK {required} and retry")))
        }
    }
}
