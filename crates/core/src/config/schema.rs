//! Configuration schema definitions
//!
//! Every field has a default, so an empty or absent file yields the
//! stock toolchain versions and signing parameters.

use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigSchema {
    #[serde(default)]
    pub toolchain: ToolchainConfig,

    #[serde(default)]
    pub signing: SigningConfig,

    #[serde(default)]
    pub build: BuildConfig,
}

/// Toolchain versions and required packages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolchainConfig {
    /// Flutter stable release to install
    #[serde(default = "default_flutter_version")]
    pub flutter_version: String,

    /// Build id of the Android command-line tools archive
    #[serde(default = "default_cmdline_tools_build")]
    pub cmdline_tools_build: String,

    /// Required Java major version
    #[serde(default = "default_java_major")]
    pub java_major: u32,

    /// Packages passed to `sdkmanager --install`
    #[serde(default = "default_android_packages")]
    pub android_packages: Vec<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            flutter_version: default_flutter_version(),
            cmdline_tools_build: default_cmdline_tools_build(),
            java_major: default_java_major(),
            android_packages: default_android_packages(),
        }
    }
}

fn default_flutter_version() -> String {
    "3.24.5".to_string()
}

fn default_cmdline_tools_build() -> String {
    "11076708".to_string()
}

fn default_java_major() -> u32 {
    17
}

fn default_android_packages() -> Vec<String> {
    vec!["platform-tools", "platforms;android-35", "build-tools;35.0.0"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Keystore generation parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SigningConfig {
    #[serde(default = "default_key_algorithm")]
    pub key_algorithm: String,

    #[serde(default = "default_key_size")]
    pub key_size: u32,

    /// Certificate validity in days
    #[serde(default = "default_validity_days")]
    pub validity_days: u32,

    /// Distinguished name of the self-signed certificate
    #[serde(default = "default_dname")]
    pub dname: String,

    /// Alias used when the prompt is left blank
    #[serde(default = "default_alias")]
    pub default_alias: String,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            key_algorithm: default_key_algorithm(),
            key_size: default_key_size(),
            validity_days: default_validity_days(),
            dname: default_dname(),
            default_alias: default_alias(),
        }
    }
}

fn default_key_algorithm() -> String {
    "RSA".to_string()
}

fn default_key_size() -> u32 {
    2048
}

fn default_validity_days() -> u32 {
    10000
}

fn default_dname() -> String {
    "CN=Upload,O=MyOrg,C=JP".to_string()
}

fn default_alias() -> String {
    "key".to_string()
}

/// Build output settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildConfig {
    /// Expected artifact, relative to the project root
    #[serde(default = "default_artifact")]
    pub artifact: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            artifact: default_artifact(),
        }
    }
}

fn default_artifact() -> String {
    "build/app/outputs/bundle/release/app-release.aab".to_string()
}
