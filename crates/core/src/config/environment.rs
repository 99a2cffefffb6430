//! Pipeline configuration
//!
//! Process-wide state (home directory, host OS, SDK variables, `PATH`) is
//! captured once into a [`PipelineConfig`] and passed to every step, so no
//! step reads the environment on its own.

use super::schema::ConfigSchema;
use crate::error::{Error, Result};
use crate::platform::HostOs;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Scratch directory name, relative to the project root
pub const SCRATCH_DIR_NAME: &str = ".tmp_local_build";

/// Variables naming an existing Android SDK, in priority order
pub const ANDROID_SDK_VARS: [&str; 2] = ["ANDROID_HOME", "ANDROID_SDK_ROOT"];

/// Everything a pipeline step may consult
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Flutter project being built
    pub project_root: PathBuf,
    /// Ephemeral download directory, removed after the run
    pub scratch_dir: PathBuf,
    /// User home, where Flutter is installed
    pub home_dir: PathBuf,
    /// Operating system toolchains are installed for
    pub host: HostOs,
    /// Raw value of `ANDROID_HOME`
    pub android_home: Option<OsString>,
    /// Raw value of `ANDROID_SDK_ROOT`
    pub android_sdk_root: Option<OsString>,
    /// Raw value of `PATH`
    pub search_path: Option<OsString>,
    /// Settings loaded from the configuration file
    pub settings: ConfigSchema,
}

impl PipelineConfig {
    /// Build a configuration that consults nothing from the environment
    pub fn new(
        project_root: impl Into<PathBuf>,
        home_dir: impl Into<PathBuf>,
        host: HostOs,
        settings: ConfigSchema,
    ) -> Self {
        let project_root = project_root.into();
        Self {
            scratch_dir: project_root.join(SCRATCH_DIR_NAME),
            project_root,
            home_dir: home_dir.into(),
            host,
            android_home: None,
            android_sdk_root: None,
            search_path: None,
            settings,
        }
    }

    /// Capture the current process environment
    pub fn from_env(project_root: impl AsRef<Path>, settings: ConfigSchema) -> Result<Self> {
        let project_root = std::path::absolute(project_root.as_ref())?;
        let home_dir = dirs::home_dir().ok_or_else(|| {
            Error::config("Cannot determine the home directory")
                .with_suggestion("Set the HOME environment variable")
        })?;

        Ok(Self::new(project_root, home_dir, HostOs::detect(), settings)
            .with_android_env(
                std::env::var_os(ANDROID_SDK_VARS[0]),
                std::env::var_os(ANDROID_SDK_VARS[1]),
            )
            .with_search_path(std::env::var_os("PATH")))
    }

    /// Set the raw `ANDROID_HOME` / `ANDROID_SDK_ROOT` values
    #[must_use]
    pub fn with_android_env(
        mut self,
        android_home: Option<OsString>,
        sdk_root: Option<OsString>,
    ) -> Self {
        self.android_home = android_home;
        self.android_sdk_root = sdk_root;
        self
    }

    /// Set the search path used to discover installed tools
    #[must_use]
    pub fn with_search_path(mut self, path: Option<OsString>) -> Self {
        self.search_path = path;
        self
    }

    /// SDK root named by the environment; the first non-empty variable wins
    #[must_use]
    pub fn android_sdk_override(&self) -> Option<PathBuf> {
        [&self.android_home, &self.android_sdk_root]
            .into_iter()
            .flatten()
            .find(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    /// Raw value of one of [`ANDROID_SDK_VARS`], if set and non-empty
    #[must_use]
    pub fn android_var(&self, name: &str) -> Option<&OsStr> {
        let value = match name {
            "ANDROID_HOME" => self.android_home.as_deref(),
            "ANDROID_SDK_ROOT" => self.android_sdk_root.as_deref(),
            _ => None,
        };
        value.filter(|v| !v.is_empty())
    }

    /// Default Flutter install location
    #[must_use]
    pub fn flutter_home(&self) -> PathBuf {
        self.home_dir.join("flutter")
    }

    /// Android module of the Flutter project
    #[must_use]
    pub fn android_dir(&self) -> PathBuf {
        self.project_root.join("android")
    }

    /// Release keystore
    #[must_use]
    pub fn keystore_path(&self) -> PathBuf {
        self.android_dir().join("app").join("keystore.jks")
    }

    /// Signing credentials read by the Gradle build
    #[must_use]
    pub fn key_properties_path(&self) -> PathBuf {
        self.android_dir().join("key.properties")
    }

    /// Manifest that marks the project root as a Flutter project
    #[must_use]
    pub fn pubspec_path(&self) -> PathBuf {
        self.project_root.join("pubspec.yaml")
    }

    /// Artifact the release build must produce
    #[must_use]
    pub fn artifact_path(&self) -> PathBuf {
        self.project_root.join(&self.settings.build.artifact)
    }
}
