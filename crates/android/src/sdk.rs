//! Android SDK command-line tools and packages
//!
//! Ensures `cmdline-tools/latest` exists under the SDK root, then drives
//! `sdkmanager` to install the platform packages and accept licenses.

use crate::archive;
use crate::fetch::Fetcher;
use crate::run_echoed;
use aabkit_cli::output::Status;
use aabkit_core::config::{PipelineConfig, ANDROID_SDK_VARS};
use aabkit_core::platform::HostOs;
use aabkit_core::process::{CommandRunner, Invocation};
use aabkit_core::Result;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

const REPOSITORY_URL: &str = "https://dl.google.com/android/repository";

/// Number of affirmative answers fed to `sdkmanager --licenses`
pub const LICENSE_ANSWERS: usize = 50;

/// An Android SDK root with command-line tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidSdk {
    /// SDK root (`ANDROID_HOME`)
    pub home: PathBuf,
}

impl AndroidSdk {
    /// `cmdline-tools/latest`
    pub fn cmdline_tools_dir(&self) -> PathBuf {
        self.home.join("cmdline-tools").join("latest")
    }

    /// Directory holding `sdkmanager`
    pub fn tools_bin(&self) -> PathBuf {
        self.cmdline_tools_dir().join("bin")
    }

    /// Path of the `sdkmanager` launcher
    pub fn sdkmanager(&self) -> PathBuf {
        self.tools_bin().join("sdkmanager")
    }

    /// An `sdkmanager` invocation with the SDK variables defaulted to this root
    ///
    /// Variables already set in the environment are left alone.
    pub fn sdkmanager_invocation(&self, config: &PipelineConfig) -> Invocation {
        ANDROID_SDK_VARS.iter().fold(
            Invocation::new(self.sdkmanager().to_string_lossy()),
            |inv, var| match config.android_var(var) {
                Some(_) => inv,
                None => inv.env(*var, &self.home),
            },
        )
    }
}

/// Default SDK root for a host, relative to the home directory
pub fn default_sdk_home(config: &PipelineConfig) -> Result<PathBuf> {
    config.host.require_supported("Android SDK")?;
    Ok(match config.host {
        HostOs::MacOs => config.home_dir.join("Library/Android/sdk"),
        _ => config.home_dir.join("Android/Sdk"),
    })
}

/// Command-line tools archive URL for a host
pub fn cmdline_tools_url(host: &HostOs, build: &str) -> Result<String> {
    host.require_supported("Android SDK")?;
    let os = match host {
        HostOs::MacOs => "mac",
        _ => "linux",
    };
    Ok(format!("{REPOSITORY_URL}/commandlinetools-{os}-{build}_latest.zip"))
}

/// Resolve the SDK root: `ANDROID_HOME`, `ANDROID_SDK_ROOT`, then the OS default
pub fn resolve_sdk_home(config: &PipelineConfig) -> Result<PathBuf> {
    let default = default_sdk_home(config)?;
    Ok(config.android_sdk_override().unwrap_or(default))
}

/// Install `cmdline-tools/latest` unless its `bin` directory already exists
///
/// Returns the SDK and whether anything was downloaded.
pub fn ensure_cmdline_tools(
    config: &PipelineConfig,
    fetcher: &dyn Fetcher,
) -> Result<(AndroidSdk, bool)> {
    let sdk = AndroidSdk {
        home: resolve_sdk_home(config)?,
    };

    if sdk.tools_bin().exists() {
        debug!(bin = %sdk.tools_bin().display(), "cmdline-tools present");
        return Ok((sdk, false));
    }

    let url = cmdline_tools_url(&config.host, &config.settings.toolchain.cmdline_tools_build)?;
    Status::info(&format!(
        "Android cmdline-tools not found. Installing into {}...",
        sdk.home.display()
    ));
    fs::create_dir_all(&sdk.home)?;

    let download = config.scratch_dir.join("cmdline-tools.zip");
    let unpacked = config.scratch_dir.join("clt");
    fetcher.fetch(&url, &download)?;
    archive::extract(&download, &unpacked)?;

    // The archive holds a single `cmdline-tools/` directory
    let extracted = archive::single_root(&unpacked)?;
    let dest = sdk.cmdline_tools_dir();
    if dest.exists() {
        fs::remove_dir_all(&dest)?;
    }
    archive::move_dir(&extracted, &dest)?;

    info!(dest = %dest.display(), "cmdline-tools installed");
    Ok((sdk, true))
}

/// Check `sdkmanager` runs, then install the configured packages
pub fn install_packages(
    config: &PipelineConfig,
    runner: &dyn CommandRunner,
    sdk: &AndroidSdk,
) -> Result<()> {
    run_echoed(runner, &sdk.sdkmanager_invocation(config).arg("--version")).map_err(|mut e| {
        e.message = format!("sdkmanager failed: {}", e.message);
        e
    })?;

    let install = sdk
        .sdkmanager_invocation(config)
        .arg("--install")
        .args(config.settings.toolchain.android_packages.iter().cloned());
    run_echoed(runner, &install)
}

/// Accept all SDK licenses non-interactively; failures are ignored
pub fn accept_licenses(config: &PipelineConfig, runner: &dyn CommandRunner, sdk: &AndroidSdk) {
    let licenses = sdk.sdkmanager_invocation(config).arg("--licenses");
    Status::command(&licenses.to_string());

    match runner.feed(&licenses, "y\n".repeat(LICENSE_ANSWERS).as_bytes()) {
        Ok(result) => debug!(exit_code = result.exit_code, "sdkmanager --licenses finished"),
        Err(e) => debug!(error = %e, "sdkmanager --licenses failed, ignoring"),
    }
}

/// Full Android SDK step: tools, packages, licenses
pub fn ensure_android_sdk(
    config: &PipelineConfig,
    runner: &dyn CommandRunner,
    fetcher: &dyn Fetcher,
) -> Result<AndroidSdk> {
    let (sdk, _) = ensure_cmdline_tools(config, fetcher)?;
    install_packages(config, runner, &sdk)?;
    accept_licenses(config, runner, &sdk);
    Ok(sdk)
}
