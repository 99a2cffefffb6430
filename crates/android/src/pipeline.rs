//! Release pipeline orchestration
//!
//! Verify Java, install Flutter, install the Android SDK, provision signing,
//! build. Steps run strictly in order and the first error aborts the run.

use crate::bundle::build_bundle;
use crate::fetch::Fetcher;
use crate::flutter::{ensure_flutter, FlutterInstall};
use crate::java::{verify_java, JavaVersion};
use crate::sdk::{ensure_android_sdk, AndroidSdk};
use crate::signing::{provision, SigningInputs, SigningOutcome};
use aabkit_cli::output::Status;
use aabkit_cli::prompt::CredentialProvider;
use aabkit_core::config::PipelineConfig;
use aabkit_core::process::CommandRunner;
use aabkit_core::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Per-run choices from the command line
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Leave Flutter and the Android SDK alone; both must already be usable
    pub skip_install: bool,
    /// Credentials supplied up front
    pub signing: SigningInputs,
}

/// What a successful run did
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Active JDK
    pub java: JavaVersion,
    /// Flutter SDK used for the build, `None` with `skip_install`
    pub flutter: Option<FlutterInstall>,
    /// Android SDK, `None` with `skip_install`
    pub sdk: Option<AndroidSdk>,
    /// Signing files created during this run
    pub signing: SigningOutcome,
    /// The built App Bundle
    pub artifact: PathBuf,
}

/// Removes the scratch directory when dropped
struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    fn create(path: &Path) -> Result<Self> {
        fs::create_dir_all(path)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.path) {
            debug!(path = %self.path.display(), error = %e, "scratch cleanup failed, ignoring");
        }
    }
}

/// Fail unless the project root is an existing Flutter project
///
/// Runs before anything is written, so a mistyped `--project-root` never
/// receives a keystore.
fn require_flutter_project(config: &PipelineConfig) -> Result<()> {
    let pubspec = config.pubspec_path();
    if pubspec.is_file() {
        return Ok(());
    }

    let context = if config.project_root.is_dir() {
        format!("{} is not a Flutter project", config.project_root.display())
    } else {
        format!("Project directory {} does not exist", config.project_root.display())
    };
    Err(Error::file_not_found(&pubspec)
        .with_context(context)
        .with_suggestion("Run aabkit from a Flutter project or pass --project-root <DIR>"))
}

/// The release pipeline and the seams it runs through
pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    runner: &'a dyn CommandRunner,
    fetcher: &'a dyn Fetcher,
    prompt: &'a dyn CredentialProvider,
}

impl<'a> Pipeline<'a> {
    /// Wire a pipeline to its configuration and effect providers
    pub fn new(
        config: &'a PipelineConfig,
        runner: &'a dyn CommandRunner,
        fetcher: &'a dyn Fetcher,
        prompt: &'a dyn CredentialProvider,
    ) -> Self {
        Self {
            config,
            runner,
            fetcher,
            prompt,
        }
    }

    /// Run every step, stopping at the first failure
    pub fn run(&self, options: PipelineOptions) -> Result<PipelineReport> {
        let config = self.config;
        let total = if options.skip_install { 3 } else { 5 };
        let mut step = 0;
        let mut next = |message: &str| {
            step += 1;
            Status::step(step, total, message);
        };

        require_flutter_project(config)?;
        let _scratch = ScratchDir::create(&config.scratch_dir)?;
        info!(project = %config.project_root.display(), host = %config.host, "starting release build");

        next("Checking Java");
        let java = verify_java(config, self.runner)?;
        Status::success(&format!("Java {} ({})", java.major, java.raw));

        let (flutter, sdk) = if options.skip_install {
            info!("skipping Flutter and Android SDK installation");
            (None, None)
        } else {
            next("Ensuring Flutter SDK");
            let flutter = ensure_flutter(config, self.fetcher)?;

            next("Ensuring Android SDK");
            let sdk = ensure_android_sdk(config, self.runner, self.fetcher)?;
            Status::success(&format!("Android SDK ready at {}", sdk.home.display()));

            (Some(flutter), Some(sdk))
        };

        next("Provisioning signing");
        let creds = options
            .signing
            .resolve(self.prompt, &config.settings.signing.default_alias)?;
        let signing = provision(config, self.runner, &creds)?;

        next("Building release App Bundle");
        let artifact = build_bundle(config, self.runner, flutter.as_ref())?;

        Ok(PipelineReport {
            java,
            flutter,
            sdk,
            signing,
            artifact,
        })
    }
}
