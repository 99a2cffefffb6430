//! Release App Bundle build
//!
//! Runs the Flutter build sequence from the project root, then checks the
//! bundle was produced. When the pipeline installed or located a Flutter SDK
//! its `bin` directory goes first on `PATH`; otherwise `flutter` is resolved
//! from the inherited `PATH`.

use crate::flutter::FlutterInstall;
use crate::run_echoed;
use aabkit_core::config::PipelineConfig;
use aabkit_core::process::{prepend_path, CommandRunner, Invocation};
use aabkit_core::{Error, Result};
use std::path::PathBuf;
use tracing::info;

/// `flutter` subcommands run in order; the first failure stops the build
pub const BUILD_STEPS: [&[&str]; 4] = [
    &["doctor", "-v"],
    &["clean"],
    &["pub", "get"],
    &["build", "appbundle", "--release"],
];

/// The `flutter` invocations of the build sequence
pub fn build_invocations(
    config: &PipelineConfig,
    flutter: Option<&FlutterInstall>,
) -> Result<Vec<Invocation>> {
    let (program, path) = match flutter {
        Some(install) => (
            install.bin_dir().join("flutter").to_string_lossy().into_owned(),
            Some(prepend_path(&install.bin_dir(), config.search_path.as_deref())?),
        ),
        None => ("flutter".to_string(), None),
    };

    Ok(BUILD_STEPS
        .iter()
        .map(|args| {
            let invocation = Invocation::new(program.as_str())
                .args(args.iter().copied())
                .current_dir(&config.project_root);
            match &path {
                Some(path) => invocation.env("PATH", path.clone()),
                None => invocation,
            }
        })
        .collect())
}

/// Run the build sequence and return the bundle path
pub fn build_bundle(
    config: &PipelineConfig,
    runner: &dyn CommandRunner,
    flutter: Option<&FlutterInstall>,
) -> Result<PathBuf> {
    for invocation in build_invocations(config, flutter)? {
        run_echoed(runner, &invocation)?;
    }

    let artifact = config.artifact_path();
    if !artifact.is_file() {
        return Err(Error::artifact_missing(&artifact));
    }

    info!(artifact = %artifact.display(), "bundle built");
    Ok(artifact)
}
