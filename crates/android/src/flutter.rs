//! Flutter SDK installation
//!
//! An existing Flutter is found on `PATH` first, then at `~/flutter`. Only
//! when neither exists is the stable release archive downloaded and
//! unpacked into the home directory.

use crate::archive::{self, ArchiveKind};
use crate::fetch::Fetcher;
use aabkit_cli::output::Status;
use aabkit_core::config::PipelineConfig;
use aabkit_core::platform::HostOs;
use aabkit_core::process::find_on_path;
use aabkit_core::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::info;

const RELEASES_URL: &str = "https://storage.googleapis.com/flutter_infra_release/releases/stable";

/// Where a Flutter installation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlutterSource {
    /// `flutter` was found on the search path
    OnPath,
    /// `~/flutter` already existed
    Existing,
    /// Downloaded during this run
    Downloaded,
}

/// A usable Flutter SDK
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlutterInstall {
    /// SDK root (the directory containing `bin/flutter`)
    pub root: PathBuf,
    /// How the SDK was found
    pub source: FlutterSource,
}

impl FlutterInstall {
    /// Directory to put on `PATH`
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }
}

/// Release archive URL and format for a host
pub fn release_archive(host: &HostOs, version: &str) -> Result<(String, ArchiveKind)> {
    host.require_supported("Flutter")?;
    Ok(match host {
        HostOs::MacOs => (
            format!("{RELEASES_URL}/macos/flutter_macos_{version}-stable.zip"),
            ArchiveKind::Zip,
        ),
        _ => (
            format!("{RELEASES_URL}/linux/flutter_linux_{version}-stable.tar.xz"),
            ArchiveKind::TarXz,
        ),
    })
}

/// Find Flutter or install it into the home directory
pub fn ensure_flutter(config: &PipelineConfig, fetcher: &dyn Fetcher) -> Result<FlutterInstall> {
    if let Some(root) = root_on_path(config) {
        Status::info(&format!("Found Flutter: {}", root.join("bin/flutter").display()));
        return Ok(FlutterInstall {
            root,
            source: FlutterSource::OnPath,
        });
    }

    let root = config.flutter_home();
    if root.exists() {
        Status::info(&format!("Using existing Flutter at {}", root.display()));
        return Ok(FlutterInstall {
            root,
            source: FlutterSource::Existing,
        });
    }

    let version = &config.settings.toolchain.flutter_version;
    let (url, kind) = release_archive(&config.host, version)?;

    Status::info(&format!("Flutter not found. Downloading stable {version}..."));
    let download = config.scratch_dir.join(format!("flutter.{}", kind.extension()));
    fetcher.fetch(&url, &download)?;
    archive::extract(&download, &config.home_dir)?;

    if !root.join("bin").join("flutter").is_file() {
        return Err(Error::archive(format!(
            "Flutter archive did not produce {}",
            root.join("bin/flutter").display()
        ))
        .with_context(url));
    }

    info!(root = %root.display(), "flutter installed");
    Status::success(&format!("Flutter installed at: {}", root.display()));
    Status::info(&format!("Be sure your PATH includes: {}", root.join("bin").display()));

    Ok(FlutterInstall {
        root,
        source: FlutterSource::Downloaded,
    })
}

/// `<root>/bin/flutter` on the search path yields `<root>`
fn root_on_path(config: &PipelineConfig) -> Option<PathBuf> {
    let exe = find_on_path("flutter", config.search_path.as_deref(), &config.project_root)?;
    exe.parent().and_then(Path::parent).map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{executable, tar_xz_bytes, test_config, FakeFetcher};
    use aabkit_core::ErrorCode;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_release_archive_urls() {
        let (url, kind) = release_archive(&HostOs::MacOs, "3.24.5").unwrap();
        assert_eq!(
            url,
            "https://storage.googleapis.com/flutter_infra_release/releases/stable/macos/flutter_macos_3.24.5-stable.zip"
        );
        assert_eq!(kind, ArchiveKind::Zip);

        let (url, kind) = release_archive(&HostOs::Linux, "3.24.5").unwrap();
        assert!(url.ends_with("/linux/flutter_linux_3.24.5-stable.tar.xz"));
        assert_eq!(kind, ArchiveKind::TarXz);
    }

    #[test]
    fn test_flutter_on_path_is_used() {
        let temp = TempDir::new().unwrap();
        let sdk = temp.path().join("opt/flutter");
        executable(&sdk.join("bin/flutter"));

        let config = test_config(temp.path()).with_search_path(Some(sdk.join("bin").into()));
        let fetcher = FakeFetcher::new();

        let install = ensure_flutter(&config, &fetcher).unwrap();
        assert_eq!(install.source, FlutterSource::OnPath);
        assert_eq!(install.root, sdk);
        assert!(fetcher.urls().is_empty());
    }

    #[test]
    fn test_existing_home_install_is_used() {
        let temp = TempDir::new().unwrap();
        let config = test_config(temp.path());
        fs::create_dir_all(config.flutter_home()).unwrap();
        let fetcher = FakeFetcher::new();

        let install = ensure_flutter(&config, &fetcher).unwrap();
        assert_eq!(install.source, FlutterSource::Existing);
        assert!(fetcher.urls().is_empty());
    }

    #[test]
    fn test_downloads_and_extracts_into_home() {
        let temp = TempDir::new().unwrap();
        let config = test_config(temp.path());
        let (url, _) = release_archive(&HostOs::Linux, "3.24.5").unwrap();
        let fetcher = FakeFetcher::new()
            .serve(&url, tar_xz_bytes(&[("flutter/bin/flutter", b"#!/bin/sh\n")]));

        let install = ensure_flutter(&config, &fetcher).unwrap();
        assert_eq!(install.source, FlutterSource::Downloaded);
        assert_eq!(install.root, config.flutter_home());
        assert!(install.bin_dir().join("flutter").is_file());
        assert_eq!(fetcher.urls(), vec![url]);
    }

    #[test]
    fn test_unexpected_archive_layout() {
        let temp = TempDir::new().unwrap();
        let config = test_config(temp.path());
        let (url, _) = release_archive(&HostOs::Linux, "3.24.5").unwrap();
        let fetcher = FakeFetcher::new().serve(&url, tar_xz_bytes(&[("sdk/README", b"hi")]));

        let err = ensure_flutter(&config, &fetcher).unwrap_err();
        assert_eq!(err.code, ErrorCode::ArchiveError);
    }

    #[test]
    fn test_unsupported_os_fails_before_fetching() {
        let temp = TempDir::new().unwrap();
        let mut config = test_config(temp.path());
        config.host = HostOs::from_name("windows");
        let fetcher = FakeFetcher::new();

        let err = ensure_flutter(&config, &fetcher).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedPlatform);
        assert!(fetcher.urls().is_empty());
    }
}
