//! Archive extraction and directory moves
//!
//! Supports the two formats toolchains ship in:
//! - `.zip` (Flutter on macOS, Android command-line tools everywhere)
//! - `.tar.xz` (Flutter on Linux)
//!
//! Unix permission bits are preserved so extracted launchers stay executable.

use aabkit_cli::progress;
use aabkit_core::{Error, Result};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Supported archive formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// PKZIP archive
    Zip,
    /// xz-compressed tarball
    TarXz,
}

impl ArchiveKind {
    /// Guess the format from a file name
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
            Some(Self::TarXz)
        } else {
            None
        }
    }

    /// Canonical file extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarXz => "tar.xz",
        }
    }
}

/// Unpack `archive` into `dest`, creating `dest` if needed
pub fn extract(archive: &Path, dest: &Path) -> Result<()> {
    let kind = ArchiveKind::from_path(archive).ok_or_else(|| {
        Error::archive(format!("Unsupported archive format: {}", archive.display()))
    })?;

    fs::create_dir_all(dest)?;
    debug!(archive = %archive.display(), dest = %dest.display(), ?kind, "extracting");

    let name = archive
        .file_name()
        .map_or_else(|| archive.display().to_string(), |n| n.to_string_lossy().into_owned());
    let pb = progress::spinner(&format!("Unpacking {name}..."));
    let unpacked = match kind {
        ArchiveKind::Zip => extract_zip(archive, dest),
        ArchiveKind::TarXz => extract_tar_xz(archive, dest),
    };
    match &unpacked {
        Ok(()) => progress::finish_success(&pb, &format!("Unpacked {name}")),
        Err(_) => progress::finish_error(&pb, &format!("Failed to unpack {name}")),
    }
    unpacked?;

    info!("Unpacked {} to {}", archive.display(), dest.display());
    Ok(())
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file))
        .map_err(|e| Error::archive(format!("Failed to open {}: {}", archive.display(), e)))?;

    zip.extract(dest)
        .map_err(|e| Error::archive(format!("Failed to extract {}: {}", archive.display(), e)))
}

fn extract_tar_xz(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive)?;
    let decoder = xz2::read::XzDecoder::new(BufReader::new(file));
    let mut tarball = tar::Archive::new(decoder);
    tarball.set_preserve_permissions(true);

    tarball.unpack(dest).map_err(|e| {
        Error::archive(format!("Failed to extract {}: {}", archive.display(), e)).with_source(e)
    })
}

/// The single top-level directory an archive was extracted into
pub fn single_root(dir: &Path) -> Result<PathBuf> {
    let mut entries = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .collect::<Vec<_>>();

    match entries.len() {
        1 if entries[0].is_dir() => Ok(entries.remove(0)),
        _ => Err(Error::archive(format!(
            "Expected a single directory in {}, found {} entries",
            dir.display(),
            entries.len()
        ))),
    }
}

/// Move a directory tree, copying when a rename crosses filesystems
pub fn move_dir(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }

    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    debug!(from = %from.display(), to = %to.display(), "rename failed, copying");
    copy_dir(from, to)?;
    fs::remove_dir_all(from)?;
    Ok(())
}

fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    for entry in WalkDir::new(from).follow_links(false) {
        let entry = entry.map_err(|e| Error::io(format!("Failed to walk {}: {}", from.display(), e)))?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| Error::io(e.to_string()))?;
        let target = to.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    let points_to = fs::read_link(link)?;
    std::os::unix::fs::symlink(points_to, target)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    fs::copy(link, target)?;
    Ok(())
}
