//! Toolchain downloads
//!
//! Installers ask a [`Fetcher`] for bytes instead of opening connections
//! themselves, so tests can prove that an already-provisioned machine never
//! touches the network.

use aabkit_cli::output::format_size;
use aabkit_cli::progress;
use aabkit_core::{Error, Result};
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Downloads a URL to a local file
pub trait Fetcher {
    /// Fetch `url` into `dest`, replacing any existing file
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// HTTP(S) downloads with a terminal progress bar
///
/// No timeout is applied; toolchain archives are large and a stalled
/// transfer is left for the user to interrupt.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client with no request timeout
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(None::<Duration>)
            .user_agent(concat!("aabkit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::download(format!("Failed to create HTTP client: {e}")).with_source(e))?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        info!("Fetching {}", url);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::download(format!("Failed to download {url}: {e}")).with_source(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::download(format!("Failed to download {url}: HTTP {status}"))
                .with_suggestion("Check your network connection and retry"));
        }

        let name = dest
            .file_name()
            .map_or_else(|| url.to_string(), |n| n.to_string_lossy().into_owned());
        let pb = progress::download_bar(response.content_length(), &name);

        let mut reader = pb.wrap_read(response);
        let copied = File::create(dest).and_then(|mut file| io::copy(&mut reader, &mut file));

        match copied {
            Ok(bytes) => {
                progress::finish_success(&pb, &format!("{name} ({})", format_size(bytes)));
                debug!(bytes, dest = %dest.display(), "download complete");
                Ok(())
            }
            Err(e) => {
                progress::finish_error(&pb, &name);
                let _ = fs::remove_file(dest);
                Err(Error::download(format!("Failed to download {url}: {e}")).with_source(e))
            }
        }
    }
}
