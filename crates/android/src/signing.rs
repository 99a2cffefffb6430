//! Upload keystore and `key.properties` provisioning
//!
//! Both files are created at most once. An existing keystore holds the only
//! copy of the upload key, so nothing here ever replaces either file.

use crate::run_echoed;
use aabkit_cli::output::Status;
use aabkit_cli::prompt::CredentialProvider;
use aabkit_core::config::PipelineConfig;
use aabkit_core::process::{CommandRunner, Invocation};
use aabkit_core::{Error, Result};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use tracing::{debug, info};

/// Attempts allowed for a password prompt before giving up
pub const MAX_PROMPT_ATTEMPTS: usize = 3;

/// `storeFile` value, relative to the `android/app` module
pub const STORE_FILE: &str = "keystore.jks";

/// Credentials as passed on the command line
#[derive(Debug, Clone, Default)]
pub struct SigningInputs {
    /// `--store-pass`
    pub store_password: Option<String>,
    /// `--key-pass`
    pub key_password: Option<String>,
    /// `--key-alias`
    pub key_alias: Option<String>,
}

/// Fully resolved signing credentials
#[derive(Clone, PartialEq, Eq)]
pub struct SigningCredentials {
    /// Keystore password
    pub store_password: String,
    /// Password of the upload key
    pub key_password: String,
    /// Alias of the upload key
    pub key_alias: String,
}

impl fmt::Debug for SigningCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningCredentials")
            .field("store_password", &"****")
            .field("key_password", &"****")
            .field("key_alias", &self.key_alias)
            .finish()
    }
}

impl SigningInputs {
    /// Ask `provider` for every value not supplied; empty values count as missing
    pub fn resolve(
        self,
        provider: &dyn CredentialProvider,
        default_alias: &str,
    ) -> Result<SigningCredentials> {
        let store_password = match non_empty(self.store_password) {
            Some(v) => v,
            None => ask_secret(provider, "Keystore password (storePassword): ")?,
        };
        let key_password = match non_empty(self.key_password) {
            Some(v) => v,
            None => ask_secret(provider, "Key password (keyPassword): ")?,
        };
        let key_alias = match non_empty(self.key_alias) {
            Some(v) => v,
            None => non_empty(Some(
                provider.text(&format!("Key alias (default '{default_alias}'): "))?,
            ))
            .unwrap_or_else(|| default_alias.to_string()),
        };

        Ok(SigningCredentials {
            store_password,
            key_password,
            key_alias,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn ask_secret(provider: &dyn CredentialProvider, prompt: &str) -> Result<String> {
    for _ in 0..MAX_PROMPT_ATTEMPTS {
        let answer = provider.secret(prompt)?;
        if !answer.is_empty() {
            return Ok(answer);
        }
        Status::warning("A value is required.");
    }
    Err(Error::invalid_input(format!(
        "No value given for \"{}\" after {MAX_PROMPT_ATTEMPTS} attempts",
        prompt.trim_end_matches([':', ' '])
    )))
}

/// What provisioning changed on disk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SigningOutcome {
    /// `keytool` generated a new keystore
    pub keystore_created: bool,
    /// `key.properties` was written
    pub properties_written: bool,
}

/// `keytool` command generating the upload keystore
pub fn keytool_invocation(config: &PipelineConfig, creds: &SigningCredentials) -> Invocation {
    let signing = &config.settings.signing;
    Invocation::new("keytool")
        .args(["-genkey", "-v", "-keystore"])
        .arg(config.keystore_path().to_string_lossy())
        .args(["-keyalg", signing.key_algorithm.as_str()])
        .args(["-keysize".to_string(), signing.key_size.to_string()])
        .args(["-validity".to_string(), signing.validity_days.to_string()])
        .args(["-alias", creds.key_alias.as_str()])
        .arg("-storepass")
        .secret_arg(creds.store_password.as_str())
        .arg("-keypass")
        .secret_arg(creds.key_password.as_str())
        .args(["-dname", signing.dname.as_str()])
}

/// Contents of `key.properties`
pub fn render_key_properties(creds: &SigningCredentials) -> String {
    format!(
        "storePassword={}\nkeyPassword={}\nkeyAlias={}\nstoreFile={STORE_FILE}\n",
        creds.store_password, creds.key_password, creds.key_alias
    )
}

/// Create whichever of the keystore and `key.properties` is missing
pub fn provision(
    config: &PipelineConfig,
    runner: &dyn CommandRunner,
    creds: &SigningCredentials,
) -> Result<SigningOutcome> {
    let mut outcome = SigningOutcome::default();

    let keystore = config.keystore_path();
    if keystore.exists() {
        info!(path = %keystore.display(), "keystore exists, keeping it");
    } else {
        Status::info(&format!("Generating keystore at {}", keystore.display()));
        if let Some(parent) = keystore.parent() {
            fs::create_dir_all(parent)?;
        }
        run_echoed(runner, &keytool_invocation(config, creds))?;
        outcome.keystore_created = true;
    }

    let properties = config.key_properties_path();
    if properties.exists() {
        info!(path = %properties.display(), "key.properties exists, keeping it");
    } else {
        Status::info(&format!("Writing {}", properties.display()));
        outcome.properties_written =
            write_new_secret_file(&properties, &render_key_properties(creds))?;
    }

    Ok(outcome)
}

/// Create `path` with owner-only permissions; `Ok(false)` if it already exists
fn write_new_secret_file(path: &Path, contents: &str) -> Result<bool> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    match options.open(path) {
        Ok(file) => {
            fill_or_remove(path, file, contents.as_bytes())?;
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Write `contents` to the freshly created `path`; a partial file is removed
/// so the next run creates it again
fn fill_or_remove(path: &Path, mut file: impl Write, contents: &[u8]) -> Result<()> {
    match file.write_all(contents).and_then(|()| file.flush()) {
        Ok(()) => Ok(()),
        Err(e) => {
            drop(file);
            if let Err(cleanup) = fs::remove_file(path) {
                debug!(path = %path.display(), error = %cleanup, "removing partial file failed");
            }
            Err(Error::from(e).with_context(format!("Failed to write {}", path.display())))
        }
    }
}
