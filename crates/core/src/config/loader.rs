//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result, ResultExt};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from an explicit path, or search the project root.
    ///
    /// A relative explicit path is taken from the project root. An explicit
    /// path that does not exist is an error; finding nothing while searching
    /// falls back to defaults.
    pub fn load(project_root: &Path, path: Option<&Path>) -> Result<Self> {
        let config_path = match path.map(|p| project_root.join(p)) {
            Some(p) if !p.exists() => return Err(Error::config_not_found(&p)),
            Some(p) => Some(p),
            None => find_config_file(project_root),
        };

        let schema = if let Some(ref p) = config_path {
            debug!(path = %p.display(), "loading configuration");
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        Ok(Self {
            schema,
            path: config_path,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema: ConfigSchema::default(),
            path: None,
        }
    }
}

/// Find configuration file in standard locations
fn find_config_file(project_root: &Path) -> Option<PathBuf> {
    let candidates = [".aabkit.toml", "aabkit.toml", ".config/aabkit.toml"];

    candidates
        .iter()
        .map(|c| project_root.join(c))
        .find(|p| p.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Failed to read config file {}", path.display()))?;

    toml::from_str::<ConfigSchema>(&content)
        .map_err(Error::from)
        .context(format!("Failed to parse config file {}", path.display()))
}
