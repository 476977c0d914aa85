//! Tool configuration in `<config dir>/hunk-review/config.toml`.

use crate::collect::DEFAULT_CONCURRENCY;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name under the platform config dir.
const APP_DIR: &str = "hunk-review";

/// Filename for the configuration.
const CONFIG_FILE: &str = "config.toml";

/// Default notification lookback in days.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 3;

const fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

const fn default_lookback_days() -> u32 {
    DEFAULT_LOOKBACK_DAYS
}

/// Persistent settings; CLI flags override them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Notifications resolved at once while collecting
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// How far back to read the notification feed
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// GitHub Enterprise host; github.com when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Approve PR siblings along with an approved hunk
    #[serde(default)]
    pub propagate: bool,
    /// Never call the approve endpoints
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            host: None,
            propagate: false,
            dry_run: false,
        }
    }
}

/// Default config file location.
pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
        .ok_or_else(|| Error::Config("could not determine config directory".to_string()))
}

/// Config file to use: the explicit one, else the default location.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    explicit.map_or_else(default_config_path, |p| Ok(p.to_path_buf()))
}

/// Load configuration from disk.
///
/// Returns defaults if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;

    if config.concurrency == 0 {
        return Err(Error::Config(format!(
            "{}: concurrency must be at least 1",
            path.display()
        )));
    }

    Ok(config)
}

/// Save configuration to disk.
///
/// Creates the parent directory if it doesn't exist.
pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
        && !dir.exists()
    {
        fs::create_dir_all(dir)
            .map_err(|e| Error::Config(format!("failed to create {}: {e}", dir.display())))?;
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))?;

    let content_with_header = format!(
        "# hunk-review configuration\n# Command-line flags take precedence over these values\n\n{content}"
    );

    fs::write(path, content_with_header)
        .map_err(|e| Error::Config(format!("failed to write {}: {e}", path.display())))?;

    Ok(())
}
