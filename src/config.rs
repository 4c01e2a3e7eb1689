use crate::controller::{DEFAULT_NOTICE_MS, MAX_NOTICE_MS};
use crate::error::{RackboardError, Result};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// The base config directory name under ~/.config/
const CONFIG_DIR_NAME: &str = "rackboard";

/// The filename for the configuration file.
const CONFIG_FILENAME: &str = "config.toml";

/// Subdirectory of the config directory used when `data_dir` is unset.
const DEFAULT_DATA_SUBDIR: &str = "data";

// ============================================================================
// Configuration
// ============================================================================

/// User configuration, read from `~/.config/rackboard/config.toml`.
///
/// Missing fields take their defaults, so a partial (or absent) file works.
///
/// # Example
///
/// ```toml
/// data_dir = "~/inventory"
/// seed = true
/// notice_ms = 1800
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the inventory snapshot and the log file.
    ///
    /// Defaults to `~/.config/rackboard/data`. A leading `~/` is expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Whether to install the example inventory on first launch.
    #[serde(default = "default_true")]
    pub seed: bool,

    /// How long a notice stays visible on the board, in milliseconds.
    #[serde(default = "default_notice_ms")]
    pub notice_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_notice_ms() -> u64 {
    DEFAULT_NOTICE_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            seed: true,
            notice_ms: DEFAULT_NOTICE_MS,
        }
    }
}

// ============================================================================
// Config Validation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Notices would vanish before they are drawn.
    ZeroNoticeDuration,
    /// Longer than [`MAX_NOTICE_MS`].
    NoticeDurationTooLong(u64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroNoticeDuration => {
                write!(f, "`notice_ms` must be greater than 0")
            }
            ConfigError::NoticeDurationTooLong(ms) => {
                write!(f, "`notice_ms` must be at most {MAX_NOTICE_MS}, got {ms}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Check a loaded configuration for values the board cannot work with.
pub fn validate_config(config: &Config) -> std::result::Result<(), ConfigError> {
    if config.notice_ms == 0 {
        return Err(ConfigError::ZeroNoticeDuration);
    }
    if config.notice_ms > MAX_NOTICE_MS {
        return Err(ConfigError::NoticeDurationTooLong(config.notice_ms));
    }
    Ok(())
}

// ============================================================================
// Config File Management
// ============================================================================

/// Written by `rackboard config --init`.
const DEFAULT_CONFIG_WITH_COMMENTS: &str = r#"# rackboard configuration

# Directory holding the inventory snapshot and log file.
# Defaults to ~/.config/rackboard/data when unset.
# data_dir = "~/.config/rackboard/data"

# Populate example servers and services the first time the board opens.
seed = true

# Milliseconds a notice stays visible on the board.
notice_ms = 1800
"#;

/// Get the rackboard config directory path (~/.config/rackboard/).
///
/// Does not create the directory.
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| RackboardError::Config("Could not determine home directory".to_string()))?;
    Ok(home.join(".config").join(CONFIG_DIR_NAME))
}

/// Path to `~/.config/rackboard/config.toml`.
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILENAME))
}

/// Load the configuration, falling back to defaults when the file is absent.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined, the file
/// cannot be read, it is not valid TOML, or it fails validation.
pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content).map_err(|e| {
        RackboardError::Config(format!(
            "Failed to parse config file at {:?}: {}",
            path, e
        ))
    })?;
    validate_config(&config).map_err(|e| RackboardError::Config(e.to_string()))?;

    Ok(config)
}

/// Write the commented default config file unless one already exists.
///
/// Returns the path and whether the file was newly created.
pub fn init_config() -> Result<(PathBuf, bool)> {
    init_config_at(&config_path()?)
}

fn init_config_at(path: &Path) -> Result<(PathBuf, bool)> {
    if path.exists() {
        return Ok((path.to_path_buf(), false));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, DEFAULT_CONFIG_WITH_COMMENTS)?;
    Ok((path.to_path_buf(), true))
}

/// Expand a leading `~/` against the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Where the inventory lives: the command-line override, then the config
/// file's `data_dir`, then `~/.config/rackboard/data`.
pub fn resolve_data_dir(config: &Config, override_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(expand_home(dir));
    }
    match &config.data_dir {
        Some(dir) => Ok(expand_home(dir)),
        None => Ok(config_dir()?.join(DEFAULT_DATA_SUBDIR)),
    }
}
