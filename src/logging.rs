//! Diagnostic logging.
//!
//! The board owns the terminal while it runs, so diagnostics go to
//! `rackboard.log` inside the data directory instead of stderr. The filter
//! comes from `RACKBOARD_LOG` (same syntax as `RUST_LOG`).

use crate::error::Result;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "RACKBOARD_LOG";

const LOG_FILE: &str = "rackboard.log";
const DEFAULT_FILTER: &str = "rackboard=info";

pub fn log_path(dir: &Path) -> PathBuf {
    dir.join(LOG_FILE)
}

/// Install the global subscriber, appending to the log file in `dir`.
///
/// Returns the log file path. Calling this again after a subscriber is
/// installed leaves the first one in place.
pub fn init_logging(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = log_path(dir);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    if installed.is_err() {
        tracing::debug!("log subscriber already installed");
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_logging_creates_log_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("data");
        let path = init_logging(&dir).unwrap();
        assert_eq!(path, dir.join("rackboard.log"));
        assert!(path.exists());
    }

    #[test]
    fn test_init_logging_twice_is_harmless() {
        let temp_dir = TempDir::new().unwrap();
        init_logging(temp_dir.path()).unwrap();
        assert!(init_logging(temp_dir.path()).is_ok());
    }
}
