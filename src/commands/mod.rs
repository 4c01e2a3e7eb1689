//! CLI command handlers for rackboard.
//!
//! # Commands
//!
//! - [`board`] - Interactive board (default)
//! - [`list`] - Tree view of servers and services
//! - [`export`] - Standalone HTML snapshot
//! - [`config`] - Show or initialise the config file
//!
//! Every command that touches the inventory goes through [`open_session`],
//! so the board, the listing and the export all see the same seeded state.

mod board;
mod config;
mod export;
mod list;

pub use board::board_command;
pub use config::{config_command, config_to_toml_string};
pub use export::export_command;
pub use list::list_command;

use crate::config::{load_config, resolve_data_dir, Config};
use crate::error::Result;
use crate::logging::init_logging;
use crate::persistence::FileStorage;
use crate::seed::seed_if_empty;
use crate::store::InventoryStore;
use std::path::PathBuf;

/// Options shared by every inventory command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Overrides the configured data directory.
    pub data_dir: Option<PathBuf>,
    /// Skip the example inventory even when the store is empty.
    pub no_seed: bool,
}

/// A loaded inventory ready for a command to use.
pub struct Session {
    pub config: Config,
    pub data_dir: PathBuf,
    pub store: InventoryStore<FileStorage>,
}

/// Load the config file, then open the inventory through [`open_session_with`].
pub fn open_session(options: &SessionOptions) -> Result<Session> {
    let config = load_config()?;
    open_session_with(config, options)
}

/// Resolve the data directory, start logging, load the snapshot and seed
/// it when empty.
pub fn open_session_with(config: Config, options: &SessionOptions) -> Result<Session> {
    let data_dir = resolve_data_dir(&config, options.data_dir.as_deref())?;
    init_logging(&data_dir)?;

    let mut store = InventoryStore::open(FileStorage::with_dir(&data_dir));
    tracing::debug!(
        dir = %data_dir.display(),
        servers = store.servers().len(),
        services = store.services().len(),
        "inventory loaded"
    );

    if config.seed && !options.no_seed {
        seed_if_empty(&mut store);
    }

    Ok(Session {
        config,
        data_dir,
        store,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn options(dir: &TempDir, no_seed: bool) -> SessionOptions {
        SessionOptions {
            data_dir: Some(dir.path().to_path_buf()),
            no_seed,
        }
    }

    #[test]
    fn test_open_session_seeds_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let session = open_session_with(Config::default(), &options(&temp_dir, false)).unwrap();
        assert_eq!(session.data_dir, temp_dir.path());
        assert_eq!(session.store.servers().len(), 3);
        assert!(temp_dir.path().join("rackboard-v1.json").exists());
    }

    #[test]
    fn test_open_session_respects_no_seed() {
        let temp_dir = TempDir::new().unwrap();
        let session = open_session_with(Config::default(), &options(&temp_dir, true)).unwrap();
        assert!(session.store.inventory().is_empty());
        assert!(!temp_dir.path().join("rackboard-v1.json").exists());
    }

    #[test]
    fn test_open_session_respects_seed_setting() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            seed: false,
            ..Default::default()
        };
        let session = open_session_with(config, &options(&temp_dir, false)).unwrap();
        assert!(session.store.inventory().is_empty());
    }

    #[test]
    fn test_open_session_reloads_saved_inventory() {
        let temp_dir = TempDir::new().unwrap();
        {
            let mut session =
                open_session_with(Config::default(), &options(&temp_dir, false)).unwrap();
            let id = session.store.servers()[0].id.clone();
            session.store.delete_server(&id);
        }
        let session = open_session_with(Config::default(), &options(&temp_dir, false)).unwrap();
        assert_eq!(session.store.servers().len(), 2);
    }
}
