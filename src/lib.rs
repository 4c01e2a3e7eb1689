//! rackboard: a terminal inventory board for servers and the services
//! deployed on them.
//!
//! The [`store::InventoryStore`] holds the inventory and persists every
//! change through a [`persistence::Storage`] backend. The
//! [`controller::Controller`] turns user intents into store calls and
//! notices, and [`tui`] draws it all.

pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;
pub mod output;
pub mod persistence;
pub mod seed;
pub mod store;
pub mod tui;
pub mod view;

pub use controller::{Command, Controller};
pub use error::{RackboardError, Result};
pub use model::{Inventory, Server, Service, Status};
pub use persistence::{FileStorage, MemoryStorage, Persistence, Storage};
pub use store::{InventoryStore, ReassignOutcome, RejectReason};
