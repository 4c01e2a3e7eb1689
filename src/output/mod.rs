//! Terminal output formatting for rackboard.
//!
//! Colored output for the non-interactive commands:
//!
//! - [`messages`] - Error, warning, info and success messages
//! - [`inventory`] - Tree view of servers and their services

pub mod inventory;
pub mod messages;

/// ANSI color codes for terminal output.
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const RED: &str = "\x1b[31m";
    pub const GRAY: &str = "\x1b[90m";
}

pub use colors::*;

pub use inventory::print_inventory;
pub use messages::{print_error, print_info, print_success, print_warning};
