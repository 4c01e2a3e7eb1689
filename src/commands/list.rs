//! List command handler.
//!
//! Shows servers (active first) with their services as a tree.

use super::{open_session, SessionOptions};
use crate::error::Result;
use crate::output::print_inventory;

/// Print the status counts and the inventory tree.
pub fn list_command(options: &SessionOptions) -> Result<()> {
    let session = open_session(options)?;
    print_inventory(session.store.inventory());
    Ok(())
}
