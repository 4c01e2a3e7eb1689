//! Board command handler.
//!
//! Opens the interactive board on the loaded inventory.

use super::{open_session, SessionOptions};
use crate::controller::Controller;
use crate::error::Result;
use crate::tui::run_board;

/// Run the interactive board until the user quits.
pub fn board_command(options: &SessionOptions) -> Result<()> {
    let session = open_session(options)?;
    tracing::debug!(dir = %session.data_dir.display(), "opening board");
    let controller = Controller::new(session.store).with_notice_ms(session.config.notice_ms);
    run_board(controller)
}
