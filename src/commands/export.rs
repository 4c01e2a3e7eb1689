//! Export command handler.
//!
//! Writes the board as a standalone HTML page.

use super::{open_session, Session, SessionOptions};
use crate::error::Result;
use crate::output::{print_success, print_warning};
use crate::view::render_html;
use chrono::Utc;
use std::fs;
use std::path::Path;

/// Export the inventory to `path` as HTML, overwriting any existing file.
pub fn export_command(options: &SessionOptions, path: &Path) -> Result<()> {
    let session = open_session(options)?;
    if write_export(&session, path)? {
        print_warning(&format!("Replaced existing {}", path.display()));
    }
    print_success(&format!("Exported board to {}", path.display()));
    Ok(())
}

/// Returns whether an existing file was replaced.
fn write_export(session: &Session, path: &Path) -> Result<bool> {
    let replaced = path.exists();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let html = render_html(session.store.inventory(), Utc::now());
    fs::write(path, html)?;
    tracing::info!(path = %path.display(), replaced, "exported board");
    Ok(replaced)
}
