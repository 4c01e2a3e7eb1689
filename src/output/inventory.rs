//! Tree view of the inventory for `rackboard list`.

use super::colors::*;
use crate::model::{Inventory, Status};
use crate::view::{boards, sanitize_terminal, Stats, EMPTY_BOARD_HINT, EMPTY_INVENTORY_HINT};

fn status_tag(status: Status) -> String {
    match status {
        Status::Active => format!("{GREEN}[active]{RESET}"),
        Status::Inactive => format!("{GRAY}[inactive]{RESET}"),
    }
}

/// Build the tree lines: servers (active first) with their services.
pub fn format_inventory(inventory: &Inventory) -> Vec<String> {
    let mut lines = Vec::new();
    let boards = boards(inventory);

    if boards.is_empty() {
        lines.push(format!("{GRAY}{EMPTY_INVENTORY_HINT}{RESET}"));
        return lines;
    }

    let total = boards.len();
    for (idx, board) in boards.iter().enumerate() {
        let is_last_server = idx == total - 1;
        let branch_char = if is_last_server { "└" } else { "├" };
        let cont_char = if is_last_server { " " } else { "│" };

        lines.push(format!(
            "{branch_char}── {BOLD}{}{RESET} {GRAY}{}{RESET} {} {DIM}({}){RESET}",
            sanitize_terminal(&board.server.name),
            sanitize_terminal(&board.meta_line()),
            status_tag(board.server.status),
            board.count_label()
        ));

        if board.services.is_empty() {
            lines.push(format!("{cont_char}   └── {GRAY}{EMPTY_BOARD_HINT}{RESET}"));
        }
        for (svc_idx, service) in board.services.iter().enumerate() {
            let sub_branch = if svc_idx == board.services.len() - 1 {
                "└"
            } else {
                "├"
            };
            let desc = if service.desc.is_empty() {
                String::new()
            } else {
                format!(" {GRAY}{}{RESET}", sanitize_terminal(&service.desc))
            };
            lines.push(format!(
                "{cont_char}   {sub_branch}── {}{desc} {}",
                sanitize_terminal(&service.name),
                status_tag(service.status)
            ));
        }
    }
    lines
}

/// Print the status counts and the inventory tree.
pub fn print_inventory(inventory: &Inventory) {
    println!("{CYAN}{BOLD}{}{RESET}", Stats::of(inventory));
    println!();
    for line in format_inventory(inventory) {
        println!("{line}");
    }
}
