//! View models derived from the inventory.
//!
//! Everything here is a pure function of an [`Inventory`]: status counts,
//! the per-server board grouping, and the options offered by the service
//! form's server picker. The terminal board and the HTML export both
//! render from these.

use crate::model::{Inventory, Server, Service, Status};
use chrono::{DateTime, Utc};
use std::fmt;
use std::fmt::Write as _;

/// Shown on a server board with no services.
pub const EMPTY_BOARD_HINT: &str = "No services";

/// Shown instead of boards when there are no servers at all.
pub const EMPTY_INVENTORY_HINT: &str = "No servers yet. Add a server to create the first board.";

/// Placeholder picker entry when no server can take a service.
pub const NO_ACTIVE_SERVERS: &str = "— No active servers —";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub active_servers: usize,
    pub total_servers: usize,
    pub active_services: usize,
    pub total_services: usize,
}

impl Stats {
    pub fn of(inventory: &Inventory) -> Self {
        Self {
            active_servers: inventory
                .servers
                .iter()
                .filter(|s| s.status.is_active())
                .count(),
            total_servers: inventory.servers.len(),
            active_services: inventory
                .services
                .iter()
                .filter(|s| s.status.is_active())
                .count(),
            total_services: inventory.services.len(),
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} servers · {}/{} services",
            self.active_servers, self.total_servers, self.active_services, self.total_services
        )
    }
}

/// One server column with the services deployed on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerBoard<'a> {
    pub server: &'a Server,
    pub services: Vec<&'a Service>,
}

impl ServerBoard<'_> {
    pub fn count_label(&self) -> String {
        format!("{} svc", self.services.len())
    }

    /// `ip · note`, dropping the note when empty.
    pub fn meta_line(&self) -> String {
        if self.server.note.is_empty() {
            self.server.ip.clone()
        } else {
            format!("{} · {}", self.server.ip, self.server.note)
        }
    }
}

/// Active servers first, then inactive, each keeping stored order.
pub fn boards(inventory: &Inventory) -> Vec<ServerBoard<'_>> {
    let active = inventory.servers.iter().filter(|s| s.status.is_active());
    let inactive = inventory.servers.iter().filter(|s| !s.status.is_active());
    active
        .chain(inactive)
        .map(|server| ServerBoard {
            server,
            services: inventory
                .services
                .iter()
                .filter(|svc| svc.server_id == server.id)
                .collect(),
        })
        .collect()
}

/// An entry in the service form's server picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerOption {
    /// Empty for the placeholder entry.
    pub id: String,
    pub label: String,
    pub selectable: bool,
}

/// Picker entries: active servers are selectable. While an edit is in
/// progress inactive servers are listed too, unselectable, so the edited
/// service's current server stays visible.
pub fn server_options(inventory: &Inventory, editing: bool) -> Vec<ServerOption> {
    let mut options: Vec<ServerOption> = inventory
        .servers
        .iter()
        .filter(|s| s.status.is_active())
        .map(|s| ServerOption {
            id: s.id.clone(),
            label: s.label(),
            selectable: true,
        })
        .collect();

    if options.is_empty() {
        return vec![ServerOption {
            id: String::new(),
            label: NO_ACTIVE_SERVERS.to_string(),
            selectable: false,
        }];
    }

    if editing {
        options.extend(
            inventory
                .servers
                .iter()
                .filter(|s| s.status == Status::Inactive)
                .map(|s| ServerOption {
                    id: s.id.clone(),
                    label: format!("{} - inactive", s.label()),
                    selectable: false,
                }),
        );
    }
    options
}

/// Escape text for embedding in HTML element content or attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Drop control characters (escape sequences included) before text is
/// drawn in the terminal.
pub fn sanitize_terminal(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

fn status_badge(status: Status) -> String {
    let class = match status {
        Status::Active => "active",
        Status::Inactive => "inactive",
    };
    format!(r#"<span class="status-badge {class}">{}</span>"#, status.label())
}

/// A standalone HTML page of the board.
pub fn render_html(inventory: &Inventory, generated_at: DateTime<Utc>) -> String {
    let mut html = String::new();
    let stats = Stats::of(inventory);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>rackboard</title>\n<style>\n");
    html.push_str(
        "body{font-family:sans-serif;margin:24px}\
         .boards{display:flex;gap:16px;flex-wrap:wrap}\
         .board{border:1px solid #ccc;border-radius:8px;padding:12px;min-width:220px}\
         .board.inactive,.card.inactive{opacity:.55}\
         .card{border:1px solid #ddd;border-radius:6px;padding:8px;margin-top:8px}\
         .status-badge.active{color:#15803d}.status-badge.inactive{color:#b91c1c}\
         .empty{color:#888}\n",
    );
    html.push_str("</style>\n</head>\n<body>\n");
    let _ = writeln!(html, "<header><h1>rackboard</h1><p id=\"stats\">{}</p></header>", escape_html(&stats.to_string()));

    html.push_str("<main class=\"boards\">\n");
    let boards = boards(inventory);
    if boards.is_empty() {
        let _ = writeln!(html, "<div class=\"empty\">{}</div>", escape_html(EMPTY_INVENTORY_HINT));
    }
    for board in &boards {
        let server = board.server;
        let inactive = if server.status.is_active() { "" } else { " inactive" };
        let _ = writeln!(html, "<section class=\"board{inactive}\" data-server=\"{}\">", escape_html(&server.id));
        let _ = writeln!(
            html,
            "<div class=\"board-title\">{}</div><div class=\"board-meta\">{} · {}</div><div class=\"board-sub\">{}</div>",
            escape_html(&server.name),
            escape_html(&board.meta_line()),
            status_badge(server.status),
            escape_html(&board.count_label())
        );
        if board.services.is_empty() {
            let _ = writeln!(html, "<div class=\"empty\">{EMPTY_BOARD_HINT}</div>");
        }
        for service in &board.services {
            let inactive = if service.status.is_active() { "" } else { " inactive" };
            let _ = write!(html, "<article class=\"card{inactive}\"><h4>{}</h4>", escape_html(&service.name));
            if !service.desc.is_empty() {
                let _ = write!(html, "<p>{}</p>", escape_html(&service.desc));
            }
            let _ = writeln!(html, "{}</article>", status_badge(service.status));
        }
        html.push_str("</section>\n");
    }
    html.push_str("</main>\n");
    let _ = writeln!(
        html,
        "<footer class=\"empty\">Generated {}</footer>",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    html.push_str("</body>\n</html>\n");
    html
}
