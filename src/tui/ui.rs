//! Board layout and widget definitions.
//!
//! # Layout Structure
//!
//! ```text
//! ┌──────────────────── Header ────────────────────┐
//! │ rackboard │ 2/3 servers · 3/4 services          │
//! └────────────────────────────────────────────────┘
//! ┌ srv-app-01 ───┐┌ srv-db-01 ────┐┌ srv-test-01 ──┐
//! │ 192.168.1.10  ││ 192.168.1.20  ││ 192.168.1.30  │
//! │ ● Active      ││ ● Active      ││ ● Inactive    │
//! │  Orders API   ││  PostgreSQL   ││  No services  │
//! │  Website      ││  Redis Cache  ││               │
//! └───────────────┘└───────────────┘└───────────────┘
//!  footer: notice or key help
//! ```
//!
//! The add/edit modal and the delete confirmation are drawn on top.

use super::app::{BoardApp, FormField, Selection};
use crate::controller::{ModalState, NoticeLevel, Tab};
use crate::model::{EditTarget, Status};
use crate::persistence::Storage;
use crate::view::{boards, sanitize_terminal, ServerBoard, Stats, EMPTY_BOARD_HINT};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

/// Cyan - primary branding color, used for headers and the cursor
const COLOR_PRIMARY: Color = Color::Cyan;
const COLOR_SUCCESS: Color = Color::Green;
/// Yellow - a service is being carried
const COLOR_DRAG: Color = Color::Yellow;
const COLOR_ERROR: Color = Color::Red;
const COLOR_DIM: Color = Color::DarkGray;

/// Minimum width of a server column before columns start scrolling.
const COLUMN_WIDTH: u16 = 30;

/// Render the whole board.
pub fn render<S: Storage>(frame: &mut Frame, app: &BoardApp<S>) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with stats
            Constraint::Min(0),    // Server columns
            Constraint::Length(1), // Footer
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_boards(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);

    if let ModalState::Open(tab) = app.controller().modal() {
        render_modal(frame, app, tab, area);
    }
    if let Some(target) = app.controller().pending_delete() {
        render_confirm(frame, app, target, area);
    }
}

fn status_span(status: Status) -> Span<'static> {
    match status {
        Status::Active => Span::styled("● Active", Style::default().fg(COLOR_SUCCESS)),
        Status::Inactive => Span::styled("● Inactive", Style::default().fg(COLOR_ERROR)),
    }
}

fn render_header<S: Storage>(frame: &mut Frame, app: &BoardApp<S>, area: Rect) {
    let stats = Stats::of(app.controller().store().inventory());
    let line = Line::from(vec![
        Span::styled(
            "rackboard",
            Style::default()
                .fg(COLOR_PRIMARY)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" │ ", Style::default().fg(COLOR_DIM)),
        Span::styled(stats.to_string(), Style::default().fg(Color::White)),
    ]);
    let header = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_PRIMARY)),
    );
    frame.render_widget(header, area);
}

fn render_boards<S: Storage>(frame: &mut Frame, app: &BoardApp<S>, area: Rect) {
    let inventory = app.controller().store().inventory();
    let boards = boards(inventory);

    if boards.is_empty() {
        let hint = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  No servers yet. Press 'a' to add the first one.",
                Style::default().fg(COLOR_DIM),
            )),
        ]);
        frame.render_widget(hint, area);
        return;
    }

    let visible = usize::from((area.width / COLUMN_WIDTH).max(1));
    let first = (app.column() + 1).saturating_sub(visible);
    let shown = &boards[first..boards.len().min(first + visible)];
    let constraints: Vec<Constraint> = shown
        .iter()
        .map(|_| Constraint::Ratio(1, shown.len() as u32))
        .collect();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (offset, board) in shown.iter().enumerate() {
        render_column(frame, app, board, first + offset, columns[offset]);
    }
}

fn render_column<S: Storage>(
    frame: &mut Frame,
    app: &BoardApp<S>,
    board: &ServerBoard<'_>,
    index: usize,
    area: Rect,
) {
    let server = board.server;
    let is_current = index == app.column();
    let dragging = app.controller().dragging();
    let selection = if is_current { app.selection() } else { None };

    let border_color = match (is_current, dragging.is_some()) {
        (true, true) => COLOR_DRAG,
        (true, false) => COLOR_PRIMARY,
        _ if !server.status.is_active() => COLOR_DIM,
        _ => Color::White,
    };
    let mut title_style = Style::default().add_modifier(Modifier::BOLD);
    if selection == Some(Selection::Server(server.id.clone())) {
        title_style = title_style.fg(Color::Black).bg(COLOR_PRIMARY);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(
            format!(" {} ", sanitize_terminal(&server.name)),
            title_style,
        ));

    let mut lines = vec![
        Line::from(Span::styled(
            sanitize_terminal(&board.meta_line()),
            Style::default().fg(COLOR_DIM),
        )),
        Line::from(vec![
            status_span(server.status),
            Span::styled(
                format!("  {}", board.count_label()),
                Style::default().fg(COLOR_DIM),
            ),
        ]),
        Line::from(""),
    ];

    if board.services.is_empty() {
        lines.push(Line::from(Span::styled(
            EMPTY_BOARD_HINT,
            Style::default().fg(COLOR_DIM),
        )));
    }

    for service in &board.services {
        let carried = dragging == Some(service.id.as_str());
        let selected = selection == Some(Selection::Service(service.id.clone()));
        let marker = if carried { "⇄ " } else { "  " };

        let mut style = if service.status.is_active() {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(COLOR_DIM)
        };
        if carried {
            style = style.fg(COLOR_DRAG);
        }
        if selected {
            style = style.add_modifier(Modifier::REVERSED);
        }

        lines.push(Line::from(Span::styled(
            format!("{marker}{}", sanitize_terminal(&service.name)),
            style,
        )));
        let mut detail = Vec::new();
        if !service.desc.is_empty() {
            detail.push(Span::styled(
                format!("    {} ", sanitize_terminal(&service.desc)),
                Style::default().fg(COLOR_DIM),
            ));
        } else {
            detail.push(Span::raw("    "));
        }
        detail.push(status_span(service.status));
        lines.push(Line::from(detail));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_footer<S: Storage>(frame: &mut Frame, app: &BoardApp<S>, area: Rect) {
    let controller = app.controller();
    if let Some(notice) = controller.notice() {
        let color = match notice.level {
            NoticeLevel::Success => COLOR_SUCCESS,
            NoticeLevel::Info => COLOR_PRIMARY,
            NoticeLevel::Error => COLOR_ERROR,
        };
        let footer = Paragraph::new(format!(" {} ", notice.message))
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD));
        frame.render_widget(footer, area);
        return;
    }

    let help = if controller.pending_delete().is_some() {
        " y/Enter: delete | n/Esc: keep "
    } else if let ModalState::Open(_) = controller.modal() {
        " Tab: switch form | ↑↓: field | ←→/space: change | Enter: save | Esc: cancel "
    } else if controller.dragging().is_some() {
        " ←→: choose server | space: drop | Esc: cancel move "
    } else {
        " hjkl/arrows: navigate | a: add | e/Enter: edit | d: delete | space: move | q: quit "
    };
    let footer = Paragraph::new(help).style(Style::default().fg(COLOR_DIM));
    frame.render_widget(footer, area);
}

fn render_modal<S: Storage>(frame: &mut Frame, app: &BoardApp<S>, tab: Tab, area: Rect) {
    let controller = app.controller();
    let title = match controller.store().edit_context() {
        Some(EditTarget::Server(_)) => " Edit Server ",
        Some(EditTarget::Service(_)) => " Edit Service ",
        None => " Add ",
    };

    let modal_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, modal_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(COLOR_PRIMARY));
    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);

    let tabs = Tabs::new(vec![Line::from(Tab::Service.name()), Line::from(Tab::Server.name())])
        .select(match tab {
            Tab::Service => 0,
            Tab::Server => 1,
        })
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(COLOR_PRIMARY)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );
    frame.render_widget(tabs, chunks[0]);

    let focused = app.focused_field();
    let mut lines = Vec::new();
    for field in FormField::for_tab(tab) {
        let value = field_value(app, tab, *field);
        let is_focused = focused == Some(*field);
        let label_style = if is_focused {
            Style::default()
                .fg(COLOR_PRIMARY)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(COLOR_DIM)
        };
        let cursor = if is_focused && !matches!(field, FormField::Server | FormField::Status) {
            "▏"
        } else {
            ""
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} {:<12}", if is_focused { ">" } else { " " }, field.label()),
                label_style,
            ),
            Span::styled(format!("{value}{cursor}"), Style::default().fg(Color::White)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter: save | Tab: switch form | Esc: cancel",
        Style::default().fg(COLOR_DIM),
    )));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), chunks[1]);
}

fn field_value<S: Storage>(app: &BoardApp<S>, tab: Tab, field: FormField) -> String {
    let controller = app.controller();
    let server = controller.server_form();
    let service = controller.service_form();
    match (tab, field) {
        (Tab::Server, FormField::Name) => server.name.clone(),
        (Tab::Server, FormField::Address) => server.ip.clone(),
        (Tab::Server, FormField::Note) => server.note.clone(),
        (Tab::Server, FormField::Status) => format!("‹ {} ›", server.status),
        (Tab::Service, FormField::Name) => service.name.clone(),
        (Tab::Service, FormField::Description) => service.desc.clone(),
        (Tab::Service, FormField::Status) => format!("‹ {} ›", service.status),
        (Tab::Service, FormField::Server) => {
            let options = controller.server_options();
            let label = options
                .iter()
                .find(|o| o.id == service.server_id)
                .or_else(|| options.iter().find(|o| o.id.is_empty()))
                .map(|o| o.label.clone())
                .unwrap_or_default();
            format!("‹ {} ›", sanitize_terminal(&label))
        }
        _ => String::new(),
    }
}

fn render_confirm<S: Storage>(
    frame: &mut Frame,
    app: &BoardApp<S>,
    target: &EditTarget,
    area: Rect,
) {
    let controller = app.controller();
    let name = sanitize_terminal(controller.item_name(target).unwrap_or("?"));
    let mut lines = vec![Line::from(format!(
        "Delete {} \"{}\"?",
        target.kind(),
        name
    ))];
    if let EditTarget::Server(id) = target {
        let count = controller.store().services_on(id).count();
        if count > 0 {
            lines.push(Line::from(Span::styled(
                format!("This also deletes {count} service(s)."),
                Style::default().fg(COLOR_ERROR),
            )));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "y: delete | n: keep",
        Style::default().fg(COLOR_DIM),
    )));

    let dialog_area = centered_rect(50, 30, area);
    frame.render_widget(Clear, dialog_area);
    let dialog = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Confirm ")
            .border_style(Style::default().fg(COLOR_ERROR)),
    );
    frame.render_widget(dialog, dialog_area);
}

/// Create a centered rectangle of given percentage width/height
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
