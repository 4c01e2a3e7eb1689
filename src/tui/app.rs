//! Board application state.
//!
//! [`BoardApp`] owns the [`Controller`] and translates key presses into
//! controller commands. Besides what the controller tracks, it only keeps
//! the board cursor and which modal form field has focus.
//!
//! Drag-drop maps onto the keyboard: space picks up the selected service
//! (drag start), moving left/right carries it across server columns, and
//! space again drops it on the column under the cursor.

use crate::controller::{Command, Controller, ModalState, Tab};
use crate::model::EditTarget;
use crate::persistence::Storage;
use crate::view::boards;
use crossterm::event::KeyCode;

/// Focusable fields of the modal, per tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Address,
    Note,
    Description,
    Server,
    Status,
}

impl FormField {
    pub fn for_tab(tab: Tab) -> &'static [FormField] {
        match tab {
            Tab::Server => &[
                FormField::Name,
                FormField::Address,
                FormField::Note,
                FormField::Status,
            ],
            Tab::Service => &[
                FormField::Name,
                FormField::Description,
                FormField::Server,
                FormField::Status,
            ],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Address => "IP address",
            FormField::Note => "Note",
            FormField::Description => "Description",
            FormField::Server => "Server",
            FormField::Status => "Status",
        }
    }

    fn is_text(&self) -> bool {
        matches!(
            self,
            FormField::Name | FormField::Address | FormField::Note | FormField::Description
        )
    }
}

/// What the board cursor is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Server(String),
    Service(String),
}

impl From<Selection> for EditTarget {
    fn from(selection: Selection) -> Self {
        match selection {
            Selection::Server(id) => EditTarget::Server(id),
            Selection::Service(id) => EditTarget::Service(id),
        }
    }
}

pub struct BoardApp<S: Storage> {
    controller: Controller<S>,
    /// Index into the ordered server columns.
    column: usize,
    /// `None` selects the server header, `Some(i)` its i-th service.
    row: Option<usize>,
    /// Index into `FormField::for_tab` of the open tab.
    field: usize,
    should_quit: bool,
}

impl<S: Storage> BoardApp<S> {
    pub fn new(controller: Controller<S>) -> Self {
        Self {
            controller,
            column: 0,
            row: None,
            field: 0,
            should_quit: false,
        }
    }

    pub fn controller(&self) -> &Controller<S> {
        &self.controller
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn row(&self) -> Option<usize> {
        self.row
    }

    /// The focused field of the open modal, if any.
    pub fn focused_field(&self) -> Option<FormField> {
        match self.controller.modal() {
            ModalState::Open(tab) => FormField::for_tab(tab).get(self.field).copied(),
            ModalState::Closed => None,
        }
    }

    pub fn selection(&self) -> Option<Selection> {
        let boards = boards(self.controller.store().inventory());
        let board = boards.get(self.column)?;
        match self.row {
            None => Some(Selection::Server(board.server.id.clone())),
            Some(i) => board
                .services
                .get(i)
                .map(|s| Selection::Service(s.id.clone())),
        }
    }

    /// Server id of the column under the cursor.
    fn column_server(&self) -> Option<String> {
        boards(self.controller.store().inventory())
            .get(self.column)
            .map(|b| b.server.id.clone())
    }

    fn dispatch(&mut self, command: Command) {
        let modal_before = self.controller.modal();
        self.controller.dispatch(command);
        if self.controller.modal() != modal_before {
            self.field = 0;
        }
        self.clamp_cursor();
    }

    /// Keep the cursor on an existing column and row after the inventory
    /// changes under it.
    fn clamp_cursor(&mut self) {
        let boards = boards(self.controller.store().inventory());
        if boards.is_empty() {
            self.column = 0;
            self.row = None;
            return;
        }
        self.column = self.column.min(boards.len() - 1);
        let services = boards[self.column].services.len();
        self.row = match self.row {
            Some(_) if services == 0 => None,
            Some(i) => Some(i.min(services - 1)),
            None => None,
        };
    }

    /// Put the cursor on a specific service, wherever it now lives.
    fn focus_service(&mut self, service_id: &str) {
        let boards = boards(self.controller.store().inventory());
        for (col, board) in boards.iter().enumerate() {
            if let Some(row) = board.services.iter().position(|s| s.id == service_id) {
                self.column = col;
                self.row = Some(row);
                return;
            }
        }
    }

    /// Handle keyboard input.
    pub fn handle_key(&mut self, key: KeyCode) {
        if self.controller.pending_delete().is_some() {
            self.handle_confirm_key(key);
        } else if let ModalState::Open(tab) = self.controller.modal() {
            self.handle_modal_key(tab, key);
        } else {
            self.handle_board_key(key);
        }
    }

    fn handle_confirm_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.dispatch(Command::ConfirmDelete)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.dispatch(Command::CancelDelete)
            }
            _ => {}
        }
    }

    fn handle_board_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Esc => {
                if self.controller.dragging().is_some() {
                    self.dispatch(Command::DragCancel);
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Left | KeyCode::Char('h') => {
                if self.column > 0 {
                    self.column -= 1;
                    self.row = None;
                }
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.column += 1;
                self.row = None;
                self.clamp_cursor();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if self.controller.dragging().is_none() {
                    self.row = match self.row {
                        Some(0) | None => None,
                        Some(i) => Some(i - 1),
                    };
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.controller.dragging().is_none() {
                    self.row = Some(self.row.map_or(0, |i| i + 1));
                    self.clamp_cursor();
                }
            }
            // Inert while a service is carried.
            KeyCode::Char('a' | 'e' | 'd') | KeyCode::Enter | KeyCode::Delete
                if self.controller.dragging().is_some() => {}
            KeyCode::Char('a') => self.dispatch(Command::OpenAdd),
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(selection) = self.selection() {
                    self.dispatch(Command::Edit(selection.into()));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(selection) = self.selection() {
                    self.dispatch(Command::RequestDelete(selection.into()));
                }
            }
            KeyCode::Char(' ') => self.handle_space(),
            _ => {}
        }
    }

    fn handle_space(&mut self) {
        match self.controller.dragging().map(str::to_string) {
            Some(service_id) => {
                if let Some(server_id) = self.column_server() {
                    self.dispatch(Command::Drop(server_id));
                    self.focus_service(&service_id);
                }
            }
            None => {
                if let Some(Selection::Service(id)) = self.selection() {
                    self.dispatch(Command::DragStart(id));
                }
            }
        }
    }

    fn handle_modal_key(&mut self, tab: Tab, key: KeyCode) {
        let fields = FormField::for_tab(tab);
        let focused = fields[self.field.min(fields.len() - 1)];
        match key {
            KeyCode::Esc => self.dispatch(Command::Close),
            KeyCode::Tab => self.dispatch(Command::SwitchTab(tab.other())),
            KeyCode::Enter => match tab {
                Tab::Server => self.dispatch(Command::SubmitServer),
                Tab::Service => self.dispatch(Command::SubmitService),
            },
            KeyCode::Down => {
                self.field = (self.field + 1) % fields.len();
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.field = (self.field + fields.len() - 1) % fields.len();
            }
            KeyCode::Left | KeyCode::Right if focused == FormField::Server => {
                self.controller.cycle_service_server(key == KeyCode::Right);
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')
                if focused == FormField::Status =>
            {
                self.toggle_status(tab);
            }
            KeyCode::Char(c) if focused.is_text() => {
                if let Some(text) = self.text_field_mut(tab, focused) {
                    text.push(c);
                }
            }
            KeyCode::Backspace if focused.is_text() => {
                if let Some(text) = self.text_field_mut(tab, focused) {
                    text.pop();
                }
            }
            _ => {}
        }
    }

    fn toggle_status(&mut self, tab: Tab) {
        match tab {
            Tab::Server => {
                let form = self.controller.server_form_mut();
                form.status = form.status.toggled();
            }
            Tab::Service => {
                let form = self.controller.service_form_mut();
                form.status = form.status.toggled();
            }
        }
    }

    fn text_field_mut(&mut self, tab: Tab, field: FormField) -> Option<&mut String> {
        match (tab, field) {
            (Tab::Server, FormField::Name) => Some(&mut self.controller.server_form_mut().name),
            (Tab::Server, FormField::Address) => Some(&mut self.controller.server_form_mut().ip),
            (Tab::Server, FormField::Note) => Some(&mut self.controller.server_form_mut().note),
            (Tab::Service, FormField::Name) => Some(&mut self.controller.service_form_mut().name),
            (Tab::Service, FormField::Description) => {
                Some(&mut self.controller.service_form_mut().desc)
            }
            _ => None,
        }
    }
}
