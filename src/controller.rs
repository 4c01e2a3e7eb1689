//! Interaction controller.
//!
//! Maps user gestures ([`Command`]s) onto store operations and keeps the
//! transient interaction state: the add/edit modal, its two forms, the
//! service currently being dragged, a pending delete confirmation and the
//! last user-facing [`Notice`]. The store never sees any of this; the
//! controller only calls its public operations.
//!
//! Modal states are `Closed`, `Open(Tab::Service)` and `Open(Tab::Server)`.
//! Closing always clears the edit context and both forms.

use crate::error::RackboardError;
use crate::model::{EditTarget, ServerDraft, ServiceDraft, Status};
use crate::persistence::Storage;
use crate::store::{InventoryStore, ReassignOutcome};
use crate::view::{server_options, ServerOption};
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Default lifetime of a notice, in milliseconds.
pub const DEFAULT_NOTICE_MS: u64 = 1800;

/// Longest a notice may stay visible: one day.
pub const MAX_NOTICE_MS: u64 = 86_400_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Service,
    Server,
}

impl Tab {
    pub fn name(&self) -> &'static str {
        match self {
            Tab::Service => "Service",
            Tab::Server => "Server",
        }
    }

    pub fn other(&self) -> Tab {
        match self {
            Tab::Service => Tab::Server,
            Tab::Server => Tab::Service,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    Closed,
    Open(Tab),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerForm {
    pub name: String,
    pub ip: String,
    pub note: String,
    pub status: Status,
}

impl ServerForm {
    pub fn to_draft(&self) -> ServerDraft {
        ServerDraft::new(&self.name, &self.ip, &self.note, self.status)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceForm {
    pub name: String,
    pub desc: String,
    pub server_id: String,
    pub status: Status,
}

impl ServiceForm {
    pub fn to_draft(&self) -> ServiceDraft {
        ServiceDraft::new(&self.name, &self.desc, &self.server_id, self.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A transient message for the user. Expiry never affects state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

/// A user gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open the modal with no edit context.
    OpenAdd,
    /// Open the modal pre-filled for an existing entity.
    Edit(EditTarget),
    SwitchTab(Tab),
    SubmitServer,
    SubmitService,
    /// Cancel button, backdrop click or Escape.
    Close,
    RequestDelete(EditTarget),
    ConfirmDelete,
    CancelDelete,
    DragStart(String),
    /// Drop the dragged service on a server.
    Drop(String),
    DragCancel,
}

pub struct Controller<S: Storage> {
    store: InventoryStore<S>,
    modal: ModalState,
    server_form: ServerForm,
    service_form: ServiceForm,
    dragging: Option<String>,
    pending_delete: Option<EditTarget>,
    notice: Option<Notice>,
    notice_ttl: Duration,
}

impl<S: Storage> Controller<S> {
    pub fn new(store: InventoryStore<S>) -> Self {
        Self {
            store,
            modal: ModalState::Closed,
            server_form: ServerForm::default(),
            service_form: ServiceForm::default(),
            dragging: None,
            pending_delete: None,
            notice: None,
            notice_ttl: Duration::milliseconds(DEFAULT_NOTICE_MS as i64),
        }
    }

    pub fn with_notice_ms(mut self, ms: u64) -> Self {
        self.notice_ttl = Duration::milliseconds(ms.min(MAX_NOTICE_MS) as i64);
        self
    }

    pub fn store(&self) -> &InventoryStore<S> {
        &self.store
    }

    pub fn modal(&self) -> ModalState {
        self.modal
    }

    pub fn server_form(&self) -> &ServerForm {
        &self.server_form
    }

    pub fn server_form_mut(&mut self) -> &mut ServerForm {
        &mut self.server_form
    }

    pub fn service_form(&self) -> &ServiceForm {
        &self.service_form
    }

    pub fn service_form_mut(&mut self) -> &mut ServiceForm {
        &mut self.service_form
    }

    pub fn dragging(&self) -> Option<&str> {
        self.dragging.as_deref()
    }

    pub fn pending_delete(&self) -> Option<&EditTarget> {
        self.pending_delete.as_ref()
    }

    /// The current notice, unless it has expired by `now`.
    pub fn notice_at(&self, now: DateTime<Utc>) -> Option<&Notice> {
        self.notice.as_ref().filter(|n| n.expires_at > now)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice_at(Utc::now())
    }

    /// Picker entries for the service form, given the current edit context.
    pub fn server_options(&self) -> Vec<ServerOption> {
        server_options(self.store.inventory(), self.store.edit_context().is_some())
    }

    /// Step the service form's server to the next (or previous) selectable
    /// option, wrapping around.
    pub fn cycle_service_server(&mut self, forward: bool) {
        let selectable: Vec<String> = self
            .server_options()
            .into_iter()
            .filter(|o| o.selectable)
            .map(|o| o.id)
            .collect();
        if selectable.is_empty() {
            return;
        }
        let next = match selectable.iter().position(|id| *id == self.service_form.server_id) {
            Some(i) if forward => (i + 1) % selectable.len(),
            Some(i) => (i + selectable.len() - 1) % selectable.len(),
            None => 0,
        };
        self.service_form.server_id = selectable[next].clone();
    }

    pub fn dispatch(&mut self, command: Command) {
        debug!(?command, "dispatch");
        match command {
            Command::OpenAdd => self.open_add(),
            Command::Edit(target) => self.open_edit(target),
            Command::SwitchTab(tab) => {
                if let ModalState::Open(_) = self.modal {
                    self.modal = ModalState::Open(tab);
                }
            }
            Command::SubmitServer => self.submit_server(),
            Command::SubmitService => self.submit_service(),
            Command::Close => self.close(),
            Command::RequestDelete(target) => self.request_delete(target),
            Command::ConfirmDelete => self.confirm_delete(),
            Command::CancelDelete => self.pending_delete = None,
            Command::DragStart(service_id) => self.drag_start(service_id),
            Command::Drop(server_id) => self.drop_on(&server_id),
            Command::DragCancel => self.dragging = None,
        }

        if let Some(err) = self.store.take_save_error() {
            self.notify(NoticeLevel::Error, format!("Could not save: {err}"));
        }
    }

    fn open_add(&mut self) {
        self.store.clear_edit_context();
        self.reset_forms();
        self.service_form.server_id = self.first_selectable_server();
        let tab = if self.store.has_active_server() {
            Tab::Service
        } else {
            Tab::Server
        };
        self.modal = ModalState::Open(tab);
    }

    fn open_edit(&mut self, target: EditTarget) {
        self.reset_forms();
        let tab = match &target {
            EditTarget::Server(id) => match self.store.server(id) {
                Some(server) => {
                    let draft = ServerDraft::from(server);
                    self.server_form = ServerForm {
                        name: draft.name,
                        ip: draft.ip,
                        note: draft.note,
                        status: draft.status,
                    };
                    Tab::Server
                }
                None => return self.vanished(&target),
            },
            EditTarget::Service(id) => match self.store.service(id) {
                Some(service) => {
                    let draft = ServiceDraft::from(service);
                    self.service_form = ServiceForm {
                        name: draft.name,
                        desc: draft.desc,
                        server_id: draft.server_id,
                        status: draft.status,
                    };
                    Tab::Service
                }
                None => return self.vanished(&target),
            },
        };
        self.store.set_edit_context(Some(target));
        self.modal = ModalState::Open(tab);
    }

    fn close(&mut self) {
        self.modal = ModalState::Closed;
        self.store.clear_edit_context();
        self.reset_forms();
    }

    fn submit_server(&mut self) {
        if self.modal == ModalState::Closed {
            return;
        }
        let draft = self.server_form.to_draft();
        let result = match self.store.edit_context().cloned() {
            Some(EditTarget::Server(id)) => self.store.update_server(&id, &draft).map(|n| {
                if n > 0 {
                    format!("Server updated, {n} service(s) deactivated")
                } else {
                    "Server updated".to_string()
                }
            }),
            _ => self
                .store
                .create_server(&draft)
                .map(|_| "Server created".to_string()),
        };
        self.finish_submit(result);
    }

    fn submit_service(&mut self) {
        if self.modal == ModalState::Closed {
            return;
        }
        let draft = self.service_form.to_draft();
        let result = match self.store.edit_context().cloned() {
            Some(EditTarget::Service(id)) => self
                .store
                .update_service(&id, &draft)
                .map(|_| "Service updated".to_string()),
            _ => self
                .store
                .create_service(&draft)
                .map(|_| "Service registered".to_string()),
        };
        if matches!(result, Err(RackboardError::InvalidReference(_))) && draft.server_id.is_empty()
        {
            self.modal = ModalState::Open(Tab::Server);
        }
        self.finish_submit(result);
    }

    fn finish_submit(&mut self, result: crate::error::Result<String>) {
        match result {
            Ok(message) => {
                self.notify(NoticeLevel::Success, message);
                self.close();
            }
            Err(RackboardError::NotFound { kind, .. }) => {
                self.notify(NoticeLevel::Info, format!("That {kind} no longer exists"));
                self.close();
            }
            // Input stays in the form so the user can correct it.
            Err(e) => self.notify(NoticeLevel::Error, e.to_string()),
        }
    }

    fn request_delete(&mut self, target: EditTarget) {
        if self.item_name(&target).is_some() {
            self.pending_delete = Some(target);
        } else {
            self.vanished(&target);
        }
    }

    /// Display name of the entity, if it still exists.
    pub fn item_name(&self, target: &EditTarget) -> Option<&str> {
        match target {
            EditTarget::Server(id) => self.store.server(id).map(|s| s.name.as_str()),
            EditTarget::Service(id) => self.store.service(id).map(|s| s.name.as_str()),
        }
    }

    fn confirm_delete(&mut self) {
        let Some(target) = self.pending_delete.take() else {
            return;
        };
        match &target {
            EditTarget::Server(id) => match self.store.delete_server(id) {
                Some(0) => self.notify(NoticeLevel::Success, "Server deleted".to_string()),
                Some(n) => self.notify(
                    NoticeLevel::Success,
                    format!("Server deleted along with {n} service(s)"),
                ),
                None => self.vanished(&target),
            },
            EditTarget::Service(id) => {
                if self.store.delete_service(id) {
                    self.notify(NoticeLevel::Success, "Service deleted".to_string());
                } else {
                    self.vanished(&target);
                }
            }
        }
        if let Some(dragged) = &self.dragging {
            if self.store.service(dragged).is_none() {
                self.dragging = None;
            }
        }
    }

    fn drag_start(&mut self, service_id: String) {
        let active = match self.store.service(&service_id) {
            Some(service) => service.status.is_active(),
            None => return self.vanished(&EditTarget::Service(service_id)),
        };
        if !active {
            self.notify(
                NoticeLevel::Error,
                "Inactive services cannot be moved".to_string(),
            );
            return;
        }
        self.dragging = Some(service_id);
    }

    fn drop_on(&mut self, server_id: &str) {
        let Some(service_id) = self.dragging.take() else {
            return;
        };
        match self.store.reassign_service(&service_id, server_id) {
            ReassignOutcome::Moved => {
                self.notify(NoticeLevel::Success, "Service moved".to_string())
            }
            ReassignOutcome::Unchanged => {}
            ReassignOutcome::Rejected(reason) => {
                self.notify(NoticeLevel::Error, reason.to_string())
            }
        }
    }

    fn vanished(&mut self, target: &EditTarget) {
        self.notify(
            NoticeLevel::Info,
            format!("That {} no longer exists", target.kind()),
        );
    }

    fn notify(&mut self, level: NoticeLevel, message: String) {
        self.notice = Some(Notice {
            level,
            message,
            expires_at: Utc::now()
                .checked_add_signed(self.notice_ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        });
    }

    fn reset_forms(&mut self) {
        self.server_form = ServerForm::default();
        self.service_form = ServiceForm::default();
    }

    fn first_selectable_server(&self) -> String {
        self.server_options()
            .into_iter()
            .find(|o| o.selectable)
            .map(|o| o.id)
            .unwrap_or_default()
    }
}
