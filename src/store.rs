//! The inventory store.
//!
//! [`InventoryStore`] owns the canonical servers and services plus the
//! transient edit context. Every mutation validates first and only then
//! touches state, so a failed call leaves the inventory exactly as it was.
//! Each successful mutation saves the whole inventory and bumps
//! [`InventoryStore::revision`], which renderers use as their refresh signal.

use crate::error::{RackboardError, Result};
use crate::model::{
    new_id, EditTarget, Inventory, Server, ServerDraft, Service, ServiceDraft, Status,
};
use crate::persistence::{Persistence, Storage};
use std::fmt;
use tracing::{error, info, warn};

/// Why a drag-drop reassignment was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    UnknownService,
    InactiveService,
    UnknownServer,
    InactiveServer,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            RejectReason::UnknownService => "Service no longer exists",
            RejectReason::InactiveService => "Inactive services cannot be moved",
            RejectReason::UnknownServer => "Target server no longer exists",
            RejectReason::InactiveServer => "Cannot move to an inactive server",
        };
        write!(f, "{msg}")
    }
}

/// Result of [`InventoryStore::reassign_service`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReassignOutcome {
    /// The reference changed and the inventory was saved.
    Moved,
    /// Dropped on the server it already belongs to. Nothing saved.
    Unchanged,
    Rejected(RejectReason),
}

pub struct InventoryStore<S: Storage> {
    inventory: Inventory,
    persistence: Persistence<S>,
    edit: Option<EditTarget>,
    revision: u64,
    save_error: Option<String>,
}

impl<S: Storage> InventoryStore<S> {
    /// Build a store from whatever the persistence layer has saved.
    pub fn load(persistence: Persistence<S>) -> Self {
        let inventory = persistence.load();
        Self {
            inventory,
            persistence,
            edit: None,
            revision: 0,
            save_error: None,
        }
    }

    pub fn open(storage: S) -> Self {
        Self::load(Persistence::new(storage))
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn servers(&self) -> &[Server] {
        &self.inventory.servers
    }

    pub fn services(&self) -> &[Service] {
        &self.inventory.services
    }

    pub fn server(&self, id: &str) -> Option<&Server> {
        self.inventory.servers.iter().find(|s| s.id == id)
    }

    pub fn service(&self, id: &str) -> Option<&Service> {
        self.inventory.services.iter().find(|s| s.id == id)
    }

    /// Services referencing `server_id`, in stored order.
    pub fn services_on<'a>(&'a self, server_id: &'a str) -> impl Iterator<Item = &'a Service> {
        self.inventory
            .services
            .iter()
            .filter(move |s| s.server_id == server_id)
    }

    pub fn has_active_server(&self) -> bool {
        self.inventory.servers.iter().any(|s| s.status.is_active())
    }

    /// Incremented after every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn edit_context(&self) -> Option<&EditTarget> {
        self.edit.as_ref()
    }

    pub fn set_edit_context(&mut self, target: Option<EditTarget>) {
        self.edit = target;
    }

    pub fn clear_edit_context(&mut self) {
        self.edit = None;
    }

    /// The most recent save failure, if any, cleared on read.
    pub fn take_save_error(&mut self) -> Option<String> {
        self.save_error.take()
    }

    pub fn create_server(&mut self, draft: &ServerDraft) -> Result<Server> {
        let draft = draft.validated()?;
        let server = Server {
            id: new_id(),
            name: draft.name,
            ip: draft.ip,
            note: draft.note,
            status: draft.status,
        };
        info!(id = %server.id, name = %server.name, "created server");
        self.inventory.servers.push(server.clone());
        self.commit();
        Ok(server)
    }

    /// Apply `draft` to an existing server. Deactivating a server
    /// deactivates every service on it; returns how many services that
    /// changed.
    pub fn update_server(&mut self, id: &str, draft: &ServerDraft) -> Result<usize> {
        let index = self
            .inventory
            .servers
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| not_found("server", id))?;
        let draft = draft.validated()?;

        let server = &mut self.inventory.servers[index];
        server.name = draft.name;
        server.ip = draft.ip;
        server.note = draft.note;
        server.status = draft.status;

        let mut deactivated = 0;
        if draft.status == Status::Inactive {
            for service in self
                .inventory
                .services
                .iter_mut()
                .filter(|s| s.server_id == id && s.status.is_active())
            {
                service.status = Status::Inactive;
                deactivated += 1;
            }
        }

        info!(id, deactivated, "updated server");
        self.commit();
        Ok(deactivated)
    }

    /// Remove a server and every service on it. Returns the number of
    /// services removed alongside, or `None` when the id is unknown, in
    /// which case nothing changes.
    pub fn delete_server(&mut self, id: &str) -> Option<usize> {
        let before = self.inventory.servers.len();
        self.inventory.servers.retain(|s| s.id != id);
        if self.inventory.servers.len() == before {
            warn!(id, "delete of unknown server ignored");
            return None;
        }

        let services_before = self.inventory.services.len();
        let orphaned: Vec<String> = self
            .services_on(id)
            .map(|s| s.id.clone())
            .collect();
        self.inventory.services.retain(|s| s.server_id != id);
        let cascaded = services_before - self.inventory.services.len();

        if let Some(target) = &self.edit {
            let stale = match target {
                EditTarget::Server(edit_id) => edit_id == id,
                EditTarget::Service(edit_id) => orphaned.contains(edit_id),
            };
            if stale {
                self.edit = None;
            }
        }

        info!(id, cascaded, "deleted server");
        self.commit();
        Some(cascaded)
    }

    pub fn create_service(&mut self, draft: &ServiceDraft) -> Result<Service> {
        let draft = draft.validated()?;
        self.check_assignable(&draft.server_id)?;
        let service = Service {
            id: new_id(),
            name: draft.name,
            desc: draft.desc,
            server_id: draft.server_id,
            status: draft.status,
        };
        info!(id = %service.id, server = %service.server_id, "created service");
        self.inventory.services.push(service.clone());
        self.commit();
        Ok(service)
    }

    pub fn update_service(&mut self, id: &str, draft: &ServiceDraft) -> Result<()> {
        let index = self
            .inventory
            .services
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| not_found("service", id))?;
        let draft = draft.validated()?;
        self.check_assignable(&draft.server_id)?;

        let service = &mut self.inventory.services[index];
        service.name = draft.name;
        service.desc = draft.desc;
        service.server_id = draft.server_id;
        service.status = draft.status;

        info!(id, "updated service");
        self.commit();
        Ok(())
    }

    /// Remove a service. Returns `false` (and changes nothing) for an
    /// unknown id.
    pub fn delete_service(&mut self, id: &str) -> bool {
        let before = self.inventory.services.len();
        self.inventory.services.retain(|s| s.id != id);
        if self.inventory.services.len() == before {
            warn!(id, "delete of unknown service ignored");
            return false;
        }
        if self.edit == Some(EditTarget::Service(id.to_string())) {
            self.edit = None;
        }
        info!(id, "deleted service");
        self.commit();
        true
    }

    /// Move a service to another server (the drop half of drag-drop).
    pub fn reassign_service(&mut self, service_id: &str, server_id: &str) -> ReassignOutcome {
        let Some(index) = self
            .inventory
            .services
            .iter()
            .position(|s| s.id == service_id)
        else {
            return self.reject(service_id, RejectReason::UnknownService);
        };
        if !self.inventory.services[index].status.is_active() {
            return self.reject(service_id, RejectReason::InactiveService);
        }
        match self.server(server_id) {
            None => return self.reject(service_id, RejectReason::UnknownServer),
            Some(server) if !server.status.is_active() => {
                return self.reject(service_id, RejectReason::InactiveServer)
            }
            Some(_) => {}
        }

        let service = &mut self.inventory.services[index];
        if service.server_id == server_id {
            return ReassignOutcome::Unchanged;
        }
        service.server_id = server_id.to_string();
        info!(service = service_id, server = server_id, "moved service");
        self.commit();
        ReassignOutcome::Moved
    }

    /// Replace the whole inventory at once (used by seeding).
    pub(crate) fn install(&mut self, inventory: Inventory) {
        self.inventory = inventory;
        self.edit = None;
        self.commit();
    }

    fn check_assignable(&self, server_id: &str) -> Result<()> {
        if server_id.is_empty() {
            return Err(RackboardError::InvalidReference(
                "Create an active server first".to_string(),
            ));
        }
        match self.server(server_id) {
            None => Err(RackboardError::InvalidReference(format!(
                "Server {server_id} does not exist"
            ))),
            Some(server) if !server.status.is_active() => Err(RackboardError::InvalidReference(
                format!("Cannot assign to inactive server '{}'", server.name),
            )),
            Some(_) => Ok(()),
        }
    }

    fn reject(&self, service_id: &str, reason: RejectReason) -> ReassignOutcome {
        info!(service = service_id, %reason, "move rejected");
        ReassignOutcome::Rejected(reason)
    }

    fn commit(&mut self) {
        self.revision += 1;
        if let Err(e) = self.persistence.save(&self.inventory) {
            error!(error = %e, "failed to save inventory");
            self.save_error = Some(e.to_string());
        }
    }
}

fn not_found(kind: &'static str, id: &str) -> RackboardError {
    RackboardError::NotFound {
        kind,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    fn store() -> InventoryStore<MemoryStorage> {
        InventoryStore::open(MemoryStorage::new())
    }

    fn add_server(store: &mut InventoryStore<MemoryStorage>, name: &str, status: Status) -> String {
        store
            .create_server(&ServerDraft::new(name, "10.0.0.1", "", status))
            .unwrap()
            .id
    }

    fn add_service(store: &mut InventoryStore<MemoryStorage>, name: &str, server: &str) -> String {
        store
            .create_service(&ServiceDraft::new(name, "", server, Status::Active))
            .unwrap()
            .id
    }

    fn reloaded(store: &InventoryStore<MemoryStorage>) -> Inventory {
        Persistence::new(store.persistence().storage().clone()).load()
    }

    #[test]
    fn test_create_server_is_retrievable_and_persisted() {
        let mut store = store();
        let server = store
            .create_server(&ServerDraft::new("srv-1", "10.0.0.1", "", Status::Active))
            .unwrap();

        assert_eq!(store.server(&server.id), Some(&server));
        assert_eq!(reloaded(&store).servers, vec![server]);
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn test_create_server_rejects_bad_address_without_mutation() {
        let mut store = store();
        let err = store
            .create_server(&ServerDraft::new("srv", "999.1.1.1", "", Status::Active))
            .unwrap_err();
        assert!(matches!(err, RackboardError::Validation(_)));
        assert!(store.servers().is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_create_server_rejects_empty_name() {
        let mut store = store();
        let err = store
            .create_server(&ServerDraft::new("  ", "192.168.1.1", "", Status::Active))
            .unwrap_err();
        assert!(matches!(err, RackboardError::Validation(_)));
    }

    #[test]
    fn test_update_unknown_server_is_not_found() {
        let mut store = store();
        let err = store
            .update_server("nope", &ServerDraft::new("a", "1.1.1.1", "", Status::Active))
            .unwrap_err();
        assert!(matches!(err, RackboardError::NotFound { kind: "server", .. }));
    }

    #[test]
    fn test_update_server_applies_fields() {
        let mut store = store();
        let id = add_server(&mut store, "old", Status::Active);
        store
            .update_server(&id, &ServerDraft::new("new", "10.1.1.1", "db", Status::Active))
            .unwrap();
        let server = store.server(&id).unwrap();
        assert_eq!(server.name, "new");
        assert_eq!(server.ip, "10.1.1.1");
        assert_eq!(server.note, "db");
    }

    #[test]
    fn test_update_server_invalid_fields_leave_state_untouched() {
        let mut store = store();
        let id = add_server(&mut store, "keep", Status::Active);
        let before = store.inventory().clone();
        assert!(store
            .update_server(&id, &ServerDraft::new("x", "1.1.1", "", Status::Inactive))
            .is_err());
        assert_eq!(store.inventory(), &before);
    }

    #[test]
    fn test_deactivating_server_deactivates_its_services() {
        let mut store = store();
        let srv = add_server(&mut store, "srv", Status::Active);
        let other = add_server(&mut store, "other", Status::Active);
        let a = add_service(&mut store, "a", &srv);
        let b = add_service(&mut store, "b", &srv);
        let c = add_service(&mut store, "c", &other);

        let changed = store
            .update_server(&srv, &ServerDraft::new("srv", "10.0.0.1", "", Status::Inactive))
            .unwrap();

        assert_eq!(changed, 2);
        assert_eq!(store.service(&a).unwrap().status, Status::Inactive);
        assert_eq!(store.service(&b).unwrap().status, Status::Inactive);
        assert_eq!(store.service(&c).unwrap().status, Status::Active);
    }

    #[test]
    fn test_reactivating_server_does_not_reactivate_services() {
        let mut store = store();
        let srv = add_server(&mut store, "srv", Status::Active);
        let svc = add_service(&mut store, "a", &srv);
        store
            .update_server(&srv, &ServerDraft::new("srv", "10.0.0.1", "", Status::Inactive))
            .unwrap();
        store
            .update_server(&srv, &ServerDraft::new("srv", "10.0.0.1", "", Status::Active))
            .unwrap();
        assert_eq!(store.service(&svc).unwrap().status, Status::Inactive);
    }

    #[test]
    fn test_delete_server_cascades_and_reports_count() {
        let mut store = store();
        let srv = add_server(&mut store, "srv", Status::Active);
        let other = add_server(&mut store, "other", Status::Active);
        add_service(&mut store, "a", &srv);
        add_service(&mut store, "b", &srv);
        let kept = add_service(&mut store, "c", &other);

        assert_eq!(store.delete_server(&srv), Some(2));
        assert!(store.server(&srv).is_none());
        assert!(store.services().iter().all(|s| s.server_id != srv));
        assert_eq!(store.services().len(), 1);
        assert!(store.service(&kept).is_some());
        assert!(reloaded(&store).services.iter().all(|s| s.server_id != srv));
    }

    #[test]
    fn test_delete_unknown_server_is_silent_noop() {
        let mut store = store();
        add_server(&mut store, "srv", Status::Active);
        let revision = store.revision();
        assert_eq!(store.delete_server("missing"), None);
        assert_eq!(store.revision(), revision);
        assert_eq!(store.servers().len(), 1);
    }

    #[test]
    fn test_delete_server_clears_stale_edit_context() {
        let mut store = store();
        let srv = add_server(&mut store, "srv", Status::Active);
        let svc = add_service(&mut store, "a", &srv);
        store.set_edit_context(Some(EditTarget::Service(svc)));
        store.delete_server(&srv);
        assert!(store.edit_context().is_none());
    }

    #[test]
    fn test_create_service_requires_existing_active_server() {
        let mut store = store();
        let inactive = add_server(&mut store, "off", Status::Inactive);

        for server_id in ["", "ghost", inactive.as_str()] {
            let err = store
                .create_service(&ServiceDraft::new("api", "", server_id, Status::Active))
                .unwrap_err();
            assert!(matches!(err, RackboardError::InvalidReference(_)));
        }
        assert!(store.services().is_empty());
    }

    #[test]
    fn test_create_service_checks_name_before_reference() {
        let mut store = store();
        let err = store
            .create_service(&ServiceDraft::new(" ", "", "ghost", Status::Active))
            .unwrap_err();
        assert!(matches!(err, RackboardError::Validation(_)));
    }

    #[test]
    fn test_update_service_unknown_is_not_found() {
        let mut store = store();
        let srv = add_server(&mut store, "srv", Status::Active);
        let err = store
            .update_service("nope", &ServiceDraft::new("a", "", &srv, Status::Active))
            .unwrap_err();
        assert!(matches!(err, RackboardError::NotFound { kind: "service", .. }));
    }

    #[test]
    fn test_update_service_rejects_inactive_target() {
        let mut store = store();
        let srv = add_server(&mut store, "srv", Status::Active);
        let off = add_server(&mut store, "off", Status::Inactive);
        let svc = add_service(&mut store, "a", &srv);

        let err = store
            .update_service(&svc, &ServiceDraft::new("a", "", &off, Status::Active))
            .unwrap_err();
        assert!(matches!(err, RackboardError::InvalidReference(_)));
        assert_eq!(store.service(&svc).unwrap().server_id, srv);
    }

    #[test]
    fn test_update_service_applies_fields() {
        let mut store = store();
        let srv = add_server(&mut store, "srv", Status::Active);
        let other = add_server(&mut store, "other", Status::Active);
        let svc = add_service(&mut store, "a", &srv);
        store
            .update_service(&svc, &ServiceDraft::new("b", "desc", &other, Status::Inactive))
            .unwrap();
        let service = store.service(&svc).unwrap();
        assert_eq!(service.name, "b");
        assert_eq!(service.desc, "desc");
        assert_eq!(service.server_id, other);
        assert_eq!(service.status, Status::Inactive);
    }

    #[test]
    fn test_delete_service() {
        let mut store = store();
        let srv = add_server(&mut store, "srv", Status::Active);
        let svc = add_service(&mut store, "a", &srv);
        assert!(store.delete_service(&svc));
        assert!(store.services().is_empty());
        assert!(!store.delete_service(&svc));
    }

    #[test]
    fn test_reassign_moves_active_service() {
        let mut store = store();
        let a = add_server(&mut store, "a", Status::Active);
        let b = add_server(&mut store, "b", Status::Active);
        let svc = add_service(&mut store, "api", &a);

        assert_eq!(store.reassign_service(&svc, &b), ReassignOutcome::Moved);
        assert_eq!(store.service(&svc).unwrap().server_id, b);
        assert_eq!(reloaded(&store).services[0].server_id, b);
    }

    #[test]
    fn test_reassign_to_same_server_is_unchanged() {
        let mut store = store();
        let a = add_server(&mut store, "a", Status::Active);
        let svc = add_service(&mut store, "api", &a);
        let revision = store.revision();
        assert_eq!(store.reassign_service(&svc, &a), ReassignOutcome::Unchanged);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_reassign_rejections_do_not_mutate() {
        let mut store = store();
        let a = add_server(&mut store, "a", Status::Active);
        let off = add_server(&mut store, "off", Status::Inactive);
        let svc = add_service(&mut store, "api", &a);
        let before = store.inventory().clone();

        assert_eq!(
            store.reassign_service(&svc, &off),
            ReassignOutcome::Rejected(RejectReason::InactiveServer)
        );
        assert_eq!(
            store.reassign_service(&svc, "ghost"),
            ReassignOutcome::Rejected(RejectReason::UnknownServer)
        );
        assert_eq!(
            store.reassign_service("ghost", &a),
            ReassignOutcome::Rejected(RejectReason::UnknownService)
        );
        assert_eq!(store.inventory(), &before);
    }

    #[test]
    fn test_inactive_service_cannot_be_reassigned() {
        let mut store = store();
        let srv = add_server(&mut store, "srv-1", Status::Active);
        let other = add_server(&mut store, "srv-2", Status::Active);
        let api = add_service(&mut store, "api", &srv);

        store
            .update_server(&srv, &ServerDraft::new("srv-1", "10.0.0.1", "", Status::Inactive))
            .unwrap();
        assert_eq!(store.service(&api).unwrap().status, Status::Inactive);

        for target in [&srv, &other] {
            assert_eq!(
                store.reassign_service(&api, target),
                ReassignOutcome::Rejected(RejectReason::InactiveService)
            );
        }
        assert_eq!(store.service(&api).unwrap().server_id, srv);
    }

    #[test]
    fn test_round_trip_of_reachable_state() {
        let mut store = store();
        let a = add_server(&mut store, "a", Status::Active);
        let b = add_server(&mut store, "b", Status::Inactive);
        let svc = add_service(&mut store, "api", &a);
        store
            .update_service(&svc, &ServiceDraft::new("api", "v2", &a, Status::Inactive))
            .unwrap();
        store.delete_server(&b);
        assert_eq!(&reloaded(&store), store.inventory());
    }

    #[test]
    fn test_load_picks_up_saved_state() {
        let mut store = store();
        add_server(&mut store, "a", Status::Active);
        let storage = store.persistence().storage().clone();
        let reopened = InventoryStore::open(storage);
        assert_eq!(reopened.servers().len(), 1);
        assert!(reopened.edit_context().is_none());
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let mut store = store();
        let first = add_server(&mut store, "a", Status::Active);
        store.delete_server(&first);
        let second = add_server(&mut store, "a", Status::Active);
        assert_ne!(first, second);
    }
}
