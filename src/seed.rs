//! Example topology installed on first launch.

use crate::model::{new_id, Inventory, Server, Service, Status};
use crate::persistence::Storage;
use crate::store::InventoryStore;
use tracing::info;

fn server(name: &str, ip: &str, note: &str, status: Status) -> Server {
    Server {
        id: new_id(),
        name: name.to_string(),
        ip: ip.to_string(),
        note: note.to_string(),
        status,
    }
}

fn service(name: &str, desc: &str, server: &Server, status: Status) -> Service {
    Service {
        id: new_id(),
        name: name.to_string(),
        desc: desc.to_string(),
        server_id: server.id.clone(),
        status,
    }
}

/// Three servers (two active, one inactive) and four services, one of
/// them inactive.
pub fn example_inventory() -> Inventory {
    let app = server("srv-app-01", "192.168.1.10", "Applications", Status::Active);
    let db = server("srv-db-01", "192.168.1.20", "Database", Status::Active);
    let test = server("srv-test-01", "192.168.1.30", "Testing", Status::Inactive);

    let services = vec![
        service("Orders API", "Node.js", &app, Status::Active),
        service("Website", "Nginx + React", &app, Status::Active),
        service("PostgreSQL", "v15", &db, Status::Active),
        service("Redis Cache", "v7.0", &db, Status::Inactive),
    ];

    Inventory {
        servers: vec![app, db, test],
        services,
    }
}

/// Install the example topology when the store has no servers. Services
/// alone do not count: a store with services but no servers is still
/// seeded. Returns whether seeding happened.
pub fn seed_if_empty<S: Storage>(store: &mut InventoryStore<S>) -> bool {
    if !store.servers().is_empty() {
        return false;
    }
    store.install(example_inventory());
    info!("seeded example inventory");
    true
}
