//! Inventory data model.
//!
//! Servers own services through the service's `server_id` reference. The
//! serialized field names match the persisted snapshot layout (`serverId`
//! for the reference, lowercase status strings).

use crate::error::{RackboardError, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::LazyLock;
use uuid::Uuid;

static DOTTED_QUAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9]{1,3}\.){3}[0-9]{1,3}$").expect("valid regex"));

/// Lifecycle status shared by servers and services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

impl Status {
    pub fn is_active(self) -> bool {
        self == Status::Active
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Inactive => "Inactive",
        }
    }

    pub fn toggled(self) -> Status {
        match self {
            Status::Active => Status::Inactive,
            Status::Inactive => Status::Active,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Snapshots written before status existed, or carrying a value we no
/// longer know, load as active.
fn status_or_active<'de, D>(deserializer: D) -> std::result::Result<Status, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(match raw.as_deref() {
        Some("inactive") => Status::Inactive,
        _ => Status::Active,
    })
}

/// Generate a fresh identity. UUID v4, so ids are never reused.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Check a dotted-quad IPv4 address where every octet is 0..=255.
pub fn is_valid_ipv4(ip: &str) -> bool {
    DOTTED_QUAD.is_match(ip)
        && ip
            .split('.')
            .all(|octet| octet.parse::<u16>().is_ok_and(|n| n <= 255))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub id: String,
    pub name: String,
    pub ip: String,
    #[serde(default)]
    pub note: String,
    #[serde(default, deserialize_with = "status_or_active")]
    pub status: Status,
}

impl Server {
    /// Label used in server pickers: `name (ip)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.ip)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(rename = "serverId")]
    pub server_id: String,
    #[serde(default, deserialize_with = "status_or_active")]
    pub status: Status,
}

/// The complete persisted state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub services: Vec<Service>,
}

impl Inventory {
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty() && self.services.is_empty()
    }
}

/// Which entity the modal form is editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    Server(String),
    Service(String),
}

impl EditTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            EditTarget::Server(_) => "server",
            EditTarget::Service(_) => "service",
        }
    }
}

/// Editable server fields, as submitted by a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerDraft {
    pub name: String,
    pub ip: String,
    pub note: String,
    pub status: Status,
}

impl ServerDraft {
    pub fn new(name: &str, ip: &str, note: &str, status: Status) -> Self {
        Self {
            name: name.to_string(),
            ip: ip.to_string(),
            note: note.to_string(),
            status,
        }
    }

    /// Trim text fields and check the name and address.
    pub fn validated(&self) -> Result<ServerDraft> {
        let draft = ServerDraft {
            name: self.name.trim().to_string(),
            ip: self.ip.trim().to_string(),
            note: self.note.trim().to_string(),
            status: self.status,
        };
        if draft.name.is_empty() {
            return Err(RackboardError::Validation(
                "Server name is required".to_string(),
            ));
        }
        if !is_valid_ipv4(&draft.ip) {
            return Err(RackboardError::Validation(format!(
                "Invalid IP address: '{}'",
                draft.ip
            )));
        }
        Ok(draft)
    }
}

impl From<&Server> for ServerDraft {
    fn from(server: &Server) -> Self {
        Self {
            name: server.name.clone(),
            ip: server.ip.clone(),
            note: server.note.clone(),
            status: server.status,
        }
    }
}

/// Editable service fields, as submitted by a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceDraft {
    pub name: String,
    pub desc: String,
    pub server_id: String,
    pub status: Status,
}

impl ServiceDraft {
    pub fn new(name: &str, desc: &str, server_id: &str, status: Status) -> Self {
        Self {
            name: name.to_string(),
            desc: desc.to_string(),
            server_id: server_id.to_string(),
            status,
        }
    }

    /// Trim text fields and check the name. The server reference is checked
    /// by the store, which knows the servers.
    pub fn validated(&self) -> Result<ServiceDraft> {
        let draft = ServiceDraft {
            name: self.name.trim().to_string(),
            desc: self.desc.trim().to_string(),
            server_id: self.server_id.clone(),
            status: self.status,
        };
        if draft.name.is_empty() {
            return Err(RackboardError::Validation(
                "Service name is required".to_string(),
            ));
        }
        Ok(draft)
    }
}

impl From<&Service> for ServiceDraft {
    fn from(service: &Service) -> Self {
        Self {
            name: service.name.clone(),
            desc: service.desc.clone(),
            server_id: service.server_id.clone(),
            status: service.status,
        }
    }
}
