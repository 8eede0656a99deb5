use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::userdb::Role;

/// Per-client state bag, loaded at the start of a request and committed at the end.
///
/// The bag is only ever touched through the owning request, so handlers receive it
/// as part of their request context instead of reaching for ambient state.
#[derive(Debug, Clone)]
pub struct Session {
    pub(super) id: String,
    pub(super) data: BTreeMap<String, Value>,
    pub(super) destroyed: bool,
    /// Ids whose server-side records must be removed on commit.
    pub(super) stale_ids: Vec<String>,
}

/// What is persisted for a session id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SessionRecord {
    pub(super) data: BTreeMap<String, Value>,
}

/// Read-only projection of the signed-in user kept in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
    Warning,
    Info,
}

impl FlashKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// One-shot message shown by the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    #[serde(rename = "type")]
    pub kind: FlashKind,
    pub message: String,
}

/// Request metadata recorded alongside the principal at sign-in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}
