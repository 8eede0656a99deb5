//! uniadmin - session, CSRF, credential and dispatch core for a university directory admin
//!
//! The crate is transport-agnostic: a web integration turns each HTTP request into a
//! [`RequestInput`], calls [`App::handle`], and turns the returned [`Outcome`] into a response.

mod authz;
mod config;
mod coordination;
mod credential;
mod dispatch;
mod session;
mod storage;
mod university;
mod userdb;
mod utils;

#[cfg(test)]
mod test_utils;

pub use config::DISPATCH_FALLBACK;

pub use coordination::{
    Action, ActionError, ActionResult, App, AppResponse, BoxFuture, CoordinationError,
    DashboardStats, Outcome, Page, RequestContext, RequestInput, View, default_route_table,
};

pub use authz::{
    Denial, GateError, LANDING_PATH, LOGIN_PATH, is_admin, is_authenticated, require_admin,
    require_authenticated,
};

pub use credential::{CredentialError, CredentialVerifier};

pub use dispatch::{DispatchError, FallbackPolicy, Route, RouteTable, handler_name, split_path};

pub use session::{
    ClientInfo, Flash, FlashKind, Principal, SESSION_COOKIE_NAME, SESSION_COOKIE_SECURE,
    SESSION_LIFETIME, Session, SessionError, session_id_from_headers,
};

pub use storage::{
    DataStore, InMemorySessionStore, PostgresDataStore, SessionStore, SqliteDataStore,
    StorageError, StoredData, connect_data_store, data_store_from_env,
};

pub use university::{ImageStore, MAX_FILE_SIZE, University, UploadError, UploadedFile};

pub use userdb::{Role, User};
