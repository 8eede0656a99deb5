mod config;
mod errors;
mod main;
mod types;

pub use config::{SESSION_COOKIE_NAME, SESSION_COOKIE_SECURE, SESSION_LIFETIME};
pub use errors::SessionError;
pub use main::{
    commit_session, issue_csrf_token, load_session, session_id_from_headers, validate_csrf_token,
};
pub use types::{ClientInfo, Flash, FlashKind, Principal, Session};
