mod cookie;
mod csrf;
mod flash;
mod session;

pub use cookie::session_id_from_headers;
pub use csrf::{issue_csrf_token, validate_csrf_token};
pub use session::{commit_session, load_session};
