mod errors;
mod storage;
mod types;

pub use errors::UserError;
pub use storage::UserStore;
pub use types::{NewUser, Role, User, UserUpdate};

pub(crate) use storage::DB_TABLE_USERS;
