mod memory;
mod types;

pub use types::{InMemorySessionStore, SessionStore, StoredData};
