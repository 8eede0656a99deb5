mod data_store;
mod errors;
mod session_store;

pub use data_store::{
    DB_TABLE_PREFIX, DataStore, PostgresDataStore, SqliteDataStore, connect_data_store,
    data_store_from_env,
};
pub use errors::StorageError;
pub use session_store::{InMemorySessionStore, SessionStore, StoredData};
