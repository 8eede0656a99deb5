//! Database connection configuration

use std::{env, str::FromStr, sync::LazyLock};

use super::types::{DataStore, PostgresDataStore, SqliteDataStore};
use crate::storage::errors::StorageError;

/// Table prefix from environment variable
pub static DB_TABLE_PREFIX: LazyLock<String> =
    LazyLock::new(|| env::var("DB_TABLE_PREFIX").unwrap_or_default());

/// Builds a lazily connecting pool for `store_type` (`sqlite` or `postgres`).
pub fn connect_data_store(
    store_type: &str,
    store_url: &str,
) -> Result<Box<dyn DataStore>, StorageError> {
    tracing::info!("Initializing data store with type: {}", store_type);

    let store: Box<dyn DataStore> = match store_type {
        "sqlite" => {
            let opts = sqlx::sqlite::SqliteConnectOptions::from_str(store_url)
                .map_err(|e| StorageError::Config(format!("Invalid SQLite URL: {e}")))?
                .create_if_missing(true)
                .foreign_keys(true);
            Box::new(SqliteDataStore::new(
                sqlx::sqlite::SqlitePool::connect_lazy_with(opts),
            ))
        }
        "postgres" => Box::new(PostgresDataStore::new(
            sqlx::PgPool::connect_lazy(store_url)
                .map_err(|e| StorageError::Config(format!("Invalid Postgres URL: {e}")))?,
        )),
        t => {
            return Err(StorageError::Config(format!(
                "Unsupported store type: {t}. Supported types are 'sqlite' and 'postgres'"
            )));
        }
    };

    Ok(store)
}

/// Reads `GENERIC_DATA_STORE_TYPE` and `GENERIC_DATA_STORE_URL` and connects.
pub fn data_store_from_env() -> Result<Box<dyn DataStore>, StorageError> {
    let store_type = env::var("GENERIC_DATA_STORE_TYPE")
        .map_err(|_| StorageError::Config("GENERIC_DATA_STORE_TYPE must be set".to_string()))?;
    let store_url = env::var("GENERIC_DATA_STORE_URL")
        .map_err(|_| StorageError::Config("GENERIC_DATA_STORE_URL must be set".to_string()))?;
    connect_data_store(&store_type, &store_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[tokio::test]
    async fn test_connect_sqlite_memory() {
        // Given an in-memory SQLite URL
        let store = connect_data_store("sqlite", "sqlite::memory:").unwrap();

        // Then only the sqlite accessor is populated
        assert!(store.as_sqlite().is_some());
        assert!(store.as_postgres().is_none());
    }

    #[test]
    fn test_unsupported_store_type() {
        let result = connect_data_store("mysql", "mysql://localhost");
        match result {
            Err(StorageError::Config(msg)) => assert!(msg.contains("Unsupported store type")),
            _ => panic!("expected a configuration error"),
        }
    }

    #[test]
    #[serial]
    fn test_missing_store_type_env_var() {
        // Given no store type in the environment
        let original = env::var("GENERIC_DATA_STORE_TYPE").ok();
        unsafe { env::remove_var("GENERIC_DATA_STORE_TYPE") };

        // When connecting from the environment
        let result = data_store_from_env();

        // Then a configuration error names the variable
        match result {
            Err(StorageError::Config(msg)) => assert!(msg.contains("GENERIC_DATA_STORE_TYPE")),
            _ => panic!("expected a configuration error"),
        }

        if let Some(value) = original {
            unsafe { env::set_var("GENERIC_DATA_STORE_TYPE", value) };
        }
    }
}
