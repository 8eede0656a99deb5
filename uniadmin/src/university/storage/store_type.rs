use crate::storage::DataStore;
use crate::university::{
    errors::UniversityError,
    types::{University, UniversityInput},
};

use super::postgres::*;
use super::sqlite::*;

pub struct UniversityStore;

impl UniversityStore {
    /// Initialize the universities table. The users table must exist first.
    pub async fn init(store: &dyn DataStore) -> Result<(), UniversityError> {
        match (store.as_sqlite(), store.as_postgres()) {
            (Some(pool), _) => create_tables_sqlite(pool).await,
            (_, Some(pool)) => create_tables_postgres(pool).await,
            _ => Err(UniversityError::Storage("Unsupported database type".to_string())),
        }
    }

    /// Newest first. `limit: None` returns every match after `offset`.
    pub async fn list(
        store: &dyn DataStore,
        limit: Option<i64>,
        offset: i64,
        search: Option<&str>,
    ) -> Result<Vec<University>, UniversityError> {
        let search = search.filter(|s| !s.is_empty());
        if let Some(pool) = store.as_sqlite() {
            list_universities_sqlite(pool, limit, offset, search).await
        } else if let Some(pool) = store.as_postgres() {
            list_universities_postgres(pool, limit, offset, search).await
        } else {
            Err(UniversityError::Storage("Unsupported database type".to_string()))
        }
    }

    pub async fn count(store: &dyn DataStore, search: Option<&str>) -> Result<i64, UniversityError> {
        let search = search.filter(|s| !s.is_empty());
        if let Some(pool) = store.as_sqlite() {
            count_universities_sqlite(pool, search).await
        } else if let Some(pool) = store.as_postgres() {
            count_universities_postgres(pool, search).await
        } else {
            Err(UniversityError::Storage("Unsupported database type".to_string()))
        }
    }

    #[tracing::instrument(skip(store), fields(university_id = %id))]
    pub async fn get(store: &dyn DataStore, id: i64) -> Result<Option<University>, UniversityError> {
        if let Some(pool) = store.as_sqlite() {
            get_university_sqlite(pool, id).await
        } else if let Some(pool) = store.as_postgres() {
            get_university_postgres(pool, id).await
        } else {
            Err(UniversityError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Inserts a record and returns its id.
    #[tracing::instrument(skip(store, input), fields(name = %input.name))]
    pub async fn create(
        store: &dyn DataStore,
        input: &UniversityInput,
        created_by: i64,
    ) -> Result<i64, UniversityError> {
        let id = if let Some(pool) = store.as_sqlite() {
            insert_university_sqlite(pool, input, created_by).await?
        } else if let Some(pool) = store.as_postgres() {
            insert_university_postgres(pool, input, created_by).await?
        } else {
            return Err(UniversityError::Storage("Unsupported database type".to_string()));
        };
        tracing::info!(university_id = id, "University created");
        Ok(id)
    }

    #[tracing::instrument(skip(store, input), fields(university_id = %id))]
    pub async fn update(
        store: &dyn DataStore,
        id: i64,
        input: &UniversityInput,
    ) -> Result<(), UniversityError> {
        let updated = if let Some(pool) = store.as_sqlite() {
            update_university_sqlite(pool, id, input).await?
        } else if let Some(pool) = store.as_postgres() {
            update_university_postgres(pool, id, input).await?
        } else {
            return Err(UniversityError::Storage("Unsupported database type".to_string()));
        };

        if updated {
            Ok(())
        } else {
            Err(UniversityError::NotFound)
        }
    }

    #[tracing::instrument(skip(store), fields(university_id = %id))]
    pub async fn delete(store: &dyn DataStore, id: i64) -> Result<(), UniversityError> {
        let deleted = if let Some(pool) = store.as_sqlite() {
            delete_university_sqlite(pool, id).await?
        } else if let Some(pool) = store.as_postgres() {
            delete_university_postgres(pool, id).await?
        } else {
            return Err(UniversityError::Storage("Unsupported database type".to_string()));
        };

        if deleted {
            tracing::info!("University deleted");
            Ok(())
        } else {
            Err(UniversityError::NotFound)
        }
    }
}
