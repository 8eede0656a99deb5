use crate::storage::DataStore;
use crate::userdb::{
    errors::UserError,
    types::{NewUser, Role, StoredCredential, User, UserUpdate},
};

use super::postgres::*;
use super::sqlite::*;

pub struct UserStore;

impl UserStore {
    /// Initialize the user database tables
    pub async fn init(store: &dyn DataStore) -> Result<(), UserError> {
        match (store.as_sqlite(), store.as_postgres()) {
            (Some(pool), _) => create_tables_sqlite(pool).await,
            (_, Some(pool)) => create_tables_postgres(pool).await,
            _ => Err(UserError::Storage("Unsupported database type".to_string())),
        }
    }

    /// All users, newest first
    pub async fn get_all_users(store: &dyn DataStore) -> Result<Vec<User>, UserError> {
        if let Some(pool) = store.as_sqlite() {
            get_all_users_sqlite(pool).await
        } else if let Some(pool) = store.as_postgres() {
            get_all_users_postgres(pool).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    #[tracing::instrument(skip(store), fields(user_id = %id))]
    pub async fn get_user(store: &dyn DataStore, id: i64) -> Result<Option<User>, UserError> {
        let result = if let Some(pool) = store.as_sqlite() {
            get_user_sqlite(pool, id).await
        } else if let Some(pool) = store.as_postgres() {
            get_user_postgres(pool, id).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(Some(_)) => tracing::debug!(found = true, "User lookup completed"),
            Ok(None) => tracing::debug!(found = false, "User lookup completed - not found"),
            Err(e) => tracing::error!(error = %e, "User lookup failed"),
        }

        result
    }

    /// Looks a user up by username or email, returning the stored password digest with it.
    #[tracing::instrument(skip(store, identifier))]
    pub async fn find_credential(
        store: &dyn DataStore,
        identifier: &str,
    ) -> Result<Option<StoredCredential>, UserError> {
        if let Some(pool) = store.as_sqlite() {
            get_credential_sqlite(pool, identifier).await
        } else if let Some(pool) = store.as_postgres() {
            get_credential_postgres(pool, identifier).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    #[tracing::instrument(skip(store, new_user), fields(username = %new_user.username, role = %new_user.role))]
    pub async fn create_user(store: &dyn DataStore, new_user: NewUser) -> Result<User, UserError> {
        let result = if let Some(pool) = store.as_sqlite() {
            insert_user_sqlite(pool, &new_user).await
        } else if let Some(pool) = store.as_postgres() {
            insert_user_postgres(pool, &new_user).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(user) => tracing::info!(user_id = user.id, "User created"),
            Err(e) => tracing::error!(error = %e, "User creation failed"),
        }
        result
    }

    #[tracing::instrument(skip(store, update), fields(user_id = %id))]
    pub async fn update_user(
        store: &dyn DataStore,
        id: i64,
        update: UserUpdate,
    ) -> Result<User, UserError> {
        let updated = if let Some(pool) = store.as_sqlite() {
            update_user_sqlite(pool, id, &update).await?
        } else if let Some(pool) = store.as_postgres() {
            update_user_postgres(pool, id, &update).await?
        } else {
            return Err(UserError::Storage("Unsupported database type".to_string()));
        };

        updated.ok_or(UserError::NotFound)
    }

    /// Deletes a user. Fails with [`UserError::LastAdmin`] if it is the only admin left.
    #[tracing::instrument(skip(store), fields(user_id = %id))]
    pub async fn delete_user(store: &dyn DataStore, id: i64) -> Result<(), UserError> {
        let result = if let Some(pool) = store.as_sqlite() {
            delete_user_sqlite(pool, id).await
        } else if let Some(pool) = store.as_postgres() {
            delete_user_postgres(pool, id).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(()) => tracing::info!("User deleted"),
            Err(UserError::LastAdmin) => tracing::warn!("Refused to delete the last admin"),
            Err(e) => tracing::error!(error = %e, "User deletion failed"),
        }
        result
    }

    pub async fn username_exists(
        store: &dyn DataStore,
        username: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, UserError> {
        Self::column_value_exists(store, "username", username, exclude_id).await
    }

    pub async fn email_exists(
        store: &dyn DataStore,
        email: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, UserError> {
        Self::column_value_exists(store, "email", email, exclude_id).await
    }

    async fn column_value_exists(
        store: &dyn DataStore,
        column: &str,
        value: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, UserError> {
        let count = if let Some(pool) = store.as_sqlite() {
            count_by_column_sqlite(pool, column, value, exclude_id).await?
        } else if let Some(pool) = store.as_postgres() {
            count_by_column_postgres(pool, column, value, exclude_id).await?
        } else {
            return Err(UserError::Storage("Unsupported database type".to_string()));
        };
        Ok(count > 0)
    }

    /// Number of users, optionally restricted to one role
    pub async fn count_users(store: &dyn DataStore, role: Option<Role>) -> Result<i64, UserError> {
        if let Some(pool) = store.as_sqlite() {
            count_users_sqlite(pool, role).await
        } else if let Some(pool) = store.as_postgres() {
            count_users_postgres(pool, role).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }
}
