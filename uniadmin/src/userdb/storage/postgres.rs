use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::userdb::{
    errors::UserError,
    types::{NewUser, Role, StoredCredential, User, UserUpdate},
};

use super::config::DB_TABLE_USERS;

const USER_COLUMNS: &str = "id, username, email, role, created_at, updated_at";

pub(super) async fn create_tables_postgres(pool: &Pool<Postgres>) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id BIGSERIAL PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('admin', 'user')),
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}

pub(super) async fn get_all_users_postgres(pool: &Pool<Postgres>) -> Result<Vec<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    Ok(sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {USER_COLUMNS} FROM {table_name} ORDER BY created_at DESC, id DESC
        "#
    ))
    .fetch_all(pool)
    .await?)
}

pub(super) async fn get_user_postgres(
    pool: &Pool<Postgres>,
    id: i64,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    Ok(sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {USER_COLUMNS} FROM {table_name} WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?)
}

pub(super) async fn get_credential_postgres(
    pool: &Pool<Postgres>,
    identifier: &str,
) -> Result<Option<StoredCredential>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    Ok(sqlx::query_as::<_, StoredCredential>(&format!(
        r#"
        SELECT {USER_COLUMNS}, password FROM {table_name}
        WHERE username = $1 OR email = $1
        LIMIT 1
        "#
    ))
    .bind(identifier)
    .fetch_optional(pool)
    .await?)
}

pub(super) async fn insert_user_postgres(
    pool: &Pool<Postgres>,
    user: &NewUser,
) -> Result<User, UserError> {
    let table_name = DB_TABLE_USERS.as_str();
    let now = Utc::now();

    Ok(sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO {table_name} (username, email, password, role, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role.as_str())
    .bind(now)
    .fetch_one(pool)
    .await?)
}

pub(super) async fn update_user_postgres(
    pool: &Pool<Postgres>,
    id: i64,
    update: &UserUpdate,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    Ok(sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE {table_name}
        SET username = $1, email = $2, role = $3, password = COALESCE($4, password), updated_at = $5
        WHERE id = $6
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&update.username)
    .bind(&update.email)
    .bind(update.role.as_str())
    .bind(update.password_hash.as_deref())
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?)
}

/// Deletes a user unless it is the only remaining admin.
///
/// All admin rows are locked before counting so two concurrent deletions cannot each see
/// the other admin as the survivor.
pub(super) async fn delete_user_postgres(pool: &Pool<Postgres>, id: i64) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();
    let mut tx = pool.begin().await?;

    let role: Option<String> = sqlx::query_scalar(&format!(
        "SELECT role FROM {table_name} WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;
    let Some(role) = role else {
        return Err(UserError::NotFound);
    };

    if role == Role::Admin.as_str() {
        let admin_ids: Vec<i64> = sqlx::query_scalar(&format!(
            "SELECT id FROM {table_name} WHERE role = 'admin' FOR UPDATE"
        ))
        .fetch_all(&mut *tx)
        .await?;
        if admin_ids.iter().all(|admin_id| *admin_id == id) {
            return Err(UserError::LastAdmin);
        }
    }

    sqlx::query(&format!("DELETE FROM {table_name} WHERE id = $1"))
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(())
}

pub(super) async fn count_by_column_postgres(
    pool: &Pool<Postgres>,
    column: &str,
    value: &str,
    exclude_id: Option<i64>,
) -> Result<i64, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    Ok(sqlx::query_scalar(&format!(
        r#"
        SELECT COUNT(*) FROM {table_name}
        WHERE {column} = $1 AND ($2::BIGINT IS NULL OR id <> $2)
        "#
    ))
    .bind(value)
    .bind(exclude_id)
    .fetch_one(pool)
    .await?)
}

pub(super) async fn count_users_postgres(
    pool: &Pool<Postgres>,
    role: Option<Role>,
) -> Result<i64, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    Ok(sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {table_name} WHERE ($1::TEXT IS NULL OR role = $1)"
    ))
    .bind(role.map(|r| r.as_str()))
    .fetch_one(pool)
    .await?)
}
