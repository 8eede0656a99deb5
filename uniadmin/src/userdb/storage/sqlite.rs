use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::userdb::{
    errors::UserError,
    types::{NewUser, Role, StoredCredential, User, UserUpdate},
};

use super::config::DB_TABLE_USERS;

const USER_COLUMNS: &str = "id, username, email, role, created_at, updated_at";

pub(super) async fn create_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('admin', 'user')),
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}

pub(super) async fn get_all_users_sqlite(pool: &Pool<Sqlite>) -> Result<Vec<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    Ok(sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {USER_COLUMNS} FROM {table_name} ORDER BY created_at DESC, id DESC
        "#
    ))
    .fetch_all(pool)
    .await?)
}

pub(super) async fn get_user_sqlite(pool: &Pool<Sqlite>, id: i64) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    Ok(sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {USER_COLUMNS} FROM {table_name} WHERE id = ?
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?)
}

pub(super) async fn get_credential_sqlite(
    pool: &Pool<Sqlite>,
    identifier: &str,
) -> Result<Option<StoredCredential>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    Ok(sqlx::query_as::<_, StoredCredential>(&format!(
        r#"
        SELECT {USER_COLUMNS}, password FROM {table_name}
        WHERE username = ? OR email = ?
        LIMIT 1
        "#
    ))
    .bind(identifier)
    .bind(identifier)
    .fetch_optional(pool)
    .await?)
}

pub(super) async fn insert_user_sqlite(
    pool: &Pool<Sqlite>,
    user: &NewUser,
) -> Result<User, UserError> {
    let table_name = DB_TABLE_USERS.as_str();
    let now = Utc::now();

    Ok(sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO {table_name} (username, email, password, role, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role.as_str())
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?)
}

pub(super) async fn update_user_sqlite(
    pool: &Pool<Sqlite>,
    id: i64,
    update: &UserUpdate,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    Ok(sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE {table_name}
        SET username = ?, email = ?, role = ?, password = COALESCE(?, password), updated_at = ?
        WHERE id = ?
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

/// Deletes a user unless it is the only remaining admin. Check and delete share one transaction.
pub(super) async fn delete_user_sqlite(pool: &Pool<Sqlite>, id: i64) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();
    let mut tx = pool.begin().await?;

    let role: Option<String> =
        sqlx::query_scalar(&format!("SELECT role FROM {table_name} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(role) = role else {
        return Err(UserError::NotFound);
    };

    if role == Role::Admin.as_str() {
        let other_admins: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {table_name} WHERE role = 'admin' AND id != ?"
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if other_admins == 0 {
            return Err(UserError::LastAdmin);
        }
    }

    sqlx::query(&format!("DELETE FROM {table_name} WHERE id = ?"))
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(())
}

pub(super) async fn count_by_column_sqlite(
    pool: &Pool<Sqlite>,
    column: &str,
    value: &str,
    exclude_id: Option<i64>,
) -> Result<i64, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    Ok(sqlx::query_scalar(&format!(
        r#"
        SELECT COUNT(*) FROM {table_name} WHERE {column} = ? AND (? IS NULL OR id != ?)
        "#
    ))
    .bind(value)
    .bind(exclude_id)
    .bind(exclude_id)
    .fetch_one(pool)
    .await?)
}

pub(super) async fn count_users_sqlite(
    pool: &Pool<Sqlite>,
    role: Option<Role>,
) -> Result<i64, UserError> {
    let table_name = DB_TABLE_USERS.as_str();
    let role = role.map(|r| r.as_str());

    Ok(sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {table_name} WHERE (? IS NULL OR role = ?)"
    ))
    .bind(role)
    .bind(role)
    .fetch_one(pool)
    .await?)
}
