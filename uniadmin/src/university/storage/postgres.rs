use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::university::{
    errors::UniversityError,
    types::{University, UniversityInput},
};
use crate::userdb::DB_TABLE_USERS;

use super::config::{DB_TABLE_UNIVERSITIES, like_pattern};

fn select_columns() -> String {
    let users = DB_TABLE_USERS.as_str();
    let table_name = DB_TABLE_UNIVERSITIES.as_str();
    format!(
        r#"
        SELECT u.id, u.name, u.address, u.description, u.image, u.website, u.phone, u.email,
               u.created_by, us.username AS creator_name, u.created_at, u.updated_at
        FROM {table_name} u
        LEFT JOIN {users} us ON u.created_by = us.id
        "#
    )
}

// ILIKE keeps search case-insensitive like SQLite's LIKE.
const SEARCH_CLAUSE: &str = r#"
        WHERE ($1::TEXT IS NULL
            OR u.name ILIKE $1
            OR u.address ILIKE $1
            OR u.description ILIKE $1)
"#;

pub(super) async fn create_tables_postgres(pool: &Pool<Postgres>) -> Result<(), UniversityError> {
    let table_name = DB_TABLE_UNIVERSITIES.as_str();
    let users = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            address TEXT NOT NULL,
            description TEXT,
            image TEXT,
            website TEXT,
            phone TEXT,
            email TEXT,
            created_by BIGINT REFERENCES {users}(id) ON DELETE SET NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}

pub(super) async fn list_universities_postgres(
    pool: &Pool<Postgres>,
    limit: Option<i64>,
    offset: i64,
    search: Option<&str>,
) -> Result<Vec<University>, UniversityError> {
    let pattern = search.map(like_pattern);

    Ok(sqlx::query_as::<_, University>(&format!(
        "{} {SEARCH_CLAUSE} ORDER BY u.created_at DESC, u.id DESC LIMIT $2 OFFSET $3",
        select_columns()
    ))
    .bind(pattern)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?)
}

pub(super) async fn count_universities_postgres(
    pool: &Pool<Postgres>,
    search: Option<&str>,
) -> Result<i64, UniversityError> {
    let table_name = DB_TABLE_UNIVERSITIES.as_str();

    Ok(sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {table_name} u {SEARCH_CLAUSE}"
    ))
    .bind(search.map(like_pattern))
    .fetch_one(pool)
    .await?)
}

pub(super) async fn get_university_postgres(
    pool: &Pool<Postgres>,
    id: i64,
) -> Result<Option<University>, UniversityError> {
    Ok(
        sqlx::query_as::<_, University>(&format!("{} WHERE u.id = $1", select_columns()))
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

pub(super) async fn insert_university_postgres(
    pool: &Pool<Postgres>,
    input: &UniversityInput,
    created_by: i64,
) -> Result<i64, UniversityError> {
    let table_name = DB_TABLE_UNIVERSITIES.as_str();

    Ok(sqlx::query_scalar(&format!(
        r#"
        INSERT INTO {table_name}
            (name, address, description, image, website, phone, email, created_by, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
        RETURNING id
        "#
    ))
    .bind(&input.name)
    .bind(&input.address)
    .bind(&input.description)
    .bind(&input.image)
    .bind(&input.website)
    .bind(&input.phone)
    .bind(&input.email)
    .bind(created_by)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?)
}

pub(super) async fn update_university_postgres(
    pool: &Pool<Postgres>,
    id: i64,
    input: &UniversityInput,
) -> Result<bool, UniversityError> {
    let table_name = DB_TABLE_UNIVERSITIES.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {table_name}
        SET name = $1, address = $2, description = $3, image = $4, website = $5, phone = $6,
            email = $7, updated_at = $8
        WHERE id = $9
        "#
    ))
    .bind(&input.name)
    .bind(&input.address)
    .bind(&input.description)
    .bind(&input.image)
    .bind(&input.website)
    .bind(&input.phone)
    .bind(&input.email)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(super) async fn delete_university_postgres(
    pool: &Pool<Postgres>,
    id: i64,
) -> Result<bool, UniversityError> {
    let table_name = DB_TABLE_UNIVERSITIES.as_str();

    let result = sqlx::query(&format!("DELETE FROM {table_name} WHERE id = $1"))
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
