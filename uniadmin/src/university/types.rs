use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct University {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    /// Stored file name under the upload directory
    pub image: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_by: Option<i64>,
    /// Username of the creator, if that account still exists
    pub creator_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of a university record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniversityInput {
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}
