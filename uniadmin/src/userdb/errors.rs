use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Cannot delete the last admin")]
    LastAdmin,
}

impl From<sqlx::Error> for UserError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
