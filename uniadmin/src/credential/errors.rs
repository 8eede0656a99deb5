use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum CredentialError {
    #[error("Invalid hashing parameters: {0}")]
    Params(String),

    #[error("Hashing failed: {0}")]
    Hashing(String),
}
