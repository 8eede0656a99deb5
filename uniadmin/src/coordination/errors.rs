//! Error types for request coordination

use thiserror::Error;

use crate::credential::CredentialError;
use crate::dispatch::DispatchError;
use crate::session::SessionError;
use crate::storage::StorageError;
use crate::university::UniversityError;
use crate::userdb::UserError;

/// Infrastructure failures that abort a request. None of these carry user-facing text.
#[derive(Error, Debug)]
pub enum CoordinationError {
    /// General coordination error
    #[error("Coordination error: {0}")]
    Coordination(String),

    /// Error from the user database operations
    #[error("User error: {0}")]
    UserError(UserError),

    /// Error from the university database operations
    #[error("University error: {0}")]
    UniversityError(UniversityError),

    /// Error from Session operations
    #[error("Session error: {0}")]
    SessionError(SessionError),

    /// Error from password hashing
    #[error("Credential error: {0}")]
    CredentialError(CredentialError),

    /// Error from storage setup
    #[error("Storage error: {0}")]
    StorageError(StorageError),

    /// Error from the route table
    #[error("Dispatch error: {0}")]
    DispatchError(DispatchError),
}

impl CoordinationError {
    /// Log the error and return self
    pub fn log(self) -> Self {
        match &self {
            Self::Coordination(msg) => tracing::error!("Coordination error: {}", msg),
            Self::UserError(err) => tracing::error!("User error: {}", err),
            Self::UniversityError(err) => tracing::error!("University error: {}", err),
            Self::SessionError(err) => tracing::error!("Session error: {}", err),
            Self::CredentialError(err) => tracing::error!("Credential error: {}", err),
            Self::StorageError(err) => tracing::error!("Storage error: {}", err),
            Self::DispatchError(err) => tracing::error!("Dispatch error: {}", err),
        }
        self
    }
}

// Custom From implementations that automatically log errors

impl From<UserError> for CoordinationError {
    fn from(err: UserError) -> Self {
        let error = Self::UserError(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<UniversityError> for CoordinationError {
    fn from(err: UniversityError) -> Self {
        let error = Self::UniversityError(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<SessionError> for CoordinationError {
    fn from(err: SessionError) -> Self {
        let error = Self::SessionError(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<CredentialError> for CoordinationError {
    fn from(err: CredentialError) -> Self {
        let error = Self::CredentialError(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<StorageError> for CoordinationError {
    fn from(err: StorageError) -> Self {
        let error = Self::StorageError(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<DispatchError> for CoordinationError {
    fn from(err: DispatchError) -> Self {
        let error = Self::DispatchError(err);
        tracing::error!("{}", error);
        error
    }
}
