use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum UniversityError {
    #[error("University not found")]
    NotFound,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for UniversityError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Rejections of an uploaded image. The display strings are shown to the user as-is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("File size exceeds 2MB")]
    TooLarge,

    #[error("Only JPG and PNG files are allowed")]
    Extension,

    #[error("Invalid file type")]
    FileType,

    #[error("Failed to move uploaded file")]
    Write(String),
}
