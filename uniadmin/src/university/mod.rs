mod errors;
mod storage;
mod types;
mod upload;

pub use errors::{UniversityError, UploadError};
pub use storage::UniversityStore;
pub use types::{University, UniversityInput};
pub use upload::{ImageStore, MAX_FILE_SIZE, UploadedFile};

#[cfg(test)]
pub(crate) use storage::DB_TABLE_UNIVERSITIES;
