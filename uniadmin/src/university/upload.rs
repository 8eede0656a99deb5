use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use super::errors::UploadError;

pub const MAX_FILE_SIZE: usize = 2 * 1024 * 1024;

static UPLOAD_DIR: LazyLock<String> =
    LazyLock::new(|| std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()));

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// A file received with a multipart form field.
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Browsers send an empty part when the file input was left blank.
    pub fn is_empty(&self) -> bool {
        self.file_name.is_empty() && self.bytes.is_empty()
    }
}

/// Validates university images and keeps them under one directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory from `UPLOAD_DIR`, `./uploads` by default.
    pub fn from_env() -> Self {
        Self::new(UPLOAD_DIR.as_str())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Checks size, then extension, then the actual content. Returns the lowercase extension.
    pub fn validate(file: &UploadedFile) -> Result<String, UploadError> {
        if file.bytes.len() > MAX_FILE_SIZE {
            return Err(UploadError::TooLarge);
        }

        let extension = Path::new(&file.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !matches!(extension.as_str(), "jpg" | "jpeg" | "png") {
            return Err(UploadError::Extension);
        }

        if !(file.bytes.starts_with(JPEG_MAGIC) || file.bytes.starts_with(PNG_MAGIC)) {
            return Err(UploadError::FileType);
        }

        Ok(extension)
    }

    /// Validates and writes the file under a fresh `univ_<uuid>.<ext>` name, returning that name.
    pub async fn save(&self, file: &UploadedFile) -> Result<String, UploadError> {
        let extension = Self::validate(file)?;
        let file_name = format!("univ_{}.{}", uuid::Uuid::new_v4().simple(), extension);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| UploadError::Write(e.to_string()))?;
        tokio::fs::write(self.dir.join(&file_name), &file.bytes)
            .await
            .map_err(|e| UploadError::Write(e.to_string()))?;

        tracing::info!(file_name = %file_name, size = file.bytes.len(), "Stored uploaded image");
        Ok(file_name)
    }

    /// Removes a stored image. A missing file is not an error.
    pub async fn remove(&self, file_name: &str) {
        // Only bare file names.
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name.starts_with('.') {
            tracing::warn!(file_name = %file_name, "Refusing to remove suspicious image name");
            return;
        }

        match tokio::fs::remove_file(self.dir.join(file_name)).await {
            Ok(()) => tracing::debug!(file_name = %file_name, "Removed image"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(file_name = %file_name, error = %e, "Failed to remove image"),
        }
    }
}
