use thiserror::Error;

/// Errors the storage layer reports to request handlers
#[derive(Error, Debug)]
pub enum StorageError {
    /// The upload stream failed before the file was complete (client disconnect, malformed
    /// multipart body, body limit reached). The partial file has already been removed.
    #[error("Upload stream failed: {0}")]
    Stream(std::io::Error),

    /// Writing to the storage directory failed (disk full, permission denied, ...)
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;
