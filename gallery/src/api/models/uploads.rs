use serde::Serialize;

use crate::config::StorageConfig;
use crate::storage::models::StoredFile;

/// A link to a stored file, as rendered in upload responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadLink {
    /// Public URL of the stored file
    pub href: String,
    /// Text shown for the link; the client's original filename for gallery uploads
    pub label: String,
}

impl UploadLink {
    pub fn from_stored(storage: &StorageConfig, file: &StoredFile) -> Self {
        Self {
            href: storage.public_url(&file.stored_name),
            label: file.original_name.clone(),
        }
    }
}
