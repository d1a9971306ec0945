use super::{
    ByteStream, ImageStorage,
    errors::{Result, StorageError},
    models::StoredFile,
    naming::{NameGenerator, TimestampNaming},
};
use async_trait::async_trait;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

/// Local filesystem storage backend - one flat directory, no index
pub struct LocalImageStorage {
    base_path: PathBuf,
    naming: Arc<dyn NameGenerator>,
}

impl LocalImageStorage {
    /// Storage rooted at `base_path` using [`TimestampNaming`]
    pub fn new(base_path: PathBuf) -> Self {
        Self::with_naming(base_path, Arc::new(TimestampNaming))
    }

    pub fn with_naming(base_path: PathBuf, naming: Arc<dyn NameGenerator>) -> Self {
        Self { base_path, naming }
    }

    /// Create the storage directory if it does not exist yet
    pub async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }

    async fn discard_partial(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(path = %path.display(), error = %e, "Failed to remove partial upload");
        }
    }
}

#[async_trait]
impl ImageStorage for LocalImageStorage {
    #[instrument(skip(self, content), err)]
    async fn place(&self, original_name: &str, mut content: ByteStream<'_>) -> Result<StoredFile> {
        let stored_name = self.naming.generate(original_name);
        let full_path = self.base_path.join(&stored_name);

        // Same-millisecond uploads share a name; the later write wins
        let mut file = fs::File::create(&full_path).await?;
        let mut size_bytes = 0u64;

        while let Some(chunk) = content.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    drop(file);
                    self.discard_partial(&full_path).await;
                    return Err(StorageError::Stream(e));
                }
            };

            if let Err(e) = file.write_all(&chunk).await {
                drop(file);
                self.discard_partial(&full_path).await;
                return Err(StorageError::Io(e));
            }
            size_bytes += chunk.len() as u64;

            debug!(stored_name = %stored_name, chunk_size = chunk.len(), total_size = size_bytes, "Wrote chunk");
        }

        file.flush().await?;

        let content_type = mime_guess::from_path(&stored_name).first_or_octet_stream().to_string();

        info!(
            stored_name = %stored_name,
            original_name = %original_name,
            size_bytes = size_bytes,
            content_type = %content_type,
            "Stored upload"
        );

        Ok(StoredFile {
            stored_name,
            original_name: original_name.to_string(),
            size_bytes,
            content_type,
        })
    }

    async fn remove(&self, stored_name: &str) -> Result<()> {
        let full_path = self.base_path.join(stored_name);

        match fs::remove_file(&full_path).await {
            Ok(()) => {
                debug!(stored_name = %stored_name, "Removed stored file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}
