//! Upload storage.
//!
//! Handlers never touch the filesystem directly: they hand each uploaded part to an
//! [`ImageStorage`] as a byte stream and get back the name it was stored under. The default
//! backend is [`local::LocalImageStorage`], which writes flat files into one directory using a
//! pluggable [`naming::NameGenerator`].

pub mod errors;
pub mod local;
pub mod models;
pub mod naming;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use errors::Result;
use models::StoredFile;

/// Content of one uploaded file as it arrives off the wire
pub type ByteStream<'a> = BoxStream<'a, std::io::Result<Bytes>>;

/// Trait for upload storage backends
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Write `content` under a freshly generated name and return where it went.
    ///
    /// If the stream fails part-way the backend removes whatever it had written and returns
    /// [`errors::StorageError::Stream`].
    async fn place(&self, original_name: &str, content: ByteStream<'_>) -> Result<StoredFile>;

    /// Remove a previously placed file. Removing a file that is already gone is not an error.
    async fn remove(&self, stored_name: &str) -> Result<()>;
}
