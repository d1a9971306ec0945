//! Test utilities for handler and storage tests.

use crate::config::{Config, StorageConfig};
use crate::storage::{
    ByteStream, ImageStorage,
    errors::{Result, StorageError},
    local::LocalImageStorage,
    models::StoredFile,
    naming::{NameGenerator, extension_of},
};
use async_trait::async_trait;
use axum_test::TestServer;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Deterministic naming: `1<.ext>`, `2<.ext>`, ... in upload order
#[derive(Debug, Default)]
pub struct SequentialNaming {
    next: AtomicU64,
}

impl NameGenerator for SequentialNaming {
    fn generate(&self, original_name: &str) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}{}", n, extension_of(original_name))
    }
}

pub fn create_test_config(storage_dir: &Path) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        storage: StorageConfig {
            dir: storage_dir.to_path_buf(),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Test server storing into `storage_dir` (which must exist) with [`SequentialNaming`]
pub fn create_test_app(storage_dir: &Path) -> TestServer {
    create_test_app_with_config(create_test_config(storage_dir))
}

/// Local storage with [`SequentialNaming`] rooted at `dir`
pub fn sequential_storage(dir: &Path) -> LocalImageStorage {
    LocalImageStorage::with_naming(dir.to_path_buf(), Arc::new(SequentialNaming::default()))
}

/// Test server for an explicit config. The storage directory is used as-is and never created.
pub fn create_test_app_with_config(config: Config) -> TestServer {
    let storage = sequential_storage(&config.storage.dir);
    create_test_app_with_storage(config, Arc::new(storage))
}

pub fn create_test_app_with_storage(config: Config, storage: Arc<dyn ImageStorage>) -> TestServer {
    crate::Application::with_storage(config, storage)
        .expect("Failed to create application")
        .into_test_server()
}

/// Storage that delegates to a real backend but fails the `fail_on`-th `place` call (1-based)
/// with the error produced by `failure`, without writing anything for that call
pub struct FailingStorage {
    inner: LocalImageStorage,
    fail_on: usize,
    failure: fn() -> StorageError,
    calls: AtomicUsize,
}

impl FailingStorage {
    pub fn new(inner: LocalImageStorage, fail_on: usize, failure: fn() -> StorageError) -> Self {
        Self {
            inner,
            fail_on,
            failure,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ImageStorage for FailingStorage {
    async fn place(&self, original_name: &str, content: ByteStream<'_>) -> Result<StoredFile> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err((self.failure)());
        }
        self.inner.place(original_name, content).await
    }

    async fn remove(&self, stored_name: &str) -> Result<()> {
        self.inner.remove(stored_name).await
    }
}

/// Sorted names of the files currently in `dir`
pub fn stored_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read storage directory")
        .map(|entry| entry.expect("Failed to read directory entry").file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
