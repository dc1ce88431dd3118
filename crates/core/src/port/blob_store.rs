// Blob Store Port - uploaded document bytes

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlobError {
    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Blob I/O failed: {0}")]
    Io(String),
}

/// Content store addressed by opaque paths
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes and return a new unique path
    async fn put(&self, original_name: &str, data: &[u8]) -> Result<String, BlobError>;

    async fn get(&self, path: &str) -> Result<Vec<u8>, BlobError>;

    /// `BlobError::NotFound` if nothing is stored at `path`
    async fn delete(&self, path: &str) -> Result<(), BlobError>;
}

/// Mock implementations for testing
pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Mutex;

    /// In-memory blob store with switchable delete failures
    #[derive(Default)]
    pub struct InMemoryBlobStore {
        blobs: Mutex<HashMap<String, Vec<u8>>>,
        counter: AtomicU64,
        fail_deletes: AtomicBool,
        fail_puts: AtomicBool,
        delete_calls: AtomicU64,
    }

    impl InMemoryBlobStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_fail_deletes(&self, fail: bool) {
            self.fail_deletes.store(fail, Ordering::SeqCst);
        }

        pub fn set_fail_puts(&self, fail: bool) {
            self.fail_puts.store(fail, Ordering::SeqCst);
        }

        pub fn contains(&self, path: &str) -> bool {
            self.blobs.lock().unwrap().contains_key(path)
        }

        pub fn len(&self) -> usize {
            self.blobs.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        pub fn delete_calls(&self) -> u64 {
            self.delete_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BlobStore for InMemoryBlobStore {
        async fn put(&self, original_name: &str, data: &[u8]) -> Result<String, BlobError> {
            if self.fail_puts.load(Ordering::SeqCst) {
                return Err(BlobError::Io("put disabled".to_string()));
            }
            let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            let path = format!("mem/{}-{}", n, original_name);
            self.blobs
                .lock()
                .unwrap()
                .insert(path.clone(), data.to_vec());
            Ok(path)
        }

        async fn get(&self, path: &str) -> Result<Vec<u8>, BlobError> {
            self.blobs
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| BlobError::NotFound(path.to_string()))
        }

        async fn delete(&self, path: &str) -> Result<(), BlobError> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_deletes.load(Ordering::SeqCst) {
                return Err(BlobError::Io("delete disabled".to_string()));
            }
            match self.blobs.lock().unwrap().remove(path) {
                Some(_) => Ok(()),
                None => Err(BlobError::NotFound(path.to_string())),
            }
        }
    }
}
