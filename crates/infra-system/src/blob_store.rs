// Filesystem BlobStore
// Blobs live flat under one upload directory as `<unix_nanos>-<sanitized name>`.

use async_trait::async_trait;
use qprint_core::port::{BlobError, BlobStore};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Attempts before giving up on a name collision
const MAX_NAME_ATTEMPTS: u32 = 3;

/// Keep ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

fn io_error(path: &Path, err: std::io::Error) -> BlobError {
    match err.kind() {
        ErrorKind::NotFound => BlobError::NotFound(path.display().to_string()),
        _ => BlobError::Io(format!("{}: {}", path.display(), err)),
    }
}

pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the upload directory if it does not exist
    pub async fn ensure_root(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    /// Resolve a stored key. Keys are single path components produced by `put`.
    fn resolve(&self, key: &str) -> Result<PathBuf, BlobError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && !key.contains(['/', '\\'])
            && Path::new(key).components().count() == 1;
        if !valid {
            return Err(BlobError::NotFound(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, original_name: &str, data: &[u8]) -> Result<String, BlobError> {
        let base = sanitize(original_name);

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let nanos = chrono::Utc::now()
                .timestamp_nanos_opt()
                .unwrap_or_default();
            let key = if attempt == 0 {
                format!("{}-{}", nanos, base)
            } else {
                format!("{}-{}-{}", nanos, attempt, base)
            };
            let path = self.root.join(&key);

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(io_error(&path, e)),
            };

            file.write_all(data).await.map_err(|e| io_error(&path, e))?;
            file.sync_all().await.map_err(|e| io_error(&path, e))?;

            debug!(blob = %key, bytes = data.len(), "Blob stored");
            return Ok(key);
        }

        Err(BlobError::Io(format!(
            "could not allocate a unique name for {}",
            base
        )))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        let path = self.resolve(key)?;
        fs::read(&path).await.map_err(|e| io_error(&path, e))
    }

    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        let path = self.resolve(key)?;
        fs::remove_file(&path)
            .await
            .map_err(|e| io_error(&path, e))?;
        debug!(blob = %key, "Blob deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("report.pdf"), "report.pdf");
        assert_eq!(sanitize("my report (1).pdf"), "my_report__1_.pdf");
        assert_eq!(sanitize("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize("..."), "upload");
        assert_eq!(sanitize("résumé.pdf"), "r_sum_.pdf");
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        let key = store.put("doc.pdf", b"hello").await.unwrap();
        assert!(key.ends_with("-doc.pdf"));
        assert_eq!(store.get(&key).await.unwrap(), b"hello");

        store.delete(&key).await.unwrap();
        assert!(matches!(
            store.delete(&key).await,
            Err(BlobError::NotFound(_))
        ));
        assert!(matches!(store.get(&key).await, Err(BlobError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_same_name_twice_gets_distinct_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        let a = store.put("same.pdf", b"a").await.unwrap();
        let b = store.put("same.pdf", b"b").await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.get(&a).await.unwrap(), b"a");
        assert_eq!(store.get(&b).await.unwrap(), b"b");
    }

    #[tokio::test]
    async fn test_rejects_keys_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().join("uploads"));

        for key in ["../secret", "/etc/passwd", "", ".hidden", "a/b"] {
            assert!(
                matches!(store.get(key).await, Err(BlobError::NotFound(_))),
                "key {:?}",
                key
            );
        }
    }

    #[tokio::test]
    async fn test_ensure_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().join("nested/uploads"));
        store.ensure_root().await.unwrap();
        assert!(store.root().is_dir());
        store.put("x.pdf", b"x").await.unwrap();
    }
}
