//! blob storage: an opaque key -> bytes sink.
//!
//! keys use `/`-separated logical paths ("caf/{company_id}/{caf_id}.xml").
//! the local backend materializes `{base_path}/{key}`, creating parent
//! directories as needed.

use std::future::Future;
use std::path::PathBuf;

use tokio::fs;
use tracing::{debug, info};

use crate::error::ServiceError;

/// the narrow capability services need from blob storage.
pub trait BlobStore: Clone + Send + Sync + 'static {
    /// persist `data` under `key`, overwriting any previous value.
    fn upload(
        &self,
        key: &str,
        data: &[u8],
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;
}

/// filesystem-backed blob store.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    base_path: PathBuf,
}

impl LocalBlobStore {
    /// create a store rooted at `base_path`, creating the directory.
    pub async fn new(base_path: PathBuf) -> Result<Self, ServiceError> {
        fs::create_dir_all(&base_path).await.map_err(|e| {
            ServiceError::Storage(format!(
                "creating blob directory {}: {e}",
                base_path.display()
            ))
        })?;
        info!(path = %base_path.display(), "blob store initialized");
        Ok(Self { base_path })
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }
}

impl BlobStore for LocalBlobStore {
    async fn upload(&self, key: &str, data: &[u8]) -> Result<(), ServiceError> {
        let path = self.blob_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                ServiceError::Storage(format!("creating {}: {e}", parent.display()))
            })?;
        }
        fs::write(&path, data)
            .await
            .map_err(|e| ServiceError::Storage(format!("writing blob {key}: {e}")))?;
        debug!(key, size = data.len(), "stored blob");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_store() -> (LocalBlobStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path().to_path_buf()).await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn test_upload_materializes_key_path() {
        let (store, dir) = test_store().await;

        store
            .upload("caf/company-1/caf-9.xml", b"<AUTORIZACION/>")
            .await
            .unwrap();

        let written = std::fs::read(dir.path().join("caf/company-1/caf-9.xml")).unwrap();
        assert_eq!(written, b"<AUTORIZACION/>");
    }

    #[tokio::test]
    async fn test_upload_overwrites() {
        let (store, dir) = test_store().await;

        store.upload("k.bin", b"first").await.unwrap();
        store.upload("k.bin", b"second").await.unwrap();

        let written = std::fs::read(dir.path().join("k.bin")).unwrap();
        assert_eq!(written, b"second");
    }
}
