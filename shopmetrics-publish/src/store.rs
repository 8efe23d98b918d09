//! Blocking facade over `object_store`.
//!
//! The pipeline is synchronous end to end; this wrapper owns a
//! current-thread tokio runtime and drives each store call to completion
//! before returning, so uploads stay strictly sequential.

use std::path::Path;
use std::sync::Arc;

use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use shopmetrics_core::config::StorageConfig;
use tokio::runtime::Runtime;
use tracing::debug;

use crate::error::PublishError;

pub struct BlockingStore {
    inner: Arc<dyn ObjectStore>,
    runtime: Runtime,
    label: String,
}

impl BlockingStore {
    pub fn new(inner: Arc<dyn ObjectStore>, label: impl Into<String>) -> Result<Self, PublishError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(PublishError::Runtime)?;
        Ok(Self {
            inner,
            runtime,
            label: label.into(),
        })
    }

    /// S3 bucket from `[storage]`. Credentials come from the standard
    /// `AWS_*` environment variables.
    pub fn s3(config: &StorageConfig) -> Result<Self, PublishError> {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region);

        if let Some(endpoint) = &config.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_virtual_hosted_style_request(false)
                .with_allow_http(true);
        }

        let store = builder.build().map_err(PublishError::Store)?;
        Self::new(Arc::new(store), format!("s3://{}", config.bucket))
    }

    /// A local directory standing in for the bucket. Created if missing.
    pub fn local(dir: &Path) -> Result<Self, PublishError> {
        std::fs::create_dir_all(dir).map_err(|source| PublishError::LocalRead {
            path: dir.to_path_buf(),
            source,
        })?;
        let store = LocalFileSystem::new_with_prefix(dir).map_err(PublishError::Store)?;
        Self::new(Arc::new(store), format!("file://{}", dir.display()))
    }

    pub fn in_memory() -> Result<Self, PublishError> {
        Self::new(Arc::new(InMemory::new()), "memory://")
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self, PublishError> {
        match config.backend {
            shopmetrics_core::config::StorageBackend::S3 => Self::s3(config),
            shopmetrics_core::config::StorageBackend::Local => Self::local(&config.local_mirror),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Read a local file and put it at `key`. Returns the byte count.
    ///
    /// The key is stored verbatim; one that would need re-encoding
    /// (empty segments, `.` or `..`, control characters) is refused.
    pub fn put_file(&self, local: &Path, key: &str) -> Result<usize, PublishError> {
        let location = ObjectPath::parse(key).map_err(|source| PublishError::InvalidKey {
            key: key.to_string(),
            source,
        })?;
        let bytes = std::fs::read(local).map_err(|source| PublishError::LocalRead {
            path: local.to_path_buf(),
            source,
        })?;
        let size = bytes.len();

        self.runtime
            .block_on(self.inner.put(&location, PutPayload::from(bytes)))
            .map_err(|source| PublishError::Upload {
                key: key.to_string(),
                source,
            })?;

        debug!(store = %self.label, key, bytes = size, "uploaded object");
        Ok(size)
    }

    /// Fetch an object's bytes.
    pub fn get(&self, key: &str) -> Result<Vec<u8>, object_store::Error> {
        let location = ObjectPath::parse(key)?;
        self.runtime.block_on(async {
            let result = self.inner.get(&location).await?;
            Ok(result.bytes().await?.to_vec())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("f.bin");
        std::fs::write(&local, b"payload").unwrap();

        let store = BlockingStore::in_memory().unwrap();
        assert_eq!(store.put_file(&local, "a/b/f.bin").unwrap(), 7);
        assert_eq!(store.get("a/b/f.bin").unwrap(), b"payload");
    }

    #[test]
    fn missing_local_file_is_local_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlockingStore::in_memory().unwrap();
        let err = store.put_file(&dir.path().join("nope"), "k").unwrap_err();
        assert!(matches!(err, PublishError::LocalRead { .. }));
    }

    #[test]
    fn keys_are_stored_verbatim_or_refused() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("f.bin");
        std::fs::write(&local, b"payload").unwrap();
        let store = BlockingStore::in_memory().unwrap();

        for key in ["p/../f.bin", "p//f.bin", "p/./f.bin", "p/a\u{1}b/f.bin"] {
            let err = store.put_file(&local, key).unwrap_err();
            assert!(
                matches!(&err, PublishError::InvalidKey { key: k, .. } if k == key),
                "{key}: {err:?}"
            );
        }

        store.put_file(&local, "p/dt=2024-01-15/shop_id=a.test/f.bin").unwrap();
        let prefix = ObjectPath::from("p/dt=2024-01-15/shop_id=a.test");
        let listed: Vec<String> = store
            .runtime
            .block_on(store.inner.list_with_delimiter(Some(&prefix)))
            .unwrap()
            .objects
            .into_iter()
            .map(|m| m.location.to_string())
            .collect();
        assert_eq!(listed, vec!["p/dt=2024-01-15/shop_id=a.test/f.bin".to_string()]);
    }

    #[test]
    fn local_mirror_writes_under_dir() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.bin");
        std::fs::write(&src, b"xyz").unwrap();

        let mirror = dir.path().join("mirror");
        let store = BlockingStore::local(&mirror).unwrap();
        store.put_file(&src, "p/dt=2024-01-15/x.bin").unwrap();

        assert_eq!(
            std::fs::read(mirror.join("p/dt=2024-01-15/x.bin")).unwrap(),
            b"xyz"
        );
    }
}
