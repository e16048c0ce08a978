use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use futures::stream::BoxStream;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{Attributes, ObjectMeta, ObjectStore};

use crate::config::{Config, StoreBackend};

/// A stored object as returned by a successful lookup: the raw byte stream
/// plus the metadata and HTTP attributes recorded when it was written.
///
/// The stream yields the object body chunk by chunk so large objects are
/// never fully materialized in memory.
pub struct StoredObject {
    pub stream: BoxStream<'static, object_store::Result<Bytes>>,
    pub meta: ObjectMeta,
    pub attributes: Attributes,
}

/// Shareable object store handle for use across async handlers
#[derive(Clone, Debug)]
pub struct StoreClient {
    inner: Arc<dyn ObjectStore>,
}

impl StoreClient {
    /// Wrap an already-constructed store.
    ///
    /// This is the injection seam: production code goes through
    /// [`StoreClient::from_config`], tests hand in an
    /// [`object_store::memory::InMemory`] they also keep a handle to.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { inner: store }
    }

    /// Build the store backend named by the configuration.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be constructed, for example a
    /// missing data directory for the `file` backend or incomplete S3
    /// settings in the environment.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store: Arc<dyn ObjectStore> = match config.store_backend {
            StoreBackend::Memory => Arc::new(InMemory::new()),
            StoreBackend::File => {
                let dir = config
                    .store_data_dir
                    .as_ref()
                    .context("file backend selected but no data dir configured")?;
                Arc::new(
                    LocalFileSystem::new_with_prefix(dir).with_context(|| {
                        format!("Failed to open object store data dir: {}", dir.display())
                    })?,
                )
            }
            StoreBackend::S3 => {
                let bucket = config
                    .store_bucket
                    .as_deref()
                    .context("s3 backend selected but no bucket configured")?;
                Arc::new(
                    AmazonS3Builder::from_env()
                        .with_bucket_name(bucket)
                        .build()
                        .context("Failed to configure S3 object store")?,
                )
            }
        };

        tracing::info!(
            "Object store initialized: {}",
            config.store_backend.as_str()
        );

        Ok(Self::new(store))
    }

    /// Look up the object stored under `key`.
    ///
    /// The key is used verbatim: nothing is decoded, normalized or rewritten
    /// here. A key the store's path grammar cannot represent as given (extra
    /// separators, relative segments, characters the grammar re-encodes)
    /// names no stored object, so the lookup reports it absent.
    ///
    /// # Returns
    /// * `Ok(Some(object))` - Object found; body stream plus recorded metadata
    /// * `Ok(None)` - No object stored under this key
    /// * `Err(_)` - Storage backend failure
    ///
    /// # Errors
    /// Returns an error if the backend lookup fails for any reason other than
    /// the key being absent
    pub async fn get(&self, key: &str) -> Result<Option<StoredObject>> {
        let path = match Path::parse(key) {
            Ok(path) if path.as_ref() == key => path,
            _ => {
                tracing::debug!("Key is outside the store's canonical keyspace: {}", key);
                return Ok(None);
            }
        };

        match self.inner.get(&path).await {
            Ok(result) => {
                tracing::debug!("Found object for key: {}", key);
                let meta = result.meta.clone();
                let attributes = result.attributes.clone();
                Ok(Some(StoredObject {
                    stream: result.into_stream(),
                    meta,
                    attributes,
                }))
            }
            Err(object_store::Error::NotFound { .. }) => {
                tracing::debug!("No object for key: {}", key);
                Ok(None)
            }
            Err(err) => Err(err).context("Failed to read from object store"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::TryStreamExt;
    use object_store::{Attribute, PutOptions, PutPayload};
    use std::path::PathBuf;

    fn memory_client() -> (StoreClient, Arc<InMemory>) {
        let store = Arc::new(InMemory::new());
        let client = StoreClient::new(Arc::clone(&store) as Arc<dyn ObjectStore>);
        (client, store)
    }

    async fn put_with_content_type(
        store: &InMemory,
        key: &str,
        bytes: &'static [u8],
        content_type: &'static str,
    ) {
        let attributes = Attributes::from_iter([(Attribute::ContentType, content_type)]);
        store
            .put_opts(
                &Path::parse(key).unwrap(),
                PutPayload::from(Bytes::from_static(bytes)),
                PutOptions {
                    attributes,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    async fn collect_body(object: StoredObject) -> Vec<u8> {
        object
            .stream
            .try_collect::<Vec<Bytes>>()
            .await
            .unwrap()
            .concat()
    }

    #[tokio::test]
    async fn test_get_returns_stored_bytes_and_metadata() {
        let (client, store) = memory_client();
        put_with_content_type(&store, "images/logo.png", b"png-bytes", "image/png").await;

        let object = client.get("images/logo.png").await.unwrap().unwrap();

        assert_eq!(object.meta.size, 9);
        assert!(object.meta.e_tag.is_some());
        assert_eq!(
            object.attributes.get(&Attribute::ContentType).map(|v| &**v),
            Some("image/png")
        );
        assert_eq!(collect_body(object).await, b"png-bytes");
    }

    #[tokio::test]
    async fn test_get_missing_key_is_none() {
        let (client, _store) = memory_client();

        let result = client.get("missing.txt").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_get_key_outside_canonical_keyspace_is_none() {
        let (client, store) = memory_client();
        put_with_content_type(&store, "images/logo.png", b"png-bytes", "image/png").await;

        // None of these may resolve to the stored object: the key is taken
        // verbatim, not collapsed into its canonical form.
        for key in [
            "/images/logo.png",
            "images/logo.png/",
            "images//logo.png",
            "images/../logo.png",
            "",
        ] {
            let result = client.get(key).await.unwrap();
            assert!(result.is_none(), "key {:?} must not resolve", key);
        }
    }

    #[tokio::test]
    async fn test_etag_tracks_rewrites() {
        let (client, store) = memory_client();

        put_with_content_type(&store, "notes.txt", b"first", "text/plain").await;
        let first = client.get("notes.txt").await.unwrap().unwrap().meta.e_tag;

        put_with_content_type(&store, "notes.txt", b"second", "text/plain").await;
        let second = client.get("notes.txt").await.unwrap().unwrap().meta.e_tag;

        assert!(first.is_some());
        assert!(second.is_some());
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_from_config_memory_backend() {
        let config = Config {
            store_backend: StoreBackend::Memory,
            store_data_dir: None,
            store_bucket: None,
            service_port: 3000,
            service_host: "0.0.0.0".to_string(),
        };

        let client = StoreClient::from_config(&config).unwrap();

        // Fresh store, nothing in it.
        assert!(client.get("anything").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_from_config_file_backend_missing_dir() {
        let config = Config {
            store_backend: StoreBackend::File,
            store_data_dir: Some(PathBuf::from("/definitely/not/a/real/dir")),
            store_bucket: None,
            service_port: 3000,
            service_host: "0.0.0.0".to_string(),
        };

        let result = StoreClient::from_config(&config);
        assert!(result.is_err());
        let error = result.unwrap_err();
        assert!(error.to_string().contains("Failed to open object store data dir"));
    }

    #[test]
    fn test_client_is_clonable() {
        // Required for sharing across axum handlers.
        fn assert_clone<T: Clone>() {}
        assert_clone::<StoreClient>();
    }

    #[test]
    fn test_client_is_send_sync() {
        // Required for use in async handlers.
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StoreClient>();
    }
}
