//! Object store client and its upload collaborator implementations.
//!
//! [`ObjectStoreClient`] is a thin, cloneable wrapper around
//! `Arc<dyn ObjectStore>` with string keys. It implements
//! [`TransferProvider`](listing_core::service::TransferProvider) and
//! [`ContentProvider`](listing_core::service::ContentProvider), so any
//! backend can serve as an upload destination or as the source of file
//! content.

use std::sync::Arc;

use bytes::Bytes;
use futures::TryStreamExt;
use object_store::path::Path;
use object_store::{Attribute, ObjectMeta, ObjectStore, PutOptions, PutPayload};

use crate::{Error, Result};

mod upload;

/// Bytes and attributes of one stored object.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    /// MIME content type, if the backend keeps one.
    pub content_type: Option<String>,
    pub size: u64,
    pub e_tag: Option<String>,
}

/// Cloneable handle to any [`ObjectStore`] backend (S3, Azure, in-memory, ...).
///
/// All methods accept string keys and convert them to
/// [`object_store::path::Path`] internally.
#[derive(Clone, Debug)]
pub struct ObjectStoreClient(pub Arc<dyn ObjectStore>);

impl ObjectStoreClient {
    /// Wrap a concrete [`ObjectStore`] implementation.
    pub fn new(store: impl ObjectStore) -> Self {
        Self(Arc::new(store))
    }

    /// Upload `data` to `key`, overwriting any existing object.
    #[tracing::instrument(name = "object.put", skip(self, data), fields(size = data.len()))]
    pub async fn put(&self, key: &str, data: Bytes, content_type: Option<&str>) -> Result<()> {
        let path = Path::from(key);
        let mut opts = PutOptions::default();
        if let Some(content_type) = content_type {
            opts.attributes
                .insert(Attribute::ContentType, content_type.to_owned().into());
        }

        self.0
            .put_opts(&path, PutPayload::from(data), opts)
            .await
            .map_err(|e| Error::store("put", e))?;
        Ok(())
    }

    /// Retrieve the bytes and content type stored at `key`.
    #[tracing::instrument(name = "object.get", skip(self))]
    pub async fn get(&self, key: &str) -> Result<StoredObject> {
        let path = Path::from(key);
        let result = self
            .0
            .get(&path)
            .await
            .map_err(|e| Error::store("get", e))?;
        let size = result.meta.size;
        let e_tag = result.meta.e_tag.clone();
        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| value.to_string());
        let data = result.bytes().await.map_err(|e| Error::store("get", e))?;

        Ok(StoredObject {
            data,
            content_type,
            size,
            e_tag,
        })
    }

    /// Get object metadata without downloading the body.
    #[tracing::instrument(name = "object.head", skip(self))]
    pub async fn head(&self, key: &str) -> Result<ObjectMeta> {
        self.0
            .head(&Path::from(key))
            .await
            .map_err(|e| Error::store("head", e))
    }

    /// List object metadata under `prefix`.
    #[tracing::instrument(name = "object.list", skip(self))]
    pub async fn list(&self, prefix: &str) -> Result<Vec<ObjectMeta>> {
        let prefix = (!prefix.is_empty()).then(|| Path::from(prefix));
        self.0
            .list(prefix.as_ref())
            .try_collect()
            .await
            .map_err(|e| Error::store("list", e))
    }
}
