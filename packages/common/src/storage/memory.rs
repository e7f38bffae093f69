use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::StorageError;
use super::key::ObjectKey;
use super::traits::{BlobStore, join_url};

/// An object held by [`MemoryBlobStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Process-local blob store.
///
/// Used for local development and by tests that need to observe which
/// objects a request left behind. Individual keys can be made to fail on
/// upload with [`MemoryBlobStore::fail_uploads_containing`].
pub struct MemoryBlobStore {
    public_url: String,
    max_size: u64,
    objects: RwLock<BTreeMap<(String, String), StoredObject>>,
    failing: RwLock<HashSet<String>>,
}

impl MemoryBlobStore {
    pub fn new(public_url: impl Into<String>, max_size: u64) -> Self {
        Self {
            public_url: public_url.into(),
            max_size,
            objects: RwLock::new(BTreeMap::new()),
            failing: RwLock::new(HashSet::new()),
        }
    }

    /// Make every upload whose key contains `fragment` fail with a backend
    /// error.
    pub async fn fail_uploads_containing(&self, fragment: impl Into<String>) {
        self.failing.write().await.insert(fragment.into());
    }

    /// Keys currently stored in `bucket`, in lexical order.
    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .read()
            .await
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    pub async fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Number of stored objects across all buckets.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(
        &self,
        bucket: &str,
        key: &ObjectKey,
        data: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }
        let should_fail = self
            .failing
            .read()
            .await
            .iter()
            .any(|fragment| key.as_str().contains(fragment.as_str()));
        if should_fail {
            return Err(StorageError::Backend(format!("upload rejected: {key}")));
        }

        self.objects.write().await.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                data: data.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(self.public_url(bucket, key.as_str()))
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.objects
            .write()
            .await
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, StorageError> {
        Ok(self
            .objects
            .read()
            .await
            .contains_key(&(bucket.to_string(), key.to_string())))
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        join_url(&self.public_url, bucket, key)
    }
}
