use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::error::StorageError;
use super::key::ObjectKey;
use super::traits::{BlobStore, join_url};

/// Filesystem-backed keyed blob store.
///
/// Objects live at `{base_path}/{bucket}/{key}`, so a key such as
/// `articles/1700000000000-cover.png` keeps its folder on disk. Writes go
/// through `{base_path}/.tmp` and are renamed into place.
pub struct FilesystemBlobStore {
    base_path: PathBuf,
    public_url: String,
    max_size: u64,
}

impl FilesystemBlobStore {
    /// Create a new filesystem blob store.
    pub async fn new(
        base_path: PathBuf,
        public_url: impl Into<String>,
        max_size: u64,
    ) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            public_url: public_url.into(),
            max_size,
        })
    }

    /// Filesystem path for an object, rejecting keys that escape the bucket.
    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StorageError> {
        let key = ObjectKey::parse(key)?;
        if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket.starts_with('.') {
            return Err(StorageError::InvalidKey(format!("{bucket}/{key}")));
        }
        Ok(self.base_path.join(bucket).join(Path::new(key.as_str())))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn upload(
        &self,
        bucket: &str,
        key: &ObjectKey,
        data: &[u8],
        _content_type: &str,
    ) -> Result<String, StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let object_path = self.object_path(bucket, key.as_str())?;

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = object_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &object_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(self.public_url(bucket, key.as_str()))
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        let object_path = self.object_path(bucket, key)?;
        match fs::remove_file(&object_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, StorageError> {
        let object_path = self.object_path(bucket, key)?;
        Ok(fs::try_exists(&object_path).await?)
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        join_url(&self.public_url, bucket, key)
    }
}
