use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};
use tracing::debug;

use super::error::StorageError;
use super::key::ObjectKey;
use super::traits::{BlobStore, join_url};
use crate::config::S3Config;

/// S3-compatible object store (AWS, MinIO, Cloudflare R2).
pub struct S3BlobStore {
    region: Region,
    credentials: Credentials,
    path_style: bool,
    public_url: String,
    max_size: u64,
}

impl S3BlobStore {
    pub fn new(
        config: &S3Config,
        public_url: impl Into<String>,
        max_size: u64,
    ) -> Result<Self, StorageError> {
        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )?;
        Ok(Self {
            region,
            credentials,
            path_style: config.path_style,
            public_url: public_url.into(),
            max_size,
        })
    }

    fn bucket(&self, name: &str) -> Result<Box<Bucket>, StorageError> {
        let bucket = Bucket::new(name, self.region.clone(), self.credentials.clone())?;
        Ok(if self.path_style {
            bucket.with_path_style()
        } else {
            bucket
        })
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[async_trait]
impl BlobStore for S3BlobStore {
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

        let response = self
            .bucket(bucket)?
            .put_object_with_content_type(key.as_str(), data, content_type)
            .await?;
        let status = response.status_code();
        if !is_success(status) {
            return Err(StorageError::Backend(format!(
                "put {bucket}/{key} returned {status}"
            )));
        }
        debug!(bucket, key = %key, size = data.len(), "Object uploaded");
        Ok(self.public_url(bucket, key.as_str()))
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        let response = self.bucket(bucket)?.delete_object(key).await?;
        let status = response.status_code();
        if is_success(status) || status == 404 {
            Ok(())
        } else {
            Err(StorageError::Backend(format!(
                "delete {bucket}/{key} returned {status}"
            )))
        }
    }

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, StorageError> {
        match self.bucket(bucket)?.head_object(key).await {
            Ok((_, status)) if is_success(status) => Ok(true),
            Ok((_, 404)) => Ok(false),
            Ok((_, status)) => Err(StorageError::Backend(format!(
                "head {bucket}/{key} returned {status}"
            ))),
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        join_url(&self.public_url, bucket, key)
    }
}
