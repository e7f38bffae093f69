//! Keeps stored blobs and the records that reference them consistent.
//!
//! Create uploads first and writes second; a failed write removes what was
//! just uploaded. Update uploads, writes, and only then drops superseded
//! blobs. Delete removes owned blobs before the rows so a failure leaves the
//! record in place to retry against.

use std::future::Future;
use std::sync::Arc;

use common::storage::{BlobStore, ObjectKey, StorageError};
use futures::future::join_all;
use tracing::{error, info, warn};

use crate::extractors::multipart::UploadedFile;

/// Key prefixes, one per kind of file.
pub mod folder {
    pub const ARTICLES: &str = "articles";
    pub const EVENTS: &str = "events";
    pub const DOC_THUMBNAILS: &str = "doc_thumbnails";
    pub const DOC_IMAGES: &str = "doc_images";
    pub const VOLUNTEER_CVS: &str = "vol_cvs";
    pub const VOLUNTEER_PROOFS: &str = "vol_proofs";
    pub const CAREER_CVS: &str = "career_cvs";
    pub const BANNERS: &str = "banners";
    pub const PARTNERS: &str = "partners";
    pub const TEAMS: &str = "teams";
    pub const CONTENTS: &str = "contents";
}

/// A blob this request uploaded: key to persist and URL to serve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredBlob {
    pub key: String,
    pub url: String,
}

/// A file waiting to be uploaded into `folder`.
#[derive(Clone, Copy, Debug)]
pub struct Upload<'a> {
    pub folder: &'a str,
    pub file: &'a UploadedFile,
}

impl<'a> Upload<'a> {
    pub fn new(folder: &'a str, file: &'a UploadedFile) -> Self {
        Self { folder, file }
    }
}

#[derive(Clone)]
pub struct BlobLifecycle {
    store: Arc<dyn BlobStore>,
    bucket: String,
}

impl BlobLifecycle {
    pub fn new(store: Arc<dyn BlobStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upload_one(&self, upload: Upload<'_>) -> Result<StoredBlob, StorageError> {
        let key = ObjectKey::timestamped(upload.folder, &upload.file.file_name);
        let url = self
            .store
            .upload(
                &self.bucket,
                &key,
                &upload.file.bytes,
                &upload.file.content_type,
            )
            .await?;
        Ok(StoredBlob {
            key: key.into_string(),
            url,
        })
    }

    /// Upload every file concurrently. Either all land or none are kept:
    /// on the first failure the successful ones are discarded and that
    /// failure is returned.
    pub async fn upload_all(&self, uploads: &[Upload<'_>]) -> Result<Vec<StoredBlob>, StorageError> {
        let results = join_all(uploads.iter().map(|u| self.upload_one(*u))).await;

        let mut stored = Vec::with_capacity(results.len());
        let mut failure = None;
        for result in results {
            match result {
                Ok(blob) => stored.push(blob),
                Err(e) if failure.is_none() => failure = Some(e),
                Err(e) => warn!(error = %e, "Additional upload failure"),
            }
        }

        match failure {
            None => Ok(stored),
            Some(err) => {
                self.discard(&stored).await;
                Err(err)
            }
        }
    }

    /// Best-effort removal of blobs uploaded by a request that failed.
    /// Failures are logged and otherwise ignored.
    pub async fn discard(&self, blobs: &[StoredBlob]) {
        let results = join_all(
            blobs
                .iter()
                .map(|b| self.store.delete(&self.bucket, &b.key)),
        )
        .await;
        for (blob, result) in blobs.iter().zip(results) {
            match result {
                Ok(()) => info!(bucket = %self.bucket, key = %blob.key, "Discarded blob"),
                Err(e) => error!(
                    bucket = %self.bucket,
                    key = %blob.key,
                    error = %e,
                    "Compensating delete failed, blob orphaned"
                ),
            }
        }
    }

    /// Upload `uploads`, then run `write` with the stored blobs in upload
    /// order. If `write` fails the blobs are discarded and its error is
    /// returned unchanged.
    pub async fn create<T, E, F, Fut>(&self, uploads: &[Upload<'_>], write: F) -> Result<T, E>
    where
        E: From<StorageError>,
        F: FnOnce(Vec<StoredBlob>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let stored = self.upload_all(uploads).await?;
        let uploaded = stored.clone();
        match write(stored).await {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(count = uploaded.len(), "Record write failed, discarding uploads");
                self.discard(&uploaded).await;
                Err(err)
            }
        }
    }

    /// [`create`](Self::create) for a record owning exactly one blob.
    pub async fn create_one<T, E, F, Fut>(&self, upload: Upload<'_>, write: F) -> Result<T, E>
    where
        E: From<StorageError>,
        F: FnOnce(StoredBlob) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.create(&[upload], |blobs| async move {
            let blob = blobs
                .into_iter()
                .next()
                .ok_or_else(|| StorageError::Backend("upload produced no blob".into()))?;
            write(blob).await
        })
        .await
    }

    /// Like [`create`](Self::create), then removes `superseded` keys once
    /// the write has committed. A failed write leaves the old blobs alone.
    pub async fn replace<T, E, F, Fut>(
        &self,
        uploads: &[Upload<'_>],
        superseded: &[String],
        write: F,
    ) -> Result<T, E>
    where
        E: From<StorageError>,
        F: FnOnce(Vec<StoredBlob>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let value = self.create(uploads, write).await?;
        self.remove_stale(superseded).await;
        Ok(value)
    }

    /// [`replace`](Self::replace) for a record owning one blob. Without a
    /// new file only the row is written and `current_key` is kept.
    pub async fn replace_one<T, E, F, Fut>(
        &self,
        upload: Option<Upload<'_>>,
        current_key: &str,
        write: F,
    ) -> Result<T, E>
    where
        E: From<StorageError>,
        F: FnOnce(Option<StoredBlob>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let superseded = match upload {
            Some(_) => vec![current_key.to_string()],
            None => Vec::new(),
        };
        let uploads: Vec<Upload<'_>> = upload.into_iter().collect();
        self.replace(&uploads, &superseded, |blobs| write(blobs.into_iter().next()))
            .await
    }

    /// Remove blobs no committed record points at any more. Failures only
    /// orphan the blob, so they are logged rather than returned.
    pub async fn remove_stale(&self, keys: &[String]) {
        let results = join_all(keys.iter().map(|k| self.remove_if_present(k))).await;
        for (key, result) in keys.iter().zip(results) {
            if let Err(e) = result {
                error!(bucket = %self.bucket, key = %key, error = %e, "Failed to remove superseded blob");
            }
        }
    }

    /// Remove every blob owned by a record about to be deleted. Blobs that
    /// are already gone are skipped, so retrying a half-finished delete works.
    pub async fn remove_owned(&self, keys: &[String]) -> Result<(), StorageError> {
        join_all(keys.iter().map(|k| self.remove_if_present(k)))
            .await
            .into_iter()
            .collect()
    }

    /// Remove `owned` blobs, then run `delete_rows`. A storage failure
    /// aborts before any row is touched.
    pub async fn delete<T, E, F, Fut>(&self, owned: &[String], delete_rows: F) -> Result<T, E>
    where
        E: From<StorageError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.remove_owned(owned).await?;
        delete_rows().await
    }

    /// `delete` for a parent with file-carrying children. `delete_rows`
    /// also returns the blob keys of the child rows it actually removed;
    /// keys missing from `owned` belong to children written after `owned`
    /// was read and are removed once the rows are gone.
    pub async fn delete_cascade<T, E, F, Fut>(
        &self,
        owned: &[String],
        delete_rows: F,
    ) -> Result<T, E>
    where
        E: From<StorageError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(T, Vec<String>), E>>,
    {
        self.remove_owned(owned).await?;
        let (value, removed) = delete_rows().await?;

        let late: Vec<String> = removed
            .into_iter()
            .filter(|key| !owned.contains(key))
            .collect();
        if !late.is_empty() {
            warn!(count = late.len(), "Children were added during delete, removing their blobs");
            self.remove_stale(&late).await;
        }
        Ok(value)
    }

    async fn remove_if_present(&self, key: &str) -> Result<(), StorageError> {
        if self.store.exists(&self.bucket, key).await? {
            self.store.delete(&self.bucket, key).await?;
        }
        Ok(())
    }
}
