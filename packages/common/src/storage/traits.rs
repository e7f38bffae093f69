use async_trait::async_trait;

use super::error::StorageError;
use super::key::ObjectKey;

/// Key-addressed object storage shared by every resource kind.
///
/// Implementations never pick keys themselves; callers derive them with
/// [`ObjectKey::timestamped`] and persist them next to the returned URL.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `key` and return the object's public URL.
    async fn upload(
        &self,
        bucket: &str,
        key: &ObjectKey,
        data: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Delete the object stored under `key`.
    ///
    /// Deleting a missing object is not an error.
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether an object exists under `key`.
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, StorageError>;

    /// Public URL an object under `key` is (or would be) served from.
    fn public_url(&self, bucket: &str, key: &str) -> String;
}

/// Join a base URL, bucket and key without doubling slashes.
pub(crate) fn join_url(base: &str, bucket: &str, key: &str) -> String {
    format!(
        "{}/{}/{}",
        base.trim_end_matches('/'),
        bucket.trim_matches('/'),
        key.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::join_url;

    #[test]
    fn join_url_normalises_slashes() {
        assert_eq!(
            join_url("https://cdn.example.org/", "/site/", "/articles/1-a.png"),
            "https://cdn.example.org/site/articles/1-a.png"
        );
        assert_eq!(
            join_url("http://localhost:9000", "site", "banners/2-b.jpg"),
            "http://localhost:9000/site/banners/2-b.jpg"
        );
    }
}
