/// Errors that can occur during blob storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested object was not found.
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },
    /// An I/O error occurred.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The object key is empty or escapes its bucket.
    #[error("invalid object key: {0}")]
    InvalidKey(String),
    /// The object exceeds the configured size limit.
    #[error("object exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
    /// The remote object store rejected or failed the request.
    #[error("object store error: {0}")]
    Backend(String),
}

#[cfg(feature = "object-storage")]
impl From<s3::error::S3Error> for StorageError {
    fn from(err: s3::error::S3Error) -> Self {
        Self::Backend(err.to_string())
    }
}

#[cfg(feature = "object-storage")]
impl From<s3::creds::error::CredentialsError> for StorageError {
    fn from(err: s3::creds::error::CredentialsError) -> Self {
        Self::Backend(format!("invalid credentials: {err}"))
    }
}
