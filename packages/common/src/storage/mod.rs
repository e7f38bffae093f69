mod error;
mod key;
mod traits;

pub mod filesystem;
pub mod memory;
#[cfg(feature = "object-storage")]
pub mod s3_store;

use std::sync::Arc;

pub use error::StorageError;
pub use key::ObjectKey;
pub use traits::BlobStore;

use crate::config::{StorageAppConfig, StorageBackend};

/// Build the blob store selected by `config.backend`.
pub async fn connect(config: &StorageAppConfig) -> Result<Arc<dyn BlobStore>, StorageError> {
    let store: Arc<dyn BlobStore> = match config.backend {
        #[cfg(feature = "object-storage")]
        StorageBackend::S3 => Arc::new(s3_store::S3BlobStore::new(
            &config.s3,
            config.public_url.clone(),
            config.max_upload_size,
        )?),
        #[cfg(not(feature = "object-storage"))]
        StorageBackend::S3 => {
            return Err(StorageError::Backend(
                "s3 backend requires the `object-storage` feature".into(),
            ));
        }
        StorageBackend::Filesystem => Arc::new(
            filesystem::FilesystemBlobStore::new(
                config.filesystem.root.clone(),
                config.public_url.clone(),
                config.max_upload_size,
            )
            .await?,
        ),
        StorageBackend::Memory => Arc::new(memory::MemoryBlobStore::new(
            config.public_url.clone(),
            config.max_upload_size,
        )),
    };
    Ok(store)
}
