use std::path::PathBuf;

use serde::Deserialize;

/// Which [`BlobStore`](crate::storage::BlobStore) implementation to build.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    S3,
    Filesystem,
    Memory,
}

/// App-level blob storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageAppConfig {
    /// Backend to use. Default: s3.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Bucket every resource folder lives in. Default: "jakartapastisehat".
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Base URL objects are served from; `{public_url}/{bucket}/{key}`.
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// Maximum size of a single object in bytes. Default: 10 MiB.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
    #[serde(default)]
    pub s3: S3Config,
    #[serde(default)]
    pub filesystem: FilesystemConfig,
}

/// Connection settings for an S3-compatible endpoint.
#[derive(Debug, Deserialize, Clone)]
pub struct S3Config {
    #[serde(default = "default_s3_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_s3_region")]
    pub region: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint`.
    /// Required for MinIO. Default: true.
    #[serde(default = "default_path_style")]
    pub path_style: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FilesystemConfig {
    /// Directory objects are written under. Default: "./data/blobs".
    #[serde(default = "default_fs_root")]
    pub root: PathBuf,
}

fn default_bucket() -> String {
    "jakartapastisehat".into()
}
fn default_public_url() -> String {
    "http://localhost:9000".into()
}
fn default_max_upload_size() -> u64 {
    10 * 1024 * 1024
}
fn default_s3_endpoint() -> String {
    "http://localhost:9000".into()
}
fn default_s3_region() -> String {
    "us-east-1".into()
}
fn default_path_style() -> bool {
    true
}
fn default_fs_root() -> PathBuf {
    PathBuf::from("./data/blobs")
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            endpoint: default_s3_endpoint(),
            region: default_s3_region(),
            access_key: String::new(),
            secret_key: String::new(),
            path_style: default_path_style(),
        }
    }
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            root: default_fs_root(),
        }
    }
}

impl Default for StorageAppConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: default_bucket(),
            public_url: default_public_url(),
            max_upload_size: default_max_upload_size(),
            s3: S3Config::default(),
            filesystem: FilesystemConfig::default(),
        }
    }
}
