//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::keys::StorageKey;
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use vidforge_core::AppError;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err.to_string())
    }
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait.
/// Uploads are fed from a file on disk so large videos are never buffered
/// in memory.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload the file at `path` under `key` and return its public URL.
    ///
    /// An existing object under the same key is replaced.
    async fn upload_file(
        &self,
        key: &StorageKey,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Check if an object exists
    async fn exists(&self, key: &StorageKey) -> StorageResult<bool>;

    /// Public URL of an object, whether or not it exists yet
    fn public_url(&self, key: &StorageKey) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
