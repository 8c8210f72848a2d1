use crate::keys::StorageKey;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "./assets")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:8091/assets")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert storage key to filesystem path with security validation
    fn key_to_path(&self, key: &StorageKey) -> StorageResult<PathBuf> {
        let key = key.as_str();
        if key.contains("..") || key.starts_with('/') || key.contains('\\') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(key))
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_file(
        &self,
        key: &StorageKey,
        path: &Path,
        _content_type: &str,
    ) -> StorageResult<String> {
        let target = self.key_to_path(key)?;
        self.ensure_parent_dir(&target).await?;

        let start = std::time::Instant::now();

        // Copy to a uniquely named sibling and rename so readers never see a
        // partial file and concurrent writers never share one.
        let parent = target.parent().unwrap_or(&self.base_path);
        let partial = tempfile::Builder::new()
            .prefix(".partial-")
            .tempfile_in(parent)
            .map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to create partial file in {}: {}",
                    parent.display(),
                    e
                ))
            })?
            .into_temp_path();

        let size = fs::copy(path, &partial).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to copy {} to {}: {}",
                path.display(),
                partial.display(),
                e
            ))
        })?;

        partial.persist(&target).map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to move file into {}: {}",
                target.display(),
                e.error
            ))
        })?;

        let url = self.public_url(key);

        tracing::info!(
            path = %target.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(url)
    }

    async fn exists(&self, key: &StorageKey) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn public_url(&self, key: &StorageKey) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
