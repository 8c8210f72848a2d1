//! Scratch-file lifetime for a single upload run.
//!
//! Every [`StagedFile`] deletes its backing file when dropped, so early
//! returns, panics and cancelled futures never leave scratch files behind.
//! [`StagingScope`] groups the files of one run and releases them together
//! once the run is over, successful or not.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::fmt::Display;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

use crate::error::ProcessingError;

/// Where a staged file came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagedOrigin {
    /// Bytes received from the client
    Raw,
    /// Output of the fast-start remux
    Remuxed,
}

impl StagedOrigin {
    fn prefix(&self) -> &'static str {
        match self {
            StagedOrigin::Raw => "raw-",
            StagedOrigin::Remuxed => "remux-",
        }
    }
}

/// A scratch file owned by exactly one pipeline run.
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
    origin: StagedOrigin,
    size_bytes: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> StagedOrigin {
        self.origin
    }

    /// Bytes written while staging; zero for reserved files.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Delete the backing file.
    ///
    /// A file that is already gone is fine. Any other failure is logged and
    /// swallowed.
    pub async fn release(self) {
        let origin = self.origin;
        let path = match self.path.keep() {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(error = %e.error, "Failed to detach staged file for release");
                return;
            }
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), origin = ?origin, "Released staged file");
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %path.display(),
                    origin = ?origin,
                    "Failed to delete staged file"
                );
            }
        }
    }
}

/// Root directory for scratch files.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    /// Create the scratch directory if missing.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, ProcessingError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stream an upload into a fresh scratch file.
    ///
    /// Writing stops at the first chunk that pushes the total past `limit`.
    /// On any error the partial file is deleted before returning.
    pub async fn stage<S, E>(
        &self,
        stream: S,
        limit: u64,
        suffix: &str,
    ) -> Result<StagedFile, ProcessingError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Display,
    {
        let mut stream = std::pin::pin!(stream);
        let (file, path) = self.create(StagedOrigin::Raw, suffix)?.into_parts();
        let mut file = tokio::fs::File::from_std(file);
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ProcessingError::Stream(e.to_string()))?;
            written += chunk.len() as u64;
            if written > limit {
                tracing::debug!(
                    limit = limit,
                    received_bytes = written,
                    "Upload crossed size ceiling while staging"
                );
                return Err(ProcessingError::TooLarge { limit });
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        file.sync_all().await?;

        tracing::debug!(
            path = %path.display(),
            size_bytes = written,
            "Staged upload"
        );

        Ok(StagedFile {
            path,
            origin: StagedOrigin::Raw,
            size_bytes: written,
        })
    }

    /// Create an empty, uniquely named scratch file for a tool to write into.
    pub fn reserve(&self, origin: StagedOrigin, suffix: &str) -> Result<StagedFile, ProcessingError> {
        let path = self.create(origin, suffix)?.into_temp_path();
        Ok(StagedFile {
            path,
            origin,
            size_bytes: 0,
        })
    }

    // tempfile opens with O_EXCL, so a name is never reused.
    fn create(
        &self,
        origin: StagedOrigin,
        suffix: &str,
    ) -> Result<tempfile::NamedTempFile, ProcessingError> {
        Ok(tempfile::Builder::new()
            .prefix(origin.prefix())
            .suffix(suffix)
            .tempfile_in(&self.root)?)
    }
}

/// Index of a file tracked by a [`StagingScope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagedHandle(usize);

/// Every scratch file created by one run.
#[derive(Debug, Default)]
pub struct StagingScope {
    files: Vec<StagedFile>,
}

impl StagingScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, file: StagedFile) -> StagedHandle {
        self.files.push(file);
        StagedHandle(self.files.len() - 1)
    }

    pub fn get(&self, handle: StagedHandle) -> &StagedFile {
        &self.files[handle.0]
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Delete every tracked file.
    pub async fn release_all(self) {
        for file in self.files {
            file.release().await;
        }
    }
}
