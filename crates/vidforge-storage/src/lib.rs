//! Vidforge Storage Library
//!
//! This crate provides the storage abstraction used to publish finished
//! uploads, with implementations for S3-compatible object storage and the
//! local filesystem.
//!
//! # Storage key format
//!
//! - **Videos**: `{aspect}/{64 hex chars}.{ext}` where `aspect` is
//!   `landscape`, `portrait` or `other`. The random part is fresh per upload.
//! - **Thumbnails**: `{video_id}.{ext}`, so a new thumbnail replaces the old one.
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use factory::create_asset_storage;
pub use keys::{derive_video_key, extension_for, thumbnail_key, StorageKey};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use vidforge_core::StorageBackend;
