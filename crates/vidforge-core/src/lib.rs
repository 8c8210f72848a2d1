//! Vidforge Core Library
//!
//! This crate provides the domain models, error types and configuration
//! shared by every Vidforge component.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, VidforgeConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{AspectClass, AssetClass, VideoRecord};
pub use storage_types::StorageBackend;
