//! Storage setup and initialization

use anyhow::{Context, Result};
use std::sync::Arc;
use vidforge_core::Config;
use vidforge_storage::{create_asset_storage, create_storage, Storage};

/// Where published files go.
pub struct StorageSetup {
    /// Backend for videos (S3 or local, per STORAGE_BACKEND)
    pub videos: Arc<dyn Storage>,
    /// Local asset directory for thumbnails
    pub assets: Arc<dyn Storage>,
}

pub async fn setup_storage(config: &Config) -> Result<StorageSetup> {
    tracing::info!("Initializing storage...");
    let videos = create_storage(config)
        .await
        .context("Failed to initialize video storage")?;
    let assets = create_asset_storage(config)
        .await
        .context("Failed to initialize asset storage")?;

    tracing::info!(
        backend = %videos.backend_type(),
        assets_root = %config.assets_root().display(),
        "Storage initialized successfully"
    );

    Ok(StorageSetup {
        videos,
        assets: Arc::new(assets),
    })
}
