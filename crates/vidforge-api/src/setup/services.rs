//! Service initialization and application state setup

use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use vidforge_core::Config;
use vidforge_db::{PgVideoRepository, VideoRepository};
use vidforge_processing::{FfmpegRemuxer, FfprobeProber, StagingArea};

use crate::auth::JwtAuthenticator;
use crate::services::upload::{UploadGate, UploadLimits, UploadPipeline};
use crate::state::AppState;

use super::storage::StorageSetup;

/// Initialize all services and repositories, returning the application state
pub async fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: StorageSetup,
) -> Result<Arc<AppState>> {
    let videos: Arc<dyn VideoRepository> = Arc::new(PgVideoRepository::new(pool));
    let authenticator = Arc::new(JwtAuthenticator::new(
        config.jwt_secret(),
        config.jwt_issuer(),
    ));

    let staging = StagingArea::new(config.scratch_dir().clone())
        .await
        .context("Failed to create scratch directory")?;
    let prober = FfprobeProber::new(config.ffprobe_path()).context("Invalid ffprobe path")?;
    let remuxer = FfmpegRemuxer::new(config.ffmpeg_path()).context("Invalid ffmpeg path")?;

    let limits = UploadLimits {
        max_video_bytes: config.max_video_size_bytes(),
        max_thumbnail_bytes: config.max_thumbnail_size_bytes(),
    };

    tracing::info!(
        scratch_dir = %staging.root().display(),
        max_video_bytes = limits.max_video_bytes,
        max_thumbnail_bytes = limits.max_thumbnail_bytes,
        "Upload pipeline initialized"
    );

    let gate = UploadGate::new(videos.clone(), authenticator, limits);
    let uploads = UploadPipeline {
        staging,
        prober: Arc::new(prober),
        remuxer: Arc::new(remuxer),
        video_storage: storage.videos,
        asset_storage: storage.assets,
        videos,
        limits,
    };

    Ok(AppState::new(gate, uploads))
}
