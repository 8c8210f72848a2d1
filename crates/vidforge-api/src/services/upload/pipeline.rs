//! Upload pipeline: stage → classify → remux → key → publish → commit
//!
//! Staging reads the request body and so runs on the request task. Everything
//! after it runs on a spawned task that owns the run's [`StagingScope`]; a
//! client that disconnects mid-run no longer cancels the publish or the
//! commit, and the scope is always released once the run ends.

use std::fmt::Display;
use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;
use uuid::Uuid;
use vidforge_core::{AppError, AssetClass, ErrorMetadata, LogLevel, VideoRecord};
use vidforge_db::VideoRepository;
use vidforge_processing::{Remuxer, StagedHandle, StagingArea, StagingScope, VideoProber};
use vidforge_storage::{derive_video_key, extension_for, thumbnail_key, Storage};

use super::types::{UploadLimits, UploadStage};

#[derive(Clone)]
pub struct UploadPipeline {
    pub staging: StagingArea,
    pub prober: Arc<dyn VideoProber>,
    pub remuxer: Arc<dyn Remuxer>,
    /// Destination for published videos
    pub video_storage: Arc<dyn Storage>,
    /// Destination for thumbnails, served under `/assets`
    pub asset_storage: Arc<dyn Storage>,
    pub videos: Arc<dyn VideoRepository>,
    pub limits: UploadLimits,
}

/// Log a failed run once, tagged with the last stage it completed, at the
/// error's own level. Handlers wrap the result in `HttpAppError::logged`.
fn failed(stage: UploadStage, video_id: Uuid, err: AppError) -> AppError {
    match err.log_level() {
        LogLevel::Debug => {
            tracing::debug!(video_id = %video_id, stage = %stage, error = %err, "Upload run failed")
        }
        LogLevel::Warn => {
            tracing::warn!(video_id = %video_id, stage = %stage, error = %err, "Upload run failed")
        }
        LogLevel::Error => {
            tracing::error!(video_id = %video_id, stage = %stage, error = %err, "Upload run failed")
        }
    }
    err
}

impl UploadPipeline {
    /// Publish a video file and record its URL on `record`.
    ///
    /// `content_type` must already be validated and normalized.
    pub async fn publish_video<S, E>(
        &self,
        record: VideoRecord,
        stream: S,
        content_type: String,
    ) -> Result<VideoRecord, AppError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Display,
    {
        let video_id = record.id;
        let start = std::time::Instant::now();

        let mut scope = StagingScope::new();
        let raw = self
            .staging
            .stage(
                stream,
                self.limits.for_asset(AssetClass::Video),
                &extension_for(&content_type),
            )
            .await
            .map_err(|e| failed(UploadStage::Validated, video_id, e.into()))?;
        let size_bytes = raw.size_bytes();
        let raw = scope.track(raw);

        let pipeline = self.clone();
        let run = tokio::spawn(async move {
            let result = pipeline
                .process_video(record, &mut scope, raw, &content_type)
                .await;
            scope.release_all().await;
            result
        });

        let updated = run
            .await
            .map_err(|e| {
                failed(
                    UploadStage::Staged,
                    video_id,
                    AppError::Internal(format!("Upload task failed: {}", e)),
                )
            })??;

        tracing::info!(
            video_id = %video_id,
            size_bytes = size_bytes,
            duration_ms = start.elapsed().as_millis() as u64,
            video_url = updated.video_url.as_deref().unwrap_or_default(),
            "Video upload completed"
        );

        Ok(updated)
    }

    async fn process_video(
        &self,
        mut record: VideoRecord,
        scope: &mut StagingScope,
        raw: StagedHandle,
        content_type: &str,
    ) -> Result<VideoRecord, AppError> {
        let video_id = record.id;

        let aspect = self
            .prober
            .classify(scope.get(raw))
            .await
            .map_err(|e| failed(UploadStage::Staged, video_id, e.into()))?;

        let remuxed = self
            .remuxer
            .fast_start(scope.get(raw), &self.staging)
            .await
            .map_err(|e| failed(UploadStage::Classified, video_id, e.into()))?;
        let remuxed = scope.track(remuxed);

        let key = derive_video_key(aspect, content_type);
        tracing::debug!(video_id = %video_id, key = %key, aspect = %aspect, "Derived video key");

        let url = self
            .video_storage
            .upload_file(&key, scope.get(remuxed).path(), content_type)
            .await
            .map_err(|e| failed(UploadStage::Keyed, video_id, e.into()))?;

        record.video_url = Some(url);
        self.commit(record, &key.to_string()).await
    }

    /// Publish a thumbnail and record its URL on `record`.
    ///
    /// The key is derived from the video id, so a new thumbnail replaces the
    /// old object in place.
    pub async fn publish_thumbnail<S, E>(
        &self,
        record: VideoRecord,
        stream: S,
        content_type: String,
    ) -> Result<VideoRecord, AppError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Display,
    {
        let video_id = record.id;

        let mut scope = StagingScope::new();
        let staged = self
            .staging
            .stage(
                stream,
                self.limits.for_asset(AssetClass::Thumbnail),
                &extension_for(&content_type),
            )
            .await
            .map_err(|e| failed(UploadStage::Validated, video_id, e.into()))?;
        let staged = scope.track(staged);

        let pipeline = self.clone();
        let run = tokio::spawn(async move {
            let result = pipeline
                .process_thumbnail(record, &scope, staged, &content_type)
                .await;
            scope.release_all().await;
            result
        });

        let updated = run
            .await
            .map_err(|e| {
                failed(
                    UploadStage::Staged,
                    video_id,
                    AppError::Internal(format!("Upload task failed: {}", e)),
                )
            })??;

        tracing::info!(
            video_id = %video_id,
            thumbnail_url = updated.thumbnail_url.as_deref().unwrap_or_default(),
            "Thumbnail upload completed"
        );

        Ok(updated)
    }

    async fn process_thumbnail(
        &self,
        mut record: VideoRecord,
        scope: &StagingScope,
        staged: StagedHandle,
        content_type: &str,
    ) -> Result<VideoRecord, AppError> {
        let key = thumbnail_key(record.id, content_type);

        let url = self
            .asset_storage
            .upload_file(&key, scope.get(staged).path(), content_type)
            .await
            .map_err(|e| failed(UploadStage::Keyed, record.id, e.into()))?;

        record.thumbnail_url = Some(url);
        self.commit(record, &key.to_string()).await
    }

    /// Write the updated record. The published object is not removed when
    /// this fails.
    async fn commit(&self, record: VideoRecord, key: &str) -> Result<VideoRecord, AppError> {
        let video_id = record.id;
        match self.videos.update_video(&record).await {
            Ok(updated) => {
                tracing::debug!(video_id = %video_id, stage = %UploadStage::Committed, "Record updated");
                Ok(updated)
            }
            Err(e) => {
                tracing::warn!(
                    video_id = %video_id,
                    key = key,
                    "Published object is orphaned: record update failed"
                );
                Err(failed(
                    UploadStage::Published,
                    video_id,
                    AppError::Persistence(e.to_string()),
                ))
            }
        }
    }
}
