//! Request checks that run before any byte of the file is read.
//!
//! Order matters and is part of the contract: id syntax, then identity, then
//! the record, then ownership, then the file part itself. A request that
//! fails a check never reaches the staging area.

use std::sync::Arc;

use axum::http::HeaderMap;
use uuid::Uuid;
use vidforge_core::models::normalize_content_type;
use vidforge_core::{AppError, AssetClass, VideoRecord};
use vidforge_db::VideoRepository;

use crate::auth::{bearer_token, Authenticator};

use super::types::{FilePart, UploadLimits};

#[derive(Clone)]
pub struct UploadGate {
    videos: Arc<dyn VideoRepository>,
    authenticator: Arc<dyn Authenticator>,
    limits: UploadLimits,
}

impl UploadGate {
    pub fn new(
        videos: Arc<dyn VideoRepository>,
        authenticator: Arc<dyn Authenticator>,
        limits: UploadLimits,
    ) -> Self {
        Self {
            videos,
            authenticator,
            limits,
        }
    }

    /// Resolve the video the caller is allowed to modify.
    pub async fn authorize(
        &self,
        raw_video_id: &str,
        headers: &HeaderMap,
    ) -> Result<VideoRecord, AppError> {
        let video_id = Uuid::parse_str(raw_video_id)
            .map_err(|_| AppError::BadRequest(format!("Malformed video id: {}", raw_video_id)))?;

        let token = bearer_token(headers)?;
        let user_id = self.authenticator.authenticate(token)?;

        let record = self
            .videos
            .get_video(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

        if !record.is_owned_by(user_id) {
            tracing::debug!(
                video_id = %video_id,
                user_id = %user_id,
                "Rejected request from non-owner"
            );
            return Err(AppError::Forbidden(
                "You do not have permission to modify this video".to_string(),
            ));
        }

        Ok(record)
    }

    /// Error for a form without the asset's field.
    pub fn missing_field(asset: AssetClass) -> AppError {
        AppError::BadRequest(format!("Missing '{}' file field", asset.field_name()))
    }

    /// Largest request body accepted for `asset`, multipart framing included.
    pub fn request_ceiling(&self, asset: AssetClass) -> u64 {
        self.limits.request_ceiling(asset)
    }

    /// Reject a request whose declared length already exceeds the ceiling.
    ///
    /// Handlers call this before reading the body as well, so an oversized
    /// request is never drained field by field.
    pub fn check_declared_size(
        &self,
        asset: AssetClass,
        declared_size: Option<u64>,
    ) -> Result<(), AppError> {
        match declared_size {
            Some(size) if size > self.request_ceiling(asset) => {
                Err(AppError::PayloadTooLarge(format!(
                    "{} exceeds the maximum size of {} bytes",
                    asset,
                    self.limits.for_asset(asset)
                )))
            }
            _ => Ok(()),
        }
    }

    /// Validate the file part and return its normalized content type.
    ///
    /// `declared_size` is the request's Content-Length, when sent.
    pub fn check_file(
        &self,
        asset: AssetClass,
        part: &FilePart,
        declared_size: Option<u64>,
    ) -> Result<String, AppError> {
        if part.file_name.as_deref().map_or(true, str::is_empty) {
            return Err(AppError::BadRequest(format!(
                "Field '{}' must be a file upload",
                asset.field_name()
            )));
        }

        self.check_declared_size(asset, declared_size)?;

        let content_type = normalize_content_type(part.content_type.as_deref().unwrap_or_default());
        if !asset.accepts_content_type(&content_type) {
            return Err(AppError::BadRequest(match asset {
                AssetClass::Video => format!(
                    "Unsupported content type '{}'; expected video/mp4",
                    content_type
                ),
                AssetClass::Thumbnail => "Thumbnail content type is required".to_string(),
            }));
        }

        Ok(content_type)
    }
}
