use crate::error::{ErrorResponse, HttpAppError};
use crate::services::upload::{FilePart, UploadGate};
use crate::state::AppState;
use axum::{
    extract::{
        multipart::{Field, MultipartRejection},
        Multipart, Path, State,
    },
    http::{header::CONTENT_LENGTH, HeaderMap, StatusCode},
};
use std::sync::Arc;
use vidforge_core::{AppError, AssetClass};

/// Declared request length, when the client sent a usable one.
pub(crate) fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Drain a field the handler has no use for, counting its bytes against
/// `ceiling` so a form cannot make the server read an unbounded body.
pub(crate) async fn skip_field(
    field: &mut Field<'_>,
    skipped: &mut u64,
    ceiling: u64,
) -> Result<(), AppError> {
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart: {}", e)))?
    {
        *skipped += chunk.len() as u64;
        if *skipped > ceiling {
            return Err(AppError::PayloadTooLarge(format!(
                "Request exceeds the maximum size of {} bytes",
                ceiling
            )));
        }
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/videos/{video_id}/video",
    tag = "videos",
    params(
        ("video_id" = uuid::Uuid, Path, description = "Video ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 204, description = "Video published and recorded"),
        (status = 400, description = "Malformed id, missing field or not video/mp4", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 422, description = "File could not be probed or remuxed", body = ErrorResponse),
        (status = 502, description = "Storage upload failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(video_id = %video_id, operation = "upload_video"))]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<StatusCode, HttpAppError> {
    let asset = AssetClass::Video;
    let record = state.gate.authorize(&video_id, &headers).await?;
    state
        .gate
        .check_declared_size(asset, declared_length(&headers))?;
    let mut multipart = multipart?;

    let mut skipped = 0;
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some(asset.field_name()) {
            skip_field(&mut field, &mut skipped, state.gate.request_ceiling(asset)).await?;
            continue;
        }

        let content_type = state.gate.check_file(
            asset,
            &FilePart::from_field(&field),
            declared_length(&headers),
        )?;

        state
            .uploads
            .publish_video(record, field, content_type)
            .await
            .map_err(HttpAppError::logged)?;

        return Ok(StatusCode::NO_CONTENT);
    }

    Err(UploadGate::missing_field(asset).into())
}
