use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::video_upload::{declared_length, skip_field};
use crate::services::upload::{FilePart, UploadGate};
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use vidforge_core::{AppError, AssetClass, VideoRecord};

#[utoipa::path(
    post,
    path = "/api/videos/{video_id}/thumbnail",
    tag = "videos",
    params(
        ("video_id" = uuid::Uuid, Path, description = "Video ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Thumbnail stored", body = VideoRecord),
        (status = 400, description = "Malformed id or missing field", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 502, description = "Storage upload failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(video_id = %video_id, operation = "upload_thumbnail"))]
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let asset = AssetClass::Thumbnail;
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

        let updated = state
            .uploads
            .publish_thumbnail(record, field, content_type)
            .await
            .map_err(HttpAppError::logged)?;

        return Ok(Json(updated));
    }

    Err(UploadGate::missing_field(asset).into())
}
