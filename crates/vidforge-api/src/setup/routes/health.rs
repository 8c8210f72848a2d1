//! Health check handlers and response types.

use crate::state::AppState;
use axum::{http::StatusCode, response::IntoResponse, Json};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use vidforge_storage::StorageKey;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Run an async check with timeout; returns "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(serde::Serialize)]
pub(super) struct HealthCheckResponse {
    pub status: String,
    pub database: String,
    pub storage: String,
    pub scratch: String,
}

/// Liveness probe - process is running.
pub async fn liveness_check(_state: Arc<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness probe - the record store answers.
pub async fn readiness_check(state: Arc<AppState>) -> impl IntoResponse {
    let database = run_check(TIMEOUT, state.videos().ping(), "not_ready").await;
    let ready = database == "healthy";
    if !ready {
        tracing::error!(database = %database, "Database readiness check failed");
    }

    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": if ready { "ready" } else { "not_ready" },
            "database": database,
        })),
    )
}

/// Full health check: database, video storage and the scratch directory.
pub async fn health_check(state: Arc<AppState>) -> impl IntoResponse {
    let database = run_check(TIMEOUT, state.videos().ping(), "unhealthy").await;

    let storage = state.video_storage().clone();
    let storage_status = match StorageKey::parse("health-check-non-existent-key") {
        Some(key) => {
            run_check(
                TIMEOUT,
                async move { storage.exists(&key).await.map(drop) },
                "degraded",
            )
            .await
        }
        None => "degraded: invalid probe key".to_string(),
    };

    let scratch_root = state.uploads.staging.root().to_path_buf();
    let scratch = run_check(
        TIMEOUT,
        async move { tokio::fs::metadata(&scratch_root).await.map(drop) },
        "unhealthy",
    )
    .await;

    let healthy = database == "healthy" && scratch == "healthy";
    let response = HealthCheckResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        database,
        storage: storage_status,
        scratch,
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
