mod health;

use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use vidforge_core::Config;

pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    tracing::info!(
        assets_root = %config.assets_root().display(),
        "Serving thumbnails under /assets"
    );

    let app = public_routes(state.clone())
        .merge(video_routes())
        .nest_service("/assets", ServeDir::new(config.assets_root()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

fn public_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/health",
            get({
                let state = state.clone();
                move || {
                    let state = state.clone();
                    async { health::health_check(state).await }
                }
            }),
        )
        .route(
            "/live",
            get({
                let state = state.clone();
                move || async { health::liveness_check(state).await }
            }),
        )
        .route(
            "/ready",
            get({
                let state = state.clone();
                move || async { health::readiness_check(state).await }
            }),
        )
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
}

/// Upload bodies stream through the gate and the staging byte counter,
/// which enforce the size ceilings, so axum's buffered body limit is off.
fn video_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/videos/{video_id}",
            get(handlers::video_get::get_video),
        )
        .route(
            "/api/videos/{video_id}/video",
            post(handlers::video_upload::upload_video),
        )
        .route(
            "/api/videos/{video_id}/thumbnail",
            post(handlers::thumbnail_upload::upload_thumbnail),
        )
        .layer(DefaultBodyLimit::disable())
}
