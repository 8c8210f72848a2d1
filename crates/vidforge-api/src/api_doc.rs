//! OpenAPI documentation.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use vidforge_core::models;

/// Returns the OpenAPI document served at `/api/openapi.json`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vidforge API",
        version = "0.1.0",
        description = "Video upload pipeline. Uploaded MP4 files are classified by aspect ratio, remuxed for fast start and published to object storage; thumbnails are served from the local asset directory."
    ),
    paths(
        handlers::video_upload::upload_video,
        handlers::thumbnail_upload::upload_thumbnail,
        handlers::video_get::get_video,
    ),
    components(
        schemas(
            models::VideoRecord,
            models::AspectClass,
            error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "videos", description = "Video and thumbnail uploads")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_upload_routes() {
        let spec = get_openapi_spec();
        let paths: Vec<&String> = spec.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| *p == "/api/videos/{video_id}/video"));
        assert!(paths.iter().any(|p| *p == "/api/videos/{video_id}/thumbnail"));
        assert!(paths.iter().any(|p| *p == "/api/videos/{video_id}"));

        let components = spec.components.expect("components");
        assert!(components.security_schemes.contains_key("bearerAuth"));
    }
}
