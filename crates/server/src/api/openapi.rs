#![allow(clippy::needless_for_each)]

use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

use super::schemas::{BlobResponse, ErrorResponse, HealthResponse, UploadForm};

#[derive(utoipa::OpenApi)]
#[openapi(
    info(
        title = "Blobvault API",
        version = "0.1.0",
        description = "Per-identity blob storage. Upload files under your own namespace and read them back by id.",
        license(name = "Apache-2.0")
    ),
    tags(
        (name = "Health", description = "Service liveness and readiness"),
        (name = "Blob", description = "Identity-scoped blob upload and download")
    ),
    paths(
        super::health::health,
        super::health::ready,
        super::blob::upload,
        super::blob::download,
    ),
    components(schemas(BlobResponse, ErrorResponse, HealthResponse, UploadForm)),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

/// Registers the `bearer` HTTP security scheme referenced by blob routes.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
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
