pub mod blob;
pub mod health;
pub mod openapi;
pub mod schemas;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use blobvault_core::ContentPolicy;
use blobvault_gateway::BlobGateway;

use crate::auth::{AuthLayer, TokenVerifier};

use self::openapi::ApiDoc;

/// Shared application state passed to all handlers.
///
/// Built once at startup and never mutated.
#[derive(Clone)]
pub struct AppState {
    /// Identity-scoped store/retrieve pipeline.
    pub gateway: Arc<BlobGateway>,
    /// Content-type allow-list enforced on upload.
    pub policy: Arc<ContentPolicy>,
    /// Bearer token verifier used by the auth layer.
    pub verifier: Arc<TokenVerifier>,
    /// Largest accepted request body in bytes.
    pub max_blob_bytes: usize,
}

/// Build the Axum router with all API routes and middleware.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .route("/api-doc/openapi.json", get(openapi_json));

    let protected = Router::new()
        .route("/blob", post(blob::upload))
        .route("/blob/{id}", get(blob::download))
        .layer(AuthLayer::new(Arc::clone(&state.verifier)));

    Router::new()
        .merge(public)
        .merge(protected)
        // Multipart has its own 2 MiB default; the limit below replaces it.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.max_blob_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
