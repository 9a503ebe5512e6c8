use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use blobvault_core::{CodecError, PolicyError};
use blobvault_gateway::GatewayError;

use crate::auth::AuthError;

/// Errors that can occur when running the blobvault server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The request carried no valid bearer credential.
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthError),

    /// The upload's content type is not allow-listed.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// A pre-serialized upload could not be decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// A gateway-level error surfaced through the API.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// The request was structurally invalid (multipart shape, blob id).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request body exceeded `server.max_blob_bytes`.
    #[error("payload too large")]
    PayloadTooLarge,
}

impl ServerError {
    /// HTTP status for this error kind.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Policy(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Gateway(GatewayError::NotFound) => StatusCode::NOT_FOUND,
            Self::Config(_) | Self::Io(_) | Self::Codec(_) | Self::Gateway(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message placed in the response body. Never names the failing
    /// verification step or backend detail.
    fn public_message(&self) -> String {
        match self {
            Self::Unauthorized(_) => "unauthorized".to_owned(),
            Self::Policy(e) => e.to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::PayloadTooLarge => "payload too large".to_owned(),
            Self::Gateway(GatewayError::NotFound) => "blob not found".to_owned(),
            Self::Config(_) | Self::Io(_) | Self::Codec(_) | Self::Gateway(_) => {
                "internal server error".to_owned()
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }

        let body = serde_json::json!({ "error": self.public_message() });
        let mut response = (status, axum::Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}
