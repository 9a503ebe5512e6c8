use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::{Extension, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use bytes::Bytes;
use serde::Deserialize;
use tracing::debug;
use utoipa::IntoParams;

use blobvault_core::{BlobId, codec};

use super::AppState;
use super::schemas::{BlobResponse, ErrorResponse, UploadForm};
use crate::auth::IdentityContext;
use crate::error::ServerError;

/// Query parameters accepted by `POST /blob`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadParams {
    /// `true` if the uploaded file is a blob envelope. A multipart field of
    /// the same name takes precedence.
    #[serde(rename = "isBlob")]
    #[param(value_type = Option<bool>)]
    pub is_blob: Option<String>,
}

/// A parsed `POST /blob` form.
struct Upload {
    mime_type: String,
    data: Bytes,
    is_blob: Option<String>,
}

fn multipart_error(err: &MultipartError) -> ServerError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge
    } else {
        ServerError::BadRequest(format!("invalid multipart body: {}", err.body_text()))
    }
}

/// Parse an `isBlob` value. Accepts `true`/`false` in any case.
fn parse_flag(raw: &str) -> Result<bool, ServerError> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ServerError::BadRequest(format!(
            "isBlob must be true or false, got '{raw}'"
        )))
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, ServerError> {
    let mut file = None;
    let mut is_blob = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                // A part without a Content-Type gets an empty MIME type, which
                // no allow-list permits.
                let mime_type = field.content_type().unwrap_or_default().to_owned();
                let data = field.bytes().await.map_err(|e| multipart_error(&e))?;
                file = Some((mime_type, data));
            }
            Some("isBlob") => {
                is_blob = Some(field.text().await.map_err(|e| multipart_error(&e))?);
            }
            _ => {}
        }
    }

    let (mime_type, data) =
        file.ok_or_else(|| ServerError::BadRequest("missing multipart field 'file'".into()))?;
    Ok(Upload {
        mime_type,
        data,
        is_blob,
    })
}

/// `POST /blob` -- store an upload in the caller's namespace.
#[utoipa::path(
    post,
    path = "/blob",
    tag = "Blob",
    summary = "Upload a blob",
    description = "Stores the `file` part under the caller's namespace and returns the new blob id. With `isBlob=true` the file must be a blob envelope as returned by `GET /blob/{id}`. The MIME type must be allow-listed in either case.",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    params(UploadParams),
    responses(
        (status = 201, description = "Blob stored; body is the blob id", body = String),
        (status = 400, description = "Disallowed content type or malformed form", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 413, description = "Upload exceeds the size limit", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn upload(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Query(params): Query<UploadParams>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServerError> {
    let upload = read_upload(multipart).await?;
    let is_blob = match upload.is_blob.as_deref().or(params.is_blob.as_deref()) {
        Some(raw) => parse_flag(raw)?,
        None => false,
    };

    let blob = if is_blob {
        codec::decode_envelope(&upload.data)?
    } else {
        codec::encode(upload.mime_type, &upload.data)
    };

    if let Err(e) = state.policy.check(&blob) {
        debug!(login = identity.login(), mime_type = blob.mime_type(), "upload rejected by content policy");
        return Err(e.into());
    }

    let id = state.gateway.store(&identity.profile, &blob).await?;
    Ok((StatusCode::CREATED, Json(id.to_string())))
}

/// `GET /blob/{id}` -- fetch a blob from the caller's namespace.
#[utoipa::path(
    get,
    path = "/blob/{id}",
    tag = "Blob",
    summary = "Download a blob",
    description = "Returns the blob stored under `id` in the caller's namespace. Blobs stored by other identities are never visible.",
    params(
        ("id" = String, Path, description = "Blob id (UUID)")
    ),
    responses(
        (status = 200, description = "The blob", body = BlobResponse),
        (status = 400, description = "Invalid blob id", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 404, description = "No such blob for this identity", body = ErrorResponse),
        (status = 500, description = "Storage or decode failure", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn download(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Path(id): Path<String>,
) -> Result<Json<BlobResponse>, ServerError> {
    let id: BlobId = id
        .parse()
        .map_err(|_| ServerError::BadRequest(format!("invalid blob id '{id}'")))?;
    let blob = state.gateway.retrieve(&identity.profile, id).await?;
    Ok(Json(BlobResponse::from(&blob)))
}
