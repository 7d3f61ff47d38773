//! Image route handlers.
//!
//! Each handler authenticates via [`BearerAuth`], delegates to the
//! reconciliation engine with the raw token, and maps the outcome to the
//! verb's success status. Malformed JSON bodies are rejected as bad
//! requests before the engine is involved.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::debug;

use super::{AppError, AppState, BearerAuth};
use crate::error::Error;
use crate::model::{ImageMetadata, ImagePayload};

/// GET /health - liveness probe, no auth required.
pub(crate) async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn payload_or_bad_request(
    body: Result<Json<ImagePayload>, JsonRejection>,
) -> Result<ImagePayload, AppError> {
    match body {
        Ok(Json(payload)) => Ok(payload),
        Err(rejection) => Err(Error::bad_request(rejection.body_text()).into()),
    }
}

/// GET /images - sync the remote list into the mirror and return it.
pub(crate) async fn list_images(
    State(state): State<AppState>,
    auth: BearerAuth,
) -> Result<Json<Vec<ImageMetadata>>, AppError> {
    debug!(caller = %auth.claims.sub, "listing images");
    let images = state.engine.list(&auth.token).await?;
    Ok(Json(images))
}

/// POST /images - upload a new image, mirror its metadata.
pub(crate) async fn create_image(
    State(state): State<AppState>,
    auth: BearerAuth,
    body: Result<Json<ImagePayload>, JsonRejection>,
) -> Result<(StatusCode, Json<ImageMetadata>), AppError> {
    let payload = payload_or_bad_request(body)?;
    debug!(caller = %auth.claims.sub, "creating image");
    let record = state.engine.create(payload, &auth.token).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /images/{id} - merged remote/local view of one image.
pub(crate) async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    auth: BearerAuth,
) -> Result<Json<ImageMetadata>, AppError> {
    debug!(caller = %auth.claims.sub, id = %id, "reading image");
    let record = state.engine.read(&id, &auth.token).await?;
    Ok(Json(record))
}

/// PUT /images/{id} - full replacement.
pub(crate) async fn update_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    auth: BearerAuth,
    body: Result<Json<ImagePayload>, JsonRejection>,
) -> Result<(StatusCode, Json<ImageMetadata>), AppError> {
    let payload = payload_or_bad_request(body)?;
    debug!(caller = %auth.claims.sub, id = %id, "updating image");
    let record = state.engine.update(&id, payload, &auth.token).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// PATCH /images/{id} - partial edit (description + content type).
pub(crate) async fn patch_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    auth: BearerAuth,
    body: Result<Json<ImagePayload>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let payload = payload_or_bad_request(body)?;
    debug!(caller = %auth.claims.sub, id = %id, "patching image");
    state.engine.patch(&id, payload, &auth.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /images/{id} - remove remotely, then locally.
pub(crate) async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    auth: BearerAuth,
) -> Result<StatusCode, AppError> {
    debug!(caller = %auth.claims.sub, id = %id, "deleting image");
    state.engine.delete(&id, &auth.token).await?;
    Ok(StatusCode::NO_CONTENT)
}
