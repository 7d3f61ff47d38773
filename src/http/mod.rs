//! HTTP request boundary.
//!
//! Thin axum layer that maps inbound verbs onto reconciliation engine
//! calls and shapes results and errors into transport responses. All
//! image routes sit behind the bearer-token extractor; errors become
//! JSON bodies of the form `{status_code, message}`.

mod handlers;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::Router;
use axum::extract::FromRequestParts;
use axum::http::{StatusCode, header, request::Parts};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use serde::Serialize;
use tracing::{error, info};

use crate::auth::{Authenticator, Claims};
use crate::config::Config;
use crate::error::Error;
use crate::reconcile::ReconcileEngine;
use crate::remote::HttpRemoteClient;
use crate::store::MetadataStore;

/// Canned client-error messages, fixed by the original service contract.
const BAD_REQUEST_MESSAGE: &str = "The request cannot or will not be processed due to something that is perceived to be a client error (for example, validation error).";
const UNAUTHORIZED_MESSAGE: &str = "Access token invalid or not provided.";
const FORBIDDEN_MESSAGE: &str = "The request contained valid data and was understood by the server, but the server is refusing action due to the authenticated user not having the necessary permissions for the resource.";
const NOT_FOUND_MESSAGE: &str = "The requested resource was not found.";
const INTERNAL_MESSAGE: &str = "An unexpected condition was encountered.";

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: ReconcileEngine,
    pub auth: Arc<Authenticator>,
}

/// JSON error body returned to clients.
#[derive(Debug, Serialize)]
struct ErrorBody {
    status_code: u16,
    message: String,
}

/// Wrapper mapping gateway errors onto HTTP responses.
pub struct AppError(pub Error);

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.0.status_code();
        let status =
            StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Clients get canned texts for the named outcomes and an opaque
        // message for faults; remote errors pass through verbatim.
        let message = match &self.0 {
            Error::BadRequest(reason) => {
                info!(reason = %reason, "rejected bad request");
                BAD_REQUEST_MESSAGE.to_string()
            },
            Error::Unauthorized(reason) => {
                info!(reason = %reason, "rejected credential");
                UNAUTHORIZED_MESSAGE.to_string()
            },
            Error::Forbidden => FORBIDDEN_MESSAGE.to_string(),
            Error::NotFound => NOT_FOUND_MESSAGE.to_string(),
            Error::Remote { message, .. } => message.clone(),
            err => {
                error!(error = %err, "request failed");
                INTERNAL_MESSAGE.to_string()
            },
        };

        (
            status,
            Json(ErrorBody {
                status_code,
                message,
            }),
        )
            .into_response()
    }
}

/// Verified bearer credential plus the raw token.
///
/// The raw token is kept because every remote call forwards it; it is
/// read fresh from the request on every operation and never cached.
pub struct BearerAuth {
    pub token: String,
    pub claims: Claims,
}

impl FromRequestParts<AppState> for BearerAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| Error::unauthorized("missing authorization header"))?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| Error::unauthorized("invalid authentication scheme"))?;

        let claims = state.auth.verify(token)?;

        Ok(Self {
            token: token.to_string(),
            claims,
        })
    }
}

/// Build the gateway router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/images",
            get(handlers::list_images).post(handlers::create_image),
        )
        .route(
            "/images/{id}",
            get(handlers::get_image)
                .put(handlers::update_image)
                .patch(handlers::patch_image)
                .delete(handlers::delete_image),
        )
        .with_state(state)
}

/// Wire up all components from configuration and serve until shutdown.
///
/// # Errors
///
/// Returns an error if the verification key or store cannot be opened,
/// or if the listener fails to bind.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let result = config.validate()?;
    for warning in &result.warnings {
        tracing::warn!("{warning}");
    }

    let auth = Arc::new(Authenticator::from_rsa_pem_file(
        &config.auth.public_key_path,
    )?);

    let store_path = config.store.resolve_path()?;
    let store = MetadataStore::file(&store_path)?;
    info!(path = %store_path.display(), "opened metadata store");

    let remote = Arc::new(HttpRemoteClient::new(
        &config.remote.api_base,
        &config.remote.public_base,
    ));
    let engine = ReconcileEngine::new(
        remote,
        store,
        &config.remote.public_base,
        config.reconcile.patch_ordering,
    );

    let app = router(AppState { engine, auth });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "gateway listening");

    axum::serve(listener, app).await?;
    Ok(())
}
