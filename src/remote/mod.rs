//! Remote image service client.
//!
//! The remote service owns the actual image bytes and is authoritative
//! for `imageUrl` and timestamps; this module wraps its HTTP API in a
//! typed, verb-per-method interface so the reconciliation engine never
//! inspects transport internals.
//!
//! The API is a trait to allow a scripted in-memory implementation in
//! tests; production uses [`HttpRemoteClient`].

mod http;
mod types;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::ContentType;

pub use http::HttpRemoteClient;
pub use types::{RemoteImage, RemoteImagePayload};

/// One operation per verb against the remote image service.
///
/// Every method takes the caller's raw bearer credential, read fresh from
/// the inbound request; nothing is cached between calls. Each call is a
/// single round trip with no retries.
#[async_trait]
pub trait RemoteImageApi: Send + Sync + 'static {
    /// Upload a new image. Success requires remote status 201.
    async fn create(&self, payload: &RemoteImagePayload, token: &str) -> Result<RemoteImage>;

    /// Fetch all images visible to the caller. The response must declare
    /// a JSON content type.
    async fn list(&self, token: &str) -> Result<Vec<RemoteImage>>;

    /// Fetch a single image record. 403 and 404 surface as named errors.
    async fn read(&self, id: &str, token: &str) -> Result<RemoteImage>;

    /// Replace an image. Success requires remote status 204.
    async fn update(&self, id: &str, payload: &RemoteImagePayload, token: &str) -> Result<()>;

    /// Change only the stored content type. Success requires status 204.
    async fn patch_content_type(
        &self,
        id: &str,
        content_type: ContentType,
        token: &str,
    ) -> Result<()>;

    /// Delete an image. Success requires remote status 204.
    async fn delete(&self, id: &str, token: &str) -> Result<()>;
}
