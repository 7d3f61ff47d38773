//! Image metadata records and request payloads.
//!
//! [`ImageMetadata`] is the locally mirrored record, keyed by the id the
//! remote service assigned. [`ImagePayload`] is the request-scoped body of
//! create/update/patch calls; only the metadata derived from it is ever
//! persisted, never the payload itself.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Sentinel stored when a sync payload carries no description.
pub const NO_DESCRIPTION: &str = "No description provided";

/// Sentinel stored when a sync payload carries no location.
pub const NO_LOCATION: &str = "No location provided";

/// Image content types accepted by the remote service (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "image/gif")]
    Gif,
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
}

impl ContentType {
    /// The MIME string used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gif => "image/gif",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Locally mirrored metadata for one remote image.
///
/// The id is assigned by the remote service and immutable after creation;
/// the remote service is authoritative for `image_url` and the timestamps,
/// which are overwritten on every sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub id: String,
    pub image_url: String,
    pub description: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ImageMetadata {
    /// Validate record invariants before persistence.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty or `image_url` is not a
    /// syntactically valid URL.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            bail!("image id cannot be empty");
        }
        Url::parse(&self.image_url)
            .with_context(|| format!("'{}' is not a valid URL", self.image_url))?;
        Ok(())
    }
}

/// Inbound create/update/patch body.
///
/// All fields are optional at the wire level; the reconciliation engine
/// enforces per-verb presence rules before any remote side effect.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    /// Base64-encoded image bytes. Forwarded to the remote service,
    /// never stored locally.
    pub data: Option<String>,
    pub content_type: Option<ContentType>,
    pub description: Option<String>,
    pub location: Option<String>,
}
