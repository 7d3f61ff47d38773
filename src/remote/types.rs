//! Wire types for the remote image service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ContentType;

/// A record as returned by the remote image service.
///
/// Everything but the id is optional on the wire; the reconciliation
/// engine fills gaps with sentinels or derived values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteImage {
    pub id: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub content_type: Option<ContentType>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body sent on create and update.
///
/// Only the image bytes and their type travel to the remote service;
/// caller-supplied description/location stay in the local mirror.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteImagePayload {
    /// Base64-encoded image bytes.
    pub data: String,
    pub content_type: ContentType,
}

/// Body sent on patch: the content type change only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PatchBody {
    pub content_type: ContentType,
}
