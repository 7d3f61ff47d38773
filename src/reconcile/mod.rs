//! Request-scoped reconciliation between the remote image service and
//! the local metadata store.
//!
//! Each CRUD verb is one short, strictly sequential saga: validate the
//! inbound payload, call the remote service, then mutate the local
//! mirror. The remote call always happens before any local mutation that
//! depends on its result; PATCH in `before-confirm` mode is the single
//! configurable exception, and it compensates on remote failure.
//!
//! The engine owns no state of its own. No retries, no caching of the
//! bearer credential, no background loops; a failure anywhere surfaces
//! immediately and partial mirrors are treated as worse than a clear
//! failure.

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{ImageMetadata, ImagePayload, NO_DESCRIPTION, NO_LOCATION};
use crate::remote::{RemoteImage, RemoteImageApi, RemoteImagePayload};
use crate::store::MetadataStore;

/// Ordering of the local write relative to the remote confirmation on
/// PATCH.
///
/// `AfterConfirm` waits for the remote to acknowledge before touching
/// the mirror. `BeforeConfirm` writes locally first for lower apparent
/// latency and restores the previous record if the remote call fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatchOrdering {
    #[default]
    AfterConfirm,
    BeforeConfirm,
}

/// Stateless coordinator between the remote image service and the local
/// metadata store.
#[derive(Clone)]
pub struct ReconcileEngine {
    remote: Arc<dyn RemoteImageApi>,
    store: MetadataStore,
    public_base: String,
    patch_ordering: PatchOrdering,
}

impl ReconcileEngine {
    /// Create an engine over the given remote client and store.
    ///
    /// `public_base` is the base of canonical public image URLs; a
    /// trailing slash is trimmed.
    pub fn new(
        remote: Arc<dyn RemoteImageApi>,
        store: MetadataStore,
        public_base: &str,
        patch_ordering: PatchOrdering,
    ) -> Self {
        Self {
            remote,
            store,
            public_base: public_base.trim_end_matches('/').to_string(),
            patch_ordering,
        }
    }

    /// The canonical public URL for an image id.
    fn public_url(&self, id: &str) -> String {
        format!("{}/{id}", self.public_base)
    }

    /// Fold a remote record onto the local mirror (if any), applying the
    /// sentinel defaults and treating the remote as authoritative for
    /// `image_url` and timestamps.
    fn merge_remote(&self, local: Option<ImageMetadata>, remote: &RemoteImage) -> ImageMetadata {
        let now = Utc::now();
        let image_url = remote
            .image_url
            .clone()
            .unwrap_or_else(|| self.public_url(&remote.id));
        let description = remote
            .description
            .clone()
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());
        let location = remote
            .location
            .clone()
            .unwrap_or_else(|| NO_LOCATION.to_string());

        match local {
            Some(existing) => ImageMetadata {
                image_url,
                description,
                location,
                content_type: remote.content_type.or(existing.content_type),
                created_at: remote.created_at.unwrap_or(existing.created_at),
                updated_at: remote.updated_at.unwrap_or(existing.updated_at),
                ..existing
            },
            None => ImageMetadata {
                id: remote.id.clone(),
                image_url,
                description,
                location,
                content_type: remote.content_type,
                created_at: remote.created_at.unwrap_or(now),
                updated_at: remote.updated_at.unwrap_or(now),
            },
        }
    }

    /// List all remote images and mirror each one locally.
    ///
    /// Per-record upserts run sequentially and fail fast: a persistence
    /// failure aborts the remaining upserts, and a remote failure aborts
    /// the whole operation with no partial result.
    ///
    /// # Errors
    ///
    /// Returns any remote or store error unchanged.
    pub async fn list(&self, token: &str) -> Result<Vec<ImageMetadata>> {
        let remote_images = self.remote.list(token).await?;
        debug!(count = remote_images.len(), "syncing remote image list");

        let mut synced = Vec::with_capacity(remote_images.len());
        for remote_image in remote_images {
            let local = self.store.find_by_id(&remote_image.id).await?;
            let merged = self.merge_remote(local, &remote_image);
            let saved = self.store.upsert(merged).await?;
            synced.push(saved);
        }
        Ok(synced)
    }

    /// Upload a new image and persist its metadata locally.
    ///
    /// Either both the remote create and the local insert succeed, or no
    /// local mutation occurs at all.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadRequest`] (before any remote call) if
    /// `description`, `location`, `data` or `contentType` is missing;
    /// remote errors are propagated verbatim.
    pub async fn create(&self, payload: ImagePayload, token: &str) -> Result<ImageMetadata> {
        let ImagePayload {
            data: Some(data),
            content_type: Some(content_type),
            description: Some(description),
            location: Some(location),
        } = payload
        else {
            return Err(Error::bad_request(
                "description, location, data and contentType are required",
            ));
        };

        let created = self
            .remote
            .create(&RemoteImagePayload { data, content_type }, token)
            .await?;
        debug!(id = %created.id, "remote create succeeded");

        let now = Utc::now();
        let record = ImageMetadata {
            image_url: created
                .image_url
                .clone()
                .unwrap_or_else(|| self.public_url(&created.id)),
            id: created.id,
            description,
            location,
            content_type: Some(content_type),
            created_at: created.created_at.unwrap_or(now),
            updated_at: created.updated_at.unwrap_or(now),
        };
        self.store.insert(record).await
    }

    /// Fetch one image from the remote service and refresh the mirror.
    ///
    /// Even a read mutates the local record to keep timestamps and the
    /// derived public URL fresh. Returns the merged view: remote
    /// description/location/timestamps plus the canonical public URL.
    ///
    /// # Errors
    ///
    /// [`Error::Forbidden`] and [`Error::NotFound`] from the remote pass
    /// through without touching local state.
    pub async fn read(&self, id: &str, token: &str) -> Result<ImageMetadata> {
        let remote_image = self.remote.read(id, token).await?;

        let local = self.store.find_by_id(id).await?;
        let mut merged = self.merge_remote(local, &remote_image);
        merged.id = id.to_string();
        // Canonical public URL, not whatever the remote echoed.
        merged.image_url = self.public_url(id);
        self.store.upsert(merged).await
    }

    /// Replace an image remotely and upsert the replacement metadata.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadRequest`] (before any remote call) if `data`
    /// or `contentType` is missing; remote errors are propagated with
    /// local state unchanged.
    pub async fn update(&self, id: &str, payload: ImagePayload, token: &str) -> Result<ImageMetadata> {
        let (Some(data), Some(content_type)) = (payload.data, payload.content_type) else {
            return Err(Error::bad_request("data and contentType are required"));
        };

        self.remote
            .update(id, &RemoteImagePayload { data, content_type }, token)
            .await?;
        debug!(id = %id, "remote update succeeded");

        let now = Utc::now();
        let record = match self.store.find_by_id(id).await? {
            Some(existing) => ImageMetadata {
                description: payload
                    .description
                    .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
                location: payload.location.unwrap_or_else(|| NO_LOCATION.to_string()),
                content_type: Some(content_type),
                updated_at: now,
                ..existing
            },
            None => ImageMetadata {
                id: id.to_string(),
                image_url: self.public_url(id),
                description: payload
                    .description
                    .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
                location: payload.location.unwrap_or_else(|| NO_LOCATION.to_string()),
                content_type: Some(content_type),
                created_at: now,
                updated_at: now,
            },
        };
        self.store.upsert(record).await
    }

    /// Partially edit an image: description locally, content type on
    /// both sides.
    ///
    /// The write ordering follows the configured [`PatchOrdering`]; in
    /// `before-confirm` mode a failed remote patch restores the previous
    /// record before the error surfaces.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadRequest`] if `description` is missing and no
    /// content type is available, [`Error::NotFound`] if there is no
    /// local record for `id`, or the remote error otherwise.
    pub async fn patch(&self, id: &str, payload: ImagePayload, token: &str) -> Result<()> {
        let Some(description) = payload.description else {
            return Err(Error::bad_request("description is required"));
        };

        let Some(previous) = self.store.find_by_id(id).await? else {
            return Err(Error::NotFound);
        };

        let mut updated = previous.clone();
        updated.description = description;
        updated.content_type = payload.content_type.or(previous.content_type);
        updated.updated_at = Utc::now();

        let Some(content_type) = updated.content_type else {
            return Err(Error::bad_request("contentType is required"));
        };

        match self.patch_ordering {
            PatchOrdering::AfterConfirm => {
                self.remote.patch_content_type(id, content_type, token).await?;
                self.store.upsert(updated).await?;
            },
            PatchOrdering::BeforeConfirm => {
                self.store.upsert(updated).await?;
                if let Err(err) = self.remote.patch_content_type(id, content_type, token).await {
                    // Compensating write: put the pre-patch record back.
                    if let Err(restore_err) = self.store.upsert(previous).await {
                        warn!(
                            id = %id,
                            error = %restore_err,
                            "failed to restore record after remote patch failure"
                        );
                    }
                    return Err(err);
                }
            },
        }
        Ok(())
    }

    /// Delete an image remotely, then drop the local mirror record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there is no local record for `id`.
    /// Remote `Forbidden`/`NotFound` or any other remote error surfaces
    /// with the local record preserved.
    pub async fn delete(&self, id: &str, token: &str) -> Result<()> {
        if self.store.find_by_id(id).await?.is_none() {
            return Err(Error::NotFound);
        }

        self.remote.delete(id, token).await?;
        debug!(id = %id, "remote delete succeeded");

        self.store.delete(id).await?;
        Ok(())
    }
}
