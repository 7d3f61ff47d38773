//! Backend trait for the metadata store.
//!
//! Defines the interface that all metadata storage backends must
//! implement, enabling pluggable persistence (redb, memory, etc.).

use anyhow::Result;
use async_trait::async_trait;

use crate::model::ImageMetadata;

/// Backend trait for image metadata persistence.
///
/// Records are keyed by the remote-assigned image id. All backends must
/// be thread-safe (`Send + Sync`) for use with tokio and must make a
/// single upsert or delete atomic; the reconciliation engine relies on
/// nothing stronger.
#[async_trait]
pub trait MetadataBackend: Send + Sync + 'static {
    /// Look up a record by remote image id.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn find_by_id(&self, id: &str) -> Result<Option<ImageMetadata>>;

    /// Insert a new record. Fails if the id already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is already present or the storage
    /// operation fails.
    async fn insert(&self, record: ImageMetadata) -> Result<ImageMetadata>;

    /// Insert or overwrite a record, returning the persisted value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn upsert(&self, record: ImageMetadata) -> Result<ImageMetadata>;

    /// Delete a record by id.
    ///
    /// Returns `Ok(true)` if the record existed and was removed,
    /// `Ok(false)` if it didn't exist. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// List all stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn list(&self) -> Result<Vec<ImageMetadata>>;
}
