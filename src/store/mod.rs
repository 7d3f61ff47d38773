//! Metadata store with pluggable backends.
//!
//! Owns the lifecycle of local [`ImageMetadata`] records, keyed by remote
//! image id. Supports multiple backends:
//!
//! - **RedbBackend**: Persistent storage with ACID guarantees (default)
//! - **MemoryBackend**: Fast, non-persistent storage (testing/development)
//!
//! Record invariants (non-empty id, valid URL) are enforced here, in
//! front of whichever backend is in use.

mod backend;
mod memory;
mod redb;


pub use backend::MetadataBackend;
pub use memory::MemoryBackend;
pub use redb::RedbBackend;

use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::ImageMetadata;

/// High-level metadata store interface.
///
/// Wraps a [`MetadataBackend`] implementation and maps persistence
/// failures into [`Error::Store`].
///
/// # Thread Safety
///
/// `MetadataStore` is `Clone` and can be shared across threads.
#[derive(Clone)]
pub struct MetadataStore {
    backend: Arc<dyn MetadataBackend>,
}

impl MetadataStore {
    /// Creates a store backed by a file-based redb database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let backend = RedbBackend::open(path)?;
        Ok(Self {
            backend: Arc::new(backend),
        })
    }

    /// Creates a store backed by an in-memory map.
    pub fn memory() -> Self {
        Self {
            backend: Arc::new(MemoryBackend::new()),
        }
    }

    /// Creates a store with a custom backend.
    pub fn custom<B: MetadataBackend>(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Look up a record by remote image id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the underlying storage operation fails.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<ImageMetadata>> {
        self.backend.find_by_id(id).await.map_err(Error::Store)
    }

    /// Insert a new record, failing if the id already exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the record is invalid, the id is
    /// already present, or the storage operation fails.
    pub async fn insert(&self, record: ImageMetadata) -> Result<ImageMetadata> {
        record.validate()?;
        self.backend.insert(record).await.map_err(Error::Store)
    }

    /// Insert or overwrite a record, returning the persisted value.
    ///
    /// Idempotent for unchanged input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the record is invalid or the storage
    /// operation fails.
    pub async fn upsert(&self, record: ImageMetadata) -> Result<ImageMetadata> {
        record.validate()?;
        self.backend.upsert(record).await.map_err(Error::Store)
    }

    /// Delete a record by id. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the underlying storage operation fails.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        self.backend.delete(id).await.map_err(Error::Store)
    }

    /// List all stored records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the underlying storage operation fails.
    pub async fn list(&self) -> Result<Vec<ImageMetadata>> {
        self.backend.list().await.map_err(Error::Store)
    }
}
