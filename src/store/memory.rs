//! In-memory metadata storage backend.
//!
//! Non-persistent storage using DashMap for concurrent access. Ideal for
//! testing and development; all data is lost when the process exits.

use anyhow::{Result, bail};
use async_trait::async_trait;
use dashmap::DashMap;

use super::backend::MetadataBackend;
use crate::model::ImageMetadata;

/// In-memory metadata storage backend using DashMap.
///
/// # Thread Safety
///
/// `MemoryBackend` is `Clone` and uses `DashMap` internally for
/// lock-free concurrent access.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    data: DashMap<String, ImageMetadata>,
}

impl MemoryBackend {
    /// Creates a new empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataBackend for MemoryBackend {
    async fn find_by_id(&self, id: &str) -> Result<Option<ImageMetadata>> {
        Ok(self.data.get(id).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, record: ImageMetadata) -> Result<ImageMetadata> {
        if self.data.contains_key(&record.id) {
            bail!("image '{}' already exists", record.id);
        }
        self.data.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn upsert(&self, record: ImageMetadata) -> Result<ImageMetadata> {
        self.data.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.data.remove(id).is_some())
    }

    async fn list(&self) -> Result<Vec<ImageMetadata>> {
        Ok(self.data.iter().map(|entry| entry.value().clone()).collect())
    }
}
