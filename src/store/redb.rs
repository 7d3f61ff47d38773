//! Redb-backed metadata storage.
//!
//! Provides persistent image metadata storage using redb with ACID
//! guarantees. Records are serialized as JSON values in a single table
//! keyed by remote image id.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

use super::backend::MetadataBackend;
use crate::model::ImageMetadata;

/// Table holding one JSON-serialized record per image id.
pub(crate) const IMAGES_TABLE: TableDefinition<'static, &'static str, &'static [u8]> =
    TableDefinition::new("images");

/// Redb-backed metadata storage backend.
///
/// # Thread Safety
///
/// `RedbBackend` is `Clone` and can be shared across threads. The
/// underlying database handles concurrent access safely.
#[derive(Clone)]
pub struct RedbBackend {
    db: Arc<Database>,
}

impl RedbBackend {
    /// Opens or creates a redb database at the given path.
    ///
    /// Creates parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory cannot be created
    /// - Database file cannot be opened or created
    /// - Initialization transaction fails to begin or commit
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create store directory: {}", parent.display())
            })?;
        }

        let db = Database::create(path)
            .with_context(|| format!("Failed to open metadata database: {}", path.display()))?;

        // Initialize table on first open to ensure it exists for reads
        let write_txn = db
            .begin_write()
            .context("Failed to begin initialization transaction")?;
        {
            let _table = write_txn
                .open_table(IMAGES_TABLE)
                .context("Failed to initialize images table")?;
        }
        write_txn
            .commit()
            .context("Failed to commit initialization transaction")?;

        Ok(Self { db: Arc::new(db) })
    }

    fn find_sync(&self, id: &str) -> Result<Option<ImageMetadata>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;

        let table = read_txn
            .open_table(IMAGES_TABLE)
            .context("Failed to open images table")?;

        let result = table
            .get(id)
            .with_context(|| format!("Failed to read image '{id}'"))?;

        match result {
            Some(guard) => {
                let record: ImageMetadata = serde_json::from_slice(guard.value())
                    .with_context(|| format!("Failed to deserialize record for image '{id}'"))?;
                Ok(Some(record))
            },
            None => Ok(None),
        }
    }

    fn write_sync(&self, record: &ImageMetadata, must_be_new: bool) -> Result<()> {
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;

        {
            let mut table = write_txn
                .open_table(IMAGES_TABLE)
                .context("Failed to open images table")?;

            if must_be_new
                && table
                    .get(record.id.as_str())
                    .with_context(|| format!("Failed to read image '{}'", record.id))?
                    .is_some()
            {
                bail!("image '{}' already exists", record.id);
            }

            let json =
                serde_json::to_vec(record).context("Failed to serialize record to JSON")?;

            table
                .insert(record.id.as_str(), json.as_slice())
                .with_context(|| format!("Failed to write image '{}'", record.id))?;
        }

        write_txn
            .commit()
            .context("Failed to commit write transaction")?;

        Ok(())
    }

    fn delete_sync(&self, id: &str) -> Result<bool> {
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;

        let removed = {
            let mut table = write_txn
                .open_table(IMAGES_TABLE)
                .context("Failed to open images table")?;

            table
                .remove(id)
                .with_context(|| format!("Failed to remove image '{id}'"))?
                .is_some()
        };

        write_txn
            .commit()
            .context("Failed to commit delete transaction")?;

        Ok(removed)
    }

    fn list_sync(&self) -> Result<Vec<ImageMetadata>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;

        let table = read_txn
            .open_table(IMAGES_TABLE)
            .context("Failed to open images table")?;

        let mut records = Vec::new();
        for item in table.iter().context("Failed to iterate images table")? {
            let (key, value) = item.context("Failed to read image entry")?;
            let record: ImageMetadata = serde_json::from_slice(value.value()).with_context(
                || format!("Failed to deserialize record for image '{}'", key.value()),
            )?;
            records.push(record);
        }

        Ok(records)
    }
}

#[async_trait]
impl MetadataBackend for RedbBackend {
    async fn find_by_id(&self, id: &str) -> Result<Option<ImageMetadata>> {
        let backend = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || backend.find_sync(&id))
            .await
            .context("Task join error")?
    }

    async fn insert(&self, record: ImageMetadata) -> Result<ImageMetadata> {
        let backend = self.clone();
        let stored = record.clone();
        tokio::task::spawn_blocking(move || backend.write_sync(&record, true))
            .await
            .context("Task join error")??;
        Ok(stored)
    }

    async fn upsert(&self, record: ImageMetadata) -> Result<ImageMetadata> {
        let backend = self.clone();
        let stored = record.clone();
        tokio::task::spawn_blocking(move || backend.write_sync(&record, false))
            .await
            .context("Task join error")??;
        Ok(stored)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let backend = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || backend.delete_sync(&id))
            .await
            .context("Task join error")?
    }

    async fn list(&self) -> Result<Vec<ImageMetadata>> {
        let backend = self.clone();
        tokio::task::spawn_blocking(move || backend.list_sync())
            .await
            .context("Task join error")?
    }
}
