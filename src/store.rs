//! # Record Store
//!
//! The record store is an external collaborator: the pipeline only needs
//! `insert` and `list_all`. [`RecordStore`] is the seam; the two concrete
//! stores here exist so the crate is usable on its own:
//!
//! - [`MemoryStore`]: in-process, for tests and dry runs
//! - [`JsonFileStore`]: a flat JSON file next to the binary, for the CLI
//!
//! Persistence success must stay independent of print success, so stores
//! never roll back an inserted record for any reason downstream.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::error::PersistError;
use crate::record::{ServiceRecord, StoredRecord};

/// Capability interface for persisting and listing service records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a draft record, assigning it an identity.
    async fn insert(&self, record: ServiceRecord) -> Result<StoredRecord, PersistError>;

    /// All persisted records, in store order.
    async fn list_all(&self) -> Result<Vec<StoredRecord>, PersistError>;
}

fn stored_from(id: i64, record: ServiceRecord) -> StoredRecord {
    StoredRecord {
        id,
        record,
        parts: 0,
        parts_origin: None,
        technician: None,
    }
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// In-memory record store. Contents vanish with the process.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<StoredRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, record: ServiceRecord) -> Result<StoredRecord, PersistError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| PersistError::Unreachable("store lock poisoned".to_string()))?;
        let id = records.last().map(|r| r.id + 1).unwrap_or(1);
        let stored = stored_from(id, record);
        records.push(stored.clone());
        Ok(stored)
    }

    async fn list_all(&self) -> Result<Vec<StoredRecord>, PersistError> {
        let records = self
            .records
            .lock()
            .map_err(|_| PersistError::Unreachable("store lock poisoned".to_string()))?;
        Ok(records.clone())
    }
}

// ============================================================================
// JSON FILE STORE
// ============================================================================

/// Record store backed by a single JSON file.
///
/// The file holds a plain array of records. Writes go through a temp file
/// plus rename, so a crash mid-write leaves the previous contents intact.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(path: &Path) -> Result<Vec<StoredRecord>, PersistError> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(PersistError::Io(e)),
        }
    }

    fn save(path: &Path, records: &[StoredRecord]) -> Result<(), PersistError> {
        let json = serde_json::to_vec_pretty(records)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn insert(&self, record: ServiceRecord) -> Result<StoredRecord, PersistError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let mut records = Self::load(&path)?;
            let id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
            let stored = stored_from(id, record);
            records.push(stored.clone());
            Self::save(&path, &records)?;
            debug!(id, path = %path.display(), "record persisted");
            Ok(stored)
        })
        .await
        .map_err(|e| PersistError::Unreachable(format!("store task failed: {}", e)))?
    }

    async fn list_all(&self) -> Result<Vec<StoredRecord>, PersistError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::load(&path))
            .await
            .map_err(|e| PersistError::Unreachable(format!("store task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DeviceType;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn draft(name: &str) -> ServiceRecord {
        ServiceRecord::draft(name, DeviceType::Laptop, "won't boot", "070555111", Decimal::new(4000, 2))
    }

    #[tokio::test]
    async fn test_memory_store_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let a = store.insert(draft("A")).await.unwrap();
        let b = store.insert(draft("B")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_json_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let store = JsonFileStore::new(&path);

        let a = store.insert(draft("Ana K")).await.unwrap();
        assert_eq!(a.id, 1);

        // A fresh store instance over the same file sees the record.
        let store2 = JsonFileStore::new(&path);
        let all = store2.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].record.full_name, "Ana K");

        let b = store2.insert(draft("B")).await.unwrap();
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn test_json_store_missing_file_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nope.json"));
        assert!(store.list_all().await.unwrap().is_empty());
    }
}
