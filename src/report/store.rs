//! Persistence for report records
//!
//! Records are immutable once written: a PDF can always be rebuilt from its
//! record, so nothing but the record itself is stored.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use sled::Db;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use super::document::DocumentRecord;

/// Keyed storage for document records
pub trait DocumentStore: Send + Sync {
    /// Store a new record. Fails if the id is already taken.
    fn insert(&self, record: &DocumentRecord) -> Result<()>;

    fn get(&self, id: Uuid) -> Result<Option<DocumentRecord>>;
}

impl<T: DocumentStore + ?Sized> DocumentStore for Box<T> {
    fn insert(&self, record: &DocumentRecord) -> Result<()> {
        (**self).insert(record)
    }

    fn get(&self, id: Uuid) -> Result<Option<DocumentRecord>> {
        (**self).get(id)
    }
}

/// In-process store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<Uuid, DocumentRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize> {
        let records = self
            .records
            .read()
            .map_err(|_| Error::Store("memory store lock poisoned".to_string()))?;
        Ok(records.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl DocumentStore for MemoryStore {
    fn insert(&self, record: &DocumentRecord) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| Error::Store("memory store lock poisoned".to_string()))?;

        if records.contains_key(&record.id) {
            return Err(Error::Store(format!("document {} already exists", record.id)));
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<DocumentRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| Error::Store("memory store lock poisoned".to_string()))?;
        Ok(records.get(&id).cloned())
    }
}

/// Persistent store backed by a sled database, one JSON-encoded record per id
pub struct DiskStore {
    db: Db,
}

impl DiskStore {
    /// Open (or create) the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Store(format!(
                    "Failed to create store directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let db = sled::open(path).map_err(|e| {
            let err_str = e.to_string();
            if err_str.contains("WouldBlock") || err_str.contains("lock") {
                Error::Store(format!(
                    "Store locked at {}: another process is using it",
                    path.display()
                ))
            } else {
                Error::Store(format!("Failed to open store at {}: {}", path.display(), e))
            }
        })?;

        debug!("Opened document store at {}", path.display());

        Ok(Self { db })
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }
}

impl DocumentStore for DiskStore {
    fn insert(&self, record: &DocumentRecord) -> Result<()> {
        let json = serde_json::to_vec(record)
            .map_err(|e| Error::Store(format!("Failed to encode record: {}", e)))?;

        // Insert only if absent; the write is a single atomic swap
        self.db
            .compare_and_swap(record.id.as_bytes(), None::<&[u8]>, Some(json))
            .map_err(|e| Error::Store(e.to_string()))?
            .map_err(|_| Error::Store(format!("document {} already exists", record.id)))?;

        self.db
            .flush()
            .map_err(|e| Error::Store(format!("Flush failed: {e}")))?;

        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<DocumentRecord>> {
        let value = match self.db.get(id.as_bytes()) {
            Ok(Some(value)) => value,
            Ok(None) => return Ok(None),
            Err(e) => return Err(Error::Store(format!("Failed to read {}: {}", id, e))),
        };

        let record = serde_json::from_slice(&value)
            .map_err(|e| Error::Store(format!("Corrupt record {}: {}", id, e)))?;
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::document::{ContentType, ReportRequest};
    use tempfile::TempDir;

    fn sample() -> DocumentRecord {
        DocumentRecord::new(ReportRequest {
            title: "Başlık".to_string(),
            content: "Gövde".to_string(),
            content_type: ContentType::PlainText,
        })
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        let record = sample();

        assert!(store.get(record.id).unwrap().is_none());
        store.insert(&record).unwrap();
        assert_eq!(store.get(record.id).unwrap(), Some(record));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_memory_store_rejects_duplicates() {
        let store = MemoryStore::new();
        let record = sample();
        store.insert(&record).unwrap();
        assert!(matches!(store.insert(&record), Err(Error::Store(_))));
    }

    #[test]
    fn test_memory_store_poisoned_lock() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let poisoner = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.records.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(store.len(), Err(Error::Store(_))));
        assert!(matches!(store.insert(&sample()), Err(Error::Store(_))));
    }

    #[test]
    fn test_disk_store_persists_across_instances() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("documents");
        let record = sample();

        let store = DiskStore::open(&db_path).unwrap();
        store.insert(&record).unwrap();
        drop(store);

        let reopened = DiskStore::open(&db_path).unwrap();
        assert_eq!(reopened.get(record.id).unwrap(), Some(record));
        assert!(reopened.get(Uuid::new_v4()).unwrap().is_none());
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn test_disk_store_rejects_duplicates() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = DiskStore::open(temp_dir.path().join("nested").join("documents")).unwrap();
        let record = sample();

        store.insert(&record).unwrap();
        assert!(matches!(store.insert(&record), Err(Error::Store(_))));

        // The first write survives the rejected one
        assert_eq!(store.get(record.id).unwrap(), Some(record));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_disk_store_corrupt_record() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = DiskStore::open(temp_dir.path().join("documents")).unwrap();
        let id = Uuid::new_v4();
        store.db.insert(id.as_bytes(), b"{".to_vec()).unwrap();

        assert!(matches!(store.get(id), Err(Error::Store(_))));
    }
}
