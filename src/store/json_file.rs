// src/store/json_file.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use super::{Collection, Document, DocumentStore, Fields, MemoryStore, Snapshot, StoreError};

/// Whole database in one pretty-printed JSON file.
///
/// Reads go to memory. By default every mutation rewrites the file (temp
/// file, then rename). In [`deferred`](Self::deferred) mode mutations only
/// mark the store dirty and [`flush`](DocumentStore::flush) writes once.
/// A failed write leaves memory ahead of disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
    write_through: bool,
    dirty: AtomicBool,
}

impl JsonFileStore {
    /// Open `path`, or start empty if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let snapshot = if path.exists() {
            let text = fs::read_to_string(&path)?;
            if text.trim().is_empty() {
                Snapshot::default()
            } else {
                serde_json::from_str(&text)?
            }
        } else {
            Snapshot::default()
        };
        logd!("Opened store {} ({} scores)", path.display(), snapshot.count(Collection::Scores));
        Ok(Self {
            path,
            inner: MemoryStore::from_snapshot(snapshot),
            write_through: true,
            dirty: AtomicBool::new(false),
        })
    }

    /// Buffer mutations until `flush`.
    pub fn deferred(mut self) -> Self {
        self.write_through = false;
        self
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> Result<Snapshot, StoreError> {
        self.inner.snapshot()
    }

    fn write_file(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(&self.inner.snapshot()?)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        self.dirty.store(false, Ordering::Release);
        Ok(())
    }

    fn mutated(&self) -> Result<(), StoreError> {
        self.dirty.store(true, Ordering::Release);
        if self.write_through {
            self.write_file()?;
        }
        Ok(())
    }
}

impl DocumentStore for JsonFileStore {
    fn list(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        self.inner.list(collection)
    }

    fn add(&self, collection: Collection, fields: Fields) -> Result<String, StoreError> {
        let id = self.inner.add(collection, fields)?;
        self.mutated()?;
        Ok(id)
    }

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        self.inner.get(collection, id)
    }

    fn set(&self, collection: Collection, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.inner.set(collection, id, fields)?;
        self.mutated()
    }

    fn update(&self, collection: Collection, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.inner.update(collection, id, fields)?;
        self.mutated()
    }

    fn flush(&self) -> Result<(), StoreError> {
        if self.is_dirty() {
            logd!("Flushing store to {}", self.path.display());
            self.write_file()?;
        }
        Ok(())
    }
}
