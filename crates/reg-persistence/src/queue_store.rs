//! Cola persistida como un arreglo JSON reescrito atómicamente.

use std::path::PathBuf;

use reg_core::engine::QueueStore;
use reg_core::errors::CoreEngineError;
use reg_core::model::QueueEntry;

use crate::error::PersistenceError;
use crate::fs::{atomic_write, read_optional, with_retry};

#[derive(Debug)]
pub struct FileQueueStore {
    path: PathBuf,
    retries: u32,
}

impl FileQueueStore {
    pub fn new(path: impl Into<PathBuf>, retries: u32) -> Self {
        Self { path: path.into(),
               retries }
    }

    fn load(&self) -> Result<Vec<QueueEntry>, PersistenceError> {
        match with_retry(self.retries, || read_optional(&self.path))? {
            Some(b) if !b.is_empty() => Ok(serde_json::from_slice(&b)?),
            _ => Ok(Vec::new()),
        }
    }

    fn save(&self, entries: &[QueueEntry]) -> Result<(), PersistenceError> {
        let json = serde_json::to_vec_pretty(entries)?;
        with_retry(self.retries, || atomic_write(&self.path, &json))
    }
}

impl QueueStore for FileQueueStore {
    fn push(&mut self, entry: QueueEntry) -> Result<(), CoreEngineError> {
        let mut entries = self.load()?;
        entries.push(entry);
        Ok(self.save(&entries)?)
    }

    fn list(&self) -> Result<Vec<QueueEntry>, CoreEngineError> {
        Ok(self.load()?)
    }

    fn drain(&mut self) -> Result<Vec<QueueEntry>, CoreEngineError> {
        let entries = self.load()?;
        if !entries.is_empty() {
            self.save(&[])?;
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    #[test]
    fn push_list_drain_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queue.json");
        let mut q = FileQueueStore::new(&path, 3);
        assert!(q.list().unwrap().is_empty());

        let mut overrides = Map::new();
        overrides.insert("alpha".into(), json!(0.1));
        q.push(QueueEntry::new("train", overrides, Some("a".into()))).unwrap();
        q.push(QueueEntry::new("train", Map::new(), None)).unwrap();

        let reopened = FileQueueStore::new(&path, 3);
        let listed = reopened.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name.as_deref(), Some("a"));
        assert_eq!(listed[0].overrides["alpha"], json!(0.1));

        assert_eq!(q.drain().unwrap().len(), 2);
        assert!(q.list().unwrap().is_empty());
        q.push(QueueEntry::new("train", Map::new(), None)).unwrap();
        assert_eq!(q.clear().unwrap(), 1);
    }
}
