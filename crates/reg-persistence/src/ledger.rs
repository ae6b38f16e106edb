//! `RunLedger` en disco: un JSON por run y blobs direccionados por digest.
//!
//! Orden de escritura: blobs primero, registro después (atómico). Un
//! registro visible nunca referencia un blob ausente.

use std::collections::BTreeMap;
use std::fs;

use log::{debug, warn};
use reg_core::errors::CoreEngineError;
use reg_core::ledger::{sort_most_recent_first, RunLedger, RunRecord};

use crate::error::PersistenceError;
use crate::fs::{atomic_write, read_optional, safe_join, with_retry};
use crate::layout::StoreLayout;

#[derive(Debug, Clone)]
pub struct FileRunLedger {
    layout: StoreLayout,
    retries: u32,
}

impl FileRunLedger {
    pub fn new(layout: StoreLayout, retries: u32) -> Self {
        Self { layout, retries }
    }

    fn record_path(&self, id: &str) -> Result<std::path::PathBuf, PersistenceError> {
        safe_join(&self.layout.runs(), &format!("{id}.json"))
    }

    fn write_blob(&self, digest: &str, bytes: &[u8]) -> Result<(), PersistenceError> {
        let path = self.layout.blob(digest);
        if path.is_file() {
            debug!("blob {digest} already cached");
            return Ok(());
        }
        with_retry(self.retries, || atomic_write(&path, bytes))
    }
}

impl RunLedger for FileRunLedger {
    fn record(&self, record: &RunRecord, blobs: &BTreeMap<String, Vec<u8>>) -> Result<(), CoreEngineError> {
        let path = self.record_path(&record.id)?;
        if path.exists() {
            return Err(CoreEngineError::Internal(format!("duplicate run id {}", record.id)));
        }
        for (digest, bytes) in blobs {
            self.write_blob(digest, bytes)?;
        }
        let json = serde_json::to_vec_pretty(record)?;
        with_retry(self.retries, || atomic_write(&path, &json))?;
        debug!("run {} recorded", record.id);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<RunRecord>, CoreEngineError> {
        let Ok(path) = self.record_path(id) else {
            return Ok(None);
        };
        match with_retry(self.retries, || read_optional(&path))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn list(&self) -> Result<Vec<RunRecord>, CoreEngineError> {
        let dir = self.layout.runs();
        let entries = match fs::read_dir(&dir) {
            Ok(it) => it,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut all = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = fs::read(&path)?;
            match serde_json::from_slice::<RunRecord>(&bytes) {
                Ok(r) => all.push(r),
                Err(e) => warn!("skipping unreadable run {}: {e}", path.display()),
            }
        }
        sort_most_recent_first(&mut all);
        Ok(all)
    }

    fn blob(&self, digest: &str) -> Result<Option<Vec<u8>>, CoreEngineError> {
        if digest.is_empty() || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(None);
        }
        Ok(with_retry(self.retries, || read_optional(&self.layout.blob(digest)))?)
    }
}
