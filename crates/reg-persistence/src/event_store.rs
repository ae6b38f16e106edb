//! `EventStore` sobre un archivo JSON Lines append-only.
//!
//! Cada línea es un `RunEvent` completo. Las líneas ilegibles (p. ej. una
//! escritura interrumpida) se descartan con un warning al leer.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use log::{debug, warn};
use reg_core::errors::CoreEngineError;
use reg_core::event::{EventStore, RunEvent, RunEventKind};
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::fs::{read_optional, with_retry};

#[derive(Debug)]
pub struct FileEventStore {
    path: PathBuf,
    retries: u32,
}

impl FileEventStore {
    pub fn new(path: impl Into<PathBuf>, retries: u32) -> Self {
        Self { path: path.into(),
               retries }
    }

    fn read_all(&self) -> Result<Vec<RunEvent>, PersistenceError> {
        let Some(bytes) = with_retry(self.retries, || read_optional(&self.path))? else {
            return Ok(Vec::new());
        };
        let text = String::from_utf8_lossy(&bytes);
        let events = text.lines()
                         .enumerate()
                         .filter(|(_, l)| !l.trim().is_empty())
                         .filter_map(|(i, line)| match serde_json::from_str::<RunEvent>(line) {
                             Ok(ev) => Some(ev),
                             Err(e) => {
                                 warn!("skipping unreadable event at {}:{}: {e}", self.path.display(), i + 1);
                                 None
                             }
                         })
                         .collect();
        Ok(events)
    }

    fn append_line(&self, line: &str) -> Result<(), PersistenceError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let needs_newline = std::fs::read(&self.path).ok()
                                                     .and_then(|b| b.last().copied())
                                                     .is_some_and(|c| c != b'\n');
        let mut f = OpenOptions::new().create(true).append(true).open(&self.path)?;
        if needs_newline {
            f.write_all(b"\n")?;
        }
        f.write_all(line.as_bytes())?;
        f.write_all(b"\n")?;
        f.sync_data()?;
        Ok(())
    }
}

impl EventStore for FileEventStore {
    fn append_kind(&mut self, invocation: Uuid, kind: RunEventKind) -> Result<RunEvent, CoreEngineError> {
        let seq = self.read_all()?.last().map(|e| e.seq + 1).unwrap_or(0);
        let ev = RunEvent { seq,
                            invocation,
                            kind,
                            ts: Utc::now() };
        let line = serde_json::to_string(&ev)?;
        with_retry(self.retries, || self.append_line(&line))?;
        debug!("event {seq} appended ({invocation})");
        Ok(ev)
    }

    fn list(&self) -> Result<Vec<RunEvent>, CoreEngineError> {
        Ok(self.read_all()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_survive_reopen_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let inv = Uuid::new_v4();
        {
            let mut store = FileEventStore::new(&path, 3);
            store.append_kind(inv, RunEventKind::StageStarted { stage: "train".into() })
                 .unwrap();
            store.append_kind(inv,
                             RunEventKind::StageFailed { stage: "train".into(),
                                                         error: CoreEngineError::QueueEmpty })
                 .unwrap();
        }
        let store = FileEventStore::new(&path, 3);
        let events = store.list().unwrap();
        assert_eq!(events.iter().map(|e| e.seq).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(store.list_for(inv).unwrap().len(), 2);
        assert_eq!(store.list_for(Uuid::new_v4()).unwrap().len(), 0);
    }

    #[test]
    fn truncated_tail_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let mut store = FileEventStore::new(&path, 3);
        store.append_kind(Uuid::new_v4(), RunEventKind::StageStarted { stage: "train".into() })
             .unwrap();
        let mut f = OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(b"{\"seq\":1,\"invo").unwrap();
        assert_eq!(store.list().unwrap().len(), 1);

        let ev = store.append_kind(Uuid::new_v4(), RunEventKind::StageStarted { stage: "train".into() })
                      .unwrap();
        assert_eq!(ev.seq, 1);
        assert_eq!(store.list().unwrap().len(), 2);
    }
}
