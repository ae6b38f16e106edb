use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::constants::WORKSPACE_ROW_ID;
use crate::ledger::RunRecord;
use crate::model::QueueEntry;

/// Fila de la tabla de `show`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShowRow {
    pub id: String,
    pub name: Option<String>,
    pub stage: String,
    pub params: Map<String, Value>,
    pub metrics: BTreeMap<String, f64>,
    pub fingerprint: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    /// Sólo la fila `workspace`: difiere del lock vigente.
    pub dirty: bool,
    pub queued: bool,
}

impl ShowRow {
    pub fn workspace(stage: &str, params: Map<String, Value>, metrics: BTreeMap<String, f64>, dirty: bool) -> Self {
        Self { id: WORKSPACE_ROW_ID.to_string(),
               name: None,
               stage: stage.to_string(),
               params,
               metrics,
               fingerprint: None,
               created_at: None,
               dirty,
               queued: false }
    }

    pub fn queued(entry: &QueueEntry, params: Map<String, Value>) -> Self {
        Self { id: entry.id.to_string(),
               name: entry.name.clone(),
               stage: entry.stage.clone(),
               params,
               metrics: BTreeMap::new(),
               fingerprint: None,
               created_at: Some(entry.created_at),
               dirty: false,
               queued: true }
    }

    pub fn is_workspace(&self) -> bool {
        self.id == WORKSPACE_ROW_ID
    }
}

impl From<&RunRecord> for ShowRow {
    fn from(r: &RunRecord) -> Self {
        Self { id: r.id.clone(),
               name: r.name.clone(),
               stage: r.stage.clone(),
               params: r.params.clone(),
               metrics: r.metrics.clone(),
               fingerprint: Some(r.fingerprint.clone()),
               created_at: Some(r.created_at),
               dirty: false,
               queued: false }
    }
}
