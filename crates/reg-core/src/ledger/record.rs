use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::constants::RUN_ID_PREFIX;
use crate::hashing::{hash_str, short_hash};
use crate::model::StageLock;

/// Registro inmutable de un run exitoso.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunRecord {
    pub id: String,
    pub name: Option<String>,
    pub stage: String,
    pub fingerprint: String,
    pub lock: StageLock,
    /// Subconjunto declarado de parámetros usado por el run.
    pub params: Map<String, Value>,
    pub metrics: BTreeMap<String, f64>,
    /// path → digest de cada output (incluye archivos de métricas).
    pub outputs: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub queue_entry: Option<Uuid>,
}

impl RunRecord {
    pub fn metric(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).copied()
    }
}

/// Identificador corto `exp-xxxxxxx`.
///
/// Dos runs con el mismo fingerprint (por ejemplo alpha 1 → 0.1 → 1) reciben
/// ids distintos: el fingerprint se mezcla con un uuid aleatorio.
pub fn generate_run_id(fingerprint: &str) -> String {
    let digest = hash_str(&format!("{fingerprint}:{}", Uuid::new_v4()));
    format!("{RUN_ID_PREFIX}{}", short_hash(&digest))
}
