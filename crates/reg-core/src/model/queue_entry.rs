use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Variación de parámetros diferida hasta `run_all`.
///
/// `overrides` ya está validado contra la declaración del stage al momento
/// de encolar, de modo que el worker sólo tiene que aplicarlo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueEntry {
    pub id: Uuid,
    pub stage: String,
    pub overrides: Map<String, Value>,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl QueueEntry {
    pub fn new(stage: impl Into<String>, overrides: Map<String, Value>, name: Option<String>) -> Self {
        Self { id: Uuid::new_v4(),
               stage: stage.into(),
               overrides,
               name,
               created_at: Utc::now() }
    }
}
