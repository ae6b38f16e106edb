use chrono::Utc;
use uuid::Uuid;

use super::{RunEvent, RunEventKind};
use crate::errors::CoreEngineError;

/// Almacenamiento de eventos append-only.
pub trait EventStore {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con
    /// seq y ts).
    fn append_kind(&mut self, invocation: Uuid, kind: RunEventKind) -> Result<RunEvent, CoreEngineError>;

    /// Lista todos los eventos en orden ascendente por seq.
    fn list(&self) -> Result<Vec<RunEvent>, CoreEngineError>;

    /// Eventos de una sola invocación.
    fn list_for(&self, invocation: Uuid) -> Result<Vec<RunEvent>, CoreEngineError> {
        Ok(self.list()?.into_iter().filter(|e| e.invocation == invocation).collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    pub inner: Vec<RunEvent>,
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, invocation: Uuid, kind: RunEventKind) -> Result<RunEvent, CoreEngineError> {
        let ev = RunEvent { seq: self.inner.len() as u64,
                            invocation,
                            kind,
                            ts: Utc::now() };
        self.inner.push(ev.clone());
        Ok(ev)
    }

    fn list(&self) -> Result<Vec<RunEvent>, CoreEngineError> {
        Ok(self.inner.clone())
    }
}
