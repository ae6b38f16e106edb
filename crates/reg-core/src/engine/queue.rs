//! Cola de variaciones de parámetros pendientes de `run_all`.

use crate::errors::CoreEngineError;
use crate::model::QueueEntry;

pub trait QueueStore {
    fn push(&mut self, entry: QueueEntry) -> Result<(), CoreEngineError>;

    /// Entradas pendientes en orden de llegada.
    fn list(&self) -> Result<Vec<QueueEntry>, CoreEngineError>;

    /// Vacía la cola devolviendo las entradas.
    fn drain(&mut self) -> Result<Vec<QueueEntry>, CoreEngineError>;

    fn clear(&mut self) -> Result<usize, CoreEngineError> {
        Ok(self.drain()?.len())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryQueueStore {
    pub entries: Vec<QueueEntry>,
}

impl QueueStore for InMemoryQueueStore {
    fn push(&mut self, entry: QueueEntry) -> Result<(), CoreEngineError> {
        self.entries.push(entry);
        Ok(())
    }

    fn list(&self) -> Result<Vec<QueueEntry>, CoreEngineError> {
        Ok(self.entries.clone())
    }

    fn drain(&mut self) -> Result<Vec<QueueEntry>, CoreEngineError> {
        Ok(std::mem::take(&mut self.entries))
    }
}
