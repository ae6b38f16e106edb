//! Ledger de runs: registros inmutables + blobs direccionados por contenido.

mod memory;
mod record;

pub use memory::InMemoryRunLedger;
pub use record::{generate_run_id, RunRecord};

use crate::errors::CoreEngineError;
use std::collections::BTreeMap;

/// Interfaz estrecha del ledger. `Send + Sync` porque los workers de
/// `run_all` registran en paralelo a través de `&self`.
pub trait RunLedger: Send + Sync {
    /// Persiste los blobs y luego el registro. Un registro nunca referencia un
    /// blob ausente.
    fn record(&self, record: &RunRecord, blobs: &BTreeMap<String, Vec<u8>>) -> Result<(), CoreEngineError>;

    fn get(&self, id: &str) -> Result<Option<RunRecord>, CoreEngineError>;

    /// Todos los registros, más reciente primero.
    fn list(&self) -> Result<Vec<RunRecord>, CoreEngineError>;

    fn blob(&self, digest: &str) -> Result<Option<Vec<u8>>, CoreEngineError>;

    /// Resuelve una referencia de usuario: id exacto, nombre o prefijo único
    /// de id (con o sin `exp-`).
    fn resolve(&self, reference: &str) -> Result<RunRecord, CoreEngineError> {
        if let Some(r) = self.get(reference)? {
            return Ok(r);
        }
        let all = self.list()?;
        let by_name: Vec<&RunRecord> = all.iter().filter(|r| r.name.as_deref() == Some(reference)).collect();
        match by_name.len() {
            1 => return Ok(by_name[0].clone()),
            n if n > 1 => return Err(CoreEngineError::AmbiguousRun(reference.to_string())),
            _ => {}
        }
        let by_prefix: Vec<&RunRecord> = all.iter()
                                            .filter(|r| {
                                                r.id.starts_with(reference)
                                                || r.id
                                                    .strip_prefix(crate::constants::RUN_ID_PREFIX)
                                                    .is_some_and(|short| short.starts_with(reference))
                                            })
                                            .collect();
        match by_prefix.len() {
            0 => Err(CoreEngineError::RunNotFound(reference.to_string())),
            1 => Ok(by_prefix[0].clone()),
            _ => Err(CoreEngineError::AmbiguousRun(reference.to_string())),
        }
    }
}

/// Orden canónico de `list`: más reciente primero, desempate por id.
pub fn sort_most_recent_first(records: &mut [RunRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
}
