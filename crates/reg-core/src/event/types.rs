//! Tipos de evento y estructura `RunEvent`.
//!
//! Rol:
//! - Cada invocación del `StageEngine` emite eventos a un `EventStore`
//!   append-only.
//! - El lock vigente de un stage no se guarda como archivo mutable: se
//!   reconstruye por replay (último `StageFinished` o `WorkspaceRestored`).
//! - `RunEventKind` es el contrato observable y estable del motor.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreEngineError;
use crate::model::{QueueEntry, StageLock};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum RunEventKind {
    /// El stage comenzó a ejecutarse en el workspace vivo.
    StageStarted { stage: String },
    /// Dependencias sin cambios y outputs presentes: no se ejecutó nada.
    StageSkipped { stage: String, fingerprint: String },
    /// Ejecución exitosa con outputs escritos. Avanza el lock.
    StageFinished { lock: StageLock },
    /// Ejecución fallida. El lock previo sigue vigente.
    StageFailed { stage: String, error: CoreEngineError },
    /// Se persistió un run en el ledger.
    RunRecorded { stage: String, run_id: String },
    /// Se encoló una variación de parámetros.
    RunQueued { entry: QueueEntry },
    /// Un worker de `run_all` terminó una entrada en su workspace aislado.
    /// No modifica el lock del workspace vivo.
    QueueEntryFinished {
        entry_id: Uuid,
        run_id: Option<String>,
        error: Option<CoreEngineError>,
    },
    /// Se restauró un run en el workspace vivo; su lock pasa a ser la base.
    WorkspaceRestored { run_id: String, lock: StageLock },
}

impl RunEventKind {
    /// Stage al que se refiere el evento, si aplica.
    pub fn stage(&self) -> Option<&str> {
        match self {
            RunEventKind::StageStarted { stage }
            | RunEventKind::StageSkipped { stage, .. }
            | RunEventKind::StageFailed { stage, .. }
            | RunEventKind::RunRecorded { stage, .. } => Some(stage),
            RunEventKind::StageFinished { lock } | RunEventKind::WorkspaceRestored { lock, .. } => Some(&lock.stage),
            RunEventKind::RunQueued { entry } => Some(&entry.stage),
            RunEventKind::QueueEntryFinished { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunEvent {
    pub seq: u64, // asignado por el store (orden append, global)
    pub invocation: Uuid,
    pub kind: RunEventKind,
    pub ts: DateTime<Utc>, // metadato (no entra en fingerprint)
}
