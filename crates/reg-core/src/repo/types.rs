//! Reconstrucción del estado de un stage a partir del log de eventos.
//!
//! El repositorio aplica un replay lineal: consume eventos en orden y
//! actualiza un `StageState`. Sólo `StageFinished` y `WorkspaceRestored`
//! avanzan el lock; un fallo deja el lock anterior intacto, por lo que la
//! siguiente invocación vuelve a detectar cambios y reintenta.
use chrono::{DateTime, Utc};

use crate::errors::CoreEngineError;
use crate::event::{RunEvent, RunEventKind};
use crate::model::StageLock;
use crate::stage::StageStatus;

#[derive(Debug, Clone, PartialEq)]
pub struct StageState {
    pub stage: String,
    pub status: StageStatus,
    pub lock: Option<StageLock>,
    pub last_run_id: Option<String>,
    pub last_error: Option<CoreEngineError>,
    pub attempts: u32,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Trait para reconstruir (`replay`) el estado de un stage.
pub trait LockRepository {
    fn load(&self, stage: &str, events: &[RunEvent]) -> StageState;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct InMemoryLockRepository;

impl InMemoryLockRepository {
    pub fn new() -> Self {
        Self
    }
}

impl LockRepository for InMemoryLockRepository {
    fn load(&self, stage: &str, events: &[RunEvent]) -> StageState {
        let mut state = StageState { stage: stage.to_string(),
                                     status: StageStatus::Pending,
                                     lock: None,
                                     last_run_id: None,
                                     last_error: None,
                                     attempts: 0,
                                     updated_at: None };
        for ev in events.iter().filter(|e| e.kind.stage() == Some(stage)) {
            match &ev.kind {
                RunEventKind::StageStarted { .. } => {
                    state.status = StageStatus::Running;
                    state.attempts += 1;
                }
                RunEventKind::StageFinished { lock } => {
                    state.status = StageStatus::FinishedOk;
                    state.lock = Some(lock.clone());
                    state.last_error = None;
                }
                RunEventKind::StageFailed { error, .. } => {
                    state.status = StageStatus::Failed;
                    state.last_error = Some(error.clone());
                }
                RunEventKind::RunRecorded { run_id, .. } => state.last_run_id = Some(run_id.clone()),
                RunEventKind::WorkspaceRestored { run_id, lock } => {
                    state.status = StageStatus::FinishedOk;
                    state.lock = Some(lock.clone());
                    state.last_run_id = Some(run_id.clone());
                    state.last_error = None;
                }
                RunEventKind::StageSkipped { .. } | RunEventKind::RunQueued { .. } | RunEventKind::QueueEntryFinished { .. } => {
                    continue
                }
            }
            state.updated_at = Some(ev.ts);
        }
        state
    }
}
