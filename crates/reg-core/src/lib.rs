//! reg-core: motor de stages reproducibles.
//!
//! Un stage declara params, dependencias, outputs y métricas. El motor
//! compara digests contra el último lock (reconstruido desde el log de
//! eventos), ejecuta sólo si algo cambió y registra cada run en un ledger
//! inmutable.
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod injection;
pub mod ledger;
pub mod model;
pub mod repo;
pub mod stage;
pub mod workspace;

pub use engine::{InMemoryQueueStore, QueueStore, RunOptions, RunOutcome, ShowRow, StageEngine, StageExecution};
pub use errors::{classify_error, CoreEngineError, ErrorClass};
pub use event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
pub use injection::{CompositeInjector, OverrideInjector, ParamInjector};
pub use ledger::{InMemoryRunLedger, RunLedger, RunRecord};
pub use model::{Artifact, ArtifactKind, ChangeReason, DependencyStatus, ExecutionContext, QueueEntry, StageLock};
pub use repo::{InMemoryLockRepository, LockRepository, StageState};
pub use stage::{PipelineFile, StageDeclaration, StageDefinition, StageRunResult, StageStatus};
pub use workspace::{InMemoryWorkspace, Workspace};

/// Engine completamente en memoria, usado por tests y demos.
pub type InMemoryEngine = StageEngine<InMemoryWorkspace, InMemoryEventStore, InMemoryRunLedger, InMemoryQueueStore>;

impl InMemoryEngine {
    pub fn in_memory(workspace: InMemoryWorkspace) -> Self {
        StageEngine::new(workspace,
                         InMemoryEventStore::default(),
                         InMemoryRunLedger::new(),
                         InMemoryQueueStore::default())
    }
}
