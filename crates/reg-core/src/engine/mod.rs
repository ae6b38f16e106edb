//! Motor de stages: detección de cambios, ejecución, registro, restauración
//! y cola de variaciones.

mod core;
mod execute;
mod queue;
mod show;

pub use self::core::{RunOptions, RunOutcome, StageEngine};
pub use execute::{build_record, current_state, evaluate, execute_stage, CurrentState, StageExecution};
pub use queue::{InMemoryQueueStore, QueueStore};
pub use show::ShowRow;
