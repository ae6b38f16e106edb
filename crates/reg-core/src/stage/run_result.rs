use crate::{errors::CoreEngineError, model::Artifact};

/// Resultado abstracto de ejecutar un stage.
#[derive(Debug)]
pub enum StageRunResult {
    Success { outputs: Vec<Artifact> },
    Failure { error: CoreEngineError },
}
