//! Errores de la CLI y su código de salida.
//!
//! | código | significado |
//! |---|---|
//! | 0 | ok |
//! | 1 | fallo de stage / runtime |
//! | 2 | uso o validación |
//! | 3 | run no encontrado |
//! | 4 | rechazado (workspace con cambios) |

use std::process::ExitCode;

use reg_core::errors::{classify_error, CoreEngineError, ErrorClass};
use reg_domain::DomainError;
use reg_persistence::PersistenceError;
use reg_policies::PolicyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreEngineError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error("{0}")]
    Usage(String),
    #[error("{path}: {reason}")]
    File { path: String, reason: String },
    #[error("output: {0}")]
    Output(#[from] std::io::Error),
    #[error("{failed} of {total} queued runs failed")]
    QueueFailures { failed: usize, total: usize },
}

impl CliError {
    pub fn file(path: impl std::fmt::Display, e: impl std::fmt::Display) -> Self {
        CliError::File { path: path.to_string(),
                         reason: e.to_string() }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Core(CoreEngineError::RunNotFound(_)) => 3,
            CliError::Core(CoreEngineError::DirtyWorkspace(_)) => 4,
            CliError::Core(e) => match classify_error(e) {
                ErrorClass::Validation => 2,
                _ => 1,
            },
            CliError::Domain(DomainError::ValidationError(_)) | CliError::Usage(_) => 2,
            CliError::Policy(PolicyError::NoCandidates(_)) => 3,
            _ => 1,
        }
    }
}

impl From<CliError> for ExitCode {
    fn from(e: CliError) -> Self {
        ExitCode::from(e.exit_code())
    }
}
