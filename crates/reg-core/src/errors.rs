//! Errores específicos del core.
//!
//! `CoreEngineError` es `Clone + Serialize` porque viaja dentro de los eventos
//! `StageFailed` y debe sobrevivir a un replay desde disco.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreEngineError {
    #[error("unknown parameter '{key}' (known: {})", known.join(", "))]
    UnknownParam { key: String, known: Vec<String> },
    #[error("invalid override '{0}': expected key=value")]
    InvalidOverride(String),
    #[error("invalid stage declaration: {0}")]
    InvalidDeclaration(String),
    #[error("stage '{stage}' failed: {reason}")]
    StageFailed { stage: String, reason: String },
    #[error("stage '{stage}' did not produce declared output '{path}'")]
    MissingOutput { stage: String, path: String },
    #[error("run not found: {0}")]
    RunNotFound(String),
    #[error("ambiguous run reference '{0}'")]
    AmbiguousRun(String),
    #[error("workspace has uncommitted changes ({0}); use force to overwrite")]
    DirtyWorkspace(String),
    #[error("queue is empty")]
    QueueEmpty,
    #[error("io: {0}")]
    Io(String),
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl From<std::io::Error> for CoreEngineError {
    fn from(e: std::io::Error) -> Self {
        CoreEngineError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CoreEngineError {
    fn from(e: serde_json::Error) -> Self {
        CoreEngineError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for CoreEngineError {
    fn from(e: serde_yaml::Error) -> Self {
        CoreEngineError::Serialization(e.to_string())
    }
}

/// Clasificación gruesa de errores, usada por la CLI para elegir código de
/// salida y por la persistencia para decidir reintentos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Error de uso o de datos de entrada; reintentar sin cambios no sirve.
    Validation,
    /// Fallo durante la ejecución del stage.
    Runtime,
    /// Fallo de IO que puede desaparecer al reintentar.
    Transient,
    /// Estado inconsistente o referencia inexistente.
    Permanent,
}

pub fn classify_error(e: &CoreEngineError) -> ErrorClass {
    match e {
        CoreEngineError::UnknownParam { .. }
        | CoreEngineError::InvalidOverride(_)
        | CoreEngineError::InvalidDeclaration(_)
        | CoreEngineError::AmbiguousRun(_) => ErrorClass::Validation,
        CoreEngineError::StageFailed { .. } | CoreEngineError::MissingOutput { .. } => ErrorClass::Runtime,
        CoreEngineError::Io(_) => ErrorClass::Transient,
        CoreEngineError::RunNotFound(_)
        | CoreEngineError::DirtyWorkspace(_)
        | CoreEngineError::QueueEmpty
        | CoreEngineError::Serialization(_)
        | CoreEngineError::Internal(_) => ErrorClass::Permanent,
    }
}
