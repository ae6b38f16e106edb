//! Errores de persistencia.
//! Mapea errores de IO / serde a variantes semánticas y luego al error del core.

use reg_core::errors::CoreEngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("corrupt file {path}: {reason}")]
    Corrupt { path: String, reason: String },
    #[error("incompatible state directory: {0}")]
    Incompatible(String),
    #[error("transient IO error (retryable): {0}")]
    TransientIo(String),
    #[error("io: {0}")]
    Io(String),
    #[error("serialization: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut => Self::TransientIo(err.to_string()),
            ErrorKind::NotFound => Self::NotFound(err.to_string()),
            ErrorKind::AlreadyExists => Self::AlreadyExists(err.to_string()),
            _ => Self::Io(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<PersistenceError> for CoreEngineError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::TransientIo(m) | PersistenceError::Io(m) => CoreEngineError::Io(m),
            PersistenceError::Serialization(m) => CoreEngineError::Serialization(m),
            other => CoreEngineError::Internal(other.to_string()),
        }
    }
}

pub(crate) fn is_retryable(e: &PersistenceError) -> bool {
    matches!(e, PersistenceError::TransientIo(_))
}
