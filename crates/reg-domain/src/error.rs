use reg_engine::EngineError;
use thiserror::Error;

/// Error del dominio de entrenamiento.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("Error de validación: {0}")]
    ValidationError(String),

    #[error("Dataset inválido: {0}")]
    DatasetError(String),

    #[error("Formato de modelo inválido: {0}")]
    ModelFormatError(String),

    #[error("Error numérico: {0}")]
    ExternalError(String),

    #[error("Error de serialización: {0}")]
    SerializationError(String),
}

impl From<EngineError> for DomainError {
    fn from(e: EngineError) -> Self {
        DomainError::ExternalError(e.to_string())
    }
}

impl From<serde_yaml::Error> for DomainError {
    fn from(e: serde_yaml::Error) -> Self {
        DomainError::SerializationError(e.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::SerializationError(e.to_string())
    }
}
