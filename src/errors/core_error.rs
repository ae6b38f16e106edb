use reg_core::errors::CoreEngineError;
use reg_persistence::PersistenceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Error del engine: {0}")]
    Engine(#[from] CoreEngineError),
    #[error("Error de persistencia: {0}")]
    Persistence(#[from] PersistenceError),
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_config_variant_format() {
        let err = CoreError::Config("REGFLOW_DATA_SEED".into());
        assert_eq!(err.to_string(), "Error de configuración: REGFLOW_DATA_SEED");
    }

    #[test]
    fn test_io_variant_from() {
        let io_err = std::io::Error::other("falló IO");
        let err: CoreError = io_err.into();
        assert_eq!(err.to_string(), "Error en IO: falló IO");
    }

    #[test]
    fn test_engine_variant_from() {
        let err: CoreError = CoreEngineError::QueueEmpty.into();
        assert_eq!(err.to_string(), "Error del engine: queue is empty");
    }
}
