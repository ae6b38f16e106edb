use thiserror::Error;

/// Errores del dominio de la aplicación
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entidad no encontrada: {0}")]
    NotFound(String),
    #[error("Validación fallida: {0}")]
    Validation(String),
    #[error(transparent)]
    Regression(#[from] reg_domain::DomainError),
    #[error(transparent)]
    Policy(#[from] reg_policies::PolicyError),
}
