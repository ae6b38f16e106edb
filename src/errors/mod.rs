pub mod core_error;
pub mod domain_error;

pub use core_error::CoreError;
pub use domain_error::DomainError;

/// Error de la walkthrough: infraestructura o dominio.
#[derive(Debug, thiserror::Error)]
pub enum WalkthroughError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<reg_core::CoreEngineError> for WalkthroughError {
    fn from(e: reg_core::CoreEngineError) -> Self {
        WalkthroughError::Core(e.into())
    }
}

impl From<reg_persistence::PersistenceError> for WalkthroughError {
    fn from(e: reg_persistence::PersistenceError) -> Self {
        WalkthroughError::Core(e.into())
    }
}

impl From<reg_domain::DomainError> for WalkthroughError {
    fn from(e: reg_domain::DomainError) -> Self {
        WalkthroughError::Domain(e.into())
    }
}

impl From<reg_policies::PolicyError> for WalkthroughError {
    fn from(e: reg_policies::PolicyError) -> Self {
        WalkthroughError::Domain(e.into())
    }
}
