//! regflow
//!
//! Librería raíz del workspace:
//! - `errors`: errores de núcleo y dominio para aplicaciones.
//! - `config`: configuración global cargada del entorno.
//! - `walkthrough`: el recorrido de ajuste de hiperparámetros de punta a punta.
//!
//! Los crates `reg-*` contienen el engine, el dominio y la persistencia.

pub mod config;
pub mod errors;
pub mod walkthrough;

pub use walkthrough::{WalkthroughConfig, WalkthroughReport, WalkthroughStep};

#[cfg(test)]
mod tests {
    use super::errors::{core_error::CoreError, domain_error::DomainError};

    #[test]
    fn core_error_tests() {
        let c = CoreError::Config("fallo".into()).to_string();
        assert_eq!(c, "Error de configuración: fallo");
    }

    #[test]
    fn domain_error_tests() {
        let d = DomainError::Validation("x".into()).to_string();
        assert_eq!(d, "Validación fallida: x");
    }
}
