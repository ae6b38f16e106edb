//! Configuración central de la walkthrough.
//! Carga variables de entorno (.env) una sola vez y expone `CONFIG`.
use once_cell::sync::Lazy;
use reg_persistence::LedgerConfig;
use std::env;

use crate::errors::CoreError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directorio de estado, workers y reintentos.
    pub ledger: LedgerConfig,
    /// Semilla del dataset sintético (`REGFLOW_DATA_SEED`, 0 por defecto).
    pub data_seed: u64,
}

impl AppConfig {
    /// Una semilla presente pero no numérica es un error de configuración.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
        where F: Fn(&str) -> Option<String>
    {
        let data_seed = match lookup("REGFLOW_DATA_SEED").filter(|v| !v.trim().is_empty()) {
            Some(v) => v.trim()
                        .parse()
                        .map_err(|_| CoreError::Config(format!("REGFLOW_DATA_SEED must be an unsigned integer, got '{v}'")))?,
            None => 0,
        };
        Ok(Self { ledger: LedgerConfig::from_lookup(&lookup),
                  data_seed })
    }
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<Result<AppConfig, CoreError>> = Lazy::new(|| {
    reg_persistence::init_dotenv();
    AppConfig::from_lookup(|k| env::var(k).ok())
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_defaults_to_zero() {
        let cfg = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.data_seed, 0);
        assert_eq!(cfg.ledger.jobs, LedgerConfig::default().jobs);
    }

    #[test]
    fn seed_and_ledger_are_read_from_the_lookup() {
        let cfg = AppConfig::from_lookup(|k| match k {
                      "REGFLOW_DATA_SEED" => Some(" 7 ".into()),
                      "REGFLOW_JOBS" => Some("3".into()),
                      _ => None,
                  }).unwrap();
        assert_eq!(cfg.data_seed, 7);
        assert_eq!(cfg.ledger.jobs, 3);
    }

    #[test]
    fn invalid_seed_is_a_config_error() {
        let err = AppConfig::from_lookup(|k| (k == "REGFLOW_DATA_SEED").then(|| "seven".to_string())).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
        assert!(err.to_string().contains("seven"));
    }
}
