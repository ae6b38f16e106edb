//! Configuración desde variables de entorno (y `.env` si existe).
//!
//! - `REGFLOW_DIR`: directorio de estado relativo a la raíz (`.regflow`).
//! - `REGFLOW_JOBS`: workers por defecto de `queue run` (1).
//! - `REGFLOW_RETRIES`: reintentos ante IO transitorio (3).

use std::env;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

pub const DEFAULT_STATE_DIR: &str = ".regflow";
pub const DEFAULT_JOBS: usize = 1;
pub const DEFAULT_RETRIES: u32 = 3;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub state_dir: String,
    pub jobs: usize,
    pub retries: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self { state_dir: DEFAULT_STATE_DIR.to_string(),
               jobs: DEFAULT_JOBS,
               retries: DEFAULT_RETRIES }
    }
}

impl LedgerConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables inyectable.
    /// Valores vacíos o inválidos caen al default.
    pub fn from_lookup<F>(lookup: F) -> Self
        where F: Fn(&str) -> Option<String>
    {
        let d = Self::default();
        let state_dir = lookup("REGFLOW_DIR").filter(|v| !v.trim().is_empty())
                                             .unwrap_or(d.state_dir);
        let jobs = lookup("REGFLOW_JOBS").and_then(|v| v.trim().parse().ok())
                                         .filter(|j: &usize| *j > 0)
                                         .unwrap_or(d.jobs);
        let retries = lookup("REGFLOW_RETRIES").and_then(|v| v.trim().parse().ok())
                                               .unwrap_or(d.retries);
        Self { state_dir, jobs, retries }
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_and_overrides() {
        let vars: HashMap<&str, &str> = [("REGFLOW_JOBS", "4"), ("REGFLOW_RETRIES", "x")].into_iter().collect();
        let cfg = LedgerConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.state_dir, ".regflow");
        assert_eq!(cfg.jobs, 4);
        assert_eq!(cfg.retries, 3);
    }

    #[test]
    fn zero_jobs_falls_back() {
        let cfg = LedgerConfig::from_lookup(|k| (k == "REGFLOW_JOBS").then(|| "0".to_string()));
        assert_eq!(cfg.jobs, 1);
    }
}
