//! Lock de un stage y comparación de digests.
//!
//! Claves de dependencia:
//! - `cmd`: digest del comando declarado.
//! - `param:<key>`: digest del JSON canónico del valor.
//! - `dep:<path>`: digest del contenido del archivo.
//!
//! Los outputs se guardan aparte (`outs`, por path).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::ENGINE_VERSION;
use crate::hashing::hash_value;

pub const CMD_KEY: &str = "cmd";
const PARAM_PREFIX: &str = "param:";
const DEP_PREFIX: &str = "dep:";

pub fn param_key(key: &str) -> String {
    format!("{PARAM_PREFIX}{key}")
}

pub fn dep_key(path: &str) -> String {
    format!("{DEP_PREFIX}{path}")
}

/// Insumos del fingerprint agregado, previo a canonicalizar.
#[derive(Serialize)]
pub struct StageFingerprintInput<'a> {
    pub engine_version: &'a str,
    pub stage: &'a str,
    pub deps: &'a BTreeMap<String, String>,
    pub outs: &'a BTreeMap<String, String>,
}

/// Estado de dependencias y outputs tras la última ejecución exitosa (o
/// restauración) de un stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageLock {
    pub stage: String,
    pub deps: BTreeMap<String, String>,
    pub outs: BTreeMap<String, String>,
    pub fingerprint: String,
}

impl StageLock {
    pub fn new(stage: impl Into<String>, deps: BTreeMap<String, String>, outs: BTreeMap<String, String>) -> Self {
        let stage = stage.into();
        let input = StageFingerprintInput { engine_version: ENGINE_VERSION,
                                            stage: &stage,
                                            deps: &deps,
                                            outs: &outs };
        // Serializar un struct de maps y strings no puede fallar.
        let fingerprint = serde_json::to_value(&input).map(|v| hash_value(&v)).unwrap_or_default();
        Self { stage,
               deps,
               outs,
               fingerprint }
    }

    /// Compara el estado actual contra este lock.
    ///
    /// `current_deps` y `current_outs` usan `None` para lo que no existe en el
    /// workspace (parámetro ausente, archivo borrado).
    pub fn compare(&self,
                   current_deps: &BTreeMap<String, Option<String>>,
                   current_outs: &BTreeMap<String, Option<String>>)
                   -> Vec<ChangeReason> {
        let mut reasons = Vec::new();
        for (key, digest) in current_deps {
            match (self.deps.get(key), digest) {
                (_, None) => reasons.push(ChangeReason::missing(key)),
                (None, Some(_)) => reasons.push(ChangeReason::DeclarationChanged(key.clone())),
                (Some(prev), Some(cur)) if prev != cur => reasons.push(ChangeReason::changed(key)),
                _ => {}
            }
        }
        for key in self.deps.keys() {
            if !current_deps.contains_key(key) {
                reasons.push(ChangeReason::DeclarationChanged(key.clone()));
            }
        }
        for (path, digest) in current_outs {
            match (self.outs.get(path), digest) {
                (_, None) => reasons.push(ChangeReason::OutputMissing(path.clone())),
                (None, Some(_)) => reasons.push(ChangeReason::DeclarationChanged(path.clone())),
                (Some(prev), Some(cur)) if prev != cur => reasons.push(ChangeReason::OutputModified(path.clone())),
                _ => {}
            }
        }
        reasons
    }
}

/// Motivo por el cual un stage debe re-ejecutarse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeReason {
    NeverRun,
    CommandChanged,
    ParamChanged(String),
    ParamMissing(String),
    DepChanged(String),
    DepMissing(String),
    OutputMissing(String),
    OutputModified(String),
    DeclarationChanged(String),
}

impl ChangeReason {
    fn changed(key: &str) -> Self {
        if let Some(k) = key.strip_prefix(PARAM_PREFIX) {
            ChangeReason::ParamChanged(k.to_string())
        } else if let Some(p) = key.strip_prefix(DEP_PREFIX) {
            ChangeReason::DepChanged(p.to_string())
        } else {
            ChangeReason::CommandChanged
        }
    }

    fn missing(key: &str) -> Self {
        if let Some(k) = key.strip_prefix(PARAM_PREFIX) {
            ChangeReason::ParamMissing(k.to_string())
        } else if let Some(p) = key.strip_prefix(DEP_PREFIX) {
            ChangeReason::DepMissing(p.to_string())
        } else {
            ChangeReason::CommandChanged
        }
    }
}

impl std::fmt::Display for ChangeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeReason::NeverRun => write!(f, "never run"),
            ChangeReason::CommandChanged => write!(f, "command changed"),
            ChangeReason::ParamChanged(k) => write!(f, "param '{k}' changed"),
            ChangeReason::ParamMissing(k) => write!(f, "param '{k}' missing"),
            ChangeReason::DepChanged(p) => write!(f, "dependency '{p}' changed"),
            ChangeReason::DepMissing(p) => write!(f, "dependency '{p}' missing"),
            ChangeReason::OutputMissing(p) => write!(f, "output '{p}' missing"),
            ChangeReason::OutputModified(p) => write!(f, "output '{p}' modified"),
            ChangeReason::DeclarationChanged(k) => write!(f, "declaration changed at '{k}'"),
        }
    }
}

/// Resultado de `evaluate_dependencies`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyStatus {
    pub changed: bool,
    pub reasons: Vec<ChangeReason>,
    /// Lock vigente contra el que se comparó, si existe.
    pub previous: Option<StageLock>,
}
