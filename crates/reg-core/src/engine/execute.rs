//! Funciones libres de ejecución, compartidas entre el workspace vivo y los
//! forks de `run_all`. No emiten eventos: eso queda a cargo del caller.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::CoreEngineError;
use crate::hashing::{hash_bytes, hash_str, hash_value};
use crate::ledger::{generate_run_id, RunRecord};
use crate::model::fingerprint::{dep_key, param_key, CMD_KEY};
use crate::model::{Artifact, ChangeReason, DependencyStatus, ExecutionContext, StageLock};
use crate::stage::{StageDeclaration, StageDefinition, StageRunResult};
use crate::workspace::{load_params, params_subset, parse_metrics, Workspace};

/// Digests actuales del workspace para una declaración.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentState {
    pub params: Map<String, Value>,
    pub deps: BTreeMap<String, Option<String>>,
    pub outs: BTreeMap<String, Option<String>>,
}

pub fn current_state<W: Workspace + ?Sized>(decl: &StageDeclaration, ws: &W) -> Result<CurrentState, CoreEngineError> {
    let all = load_params(ws, &decl.params_file)?;
    let mut deps = BTreeMap::new();
    deps.insert(CMD_KEY.to_string(), Some(hash_str(&decl.cmd)));
    for k in &decl.params {
        deps.insert(param_key(k), all.get(k).map(hash_value));
    }
    for d in &decl.deps {
        deps.insert(dep_key(d), ws.read(d)?.map(|b| hash_bytes(&b)));
    }
    let mut outs = BTreeMap::new();
    for p in decl.produced_paths() {
        outs.insert(p.clone(), ws.read(p)?.map(|b| hash_bytes(&b)));
    }
    Ok(CurrentState { params: params_subset(&all, &decl.params),
                      deps,
                      outs })
}

/// Compara el workspace contra el lock vigente.
pub fn evaluate<W: Workspace + ?Sized>(decl: &StageDeclaration,
                                       ws: &W,
                                       previous: Option<StageLock>)
                                       -> Result<DependencyStatus, CoreEngineError> {
    let cur = current_state(decl, ws)?;
    let reasons = match &previous {
        None => vec![ChangeReason::NeverRun],
        Some(lock) => lock.compare(&cur.deps, &cur.outs),
    };
    Ok(DependencyStatus { changed: !reasons.is_empty(),
                          reasons,
                          previous })
}

/// Resultado de una ejecución exitosa ya escrita en el workspace.
#[derive(Debug, Clone)]
pub struct StageExecution {
    pub lock: StageLock,
    pub params: Map<String, Value>,
    pub metrics: BTreeMap<String, f64>,
    /// digest → bytes de cada output, para el ledger.
    pub blobs: BTreeMap<String, Vec<u8>>,
}

/// Ejecuta el stage sobre `ws`. Los outputs se escriben sólo si el stage
/// terminó bien y produjo todos los archivos declarados.
pub fn execute_stage<W: Workspace + ?Sized>(stage: &dyn StageDefinition, ws: &mut W) -> Result<StageExecution, CoreEngineError> {
    let decl = stage.declaration();
    let state = current_state(decl, ws)?;

    let mut inputs = BTreeMap::new();
    for d in &decl.deps {
        let bytes = ws.read(d)?.ok_or_else(|| CoreEngineError::StageFailed { stage: decl.name.clone(),
                                                                                reason: format!("dependency '{d}' is missing") })?;
        inputs.insert(d.clone(), bytes);
    }
    let ctx = ExecutionContext { stage: decl.name.clone(),
                                 params: Value::Object(state.params.clone()),
                                 inputs,
                                 workdir: ws.root().map(Path::to_path_buf) };

    log::debug!("running stage '{}' ({})", decl.name, decl.cmd);
    let outputs = match stage.run(&ctx) {
        StageRunResult::Success { outputs } => outputs,
        StageRunResult::Failure { error } => return Err(error),
    };

    let mut by_path: BTreeMap<String, Artifact> = BTreeMap::new();
    for mut a in outputs {
        if !decl.produced_paths().any(|p| *p == a.path) {
            log::warn!("stage '{}' produced undeclared file '{}'; ignored", decl.name, a.path);
            continue;
        }
        a.hash = hash_bytes(&a.bytes);
        by_path.insert(a.path.clone(), a);
    }
    for p in decl.produced_paths() {
        if !by_path.contains_key(p) {
            return Err(CoreEngineError::MissingOutput { stage: decl.name.clone(),
                                                        path: p.clone() });
        }
    }

    let mut metrics = BTreeMap::new();
    for m in &decl.metrics {
        let parsed = by_path.get(m)
                            .map(|a| parse_metrics(&a.bytes))
                            .transpose()
                            .map_err(|e| CoreEngineError::StageFailed { stage: decl.name.clone(),
                                                                        reason: format!("invalid metrics file '{m}': {e}") })?;
        metrics.extend(parsed.unwrap_or_default());
    }

    let files: Vec<(&str, &[u8])> = by_path.values().map(|a| (a.path.as_str(), a.bytes.as_slice())).collect();
    ws.write_all(&files)?;

    let deps = state.deps
                    .into_iter()
                    .filter_map(|(k, v)| v.map(|d| (k, d)))
                    .collect();
    let outs = by_path.values().map(|a| (a.path.clone(), a.hash.clone())).collect();
    let blobs = by_path.into_values().map(|a| (a.hash, a.bytes)).collect();
    Ok(StageExecution { lock: StageLock::new(decl.name.clone(), deps, outs),
                        params: state.params,
                        metrics,
                        blobs })
}

pub fn build_record(exec: &StageExecution, name: Option<String>, queue_entry: Option<Uuid>) -> RunRecord {
    RunRecord { id: generate_run_id(&exec.lock.fingerprint),
                name,
                stage: exec.lock.stage.clone(),
                fingerprint: exec.lock.fingerprint.clone(),
                lock: exec.lock.clone(),
                params: exec.params.clone(),
                metrics: exec.metrics.clone(),
                outputs: exec.lock.outs.clone(),
                created_at: Utc::now(),
                queue_entry }
}
