//! `StageEngine`: orquesta detección de cambios, ejecución y registro.
//!
//! Cada operación pública genera un `invocation` nuevo y deja sus eventos en
//! el `EventStore`. El lock vigente se obtiene siempre por replay.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::execute::{build_record, current_state, evaluate, execute_stage, StageExecution};
use super::queue::QueueStore;
use super::show::ShowRow;
use crate::errors::CoreEngineError;
use crate::event::{EventStore, RunEventKind};
use crate::injection::{CompositeInjector, OverrideInjector};
use crate::ledger::{RunLedger, RunRecord};
use crate::model::{ChangeReason, DependencyStatus, ExecutionContext, QueueEntry};
use crate::repo::{InMemoryLockRepository, LockRepository, StageState};
use crate::stage::{StageDeclaration, StageDefinition};
use crate::workspace::{load_metrics, load_params, params_subset, store_params, Workspace};

/// Resultado de `reproduce`.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Nada cambió y los outputs están presentes.
    UpToDate { stage: String, fingerprint: String },
    Executed(RunRecord),
}

impl RunOutcome {
    pub fn record(&self) -> Option<&RunRecord> {
        match self {
            RunOutcome::Executed(r) => Some(r),
            RunOutcome::UpToDate { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub name: Option<String>,
    /// Ejecuta aunque no haya cambios.
    pub force: bool,
}

pub struct StageEngine<W, E, L, Q>
    where W: Workspace,
          E: EventStore,
          L: RunLedger,
          Q: QueueStore
{
    workspace: W,
    events: E,
    ledger: L,
    queue: Q,
    repository: InMemoryLockRepository,
    stages: IndexMap<String, Arc<dyn StageDefinition>>,
}

impl<W, E, L, Q> std::fmt::Debug for StageEngine<W, E, L, Q>
    where W: Workspace,
          E: EventStore,
          L: RunLedger,
          Q: QueueStore
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageEngine")
            .field("stages", &self.stages.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<W, E, L, Q> StageEngine<W, E, L, Q>
    where W: Workspace,
          E: EventStore,
          L: RunLedger,
          Q: QueueStore
{
    pub fn new(workspace: W, events: E, ledger: L, queue: Q) -> Self {
        Self { workspace,
               events,
               ledger,
               queue,
               repository: InMemoryLockRepository::new(),
               stages: IndexMap::new() }
    }

    /// Registra un stage. La declaración se valida aquí.
    pub fn register_stage(&mut self, stage: Arc<dyn StageDefinition>) -> Result<(), CoreEngineError> {
        stage.declaration().validate()?;
        self.stages.insert(stage.name().to_string(), stage);
        Ok(())
    }

    pub fn with_stage(mut self, stage: Arc<dyn StageDefinition>) -> Result<Self, CoreEngineError> {
        self.register_stage(stage)?;
        Ok(self)
    }

    pub fn workspace(&self) -> &W {
        &self.workspace
    }

    pub fn workspace_mut(&mut self) -> &mut W {
        &mut self.workspace
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn queue_store(&self) -> &Q {
        &self.queue
    }

    pub fn queue_store_mut(&mut self) -> &mut Q {
        &mut self.queue
    }

    /// Stage por nombre; sin nombre, el primero registrado.
    pub fn stage(&self, name: Option<&str>) -> Result<Arc<dyn StageDefinition>, CoreEngineError> {
        let found = match name {
            Some(n) => self.stages.get(n),
            None => self.stages.values().next(),
        };
        found.cloned().ok_or_else(|| {
                           CoreEngineError::InvalidDeclaration(match name {
                                                                   Some(n) => format!("unknown stage '{n}'"),
                                                                   None => "no stages registered".to_string(),
                                                               })
                       })
    }

    pub fn declaration(&self, name: Option<&str>) -> Result<StageDeclaration, CoreEngineError> {
        Ok(self.stage(name)?.declaration().clone())
    }

    /// Estado reconstruido por replay.
    pub fn state(&self, stage: &str) -> Result<StageState, CoreEngineError> {
        let events = self.events.list()?;
        Ok(self.repository.load(stage, &events))
    }

    /// Compara params, deps, comando y outputs actuales contra el lock
    /// vigente del stage.
    pub fn evaluate_dependencies(&self, stage: Option<&str>) -> Result<DependencyStatus, CoreEngineError> {
        let def = self.stage(stage)?;
        let decl = def.declaration();
        let lock = self.state(&decl.name)?.lock;
        evaluate(decl, &self.workspace, lock)
    }

    /// Ejecuta el stage en el workspace vivo y avanza el lock si terminó
    /// bien. Un fallo queda registrado como `StageFailed` y el lock previo
    /// sigue vigente.
    pub fn execute(&mut self, stage: Option<&str>) -> Result<StageExecution, CoreEngineError> {
        self.execute_in(Uuid::new_v4(), stage)
    }

    fn execute_in(&mut self, invocation: Uuid, stage: Option<&str>) -> Result<StageExecution, CoreEngineError> {
        let def = self.stage(stage)?;
        let name = def.name().to_string();
        self.events
            .append_kind(invocation, RunEventKind::StageStarted { stage: name.clone() })?;
        match execute_stage(def.as_ref(), &mut self.workspace) {
            Ok(exec) => {
                self.events
                    .append_kind(invocation, RunEventKind::StageFinished { lock: exec.lock.clone() })?;
                Ok(exec)
            }
            Err(error) => {
                log::warn!("stage '{name}' failed: {error}");
                self.events.append_kind(invocation,
                                        RunEventKind::StageFailed { stage: name,
                                                                    error: error.clone() })?;
                Err(error)
            }
        }
    }

    /// Persiste un run en el ledger.
    pub fn record(&mut self, exec: &StageExecution, name: Option<String>) -> Result<RunRecord, CoreEngineError> {
        self.record_in(Uuid::new_v4(), exec, name)
    }

    fn record_in(&mut self, invocation: Uuid, exec: &StageExecution, name: Option<String>) -> Result<RunRecord, CoreEngineError> {
        let rec = build_record(exec, name, None);
        self.ledger.record(&rec, &exec.blobs)?;
        self.events.append_kind(invocation,
                                RunEventKind::RunRecorded { stage: rec.stage.clone(),
                                                            run_id: rec.id.clone() })?;
        Ok(rec)
    }

    /// Detección + ejecución + registro.
    pub fn reproduce(&mut self, stage: Option<&str>, opts: &RunOptions) -> Result<RunOutcome, CoreEngineError> {
        let invocation = Uuid::new_v4();
        let status = self.evaluate_dependencies(stage)?;
        let name = self.stage(stage)?.name().to_string();
        if !status.changed && !opts.force {
            let fingerprint = status.previous.map(|l| l.fingerprint).unwrap_or_default();
            log::info!("stage '{name}' didn't change, skipping");
            self.events.append_kind(invocation,
                                    RunEventKind::StageSkipped { stage: name.clone(),
                                                                 fingerprint: fingerprint.clone() })?;
            return Ok(RunOutcome::UpToDate { stage: name, fingerprint });
        }
        for reason in &status.reasons {
            log::info!("stage '{name}': {reason}");
        }
        let exec = self.execute_in(invocation, Some(&name))?;
        let rec = self.record_in(invocation, &exec, opts.name.clone())?;
        log::info!("recorded {} for stage '{name}'", rec.id);
        Ok(RunOutcome::Executed(rec))
    }

    /// Valida y escribe overrides en el archivo de parámetros. Una clave
    /// desconocida aborta antes de tocar nada.
    pub fn apply_overrides(&mut self, stage: Option<&str>, overrides: &[String]) -> Result<Map<String, Value>, CoreEngineError> {
        let decl = self.declaration(stage)?;
        let injector = OverrideInjector::parse(&decl.params, overrides)?;
        inject_params(&mut self.workspace, &decl, injector)
    }

    /// `apply_overrides` seguido de `reproduce`.
    pub fn run_with_overrides(&mut self,
                              stage: Option<&str>,
                              overrides: &[String],
                              opts: &RunOptions)
                              -> Result<RunOutcome, CoreEngineError> {
        if !overrides.is_empty() {
            self.apply_overrides(stage, overrides)?;
        }
        self.reproduce(stage, opts)
    }

    pub fn list(&self) -> Result<Vec<RunRecord>, CoreEngineError> {
        self.ledger.list()
    }

    /// Fila `workspace` seguida de los runs del stage (más reciente primero)
    /// y de las entradas encoladas.
    pub fn show(&self, stage: Option<&str>) -> Result<Vec<ShowRow>, CoreEngineError> {
        let decl = self.declaration(stage)?;
        let status = self.evaluate_dependencies(Some(&decl.name))?;
        let cur = current_state(&decl, &self.workspace)?;
        let metrics = load_metrics(&self.workspace, &decl.metrics)?;
        let mut rows = vec![ShowRow::workspace(&decl.name, cur.params.clone(), metrics, status.changed)];
        rows.extend(self.ledger
                        .list()?
                        .iter()
                        .filter(|r| r.stage == decl.name)
                        .map(ShowRow::from));
        for entry in self.queue.list()?.iter().filter(|e| e.stage == decl.name) {
            let mut params = cur.params.clone();
            params.extend(entry.overrides.clone());
            rows.push(ShowRow::queued(entry, params));
        }
        Ok(rows)
    }

    /// Escribe en el workspace los params, métricas y outputs de `record` y
    /// fija su lock como base.
    pub fn restore(&mut self, record: &RunRecord) -> Result<(), CoreEngineError> {
        let decl = self.declaration(Some(&record.stage))?;
        let mut blobs = Vec::with_capacity(record.outputs.len());
        for (path, digest) in &record.outputs {
            let bytes = self.ledger
                            .blob(digest)?
                            .ok_or_else(|| CoreEngineError::Internal(format!("blob {digest} for '{path}' missing from ledger")))?;
            blobs.push((path, bytes));
        }
        let mut params = load_params(&self.workspace, &decl.params_file)?;
        params.extend(record.params.clone());
        store_params(&mut self.workspace, &decl.params_file, &params)?;
        for (path, bytes) in blobs {
            self.workspace.write(path, &bytes)?;
        }
        self.events.append_kind(Uuid::new_v4(),
                                RunEventKind::WorkspaceRestored { run_id: record.id.clone(),
                                                                  lock: record.lock.clone() })?;
        Ok(())
    }

    /// Resuelve `reference` y lo restaura. Sin `force` se niega si el
    /// workspace tiene cambios respecto al lock vigente.
    pub fn apply(&mut self, reference: &str, force: bool) -> Result<RunRecord, CoreEngineError> {
        let record = self.ledger.resolve(reference)?;
        if !force {
            let status = self.evaluate_dependencies(Some(&record.stage))?;
            let dirty: Vec<String> = status.reasons
                                           .iter()
                                           .filter(|r| **r != ChangeReason::NeverRun)
                                           .map(ToString::to_string)
                                           .collect();
            if !dirty.is_empty() {
                return Err(CoreEngineError::DirtyWorkspace(dirty.join(", ")));
            }
        }
        self.restore(&record)?;
        log::info!("workspace restored from {}", record.id);
        Ok(record)
    }

    /// Encola una variación validada.
    pub fn queue(&mut self, stage: Option<&str>, overrides: &[String], name: Option<String>) -> Result<QueueEntry, CoreEngineError> {
        let decl = self.declaration(stage)?;
        let injector = OverrideInjector::parse(&decl.params, overrides)?;
        let entry = QueueEntry::new(decl.name.clone(), injector.into_map(), name);
        self.queue.push(entry.clone())?;
        self.events
            .append_kind(Uuid::new_v4(), RunEventKind::RunQueued { entry: entry.clone() })?;
        Ok(entry)
    }

    /// Fork del workspace completo (sin los outputs declarados) con los
    /// overrides de `entry` aplicados. Si falla a mitad de camino el fork se
    /// descarta.
    fn prepare_fork(&self, entry: &QueueEntry) -> Result<(Arc<dyn StageDefinition>, W), CoreEngineError> {
        let stage = self.stage(Some(&entry.stage))?;
        let decl = stage.declaration();
        let injector = OverrideInjector::from_map(&decl.params, entry.overrides.clone())?;
        let exclude: Vec<String> = decl.produced_paths().cloned().collect();
        let mut fork = self.workspace.fork(&exclude)?;
        if let Err(e) = inject_params(&mut fork, decl, injector) {
            if let Err(cleanup) = fork.discard() {
                log::warn!("could not discard workspace for {}: {cleanup}", entry.id);
            }
            return Err(e);
        }
        Ok((stage, fork))
    }

    /// Drena la cola con `jobs` workers. Cada entrada corre en un fork del
    /// workspace; el workspace vivo y su lock no cambian. El resultado no
    /// tiene orden: se indexa por id de entrada. Una entrada cuyo fork no se
    /// pudo preparar vuelve a la cola y figura en el resultado con su error.
    pub fn run_all(&mut self, jobs: usize) -> Result<HashMap<Uuid, Result<RunRecord, CoreEngineError>>, CoreEngineError> {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs.max(1))
                                                  .build()
                                                  .map_err(|e| CoreEngineError::Internal(e.to_string()))?;
        let entries = self.queue.drain()?;
        if entries.is_empty() {
            return Err(CoreEngineError::QueueEmpty);
        }
        let results: DashMap<Uuid, Result<RunRecord, CoreEngineError>> = DashMap::new();
        let mut work = Vec::with_capacity(entries.len());
        let mut pending = Vec::new();
        for entry in entries {
            match self.prepare_fork(&entry) {
                Ok((stage, fork)) => work.push((entry, stage, fork)),
                Err(e) => {
                    log::warn!("queue entry {} could not be prepared, keeping it queued: {e}", entry.id);
                    results.insert(entry.id, Err(e));
                    pending.push(entry);
                }
            }
        }
        let kept: HashSet<Uuid> = pending.iter().map(|e| e.id).collect();
        if let Err(e) = pending.into_iter().try_for_each(|entry| self.queue.push(entry)) {
            for (entry, _, fork) in work {
                if let Err(cleanup) = fork.discard() {
                    log::warn!("could not discard workspace for {}: {cleanup}", entry.id);
                }
            }
            return Err(e);
        }

        let ledger = &self.ledger;
        pool.install(|| {
                work.into_par_iter().for_each(|(entry, stage, mut fork)| {
                                        let res = execute_stage(stage.as_ref(), &mut fork).and_then(|exec| {
                                                      let rec = build_record(&exec, entry.name.clone(), Some(entry.id));
                                                      ledger.record(&rec, &exec.blobs)?;
                                                      Ok(rec)
                                                  });
                                        if let Err(e) = fork.discard() {
                                            log::warn!("could not discard workspace for {}: {e}", entry.id);
                                        }
                                        results.insert(entry.id, res);
                                    })
            });

        let invocation = Uuid::new_v4();
        let results: HashMap<Uuid, Result<RunRecord, CoreEngineError>> = results.into_iter().collect();
        for (entry_id, res) in results.iter().filter(|(id, _)| !kept.contains(*id)) {
            let (run_id, error) = match res {
                Ok(rec) => (Some(rec.id.clone()), None),
                Err(e) => (None, Some(e.clone())),
            };
            self.events
                .append_kind(invocation, RunEventKind::QueueEntryFinished { entry_id: *entry_id, run_id, error })?;
        }
        Ok(results)
    }
}

fn inject_params<W: Workspace + ?Sized>(ws: &mut W,
                                        decl: &StageDeclaration,
                                        injector: OverrideInjector)
                                        -> Result<Map<String, Value>, CoreEngineError> {
    let base = load_params(ws, &decl.params_file)?;
    if injector.is_empty() {
        return Ok(base);
    }
    let ctx = ExecutionContext { stage: decl.name.clone(),
                                 params: Value::Object(params_subset(&base, &decl.params)),
                                 inputs: Default::default(),
                                 workdir: ws.root().map(|p| p.to_path_buf()) };
    let composite = CompositeInjector::with_injectors(vec![Box::new(injector)]);
    let merged = match composite.apply(&Value::Object(base), &ctx) {
        Value::Object(m) => m,
        other => return Err(CoreEngineError::Internal(format!("params merge produced {other}"))),
    };
    store_params(ws, &decl.params_file, &merged)?;
    Ok(merged)
}
