//! Recorrido del notebook de ajuste de hiperparámetros, sobre un workspace
//! en disco:
//!
//! 1. baseline con los parámetros por defecto;
//! 2. barrido de `alpha` (`1` a `0`, con `l1_ratio=0.5`) mediante overrides
//!    sobre el workspace;
//! 3. barrido de `l1_ratio` con `alpha` fijo, encolado y ejecutado por el
//!    pool de workers;
//! 4. selección del mejor run por `r2` y `apply` sobre el workspace.

use std::path::Path;
use std::sync::Arc;

use reg_adapters::dataset::{synthetic_dataset, to_delimited, SYNTHETIC_ROWS};
use reg_adapters::{default_train_declaration, TrainOptions, TrainStage, DEFAULT_DATASET};
use reg_core::{RunOptions, RunOutcome, RunRecord, Workspace};
use reg_domain::{ElasticNetParams, R2};
use reg_persistence::{open_engine, FileEngine, LedgerConfig};
use reg_policies::{BestMetricPolicy, RunSelectionPolicy, SelectionParams};

use crate::errors::{CoreError, DomainError, WalkthroughError};

#[derive(Debug, Clone)]
pub struct WalkthroughConfig {
    pub ledger: LedgerConfig,
    pub data_seed: u64,
    pub alphas: Vec<f64>,
    /// `alpha` fijo del barrido de `l1_ratio`.
    pub sweep_alpha: f64,
    pub l1_ratios: Vec<f64>,
}

impl Default for WalkthroughConfig {
    fn default() -> Self {
        Self { ledger: LedgerConfig::default(),
               data_seed: 0,
               alphas: vec![1.0, 0.1, 0.01, 0.001, 0.0001, 0.0],
               sweep_alpha: 0.001,
               l1_ratios: vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0] }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalkthroughStep {
    pub label: String,
    pub run_id: String,
    pub r2: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalkthroughReport {
    pub steps: Vec<WalkthroughStep>,
    pub best: WalkthroughStep,
}

fn step(label: impl Into<String>, rec: &RunRecord) -> Result<WalkthroughStep, WalkthroughError> {
    let r2 = rec.metric(R2)
                .ok_or_else(|| DomainError::NotFound(format!("metric r2 in {}", rec.id)))?;
    Ok(WalkthroughStep { label: label.into(),
                         run_id: rec.id.clone(),
                         r2 })
}

fn executed(outcome: RunOutcome) -> Result<RunRecord, WalkthroughError> {
    match outcome {
        RunOutcome::Executed(rec) => Ok(rec),
        RunOutcome::UpToDate { stage, .. } => Err(DomainError::Validation(format!("stage '{stage}' was expected to run")).into()),
    }
}

/// Crea `dir` si hace falta y lo prepara con params por defecto y el
/// dataset sintético.
pub fn prepare(dir: &Path, cfg: &WalkthroughConfig) -> Result<FileEngine, WalkthroughError> {
    std::fs::create_dir_all(dir).map_err(CoreError::from)?;
    let stage = TrainStage::new(default_train_declaration(), TrainOptions::default())?;
    let mut engine = open_engine(dir, &cfg.ledger)?.with_stage(Arc::new(stage))?;
    let params = ElasticNetParams::default_set().to_yaml_string()?;
    let data = to_delimited(&synthetic_dataset(SYNTHETIC_ROWS, cfg.data_seed)?);
    let ws = engine.workspace_mut();
    ws.write("params.yaml", params.as_bytes())?;
    ws.write(DEFAULT_DATASET, data.as_bytes())?;
    Ok(engine)
}

pub fn run(dir: &Path, cfg: &WalkthroughConfig) -> Result<WalkthroughReport, WalkthroughError> {
    let mut engine = prepare(dir, cfg)?;
    let mut steps = Vec::new();

    let baseline = executed(engine.reproduce(None,
                                             &RunOptions { name: Some("baseline".into()),
                                                           force: false })?)?;
    steps.push(step("defaults", &baseline)?);
    log::info!("baseline r2 = {:.6}", steps[0].r2);

    // `alpha=1` coincide con el baseline: sin `force` quedaría al día.
    for alpha in &cfg.alphas {
        let label = format!("alpha={alpha}");
        let opts = RunOptions { name: Some(label.clone()),
                                force: true };
        let rec = executed(engine.run_with_overrides(None, &[label.clone(), "l1_ratio=0.5".into()], &opts)?)?;
        steps.push(step(label, &rec)?);
    }

    let sweep_alpha = cfg.sweep_alpha.to_string();
    for l1 in &cfg.l1_ratios {
        engine.queue(None,
                     &[format!("alpha={sweep_alpha}"), format!("l1_ratio={l1}")],
                     Some(format!("l1_ratio={l1}")))?;
    }
    let results = engine.run_all(cfg.ledger.jobs)?;
    let mut swept: Vec<RunRecord> = Vec::with_capacity(results.len());
    for res in results.into_values() {
        swept.push(res?);
    }
    swept.sort_by(|a, b| a.name.cmp(&b.name));
    for rec in &swept {
        steps.push(step(rec.name.clone().unwrap_or_default(), rec)?);
    }

    let decision = BestMetricPolicy::new().choose(&engine.list()?, &SelectionParams::default())?;
    let applied = engine.apply(&decision.selected_id, true)?;
    log::info!("best run {} (r2 = {:.6}) applied to the workspace", applied.id, decision.value);
    let label = applied.name.clone().unwrap_or_else(|| applied.id.clone());
    Ok(WalkthroughReport { steps,
                           best: step(label, &applied)? })
}
