//! Implementación de cada subcomando. Todo lo que se imprime pasa por `out`.

use std::io::Write;
use std::path::Path;

use reg_adapters::dataset::{synthetic_dataset, to_delimited, SYNTHETIC_ROWS};
use reg_adapters::{default_train_declaration, train_model, DelimitedDatasetReader, DEFAULT_DATASET};
use reg_core::engine::QueueStore;
use reg_core::stage::PipelineFile;
use reg_core::{CoreEngineError, RunOptions, RunOutcome, RunRecord, StageStatus};
use reg_domain::{ElasticNetParams, ParameterSet, R2};
use reg_persistence::fs::{atomic_write, atomic_write_all};
use reg_persistence::{open_engine, FileEngine, LedgerConfig};
use reg_policies::{BestMetricPolicy, Direction, RunSelectionPolicy, SelectionParams};

use crate::app::{self, PIPELINE_FILE};
use crate::cli::{RunArgs, TrainArgs};
use crate::error::CliError;
use crate::render::{format_metric, format_value, show_table};

fn write_new(dir: &Path, rel: &str, bytes: &[u8], force: bool, out: &mut dyn Write) -> Result<(), CliError> {
    let path = dir.join(rel);
    if path.exists() && !force {
        return Err(CliError::Usage(format!("{} already exists (use --force to overwrite)", path.display())));
    }
    atomic_write(&path, bytes)?;
    writeln!(out, "wrote {rel}")?;
    Ok(())
}

pub fn init(dir: &Path, cfg: &LedgerConfig, synthetic: bool, force: bool, out: &mut dyn Write) -> Result<(), CliError> {
    let params = ElasticNetParams::default_set().to_yaml_string()?;
    let pipeline = PipelineFile::single(default_train_declaration()).to_yaml_string()?;
    write_new(dir, "params.yaml", params.as_bytes(), force, out)?;
    write_new(dir, PIPELINE_FILE, pipeline.as_bytes(), force, out)?;
    if synthetic {
        let data = to_delimited(&synthetic_dataset(SYNTHETIC_ROWS, 0)?);
        write_new(dir, DEFAULT_DATASET, data.as_bytes(), force, out)?;
    }
    open_engine(dir, cfg)?;
    writeln!(out, "initialized {}", dir.join(&cfg.state_dir).display())?;
    Ok(())
}

/// Entrenamiento directo sobre archivos, sin engine ni ledger.
pub fn train(dir: &Path, args: &TrainArgs, out: &mut dyn Write) -> Result<(), CliError> {
    let params_path = dir.join(&args.params);
    let text = std::fs::read_to_string(&params_path).map_err(|e| CliError::file(params_path.display(), e))?;
    let params = ElasticNetParams::from_set(&ParameterSet::from_yaml_str(&text)?)?;
    let data_path = dir.join(&args.dataset);
    let bytes = std::fs::read(&data_path).map_err(|e| CliError::file(data_path.display(), e))?;
    let dataset = DelimitedDatasetReader::new().standardize(args.standardize)
                                               .read(&bytes)?;
    let trained = train_model(&params, &dataset, &args.options())?;
    let model = trained.model.to_bytes();
    let metrics = trained.metrics.to_yaml_string()?;
    atomic_write_all(&[(dir.join(&args.model), model.as_slice()), (dir.join(&args.metrics), metrics.as_bytes())])?;
    if !trained.model.converged {
        log::warn!("solver stopped after {} iterations without converging", trained.model.n_iter);
    }
    writeln!(out,
             "r2: {} ({} train / {} test rows)",
             trained.metrics.get(R2).map(format_metric).unwrap_or_default(),
             trained.n_train,
             trained.n_test)?;
    Ok(())
}

fn describe(rec: &RunRecord) -> String {
    let metrics: Vec<String> = rec.metrics.iter().map(|(k, v)| format!("{k}={}", format_metric(*v))).collect();
    let name = rec.name.as_deref().map(|n| format!(" ({n})")).unwrap_or_default();
    format!("{}{name} {}", rec.id, metrics.join(" "))
}

pub fn run(dir: &Path, cfg: &LedgerConfig, args: &RunArgs, out: &mut dyn Write) -> Result<(), CliError> {
    let mut engine = app::open(dir, cfg)?;
    let stage = args.stage.as_deref();
    if args.queue {
        let entry = engine.queue(stage, &args.set, args.name.clone())?;
        let overrides: Vec<String> = entry.overrides.iter().map(|(k, v)| format!("{k}={}", format_value(v))).collect();
        writeln!(out, "queued {} [{}]", entry.id, overrides.join(", "))?;
        if !args.run_all {
            return Ok(());
        }
    } else if args.run_all && !args.set.is_empty() {
        return Err(CliError::Usage("overrides with --run-all need --queue".into()));
    }
    if args.run_all {
        return run_queue(&mut engine, args.jobs.unwrap_or(cfg.jobs), out);
    }

    let opts = RunOptions { name: args.name.clone(),
                            force: args.force };
    match engine.run_with_overrides(stage, &args.set, &opts)? {
        RunOutcome::UpToDate { stage, .. } => writeln!(out, "stage '{stage}' didn't change, skipping")?,
        RunOutcome::Executed(rec) => writeln!(out, "ran '{}': {}", rec.stage, describe(&rec))?,
    }
    Ok(())
}

fn run_queue(engine: &mut FileEngine, jobs: usize, out: &mut dyn Write) -> Result<(), CliError> {
    let results = match engine.run_all(jobs) {
        Err(CoreEngineError::QueueEmpty) => {
            writeln!(out, "queue is empty")?;
            return Ok(());
        }
        other => other?,
    };
    let mut ids: Vec<_> = results.keys().copied().collect();
    ids.sort();
    let mut failed = 0;
    for id in &ids {
        match &results[id] {
            Ok(rec) => writeln!(out, "{id}: {}", describe(rec))?,
            Err(e) => {
                failed += 1;
                writeln!(out, "{id}: failed: {e}")?;
            }
        }
    }
    if failed > 0 {
        return Err(CliError::QueueFailures { failed,
                                             total: ids.len() });
    }
    Ok(())
}

pub fn status(dir: &Path, cfg: &LedgerConfig, stage: Option<&str>, out: &mut dyn Write) -> Result<(), CliError> {
    let engine = app::open(dir, cfg)?;
    let decl = engine.declaration(stage)?;
    let status = engine.evaluate_dependencies(Some(&decl.name))?;
    if status.changed {
        writeln!(out, "{}:", decl.name)?;
        for reason in &status.reasons {
            writeln!(out, "  {reason}")?;
        }
    } else {
        writeln!(out, "stage '{}' is up to date", decl.name)?;
    }
    let state = engine.state(&decl.name)?;
    if state.status == StageStatus::Failed {
        if let Some(e) = &state.last_error {
            writeln!(out, "last execution failed: {e}")?;
        }
    }
    Ok(())
}

pub fn show(dir: &Path,
            cfg: &LedgerConfig,
            stage: Option<&str>,
            json: bool,
            sort_by: Option<&str>,
            out: &mut dyn Write)
            -> Result<(), CliError> {
    let engine = app::open(dir, cfg)?;
    let mut rows = engine.show(stage)?;
    if let Some(metric) = sort_by {
        let start = rows.iter().position(|r| !r.is_workspace()).unwrap_or(rows.len());
        let end = rows.iter().position(|r| r.queued).unwrap_or(rows.len()).max(start);
        rows[start..end].sort_by(|a, b| {
                            let key = |r: &reg_core::ShowRow| r.metrics.get(metric).copied().unwrap_or(f64::NEG_INFINITY);
                            key(b).total_cmp(&key(a))
                        });
    }
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&rows).map_err(CoreEngineError::from)?)?;
    } else {
        write!(out, "{}", show_table(&rows))?;
    }
    Ok(())
}

pub fn apply(dir: &Path, cfg: &LedgerConfig, id: &str, force: bool, out: &mut dyn Write) -> Result<(), CliError> {
    let mut engine = app::open(dir, cfg)?;
    let rec = engine.apply(id, force)?;
    writeln!(out, "applied {}", describe(&rec))?;
    Ok(())
}

pub fn queue(dir: &Path, cfg: &LedgerConfig, clear: bool, out: &mut dyn Write) -> Result<(), CliError> {
    let mut engine = app::open(dir, cfg)?;
    if clear {
        let n = engine.queue_store_mut().clear()?;
        writeln!(out, "removed {n} queued entries")?;
        return Ok(());
    }
    let entries = engine.queue_store().list()?;
    if entries.is_empty() {
        writeln!(out, "queue is empty")?;
    }
    for e in entries {
        let overrides: Vec<String> = e.overrides.iter().map(|(k, v)| format!("{k}={}", format_value(v))).collect();
        let name = e.name.as_deref().map(|n| format!(" ({n})")).unwrap_or_default();
        writeln!(out, "{}{name} {} [{}]", e.id, e.stage, overrides.join(", "))?;
    }
    Ok(())
}

pub fn best(dir: &Path, cfg: &LedgerConfig, metric: &str, lowest: bool, out: &mut dyn Write) -> Result<(), CliError> {
    let engine = app::open(dir, cfg)?;
    let runs = engine.list()?;
    let direction = if lowest { Direction::Lowest } else { Direction::Highest };
    let decision = BestMetricPolicy::new().choose(&runs, &SelectionParams::metric(metric, direction))?;
    writeln!(out, "{} {metric}={}", decision.selected_id, format_metric(decision.value))?;
    if let Some(rec) = runs.iter().find(|r| r.id == decision.selected_id) {
        for (k, v) in &rec.params {
            writeln!(out, "  {k}: {}", format_value(v))?;
        }
    }
    if decision.rationale.ties.len() > 1 {
        writeln!(out, "  tied with {}", decision.rationale.ties[1..].join(", "))?;
    }
    Ok(())
}
