use std::sync::Arc;

use reg_core::{Artifact, ChangeReason, CoreEngineError, ExecutionContext, InMemoryEngine, InMemoryWorkspace, RunLedger,
               RunOptions, RunOutcome, StageDeclaration, StageDefinition, StageRunResult, StageStatus, Workspace};

/// Stage de prueba: score = alpha * bytes(data.txt).
pub struct ScoreStage {
    decl: StageDeclaration,
    skip_metrics: bool,
}

impl ScoreStage {
    pub fn new() -> Self {
        Self { decl: StageDeclaration::new("score", "score --data data.txt").with_params(["alpha", "mode"])
                                                                             .with_deps(["data.txt"])
                                                                             .with_outs(["model.bin"])
                                                                             .with_metrics(["metrics.yaml"]),
               skip_metrics: false }
    }
}

impl StageDefinition for ScoreStage {
    fn declaration(&self) -> &StageDeclaration {
        &self.decl
    }

    fn run(&self, ctx: &ExecutionContext) -> StageRunResult {
        let Some(alpha) = ctx.param("alpha").and_then(|v| v.as_f64()) else {
            return StageRunResult::Failure { error: CoreEngineError::StageFailed { stage: "score".into(),
                                                                                   reason: "alpha missing".into() } };
        };
        if alpha < 0.0 {
            return StageRunResult::Failure { error: CoreEngineError::StageFailed { stage: "score".into(),
                                                                                   reason: "alpha < 0".into() } };
        }
        let len = ctx.input("data.txt").map(|b| b.len()).unwrap_or(0) as f64;
        let mut outputs = vec![Artifact::output("model.bin", format!("{alpha}:{len}").into_bytes())];
        if !self.skip_metrics {
            outputs.push(Artifact::metrics("metrics.yaml", format!("score: {}\n", alpha * len).into_bytes()));
        }
        StageRunResult::Success { outputs }
    }
}

fn engine() -> InMemoryEngine {
    let ws = InMemoryWorkspace::new().with_file("params.yaml", "alpha: 1\nmode: fast\n")
                                     .with_file("data.txt", "0123456789");
    InMemoryEngine::in_memory(ws).with_stage(Arc::new(ScoreStage::new())).unwrap()
}

fn read(e: &InMemoryEngine, path: &str) -> String {
    String::from_utf8(e.workspace().read(path).unwrap().unwrap()).unwrap()
}

#[test]
fn second_reproduce_is_up_to_date() {
    let mut e = engine();
    let first = e.reproduce(None, &RunOptions::default()).unwrap();
    assert!(matches!(first, RunOutcome::Executed(_)));
    let second = e.reproduce(None, &RunOptions::default()).unwrap();
    match second {
        RunOutcome::UpToDate { fingerprint, .. } => assert_eq!(fingerprint, first.record().unwrap().fingerprint),
        other => panic!("expected UpToDate, got {other:?}"),
    }
    assert_eq!(e.list().unwrap().len(), 1);
    assert_eq!(read(&e, "metrics.yaml"), "score: 10\n");
}

#[test]
fn every_param_change_reexecutes() {
    let mut e = engine();
    let mut fingerprints = Vec::new();
    for alpha in ["1", "0.1", "1"] {
        let out = e.run_with_overrides(None, &[format!("alpha={alpha}")], &RunOptions::default())
                   .unwrap();
        fingerprints.push(out.record().expect("executed").fingerprint.clone());
    }
    assert_eq!(e.list().unwrap().len(), 3);
    assert_ne!(fingerprints[0], fingerprints[1]);
    assert_eq!(fingerprints[0], fingerprints[2]);
}

#[test]
fn dependency_and_output_changes_are_detected() {
    let mut e = engine();
    e.reproduce(None, &RunOptions::default()).unwrap();

    e.workspace_mut().write("data.txt", b"changed").unwrap();
    let status = e.evaluate_dependencies(None).unwrap();
    assert_eq!(status.reasons, vec![ChangeReason::DepChanged("data.txt".into())]);
    e.reproduce(None, &RunOptions::default()).unwrap();

    e.workspace_mut().remove("model.bin");
    let status = e.evaluate_dependencies(None).unwrap();
    assert_eq!(status.reasons, vec![ChangeReason::OutputMissing("model.bin".into())]);
}

#[test]
fn missing_param_forces_a_run_that_fails() {
    let mut e = engine();
    e.reproduce(None, &RunOptions::default()).unwrap();
    e.workspace_mut().write("params.yaml", b"mode: fast\n").unwrap();
    let status = e.evaluate_dependencies(None).unwrap();
    assert_eq!(status.reasons, vec![ChangeReason::ParamMissing("alpha".into())]);
    assert!(e.reproduce(None, &RunOptions::default()).is_err());
}

#[test]
fn override_matches_manual_edit() {
    let mut by_override = engine();
    by_override.run_with_overrides(None, &["alpha=0.1".into()], &RunOptions::default())
               .unwrap();

    let mut by_edit = engine();
    by_edit.workspace_mut().write("params.yaml", b"alpha: 0.1\nmode: fast\n").unwrap();
    by_edit.reproduce(None, &RunOptions::default()).unwrap();

    assert_eq!(read(&by_override, "params.yaml"), read(&by_edit, "params.yaml"));
    assert_eq!(read(&by_override, "metrics.yaml"), read(&by_edit, "metrics.yaml"));
}

#[test]
fn unknown_override_leaves_params_untouched() {
    let mut e = engine();
    let before = read(&e, "params.yaml");
    let err = e.run_with_overrides(None, &["alpha=0.5".into(), "gamma=1".into()], &RunOptions::default())
               .unwrap_err();
    assert!(matches!(err, CoreEngineError::UnknownParam { ref key, .. } if key == "gamma"));
    assert_eq!(read(&e, "params.yaml"), before);
    assert!(e.list().unwrap().is_empty());
}

#[test]
fn failure_keeps_lock_and_retries_next_time() {
    let mut e = engine();
    e.reproduce(None, &RunOptions::default()).unwrap();
    let lock = e.state("score").unwrap().lock;

    let err = e.run_with_overrides(None, &["alpha=-1".into()], &RunOptions::default())
               .unwrap_err();
    assert!(matches!(err, CoreEngineError::StageFailed { .. }));
    let state = e.state("score").unwrap();
    assert_eq!(state.status, StageStatus::Failed);
    assert_eq!(state.lock, lock);
    assert_eq!(read(&e, "metrics.yaml"), "score: 10\n");
    assert!(e.evaluate_dependencies(None).unwrap().changed);
}

#[test]
fn missing_declared_output_is_a_failure() {
    let ws = InMemoryWorkspace::new().with_file("params.yaml", "alpha: 1\nmode: fast\n")
                                     .with_file("data.txt", "x");
    let mut stage = ScoreStage::new();
    stage.skip_metrics = true;
    let mut e = InMemoryEngine::in_memory(ws).with_stage(Arc::new(stage)).unwrap();
    let err = e.reproduce(None, &RunOptions::default()).unwrap_err();
    assert_eq!(err,
               CoreEngineError::MissingOutput { stage: "score".into(),
                                                path: "metrics.yaml".into() });
    assert!(e.workspace().read("model.bin").unwrap().is_none());
    assert!(e.state("score").unwrap().lock.is_none());
}

#[test]
fn apply_restores_params_metrics_and_outputs() {
    let mut e = engine();
    let first = e.reproduce(None,
                            &RunOptions { name: Some("baseline".into()),
                                          force: false })
                 .unwrap();
    let first = first.record().unwrap().clone();
    e.run_with_overrides(None, &["alpha=0.5".into()], &RunOptions::default())
     .unwrap();
    assert_eq!(read(&e, "metrics.yaml"), "score: 5\n");

    let applied = e.apply("baseline", false).unwrap();
    assert_eq!(applied.id, first.id);
    assert_eq!(read(&e, "params.yaml"), "alpha: 1\nmode: fast\n");
    assert_eq!(read(&e, "metrics.yaml"), "score: 10\n");
    assert!(!e.evaluate_dependencies(None).unwrap().changed);
    assert!(matches!(e.reproduce(None, &RunOptions::default()).unwrap(), RunOutcome::UpToDate { .. }));
}

#[test]
fn apply_refuses_dirty_workspace_without_force() {
    let mut e = engine();
    let rec = e.reproduce(None, &RunOptions::default()).unwrap().record().unwrap().clone();
    e.apply_overrides(None, &["alpha=3".into()]).unwrap();

    let err = e.apply(&rec.id, false).unwrap_err();
    assert!(matches!(err, CoreEngineError::DirtyWorkspace(_)));
    assert!(read(&e, "params.yaml").starts_with("alpha: 3"));

    e.apply(&rec.id, true).unwrap();
    assert!(read(&e, "params.yaml").starts_with("alpha: 1"));
}

#[test]
fn show_starts_with_workspace_row() {
    let mut e = engine();
    e.reproduce(None, &RunOptions::default()).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    e.run_with_overrides(None, &["alpha=2".into()], &RunOptions::default())
     .unwrap();
    e.apply_overrides(None, &["alpha=4".into()]).unwrap();

    let rows = e.show(None).unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].is_workspace());
    assert!(rows[0].dirty);
    assert_eq!(rows[0].params["alpha"], serde_json::json!(4));
    assert_eq!(rows[1].metrics["score"], 20.0);
    assert_eq!(rows[2].metrics["score"], 10.0);
    assert_eq!(e.ledger().list().unwrap()[0].id, rows[1].id);
}
