use std::sync::Arc;

use reg_core::{Artifact, CoreEngineError, ExecutionContext, InMemoryEngine, InMemoryWorkspace, QueueStore, RunEventKind,
               EventStore, RunOptions, StageDeclaration, StageDefinition, StageRunResult, Workspace};

struct Echo(StageDeclaration);

impl StageDefinition for Echo {
    fn declaration(&self) -> &StageDeclaration {
        &self.0
    }

    fn run(&self, ctx: &ExecutionContext) -> StageRunResult {
        let rate = ctx.param("rate").and_then(|v| v.as_f64()).unwrap_or(0.0);
        if rate > 1.0 {
            return StageRunResult::Failure { error: CoreEngineError::StageFailed { stage: "echo".into(),
                                                                                   reason: "rate > 1".into() } };
        }
        StageRunResult::Success { outputs: vec![Artifact::output("out.txt", format!("{rate}").into_bytes()),
                                                Artifact::metrics("metrics.yaml", format!("rate: {rate}\n").into_bytes())] }
    }
}

fn engine() -> InMemoryEngine {
    let decl = StageDeclaration::new("echo", "echo").with_params(["rate"])
                                                    .with_outs(["out.txt"])
                                                    .with_metrics(["metrics.yaml"]);
    let ws = InMemoryWorkspace::new().with_file("params.yaml", "rate: 0.5\n");
    InMemoryEngine::in_memory(ws).with_stage(Arc::new(Echo(decl))).unwrap()
}

#[test]
fn run_all_keys_results_by_entry_and_leaves_workspace_alone() {
    let mut e = engine();
    e.reproduce(None, &RunOptions::default()).unwrap();
    let lock = e.state("echo").unwrap().lock;

    let rates = ["0", "0.2", "0.4", "0.6", "0.8", "1"];
    let entries: Vec<_> = rates.iter()
                               .map(|r| e.queue(None, &[format!("rate={r}")], None).unwrap())
                               .collect();
    assert_eq!(e.queue_store().list().unwrap().len(), rates.len());

    let results = e.run_all(2).unwrap();
    assert_eq!(results.len(), rates.len());
    for (entry, rate) in entries.iter().zip(rates) {
        let rec = results[&entry.id].as_ref().unwrap();
        assert_eq!(rec.queue_entry, Some(entry.id));
        assert_eq!(rec.metrics["rate"], rate.parse::<f64>().unwrap());
    }

    assert_eq!(e.workspace().read("params.yaml").unwrap().unwrap(), b"rate: 0.5\n".to_vec());
    assert_eq!(e.state("echo").unwrap().lock, lock);
    assert!(e.queue_store().list().unwrap().is_empty());
    assert_eq!(e.list().unwrap().len(), 1 + rates.len());
}

#[test]
fn failed_entry_is_reported_without_stopping_others() {
    let mut e = engine();
    let ok = e.queue(None, &["rate=0.1".into()], Some("small".into())).unwrap();
    let bad = e.queue(None, &["rate=2".into()], None).unwrap();
    let results = e.run_all(4).unwrap();
    assert!(results[&ok.id].is_ok());
    assert!(matches!(results[&bad.id], Err(CoreEngineError::StageFailed { .. })));
    assert_eq!(e.ledger_names(), vec![Some("small".to_string())]);

    let finished = e.events()
                    .list()
                    .unwrap()
                    .into_iter()
                    .filter(|ev| matches!(ev.kind, RunEventKind::QueueEntryFinished { .. }))
                    .count();
    assert_eq!(finished, 2);
}

#[test]
fn queue_validates_overrides_up_front() {
    let mut e = engine();
    assert!(matches!(e.queue(None, &["gamma=1".into()], None), Err(CoreEngineError::UnknownParam { .. })));
    assert!(matches!(e.run_all(1), Err(CoreEngineError::QueueEmpty)));
}

trait LedgerNames {
    fn ledger_names(&self) -> Vec<Option<String>>;
}

impl LedgerNames for InMemoryEngine {
    fn ledger_names(&self) -> Vec<Option<String>> {
        self.list().unwrap().into_iter().map(|r| r.name).collect()
    }
}

#[test]
fn entry_that_cannot_be_prepared_stays_queued() {
    let mut e = engine();
    let entry = e.queue(None, &["rate=0.3".into()], None).unwrap();
    let changed = StageDeclaration::new("echo", "echo").with_params(["speed"])
                                                       .with_outs(["out.txt"])
                                                       .with_metrics(["metrics.yaml"]);
    e.register_stage(Arc::new(Echo(changed))).unwrap();

    let results = e.run_all(2).unwrap();
    assert!(matches!(results[&entry.id], Err(CoreEngineError::UnknownParam { .. })));
    let queued: Vec<_> = e.queue_store().list().unwrap().into_iter().map(|q| q.id).collect();
    assert_eq!(queued, vec![entry.id]);
    assert!(e.list().unwrap().is_empty());
    assert!(!e.events()
              .list()
              .unwrap()
              .iter()
              .any(|ev| matches!(ev.kind, RunEventKind::QueueEntryFinished { .. })));
}
