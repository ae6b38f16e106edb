//! Pipeline de entrenamiento sobre el engine en memoria con el dataset
//! sintético.

use std::sync::Arc;

use reg_adapters::dataset::{synthetic_dataset, to_delimited, SYNTHETIC_ROWS};
use reg_adapters::{default_train_declaration, TrainOptions, TrainStage, DEFAULT_DATASET};
use reg_core::{InMemoryEngine, InMemoryWorkspace, RunLedger, RunOptions, RunOutcome, Workspace};
use reg_domain::ElasticNetModel;

fn engine() -> InMemoryEngine {
    let data = to_delimited(&synthetic_dataset(SYNTHETIC_ROWS, 7).unwrap());
    let ws = InMemoryWorkspace::new().with_file("params.yaml", "alpha: 1\nl1_ratio: 0.5\n")
                                     .with_file(DEFAULT_DATASET, data);
    let stage = TrainStage::new(default_train_declaration(), TrainOptions::default()).unwrap();
    InMemoryEngine::in_memory(ws).with_stage(Arc::new(stage)).unwrap()
}

#[test]
fn reproduce_is_deterministic_and_idempotent() {
    let mut a = engine();
    let mut b = engine();
    let ra = a.reproduce(None, &RunOptions::default()).unwrap().record().unwrap().clone();
    let rb = b.reproduce(None, &RunOptions::default()).unwrap().record().unwrap().clone();
    assert_eq!(ra.fingerprint, rb.fingerprint);
    assert_eq!(ra.metrics, rb.metrics);
    assert_eq!(a.workspace().read("model.bin").unwrap(), b.workspace().read("model.bin").unwrap());

    assert!(matches!(a.reproduce(None, &RunOptions::default()).unwrap(), RunOutcome::UpToDate { .. }));
    assert_eq!(a.list().unwrap().len(), 1);
}

#[test]
fn lower_alpha_fits_better_on_synthetic_data() {
    let mut e = engine();
    let strong = e.reproduce(None, &RunOptions::default()).unwrap().record().unwrap().clone();
    let weak = e.run_with_overrides(None, &["alpha=0.001".into()], &RunOptions::default())
                .unwrap()
                .record()
                .unwrap()
                .clone();
    assert_ne!(strong.fingerprint, weak.fingerprint);
    assert!(weak.metric("r2").unwrap() > strong.metric("r2").unwrap());
    assert_eq!(e.ledger().list().unwrap()[0].id, weak.id);

    let bytes = e.workspace().read("model.bin").unwrap().unwrap();
    let model = ElasticNetModel::from_bytes(&bytes).unwrap();
    assert_eq!(model.params.alpha, 0.001);
}

#[test]
fn queued_variations_leave_workspace_alone() {
    let mut e = engine();
    e.reproduce(None, &RunOptions::default()).unwrap();
    let params = e.workspace().read("params.yaml").unwrap();
    for alpha in ["0.01", "0.1"] {
        e.queue(None, &[format!("alpha={alpha}")], None).unwrap();
    }
    let results = e.run_all(2).unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.values().all(Result::is_ok));
    assert_eq!(e.workspace().read("params.yaml").unwrap(), params);
    assert!(!e.evaluate_dependencies(None).unwrap().changed);
    assert_eq!(e.list().unwrap().len(), 3);
}
