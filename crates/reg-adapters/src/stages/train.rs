//! Stage de entrenamiento Elastic Net.
//!
//! - Lee `alpha` y `l1_ratio` de los params del contexto.
//! - Lee el dataset de las dependencias (bytes ya cargados por el engine).
//! - Split reproducible, ajuste, R² sobre la partición de prueba.
//! - Devuelve el modelo (primer `outs`) y `{r2}` (primer `metrics`).
//!
//! Parámetros inválidos o dataset ilegible fallan antes de ajustar; el
//! engine no escribe nada en ese caso.

use reg_core::errors::CoreEngineError;
use reg_core::model::{Artifact, ExecutionContext};
use reg_core::stage::{StageDeclaration, StageDefinition, StageRunResult};
use reg_domain::{Dataset, DomainError, ElasticNetModel, ElasticNetParams, Metrics, ParameterSet, ALPHA, L1_RATIO};

use crate::dataset::DelimitedDatasetReader;
use crate::encoder::{DomainArtifactEncoder, SimpleDomainEncoder};

pub const DEFAULT_DATASET: &str = "data/diabetes.tsv";
pub const DEFAULT_MODEL: &str = "model.bin";
pub const DEFAULT_METRICS: &str = "metrics.yaml";

/// Declaración por defecto del stage `train`. El dataset es la tabla cruda
/// (AGE..S6, Y) y `--standardize` la lleva a columnas centradas de norma 1,
/// la misma escala que usa scikit-learn para `load_diabetes`.
pub fn default_train_declaration() -> StageDeclaration {
    let cmd = format!("regflow train --dataset {DEFAULT_DATASET} --standardize");
    StageDeclaration::new("train", cmd).with_params([ALPHA, L1_RATIO])
                                       .with_deps([DEFAULT_DATASET])
                                       .with_outs([DEFAULT_MODEL])
                                       .with_metrics([DEFAULT_METRICS])
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainOptions {
    pub dataset: String,
    pub standardize: bool,
    pub test_size: f64,
    pub seed: u32,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self { dataset: DEFAULT_DATASET.to_string(),
               standardize: true,
               test_size: 0.25,
               seed: 0 }
    }
}

#[derive(Debug, Clone)]
pub struct TrainOutput {
    pub model: ElasticNetModel,
    pub metrics: Metrics,
    pub n_train: usize,
    pub n_test: usize,
}

/// Split + fit + score. Función pura de sus argumentos.
pub fn train_model(params: &ElasticNetParams, dataset: &Dataset, opts: &TrainOptions) -> Result<TrainOutput, DomainError> {
    params.validate()?;
    let (train, test) = dataset.split(opts.test_size, opts.seed)?;
    let model = ElasticNetModel::fit(&train, params)?;
    let r2 = model.score(&test)?;
    Ok(TrainOutput { model,
                     metrics: Metrics::r2(r2)?,
                     n_train: train.n_samples(),
                     n_test: test.n_samples() })
}

pub struct TrainStage {
    decl: StageDeclaration,
    options: TrainOptions,
    encoder: SimpleDomainEncoder,
}

impl TrainStage {
    /// El dataset debe estar declarado como dependencia y la declaración
    /// debe tener al menos un output y un archivo de métricas.
    pub fn new(decl: StageDeclaration, options: TrainOptions) -> Result<Self, CoreEngineError> {
        if !decl.deps.contains(&options.dataset) {
            return Err(CoreEngineError::InvalidDeclaration(format!("stage '{}': dataset '{}' must be declared in deps",
                                                                   decl.name, options.dataset)));
        }
        if decl.outs.is_empty() || decl.metrics.is_empty() {
            return Err(CoreEngineError::InvalidDeclaration(format!("stage '{}': needs one output and one metrics file",
                                                                   decl.name)));
        }
        Ok(Self { decl,
                  options,
                  encoder: SimpleDomainEncoder })
    }

    pub fn options(&self) -> &TrainOptions {
        &self.options
    }

    fn produce(&self, ctx: &ExecutionContext) -> Result<Vec<Artifact>, DomainError> {
        let params = match &ctx.params {
            serde_json::Value::Object(m) => ParameterSet::from_json(m),
            _ => ParameterSet::new(),
        };
        let params = ElasticNetParams::from_set(&params)?;
        let bytes = ctx.input(&self.options.dataset)
                       .ok_or_else(|| DomainError::DatasetError(format!("'{}' no está disponible", self.options.dataset)))?;
        let dataset = DelimitedDatasetReader::new().standardize(self.options.standardize)
                                                   .read(bytes)?;
        let out = train_model(&params, &dataset, &self.options)?;
        log::info!("trained on {} rows (alpha={}, l1_ratio={}): r2={:.6}",
                   out.n_train,
                   params.alpha,
                   params.l1_ratio,
                   out.metrics.get(reg_domain::R2).unwrap_or(f64::NAN));
        Ok(vec![self.encoder.encode_model(&self.decl.outs[0], &out.model),
                self.encoder.encode_metrics(&self.decl.metrics[0], &out.metrics)?])
    }
}

impl StageDefinition for TrainStage {
    fn declaration(&self) -> &StageDeclaration {
        &self.decl
    }

    fn run(&self, ctx: &ExecutionContext) -> StageRunResult {
        match self.produce(ctx) {
            Ok(outputs) => StageRunResult::Success { outputs },
            Err(e) => StageRunResult::Failure { error: CoreEngineError::StageFailed { stage: self.decl.name.clone(),
                                                                                      reason: e.to_string() } },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{synthetic_dataset, to_delimited, SYNTHETIC_ROWS};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn ctx(params: serde_json::Value) -> ExecutionContext {
        let data = to_delimited(&synthetic_dataset(SYNTHETIC_ROWS, 0).unwrap());
        let mut inputs = BTreeMap::new();
        inputs.insert(DEFAULT_DATASET.to_string(), data.into_bytes());
        ExecutionContext { stage: "train".into(),
                           params,
                           inputs,
                           workdir: None }
    }

    #[test]
    fn produces_model_and_r2_only() {
        let stage = TrainStage::new(default_train_declaration(), TrainOptions::default()).unwrap();
        let StageRunResult::Success { outputs } = stage.run(&ctx(json!({"alpha": 0.1, "l1_ratio": 0.5}))) else {
            panic!("expected success");
        };
        assert_eq!(outputs[0].path, "model.bin");
        let metrics = Metrics::from_yaml_str(std::str::from_utf8(&outputs[1].bytes).unwrap()).unwrap();
        assert_eq!(metrics.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(), vec!["r2"]);
        assert!(metrics.get("r2").unwrap().is_finite());
        assert!(ElasticNetModel::from_bytes(&outputs[0].bytes).is_ok());
    }

    #[test]
    fn invalid_params_fail() {
        let stage = TrainStage::new(default_train_declaration(), TrainOptions::default()).unwrap();
        for params in [json!({"alpha": -1, "l1_ratio": 0.5}),
                       json!({"alpha": 1, "l1_ratio": 2}),
                       json!({"alpha": "x", "l1_ratio": 0.5}),
                       json!({"l1_ratio": 0.5})]
        {
            assert!(matches!(stage.run(&ctx(params)), StageRunResult::Failure { .. }));
        }
    }

    #[test]
    fn default_stage_standardizes_the_raw_table() {
        assert!(default_train_declaration().cmd.ends_with(" --standardize"));
        assert!(TrainOptions::default().standardize);
    }

    #[test]
    fn dataset_must_be_a_dependency() {
        let decl = default_train_declaration().with_deps(Vec::<String>::new());
        assert!(TrainStage::new(decl, TrainOptions::default()).is_err());
    }

    #[test]
    fn same_inputs_same_bytes() {
        let stage = TrainStage::new(default_train_declaration(), TrainOptions::default()).unwrap();
        let run = |c| match stage.run(&c) {
            StageRunResult::Success { outputs } => outputs.into_iter().map(|a| a.bytes).collect::<Vec<_>>(),
            StageRunResult::Failure { error } => panic!("{error}"),
        };
        assert_eq!(run(ctx(json!({"alpha": 1, "l1_ratio": 0.5}))), run(ctx(json!({"alpha": 1, "l1_ratio": 0.5}))));
    }
}
