//! Adaptadores entre el motor genérico (`reg-core`) y el dominio de regresión.
//!
//! - `dataset`: lectura de tablas delimitadas y dataset sintético.
//! - `encoder`: entidades de dominio → `Artifact`.
//! - `stages`: `TrainStage` (en proceso) y `CommandStage` (shell).
pub mod dataset;
pub mod encoder;
pub mod stages;

pub use dataset::{synthetic_dataset, to_delimited, DelimitedDatasetReader, Delimiter, TargetColumn};
pub use encoder::{DomainArtifactEncoder, SimpleDomainEncoder};
pub use stages::{default_train_declaration, train_model, CommandStage, TrainOptions, TrainOutput, TrainStage, DEFAULT_DATASET};
