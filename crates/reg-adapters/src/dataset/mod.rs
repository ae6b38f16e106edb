//! Lectura, escritura y generación de datasets tabulares.

pub mod reader;
pub mod synthetic;

pub use reader::{to_delimited, DelimitedDatasetReader, Delimiter, TargetColumn};
pub use synthetic::{synthetic_dataset, SYNTHETIC_FEATURES, SYNTHETIC_ROWS};
