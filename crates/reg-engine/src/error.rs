use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("matriz vacía: {0}")]
    Empty(&'static str),
    #[error("dimensiones incompatibles: {0}")]
    Shape(String),
    #[error("sistema singular (pivote {pivot} = {value:e})")]
    Singular { pivot: usize, value: f64 },
    #[error("parámetro inválido: {0}")]
    InvalidArgument(String),
}
