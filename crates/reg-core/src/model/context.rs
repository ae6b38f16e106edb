use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::Value;

/// Contexto de ejecución entregado a `StageDefinition::run`.
///
/// El stage debe ser puro respecto a `params` + `inputs`: todo lo que lee
/// está aquí, de modo que dos invocaciones concurrentes sobre workspaces
/// aislados no comparten estado.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub stage: String,
    /// Subconjunto de parámetros declarados, en el orden del archivo.
    pub params: Value,
    /// Bytes de cada dependencia declarada, por path.
    pub inputs: BTreeMap<String, Vec<u8>>,
    /// Directorio del workspace cuando está respaldado por disco.
    pub workdir: Option<PathBuf>,
}

impl ExecutionContext {
    pub fn input(&self, path: &str) -> Option<&[u8]> {
        self.inputs.get(path).map(Vec::as_slice)
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }
}
