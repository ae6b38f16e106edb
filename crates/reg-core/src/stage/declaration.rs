//! Declaración de stages (`stages.yaml`).
//!
//! Formato:
//!
//! ```yaml
//! stages:
//!   train:
//!     cmd: regflow train --dataset data/diabetes.tsv --standardize
//!     params: [alpha, l1_ratio]
//!     deps: [data/diabetes.tsv]
//!     outs: [model.bin]
//!     metrics: [metrics.yaml]
//! ```
//!
//! `params_file` es opcional y por defecto `params.yaml`. El nombre del stage
//! es la clave del mapa y no se repite dentro del cuerpo.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PARAMS_FILE;
use crate::errors::CoreEngineError;

fn default_params_file() -> String {
    DEFAULT_PARAMS_FILE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageDeclaration {
    #[serde(skip)]
    pub name: String,
    pub cmd: String,
    #[serde(default = "default_params_file")]
    pub params_file: String,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default)]
    pub deps: Vec<String>,
    #[serde(default)]
    pub outs: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<String>,
}

impl StageDeclaration {
    pub fn new(name: impl Into<String>, cmd: impl Into<String>) -> Self {
        Self { name: name.into(),
               cmd: cmd.into(),
               params_file: default_params_file(),
               params: Vec::new(),
               deps: Vec::new(),
               outs: Vec::new(),
               metrics: Vec::new() }
    }

    pub fn with_params<I, S>(mut self, keys: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.params = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_deps<I, S>(mut self, paths: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.deps = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_outs<I, S>(mut self, paths: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.outs = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_metrics<I, S>(mut self, paths: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.metrics = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Todos los archivos producidos: `outs` seguido de `metrics`.
    pub fn produced_paths(&self) -> impl Iterator<Item = &String> {
        self.outs.iter().chain(self.metrics.iter())
    }

    pub fn declares_param(&self, key: &str) -> bool {
        self.params.iter().any(|k| k == key)
    }

    /// Valida la forma de la declaración.
    ///
    /// - nombre y comando no vacíos;
    /// - al menos un output o un archivo de métricas;
    /// - sin claves ni paths repetidos;
    /// - ningún path es a la vez dependencia y output;
    /// - el archivo de parámetros no es output.
    pub fn validate(&self) -> Result<(), CoreEngineError> {
        let bad = |msg: String| Err(CoreEngineError::InvalidDeclaration(format!("stage '{}': {msg}", self.name)));
        if self.name.trim().is_empty() {
            return Err(CoreEngineError::InvalidDeclaration("stage name is empty".into()));
        }
        if self.cmd.trim().is_empty() {
            return bad("cmd is empty".into());
        }
        if self.outs.is_empty() && self.metrics.is_empty() {
            return bad("declares no outs and no metrics".into());
        }
        let mut keys = BTreeSet::new();
        for k in &self.params {
            if k.trim().is_empty() || !keys.insert(k.as_str()) {
                return bad(format!("invalid or repeated param '{k}'"));
            }
        }
        let mut produced = BTreeSet::new();
        for p in self.produced_paths() {
            if !produced.insert(p.as_str()) {
                return bad(format!("output '{p}' declared twice"));
            }
        }
        for d in &self.deps {
            if produced.contains(d.as_str()) {
                return bad(format!("'{d}' is both a dependency and an output"));
            }
        }
        if produced.contains(self.params_file.as_str()) {
            return bad(format!("params file '{}' cannot be an output", self.params_file));
        }
        Ok(())
    }
}

/// Archivo de pipeline completo. Conserva el orden de declaración.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineFile {
    pub stages: IndexMap<String, StageDeclaration>,
}

#[derive(Serialize, Deserialize)]
struct RawPipeline {
    stages: IndexMap<String, StageDeclaration>,
}

impl PipelineFile {
    pub fn single(decl: StageDeclaration) -> Self {
        let mut stages = IndexMap::new();
        stages.insert(decl.name.clone(), decl);
        Self { stages }
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, CoreEngineError> {
        let raw: RawPipeline = serde_yaml::from_str(s)?;
        let stages: IndexMap<String, StageDeclaration> = raw.stages
                                                            .into_iter()
                                                            .map(|(name, mut d)| {
                                                                d.name = name.clone();
                                                                (name, d)
                                                            })
                                                            .collect();
        if stages.is_empty() {
            return Err(CoreEngineError::InvalidDeclaration("no stages declared".into()));
        }
        for d in stages.values() {
            d.validate()?;
        }
        Ok(Self { stages })
    }

    pub fn to_yaml_string(&self) -> Result<String, CoreEngineError> {
        let raw = RawPipeline { stages: self.stages.clone() };
        Ok(serde_yaml::to_string(&raw)?)
    }

    /// Busca un stage por nombre; sin nombre devuelve el primero declarado.
    pub fn stage(&self, name: Option<&str>) -> Result<&StageDeclaration, CoreEngineError> {
        match name {
            Some(n) => self.stages
                           .get(n)
                           .ok_or_else(|| CoreEngineError::InvalidDeclaration(format!("unknown stage '{n}'"))),
            None => self.stages
                        .values()
                        .next()
                        .ok_or_else(|| CoreEngineError::InvalidDeclaration("no stages declared".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = "stages:\n  train:\n    cmd: regflow train\n    params: [alpha, l1_ratio]\n    deps: [data.tsv]\n    outs: [model.bin]\n    metrics: [metrics.yaml]\n";

    #[test]
    fn parses_and_names_stages() {
        let p = PipelineFile::from_yaml_str(YAML).unwrap();
        let d = p.stage(None).unwrap();
        assert_eq!(d.name, "train");
        assert_eq!(d.params_file, "params.yaml");
        assert_eq!(d.params, vec!["alpha", "l1_ratio"]);
        assert!(p.stage(Some("evaluate")).is_err());
    }

    #[test]
    fn yaml_roundtrip_keeps_declaration() {
        let p = PipelineFile::from_yaml_str(YAML).unwrap();
        let again = PipelineFile::from_yaml_str(&p.to_yaml_string().unwrap()).unwrap();
        assert_eq!(p, again);
    }

    #[test]
    fn rejects_dep_that_is_also_output() {
        let d = StageDeclaration::new("train", "x").with_deps(["model.bin"]).with_outs(["model.bin"]);
        assert!(matches!(d.validate(), Err(CoreEngineError::InvalidDeclaration(_))));
    }

    #[test]
    fn rejects_stage_without_products() {
        let d = StageDeclaration::new("train", "x").with_params(["alpha"]);
        assert!(d.validate().is_err());
    }
}
