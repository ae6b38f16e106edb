//! Overrides `key=value` de línea de comandos.
//!
//! Los valores se interpretan como escalares YAML: `0.1` es número, `true`
//! es booleano y cualquier otra cosa queda como string. Todas las claves se
//! validan contra los params declarados antes de tocar el archivo.

use serde_json::{Map, Value};

use super::param_injector::ParamInjector;
use crate::errors::CoreEngineError;
use crate::model::ExecutionContext;

/// Interpreta un valor como escalar YAML.
pub fn parse_scalar(raw: &str) -> Value {
    match serde_yaml::from_str::<Value>(raw) {
        Ok(v @ (Value::Bool(_) | Value::Number(_) | Value::String(_))) => v,
        _ => Value::String(raw.to_string()),
    }
}

/// Separa `key=value` (sólo en el primer `=`).
pub fn parse_override(s: &str) -> Result<(String, Value), CoreEngineError> {
    let (k, v) = s.split_once('=')
                  .ok_or_else(|| CoreEngineError::InvalidOverride(s.to_string()))?;
    let (k, v) = (k.trim(), v.trim());
    if k.is_empty() || v.is_empty() {
        return Err(CoreEngineError::InvalidOverride(s.to_string()));
    }
    Ok((k.to_string(), parse_scalar(v)))
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverrideInjector {
    overrides: Map<String, Value>,
}

impl OverrideInjector {
    /// Construye el inyector desde strings `key=value`.
    pub fn parse(known: &[String], raw: &[String]) -> Result<Self, CoreEngineError> {
        let mut overrides = Map::new();
        for s in raw {
            let (k, v) = parse_override(s)?;
            overrides.insert(k, v);
        }
        Self::from_map(known, overrides)
    }

    /// Construye el inyector desde un mapa ya interpretado.
    pub fn from_map(known: &[String], overrides: Map<String, Value>) -> Result<Self, CoreEngineError> {
        if let Some(key) = overrides.keys().find(|k| !known.contains(k)) {
            return Err(CoreEngineError::UnknownParam { key: key.clone(),
                                                       known: known.to_vec() });
        }
        Ok(Self { overrides })
    }

    pub fn overrides(&self) -> &Map<String, Value> {
        &self.overrides
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.overrides
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

impl ParamInjector for OverrideInjector {
    fn inject(&self, _base: &Value, _ctx: &ExecutionContext) -> Value {
        Value::Object(self.overrides.clone())
    }
}
