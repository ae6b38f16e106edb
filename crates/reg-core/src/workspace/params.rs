//! Lectura/escritura del archivo de parámetros y de métricas (YAML).
//!
//! Los parámetros viajan como `serde_json::Value` (objeto con orden
//! preservado) para que digests y merges usen la misma representación.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::Workspace;
use crate::errors::CoreEngineError;

/// Carga el archivo de parámetros. Ausente o vacío equivale a `{}`.
pub fn load_params<W: Workspace + ?Sized>(ws: &W, file: &str) -> Result<Map<String, Value>, CoreEngineError> {
    let Some(bytes) = ws.read(file)? else {
        return Ok(Map::new());
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_yaml::from_slice::<Value>(&bytes)? {
        Value::Object(m) => Ok(m),
        Value::Null => Ok(Map::new()),
        other => Err(CoreEngineError::Serialization(format!("{file}: expected a mapping, found {other}"))),
    }
}

pub fn store_params<W: Workspace + ?Sized>(ws: &mut W, file: &str, params: &Map<String, Value>) -> Result<(), CoreEngineError> {
    let text = serde_yaml::to_string(params)?;
    ws.write(file, text.as_bytes())
}

/// Subconjunto declarado, en el orden de `keys`. Las claves ausentes se
/// omiten.
pub fn params_subset(params: &Map<String, Value>, keys: &[String]) -> Map<String, Value> {
    keys.iter()
        .filter_map(|k| params.get(k).map(|v| (k.clone(), v.clone())))
        .collect()
}

/// Interpreta un archivo de métricas `nombre: escalar`.
pub fn parse_metrics(bytes: &[u8]) -> Result<BTreeMap<String, f64>, CoreEngineError> {
    let raw: BTreeMap<String, Value> = serde_yaml::from_slice(bytes)?;
    raw.into_iter()
       .map(|(k, v)| match v.as_f64() {
           Some(x) if x.is_finite() => Ok((k, x)),
           _ => Err(CoreEngineError::Serialization(format!("metric '{k}' is not a finite number: {v}"))),
       })
       .collect()
}

/// Métricas actuales de todos los archivos indicados (los ausentes se
/// ignoran).
pub fn load_metrics<W: Workspace + ?Sized>(ws: &W, files: &[String]) -> Result<BTreeMap<String, f64>, CoreEngineError> {
    let mut out = BTreeMap::new();
    for f in files {
        if let Some(bytes) = ws.read(f)? {
            out.extend(parse_metrics(&bytes)?);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::InMemoryWorkspace;
    use serde_json::json;

    #[test]
    fn params_roundtrip_preserves_order_and_types() {
        let mut ws = InMemoryWorkspace::new().with_file("params.yaml", "l1_ratio: 0.5\nalpha: 1\n");
        let mut p = load_params(&ws, "params.yaml").unwrap();
        assert_eq!(p.keys().collect::<Vec<_>>(), vec!["l1_ratio", "alpha"]);
        p.insert("alpha".into(), json!(0.1));
        store_params(&mut ws, "params.yaml", &p).unwrap();
        let text = String::from_utf8(ws.read("params.yaml").unwrap().unwrap()).unwrap();
        assert_eq!(text, "l1_ratio: 0.5\nalpha: 0.1\n");
    }

    #[test]
    fn missing_params_file_is_empty() {
        let ws = InMemoryWorkspace::new();
        assert!(load_params(&ws, "params.yaml").unwrap().is_empty());
    }

    #[test]
    fn metrics_must_be_numbers() {
        assert_eq!(parse_metrics(b"r2: 0.25\n").unwrap()["r2"], 0.25);
        assert!(parse_metrics(b"r2: high\n").is_err());
    }
}
