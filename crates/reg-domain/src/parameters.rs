// parameters.rs
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::DomainError;

pub const ALPHA: &str = "alpha";
pub const L1_RATIO: &str = "l1_ratio";

/// Conjunto ordenado de parámetros nombrados (contenido de `params.yaml`).
///
/// El orden de las claves es el del archivo y se conserva al reescribirlo.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    values: IndexMap<String, Value>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, DomainError> {
        if s.trim().is_empty() {
            return Ok(Self::new());
        }
        let values: IndexMap<String, Value> = serde_yaml::from_str(s)?;
        Ok(Self { values })
    }

    pub fn to_yaml_string(&self) -> Result<String, DomainError> {
        Ok(serde_yaml::to_string(&self.values)?)
    }

    pub fn from_json(map: &serde_json::Map<String, Value>) -> Self {
        Self { values: map.iter().map(|(k, v)| (k.clone(), v.clone())).collect() }
    }

    pub fn to_json(&self) -> serde_json::Map<String, Value> {
        self.values.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Lee un parámetro numérico obligatorio.
    pub fn require_f64(&self, key: &str) -> Result<f64, DomainError> {
        let v = self.values
                    .get(key)
                    .ok_or_else(|| DomainError::ValidationError(format!("falta el parámetro '{key}'")))?;
        let x = v.as_f64()
                 .ok_or_else(|| DomainError::ValidationError(format!("el parámetro '{key}' no es numérico: {v}")))?;
        if !x.is_finite() {
            return Err(DomainError::ValidationError(format!("el parámetro '{key}' no es finito")));
        }
        Ok(x)
    }

    /// Hash sha256 del contenido, en orden de claves del archivo.
    pub fn params_hash(&self) -> String {
        let mut hasher = Sha256::new();
        for (k, v) in &self.values {
            hasher.update(k.as_bytes());
            hasher.update([0u8]);
            hasher.update(v.to_string().as_bytes());
            hasher.update([0u8]);
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Hiperparámetros validados del stage de entrenamiento.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElasticNetParams {
    pub alpha: f64,
    pub l1_ratio: f64,
}

impl Default for ElasticNetParams {
    fn default() -> Self {
        Self { alpha: 1.0,
               l1_ratio: 0.5 }
    }
}

impl ElasticNetParams {
    pub fn new(alpha: f64, l1_ratio: f64) -> Result<Self, DomainError> {
        let p = Self { alpha, l1_ratio };
        p.validate()?;
        Ok(p)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(DomainError::ValidationError(format!("alpha debe ser finito y >= 0 (recibido {})", self.alpha)));
        }
        if !self.l1_ratio.is_finite() || !(0.0..=1.0).contains(&self.l1_ratio) {
            return Err(DomainError::ValidationError(format!("l1_ratio debe estar en [0, 1] (recibido {})", self.l1_ratio)));
        }
        Ok(())
    }

    pub fn from_set(set: &ParameterSet) -> Result<Self, DomainError> {
        Self::new(set.require_f64(ALPHA)?, set.require_f64(L1_RATIO)?)
    }

    /// Parámetros por defecto como archivo: `alpha: 1`, `l1_ratio: 0.5`.
    pub fn default_set() -> ParameterSet {
        let mut set = ParameterSet::new();
        set.set(ALPHA, Value::from(1));
        set.set(L1_RATIO, Value::from(0.5));
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_file_content() {
        assert_eq!(ElasticNetParams::default_set().to_yaml_string().unwrap(), "alpha: 1\nl1_ratio: 0.5\n");
        assert_eq!(ElasticNetParams::from_set(&ElasticNetParams::default_set()).unwrap(),
                   ElasticNetParams::default());
    }

    #[test]
    fn domain_is_enforced() {
        assert!(ElasticNetParams::new(-0.1, 0.5).is_err());
        assert!(ElasticNetParams::new(0.0, 1.0).is_ok());
        assert!(ElasticNetParams::new(1.0, 1.01).is_err());
        assert!(ElasticNetParams::new(f64::INFINITY, 0.5).is_err());
    }

    #[test]
    fn missing_or_textual_values_are_rejected() {
        let mut set = ParameterSet::new();
        set.set(ALPHA, json!("big"));
        assert!(matches!(ElasticNetParams::from_set(&set), Err(DomainError::ValidationError(_))));
        set.set(ALPHA, json!(0.1));
        assert!(ElasticNetParams::from_set(&set).is_err());
    }

    #[test]
    fn hash_depends_on_values() {
        let a = ElasticNetParams::default_set();
        let mut b = a.clone();
        b.set(ALPHA, json!(0.1));
        assert_ne!(a.params_hash(), b.params_hash());
        assert_eq!(a.params_hash(), ElasticNetParams::default_set().params_hash());
    }
}
