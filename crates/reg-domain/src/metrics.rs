// metrics.rs
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::DomainError;

pub const R2: &str = "r2";

/// Métricas de un run: nombre → escalar finito.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metrics {
    values: IndexMap<String, f64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn r2(value: f64) -> Result<Self, DomainError> {
        let mut m = Self::new();
        m.insert(R2, value)?;
        Ok(m)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Result<(), DomainError> {
        let name = name.into();
        if !value.is_finite() {
            return Err(DomainError::ValidationError(format!("la métrica '{name}' no es finita: {value}")));
        }
        self.values.insert(name, value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.values.iter()
    }

    pub fn to_yaml_string(&self) -> Result<String, DomainError> {
        Ok(serde_yaml::to_string(&self.values)?)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, DomainError> {
        let raw: IndexMap<String, f64> = serde_yaml::from_str(s)?;
        let mut m = Self::new();
        for (k, v) in raw {
            m.insert(k, v)?;
        }
        Ok(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn r2_file_has_single_key() {
        let m = Metrics::r2(0.25).unwrap();
        assert_eq!(m.to_yaml_string().unwrap(), "r2: 0.25\n");
        assert_eq!(Metrics::from_yaml_str("r2: 0.25\n").unwrap(), m);
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert!(Metrics::r2(f64::NAN).is_err());
    }
}
