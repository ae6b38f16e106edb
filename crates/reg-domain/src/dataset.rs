// dataset.rs
use ndarray::{Array1, Array2, Axis};
use reg_engine::{scale_unit_norm, train_test_split};

use crate::DomainError;

/// Matriz de features inmutable con su target.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Array2<f64>,
    target: Array1<f64>,
    feature_names: Vec<String>,
}

impl Dataset {
    /// Crea un dataset validando forma y finitud.
    ///
    /// # Errores
    /// `DomainError::DatasetError` si no hay filas o columnas, si la cantidad
    /// de filas no coincide con el target, o si hay valores no finitos.
    pub fn new(features: Array2<f64>, target: Array1<f64>, feature_names: Vec<String>) -> Result<Self, DomainError> {
        let (n, p) = features.dim();
        if n == 0 || p == 0 {
            return Err(DomainError::DatasetError(format!("dataset vacío ({n}x{p})")));
        }
        if target.len() != n {
            return Err(DomainError::DatasetError(format!("{n} filas de features y {} valores de target", target.len())));
        }
        if feature_names.len() != p {
            return Err(DomainError::DatasetError(format!("{p} columnas y {} nombres", feature_names.len())));
        }
        if features.iter().chain(target.iter()).any(|v| !v.is_finite()) {
            return Err(DomainError::DatasetError("valores no finitos".into()));
        }
        Ok(Self { features,
                  target,
                  feature_names })
    }

    /// Nombres por defecto `x0..x{p-1}`.
    pub fn unnamed(features: Array2<f64>, target: Array1<f64>) -> Result<Self, DomainError> {
        let names = (0..features.ncols()).map(|i| format!("x{i}")).collect();
        Self::new(features, target, names)
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn target(&self) -> &Array1<f64> {
        &self.target
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Columnas centradas con suma de cuadrados 1 (el target no cambia).
    pub fn standardized(&self) -> Result<Self, DomainError> {
        Ok(Self { features: scale_unit_norm(&self.features)?,
                  target: self.target.clone(),
                  feature_names: self.feature_names.clone() })
    }

    pub fn select(&self, rows: &[usize]) -> Self {
        Self { features: self.features.select(Axis(0), rows),
               target: self.target.select(Axis(0), rows),
               feature_names: self.feature_names.clone() }
    }

    /// Partición reproducible `(train, test)`; cada parte con al menos dos
    /// filas.
    pub fn split(&self, test_size: f64, seed: u32) -> Result<(Self, Self), DomainError> {
        let idx = train_test_split(self.n_samples(), test_size, seed)?;
        if idx.train.len() < 2 || idx.test.len() < 2 {
            return Err(DomainError::DatasetError(format!("partición demasiado chica: {} train / {} test",
                                                         idx.train.len(),
                                                         idx.test.len())));
        }
        Ok((self.select(&idx.train), self.select(&idx.test)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn rejects_ragged_and_non_finite() {
        assert!(Dataset::unnamed(array![[1.0], [2.0]], array![1.0]).is_err());
        assert!(Dataset::unnamed(array![[1.0], [f64::NAN]], array![1.0, 2.0]).is_err());
    }

    #[test]
    fn split_partitions_all_rows() {
        let x = Array2::from_shape_fn((8, 1), |(i, _)| i as f64);
        let y = Array1::from_shape_fn(8, |i| i as f64 * 2.0);
        let ds = Dataset::unnamed(x, y).unwrap();
        let (train, test) = ds.split(0.25, 0).unwrap();
        assert_eq!((train.n_samples(), test.n_samples()), (6, 2));
        let mut rows: Vec<f64> = train.features().iter().chain(test.features().iter()).copied().collect();
        rows.sort_by(f64::total_cmp);
        assert_eq!(rows, (0..8).map(|i| i as f64).collect::<Vec<_>>());
        assert!(train.target().iter().zip(train.features().iter()).all(|(t, f)| *t == f * 2.0));
    }

    #[test]
    fn tiny_partitions_fail() {
        let ds = Dataset::unnamed(array![[1.0], [2.0], [3.0], [4.0]], array![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!(matches!(ds.split(0.25, 0), Err(DomainError::DatasetError(_))));
    }
}
