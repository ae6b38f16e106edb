use ndarray::{Array1, Array2, Axis};

use crate::error::EngineError;

/// Datos centrados en la media de cada columna y del target.
#[derive(Debug, Clone)]
pub struct Centered {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
    pub x_mean: Array1<f64>,
    pub y_mean: f64,
}

pub fn center(x: &Array2<f64>, y: &Array1<f64>) -> Result<Centered, EngineError> {
    if x.nrows() == 0 {
        return Err(EngineError::Empty("sin filas"));
    }
    if x.nrows() != y.len() {
        return Err(EngineError::Shape(format!("X tiene {} filas, y tiene {}", x.nrows(), y.len())));
    }
    let x_mean = x.mean_axis(Axis(0)).ok_or(EngineError::Empty("sin filas"))?;
    let y_mean = y.mean().ok_or(EngineError::Empty("sin filas"))?;
    Ok(Centered { x: x - &x_mean,
                  y: y - y_mean,
                  x_mean,
                  y_mean })
}

/// Centra cada columna y la escala por `std * sqrt(n)` (desvío poblacional),
/// de modo que la suma de cuadrados de cada columna sea 1. Las columnas
/// constantes quedan en cero.
pub fn scale_unit_norm(x: &Array2<f64>) -> Result<Array2<f64>, EngineError> {
    let n = x.nrows();
    if n == 0 {
        return Err(EngineError::Empty("sin filas"));
    }
    let mean = x.mean_axis(Axis(0)).ok_or(EngineError::Empty("sin filas"))?;
    let mut out = x - &mean;
    for mut col in out.columns_mut() {
        let norm = col.dot(&col).sqrt();
        if norm > 0.0 {
            col.mapv_inplace(|v| v / norm);
        }
    }
    Ok(out)
}
