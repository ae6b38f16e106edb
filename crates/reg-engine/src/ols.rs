use ndarray::{Array1, Array2};

use crate::error::EngineError;
use crate::linalg::cholesky_solve;

/// Mínimos cuadrados por ecuaciones normales: `(XᵀX) w = Xᵀy`.
pub fn least_squares(x: &Array2<f64>, y: &Array1<f64>) -> Result<Array1<f64>, EngineError> {
    if x.nrows() != y.len() {
        return Err(EngineError::Shape(format!("X tiene {} filas, y tiene {}", x.nrows(), y.len())));
    }
    let gram = x.t().dot(x);
    let xty = x.t().dot(y);
    cholesky_solve(&gram, &xty)
}
