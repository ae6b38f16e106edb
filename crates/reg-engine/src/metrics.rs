use ndarray::{Array1, Array2};

use crate::error::EngineError;

pub fn predict(x: &Array2<f64>, coef: &Array1<f64>, intercept: f64) -> Result<Array1<f64>, EngineError> {
    if x.ncols() != coef.len() {
        return Err(EngineError::Shape(format!("X tiene {} columnas, el modelo {} coeficientes", x.ncols(), coef.len())));
    }
    Ok(x.dot(coef) + intercept)
}

/// Coeficiente de determinación `1 - SS_res / SS_tot`.
///
/// Con target constante (`SS_tot = 0`) devuelve 1.0 si la predicción es
/// perfecta y 0.0 en otro caso, así el resultado siempre es finito.
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64, EngineError> {
    if y_true.is_empty() {
        return Err(EngineError::Empty("y_true vacío"));
    }
    if y_true.len() != y_pred.len() {
        return Err(EngineError::Shape(format!("{} valores reales vs {} predichos", y_true.len(), y_pred.len())));
    }
    let mean = y_true.mean().ok_or(EngineError::Empty("y_true vacío"))?;
    let ss_res: f64 = y_true.iter().zip(y_pred.iter()).map(|(t, p)| (t - p).powi(2)).sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}
