use ndarray::{Array1, Array2};

use crate::error::EngineError;

/// Resuelve `A x = b` para `A` simétrica definida positiva (Cholesky).
///
/// Un pivote no positivo o despreciable frente a la diagonal de `A` se
/// reporta como `Singular`.
pub fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, EngineError> {
    let n = a.nrows();
    if n == 0 {
        return Err(EngineError::Empty("sistema sin incógnitas"));
    }
    if a.ncols() != n || b.len() != n {
        return Err(EngineError::Shape(format!("A es {}x{}, b tiene {}", a.nrows(), a.ncols(), b.len())));
    }
    let scale = a.diag().iter().fold(0.0f64, |m, v| m.max(v.abs())).max(f64::MIN_POSITIVE);
    let eps = scale * 1e-12;

    let mut l = Array2::<f64>::zeros((n, n));
    for j in 0..n {
        let mut d = a[[j, j]];
        for k in 0..j {
            d -= l[[j, k]] * l[[j, k]];
        }
        if d <= eps {
            return Err(EngineError::Singular { pivot: j, value: d });
        }
        let d = d.sqrt();
        l[[j, j]] = d;
        for i in (j + 1)..n {
            let mut s = a[[i, j]];
            for k in 0..j {
                s -= l[[i, k]] * l[[j, k]];
            }
            l[[i, j]] = s / d;
        }
    }

    // L z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut s = b[i];
        for k in 0..i {
            s -= l[[i, k]] * z[k];
        }
        z[i] = s / l[[i, i]];
    }
    // L^T x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut s = z[i];
        for k in (i + 1)..n {
            s -= l[[k, i]] * x[k];
        }
        x[i] = s / l[[i, i]];
    }
    Ok(x)
}
