use ndarray::{Array1, Array2};

use crate::elastic_net::{coordinate_descent, ElasticNetConfig};
use crate::error::EngineError;
use crate::ols::least_squares;
use crate::preprocess::center;

/// Modelo lineal ajustado con intercepto.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFit {
    pub coef: Array1<f64>,
    pub intercept: f64,
    pub n_iter: usize,
    pub converged: bool,
}

/// Ajusta Elastic Net con intercepto.
///
/// Con `alpha = 0` resuelve mínimos cuadrados en forma cerrada; si el sistema
/// es singular vuelve a coordinate descent con una advertencia.
pub fn fit_elastic_net(x: &Array2<f64>, y: &Array1<f64>, cfg: &ElasticNetConfig) -> Result<LinearFit, EngineError> {
    cfg.validate()?;
    let c = center(x, y)?;
    let (coef, n_iter, converged) = if cfg.alpha == 0.0 {
        match least_squares(&c.x, &c.y) {
            Ok(w) => (w, 0, true),
            Err(EngineError::Singular { pivot, value }) => {
                log::warn!("normal equations are singular (pivot {pivot} = {value:e}); using coordinate descent");
                let r = coordinate_descent(&c.x, &c.y, cfg)?;
                (r.coef, r.n_iter, r.converged)
            }
            Err(e) => return Err(e),
        }
    } else {
        let r = coordinate_descent(&c.x, &c.y, cfg)?;
        (r.coef, r.n_iter, r.converged)
    };
    let intercept = c.y_mean - c.x_mean.dot(&coef);
    Ok(LinearFit { coef,
                   intercept,
                   n_iter,
                   converged })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn alpha_zero_fits_affine_data_exactly() {
        let x = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [2.0, 3.0], [4.0, 1.0]];
        let y = x.dot(&array![1.5, -0.5]) + 7.0;
        let fit = fit_elastic_net(&x, &y, &ElasticNetConfig::new(0.0, 0.5)).unwrap();
        assert!((fit.coef[0] - 1.5).abs() < 1e-9);
        assert!((fit.coef[1] + 0.5).abs() < 1e-9);
        assert!((fit.intercept - 7.0).abs() < 1e-9);
        assert_eq!(fit.n_iter, 0);
    }

    #[test]
    fn large_alpha_predicts_the_mean() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![2.0, 4.0, 9.0];
        let fit = fit_elastic_net(&x, &y, &ElasticNetConfig::new(1e6, 1.0)).unwrap();
        assert_eq!(fit.coef[0], 0.0);
        assert!((fit.intercept - 5.0).abs() < 1e-12);
    }
}
