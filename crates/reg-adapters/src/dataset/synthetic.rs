//! Dataset sintético determinista con la forma del problema de diabetes
//! (442 × 10, target continuo), para demos y tests sin descargar datos.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reg_domain::{Dataset, DomainError};

pub const SYNTHETIC_ROWS: usize = 442;
pub const SYNTHETIC_FEATURES: [&str; 10] = ["AGE", "SEX", "BMI", "BP", "S1", "S2", "S3", "S4", "S5", "S6"];

// (mínimo, máximo, peso sobre la feature escalada a [-1, 1])
const COLUMNS: [(f64, f64, f64); 10] = [(19.0, 79.0, 2.0),
                                        (1.0, 2.0, -10.0),
                                        (18.0, 42.2, 45.0),
                                        (62.0, 133.0, 22.0),
                                        (97.0, 301.0, -6.0),
                                        (41.6, 242.4, 3.0),
                                        (22.0, 99.0, -14.0),
                                        (2.0, 9.09, 8.0),
                                        (3.26, 6.11, 38.0),
                                        (58.0, 124.0, 4.0)];
const BASELINE: f64 = 152.0;
const NOISE: f64 = 40.0;

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Genera `rows` filas con semilla fija. Misma semilla, mismo dataset.
pub fn synthetic_dataset(rows: usize, seed: u64) -> Result<Dataset, DomainError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let p = COLUMNS.len();
    let mut x = Array2::<f64>::zeros((rows, p));
    let mut y = Array1::<f64>::zeros(rows);
    for i in 0..rows {
        let mut target = BASELINE;
        for (j, (lo, hi, w)) in COLUMNS.iter().enumerate() {
            let v = if j == 1 {
                if rng.gen_bool(0.5) { 2.0 } else { 1.0 }
            } else if j == 0 {
                rng.gen_range(*lo..=*hi).round()
            } else {
                round2(rng.gen_range(*lo..=*hi))
            };
            x[[i, j]] = v;
            let scaled = 2.0 * (v - lo) / (hi - lo) - 1.0;
            target += w * scaled;
        }
        // Box-Muller
        let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
        let u2: f64 = rng.gen();
        target += NOISE * (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        y[i] = target.round().max(25.0);
    }
    let names = SYNTHETIC_FEATURES.iter().map(|s| s.to_string()).collect();
    Dataset::new(x, y, names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_data() {
        let a = synthetic_dataset(SYNTHETIC_ROWS, 0).unwrap();
        let b = synthetic_dataset(SYNTHETIC_ROWS, 0).unwrap();
        assert_eq!(a, b);
        assert_eq!((a.n_samples(), a.n_features()), (442, 10));
        assert_ne!(a, synthetic_dataset(SYNTHETIC_ROWS, 1).unwrap());
    }
}
