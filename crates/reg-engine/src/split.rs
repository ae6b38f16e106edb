use crate::error::EngineError;
use crate::rng::Mt19937;

/// Índices de entrenamiento y prueba.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Partición aleatoria reproducible de `n` filas.
///
/// `n_test = ceil(test_size * n)`; las filas de prueba son las primeras
/// `n_test` de la permutación y el resto, en orden de permutación, son de
/// entrenamiento.
pub fn train_test_split(n: usize, test_size: f64, seed: u32) -> Result<SplitIndices, EngineError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(EngineError::InvalidArgument(format!("test_size debe estar en (0, 1): {test_size}")));
    }
    let n_test = (test_size * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(EngineError::InvalidArgument(format!("con {n} filas y test_size={test_size} una partición queda vacía")));
    }
    let perm = Mt19937::new(seed).permutation(n);
    let (test, train) = perm.split_at(n_test);
    Ok(SplitIndices { train: train.to_vec(),
                      test: test.to_vec() })
}
