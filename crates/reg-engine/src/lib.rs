//! reg-engine: numérica nativa para el stage de entrenamiento.
//!
//! Split determinista (MT19937), Elastic Net por coordinate descent,
//! mínimos cuadrados cerrados y R². Sin estado global: todas las funciones
//! son puras respecto a sus argumentos.
pub mod elastic_net;
pub mod error;
pub mod fit;
pub mod linalg;
pub mod metrics;
pub mod ols;
pub mod preprocess;
pub mod rng;
pub mod split;

pub use elastic_net::{coordinate_descent, DescentResult, ElasticNetConfig, DEFAULT_MAX_ITER, DEFAULT_TOL};
pub use error::EngineError;
pub use fit::{fit_elastic_net, LinearFit};
pub use metrics::{predict, r2_score};
pub use ols::least_squares;
pub use preprocess::{center, scale_unit_norm, Centered};
pub use rng::Mt19937;
pub use split::{train_test_split, SplitIndices};
