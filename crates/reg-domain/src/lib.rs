// reg-domain library entry point
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod model;
pub mod parameters;
pub use dataset::Dataset;
pub use error::DomainError;
pub use metrics::{Metrics, R2};
pub use model::ElasticNetModel;
pub use parameters::{ElasticNetParams, ParameterSet, ALPHA, L1_RATIO};
