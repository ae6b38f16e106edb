//! Encoder Dominio → Artifact neutral.
//!
//! Empaqueta entidades de `reg-domain` en `Artifact` del core. El encoder no
//! calcula `hash` (lo hace el engine al aceptar los outputs).

use reg_core::model::Artifact;
use reg_domain::{DomainError, ElasticNetModel, Metrics};

pub trait DomainArtifactEncoder {
    fn encode_model(&self, path: &str, model: &ElasticNetModel) -> Artifact;
    fn encode_metrics(&self, path: &str, metrics: &Metrics) -> Result<Artifact, DomainError>;
}

/// Modelo en formato binario `RGFM`, métricas en YAML.
#[derive(Debug, Clone, Default)]
pub struct SimpleDomainEncoder;

impl DomainArtifactEncoder for SimpleDomainEncoder {
    fn encode_model(&self, path: &str, model: &ElasticNetModel) -> Artifact {
        Artifact::output(path, model.to_bytes())
    }

    fn encode_metrics(&self, path: &str, metrics: &Metrics) -> Result<Artifact, DomainError> {
        Ok(Artifact::metrics(path, metrics.to_yaml_string()?.into_bytes()))
    }
}
