use crate::model::ExecutionContext;
use serde_json::Value;

/// Trait para inyectores de parámetros.
pub trait ParamInjector: Send + Sync + std::fmt::Debug {
    /// Toma los params base y el contexto y devuelve las claves a
    /// sobrescribir, que se mergean según el orden del composite.
    fn inject(&self, base: &Value, ctx: &ExecutionContext) -> Value;
}
