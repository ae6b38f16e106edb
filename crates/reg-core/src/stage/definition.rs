use crate::model::ExecutionContext;

use super::declaration::StageDeclaration;
use super::run_result::StageRunResult;

/// Trait que define un stage ejecutable. Implementaciones deben ser puras
/// respecto a params + inputs del contexto: `run_all` las invoca en paralelo
/// sobre workspaces distintos.
pub trait StageDefinition: Send + Sync {
    /// Contrato declarativo (params, deps, outs, metrics).
    fn declaration(&self) -> &StageDeclaration;

    /// Nombre estable del stage dentro del pipeline.
    fn name(&self) -> &str {
        &self.declaration().name
    }

    /// Ejecución del stage. Los outputs devueltos no se escriben aquí.
    fn run(&self, ctx: &ExecutionContext) -> StageRunResult;
}
