/// Estado de un stage reconstruido desde el log de eventos.
///
/// Transiciones válidas:
/// - `Pending` -> `Running`
/// - `Running` -> `FinishedOk` | `Failed`
/// - cualquier estado -> `FinishedOk` al restaurar un run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    /// Nunca se ejecutó.
    Pending,
    /// Hay un `StageStarted` sin cierre (proceso interrumpido).
    Running,
    /// Última ejecución (o restauración) exitosa.
    FinishedOk,
    /// Última ejecución falló; el lock previo sigue vigente.
    Failed,
}
