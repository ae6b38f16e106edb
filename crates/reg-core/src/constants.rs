//! Constantes del motor core.
//!
//! Agrupa valores estáticos que participan en el cálculo de fingerprints y en
//! la compatibilidad entre versiones del motor. `ENGINE_VERSION` entra en el
//! fingerprint agregado de cada lock: cambiarla invalida todos los locks
//! previos aunque parámetros y dependencias no cambien.

/// Versión lógica del motor. Mantener estable mientras no haya cambios
/// incompatibles en el cálculo de digests.
pub const ENGINE_VERSION: &str = "R1.0";

/// Archivo de parámetros por defecto de una declaración de stage.
pub const DEFAULT_PARAMS_FILE: &str = "params.yaml";

/// Identificador de la fila sintética que representa el estado vivo.
pub const WORKSPACE_ROW_ID: &str = "workspace";

/// Prefijo de los identificadores cortos de run.
pub const RUN_ID_PREFIX: &str = "exp-";

/// Cantidad de caracteres hex usados en el identificador corto.
pub const SHORT_ID_LEN: usize = 7;
