//! Artifact neutral producido por un stage.
//!
//! Un `Artifact` es un archivo declarado (`outs` o `metrics`) todavía en
//! memoria: el engine sólo lo escribe en el workspace después de que el stage
//! completo terminó bien. `hash` lo asigna el engine sobre los bytes.

/// Rol del artifact dentro de la declaración.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Output opaco (por ejemplo el modelo serializado).
    Output,
    /// Archivo de métricas clave → escalar (YAML).
    Metrics,
}

#[derive(Debug, Clone)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: String,
    pub hash: String, // asignado por el engine al aceptar el output
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn output(path: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { kind: ArtifactKind::Output,
               path: path.into(),
               hash: String::new(),
               bytes }
    }

    pub fn metrics(path: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { kind: ArtifactKind::Metrics,
               path: path.into(),
               hash: String::new(),
               bytes }
    }
}
