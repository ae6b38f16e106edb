//! Workspace explícito: el único lugar donde el motor lee y escribe archivos
//! del usuario (params, dependencias, outputs).

mod memory;
mod params;

pub use memory::InMemoryWorkspace;
pub use params::{load_metrics, load_params, params_subset, parse_metrics, store_params};

use std::path::Path;

use crate::errors::CoreEngineError;

pub trait Workspace: Send {
    /// Contenido de un archivo relativo a la raíz; `None` si no existe.
    fn read(&self, path: &str) -> Result<Option<Vec<u8>>, CoreEngineError>;

    /// Escritura atómica (el archivo queda con el contenido viejo o el nuevo).
    fn write(&mut self, path: &str, bytes: &[u8]) -> Result<(), CoreEngineError>;

    /// Escribe un conjunto de archivos que debe quedar completo: si alguno
    /// falla antes de publicarse, ninguno cambia.
    fn write_all(&mut self, files: &[(&str, &[u8])]) -> Result<(), CoreEngineError> {
        for (path, bytes) in files {
            self.write(path, bytes)?;
        }
        Ok(())
    }

    /// Raíz en disco, si el workspace está respaldado por archivos.
    fn root(&self) -> Option<&Path> {
        None
    }

    /// Copia aislada de todo el workspace salvo los paths de `exclude`.
    fn fork(&self, exclude: &[String]) -> Result<Self, CoreEngineError>
        where Self: Sized;

    /// Libera los recursos de un fork.
    fn discard(self) -> Result<(), CoreEngineError>
        where Self: Sized
    {
        Ok(())
    }
}
