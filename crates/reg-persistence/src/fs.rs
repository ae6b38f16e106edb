//! Utilidades de archivo compartidas por los stores.

use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use log::warn;
use uuid::Uuid;

use crate::error::{is_retryable, PersistenceError};

/// Reintenta `f` ante errores transitorios con backoff lineal (15ms, 30ms, ...).
pub fn with_retry<F, T>(retries: u32, mut f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if is_retryable(&e) && attempts < retries => {
                let delay_ms = 15 * u64::from(attempts + 1);
                warn!("retryable error (attempt {}): {e} -> sleeping {delay_ms}ms", attempts + 1);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}

/// Escribe en un temporal del mismo directorio y renombra. El destino queda
/// con el contenido viejo o con el nuevo, nunca a medias.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
    atomic_write_all(&[(path.to_path_buf(), bytes)])
}

/// Escribe todos los temporales antes de renombrar el primero. Si falla
/// la escritura de cualquiera, ningún destino cambia.
pub fn atomic_write_all(files: &[(PathBuf, &[u8])]) -> Result<(), PersistenceError> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(files.len());
    for (path, bytes) in files {
        match stage_temp(path, bytes) {
            Ok(tmp) => staged.push((tmp, path.as_path())),
            Err(e) => {
                discard_temps(staged.iter().map(|(tmp, _)| tmp.as_path()));
                return Err(e);
            }
        }
    }
    for (i, (tmp, path)) in staged.iter().enumerate() {
        if let Err(e) = fs::rename(tmp, path) {
            discard_temps(staged[i..].iter().map(|(tmp, _)| tmp.as_path()));
            return Err(e.into());
        }
    }
    Ok(())
}

fn stage_temp(path: &Path, bytes: &[u8]) -> Result<PathBuf, PersistenceError> {
    let dir = path.parent()
                  .ok_or_else(|| PersistenceError::Io(format!("no parent directory for {}", path.display())))?;
    fs::create_dir_all(dir)?;
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let tmp = dir.join(format!(".{name}.{}.tmp", Uuid::new_v4().simple()));
    let res = (|| -> std::io::Result<()> {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()
    })();
    match res {
        Ok(()) => Ok(tmp),
        Err(e) => {
            discard_temps(std::iter::once(tmp.as_path()));
            Err(e.into())
        }
    }
}

fn discard_temps<'a>(temps: impl Iterator<Item = &'a Path>) {
    for tmp in temps {
        if let Err(e) = fs::remove_file(tmp) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("could not remove temporary file {}: {e}", tmp.display());
            }
        }
    }
}

/// `None` si el archivo no existe.
pub fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, PersistenceError> {
    match fs::read(path) {
        Ok(b) => Ok(Some(b)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Une `rel` a `root` rechazando rutas absolutas o que salgan de la raíz.
pub fn safe_join(root: &Path, rel: &str) -> Result<PathBuf, PersistenceError> {
    let p = Path::new(rel);
    if rel.is_empty() || !p.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir)) {
        return Err(PersistenceError::Io(format!("path '{rel}' is outside the workspace")));
    }
    Ok(root.join(p))
}
