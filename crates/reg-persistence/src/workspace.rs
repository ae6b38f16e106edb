//! Workspace respaldado por un directorio real.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use reg_core::errors::CoreEngineError;
use reg_core::workspace::Workspace;
use uuid::Uuid;
use walkdir::WalkDir;

use crate::error::PersistenceError;
use crate::fs::{atomic_write, atomic_write_all, read_optional, safe_join, with_retry};

#[derive(Debug)]
pub struct FsWorkspace {
    root: PathBuf,
    /// Directorio de estado: nunca se copia a un fork y aloja los forks en
    /// `tmp/`.
    state: PathBuf,
    retries: u32,
    is_fork: bool,
}

impl FsWorkspace {
    pub fn new(root: impl Into<PathBuf>, state: impl Into<PathBuf>, retries: u32) -> Self {
        Self { root: root.into(),
               state: state.into(),
               retries,
               is_fork: false }
    }

    pub fn is_fork(&self) -> bool {
        self.is_fork
    }

    /// Copia el árbol de `root` en `dst` salvo el directorio de estado y los
    /// paths de `exclude`. Los symlinks se copian como el archivo al que
    /// apuntan.
    fn copy_tree(&self, dst: &Path, exclude: &[String]) -> Result<usize, PersistenceError> {
        let skipped = exclude.iter()
                             .map(|rel| safe_join(&self.root, rel))
                             .collect::<Result<Vec<_>, _>>()?;
        let walker = WalkDir::new(&self.root).into_iter()
                                             .filter_entry(|e| e.path() != self.state && !skipped.iter().any(|s| s == e.path()));
        let mut copied = 0;
        for entry in walker {
            let entry = entry.map_err(std::io::Error::from)?;
            let Ok(rel) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            if rel.as_os_str().is_empty() {
                continue;
            }
            let target = dst.join(rel);
            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)?;
            } else if entry.path().is_file() {
                fs::copy(entry.path(), &target)?;
                copied += 1;
            }
        }
        Ok(copied)
    }
}

impl Workspace for FsWorkspace {
    fn read(&self, path: &str) -> Result<Option<Vec<u8>>, CoreEngineError> {
        let p = safe_join(&self.root, path)?;
        Ok(with_retry(self.retries, || read_optional(&p))?)
    }

    fn write(&mut self, path: &str, bytes: &[u8]) -> Result<(), CoreEngineError> {
        let p = safe_join(&self.root, path)?;
        Ok(with_retry(self.retries, || atomic_write(&p, bytes))?)
    }

    fn write_all(&mut self, files: &[(&str, &[u8])]) -> Result<(), CoreEngineError> {
        let targets = files.iter()
                           .map(|(path, bytes)| Ok((safe_join(&self.root, path)?, *bytes)))
                           .collect::<Result<Vec<_>, PersistenceError>>()?;
        Ok(with_retry(self.retries, || atomic_write_all(&targets))?)
    }

    fn root(&self) -> Option<&Path> {
        Some(&self.root)
    }

    fn fork(&self, exclude: &[String]) -> Result<Self, CoreEngineError> {
        let dir = self.state.join("tmp").join(Uuid::new_v4().to_string());
        fs::create_dir_all(&dir)?;
        let fork = Self { state: dir.join(".forks"),
                          root: dir,
                          retries: self.retries,
                          is_fork: true };
        match self.copy_tree(&fork.root, exclude) {
            Ok(n) => {
                debug!("forked workspace into {} ({n} files)", fork.root.display());
                Ok(fork)
            }
            Err(e) => {
                let root = fork.root.clone();
                if let Err(cleanup) = fork.discard() {
                    warn!("could not remove partial fork {}: {cleanup}", root.display());
                }
                Err(e.into())
            }
        }
    }

    fn discard(self) -> Result<(), CoreEngineError> {
        if self.is_fork {
            fs::remove_dir_all(&self.root).map_err(PersistenceError::from)?;
        }
        Ok(())
    }
}
