//! Estructura del directorio de estado:
//!
//! ```text
//! <root>/<state_dir>/
//!   VERSION
//!   events.jsonl
//!   queue.json
//!   runs/<run-id>.json
//!   cache/<aa>/<digest>
//!   tmp/<uuid>/          forks de queue run
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PersistenceError;
use crate::fs::{atomic_write, read_optional};

pub const LAYOUT_VERSION: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    root: PathBuf,
    state: PathBuf,
}

impl StoreLayout {
    pub fn new(root: impl Into<PathBuf>, state_dir: &str) -> Self {
        let root = root.into();
        let state = root.join(state_dir);
        Self { root, state }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_dir(&self) -> &Path {
        &self.state
    }

    pub fn events(&self) -> PathBuf {
        self.state.join("events.jsonl")
    }

    pub fn queue(&self) -> PathBuf {
        self.state.join("queue.json")
    }

    pub fn runs(&self) -> PathBuf {
        self.state.join("runs")
    }

    pub fn cache(&self) -> PathBuf {
        self.state.join("cache")
    }

    pub fn tmp(&self) -> PathBuf {
        self.state.join("tmp")
    }

    pub fn blob(&self, digest: &str) -> PathBuf {
        let shard = digest.get(..2).unwrap_or("xx");
        self.cache().join(shard).join(digest)
    }

    pub fn is_initialized(&self) -> bool {
        self.state.join("VERSION").is_file()
    }

    /// Crea los directorios que falten y verifica la versión del layout.
    pub fn ensure(&self) -> Result<(), PersistenceError> {
        for d in [self.runs(), self.cache(), self.tmp()] {
            fs::create_dir_all(d)?;
        }
        let version = self.state.join("VERSION");
        match read_optional(&version)? {
            Some(v) => {
                let found = String::from_utf8_lossy(&v).trim().to_string();
                if found != LAYOUT_VERSION {
                    return Err(PersistenceError::Incompatible(format!("{} has layout version {found}, expected {LAYOUT_VERSION}",
                                                                      self.state.display())));
                }
            }
            None => atomic_write(&version, format!("{LAYOUT_VERSION}\n").as_bytes())?,
        }
        Ok(())
    }
}
