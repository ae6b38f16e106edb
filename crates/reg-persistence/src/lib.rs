//! reg-persistence
//!
//! Implementaciones en disco de los puertos del core:
//! - `FsWorkspace`: archivos del usuario, escritura atómica, forks del árbol en `tmp/`.
//! - `FileEventStore`: `events.jsonl` append-only.
//! - `FileRunLedger`: `runs/<id>.json` + `cache/` por digest.
//! - `FileQueueStore`: `queue.json`.
//! - `config`: `LedgerConfig` desde entorno / `.env`.

pub mod config;
pub mod error;
pub mod event_store;
pub mod fs;
pub mod layout;
pub mod ledger;
pub mod queue_store;
pub mod workspace;

use std::path::PathBuf;

use reg_core::StageEngine;

pub use config::{init_dotenv, LedgerConfig};
pub use error::PersistenceError;
pub use event_store::FileEventStore;
pub use layout::StoreLayout;
pub use ledger::FileRunLedger;
pub use queue_store::FileQueueStore;
pub use workspace::FsWorkspace;

pub type FileEngine = StageEngine<FsWorkspace, FileEventStore, FileRunLedger, FileQueueStore>;

/// Abre (creando si falta) el directorio de estado bajo `root` y arma un
/// engine sin stages registrados.
pub fn open_engine(root: impl Into<PathBuf>, cfg: &LedgerConfig) -> Result<FileEngine, PersistenceError> {
    let root = root.into();
    let layout = StoreLayout::new(root.clone(), &cfg.state_dir);
    layout.ensure()?;
    log::debug!("opened state directory {}", layout.state_dir().display());
    Ok(StageEngine::new(FsWorkspace::new(root, layout.state_dir(), cfg.retries),
                        FileEventStore::new(layout.events(), cfg.retries),
                        FileRunLedger::new(layout.clone(), cfg.retries),
                        FileQueueStore::new(layout.queue(), cfg.retries)))
}
