pub mod types;
pub use types::{InMemoryLockRepository, LockRepository, StageState};
