//! Modelos neutrales (Artifact, StageLock, ExecutionContext, QueueEntry)

pub mod artifact;
pub mod context;
pub mod fingerprint;
pub mod queue_entry;

pub use artifact::{Artifact, ArtifactKind};
pub use context::ExecutionContext;
pub use fingerprint::{ChangeReason, DependencyStatus, StageFingerprintInput, StageLock};
pub use queue_entry::QueueEntry;
