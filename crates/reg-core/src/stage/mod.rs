//! Declaración y definición de stages.

pub mod declaration;
pub mod definition;
pub mod run_result;
pub mod status;

pub use declaration::{PipelineFile, StageDeclaration};
pub use definition::StageDefinition;
pub use run_result::StageRunResult;
pub use status::StageStatus;
