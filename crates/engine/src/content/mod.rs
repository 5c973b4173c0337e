mod compiler;
mod database;
mod discovery;
mod pipeline;
mod types;

pub use compiler::{ContentCompileError, ContentErrorCode, SourceLocation};
pub use database::{
    DefDatabase, DoorArchetype, DoorOpenPolicyKind, MaskArchetype, PlayerArchetype,
};
pub use pipeline::{build_def_database, ContentPipelineError};
pub use types::{ContentPlanError, ContentPlanRequest};
