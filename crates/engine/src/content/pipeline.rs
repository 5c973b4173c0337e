use thiserror::Error;
use tracing::info;

use crate::AppPaths;

use super::compiler::{compile_mod_sources, ContentCompileError};
use super::database::DefDatabase;
use super::discovery::discover_mod_sources;
use super::types::{ContentPlanError, ContentPlanRequest};

#[derive(Debug, Error)]
pub enum ContentPipelineError {
    #[error(transparent)]
    Plan(#[from] ContentPlanError),
    #[error(transparent)]
    Compile(#[from] ContentCompileError),
}

pub fn build_def_database(
    app_paths: &AppPaths,
    request: &ContentPlanRequest,
) -> Result<DefDatabase, ContentPipelineError> {
    let sources = discover_mod_sources(app_paths, request)?;

    let database = compile_mod_sources(&sources)?;
    info!(
        total_mods = sources.len(),
        player_defs = database.player_defs().len(),
        mask_defs = database.mask_defs().len(),
        door_defs = database.door_defs().len(),
        "content_pipeline_summary"
    );
    Ok(database)
}
