use std::collections::HashSet;
use std::path::PathBuf;

use tracing::info;

use crate::AppPaths;

use super::types::{ContentPlanError, ContentPlanRequest};

const BASE_MOD_ID: &str = "base";

/// A directory of def XML files. Later sources override earlier ones.
#[derive(Debug, Clone)]
pub(crate) struct ContentSource {
    pub mod_id: String,
    pub load_order: u32,
    pub root_dir: PathBuf,
}

/// Base content first, then every enabled mod in request order.
pub(crate) fn discover_mod_sources(
    app_paths: &AppPaths,
    request: &ContentPlanRequest,
) -> Result<Vec<ContentSource>, ContentPlanError> {
    let mut sources = vec![ContentSource {
        mod_id: BASE_MOD_ID.to_string(),
        load_order: 0,
        root_dir: app_paths.base_content_dir.clone(),
    }];
    let mut enabled = HashSet::<&str>::new();

    for raw_id in &request.enabled_mods {
        let mod_id = raw_id.trim();
        if mod_id.is_empty() {
            return Err(ContentPlanError::EmptyEnabledMod);
        }
        if mod_id == BASE_MOD_ID || !enabled.insert(mod_id) {
            return Err(ContentPlanError::DuplicateEnabledMod {
                mod_id: mod_id.to_string(),
            });
        }

        let root_dir = app_paths.mods_dir.join(mod_id);
        if !root_dir.is_dir() {
            return Err(ContentPlanError::EnabledModMissing {
                mod_id: mod_id.to_string(),
                expected_dir: root_dir,
            });
        }
        sources.push(ContentSource {
            mod_id: mod_id.to_string(),
            load_order: sources.len() as u32,
            root_dir,
        });
    }

    for source in &sources {
        info!(
            mod_id = %source.mod_id,
            load_order = source.load_order,
            root_dir = %source.root_dir.display(),
            "content_source_discovered"
        );
    }
    Ok(sources)
}
