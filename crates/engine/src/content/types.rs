use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentPlanRequest {
    pub enabled_mods: Vec<String>,
}

impl ContentPlanRequest {
    pub fn from_mod_list(raw: &str) -> Self {
        let enabled_mods = raw
            .split(',')
            .map(str::trim)
            .filter(|mod_id| !mod_id.is_empty())
            .map(str::to_string)
            .collect();
        Self { enabled_mods }
    }
}

#[derive(Debug, Error)]
pub enum ContentPlanError {
    #[error("enabled mod id cannot be empty")]
    EmptyEnabledMod,
    #[error("duplicate enabled mod id in request: {mod_id}")]
    DuplicateEnabledMod { mod_id: String },
    #[error("enabled mod does not exist on disk: {mod_id} at {expected_dir}")]
    EnabledModMissing {
        mod_id: String,
        expected_dir: PathBuf,
    },
}
