use std::path::PathBuf;

use engine::{ContentPlanRequest, LoopConfig, Scene};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::gameplay;
use super::script::{InputScript, ScriptError, ScriptedInput};

const ENABLED_MODS_ENV_VAR: &str = "MASKED_ENABLED_MODS";
const SCRIPT_ENV_VAR: &str = "MASKED_SCRIPT";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
    pub(crate) input: ScriptedInput,
}

pub(crate) fn build_app() -> Result<AppWiring, ScriptError> {
    init_tracing();
    info!("=== Masked Startup ===");

    let script = load_script(script_path_from_env())?;
    info!(
        steps = script.steps.len(),
        frames = script.total_frames(),
        frame_ms = script.frame_ms,
        "input_script_loaded"
    );

    let config = LoopConfig {
        content_plan_request: enabled_mods_from_env(),
        ..LoopConfig::default()
    };

    Ok(AppWiring {
        config,
        scene: gameplay::build_level_scene(),
        input: ScriptedInput::new(script),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn enabled_mods_from_env() -> ContentPlanRequest {
    std::env::var(ENABLED_MODS_ENV_VAR)
        .map(|raw| ContentPlanRequest::from_mod_list(&raw))
        .unwrap_or_default()
}

fn script_path_from_env() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os(SCRIPT_ENV_VAR))
        .map(PathBuf::from)
}

fn load_script(path: Option<PathBuf>) -> Result<InputScript, ScriptError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "input_script_path");
            InputScript::load(&path)
        }
        None => {
            info!("input_script_bundled_demo");
            InputScript::bundled_demo()
        }
    }
}
