use std::process::ExitCode;

use engine::run_app;
use tracing::{error, info};

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring {
        config,
        scene,
        mut input,
    } = app;

    let summary = match run_app(config, scene, &mut input) {
        Ok(summary) => summary,
        Err(err) => {
            error!(error = %err, "startup_failed");
            return ExitCode::FAILURE;
        }
    };

    info!(
        frames = summary.frames,
        ticks = summary.ticks,
        dropped_backlog_ms = summary.dropped_backlog.as_millis() as u64,
        quit_requested = summary.quit_requested,
        title = summary.final_title.as_deref().unwrap_or(""),
        "session_finished"
    );
    if let Some(state) = summary.final_state {
        println!("{state}");
    }

    ExitCode::SUCCESS
}
