use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::{build_def_database, resolve_app_paths, ContentPipelineError, ContentPlanRequest};
use crate::StartupError;

use super::input::{ActionStates, InputAction};
use super::scene::{InputSnapshot, Scene, SceneCommand, SceneRuntime};
use super::world::SceneWorld;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub max_frames: Option<u64>,
    pub content_plan_request: ContentPlanRequest,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 50,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            max_frames: None,
            content_plan_request: ContentPlanRequest::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to build content database: {0}")]
    ContentPipeline(#[from] ContentPipelineError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    A,
    D,
    F,
    W,
    X,
    Z,
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    Escape,
}

impl KeyCode {
    pub fn action(self) -> InputAction {
        match self {
            KeyCode::A | KeyCode::Z | KeyCode::ArrowLeft => InputAction::MoveLeft,
            KeyCode::D | KeyCode::X | KeyCode::ArrowRight => InputAction::MoveRight,
            KeyCode::W | KeyCode::Space | KeyCode::ArrowUp => InputAction::Jump,
            KeyCode::F => InputAction::Interact,
            KeyCode::Escape => InputAction::Quit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub pressed: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    pub frame_dt: Duration,
    pub key_events: Vec<KeyEvent>,
}

pub trait InputSource {
    fn next_frame(&mut self) -> Option<FrameInput>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSummary {
    pub frames: u64,
    pub ticks: u64,
    pub dropped_backlog: Duration,
    pub quit_requested: bool,
    pub final_title: Option<String>,
    pub final_state: Option<String>,
}

pub fn run_app(
    config: LoopConfig,
    scene: Box<dyn Scene>,
    source: &mut dyn InputSource,
) -> Result<SessionSummary, AppError> {
    let app_paths = resolve_app_paths()?;
    info!(
        root = %app_paths.root.display(),
        base_content_dir = %app_paths.base_content_dir.display(),
        mods_dir = %app_paths.mods_dir.display(),
        "startup"
    );
    let def_database = build_def_database(&app_paths, &config.content_plan_request)?;
    let mut world = SceneWorld::default();
    world.set_def_database(def_database);
    Ok(run_session(&config, scene, world, source))
}

pub fn run_session(
    config: &LoopConfig,
    scene: Box<dyn Scene>,
    world: SceneWorld,
    source: &mut dyn InputSource,
) -> SessionSummary {
    let mut runtime = SceneRuntime::new(scene, world);
    runtime.load();
    info!(entity_count = runtime.world().entity_count(), "runtime_loaded");

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();
    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        "loop_config"
    );

    let mut collector = InputCollector::default();
    let mut accumulator = Duration::ZERO;
    let mut summary = SessionSummary::default();

    while let Some(frame) = source.next_frame() {
        if config
            .max_frames
            .is_some_and(|max_frames| summary.frames >= max_frames)
        {
            info!(max_frames = summary.frames, "frame_budget_reached");
            break;
        }

        for event in &frame.key_events {
            collector.handle_key(event.key, event.pressed);
        }
        let snapshot = collector.snapshot_for_frame();
        if snapshot.quit_requested() {
            info!(reason = "quit_key", "shutdown_requested");
            summary.quit_requested = true;
            break;
        }

        let frame_dt = clamp_frame_delta(frame.frame_dt, max_frame_delta);
        let command = runtime.update(frame_dt.as_secs_f32(), &snapshot);
        summary.frames = summary.frames.saturating_add(1);
        match command {
            SceneCommand::None => {}
            SceneCommand::Quit => {
                info!(reason = "scene_command", "shutdown_requested");
                summary.quit_requested = true;
                break;
            }
        }

        accumulator = accumulator.saturating_add(frame_dt);
        let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
        for _ in 0..step_plan.ticks_to_run {
            runtime.fixed_update(fixed_dt_seconds);
            summary.ticks = summary.ticks.saturating_add(1);
        }
        accumulator = step_plan.remaining_accumulator;

        if step_plan.dropped_backlog > Duration::ZERO {
            summary.dropped_backlog = summary
                .dropped_backlog
                .saturating_add(step_plan.dropped_backlog);
            warn!(
                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                max_ticks_per_frame, "sim_clamp_triggered"
            );
        }
    }

    summary.final_title = runtime.debug_title();
    summary.final_state = runtime.dump_state();
    runtime.shutdown();
    info!(frames = summary.frames, ticks = summary.ticks, "shutdown");
    summary
}

/// Turns raw key transitions into held action state plus one-frame press
/// edges. Several keys may drive one action; the action stays down while any
/// of them is held.
#[derive(Debug, Default)]
pub struct InputCollector {
    held_keys: Vec<KeyCode>,
    action_states: ActionStates,
    pressed_edges: ActionStates,
}

impl InputCollector {
    pub fn handle_key(&mut self, key: KeyCode, is_pressed: bool) {
        if is_pressed {
            if !self.held_keys.contains(&key) {
                self.held_keys.push(key);
            }
        } else {
            self.held_keys.retain(|held| *held != key);
        }

        let action = key.action();
        let was_down = self.action_states.is_down(action);
        let is_down = self.held_keys.iter().any(|held| held.action() == action);
        self.action_states.set(action, is_down);
        if is_down && !was_down && action.is_edge_triggered() {
            self.pressed_edges.set(action, true);
        }
    }

    pub fn snapshot_for_frame(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(self.action_states, self.pressed_edges);
        self.pressed_edges = ActionStates::default();
        snapshot
    }
}

struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        let dropped_backlog = accumulator;
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}
