use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine::{FrameInput, InputSource, KeyCode, KeyEvent};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const BUNDLED_DEMO_SCRIPT: &str = include_str!("../../../../assets/scripts/demo.json");
const DEFAULT_FRAME_MS: u64 = 20;

#[derive(Debug, Error)]
pub(crate) enum ScriptError {
    #[error("read input script '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse input script json at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("input script has no steps")]
    Empty,
    #[error("input script frame_ms must be positive")]
    ZeroFrameDuration,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct InputScript {
    #[serde(default = "default_frame_ms")]
    pub(crate) frame_ms: u64,
    pub(crate) steps: Vec<ScriptStep>,
}

/// Key edges applied on the first frame of the step; keys stay held for the
/// remaining `frames`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScriptStep {
    #[serde(default)]
    pub(crate) label: Option<String>,
    #[serde(default)]
    pub(crate) press: Vec<KeyCode>,
    #[serde(default)]
    pub(crate) release: Vec<KeyCode>,
    #[serde(default = "default_step_frames")]
    pub(crate) frames: u32,
}

fn default_frame_ms() -> u64 {
    DEFAULT_FRAME_MS
}

fn default_step_frames() -> u32 {
    1
}

impl InputScript {
    pub(crate) fn parse(raw: &str) -> Result<Self, ScriptError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let script: InputScript = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|error| {
                let path = error.path().to_string();
                ScriptError::Parse {
                    path,
                    source: error.into_inner(),
                }
            })?;
        if script.steps.is_empty() {
            return Err(ScriptError::Empty);
        }
        if script.frame_ms == 0 {
            return Err(ScriptError::ZeroFrameDuration);
        }
        Ok(script)
    }

    pub(crate) fn load(path: &Path) -> Result<Self, ScriptError> {
        let raw = fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }

    pub(crate) fn bundled_demo() -> Result<Self, ScriptError> {
        Self::parse(BUNDLED_DEMO_SCRIPT)
    }

    pub(crate) fn total_frames(&self) -> u64 {
        self.steps
            .iter()
            .map(|step| u64::from(step.frames.max(1)))
            .sum()
    }
}

/// Replays an [`InputScript`] as fixed-duration frames.
#[derive(Debug)]
pub(crate) struct ScriptedInput {
    script: InputScript,
    step_index: usize,
    frames_into_step: u32,
}

impl ScriptedInput {
    pub(crate) fn new(script: InputScript) -> Self {
        Self {
            script,
            step_index: 0,
            frames_into_step: 0,
        }
    }
}

impl InputSource for ScriptedInput {
    fn next_frame(&mut self) -> Option<FrameInput> {
        let step = self.script.steps.get(self.step_index)?;
        let mut key_events = Vec::new();
        if self.frames_into_step == 0 {
            if let Some(label) = &step.label {
                debug!(step = self.step_index, label = %label, "script_step");
            }
            key_events.extend(step.release.iter().map(|&key| KeyEvent {
                key,
                pressed: false,
            }));
            key_events.extend(step.press.iter().map(|&key| KeyEvent { key, pressed: true }));
        }

        self.frames_into_step += 1;
        if self.frames_into_step >= step.frames.max(1) {
            self.step_index += 1;
            self.frames_into_step = 0;
        }

        Some(FrameInput {
            frame_dt: Duration::from_millis(self.script.frame_ms),
            key_events,
        })
    }
}
