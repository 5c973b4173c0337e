use std::collections::HashMap;
use std::fmt;

use engine::{
    AnimationClip, AnimationSink, Collider, DefDatabase, DoorArchetype, DoorOpenPolicyKind,
    Entity, EntityDesc, EntityId, InputSnapshot, LayerMask, MaskArchetype, OverlayHandle,
    OverlaySink, PhysicsQuery, PlayerArchetype, RegionSink, Scene, SceneCommand, SceneWorld,
    Transform, Vec2, WorldFactory,
};
use serde::Serialize;
use tracing::{debug, info, warn};

const PLAYER_DEF_NAME: &str = "player.default";
const CHECKPOINT_TAG: &str = "Checkpoint";
const HAZARD_TAGS: [&str; 2] = ["Spikes", "PumpkinMaskCoverSpikes"];
const DEFAULT_JUMP_MULTIPLIER: f32 = 1.5;
const DEFAULT_GRAVITY_MULTIPLIER: f32 = 2.5;
const DEFAULT_HIDDEN_TAG: &str = "PumpkinMaskCover";
const DEFAULT_LIT_ALPHA: f32 = 0.0;
const MIN_PHYSICS_PARAM: f32 = 1e-4;
const LANDING_TOLERANCE: f32 = 1e-3;
const BLOCKING_RADIUS_FACTOR: f32 = 0.9;
const PICKUP_RADIUS: f32 = 0.3;
const DARKNESS_ALPHA: f32 = 0.8;

include!("physics.rs");
include!("masks.rs");
include!("equipment.rs");
include!("door.rs");
include!("checkpoint.rs");
include!("player.rs");
include!("level.rs");
include!("scene_impl.rs");
include!("util.rs");

pub(crate) fn build_level_scene() -> Box<dyn Scene> {
    Box::new(LevelScene::new(demo_level()))
}
