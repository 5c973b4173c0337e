mod input;
mod loop_runner;
mod scene;
mod services;
mod world;

pub use input::InputAction;
pub use loop_runner::{
    run_app, run_session, AppError, FrameInput, InputCollector, InputSource, KeyCode, KeyEvent,
    LoopConfig, SessionSummary,
};
pub use scene::{InputSnapshot, Scene, SceneCommand};
pub use services::{AnimationSink, OverlaySink, PhysicsQuery, RegionSink, WorldFactory};
pub use world::{
    AnimationClip, Collider, ColliderShape, Entity, EntityDesc, EntityId, LayerMask,
    OverlayHandle, SceneWorld, Transform, Vec2,
};
