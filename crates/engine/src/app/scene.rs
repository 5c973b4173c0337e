use super::input::{ActionStates, InputAction};
use super::world::SceneWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    actions: ActionStates,
    pressed: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(actions: ActionStates, pressed: ActionStates) -> Self {
        Self { actions, pressed }
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    /// True only on the frame the action went from up to down.
    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed.is_down(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.actions.set(action, true);
        self.pressed.set(action, true);
        self
    }

    pub fn horizontal_axis(&self) -> f32 {
        if self.is_down(InputAction::MoveLeft) {
            -1.0
        } else if self.is_down(InputAction::MoveRight) {
            1.0
        } else {
            0.0
        }
    }

    pub fn jump_pressed(&self) -> bool {
        self.was_pressed(InputAction::Jump)
    }

    pub fn interact_pressed(&self) -> bool {
        self.was_pressed(InputAction::Interact)
    }

    pub fn quit_requested(&self) -> bool {
        self.was_pressed(InputAction::Quit)
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    /// Variable-rate step: input sampling and discrete event checks.
    fn update(
        &mut self,
        frame_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    /// Fixed-rate physics integration.
    fn fixed_update(&mut self, fixed_dt_seconds: f32, world: &mut SceneWorld);
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
    fn dump_state(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
}

pub(crate) struct SceneRuntime {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

impl SceneRuntime {
    pub(crate) fn new(scene: Box<dyn Scene>, world: SceneWorld) -> Self {
        Self {
            scene,
            world,
            is_loaded: false,
        }
    }

    pub(crate) fn load(&mut self) {
        if self.is_loaded {
            return;
        }
        self.scene.load(&mut self.world);
        self.world.apply_pending();
        self.is_loaded = true;
    }

    pub(crate) fn update(&mut self, frame_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        let command = self.scene.update(frame_dt_seconds, input, &mut self.world);
        self.world.apply_pending();
        command
    }

    pub(crate) fn fixed_update(&mut self, fixed_dt_seconds: f32) {
        self.scene.fixed_update(fixed_dt_seconds, &mut self.world);
        self.world.apply_pending();
    }

    pub(crate) fn shutdown(&mut self) {
        if self.is_loaded {
            self.scene.unload(&mut self.world);
            self.world.clear();
            self.is_loaded = false;
        }
    }

    pub(crate) fn world(&self) -> &SceneWorld {
        &self.world
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title(&self.world)
    }

    pub(crate) fn dump_state(&self) -> Option<String> {
        self.scene.dump_state(&self.world)
    }
}
