#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
enum DoorState {
    Locked,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
enum DoorOpenPolicy {
    /// Destroys the linked target and the lock itself.
    Destroy,
    /// Keeps the door visible, turns off its colliders and plays `Open`.
    DisableAndAnimate,
}

impl From<DoorOpenPolicyKind> for DoorOpenPolicy {
    fn from(kind: DoorOpenPolicyKind) -> Self {
        match kind {
            DoorOpenPolicyKind::Destroy => DoorOpenPolicy::Destroy,
            DoorOpenPolicyKind::DisableAndAnimate => DoorOpenPolicy::DisableAndAnimate,
        }
    }
}

trait DoorWorld: WorldFactory + AnimationSink {}

impl<T: WorldFactory + AnimationSink> DoorWorld for T {}

#[derive(Debug, Clone, PartialEq)]
struct Door {
    name: String,
    lock: EntityId,
    target: Option<EntityId>,
    required: MaskKind,
    policy: DoorOpenPolicy,
    state: DoorState,
}

impl Door {
    fn new(
        name: impl Into<String>,
        lock: EntityId,
        target: Option<EntityId>,
        required: MaskKind,
        policy: DoorOpenPolicy,
    ) -> Self {
        Self {
            name: name.into(),
            lock,
            target,
            required,
            policy,
            state: DoorState::Locked,
        }
    }

    fn try_open(&mut self, equipped: Option<MaskKind>, world: &mut dyn DoorWorld) -> bool {
        if self.state == DoorState::Open || equipped != Some(self.required) {
            return false;
        }

        match self.policy {
            DoorOpenPolicy::Destroy => {
                match self.target {
                    Some(target) => {
                        world.destroy(target);
                    }
                    None => debug!(door = %self.name, handle = "target", "door_handle_missing"),
                }
                world.destroy(self.lock);
            }
            DoorOpenPolicy::DisableAndAnimate => {
                world.set_collider_enabled(self.lock, false);
                let animated = match self.target {
                    Some(target) => {
                        world.set_collider_enabled(target, false);
                        target
                    }
                    None => self.lock,
                };
                world.play_animation(animated, AnimationClip::Open);
            }
        }

        self.state = DoorState::Open;
        info!(
            door = %self.name,
            required = ?self.required,
            policy = ?self.policy,
            "door_opened"
        );
        true
    }
}
