#[derive(Debug, Default)]
struct AnimationTracker {
    current: Option<AnimationClip>,
}

impl AnimationTracker {
    fn derive(grounded: bool, horizontal_input: f32) -> AnimationClip {
        if !grounded {
            AnimationClip::Jump
        } else if horizontal_input != 0.0 {
            AnimationClip::Walk
        } else {
            AnimationClip::Idle
        }
    }

    /// Returns the clip only when it differs from the last one reported.
    fn update(&mut self, clip: AnimationClip) -> Option<AnimationClip> {
        if self.current == Some(clip) {
            return None;
        }
        self.current = Some(clip);
        Some(clip)
    }

    fn current(&self) -> Option<AnimationClip> {
        self.current
    }
}

#[derive(Debug)]
struct Character {
    entity: EntityId,
    motor: Motor,
    velocity: Vec2,
    horizontal_input: f32,
    grounded: bool,
    facing_left: bool,
    ground_probe: GroundProbe,
    body_radius: f32,
    interact_range: f32,
    drop_offset: Vec2,
    slot: EquipmentSlot,
    animation: AnimationTracker,
}

impl Character {
    fn new(entity: EntityId, archetype: &PlayerArchetype) -> Self {
        Self {
            entity,
            motor: Motor::new(MovementParams::from_archetype(archetype)),
            velocity: Vec2::ZERO,
            horizontal_input: 0.0,
            grounded: false,
            facing_left: false,
            ground_probe: GroundProbe {
                offset: Vec2::new(0.0, archetype.ground_check_offset_y),
                radius: archetype.ground_check_radius,
            },
            body_radius: archetype.body_radius,
            interact_range: archetype.interact_range,
            drop_offset: Vec2::new(0.0, archetype.drop_offset_y),
            slot: EquipmentSlot::Empty,
            animation: AnimationTracker::default(),
        }
    }

    fn position(&self, world: &SceneWorld) -> Option<Vec2> {
        world
            .find_entity(self.entity)
            .map(|entity| entity.transform.position)
    }

    fn sample_input(&mut self, input: &InputSnapshot) {
        self.horizontal_input = input.horizontal_axis();
        if self.horizontal_input > 0.0 {
            self.facing_left = false;
        } else if self.horizontal_input < 0.0 {
            self.facing_left = true;
        }
    }

    fn check_ground(&mut self, physics: &dyn PhysicsQuery, position: Vec2) {
        self.grounded = self.ground_probe.is_grounded(physics, position);
    }

    fn try_jump(&mut self, jump_pressed: bool) -> bool {
        if !self.grounded || !jump_pressed {
            return false;
        }
        self.velocity.y = self.motor.physics.jump_velocity();
        true
    }

    fn update_animation(&mut self, sink: &mut dyn AnimationSink) {
        let clip = AnimationTracker::derive(self.grounded, self.horizontal_input);
        if let Some(changed) = self.animation.update(clip) {
            sink.play_animation(self.entity, changed);
        }
        sink.set_facing(self.entity, self.facing_left);
    }

    fn equip(
        &mut self,
        definition: MaskDefinition,
        world: &mut dyn MaskWorld,
        drop_anchor: Vec2,
    ) -> SwapOutcome {
        let mut ctx = MaskContext {
            world,
            motor: &mut self.motor,
            wearer: self.entity,
        };
        self.slot.pickup(definition, &mut ctx, drop_anchor)
    }

    fn consume_mask(
        &mut self,
        required: MaskKind,
        world: &mut dyn MaskWorld,
    ) -> Result<MaskKind, SlotError> {
        let mut ctx = MaskContext {
            world,
            motor: &mut self.motor,
            wearer: self.entity,
        };
        self.slot.consume(required, &mut ctx)
    }

    fn integrate(&mut self, world: &mut SceneWorld, dt: f32) {
        let Some(mut position) = self.position(world) else {
            return;
        };

        self.velocity.x = self.motor.physics.horizontal_velocity(
            self.velocity.x,
            self.horizontal_input,
            self.grounded,
            dt,
        );
        self.velocity.y -= self.motor.effective_gravity() * dt;

        let next_x = position.x + self.velocity.x * dt;
        let blocking_radius = self.body_radius * BLOCKING_RADIUS_FACTOR;
        if self.velocity.x != 0.0
            && is_blocked(world, Vec2::new(next_x, position.y), blocking_radius)
        {
            self.velocity.x = 0.0;
        } else {
            position.x = next_x;
        }

        let next_y = position.y + self.velocity.y * dt;
        let landing = if self.velocity.y <= 0.0 {
            world.landing_surface(
                position.x,
                self.body_radius,
                position.y - self.body_radius + LANDING_TOLERANCE,
                next_y - self.body_radius,
                LayerMask::GROUND,
            )
        } else {
            None
        };
        match landing {
            Some(top) => {
                position.y = top + self.body_radius;
                self.velocity.y = 0.0;
            }
            None => position.y = next_y,
        }

        if let Some(entity) = world.find_entity_mut(self.entity) {
            entity.transform.position = position;
        }
        world.sync_attachments();
    }

    fn respawn(&mut self, world: &mut SceneWorld, position: Vec2) {
        if let Some(entity) = world.find_entity_mut(self.entity) {
            entity.transform.position = position;
        }
        self.velocity = Vec2::ZERO;
        world.sync_attachments();
        info!(x = position.x, y = position.y, "player_respawned");
    }
}
