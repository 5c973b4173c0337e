#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct MovementParams {
    start_speed: f32,
    acceleration: f32,
    max_speed: f32,
    jump_height: f32,
    time_to_apex: f32,
    air_control: bool,
}

impl MovementParams {
    fn from_archetype(archetype: &PlayerArchetype) -> Self {
        Self {
            start_speed: archetype.start_speed,
            acceleration: archetype.acceleration,
            max_speed: archetype.max_speed,
            jump_height: archetype.jump_height,
            time_to_apex: archetype.time_to_apex,
            air_control: archetype.air_control,
        }
    }
}

/// Height/time parameterised jump model. `gravity_strength` and
/// `jump_velocity` are derived and refreshed on every parameter write.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PhysicsModel {
    params: MovementParams,
    gravity_strength: f32,
    jump_velocity: f32,
}

impl PhysicsModel {
    fn new(params: MovementParams) -> Self {
        let mut model = Self {
            params,
            gravity_strength: 0.0,
            jump_velocity: 0.0,
        };
        model.recompute();
        model
    }

    fn params(&self) -> &MovementParams {
        &self.params
    }

    fn gravity_strength(&self) -> f32 {
        self.gravity_strength
    }

    fn jump_velocity(&self) -> f32 {
        self.jump_velocity
    }

    fn jump_height(&self) -> f32 {
        self.params.jump_height
    }

    fn set_jump_height(&mut self, jump_height: f32) {
        self.params.jump_height = jump_height;
        self.recompute();
    }

    /// Clamps only the values fed into the derivation; stored inputs keep
    /// whatever was written.
    fn recompute(&mut self) {
        let height = clamp_physics_param("jump_height", self.params.jump_height);
        let apex = clamp_physics_param("time_to_apex", self.params.time_to_apex);
        self.gravity_strength = 2.0 * height / (apex * apex);
        self.jump_velocity = self.gravity_strength * apex;
    }

    fn horizontal_velocity(&self, velocity_x: f32, input: f32, grounded: bool, dt: f32) -> f32 {
        if !grounded && !self.params.air_control {
            return velocity_x;
        }
        let max_delta = self.params.acceleration * dt;
        if input != 0.0 {
            let mut current = velocity_x;
            if current.abs() < self.params.start_speed {
                current = input * self.params.start_speed;
            }
            move_towards(current, input * self.params.max_speed, max_delta)
        } else {
            move_towards(velocity_x, 0.0, max_delta)
        }
    }
}

fn clamp_physics_param(name: &'static str, value: f32) -> f32 {
    if value.is_finite() && value >= MIN_PHYSICS_PARAM {
        return value;
    }
    warn!(
        param = name,
        value,
        clamped_to = MIN_PHYSICS_PARAM,
        "physics_param_clamped"
    );
    MIN_PHYSICS_PARAM
}

/// Mutable movement state capabilities are allowed to touch.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Motor {
    physics: PhysicsModel,
    gravity_scale: f32,
}

impl Motor {
    fn new(params: MovementParams) -> Self {
        Self {
            physics: PhysicsModel::new(params),
            gravity_scale: 1.0,
        }
    }

    fn effective_gravity(&self) -> f32 {
        self.physics.gravity_strength() * self.gravity_scale
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct GroundProbe {
    offset: Vec2,
    radius: f32,
}

impl GroundProbe {
    fn is_grounded(&self, physics: &dyn PhysicsQuery, position: Vec2) -> bool {
        physics.overlap_circle(position + self.offset, self.radius, LayerMask::GROUND)
    }
}
