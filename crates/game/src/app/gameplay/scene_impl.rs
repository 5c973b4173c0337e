struct LevelScene {
    layout: LevelLayout,
    character: Option<Character>,
    checkpoints: CheckpointTracker,
    contacts: TriggerContacts,
    pickup_catalog: HashMap<String, MaskDefinition>,
    doors: Vec<Door>,
    respawns: u32,
}

#[derive(Debug, Serialize)]
struct PlayerDump {
    position: Vec2,
    velocity: Vec2,
    grounded: bool,
    facing_left: bool,
    animation: Option<AnimationClip>,
    equipped: Option<MaskKind>,
    movement: MovementParams,
    gravity_strength: f32,
    jump_velocity: f32,
    gravity_scale: f32,
}

#[derive(Debug, Serialize)]
struct DoorDump {
    name: String,
    required: MaskKind,
    policy: DoorOpenPolicy,
    state: DoorState,
}

#[derive(Debug, Serialize)]
struct SessionDump {
    level: String,
    player: Option<PlayerDump>,
    last_checkpoint: Vec2,
    respawns: u32,
    doors: Vec<DoorDump>,
    overlays: Vec<String>,
    entity_count: usize,
}

impl LevelScene {
    fn new(layout: LevelLayout) -> Self {
        let spawn = layout.player_spawn;
        Self {
            layout,
            character: None,
            checkpoints: CheckpointTracker::new(spawn),
            contacts: TriggerContacts::default(),
            pickup_catalog: HashMap::new(),
            doors: Vec::new(),
            respawns: 0,
        }
    }

    fn interact(&mut self, world: &mut SceneWorld) {
        let Some(character) = self.character.as_mut() else {
            return;
        };
        let Some(position) = character.position(world) else {
            return;
        };
        let range = character.interact_range;

        let pickup = world
            .overlap_circle_all(position, range, LayerMask::MASK)
            .into_iter()
            .find_map(|id| {
                let entity = world.find_entity(id)?;
                if !entity.has_tag("Mask") {
                    return None;
                }
                let definition = self.pickup_catalog.get(entity.prefab.as_deref()?)?;
                Some((id, definition.clone()))
            });
        if let Some((pickup_id, definition)) = pickup {
            let drop_anchor = position + character.drop_offset;
            let outcome = character.equip(definition, world, drop_anchor);
            if let Some(dropped) = outcome.dropped_pickup {
                debug!(
                    entity_id = dropped.0,
                    x = drop_anchor.x,
                    y = drop_anchor.y,
                    "mask_pickup_dropped"
                );
            }
            world.destroy(pickup_id);
            return;
        }

        let equipped = character.slot.equipped_kind();
        let door_index = world
            .overlap_circle_all(position, range, LayerMask::DOOR)
            .into_iter()
            .find_map(|id| self.doors.iter().position(|door| door.lock == id));
        let Some(door) = door_index.map(|index| &mut self.doors[index]) else {
            debug!(x = position.x, y = position.y, "interact_nothing_in_range");
            return;
        };

        if door.try_open(equipped, world) {
            if let Err(error) = character.consume_mask(door.required, world) {
                warn!(door = %door.name, error = %error, "mask_consume_failed");
            }
        } else {
            debug!(door = %door.name, equipped = ?equipped, "door_stayed_locked");
        }
    }

    fn process_triggers(&mut self, world: &mut SceneWorld) {
        let Some(character) = self.character.as_mut() else {
            return;
        };
        let Some(position) = character.position(world) else {
            return;
        };

        let touching =
            world.overlap_circle_all(position, character.body_radius, LayerMask::TRIGGER);
        for id in self.contacts.update(touching) {
            let Some((kind, trigger_position)) = world
                .find_entity(id)
                .map(|entity| (classify_trigger(entity), entity.transform.position))
            else {
                continue;
            };
            match kind {
                Some(TriggerKind::Checkpoint) => self.checkpoints.record(trigger_position),
                Some(TriggerKind::Hazard) => {
                    character.respawn(world, self.checkpoints.last_safe_position());
                    self.respawns += 1;
                    break;
                }
                None => {}
            }
        }
    }

    fn session_dump(&self, world: &SceneWorld) -> SessionDump {
        let player = self.character.as_ref().and_then(|character| {
            let physics = &character.motor.physics;
            Some(PlayerDump {
                position: character.position(world)?,
                velocity: character.velocity,
                grounded: character.grounded,
                facing_left: character.facing_left,
                animation: character.animation.current(),
                equipped: character.slot.equipped_kind(),
                movement: *physics.params(),
                gravity_strength: physics.gravity_strength(),
                jump_velocity: physics.jump_velocity(),
                gravity_scale: character.motor.gravity_scale,
            })
        });
        SessionDump {
            level: self.layout.name.clone(),
            player,
            last_checkpoint: self.checkpoints.last_safe_position(),
            respawns: self.respawns,
            doors: self
                .doors
                .iter()
                .map(|door| DoorDump {
                    name: door.name.clone(),
                    required: door.required,
                    policy: door.policy,
                    state: door.state,
                })
                .collect(),
            overlays: world
                .overlays()
                .map(|(_, prefab)| prefab.to_string())
                .collect(),
            entity_count: world.entity_count(),
        }
    }
}

impl Scene for LevelScene {
    fn load(&mut self, world: &mut SceneWorld) {
        let defs = world.def_database().cloned();
        let archetype = resolve_player(defs.as_ref());
        let spawned = spawn_level(&self.layout, defs.as_ref(), world);
        world.apply_pending();

        self.character = Some(Character::new(spawned.player, &archetype));
        self.checkpoints = CheckpointTracker::new(self.layout.player_spawn);
        self.contacts.clear();
        self.pickup_catalog = spawned.pickup_catalog;
        self.doors = spawned.doors;
        self.respawns = 0;
        info!(
            scene = %self.layout.name,
            entity_count = world.entity_count(),
            player_def = %archetype.def_name,
            "scene_loaded"
        );
    }

    fn update(
        &mut self,
        _frame_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        let Some(character) = self.character.as_mut() else {
            return SceneCommand::None;
        };

        character.sample_input(input);
        if let Some(position) = character.position(world) {
            character.check_ground(&*world, position);
        }
        if character.try_jump(input.jump_pressed()) {
            debug!(
                jump_velocity = character.motor.physics.jump_velocity(),
                "player_jumped"
            );
        }
        character.update_animation(world);

        if input.interact_pressed() {
            self.interact(world);
        }
        self.process_triggers(world);

        SceneCommand::None
    }

    fn fixed_update(&mut self, fixed_dt_seconds: f32, world: &mut SceneWorld) {
        if let Some(character) = self.character.as_mut() {
            character.integrate(world, fixed_dt_seconds);
        }
    }

    fn unload(&mut self, world: &mut SceneWorld) {
        info!(
            scene = %self.layout.name,
            entity_count = world.entity_count(),
            respawns = self.respawns,
            "scene_unload"
        );
        self.character = None;
        self.contacts.clear();
        self.pickup_catalog.clear();
        self.doors.clear();
    }

    fn debug_title(&self, world: &SceneWorld) -> Option<String> {
        let character = self.character.as_ref()?;
        let position = character.position(world)?;
        let mask = character
            .slot
            .equipped()
            .map(|instance| instance.definition().label.as_str())
            .unwrap_or("none");
        Some(format!(
            "Masked | Level {} | Player ({:.2}, {:.2}) | Mask {} | Entities {}",
            self.layout.name,
            position.x,
            position.y,
            mask,
            world.entity_count()
        ))
    }

    fn dump_state(&self, world: &SceneWorld) -> Option<String> {
        match serde_json::to_string_pretty(&self.session_dump(world)) {
            Ok(json) => Some(json),
            Err(error) => {
                warn!(error = %error, "session_dump_failed");
                None
            }
        }
    }
}
