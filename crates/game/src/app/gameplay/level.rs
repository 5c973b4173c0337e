#[derive(Debug, Clone, Copy, PartialEq)]
struct Area {
    center: Vec2,
    half_extents: Vec2,
}

impl Area {
    const fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct PickupPlacement {
    mask_def: String,
    position: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
struct DoorPlacement {
    door_def: String,
    lock: Area,
    barrier: Option<Area>,
}

#[derive(Debug, Clone, PartialEq)]
struct HazardPlacement {
    tag: &'static str,
    area: Area,
}

#[derive(Debug, Clone, PartialEq)]
struct LevelLayout {
    name: String,
    player_spawn: Vec2,
    floors: Vec<Area>,
    pickups: Vec<PickupPlacement>,
    doors: Vec<DoorPlacement>,
    checkpoints: Vec<Area>,
    hazards: Vec<HazardPlacement>,
    darkness: Vec<Area>,
    pumpkin_covers: Vec<Area>,
}

impl LevelLayout {
    fn empty(name: impl Into<String>, player_spawn: Vec2) -> Self {
        Self {
            name: name.into(),
            player_spawn,
            floors: Vec::new(),
            pickups: Vec::new(),
            doors: Vec::new(),
            checkpoints: Vec::new(),
            hazards: Vec::new(),
            darkness: Vec::new(),
            pumpkin_covers: Vec::new(),
        }
    }

    fn with_floor(mut self, center: Vec2, half_extents: Vec2) -> Self {
        self.floors.push(Area::new(center, half_extents));
        self
    }

    fn with_pickup(mut self, mask_def: impl Into<String>, position: Vec2) -> Self {
        self.pickups.push(PickupPlacement {
            mask_def: mask_def.into(),
            position,
        });
        self
    }

    fn with_door(mut self, door_def: impl Into<String>, lock: Area, barrier: Option<Area>) -> Self {
        self.doors.push(DoorPlacement {
            door_def: door_def.into(),
            lock,
            barrier,
        });
        self
    }

    fn with_checkpoint(mut self, center: Vec2, half_extents: Vec2) -> Self {
        self.checkpoints.push(Area::new(center, half_extents));
        self
    }

    fn with_hazard(mut self, tag: &'static str, center: Vec2, half_extents: Vec2) -> Self {
        self.hazards.push(HazardPlacement {
            tag,
            area: Area::new(center, half_extents),
        });
        self
    }

    fn with_darkness(mut self, center: Vec2, half_extents: Vec2) -> Self {
        self.darkness.push(Area::new(center, half_extents));
        self
    }

    fn with_pumpkin_cover(mut self, center: Vec2, half_extents: Vec2) -> Self {
        self.pumpkin_covers.push(Area::new(center, half_extents));
        self
    }
}

/// The far ledge sits above a plain jump and needs the jump mask.
fn demo_level() -> LevelLayout {
    let lock_size = Vec2::new(0.4, 0.5);
    let wall_size = Vec2::new(0.5, 3.0);
    LevelLayout::empty("demo", Vec2::new(0.0, 1.5))
        .with_floor(Vec2::new(10.0, 0.0), Vec2::new(14.0, 1.0))
        .with_floor(Vec2::new(36.0, 2.5), Vec2::new(8.0, 3.5))
        .with_pickup("mask.cover", Vec2::new(3.0, 1.5))
        .with_pickup("mask.sports", Vec2::new(12.0, 1.5))
        .with_pickup("mask.light", Vec2::new(18.0, 1.5))
        .with_pickup("mask.jump", Vec2::new(21.0, 1.5))
        .with_pickup("mask.pumpkin", Vec2::new(31.0, 6.5))
        .with_door(
            "door.cover_gate",
            Area::new(Vec2::new(8.0, 1.5), lock_size),
            Some(Area::new(Vec2::new(9.0, 4.0), wall_size)),
        )
        .with_door(
            "door.sports_wall",
            Area::new(Vec2::new(15.0, 1.5), lock_size),
            Some(Area::new(Vec2::new(16.0, 4.0), wall_size)),
        )
        .with_checkpoint(Vec2::new(11.0, 1.5), Vec2::new(0.3, 0.5))
        .with_checkpoint(Vec2::new(30.0, 6.5), Vec2::new(0.3, 0.5))
        .with_hazard("Spikes", Vec2::new(26.0, -1.5), Vec2::new(2.0, 0.5))
        .with_hazard(
            "PumpkinMaskCoverSpikes",
            Vec2::new(38.0, 6.25),
            Vec2::new(1.0, 0.25),
        )
        .with_darkness(Vec2::new(22.0, 3.0), Vec2::new(4.0, 3.0))
        .with_pumpkin_cover(Vec2::new(38.0, 7.0), Vec2::new(2.0, 1.0))
}

/// Entities and gameplay objects produced by spawning a layout.
#[derive(Debug)]
struct SpawnedLevel {
    player: EntityId,
    pickup_catalog: HashMap<String, MaskDefinition>,
    doors: Vec<Door>,
}

fn pickup_template(prefab: &str) -> EntityDesc {
    EntityDesc::named(prefab)
        .with_layer(LayerMask::MASK)
        .with_tag("Mask")
        .with_collider(Collider::trigger_circle(PICKUP_RADIUS))
}

fn spawn_level(
    layout: &LevelLayout,
    defs: Option<&DefDatabase>,
    world: &mut SceneWorld,
) -> SpawnedLevel {
    for (index, floor) in layout.floors.iter().enumerate() {
        world.spawn(
            Transform::at(floor.center),
            EntityDesc::named(format!("floor_{index}"))
                .with_layer(LayerMask::GROUND)
                .with_collider(Collider::solid_box(floor.half_extents)),
        );
    }

    let mut pickup_catalog = HashMap::new();
    for placement in &layout.pickups {
        let mut definition = match resolve_mask(defs, &placement.mask_def) {
            Ok(definition) => definition,
            Err(error) => {
                warn!(mask = %placement.mask_def, error = %error, "mask_pickup_skipped");
                continue;
            }
        };
        let fallback = format!("pickup.{}", definition.def_name);
        let prefab = definition
            .pickup_prefab
            .get_or_insert(fallback)
            .clone();
        world.register_prefab(prefab.clone(), pickup_template(&prefab));
        world.spawn_prefab(&prefab, placement.position);
        pickup_catalog.insert(prefab, definition);
    }

    let mut doors = Vec::new();
    for placement in &layout.doors {
        let resolved = resolve_door(defs, &placement.door_def);
        let (archetype, required) = match resolved {
            Ok(resolved) => resolved,
            Err(error) => {
                warn!(door = %placement.door_def, error = %error, "door_skipped");
                continue;
            }
        };
        let lock = world.spawn(
            Transform::at(placement.lock.center),
            EntityDesc::named(format!("{}.lock", archetype.def_name))
                .with_layer(LayerMask::DOOR)
                .with_collider(Collider::trigger_box(placement.lock.half_extents)),
        );
        let target = placement.barrier.map(|barrier| {
            world.spawn(
                Transform::at(barrier.center),
                EntityDesc::named(format!("{}.barrier", archetype.def_name))
                    .with_layer(LayerMask::DOOR)
                    .with_collider(Collider::solid_box(barrier.half_extents)),
            )
        });
        doors.push(Door::new(
            archetype.def_name.clone(),
            lock,
            target,
            required,
            archetype.open_policy.into(),
        ));
    }

    for (index, checkpoint) in layout.checkpoints.iter().enumerate() {
        world.spawn(
            Transform::at(checkpoint.center),
            EntityDesc::named(format!("checkpoint_{index}"))
                .with_layer(LayerMask::TRIGGER)
                .with_tag(CHECKPOINT_TAG)
                .with_collider(Collider::trigger_box(checkpoint.half_extents)),
        );
    }

    for hazard in &layout.hazards {
        world.spawn(
            Transform::at(hazard.area.center),
            EntityDesc::named(hazard.tag.to_ascii_lowercase())
                .with_layer(LayerMask::TRIGGER)
                .with_tag(hazard.tag)
                .with_collider(Collider::trigger_box(hazard.area.half_extents)),
        );
    }

    for (index, darkness) in layout.darkness.iter().enumerate() {
        world.spawn(
            Transform::at(darkness.center),
            EntityDesc::named(format!("darkness_{index}"))
                .with_layer(LayerMask::DARKNESS)
                .with_alpha(DARKNESS_ALPHA),
        );
    }

    for (index, cover) in layout.pumpkin_covers.iter().enumerate() {
        world.spawn(
            Transform::at(cover.center),
            EntityDesc::named(format!("pumpkin_cover_{index}")).with_tag(DEFAULT_HIDDEN_TAG),
        );
    }

    let player = world.spawn(
        Transform::at(layout.player_spawn),
        EntityDesc::named("player").with_layer(LayerMask::PLAYER),
    );

    info!(
        level = %layout.name,
        pickups = pickup_catalog.len(),
        doors = doors.len(),
        "level_spawned"
    );
    SpawnedLevel {
        player,
        pickup_catalog,
        doors,
    }
}
