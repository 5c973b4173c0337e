fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

fn is_blocked(world: &SceneWorld, center: Vec2, radius: f32) -> bool {
    world
        .overlap_circle_all(center, radius, LayerMask::GROUND.union(LayerMask::DOOR))
        .into_iter()
        .filter_map(|id| world.find_entity(id).and_then(|entity| entity.collider))
        .any(|collider| !collider.is_trigger)
}

fn resolve_player(defs: Option<&DefDatabase>) -> PlayerArchetype {
    match defs.and_then(|defs| defs.player_def(PLAYER_DEF_NAME)) {
        Some(archetype) => archetype.clone(),
        None => {
            warn!(def_name = PLAYER_DEF_NAME, "player_def_missing_using_defaults");
            PlayerArchetype::with_defaults(PLAYER_DEF_NAME)
        }
    }
}

fn resolve_mask(
    defs: Option<&DefDatabase>,
    def_name: &str,
) -> Result<MaskDefinition, DefinitionError> {
    let archetype = defs
        .and_then(|defs| defs.mask_def(def_name))
        .ok_or_else(|| DefinitionError::MissingDef {
            def_name: def_name.to_string(),
        })?;
    MaskDefinition::from_archetype(archetype)
}

fn resolve_door(
    defs: Option<&DefDatabase>,
    def_name: &str,
) -> Result<(DoorArchetype, MaskKind), DefinitionError> {
    let archetype = defs
        .and_then(|defs| defs.door_def(def_name))
        .ok_or_else(|| DefinitionError::MissingDef {
            def_name: def_name.to_string(),
        })?;
    let required = resolve_mask(defs, &archetype.required_mask)?.kind;
    Ok((archetype.clone(), required))
}
