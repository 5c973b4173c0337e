    use super::*;
    use engine::{AppPaths, ContentPlanRequest, InputAction};

    const EPSILON: f32 = 1e-4;
    const FIXED_DT: f32 = 0.02;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() <= EPSILON,
            "expected {expected}, got {actual}"
        );
    }

    fn mask_archetype(def_name: &str, kind: &str) -> MaskArchetype {
        let suffix = kind.to_ascii_lowercase();
        MaskArchetype {
            def_name: def_name.to_string(),
            kind: kind.to_string(),
            label: format!("{kind} Mask"),
            pickup_prefab: Some(format!("pickup.{suffix}")),
            overlay_prefab: Some(format!("overlay.{suffix}")),
            light_prefab: (kind == "Light").then(|| "fx.light_halo".to_string()),
            jump_multiplier: None,
            gravity_multiplier: None,
            hidden_tag: None,
            darkness_layer: None,
            lit_alpha: None,
        }
    }

    fn door_archetype(
        def_name: &str,
        required_mask: &str,
        open_policy: DoorOpenPolicyKind,
    ) -> DoorArchetype {
        DoorArchetype {
            def_name: def_name.to_string(),
            required_mask: required_mask.to_string(),
            open_policy,
        }
    }

    fn test_defs() -> DefDatabase {
        DefDatabase::from_defs(
            vec![PlayerArchetype::with_defaults(PLAYER_DEF_NAME)],
            vec![
                mask_archetype("mask.cover", "Cover"),
                mask_archetype("mask.jump", "Jump"),
                mask_archetype("mask.light", "Light"),
                mask_archetype("mask.pumpkin", "Pumpkin"),
                mask_archetype("mask.sports", "Sports"),
            ],
            vec![
                door_archetype(
                    "door.cover_gate",
                    "mask.cover",
                    DoorOpenPolicyKind::DisableAndAnimate,
                ),
                door_archetype("door.sports_wall", "mask.sports", DoorOpenPolicyKind::Destroy),
            ],
        )
    }

    fn definition(kind: &str) -> MaskDefinition {
        let def_name = format!("mask.{}", kind.to_ascii_lowercase());
        MaskDefinition::from_archetype(&mask_archetype(&def_name, kind)).expect("definition")
    }

    fn default_motor() -> Motor {
        Motor::new(MovementParams::from_archetype(
            &PlayerArchetype::with_defaults(PLAYER_DEF_NAME),
        ))
    }

    fn spawn_wearer(world: &mut SceneWorld) -> EntityId {
        let id = world.spawn(
            Transform::at(Vec2::new(0.0, 1.5)),
            EntityDesc::named("player").with_layer(LayerMask::PLAYER),
        );
        world.apply_pending();
        id
    }

    fn spawn_region(world: &mut SceneWorld, desc: EntityDesc) -> EntityId {
        let id = world.spawn(Transform::at(Vec2::ZERO), desc);
        world.apply_pending();
        id
    }

    fn spawn_floor(world: &mut SceneWorld, center: Vec2, half_extents: Vec2) -> EntityId {
        world.spawn(
            Transform::at(center),
            EntityDesc::named("floor")
                .with_layer(LayerMask::GROUND)
                .with_collider(Collider::solid_box(half_extents)),
        )
    }

    fn flat_layout() -> LevelLayout {
        LevelLayout::empty("test", Vec2::new(0.0, 1.5))
            .with_floor(Vec2::new(0.0, 0.0), Vec2::new(20.0, 1.0))
    }

    fn loaded_scene(layout: LevelLayout) -> (LevelScene, SceneWorld) {
        let mut world = SceneWorld::default();
        world.set_def_database(test_defs());
        let mut scene = LevelScene::new(layout);
        scene.load(&mut world);
        world.apply_pending();
        (scene, world)
    }

    fn player_position(scene: &LevelScene, world: &SceneWorld) -> Vec2 {
        scene
            .character
            .as_ref()
            .and_then(|character| character.position(world))
            .expect("player position")
    }

    fn place_player(scene: &LevelScene, world: &mut SceneWorld, position: Vec2) {
        let id = scene.character.as_ref().expect("character").entity;
        world.find_entity_mut(id).expect("player").transform.position = position;
    }

    fn step(scene: &mut LevelScene, world: &mut SceneWorld, input: &InputSnapshot) {
        scene.update(FIXED_DT, input, world);
        world.apply_pending();
        scene.fixed_update(FIXED_DT, world);
        world.apply_pending();
    }

    #[test]
    fn physics_derives_gravity_and_jump_velocity_from_height_and_apex() {
        let model = default_motor().physics;
        assert_close(model.gravity_strength(), 50.0);
        assert_close(model.jump_velocity(), 20.0);
    }

    #[test]
    fn physics_formula_holds_for_assorted_inputs_and_is_idempotent() {
        for (height, apex) in [(1.0, 0.25), (2.5, 0.5), (7.0, 1.2), (0.3, 0.1)] {
            let mut params =
                MovementParams::from_archetype(&PlayerArchetype::with_defaults("p"));
            params.jump_height = height;
            params.time_to_apex = apex;
            let mut model = PhysicsModel::new(params);
            let gravity = 2.0 * height / (apex * apex);
            for _ in 0..5 {
                model.recompute();
                assert!((model.gravity_strength() - gravity).abs() <= gravity * 1e-5);
                assert!((model.jump_velocity() - gravity * apex).abs() <= gravity * 1e-5);
            }
        }
    }

    #[test]
    fn non_positive_or_non_finite_parameters_are_clamped() {
        let mut params = MovementParams::from_archetype(&PlayerArchetype::with_defaults("p"));
        params.jump_height = 0.0;
        params.time_to_apex = -1.0;
        let model = PhysicsModel::new(params);
        assert_eq!(model.params().jump_height, 0.0);
        assert_eq!(model.params().time_to_apex, -1.0);
        assert!(model.gravity_strength().is_finite() && model.gravity_strength() > 0.0);
        assert!(model.jump_velocity().is_finite() && model.jump_velocity() > 0.0);

        let mut model = default_motor().physics;
        model.set_jump_height(f32::NAN);
        assert!(model.gravity_strength().is_finite());
        assert!(model.jump_velocity().is_finite());
    }

    #[test]
    fn jump_cycles_on_a_clamped_height_leave_the_authored_height_untouched() {
        let mut world = SceneWorld::default();
        let wearer = spawn_wearer(&mut world);
        let mut params = MovementParams::from_archetype(&PlayerArchetype::with_defaults("p"));
        params.jump_height = 0.0;
        let mut motor = Motor::new(params);
        let gravity_before = motor.physics.gravity_strength();
        let mut halving = mask_archetype("mask.jump", "Jump");
        halving.jump_multiplier = Some(0.5);
        let definition = MaskDefinition::from_archetype(&halving).expect("definition");

        let mut slot = EquipmentSlot::default();
        let mut ctx = MaskContext {
            world: &mut world,
            motor: &mut motor,
            wearer,
        };
        for _ in 0..3 {
            slot.pickup(definition.clone(), &mut ctx, Vec2::ZERO);
            slot.consume(MaskKind::Jump, &mut ctx).expect("consume");
        }

        assert_eq!(ctx.motor.physics.jump_height(), 0.0);
        assert_eq!(ctx.motor.physics.gravity_strength(), gravity_before);
    }

    #[test]
    fn jump_height_write_refreshes_derived_values() {
        let mut model = default_motor().physics;
        model.set_jump_height(6.0);
        assert_close(model.gravity_strength(), 75.0);
        assert_close(model.jump_velocity(), 30.0);
    }

    #[test]
    fn horizontal_velocity_snaps_to_start_speed_then_ramps() {
        let model = default_motor().physics;
        assert_close(model.horizontal_velocity(0.0, 1.0, true, FIXED_DT), 2.4);
        assert_close(model.horizontal_velocity(0.0, -1.0, true, FIXED_DT), -2.4);
        assert_close(model.horizontal_velocity(5.0, 1.0, true, FIXED_DT), 5.4);
        assert_close(model.horizontal_velocity(7.9, 1.0, true, FIXED_DT), 8.0);
    }

    #[test]
    fn horizontal_velocity_decays_toward_zero_without_input() {
        let model = default_motor().physics;
        assert_close(model.horizontal_velocity(1.0, 0.0, true, FIXED_DT), 0.6);
        assert_close(model.horizontal_velocity(-0.3, 0.0, true, FIXED_DT), 0.0);
    }

    #[test]
    fn air_control_flag_gates_airborne_steering() {
        let mut archetype = PlayerArchetype::with_defaults("p");
        let steerable = PhysicsModel::new(MovementParams::from_archetype(&archetype));
        assert_close(steerable.horizontal_velocity(3.0, 1.0, false, FIXED_DT), 3.4);

        archetype.air_control = false;
        let ballistic = PhysicsModel::new(MovementParams::from_archetype(&archetype));
        assert_eq!(ballistic.horizontal_velocity(3.0, 1.0, false, FIXED_DT), 3.0);
        assert_close(ballistic.horizontal_velocity(3.0, 1.0, true, FIXED_DT), 3.4);
    }

    #[test]
    fn move_towards_never_overshoots() {
        assert_eq!(move_towards(0.0, 1.0, 5.0), 1.0);
        assert_eq!(move_towards(0.0, -1.0, 0.25), -0.25);
        assert_eq!(move_towards(2.0, 2.0, 0.1), 2.0);
    }

    #[test]
    fn ground_probe_tests_the_ground_layer_only() {
        let mut world = SceneWorld::default();
        spawn_floor(&mut world, Vec2::new(0.0, 0.0), Vec2::new(5.0, 1.0));
        world.spawn(
            Transform::at(Vec2::new(10.0, 0.0)),
            EntityDesc::named("barrier")
                .with_layer(LayerMask::DOOR)
                .with_collider(Collider::solid_box(Vec2::new(5.0, 1.0))),
        );
        world.apply_pending();
        let probe = GroundProbe {
            offset: Vec2::new(0.0, -0.5),
            radius: 0.2,
        };
        assert!(probe.is_grounded(&world, Vec2::new(0.0, 1.5)));
        assert!(!probe.is_grounded(&world, Vec2::new(0.0, 2.0)));
        assert!(!probe.is_grounded(&world, Vec2::new(10.0, 1.5)));
    }

    #[test]
    fn unknown_mask_kind_is_a_definition_error() {
        let error = MaskDefinition::from_archetype(&mask_archetype("mask.odd", "Glitter"))
            .expect_err("unknown kind");
        assert_eq!(
            error,
            DefinitionError::UnknownKind {
                def_name: "mask.odd".to_string(),
                kind: "Glitter".to_string(),
            }
        );
        assert!(error.to_string().contains("Glitter"));
    }

    #[test]
    fn mask_definition_fills_effect_defaults() {
        assert_eq!(definition("Jump").effect, MaskEffect::Jump { multiplier: 1.5 });
        assert_eq!(
            definition("Sports").effect,
            MaskEffect::Sports {
                gravity_multiplier: 2.5
            }
        );
        assert_eq!(
            definition("Pumpkin").effect,
            MaskEffect::Pumpkin {
                hidden_tag: "PumpkinMaskCover".to_string()
            }
        );
    }

    #[test]
    fn resolving_missing_defs_reports_the_name() {
        let defs = test_defs();
        assert_eq!(
            resolve_mask(Some(&defs), "mask.ghost").expect_err("missing"),
            DefinitionError::MissingDef {
                def_name: "mask.ghost".to_string()
            }
        );
        assert!(resolve_mask(None, "mask.cover").is_err());
        let (door, required) = resolve_door(Some(&defs), "door.sports_wall").expect("door");
        assert_eq!(door.open_policy, DoorOpenPolicyKind::Destroy);
        assert_eq!(required, MaskKind::Sports);
    }

    #[test]
    fn sports_mask_scales_gravity_and_swap_restores_it_before_next_apply() {
        let mut world = SceneWorld::default();
        let wearer = spawn_wearer(&mut world);
        let mut motor = default_motor();
        let mut slot = EquipmentSlot::default();

        let mut ctx = MaskContext {
            world: &mut world,
            motor: &mut motor,
            wearer,
        };
        slot.pickup(definition("Sports"), &mut ctx, Vec2::ZERO);
        assert_close(ctx.motor.gravity_scale, 2.5);
        assert_close(ctx.motor.effective_gravity(), 125.0);

        let outcome = slot.pickup(definition("Jump"), &mut ctx, Vec2::ZERO);
        assert_eq!(outcome.displaced, Some(MaskKind::Sports));
        assert_close(ctx.motor.gravity_scale, 1.0);
        assert_close(ctx.motor.physics.jump_height(), 6.0);
        assert_eq!(slot.equipped_kind(), Some(MaskKind::Jump));
    }

    #[test]
    fn same_kind_swaps_never_stack_multipliers() {
        let mut world = SceneWorld::default();
        let wearer = spawn_wearer(&mut world);
        let mut motor = default_motor();
        let mut slot = EquipmentSlot::default();
        let mut ctx = MaskContext {
            world: &mut world,
            motor: &mut motor,
            wearer,
        };

        slot.pickup(definition("Sports"), &mut ctx, Vec2::ZERO);
        let outcome = slot.pickup(definition("Sports"), &mut ctx, Vec2::ZERO);
        assert_eq!(outcome.displaced, Some(MaskKind::Sports));
        assert_close(ctx.motor.gravity_scale, 2.5);

        slot.pickup(definition("Jump"), &mut ctx, Vec2::ZERO);
        slot.pickup(definition("Jump"), &mut ctx, Vec2::ZERO);
        assert_close(ctx.motor.gravity_scale, 1.0);
        assert_close(ctx.motor.physics.jump_height(), 6.0);
        assert_close(ctx.motor.physics.jump_velocity(), 30.0);
        assert_eq!(world.overlay_count(), 1);
    }

    #[test]
    fn swap_drops_displaced_pickup_at_anchor_and_keeps_one_overlay() {
        let mut world = SceneWorld::default();
        let wearer = spawn_wearer(&mut world);
        let mut motor = default_motor();
        let mut slot = EquipmentSlot::default();
        let anchor = Vec2::new(4.0, 2.0);

        let outcome = {
            let mut ctx = MaskContext {
                world: &mut world,
                motor: &mut motor,
                wearer,
            };
            slot.pickup(definition("Cover"), &mut ctx, anchor);
            slot.pickup(definition("Pumpkin"), &mut ctx, anchor)
        };
        world.apply_pending();

        let dropped = outcome.dropped_pickup.expect("dropped pickup");
        let entity = world.find_entity(dropped).expect("dropped entity");
        assert_eq!(entity.transform.position, anchor);
        assert_eq!(entity.prefab.as_deref(), Some("pickup.cover"));
        let overlays: Vec<&str> = world.overlays().map(|(_, prefab)| prefab).collect();
        assert_eq!(overlays, vec!["overlay.pumpkin"]);
    }

    #[test]
    fn swap_without_pickup_prefab_still_equips() {
        let mut world = SceneWorld::default();
        let wearer = spawn_wearer(&mut world);
        let mut motor = default_motor();
        let mut slot = EquipmentSlot::default();
        let mut bare = definition("Cover");
        bare.pickup_prefab = None;
        bare.overlay_prefab = None;

        let mut ctx = MaskContext {
            world: &mut world,
            motor: &mut motor,
            wearer,
        };
        slot.pickup(bare, &mut ctx, Vec2::ZERO);
        let outcome = slot.pickup(definition("Jump"), &mut ctx, Vec2::ZERO);
        assert_eq!(outcome.displaced, Some(MaskKind::Cover));
        assert_eq!(outcome.dropped_pickup, None);
        assert_eq!(slot.equipped_kind(), Some(MaskKind::Jump));
    }

    #[test]
    fn apply_then_remove_restores_movement_for_every_kind() {
        for kind in ["Cover", "Jump", "Light", "Pumpkin", "Sports"] {
            let mut world = SceneWorld::default();
            let wearer = spawn_wearer(&mut world);
            let mut motor = default_motor();
            let before = motor;
            let mut instance = MaskInstance::new(definition(kind));
            {
                let mut ctx = MaskContext {
                    world: &mut world,
                    motor: &mut motor,
                    wearer,
                };
                instance.apply(&mut ctx);
                instance.remove(&mut ctx);
            }
            world.apply_pending();

            assert_close(motor.physics.jump_height(), before.physics.jump_height());
            assert_close(motor.physics.gravity_strength(), before.physics.gravity_strength());
            assert_close(motor.physics.jump_velocity(), before.physics.jump_velocity());
            assert_close(motor.gravity_scale, before.gravity_scale);
            assert_eq!(world.overlay_count(), 0, "kind={kind}");
            assert_eq!(world.entity_count(), 1, "kind={kind}");
        }
    }

    #[test]
    fn repeated_jump_and_sports_cycles_do_not_drift() {
        let mut world = SceneWorld::default();
        let wearer = spawn_wearer(&mut world);
        let mut motor = default_motor();
        let mut slot = EquipmentSlot::default();
        let mut ctx = MaskContext {
            world: &mut world,
            motor: &mut motor,
            wearer,
        };
        for _ in 0..200 {
            slot.pickup(definition("Jump"), &mut ctx, Vec2::ZERO);
            slot.pickup(definition("Sports"), &mut ctx, Vec2::ZERO);
        }
        slot.consume(MaskKind::Sports, &mut ctx).expect("consume");
        assert!((ctx.motor.physics.jump_height() - 4.0).abs() <= 1e-3);
        assert!((ctx.motor.gravity_scale - 1.0).abs() <= 1e-3);
    }

    #[test]
    fn light_mask_lights_darkness_and_restores_exact_alphas() {
        let mut world = SceneWorld::default();
        let wearer = spawn_wearer(&mut world);
        let dense = spawn_region(
            &mut world,
            EntityDesc::named("dense")
                .with_layer(LayerMask::DARKNESS)
                .with_alpha(0.8),
        );
        let faint = spawn_region(
            &mut world,
            EntityDesc::named("faint")
                .with_layer(LayerMask::DARKNESS)
                .with_alpha(0.35),
        );
        let mut motor = default_motor();
        let mut instance = MaskInstance::new(definition("Light"));

        {
            let mut ctx = MaskContext {
                world: &mut world,
                motor: &mut motor,
                wearer,
            };
            instance.apply(&mut ctx);
        }
        world.apply_pending();
        assert_eq!(world.region_alpha(dense), Some(0.0));
        assert_eq!(world.region_alpha(faint), Some(0.0));
        let light = world
            .entities()
            .iter()
            .find(|entity| entity.prefab.as_deref() == Some("fx.light_halo"))
            .expect("light attached");
        assert_eq!(light.parent, Some(wearer));

        {
            let mut ctx = MaskContext {
                world: &mut world,
                motor: &mut motor,
                wearer,
            };
            instance.remove(&mut ctx);
        }
        world.apply_pending();
        assert_eq!(world.region_alpha(dense), Some(0.8));
        assert_eq!(world.region_alpha(faint), Some(0.35));
        assert!(world
            .entities()
            .iter()
            .all(|entity| entity.prefab.as_deref() != Some("fx.light_halo")));
    }

    #[test]
    fn pumpkin_mask_reactivates_only_regions_it_hid() {
        let mut world = SceneWorld::default();
        let wearer = spawn_wearer(&mut world);
        let visible =
            spawn_region(&mut world, EntityDesc::named("a").with_tag(DEFAULT_HIDDEN_TAG));
        let already_hidden =
            spawn_region(&mut world, EntityDesc::named("b").with_tag(DEFAULT_HIDDEN_TAG));
        world.set_region_active(already_hidden, false);
        let mut motor = default_motor();
        let mut instance = MaskInstance::new(definition("Pumpkin"));
        let mut ctx = MaskContext {
            world: &mut world,
            motor: &mut motor,
            wearer,
        };

        instance.apply(&mut ctx);
        assert_eq!(ctx.world.region_active(visible), Some(false));
        assert_eq!(ctx.world.region_active(already_hidden), Some(false));

        instance.remove(&mut ctx);
        assert_eq!(ctx.world.region_active(visible), Some(true));
        assert_eq!(ctx.world.region_active(already_hidden), Some(false));
    }

    #[test]
    fn consume_rejects_empty_and_mismatched_slots() {
        let mut world = SceneWorld::default();
        let wearer = spawn_wearer(&mut world);
        let mut motor = default_motor();
        let mut slot = EquipmentSlot::default();
        let mut ctx = MaskContext {
            world: &mut world,
            motor: &mut motor,
            wearer,
        };

        assert_eq!(
            slot.consume(MaskKind::Cover, &mut ctx),
            Err(SlotError::Empty)
        );

        slot.pickup(definition("Jump"), &mut ctx, Vec2::ZERO);
        assert_eq!(
            slot.consume(MaskKind::Cover, &mut ctx),
            Err(SlotError::Mismatch {
                equipped: MaskKind::Jump,
                required: MaskKind::Cover,
            })
        );
        assert_eq!(slot.equipped_kind(), Some(MaskKind::Jump));
        assert_close(ctx.motor.physics.jump_height(), 6.0);

        assert_eq!(slot.consume(MaskKind::Jump, &mut ctx), Ok(MaskKind::Jump));
        assert_eq!(slot.equipped_kind(), None);
        assert_close(ctx.motor.physics.jump_height(), 4.0);
        assert_eq!(world.overlay_count(), 0);
    }

    fn spawn_door_parts(world: &mut SceneWorld) -> (EntityId, EntityId) {
        let lock = world.spawn(
            Transform::at(Vec2::new(1.0, 1.5)),
            EntityDesc::named("lock")
                .with_layer(LayerMask::DOOR)
                .with_collider(Collider::trigger_box(Vec2::new(0.4, 0.5))),
        );
        let barrier = world.spawn(
            Transform::at(Vec2::new(2.0, 3.0)),
            EntityDesc::named("barrier")
                .with_layer(LayerMask::DOOR)
                .with_collider(Collider::solid_box(Vec2::new(0.5, 2.0))),
        );
        world.apply_pending();
        (lock, barrier)
    }

    #[test]
    fn door_opens_only_for_matching_identity_and_only_once() {
        let mut world = SceneWorld::default();
        let (lock, barrier) = spawn_door_parts(&mut world);
        let mut door = Door::new(
            "gate",
            lock,
            Some(barrier),
            MaskKind::Cover,
            DoorOpenPolicy::DisableAndAnimate,
        );

        assert!(!door.try_open(None, &mut world));
        assert!(!door.try_open(Some(MaskKind::Jump), &mut world));
        assert_eq!(door.state, DoorState::Locked);

        assert!(door.try_open(Some(MaskKind::Cover), &mut world));
        assert_eq!(door.state, DoorState::Open);
        assert!(!door.try_open(Some(MaskKind::Cover), &mut world));
        assert_eq!(world.animation_change_count(), 1);
    }

    #[test]
    fn disable_and_animate_turns_off_colliders_and_plays_open() {
        let mut world = SceneWorld::default();
        let (lock, barrier) = spawn_door_parts(&mut world);
        let mut door = Door::new(
            "gate",
            lock,
            Some(barrier),
            MaskKind::Cover,
            DoorOpenPolicy::DisableAndAnimate,
        );
        assert!(door.try_open(Some(MaskKind::Cover), &mut world));
        world.apply_pending();

        let lock_entity = world.find_entity(lock).expect("lock stays");
        assert_eq!(lock_entity.collider.map(|collider| collider.enabled), Some(false));
        let barrier_entity = world.find_entity(barrier).expect("barrier stays");
        assert_eq!(barrier_entity.collider.map(|collider| collider.enabled), Some(false));
        assert_eq!(barrier_entity.animation, Some(AnimationClip::Open));
    }

    #[test]
    fn destroy_policy_removes_target_and_lock() {
        let mut world = SceneWorld::default();
        let (lock, barrier) = spawn_door_parts(&mut world);
        let mut door = Door::new(
            "wall",
            lock,
            Some(barrier),
            MaskKind::Sports,
            DoorOpenPolicy::Destroy,
        );
        assert!(door.try_open(Some(MaskKind::Sports), &mut world));
        world.apply_pending();
        assert!(world.find_entity(lock).is_none());
        assert!(world.find_entity(barrier).is_none());
    }

    #[test]
    fn triggers_are_classified_by_tag_with_hazards_first() {
        let mut world = SceneWorld::default();
        let spikes = spawn_region(&mut world, EntityDesc::named("s").with_tag("Spikes"));
        let covered = spawn_region(
            &mut world,
            EntityDesc::named("c").with_tag("PumpkinMaskCoverSpikes"),
        );
        let checkpoint =
            spawn_region(&mut world, EntityDesc::named("k").with_tag(CHECKPOINT_TAG));
        let plain = spawn_region(&mut world, EntityDesc::named("p").with_tag("Decor"));

        let kind = |id| classify_trigger(world.find_entity(id).expect("entity"));
        assert_eq!(kind(spikes), Some(TriggerKind::Hazard));
        assert_eq!(kind(covered), Some(TriggerKind::Hazard));
        assert_eq!(kind(checkpoint), Some(TriggerKind::Checkpoint));
        assert_eq!(kind(plain), None);
    }

    #[test]
    fn trigger_contacts_report_entries_only() {
        let mut contacts = TriggerContacts::default();
        assert_eq!(contacts.update(vec![EntityId(1)]), vec![EntityId(1)]);
        assert!(contacts.update(vec![EntityId(1)]).is_empty());
        assert_eq!(
            contacts.update(vec![EntityId(1), EntityId(2)]),
            vec![EntityId(2)]
        );
        assert!(contacts.update(Vec::new()).is_empty());
        assert_eq!(contacts.update(vec![EntityId(1)]), vec![EntityId(1)]);
    }

    #[test]
    fn animation_label_follows_ground_and_input() {
        assert_eq!(AnimationTracker::derive(false, 1.0), AnimationClip::Jump);
        assert_eq!(AnimationTracker::derive(true, -1.0), AnimationClip::Walk);
        assert_eq!(AnimationTracker::derive(true, 0.0), AnimationClip::Idle);

        let mut tracker = AnimationTracker::default();
        assert_eq!(tracker.update(AnimationClip::Idle), Some(AnimationClip::Idle));
        assert_eq!(tracker.update(AnimationClip::Idle), None);
        assert_eq!(tracker.update(AnimationClip::Walk), Some(AnimationClip::Walk));
        assert_eq!(tracker.current(), Some(AnimationClip::Walk));
    }

    #[test]
    fn facing_keeps_last_direction_and_left_wins() {
        let mut world = SceneWorld::default();
        let id = spawn_wearer(&mut world);
        let mut character = Character::new(id, &PlayerArchetype::with_defaults("p"));

        let both = InputSnapshot::empty()
            .with_action_down(InputAction::MoveLeft, true)
            .with_action_down(InputAction::MoveRight, true);
        character.sample_input(&both);
        assert_eq!(character.horizontal_input, -1.0);
        assert!(character.facing_left);

        character.sample_input(&InputSnapshot::empty());
        assert_eq!(character.horizontal_input, 0.0);
        assert!(character.facing_left);

        let right = InputSnapshot::empty().with_action_down(InputAction::MoveRight, true);
        character.sample_input(&right);
        assert!(!character.facing_left);
    }

    #[test]
    fn scene_load_spawns_player_on_the_floor() {
        let (mut scene, mut world) = loaded_scene(flat_layout());
        for _ in 0..25 {
            step(&mut scene, &mut world, &InputSnapshot::empty());
        }
        let position = player_position(&scene, &world);
        assert_close(position.y, 1.5);
        let character = scene.character.as_ref().expect("character");
        assert!(character.grounded);
        assert_eq!(character.velocity, Vec2::ZERO);
        assert_eq!(character.animation.current(), Some(AnimationClip::Idle));
    }

    #[test]
    fn jump_sets_vertical_velocity_only_when_grounded() {
        let (mut scene, mut world) = loaded_scene(flat_layout());
        step(&mut scene, &mut world, &InputSnapshot::empty());

        let jump = InputSnapshot::empty().with_action_pressed(InputAction::Jump);
        scene.update(FIXED_DT, &jump, &mut world);
        assert_close(scene.character.as_ref().expect("character").velocity.y, 20.0);

        scene.fixed_update(FIXED_DT, &mut world);
        assert!(player_position(&scene, &world).y > 1.5);

        scene.update(FIXED_DT, &InputSnapshot::empty(), &mut world);
        let character = scene.character.as_mut().expect("character");
        assert!(!character.grounded);
        assert_eq!(character.animation.current(), Some(AnimationClip::Jump));
        character.velocity.y = 3.0;
        scene.update(FIXED_DT, &jump, &mut world);
        assert_close(scene.character.as_ref().expect("character").velocity.y, 3.0);
    }

    #[test]
    fn solid_door_barrier_blocks_horizontal_motion() {
        let (mut scene, mut world) = loaded_scene(flat_layout());
        world.spawn(
            Transform::at(Vec2::new(3.0, 2.0)),
            EntityDesc::named("barrier")
                .with_layer(LayerMask::DOOR)
                .with_collider(Collider::solid_box(Vec2::new(0.5, 1.5))),
        );
        world.apply_pending();

        let right = InputSnapshot::empty().with_action_down(InputAction::MoveRight, true);
        for _ in 0..120 {
            step(&mut scene, &mut world, &right);
        }
        let position = player_position(&scene, &world);
        assert!(position.x > 1.5, "player should walk up to the barrier");
        assert!(position.x < 2.5 - 0.5 * BLOCKING_RADIUS_FACTOR + 1e-3);
    }

    #[test]
    fn hazard_contact_respawns_at_last_checkpoint_with_zero_velocity() {
        let layout = flat_layout()
            .with_checkpoint(Vec2::new(3.0, 1.5), Vec2::new(0.3, 0.5))
            .with_hazard("Spikes", Vec2::new(6.0, 1.25), Vec2::new(0.5, 0.25));
        let (mut scene, mut world) = loaded_scene(layout);
        assert_eq!(scene.checkpoints.last_safe_position(), Vec2::new(0.0, 1.5));

        place_player(&scene, &mut world, Vec2::new(3.0, 1.5));
        scene.update(FIXED_DT, &InputSnapshot::empty(), &mut world);
        assert_eq!(scene.checkpoints.last_safe_position(), Vec2::new(3.0, 1.5));

        scene.character.as_mut().expect("character").velocity = Vec2::new(4.0, -6.0);
        place_player(&scene, &mut world, Vec2::new(6.0, 1.5));
        scene.update(FIXED_DT, &InputSnapshot::empty(), &mut world);

        assert_eq!(player_position(&scene, &world), Vec2::new(3.0, 1.5));
        assert_eq!(
            scene.character.as_ref().expect("character").velocity,
            Vec2::ZERO
        );
        assert_eq!(scene.respawns, 1);
    }

    #[test]
    fn staying_inside_a_hazard_does_not_fire_again() {
        let layout =
            flat_layout().with_hazard("Spikes", Vec2::new(0.0, 1.5), Vec2::new(0.5, 0.5));
        let (mut scene, mut world) = loaded_scene(layout);
        scene.update(FIXED_DT, &InputSnapshot::empty(), &mut world);
        assert_eq!(scene.respawns, 1);
        scene.update(FIXED_DT, &InputSnapshot::empty(), &mut world);
        assert_eq!(scene.respawns, 1);
    }

    #[test]
    fn interact_with_empty_slot_leaves_door_locked() {
        let layout = flat_layout().with_door(
            "door.cover_gate",
            Area::new(Vec2::new(1.0, 1.5), Vec2::new(0.4, 0.5)),
            None,
        );
        let (mut scene, mut world) = loaded_scene(layout);
        let interact = InputSnapshot::empty().with_action_pressed(InputAction::Interact);
        scene.update(FIXED_DT, &interact, &mut world);
        assert_eq!(scene.doors[0].state, DoorState::Locked);
    }

    #[test]
    fn interact_prefers_pickup_then_opens_matching_door_and_consumes_mask() {
        let layout = flat_layout()
            .with_pickup("mask.cover", Vec2::new(0.5, 1.5))
            .with_door(
                "door.cover_gate",
                Area::new(Vec2::new(1.0, 1.5), Vec2::new(0.4, 0.5)),
                Some(Area::new(Vec2::new(2.0, 3.0), Vec2::new(0.5, 2.0))),
            );
        let (mut scene, mut world) = loaded_scene(layout);
        let interact = InputSnapshot::empty().with_action_pressed(InputAction::Interact);

        scene.update(FIXED_DT, &interact, &mut world);
        world.apply_pending();
        let character = scene.character.as_ref().expect("character");
        assert_eq!(character.slot.equipped_kind(), Some(MaskKind::Cover));
        assert_eq!(scene.doors[0].state, DoorState::Locked);
        assert!(world
            .entities()
            .iter()
            .all(|entity| entity.prefab.as_deref() != Some("pickup.cover")));
        assert_eq!(world.overlay_count(), 1);

        scene.update(FIXED_DT, &interact, &mut world);
        world.apply_pending();
        assert_eq!(scene.doors[0].state, DoorState::Open);
        let character = scene.character.as_ref().expect("character");
        assert_eq!(character.slot.equipped_kind(), None);
        assert_eq!(world.overlay_count(), 0);
    }

    #[test]
    fn interacting_near_two_pickups_swaps_and_drops_the_old_mask() {
        let layout = flat_layout()
            .with_pickup("mask.sports", Vec2::new(0.5, 1.5))
            .with_pickup("mask.jump", Vec2::new(4.0, 1.5));
        let (mut scene, mut world) = loaded_scene(layout);
        let interact = InputSnapshot::empty().with_action_pressed(InputAction::Interact);

        scene.update(FIXED_DT, &interact, &mut world);
        world.apply_pending();
        place_player(&scene, &mut world, Vec2::new(4.0, 1.5));
        scene.update(FIXED_DT, &interact, &mut world);
        world.apply_pending();

        let character = scene.character.as_ref().expect("character");
        assert_eq!(character.slot.equipped_kind(), Some(MaskKind::Jump));
        assert_close(character.motor.gravity_scale, 1.0);
        let dropped = world
            .entities()
            .iter()
            .find(|entity| entity.prefab.as_deref() == Some("pickup.sports"))
            .expect("sports pickup dropped");
        assert_eq!(dropped.transform.position, Vec2::new(4.0, 1.5));
        assert_eq!(dropped.layer, LayerMask::MASK);
        assert!(dropped.has_tag("Mask"));
    }

    #[test]
    fn missing_defs_skip_pieces_and_fall_back_to_default_player() {
        let layout = flat_layout()
            .with_pickup("mask.ghost", Vec2::new(1.0, 1.5))
            .with_door(
                "door.ghost",
                Area::new(Vec2::new(2.0, 1.5), Vec2::new(0.4, 0.5)),
                None,
            );
        let mut world = SceneWorld::default();
        let mut scene = LevelScene::new(layout);
        scene.load(&mut world);
        world.apply_pending();

        assert!(scene.pickup_catalog.is_empty());
        assert!(scene.doors.is_empty());
        let character = scene.character.as_ref().expect("character");
        assert_close(character.motor.physics.gravity_strength(), 50.0);
    }

    #[test]
    fn dump_state_serialises_session_summary() {
        let (mut scene, mut world) = loaded_scene(flat_layout());
        step(&mut scene, &mut world, &InputSnapshot::empty());
        let json = scene.dump_state(&world).expect("dump");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["level"], "test");
        assert_eq!(value["player"]["equipped"], serde_json::Value::Null);
        assert_eq!(value["player"]["gravity_scale"], 1.0);
        assert_eq!(value["respawns"], 0);
        assert!(scene
            .debug_title(&world)
            .expect("title")
            .contains("Mask none"));
    }

    #[test]
    fn unload_drops_level_state() {
        let layout = flat_layout().with_pickup("mask.jump", Vec2::new(1.0, 1.5));
        let (mut scene, mut world) = loaded_scene(layout);
        scene.unload(&mut world);
        assert!(scene.character.is_none());
        assert!(scene.pickup_catalog.is_empty());
    }

    #[test]
    fn demo_level_resolves_every_shipped_def() {
        let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..");
        let defs = engine::build_def_database(
            &AppPaths::from_root(root),
            &ContentPlanRequest::default(),
        )
        .expect("shipped defs");
        let layout = demo_level();
        let mut world = SceneWorld::default();
        let spawned = spawn_level(&layout, Some(&defs), &mut world);
        assert_eq!(spawned.pickup_catalog.len(), layout.pickups.len());
        assert_eq!(spawned.doors.len(), layout.doors.len());
    }
