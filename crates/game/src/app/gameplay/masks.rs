#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
enum MaskKind {
    Cover,
    Jump,
    Light,
    Pumpkin,
    Sports,
}

impl MaskKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Cover" => Some(MaskKind::Cover),
            "Jump" => Some(MaskKind::Jump),
            "Light" => Some(MaskKind::Light),
            "Pumpkin" => Some(MaskKind::Pumpkin),
            "Sports" => Some(MaskKind::Sports),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum MaskEffect {
    Cover,
    Jump {
        multiplier: f32,
    },
    Light {
        light_prefab: Option<String>,
        darkness_layer: LayerMask,
        lit_alpha: f32,
    },
    Pumpkin {
        hidden_tag: String,
    },
    Sports {
        gravity_multiplier: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum DefinitionError {
    UnknownKind { def_name: String, kind: String },
    MissingDef { def_name: String },
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionError::UnknownKind { def_name, kind } => write!(
                f,
                "MaskDef '{def_name}' has unknown kind '{kind}'; expected Cover, Jump, Light, Pumpkin or Sports"
            ),
            DefinitionError::MissingDef { def_name } => {
                write!(f, "no def named '{def_name}' in the def database")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct MaskDefinition {
    def_name: String,
    kind: MaskKind,
    label: String,
    pickup_prefab: Option<String>,
    overlay_prefab: Option<String>,
    effect: MaskEffect,
}

impl MaskDefinition {
    fn from_archetype(archetype: &MaskArchetype) -> Result<Self, DefinitionError> {
        let kind =
            MaskKind::parse(&archetype.kind).ok_or_else(|| DefinitionError::UnknownKind {
                def_name: archetype.def_name.clone(),
                kind: archetype.kind.clone(),
            })?;
        let effect = match kind {
            MaskKind::Cover => MaskEffect::Cover,
            MaskKind::Jump => MaskEffect::Jump {
                multiplier: archetype.jump_multiplier.unwrap_or(DEFAULT_JUMP_MULTIPLIER),
            },
            MaskKind::Light => MaskEffect::Light {
                light_prefab: archetype.light_prefab.clone(),
                darkness_layer: archetype.darkness_layer.unwrap_or(LayerMask::DARKNESS),
                lit_alpha: archetype.lit_alpha.unwrap_or(DEFAULT_LIT_ALPHA),
            },
            MaskKind::Pumpkin => MaskEffect::Pumpkin {
                hidden_tag: archetype
                    .hidden_tag
                    .clone()
                    .unwrap_or_else(|| DEFAULT_HIDDEN_TAG.to_string()),
            },
            MaskKind::Sports => MaskEffect::Sports {
                gravity_multiplier: archetype
                    .gravity_multiplier
                    .unwrap_or(DEFAULT_GRAVITY_MULTIPLIER),
            },
        };
        Ok(Self {
            def_name: archetype.def_name.clone(),
            kind,
            label: archetype.label.clone(),
            pickup_prefab: archetype.pickup_prefab.clone(),
            overlay_prefab: archetype.overlay_prefab.clone(),
            effect,
        })
    }
}

trait MaskWorld: OverlaySink + WorldFactory + RegionSink {}

impl<T: OverlaySink + WorldFactory + RegionSink> MaskWorld for T {}

struct MaskContext<'a> {
    world: &'a mut dyn MaskWorld,
    motor: &'a mut Motor,
    wearer: EntityId,
}

/// Everything `apply` changed, kept so `remove` can undo exactly that.
#[derive(Debug, Default, PartialEq)]
struct AppliedEffects {
    overlay: Option<OverlayHandle>,
    light: Option<EntityId>,
    previous_alphas: Vec<(EntityId, f32)>,
    hidden_regions: Vec<EntityId>,
}

#[derive(Debug)]
struct MaskInstance {
    definition: MaskDefinition,
    applied: Option<AppliedEffects>,
}

impl MaskInstance {
    fn new(definition: MaskDefinition) -> Self {
        Self {
            definition,
            applied: None,
        }
    }

    fn kind(&self) -> MaskKind {
        self.definition.kind
    }

    fn definition(&self) -> &MaskDefinition {
        &self.definition
    }

    fn apply(&mut self, ctx: &mut MaskContext<'_>) {
        if self.applied.is_some() {
            debug!(mask = %self.definition.def_name, "mask_already_applied");
            return;
        }
        let mut applied = AppliedEffects::default();

        match self.definition.overlay_prefab.as_deref() {
            Some(prefab) => applied.overlay = Some(ctx.world.show_overlay(prefab)),
            None => debug!(
                mask = %self.definition.def_name,
                handle = "overlay_prefab",
                "mask_handle_missing"
            ),
        }

        match &self.definition.effect {
            MaskEffect::Cover => {}
            MaskEffect::Jump { multiplier } => {
                let jump_height = ctx.motor.physics.jump_height();
                ctx.motor.physics.set_jump_height(jump_height * multiplier);
            }
            MaskEffect::Sports { gravity_multiplier } => {
                ctx.motor.gravity_scale *= gravity_multiplier;
            }
            MaskEffect::Light {
                light_prefab,
                darkness_layer,
                lit_alpha,
            } => {
                match light_prefab.as_deref() {
                    Some(prefab) => applied.light = ctx.world.spawn_attached(prefab, ctx.wearer),
                    None => debug!(
                        mask = %self.definition.def_name,
                        handle = "light_prefab",
                        "mask_handle_missing"
                    ),
                }
                for region in ctx.world.regions_on_layer(*darkness_layer) {
                    if let Some(alpha) = ctx.world.region_alpha(region) {
                        applied.previous_alphas.push((region, alpha));
                        ctx.world.set_region_alpha(region, *lit_alpha);
                    }
                }
            }
            MaskEffect::Pumpkin { hidden_tag } => {
                for region in ctx.world.regions_with_tag(hidden_tag) {
                    if ctx.world.region_active(region) == Some(true) {
                        ctx.world.set_region_active(region, false);
                        applied.hidden_regions.push(region);
                    }
                }
            }
        }

        self.applied = Some(applied);
    }

    fn remove(&mut self, ctx: &mut MaskContext<'_>) {
        let Some(applied) = self.applied.take() else {
            debug!(mask = %self.definition.def_name, "mask_not_applied");
            return;
        };

        if let Some(overlay) = applied.overlay {
            ctx.world.hide_overlay(overlay);
        }

        match &self.definition.effect {
            MaskEffect::Cover => {}
            MaskEffect::Jump { multiplier } => {
                let jump_height = ctx.motor.physics.jump_height();
                ctx.motor.physics.set_jump_height(jump_height / multiplier);
            }
            MaskEffect::Sports { gravity_multiplier } => {
                ctx.motor.gravity_scale /= gravity_multiplier;
            }
            MaskEffect::Light { .. } => {
                if let Some(light) = applied.light {
                    ctx.world.destroy(light);
                }
                for (region, alpha) in applied.previous_alphas.iter().rev() {
                    ctx.world.set_region_alpha(*region, *alpha);
                }
            }
            MaskEffect::Pumpkin { .. } => {
                for region in &applied.hidden_regions {
                    ctx.world.set_region_active(*region, true);
                }
            }
        }
    }
}
