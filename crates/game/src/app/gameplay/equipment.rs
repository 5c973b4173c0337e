#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotError {
    Empty,
    Mismatch {
        equipped: MaskKind,
        required: MaskKind,
    },
}

impl fmt::Display for SlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotError::Empty => write!(f, "no mask equipped"),
            SlotError::Mismatch { equipped, required } => {
                write!(f, "equipped {equipped:?} mask does not match required {required:?}")
            }
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct SwapOutcome {
    displaced: Option<MaskKind>,
    dropped_pickup: Option<EntityId>,
}

#[derive(Debug, Default)]
enum EquipmentSlot {
    #[default]
    Empty,
    Equipped(MaskInstance),
}

impl EquipmentSlot {
    fn equipped(&self) -> Option<&MaskInstance> {
        match self {
            EquipmentSlot::Empty => None,
            EquipmentSlot::Equipped(instance) => Some(instance),
        }
    }

    fn equipped_kind(&self) -> Option<MaskKind> {
        self.equipped().map(MaskInstance::kind)
    }

    /// Equips `definition`. A mask already worn is fully removed and dropped
    /// back into the world at `drop_anchor` before the new one is applied.
    fn pickup(
        &mut self,
        definition: MaskDefinition,
        ctx: &mut MaskContext<'_>,
        drop_anchor: Vec2,
    ) -> SwapOutcome {
        let mut outcome = SwapOutcome::default();

        if let EquipmentSlot::Equipped(mut previous) = std::mem::take(self) {
            previous.remove(ctx);
            outcome.displaced = Some(previous.kind());
            match previous.definition().pickup_prefab.as_deref() {
                Some(prefab) => {
                    outcome.dropped_pickup = Some(ctx.world.spawn_prefab(prefab, drop_anchor));
                }
                None => debug!(
                    mask = %previous.definition().def_name,
                    handle = "pickup_prefab",
                    "mask_handle_missing"
                ),
            }
        }

        let mut instance = MaskInstance::new(definition);
        instance.apply(ctx);
        match outcome.displaced {
            Some(displaced) => info!(
                from = ?displaced,
                to = ?instance.kind(),
                label = %instance.definition().label,
                "mask_swapped"
            ),
            None => info!(
                mask = ?instance.kind(),
                label = %instance.definition().label,
                "mask_equipped"
            ),
        }
        *self = EquipmentSlot::Equipped(instance);
        outcome
    }

    fn consume(
        &mut self,
        required: MaskKind,
        ctx: &mut MaskContext<'_>,
    ) -> Result<MaskKind, SlotError> {
        let equipped = self.equipped_kind().ok_or(SlotError::Empty)?;
        if equipped != required {
            return Err(SlotError::Mismatch { equipped, required });
        }
        if let EquipmentSlot::Equipped(mut instance) = std::mem::take(self) {
            instance.remove(ctx);
        }
        info!(mask = ?equipped, "mask_consumed");
        Ok(equipped)
    }
}
