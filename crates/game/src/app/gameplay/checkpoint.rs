#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriggerKind {
    Checkpoint,
    Hazard,
}

fn classify_trigger(entity: &Entity) -> Option<TriggerKind> {
    if HAZARD_TAGS.iter().any(|tag| entity.has_tag(tag)) {
        Some(TriggerKind::Hazard)
    } else if entity.has_tag(CHECKPOINT_TAG) {
        Some(TriggerKind::Checkpoint)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CheckpointTracker {
    last_safe_position: Vec2,
}

impl CheckpointTracker {
    fn new(spawn_position: Vec2) -> Self {
        Self {
            last_safe_position: spawn_position,
        }
    }

    fn record(&mut self, position: Vec2) {
        self.last_safe_position = position;
        info!(x = position.x, y = position.y, "checkpoint_updated");
    }

    fn last_safe_position(&self) -> Vec2 {
        self.last_safe_position
    }
}

/// Tracks which triggers the player overlapped last frame so only entries
/// fire.
#[derive(Debug, Default)]
struct TriggerContacts {
    touching: Vec<EntityId>,
}

impl TriggerContacts {
    fn update(&mut self, current: Vec<EntityId>) -> Vec<EntityId> {
        let entered = current
            .iter()
            .copied()
            .filter(|id| !self.touching.contains(id))
            .collect();
        self.touching = current;
        entered
    }

    fn clear(&mut self) {
        self.touching.clear();
    }
}
