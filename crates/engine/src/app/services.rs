use tracing::debug;

use super::world::{
    AnimationClip, ColliderShape, EntityDesc, EntityId, LayerMask, OverlayHandle, SceneWorld,
    Transform, Vec2,
};

pub trait PhysicsQuery {
    fn overlap_circle(&self, point: Vec2, radius: f32, layers: LayerMask) -> bool;

    /// Hits in spawn order, oldest first.
    fn overlap_circle_all(&self, point: Vec2, radius: f32, layers: LayerMask) -> Vec<EntityId>;

    /// Highest solid top surface crossed while a probe of `half_width` moves
    /// down from `from_y` to `to_y`.
    fn landing_surface(
        &self,
        x: f32,
        half_width: f32,
        from_y: f32,
        to_y: f32,
        layers: LayerMask,
    ) -> Option<f32>;
}

pub trait WorldFactory {
    fn spawn_prefab(&mut self, prefab: &str, position: Vec2) -> EntityId;
    fn spawn_attached(&mut self, prefab: &str, parent: EntityId) -> Option<EntityId>;
    fn destroy(&mut self, id: EntityId) -> bool;
    fn set_collider_enabled(&mut self, id: EntityId, enabled: bool) -> bool;
}

pub trait OverlaySink {
    fn show_overlay(&mut self, prefab: &str) -> OverlayHandle;
    fn hide_overlay(&mut self, handle: OverlayHandle) -> bool;
}

/// Tagged or layered world regions whose visibility and transparency can be
/// toggled.
pub trait RegionSink {
    fn regions_with_tag(&self, tag: &str) -> Vec<EntityId>;
    fn regions_on_layer(&self, layer: LayerMask) -> Vec<EntityId>;
    fn region_active(&self, id: EntityId) -> Option<bool>;
    fn set_region_active(&mut self, id: EntityId, active: bool) -> bool;
    fn region_alpha(&self, id: EntityId) -> Option<f32>;
    fn set_region_alpha(&mut self, id: EntityId, alpha: f32) -> bool;
}

pub trait AnimationSink {
    fn play_animation(&mut self, id: EntityId, clip: AnimationClip);
    fn set_facing(&mut self, id: EntityId, facing_left: bool);
}

impl PhysicsQuery for SceneWorld {
    fn overlap_circle(&self, point: Vec2, radius: f32, layers: LayerMask) -> bool {
        self.colliding_entities(point, radius, layers)
            .next()
            .is_some()
    }

    fn overlap_circle_all(&self, point: Vec2, radius: f32, layers: LayerMask) -> Vec<EntityId> {
        let mut hits = self
            .colliding_entities(point, radius, layers)
            .map(|entity| (entity.applied_spawn_order(), entity.id))
            .collect::<Vec<_>>();
        hits.sort_by_key(|(order, _)| *order);
        hits.into_iter().map(|(_, id)| id).collect()
    }

    fn landing_surface(
        &self,
        x: f32,
        half_width: f32,
        from_y: f32,
        to_y: f32,
        layers: LayerMask,
    ) -> Option<f32> {
        let mut best: Option<f32> = None;
        for entity in self.entities() {
            if !entity.active || !entity.layer.intersects(layers) {
                continue;
            }
            let Some(collider) = entity.collider else {
                continue;
            };
            if !collider.enabled || collider.is_trigger {
                continue;
            }
            let ColliderShape::Box { half_extents } = collider.shape else {
                continue;
            };
            let center = entity.transform.position;
            let overlaps_x = x + half_width >= center.x - half_extents.x
                && x - half_width <= center.x + half_extents.x;
            if !overlaps_x {
                continue;
            }
            let top = center.y + half_extents.y;
            if top <= from_y && top >= to_y {
                best = Some(best.map_or(top, |current| current.max(top)));
            }
        }
        best
    }
}

impl WorldFactory for SceneWorld {
    fn spawn_prefab(&mut self, prefab: &str, position: Vec2) -> EntityId {
        let desc = match self.prefab_template(prefab) {
            Some(template) => template.clone().with_prefab(prefab),
            None => {
                debug!(prefab, "prefab_template_missing");
                EntityDesc::named(prefab).with_prefab(prefab)
            }
        };
        let id = self.spawn(Transform::at(position), desc);
        debug!(prefab, entity_id = id.0, "prefab_spawned");
        id
    }

    fn spawn_attached(&mut self, prefab: &str, parent: EntityId) -> Option<EntityId> {
        let position = self.find_entity(parent)?.transform.position;
        let id = self.spawn(
            Transform::at(position),
            EntityDesc::named(prefab)
                .with_prefab(prefab)
                .with_parent(parent),
        );
        Some(id)
    }

    fn destroy(&mut self, id: EntityId) -> bool {
        self.despawn(id)
    }

    fn set_collider_enabled(&mut self, id: EntityId, enabled: bool) -> bool {
        match self
            .find_entity_mut(id)
            .and_then(|entity| entity.collider.as_mut())
        {
            Some(collider) => {
                collider.enabled = enabled;
                true
            }
            None => false,
        }
    }
}

impl OverlaySink for SceneWorld {
    fn show_overlay(&mut self, prefab: &str) -> OverlayHandle {
        self.push_overlay(prefab)
    }

    fn hide_overlay(&mut self, handle: OverlayHandle) -> bool {
        self.remove_overlay(handle)
    }
}

impl RegionSink for SceneWorld {
    fn regions_with_tag(&self, tag: &str) -> Vec<EntityId> {
        self.entities()
            .iter()
            .filter(|entity| entity.has_tag(tag))
            .map(|entity| entity.id)
            .collect()
    }

    fn regions_on_layer(&self, layer: LayerMask) -> Vec<EntityId> {
        self.entities()
            .iter()
            .filter(|entity| entity.layer.intersects(layer))
            .map(|entity| entity.id)
            .collect()
    }

    fn region_active(&self, id: EntityId) -> Option<bool> {
        self.find_entity(id).map(|entity| entity.active)
    }

    fn set_region_active(&mut self, id: EntityId, active: bool) -> bool {
        match self.find_entity_mut(id) {
            Some(entity) => {
                entity.active = active;
                true
            }
            None => false,
        }
    }

    fn region_alpha(&self, id: EntityId) -> Option<f32> {
        self.find_entity(id).map(|entity| entity.alpha)
    }

    fn set_region_alpha(&mut self, id: EntityId, alpha: f32) -> bool {
        match self.find_entity_mut(id) {
            Some(entity) => {
                entity.alpha = alpha;
                true
            }
            None => false,
        }
    }
}

impl AnimationSink for SceneWorld {
    fn play_animation(&mut self, id: EntityId, clip: AnimationClip) {
        let changed = match self.find_entity_mut(id) {
            Some(entity) if entity.animation != Some(clip) => {
                entity.animation = Some(clip);
                true
            }
            _ => false,
        };
        if changed {
            self.record_animation_change();
        }
    }

    fn set_facing(&mut self, id: EntityId, facing_left: bool) {
        if let Some(entity) = self.find_entity_mut(id) {
            entity.facing_left = facing_left;
        }
    }
}
