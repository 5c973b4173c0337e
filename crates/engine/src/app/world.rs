use std::collections::HashMap;
use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::content::DefDatabase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn distance_squared(self, other: Vec2) -> f32 {
        (self - other).length_squared()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    pub position: Vec2,
}

impl Transform {
    pub const fn at(position: Vec2) -> Self {
        Self { position }
    }
}

/// Bit set of collision layers. An entity lives on exactly one layer; queries
/// take a mask that may combine several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const DEFAULT: LayerMask = LayerMask(1 << 0);
    pub const GROUND: LayerMask = LayerMask(1 << 1);
    pub const MASK: LayerMask = LayerMask(1 << 2);
    pub const DOOR: LayerMask = LayerMask(1 << 3);
    pub const TRIGGER: LayerMask = LayerMask(1 << 4);
    pub const DARKNESS: LayerMask = LayerMask(1 << 5);
    pub const PLAYER: LayerMask = LayerMask(1 << 6);

    pub const fn union(self, other: LayerMask) -> LayerMask {
        LayerMask(self.0 | other.0)
    }

    pub const fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn from_name(name: &str) -> Option<LayerMask> {
        let layer = match name {
            "Default" => LayerMask::DEFAULT,
            "Ground" => LayerMask::GROUND,
            "Mask" => LayerMask::MASK,
            "Door" => LayerMask::DOOR,
            "Trigger" => LayerMask::TRIGGER,
            "Darkness" => LayerMask::DARKNESS,
            "Player" => LayerMask::PLAYER,
            _ => return None,
        };
        Some(layer)
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    Circle { radius: f32 },
    Box { half_extents: Vec2 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub shape: ColliderShape,
    pub enabled: bool,
    pub is_trigger: bool,
}

impl Collider {
    pub const fn solid_box(half_extents: Vec2) -> Self {
        Self {
            shape: ColliderShape::Box { half_extents },
            enabled: true,
            is_trigger: false,
        }
    }

    pub const fn trigger_box(half_extents: Vec2) -> Self {
        Self {
            shape: ColliderShape::Box { half_extents },
            enabled: true,
            is_trigger: true,
        }
    }

    pub const fn trigger_circle(radius: f32) -> Self {
        Self {
            shape: ColliderShape::Circle { radius },
            enabled: true,
            is_trigger: true,
        }
    }

    fn overlaps_circle(&self, center: Vec2, point: Vec2, radius: f32) -> bool {
        match self.shape {
            ColliderShape::Circle { radius: own } => {
                let reach = own + radius;
                center.distance_squared(point) <= reach * reach
            }
            ColliderShape::Box { half_extents } => {
                let closest = Vec2::new(
                    point
                        .x
                        .clamp(center.x - half_extents.x, center.x + half_extents.x),
                    point
                        .y
                        .clamp(center.y - half_extents.y, center.y + half_extents.y),
                );
                closest.distance_squared(point) <= radius * radius
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationClip {
    Idle,
    Walk,
    Jump,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayHandle(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct EntityDesc {
    pub debug_name: String,
    pub prefab: Option<String>,
    pub layer: LayerMask,
    pub tags: Vec<String>,
    pub collider: Option<Collider>,
    pub parent: Option<EntityId>,
    pub alpha: f32,
}

impl EntityDesc {
    pub fn named(debug_name: impl Into<String>) -> Self {
        Self {
            debug_name: debug_name.into(),
            prefab: None,
            layer: LayerMask::DEFAULT,
            tags: Vec::new(),
            collider: None,
            parent: None,
            alpha: 1.0,
        }
    }

    pub fn with_prefab(mut self, prefab: impl Into<String>) -> Self {
        self.prefab = Some(prefab.into());
        self
    }

    pub fn with_layer(mut self, layer: LayerMask) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.collider = Some(collider);
        self
    }

    pub fn with_parent(mut self, parent: EntityId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub transform: Transform,
    pub debug_name: String,
    pub prefab: Option<String>,
    pub layer: LayerMask,
    pub tags: Vec<String>,
    pub collider: Option<Collider>,
    pub active: bool,
    pub alpha: f32,
    /// Attached entities follow their parent at `local_offset`.
    pub parent: Option<EntityId>,
    pub local_offset: Vec2,
    pub animation: Option<AnimationClip>,
    pub facing_left: bool,
    applied_spawn_order: u64,
}

impl Entity {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|own| own == tag)
    }

    pub(crate) fn applied_spawn_order(&self) -> u64 {
        self.applied_spawn_order
    }
}

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Debug, Default)]
pub struct SceneWorld {
    allocator: EntityIdAllocator,
    entities: Vec<Entity>,
    pending_spawns: Vec<Entity>,
    pending_despawns: Vec<EntityId>,
    next_applied_spawn_order: u64,
    overlays: Vec<(OverlayHandle, String)>,
    next_overlay_handle: u64,
    animation_changes: u64,
    prefabs: HashMap<String, EntityDesc>,
    def_database: Option<DefDatabase>,
}

impl SceneWorld {
    pub fn spawn(&mut self, transform: Transform, desc: EntityDesc) -> EntityId {
        let id = self.allocator.allocate();
        self.pending_spawns.push(Entity {
            id,
            transform,
            debug_name: desc.debug_name,
            prefab: desc.prefab,
            layer: desc.layer,
            tags: desc.tags,
            collider: desc.collider,
            active: true,
            alpha: desc.alpha,
            parent: desc.parent,
            local_offset: Vec2::ZERO,
            animation: None,
            facing_left: false,
            applied_spawn_order: 0,
        });
        id
    }

    pub fn despawn(&mut self, id: EntityId) -> bool {
        let exists_now = self.entities.iter().any(|entity| entity.id == id);
        let pending_spawn = self.pending_spawns.iter().any(|entity| entity.id == id);
        if !exists_now && !pending_spawn {
            return false;
        }
        self.pending_despawns.push(id);
        true
    }

    pub fn apply_pending(&mut self) {
        if !self.pending_despawns.is_empty() {
            self.pending_despawns.sort_by_key(|id| id.0);
            self.pending_despawns.dedup();
            let pending = &self.pending_despawns;
            let is_doomed = |entity: &Entity| {
                pending
                    .binary_search_by_key(&entity.id.0, |id| id.0)
                    .is_ok()
            };
            self.entities.retain(|entity| !is_doomed(entity));
            self.pending_spawns.retain(|entity| !is_doomed(entity));
            self.pending_despawns.clear();
        }

        if !self.pending_spawns.is_empty() {
            for mut entity in self.pending_spawns.drain(..) {
                entity.applied_spawn_order = self.next_applied_spawn_order;
                self.next_applied_spawn_order = self.next_applied_spawn_order.saturating_add(1);
                if let Some(parent_id) = entity.parent {
                    if let Some(parent) = self.entities.iter().find(|e| e.id == parent_id) {
                        entity.local_offset = entity.transform.position - parent.transform.position;
                    }
                }
                self.entities.push(entity);
            }
        }
    }

    /// Moves attached entities to their parent's position plus offset. Children
    /// whose parent is gone are left where they are.
    pub fn sync_attachments(&mut self) {
        let parents = self
            .entities
            .iter()
            .map(|entity| (entity.id, entity.transform.position))
            .collect::<Vec<_>>();
        for entity in &mut self.entities {
            let Some(parent_id) = entity.parent else {
                continue;
            };
            if let Some((_, parent_position)) = parents.iter().find(|(id, _)| *id == parent_id) {
                entity.transform.position = *parent_position + entity.local_offset;
            }
        }
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.pending_spawns.clear();
        self.pending_despawns.clear();
        self.next_applied_spawn_order = 0;
        self.overlays.clear();
        self.animation_changes = 0;
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn find_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn find_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    pub fn overlays(&self) -> impl Iterator<Item = (OverlayHandle, &str)> {
        self.overlays
            .iter()
            .map(|(handle, prefab)| (*handle, prefab.as_str()))
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn animation_change_count(&self) -> u64 {
        self.animation_changes
    }

    pub(crate) fn push_overlay(&mut self, prefab: &str) -> OverlayHandle {
        let handle = OverlayHandle(self.next_overlay_handle);
        self.next_overlay_handle = self.next_overlay_handle.saturating_add(1);
        self.overlays.push((handle, prefab.to_string()));
        handle
    }

    pub(crate) fn remove_overlay(&mut self, handle: OverlayHandle) -> bool {
        let before = self.overlays.len();
        self.overlays.retain(|(own, _)| *own != handle);
        self.overlays.len() != before
    }

    pub(crate) fn record_animation_change(&mut self) {
        self.animation_changes = self.animation_changes.saturating_add(1);
    }

    /// Template used by prefab spawns; the spawned entity is named after the key.
    pub fn register_prefab(&mut self, key: impl Into<String>, template: EntityDesc) {
        self.prefabs.insert(key.into(), template);
    }

    pub fn prefab_template(&self, key: &str) -> Option<&EntityDesc> {
        self.prefabs.get(key)
    }

    pub fn set_def_database(&mut self, def_database: DefDatabase) {
        self.def_database = Some(def_database);
    }

    pub fn def_database(&self) -> Option<&DefDatabase> {
        self.def_database.as_ref()
    }

    pub(crate) fn colliding_entities(
        &self,
        point: Vec2,
        radius: f32,
        layers: LayerMask,
    ) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |entity| {
            if !entity.active || !entity.layer.intersects(layers) {
                return false;
            }
            match entity.collider {
                Some(collider) if collider.enabled => {
                    collider.overlaps_circle(entity.transform.position, point, radius)
                }
                _ => false,
            }
        })
    }
}
