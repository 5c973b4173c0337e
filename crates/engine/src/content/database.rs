use std::collections::HashMap;

use crate::app::LayerMask;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerArchetype {
    pub def_name: String,
    pub start_speed: f32,
    pub acceleration: f32,
    pub max_speed: f32,
    pub jump_height: f32,
    pub time_to_apex: f32,
    pub air_control: bool,
    pub ground_check_radius: f32,
    pub ground_check_offset_y: f32,
    pub interact_range: f32,
    pub body_radius: f32,
    pub drop_offset_y: f32,
}

impl PlayerArchetype {
    pub fn with_defaults(def_name: impl Into<String>) -> Self {
        Self {
            def_name: def_name.into(),
            start_speed: 2.0,
            acceleration: 20.0,
            max_speed: 8.0,
            jump_height: 4.0,
            time_to_apex: 0.4,
            air_control: true,
            ground_check_radius: 0.2,
            ground_check_offset_y: -0.5,
            interact_range: 1.5,
            body_radius: 0.5,
            drop_offset_y: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaskArchetype {
    pub def_name: String,
    pub kind: String,
    pub label: String,
    pub pickup_prefab: Option<String>,
    pub overlay_prefab: Option<String>,
    pub light_prefab: Option<String>,
    pub jump_multiplier: Option<f32>,
    pub gravity_multiplier: Option<f32>,
    pub hidden_tag: Option<String>,
    pub darkness_layer: Option<LayerMask>,
    pub lit_alpha: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DoorOpenPolicyKind {
    #[default]
    Destroy,
    DisableAndAnimate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoorArchetype {
    pub def_name: String,
    pub required_mask: String,
    pub open_policy: DoorOpenPolicyKind,
}

/// Compiled definitions, each kind sorted by `defName`.
#[derive(Debug, Default, Clone)]
pub struct DefDatabase {
    player_defs: Vec<PlayerArchetype>,
    mask_defs: Vec<MaskArchetype>,
    door_defs: Vec<DoorArchetype>,
    player_index: HashMap<String, usize>,
    mask_index: HashMap<String, usize>,
    door_index: HashMap<String, usize>,
}

impl DefDatabase {
    pub fn from_defs(
        player_defs: Vec<PlayerArchetype>,
        mask_defs: Vec<MaskArchetype>,
        door_defs: Vec<DoorArchetype>,
    ) -> Self {
        let player_index = index_by_name(&player_defs, |def| &def.def_name);
        let mask_index = index_by_name(&mask_defs, |def| &def.def_name);
        let door_index = index_by_name(&door_defs, |def| &def.def_name);
        Self {
            player_defs,
            mask_defs,
            door_defs,
            player_index,
            mask_index,
            door_index,
        }
    }

    pub fn player_def(&self, name: &str) -> Option<&PlayerArchetype> {
        self.player_index
            .get(name)
            .and_then(|idx| self.player_defs.get(*idx))
    }

    pub fn mask_def(&self, name: &str) -> Option<&MaskArchetype> {
        self.mask_index
            .get(name)
            .and_then(|idx| self.mask_defs.get(*idx))
    }

    pub fn door_def(&self, name: &str) -> Option<&DoorArchetype> {
        self.door_index
            .get(name)
            .and_then(|idx| self.door_defs.get(*idx))
    }

    pub fn player_defs(&self) -> &[PlayerArchetype] {
        &self.player_defs
    }

    pub fn mask_defs(&self) -> &[MaskArchetype] {
        &self.mask_defs
    }

    pub fn door_defs(&self) -> &[DoorArchetype] {
        &self.door_defs
    }

    pub fn def_count(&self) -> usize {
        self.player_defs.len() + self.mask_defs.len() + self.door_defs.len()
    }
}

fn index_by_name<T>(defs: &[T], name_of: impl Fn(&T) -> &String) -> HashMap<String, usize> {
    defs.iter()
        .enumerate()
        .map(|(idx, def)| (name_of(def).clone(), idx))
        .collect()
}
