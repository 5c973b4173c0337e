use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};

use crate::app::LayerMask;
use crate::validate_prefab_key;

use super::database::{
    DefDatabase, DoorArchetype, DoorOpenPolicyKind, MaskArchetype, PlayerArchetype,
};
use super::discovery::ContentSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentErrorCode {
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownDefType,
    UnknownField,
    DuplicateField,
    MissingField,
    InvalidValue,
    DuplicateDefInMod,
    UnknownReference,
}

#[derive(Debug, Clone)]
pub struct ContentCompileError {
    pub code: ContentErrorCode,
    pub message: String,
    pub mod_id: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for ContentCompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (mod={}, file={}, line={}, column={})",
                self.code,
                self.message,
                self.mod_id,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (mod={}, file={})",
                self.code,
                self.message,
                self.mod_id,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for ContentCompileError {}

#[derive(Debug)]
enum PendingDef {
    Player(PlayerArchetype),
    Mask(MaskArchetype),
    Door(DoorArchetype),
}

impl PendingDef {
    fn def_type(&self) -> &'static str {
        match self {
            PendingDef::Player(_) => "PlayerDef",
            PendingDef::Mask(_) => "MaskDef",
            PendingDef::Door(_) => "DoorDef",
        }
    }

    fn def_name(&self) -> &str {
        match self {
            PendingDef::Player(def) => &def.def_name,
            PendingDef::Mask(def) => &def.def_name,
            PendingDef::Door(def) => &def.def_name,
        }
    }
}

struct DoorOrigin {
    mod_id: String,
    file_path: PathBuf,
}

pub(crate) fn compile_mod_sources(
    sources: &[ContentSource],
) -> Result<DefDatabase, ContentCompileError> {
    let mut players = BTreeMap::<String, PlayerArchetype>::new();
    let mut masks = BTreeMap::<String, MaskArchetype>::new();
    let mut doors = BTreeMap::<String, (DoorArchetype, DoorOrigin)>::new();

    for source in sources {
        let xml_files = collect_xml_files_sorted(&source.root_dir)
            .map_err(|error| read_error(&source.mod_id, error.path, error.source))?;
        let mut seen_in_mod = HashSet::<(&'static str, String)>::new();

        for xml_file in xml_files {
            let raw = fs::read_to_string(&xml_file)
                .map_err(|source_err| read_error(&source.mod_id, xml_file.clone(), source_err))?;
            let defs = parse_defs_document(&source.mod_id, &xml_file, &raw)?;
            for def in defs {
                if !seen_in_mod.insert((def.def_type(), def.def_name().to_string())) {
                    return Err(ContentCompileError {
                        code: ContentErrorCode::DuplicateDefInMod,
                        message: format!(
                            "duplicate {} '{}' in mod '{}'; each mod may define a defName only once",
                            def.def_type(),
                            def.def_name(),
                            source.mod_id
                        ),
                        mod_id: source.mod_id.clone(),
                        file_path: xml_file.clone(),
                        location: None,
                    });
                }
                // Later mods replace earlier defs with the same defName.
                match def {
                    PendingDef::Player(def) => {
                        players.insert(def.def_name.clone(), def);
                    }
                    PendingDef::Mask(def) => {
                        masks.insert(def.def_name.clone(), def);
                    }
                    PendingDef::Door(def) => {
                        let origin = DoorOrigin {
                            mod_id: source.mod_id.clone(),
                            file_path: xml_file.clone(),
                        };
                        doors.insert(def.def_name.clone(), (def, origin));
                    }
                }
            }
        }
    }

    for (door, origin) in doors.values() {
        if !masks.contains_key(&door.required_mask) {
            return Err(ContentCompileError {
                code: ContentErrorCode::UnknownReference,
                message: format!(
                    "DoorDef '{}' requires unknown MaskDef '{}'",
                    door.def_name, door.required_mask
                ),
                mod_id: origin.mod_id.clone(),
                file_path: origin.file_path.clone(),
                location: None,
            });
        }
    }

    Ok(DefDatabase::from_defs(
        players.into_values().collect(),
        masks.into_values().collect(),
        doors.into_values().map(|(door, _)| door).collect(),
    ))
}

fn parse_defs_document(
    mod_id: &str,
    file_path: &Path,
    raw: &str,
) -> Result<Vec<PendingDef>, ContentCompileError> {
    let doc = Document::parse(raw).map_err(|error| ContentCompileError {
        code: ContentErrorCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        mod_id: mod_id.to_string(),
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;
    let site = XmlSite {
        mod_id,
        file_path,
        doc: &doc,
    };

    let root = doc.root_element();
    if root.tag_name().name() != "Defs" {
        return Err(site.error_at(
            ContentErrorCode::InvalidRoot,
            "root element must be <Defs>".to_string(),
            root,
        ));
    }

    let mut defs = Vec::<PendingDef>::new();
    for child in root.children().filter(|node| node.is_element()) {
        let def = match child.tag_name().name() {
            "PlayerDef" => PendingDef::Player(parse_player_def(&site, child)?),
            "MaskDef" => PendingDef::Mask(parse_mask_def(&site, child)?),
            "DoorDef" => PendingDef::Door(parse_door_def(&site, child)?),
            other => {
                return Err(site.error_at(
                    ContentErrorCode::UnknownDefType,
                    format!(
                        "unsupported def type <{other}>; expected <PlayerDef>, <MaskDef> or <DoorDef>"
                    ),
                    child,
                ))
            }
        };
        defs.push(def);
    }

    Ok(defs)
}

fn parse_player_def(
    site: &XmlSite<'_, '_>,
    node: Node<'_, '_>,
) -> Result<PlayerArchetype, ContentCompileError> {
    const DEF_TYPE: &str = "PlayerDef";
    let mut def_name: Option<String> = None;
    let mut def = PlayerArchetype::with_defaults(String::new());

    for field in site.unique_fields(node, DEF_TYPE)? {
        match field.tag_name().name() {
            "defName" => def_name = Some(site.required_text(field, "defName")?),
            "startSpeed" => def.start_speed = site.non_negative(field, "startSpeed")?,
            "acceleration" => def.acceleration = site.non_negative(field, "acceleration")?,
            "maxSpeed" => def.max_speed = site.non_negative(field, "maxSpeed")?,
            "jumpHeight" => def.jump_height = site.number(field, "jumpHeight")?,
            "timeToApex" => def.time_to_apex = site.number(field, "timeToApex")?,
            "airControl" => def.air_control = site.boolean(field, "airControl")?,
            "groundCheckRadius" => {
                def.ground_check_radius = site.non_negative(field, "groundCheckRadius")?
            }
            "groundCheckOffsetY" => {
                def.ground_check_offset_y = site.number(field, "groundCheckOffsetY")?
            }
            "interactRange" => def.interact_range = site.non_negative(field, "interactRange")?,
            "bodyRadius" => def.body_radius = site.positive(field, "bodyRadius")?,
            "dropOffsetY" => def.drop_offset_y = site.number(field, "dropOffsetY")?,
            other => return Err(site.unknown_field(field, other, DEF_TYPE)),
        }
    }

    def.def_name = site.require(def_name, node, "defName", DEF_TYPE)?;
    Ok(def)
}

fn parse_mask_def(
    site: &XmlSite<'_, '_>,
    node: Node<'_, '_>,
) -> Result<MaskArchetype, ContentCompileError> {
    const DEF_TYPE: &str = "MaskDef";
    let mut def_name: Option<String> = None;
    let mut kind: Option<String> = None;
    let mut label: Option<String> = None;
    let mut def = MaskArchetype {
        def_name: String::new(),
        kind: String::new(),
        label: String::new(),
        pickup_prefab: None,
        overlay_prefab: None,
        light_prefab: None,
        jump_multiplier: None,
        gravity_multiplier: None,
        hidden_tag: None,
        darkness_layer: None,
        lit_alpha: None,
    };

    for field in site.unique_fields(node, DEF_TYPE)? {
        match field.tag_name().name() {
            "defName" => def_name = Some(site.required_text(field, "defName")?),
            "kind" => kind = Some(site.required_text(field, "kind")?),
            "label" => label = Some(site.required_text(field, "label")?),
            "pickupPrefab" => def.pickup_prefab = Some(site.prefab(field, "pickupPrefab")?),
            "overlayPrefab" => def.overlay_prefab = Some(site.prefab(field, "overlayPrefab")?),
            "lightPrefab" => def.light_prefab = Some(site.prefab(field, "lightPrefab")?),
            "jumpMultiplier" => {
                def.jump_multiplier = Some(site.positive(field, "jumpMultiplier")?)
            }
            "gravityMultiplier" => {
                def.gravity_multiplier = Some(site.positive(field, "gravityMultiplier")?)
            }
            "hiddenTag" => def.hidden_tag = Some(site.required_text(field, "hiddenTag")?),
            "darknessLayer" => {
                let value = site.required_text(field, "darknessLayer")?;
                let layer = LayerMask::from_name(&value).ok_or_else(|| {
                    site.error_at(
                        ContentErrorCode::InvalidValue,
                        format!("darknessLayer '{value}' is not a known layer name"),
                        field,
                    )
                })?;
                def.darkness_layer = Some(layer);
            }
            "litAlpha" => {
                let value = site.number(field, "litAlpha")?;
                if !(0.0..=1.0).contains(&value) {
                    return Err(site.error_at(
                        ContentErrorCode::InvalidValue,
                        "litAlpha must be within 0..=1".to_string(),
                        field,
                    ));
                }
                def.lit_alpha = Some(value);
            }
            other => return Err(site.unknown_field(field, other, DEF_TYPE)),
        }
    }

    def.def_name = site.require(def_name, node, "defName", DEF_TYPE)?;
    def.kind = site.require(kind, node, "kind", DEF_TYPE)?;
    def.label = label.unwrap_or_else(|| def.def_name.clone());
    Ok(def)
}

fn parse_door_def(
    site: &XmlSite<'_, '_>,
    node: Node<'_, '_>,
) -> Result<DoorArchetype, ContentCompileError> {
    const DEF_TYPE: &str = "DoorDef";
    let mut def_name: Option<String> = None;
    let mut required_mask: Option<String> = None;
    let mut open_policy = DoorOpenPolicyKind::default();

    for field in site.unique_fields(node, DEF_TYPE)? {
        match field.tag_name().name() {
            "defName" => def_name = Some(site.required_text(field, "defName")?),
            "requiredMask" => required_mask = Some(site.required_text(field, "requiredMask")?),
            "openPolicy" => {
                let value = site.required_text(field, "openPolicy")?;
                open_policy = match value.as_str() {
                    "Destroy" => DoorOpenPolicyKind::Destroy,
                    "DisableAndAnimate" => DoorOpenPolicyKind::DisableAndAnimate,
                    _ => {
                        return Err(site.error_at(
                            ContentErrorCode::InvalidValue,
                            format!(
                                "invalid openPolicy '{value}'; allowed values: Destroy, DisableAndAnimate"
                            ),
                            field,
                        ))
                    }
                };
            }
            other => return Err(site.unknown_field(field, other, DEF_TYPE)),
        }
    }

    Ok(DoorArchetype {
        def_name: site.require(def_name, node, "defName", DEF_TYPE)?,
        required_mask: site.require(required_mask, node, "requiredMask", DEF_TYPE)?,
        open_policy,
    })
}

struct XmlSite<'a, 'input> {
    mod_id: &'a str,
    file_path: &'a Path,
    doc: &'a Document<'input>,
}

impl XmlSite<'_, '_> {
    fn unique_fields<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        def_type: &str,
    ) -> Result<Vec<Node<'a, 'input>>, ContentCompileError> {
        let mut seen_fields = HashSet::<&str>::new();
        let mut fields = Vec::new();
        for field in node.children().filter(|child| child.is_element()) {
            let field_name = field.tag_name().name();
            if !seen_fields.insert(field_name) {
                return Err(self.error_at(
                    ContentErrorCode::DuplicateField,
                    format!("duplicate field <{field_name}> in <{def_type}>"),
                    field,
                ));
            }
            fields.push(field);
        }
        Ok(fields)
    }

    fn require<T>(
        &self,
        value: Option<T>,
        node: Node<'_, '_>,
        field_name: &str,
        def_type: &str,
    ) -> Result<T, ContentCompileError> {
        value.ok_or_else(|| {
            self.error_at(
                ContentErrorCode::MissingField,
                format!("missing required field <{field_name}> in <{def_type}>"),
                node,
            )
        })
    }

    fn unknown_field(
        &self,
        field: Node<'_, '_>,
        field_name: &str,
        def_type: &str,
    ) -> ContentCompileError {
        self.error_at(
            ContentErrorCode::UnknownField,
            format!("unknown field <{field_name}> in <{def_type}>"),
            field,
        )
    }

    fn required_text(
        &self,
        node: Node<'_, '_>,
        field_name: &str,
    ) -> Result<String, ContentCompileError> {
        let value = node.text().map(str::trim).unwrap_or_default().to_string();
        if value.is_empty() {
            return Err(self.error_at(
                ContentErrorCode::MissingField,
                format!("field <{field_name}> must not be empty"),
                node,
            ));
        }
        Ok(value)
    }

    fn number(&self, node: Node<'_, '_>, field_name: &str) -> Result<f32, ContentCompileError> {
        let value = self.required_text(node, field_name)?;
        let parsed = value.parse::<f32>().map_err(|_| {
            self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{field_name} '{value}' is not a valid number"),
                node,
            )
        })?;
        if !parsed.is_finite() {
            return Err(self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{field_name} must be finite"),
                node,
            ));
        }
        Ok(parsed)
    }

    fn non_negative(
        &self,
        node: Node<'_, '_>,
        field_name: &str,
    ) -> Result<f32, ContentCompileError> {
        let value = self.number(node, field_name)?;
        if value < 0.0 {
            return Err(self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{field_name} must be >= 0"),
                node,
            ));
        }
        Ok(value)
    }

    fn positive(&self, node: Node<'_, '_>, field_name: &str) -> Result<f32, ContentCompileError> {
        let value = self.number(node, field_name)?;
        if value <= 0.0 {
            return Err(self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{field_name} must be > 0"),
                node,
            ));
        }
        Ok(value)
    }

    fn boolean(&self, node: Node<'_, '_>, field_name: &str) -> Result<bool, ContentCompileError> {
        let value = self.required_text(node, field_name)?;
        match value.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{field_name} '{value}' must be true or false"),
                node,
            )),
        }
    }

    fn prefab(&self, node: Node<'_, '_>, field_name: &str) -> Result<String, ContentCompileError> {
        let value = self.required_text(node, field_name)?;
        validate_prefab_key(&value).map_err(|error| {
            self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{field_name} '{value}' is not a valid prefab key: {error}"),
                node,
            )
        })?;
        Ok(value)
    }

    fn error_at(
        &self,
        code: ContentErrorCode,
        message: String,
        node: Node<'_, '_>,
    ) -> ContentCompileError {
        let pos = self.doc.text_pos_at(node.range().start);
        ContentCompileError {
            code,
            message,
            mod_id: self.mod_id.to_string(),
            file_path: self.file_path.to_path_buf(),
            location: Some(SourceLocation {
                line: pos.row as usize,
                column: pos.col as usize,
            }),
        }
    }
}

struct ReadError {
    path: PathBuf,
    source: std::io::Error,
}

fn collect_xml_files_sorted(root: &Path) -> Result<Vec<PathBuf>, ReadError> {
    let mut files = Vec::<PathBuf>::new();
    collect_recursive(root, &mut files)?;
    files.sort_by_key(|path| {
        normalize_rel_path(path.strip_prefix(root).unwrap_or(path.as_path()))
    });
    Ok(files)
}

fn collect_recursive(current: &Path, files: &mut Vec<PathBuf>) -> Result<(), ReadError> {
    let entries = fs::read_dir(current).map_err(|source| ReadError {
        path: current.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| ReadError {
            path: current.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_recursive(&path, files)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        {
            files.push(path);
        }
    }
    Ok(())
}

fn normalize_rel_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

fn read_error(mod_id: &str, path: PathBuf, source: std::io::Error) -> ContentCompileError {
    ContentCompileError {
        code: ContentErrorCode::ReadFile,
        message: format!("failed to read XML content: {source}"),
        mod_id: mod_id.to_string(),
        file_path: path,
        location: None,
    }
}
