//! Panel data derived from the registry and the editor context.
//!
//! This is what the side panel draws. It is rebuilt by the registry on
//! structural changes and refilled from the selected node on selection sync;
//! the egui layer never reads the scene graph directly.

use crate::engine::{LightKind, PrimitiveShape};
use crate::render::{CameraReadout, GizmoMode};
use crate::scene::material::{MaterialParams, TextureKind, TextureSlotId};
use crate::scene::registry::{EntryId, EntryKind};

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRow {
    pub id: EntryId,
    pub name: String,
    pub kind: EntryKind,
    pub visible: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightRow {
    pub id: EntryId,
    pub name: String,
    pub kind: LightKind,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureRow {
    pub id: TextureSlotId,
    pub display_name: String,
    pub kind: TextureKind,
    pub intensity: f32,
    pub opacity: f32,
}

/// Which property sections apply to the selected entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelSections {
    pub transform: bool,
    pub scale: bool,
    pub geometry: bool,
    pub material: bool,
    pub textures: bool,
    pub light: bool,
}

impl PanelSections {
    pub fn for_kind(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Mesh => Self {
                transform: true,
                scale: true,
                geometry: true,
                material: true,
                textures: true,
                light: false,
            },
            EntryKind::Model => Self {
                transform: true,
                scale: true,
                ..Self::default()
            },
            EntryKind::LightDirectional | EntryKind::LightPoint | EntryKind::LightSpot => Self {
                transform: true,
                light: true,
                ..Self::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightFields {
    pub kind: LightKind,
    pub color: [f32; 3],
    pub intensity: f32,
    pub cast_shadow: bool,
    pub distance: f32,
    pub angle_deg: f32,
    pub penumbra: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyPanel {
    pub enabled: bool,
    pub sections: PanelSections,
    pub name: String,
    pub position: [f32; 3],
    pub rotation_deg: [f32; 3],
    pub scale: [f32; 3],
    pub geometry: Option<PrimitiveShape>,
    pub material: MaterialParams,
    pub light: Option<LightFields>,
}

impl Default for PropertyPanel {
    fn default() -> Self {
        Self {
            enabled: false,
            sections: PanelSections::default(),
            name: String::new(),
            position: [0.0; 3],
            rotation_deg: [0.0; 3],
            scale: [1.0; 3],
            geometry: None,
            material: MaterialParams::default(),
            light: None,
        }
    }
}

impl PropertyPanel {
    /// Keeps the last field values but greys the panel out.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.sections = PanelSections::default();
        self.light = None;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelState {
    pub objects: Vec<ObjectRow>,
    pub lights: Vec<LightRow>,
    pub textures: Vec<TextureRow>,
    pub properties: PropertyPanel,
    pub camera: CameraReadout,
    pub transform_mode: Option<GizmoMode>,
}

impl PanelState {
    pub fn object_row(&self, id: EntryId) -> Option<&ObjectRow> {
        self.objects.iter().find(|row| row.id == id)
    }
}
