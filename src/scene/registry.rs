//! Object registry: the editor's list of what is in the scene.
//!
//! Every editable item is a [`SceneEntry`] pointing at one scene-graph node.
//! The registry owns entry ids, the single selection, the light sublist and
//! the derived panel data, and is the only place that deletes registered
//! nodes. Operations are total: unknown ids are ignored.

use super::material::{derive_material, MaterialParams, TextureKind, TextureSlot, TextureSlotId};
use crate::assets::DecodedTexture;
use crate::context::EditorContext;
use crate::engine::{Axis, LightKind, NodeId, NodeKind, PrimitiveShape, Geometry};
use crate::render::{pick, GizmoMode};
use crate::ui::panels::{
    LightFields, LightRow, ObjectRow, PanelSections, PanelState, TextureRow,
};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub(crate) u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    Mesh,
    /// Imported model root; its meshes are not registered individually.
    Model,
    LightDirectional,
    LightPoint,
    LightSpot,
}

impl EntryKind {
    pub fn from_light(kind: LightKind) -> Self {
        match kind {
            LightKind::Directional => EntryKind::LightDirectional,
            LightKind::Point => EntryKind::LightPoint,
            LightKind::Spot => EntryKind::LightSpot,
        }
    }

    pub fn light_kind(self) -> Option<LightKind> {
        match self {
            EntryKind::LightDirectional => Some(LightKind::Directional),
            EntryKind::LightPoint => Some(LightKind::Point),
            EntryKind::LightSpot => Some(LightKind::Spot),
            EntryKind::Mesh | EntryKind::Model => None,
        }
    }

    pub fn is_light(self) -> bool {
        self.light_kind().is_some()
    }

    pub fn label(self) -> &'static str {
        match self {
            EntryKind::Mesh => "Mesh",
            EntryKind::Model => "Model",
            EntryKind::LightDirectional => LightKind::Directional.label(),
            EntryKind::LightPoint => LightKind::Point.label(),
            EntryKind::LightSpot => LightKind::Spot.label(),
        }
    }
}

/// Mesh-only state. Never present on light or model entries.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshState {
    pub shape: Option<PrimitiveShape>,
    pub base: MaterialParams,
    pub textures: Vec<TextureSlot>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneEntry {
    id: EntryId,
    node: NodeId,
    name: String,
    visible: bool,
    kind: EntryKind,
    mesh: Option<MeshState>,
}

impl SceneEntry {
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn mesh(&self) -> Option<&MeshState> {
        self.mesh.as_ref()
    }

    pub fn textures(&self) -> &[TextureSlot] {
        self.mesh.as_ref().map_or(&[], |mesh| mesh.textures.as_slice())
    }
}

/// One field edit from the transform section. Rotation is in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformEdit {
    Position(Axis, f32),
    RotationDeg(Axis, f32),
    Scale(Axis, f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightParams {
    pub color: [f32; 3],
    pub intensity: f32,
    pub cast_shadow: bool,
    pub distance: f32,
    pub angle_deg: f32,
    pub penumbra: f32,
}

#[derive(Default)]
pub struct ObjectRegistry {
    entries: Vec<SceneEntry>,
    lights: Vec<EntryId>,
    by_node: HashMap<NodeId, EntryId>,
    selected: Option<EntryId>,
    next_id: u64,
    sequence: u64,
    next_slot_id: u64,
    panels: PanelState,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            next_slot_id: 1,
            ..Self::default()
        }
    }

    pub fn entries(&self) -> &[SceneEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntryId) -> Option<&SceneEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Light entries in insertion order.
    pub fn lights(&self) -> impl Iterator<Item = &SceneEntry> + '_ {
        self.lights.iter().filter_map(|id| self.get(*id))
    }

    pub fn selected(&self) -> Option<&SceneEntry> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn selected_id(&self) -> Option<EntryId> {
        self.selected
    }

    pub fn entry_for_node(&self, node: NodeId) -> Option<&SceneEntry> {
        self.by_node.get(&node).and_then(|id| self.get(*id))
    }

    pub fn panels(&self) -> &PanelState {
        &self.panels
    }

    fn index_of(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// Registers `node` and returns the new entry. Unnamed entries get
    /// `"{label} {n}"` where `n` counts every entry ever added.
    pub fn add(
        &mut self,
        ctx: &mut EditorContext,
        node: NodeId,
        name: Option<String>,
        kind: EntryKind,
    ) -> &SceneEntry {
        self.sequence += 1;
        let id = EntryId(self.next_id);
        self.next_id += 1;

        let live_mesh = ctx.scene.get(node).and_then(|n| n.as_mesh());
        let mesh = match kind {
            EntryKind::Mesh => Some(MeshState {
                shape: live_mesh.and_then(|mesh| mesh.geometry.shape()),
                base: live_mesh
                    .map(|mesh| MaterialParams::from_material(&mesh.material))
                    .unwrap_or_default(),
                textures: Vec::new(),
            }),
            _ => None,
        };
        let label = match (kind, mesh.as_ref().and_then(|mesh| mesh.shape)) {
            (EntryKind::Mesh, Some(shape)) => shape.label(),
            _ => kind.label(),
        };
        let name = name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("{label} {}", self.sequence));
        let visible = ctx.scene.get(node).map_or(true, |n| n.visible);

        log::debug!("Registered entry {id} '{name}' ({kind:?})");
        if kind.is_light() {
            self.lights.push(id);
        }
        self.by_node.insert(node, id);
        self.entries.push(SceneEntry {
            id,
            node,
            name,
            visible,
            kind,
            mesh,
        });
        self.refresh_panels(ctx);
        let index = self.entries.len() - 1;
        &self.entries[index]
    }

    pub fn remove(&mut self, ctx: &mut EditorContext, id: EntryId) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        let entry = self.entries.remove(index);
        let was_selected = self.selected == Some(id);
        if was_selected || ctx.gizmo.attached() == Some(entry.node) {
            ctx.gizmo.detach();
        }

        let dropped = ctx.scene.remove_subtree(entry.node);
        self.by_node.remove(&entry.node);
        self.lights.retain(|light| *light != id);
        for slot in entry.textures() {
            ctx.textures.release(slot.handle);
        }
        ctx.loads.cancel_for(id);
        log::debug!("Removed entry {id} '{}' ({dropped} nodes)", entry.name);

        if was_selected {
            self.select(ctx, None);
        } else {
            self.refresh_panels(ctx);
        }
    }

    /// Selects `id`, or clears the selection for `None` and unknown ids.
    /// Selecting the current selection re-syncs the panels.
    pub fn select(&mut self, ctx: &mut EditorContext, id: Option<EntryId>) {
        ctx.gizmo.detach();
        let target = id.and_then(|id| self.get(id)).map(|entry| (entry.id, entry.node));
        match target {
            Some((id, node)) => {
                self.selected = Some(id);
                if ctx.gizmo.enabled() {
                    ctx.gizmo.attach(node);
                }
                let name = self.get(id).map(|entry| entry.name.clone());
                ctx.status.set_selection(name.as_deref());
                self.refresh_panels(ctx);
                self.sync_controls_from_selection(ctx);
            }
            None => {
                self.selected = None;
                ctx.status.set_selection(None);
                self.panels.properties.disable();
                self.panels.textures.clear();
                self.refresh_panels(ctx);
            }
        }
    }

    /// Entry under a viewport pixel. Hits on nodes below a registered node
    /// resolve to that node's entry; helpers and hidden nodes never match.
    pub fn pick_at(&self, ctx: &EditorContext, point: Vec2) -> Option<&SceneEntry> {
        let hits = pick::scene_hits(&ctx.scene, &ctx.camera, ctx.viewport(), point);
        hits.iter().find_map(|hit| {
            std::iter::once(hit.node)
                .chain(ctx.scene.ancestors(hit.node))
                .find_map(|node| self.entry_for_node(node))
        })
    }

    pub fn set_visible(&mut self, ctx: &mut EditorContext, id: EntryId, visible: bool) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        let entry = &mut self.entries[index];
        entry.visible = visible;
        if let Some(node) = ctx.scene.get_mut(entry.node) {
            node.visible = visible;
        }
        if let Some(row) = self.panels.objects.iter_mut().find(|row| row.id == id) {
            row.visible = visible;
        }
    }

    pub fn rename(&mut self, ctx: &mut EditorContext, id: EntryId, name: &str) {
        let name = name.trim();
        let Some(index) = self.index_of(id).filter(|_| !name.is_empty()) else {
            return;
        };
        self.entries[index].name = name.to_string();
        if self.selected == Some(id) {
            ctx.status.set_selection(Some(name));
        }
        self.refresh_panels(ctx);
        if self.selected == Some(id) {
            self.sync_controls_from_selection(ctx);
        }
    }

    /// Copies the selected node's live state into the property panel.
    pub fn sync_controls_from_selection(&mut self, ctx: &EditorContext) {
        let Some(entry) = self.selected() else {
            return;
        };
        let Some(node) = ctx.scene.get(entry.node) else {
            return;
        };
        let transform = node.transform;
        let light = node.as_light().map(|light| LightFields {
            kind: light.kind,
            color: light.color,
            intensity: light.intensity,
            cast_shadow: light.cast_shadow,
            distance: light.distance,
            angle_deg: light.angle.to_degrees(),
            penumbra: light.penumbra,
        });
        let kind = entry.kind;
        let name = entry.name.clone();
        let (geometry, material) = match entry.mesh() {
            Some(mesh) => (mesh.shape, Some(mesh.base)),
            None => (None, None),
        };
        let rows = texture_rows(entry.textures());

        let properties = &mut self.panels.properties;
        properties.enabled = true;
        properties.sections = PanelSections::for_kind(kind);
        properties.name = name;
        properties.position = transform.position.to_array();
        properties.rotation_deg = transform.rotation.to_array().map(f32::to_degrees);
        properties.scale = transform.scale.to_array();
        properties.geometry = geometry;
        if let Some(material) = material {
            properties.material = material;
        }
        properties.light = light;
        self.panels.textures = rows;
    }

    /// Turns transform mode off (`None`) or on with the given gizmo mode.
    pub fn set_transform_mode(&mut self, ctx: &mut EditorContext, mode: Option<GizmoMode>) {
        match mode {
            None => ctx.gizmo.set_enabled(false),
            Some(mode) => {
                ctx.gizmo.set_enabled(true);
                ctx.gizmo.set_mode(mode);
                if let Some(entry) = self.selected() {
                    ctx.gizmo.attach(entry.node);
                }
            }
        }
        self.panels.transform_mode = mode;
    }

    /// Swaps the primitive of a mesh entry, keeping transform and material.
    pub fn set_geometry(&mut self, ctx: &mut EditorContext, id: EntryId, shape: PrimitiveShape) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        let entry = &mut self.entries[index];
        let Some(mesh_state) = entry.mesh.as_mut() else {
            return;
        };
        let Some(mesh) = ctx.scene.get_mut(entry.node).and_then(|n| n.as_mesh_mut()) else {
            return;
        };
        mesh.geometry = Geometry::Primitive(shape);
        mesh_state.shape = Some(shape);
        log::debug!("Entry {id} geometry -> {}", shape.label());
        if self.selected == Some(id) {
            self.sync_controls_from_selection(ctx);
        }
    }

    pub fn set_material_params(&mut self, ctx: &mut EditorContext, id: EntryId, params: MaterialParams) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        let Some(mesh) = self.entries[index].mesh.as_mut() else {
            return;
        };
        mesh.base = params.clamped();
        self.rederive(ctx, index);
    }

    /// Applies one transform field. Scale must be positive and is refused
    /// for lights. Returns whether the node changed.
    pub fn set_transform(&mut self, ctx: &mut EditorContext, id: EntryId, edit: TransformEdit) -> bool {
        let Some(entry) = self.get(id) else {
            return false;
        };
        let kind = entry.kind;
        let Some(node) = ctx.scene.get_mut(entry.node) else {
            return false;
        };
        let transform = &mut node.transform;
        match edit {
            TransformEdit::Position(axis, value) if value.is_finite() => {
                transform.position[axis.index()] = value;
            }
            TransformEdit::RotationDeg(axis, degrees) if degrees.is_finite() => {
                transform.rotation[axis.index()] = degrees.to_radians();
            }
            TransformEdit::Scale(axis, value) if value.is_finite() && value > 0.0 && !kind.is_light() => {
                transform.scale[axis.index()] = value;
            }
            _ => return false,
        }
        if self.selected == Some(id) {
            self.sync_controls_from_selection(ctx);
        }
        true
    }

    pub fn set_light_params(&mut self, ctx: &mut EditorContext, id: EntryId, params: LightParams) {
        let Some(entry) = self.get(id).filter(|entry| entry.kind.is_light()) else {
            return;
        };
        let Some(light) = ctx.scene.get_mut(entry.node).and_then(|n| n.as_light_mut()) else {
            return;
        };
        light.color = params.color.map(|channel| channel.clamp(0.0, 1.0));
        light.intensity = params.intensity.max(0.0);
        light.cast_shadow = params.cast_shadow && ctx.settings.shadows;
        light.distance = params.distance.max(0.0);
        light.angle = params.angle_deg.clamp(0.0, 90.0).to_radians();
        light.penumbra = params.penumbra.clamp(0.0, 1.0);
        if self.selected == Some(id) {
            self.sync_controls_from_selection(ctx);
        }
    }

    /// Shadow switch: every registered mesh (model subtrees included),
    /// the ground and every light follow it.
    pub fn set_shadows(&mut self, ctx: &mut EditorContext, enabled: bool) {
        ctx.settings.shadows = enabled;
        for entry in &self.entries {
            for node_id in ctx.scene.descendants(entry.node) {
                let Some(node) = ctx.scene.get_mut(node_id) else {
                    continue;
                };
                match &mut node.kind {
                    NodeKind::Mesh(mesh) => {
                        mesh.cast_shadow = enabled;
                        mesh.receive_shadow = enabled;
                    }
                    NodeKind::Light(light) => light.cast_shadow = enabled,
                    NodeKind::Group => {}
                }
            }
        }
        if let Some(ground) = ctx
            .scene
            .get_mut(ctx.fixtures.ground)
            .and_then(|n| n.as_mesh_mut())
        {
            ground.receive_shadow = enabled;
        }
        log::debug!("Shadows {}", if enabled { "on" } else { "off" });
        self.sync_controls_from_selection(ctx);
    }

    /// Completion half of a texture load. Appends a diffuse slot when `id`
    /// is still a live mesh entry; otherwise the image is dropped.
    pub fn attach_texture(
        &mut self,
        ctx: &mut EditorContext,
        id: EntryId,
        texture: DecodedTexture,
    ) -> Option<TextureSlotId> {
        let index = self
            .index_of(id)
            .filter(|index| self.entries[*index].mesh.is_some());
        let Some(index) = index else {
            log::debug!("Dropping texture '{}' for missing mesh entry {id}", texture.name);
            return None;
        };
        let slot_id = TextureSlotId(self.next_slot_id);
        self.next_slot_id += 1;
        let display_name = texture.name.clone();
        let source_hash = texture.source_hash.clone();
        let handle = ctx.textures.insert(texture);
        let mesh = self.entries[index].mesh.as_mut()?;
        mesh.textures
            .push(TextureSlot::new(slot_id, display_name, handle, source_hash));
        log::debug!("Entry {id} gained texture slot {slot_id}");
        self.rederive(ctx, index);
        Some(slot_id)
    }

    pub fn remove_texture(&mut self, ctx: &mut EditorContext, id: EntryId, slot: TextureSlotId) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        let Some(mesh) = self.entries[index].mesh.as_mut() else {
            return;
        };
        let Some(position) = mesh.textures.iter().position(|s| s.id == slot) else {
            return;
        };
        let removed = mesh.textures.remove(position);
        ctx.textures.release(removed.handle);
        self.rederive(ctx, index);
    }

    pub fn set_texture_kind(&mut self, ctx: &mut EditorContext, id: EntryId, slot: TextureSlotId, kind: TextureKind) {
        self.edit_slot(ctx, id, slot, |s| s.kind = kind);
    }

    pub fn set_texture_intensity(&mut self, ctx: &mut EditorContext, id: EntryId, slot: TextureSlotId, intensity: f32) {
        self.edit_slot(ctx, id, slot, |s| s.set_intensity(intensity));
    }

    pub fn set_texture_opacity(&mut self, ctx: &mut EditorContext, id: EntryId, slot: TextureSlotId, opacity: f32) {
        self.edit_slot(ctx, id, slot, |s| s.set_opacity(opacity));
    }

    fn edit_slot<F>(&mut self, ctx: &mut EditorContext, id: EntryId, slot: TextureSlotId, edit: F)
    where
        F: FnOnce(&mut TextureSlot),
    {
        let Some(index) = self.index_of(id) else {
            return;
        };
        let Some(target) = self.entries[index]
            .mesh
            .as_mut()
            .and_then(|mesh| mesh.textures.iter_mut().find(|s| s.id == slot))
        else {
            return;
        };
        edit(target);
        self.rederive(ctx, index);
    }

    /// Rebuilds the node material from base params and slots.
    fn rederive(&mut self, ctx: &mut EditorContext, index: usize) {
        let entry = &self.entries[index];
        let Some(state) = entry.mesh.as_ref() else {
            return;
        };
        if let Some(mesh) = ctx.scene.get_mut(entry.node).and_then(|n| n.as_mesh_mut()) {
            mesh.material = derive_material(&state.base, &state.textures);
        }
        if self.selected == Some(entry.id) {
            self.sync_controls_from_selection(ctx);
        }
    }

    pub fn refresh_camera(&mut self, ctx: &EditorContext) {
        self.panels.camera = ctx.camera.readout();
    }

    fn refresh_panels(&mut self, ctx: &EditorContext) {
        let selected = self.selected;
        self.panels.objects = self
            .entries
            .iter()
            .map(|entry| ObjectRow {
                id: entry.id,
                name: entry.name.clone(),
                kind: entry.kind,
                visible: entry.visible,
                selected: selected == Some(entry.id),
            })
            .collect();
        self.panels.lights = self
            .lights()
            .filter_map(|entry| {
                Some(LightRow {
                    id: entry.id,
                    name: entry.name.clone(),
                    kind: entry.kind.light_kind()?,
                    selected: selected == Some(entry.id),
                })
            })
            .collect();
        self.panels.camera = ctx.camera.readout();
        self.panels.transform_mode = ctx.gizmo.enabled().then(|| ctx.gizmo.mode());
    }
}

fn texture_rows(slots: &[TextureSlot]) -> Vec<TextureRow> {
    slots
        .iter()
        .map(|slot| TextureRow {
            id: slot.id,
            display_name: slot.display_name.clone(),
            kind: slot.kind,
            intensity: slot.intensity,
            opacity: slot.opacity,
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::assets::model::{instantiate, parse_gltf_slice, TEST_GLTF};
    use crate::config::EditorConfig;
    use crate::engine::{LightNode, Node, StandardMaterial, Transform};
    use glam::Vec3;
    use std::collections::HashSet;

    pub(crate) fn context() -> EditorContext {
        EditorContext::new(EditorConfig::default())
    }

    pub(crate) fn add_shape(
        registry: &mut ObjectRegistry,
        ctx: &mut EditorContext,
        shape: PrimitiveShape,
        position: Vec3,
    ) -> EntryId {
        let node = ctx.scene.add_to_root(
            Node::mesh(shape.label(), Geometry::Primitive(shape), StandardMaterial::default())
                .with_transform(Transform::from_position(position)),
        );
        registry.add(ctx, node, None, EntryKind::Mesh).id()
    }

    fn add_light(registry: &mut ObjectRegistry, ctx: &mut EditorContext, kind: LightKind) -> EntryId {
        let node = ctx.scene.add_to_root(Node::light(kind.label(), LightNode::new(kind)));
        registry.add(ctx, node, None, EntryKind::from_light(kind)).id()
    }

    fn texture(name: &str) -> DecodedTexture {
        DecodedTexture {
            name: name.to_string(),
            width: 1,
            height: 1,
            rgba: vec![255; 4],
            source_hash: String::new(),
        }
    }

    fn viewport_center(ctx: &EditorContext) -> Vec2 {
        Vec2::new(ctx.viewport().width * 0.5, ctx.viewport().height * 0.5)
    }

    #[test]
    fn adding_keeps_order_and_unique_ids() {
        let mut ctx = context();
        let mut registry = ObjectRegistry::new();
        let ids: Vec<EntryId> = PrimitiveShape::ALL
            .iter()
            .map(|shape| add_shape(&mut registry, &mut ctx, *shape, Vec3::ZERO))
            .collect();
        assert_eq!(registry.len(), 5);
        let listed: Vec<EntryId> = registry.entries().iter().map(SceneEntry::id).collect();
        assert_eq!(listed, ids);
        let unique: HashSet<EntryId> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
        assert_eq!(registry.panels().objects.len(), 5);
    }

    #[test]
    fn default_names_count_every_addition() {
        let mut ctx = context();
        let mut registry = ObjectRegistry::new();
        let a = add_shape(&mut registry, &mut ctx, PrimitiveShape::Box, Vec3::ZERO);
        registry.remove(&mut ctx, a);
        let b = add_shape(&mut registry, &mut ctx, PrimitiveShape::Sphere, Vec3::ZERO);
        let light = add_light(&mut registry, &mut ctx, LightKind::Spot);
        assert_eq!(registry.get(b).unwrap().name(), "Sphere 2");
        assert_eq!(registry.get(light).unwrap().name(), "Spot Light 3");

        let node = ctx.scene.add_to_root(Node::group("helmet"));
        let model = registry.add(&mut ctx, node, Some("helmet".into()), EntryKind::Model).id();
        assert_eq!(registry.get(model).unwrap().name(), "helmet");
    }

    #[test]
    fn removing_unknown_id_is_a_no_op() {
        let mut ctx = context();
        let mut registry = ObjectRegistry::new();
        add_shape(&mut registry, &mut ctx, PrimitiveShape::Box, Vec3::ZERO);
        registry.remove(&mut ctx, EntryId(999));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn select_then_remove_sequence() {
        let mut ctx = context();
        ctx.gizmo.set_enabled(true);
        let mut registry = ObjectRegistry::new();
        let a = add_shape(&mut registry, &mut ctx, PrimitiveShape::Box, Vec3::ZERO);
        let b = add_shape(&mut registry, &mut ctx, PrimitiveShape::Sphere, Vec3::X);

        registry.select(&mut ctx, Some(b));
        assert_eq!(registry.selected_id(), Some(b));
        let b_node = registry.get(b).unwrap().node();
        assert_eq!(ctx.gizmo.attached(), Some(b_node));

        registry.remove(&mut ctx, a);
        assert_eq!(
            registry.entries().iter().map(SceneEntry::id).collect::<Vec<_>>(),
            vec![b]
        );
        assert_eq!(registry.selected_id(), Some(b));

        registry.remove(&mut ctx, b);
        assert!(registry.is_empty());
        assert_eq!(registry.selected_id(), None);
        assert_eq!(ctx.gizmo.attached(), None);
        assert!(!ctx.scene.contains(b_node));
        assert_eq!(ctx.status.selection(), "Selected: None");
        assert!(!registry.panels().properties.enabled);
    }

    #[test]
    fn gizmo_binds_only_in_transform_mode() {
        let mut ctx = context();
        let mut registry = ObjectRegistry::new();
        let a = add_shape(&mut registry, &mut ctx, PrimitiveShape::Box, Vec3::ZERO);
        registry.select(&mut ctx, Some(a));
        assert_eq!(ctx.gizmo.attached(), None);

        registry.set_transform_mode(&mut ctx, Some(GizmoMode::Rotate));
        assert_eq!(ctx.gizmo.attached(), registry.get(a).map(SceneEntry::node));
        assert_eq!(registry.panels().transform_mode, Some(GizmoMode::Rotate));

        registry.set_transform_mode(&mut ctx, None);
        assert_eq!(ctx.gizmo.attached(), None);
        assert_eq!(registry.selected_id(), Some(a));
    }

    #[test]
    fn selecting_unknown_id_clears_selection() {
        let mut ctx = context();
        let mut registry = ObjectRegistry::new();
        let a = add_shape(&mut registry, &mut ctx, PrimitiveShape::Box, Vec3::ZERO);
        registry.select(&mut ctx, Some(a));
        assert_eq!(ctx.status.selection(), "Selected: Box 1");
        registry.select(&mut ctx, Some(EntryId(42)));
        assert_eq!(registry.selected_id(), None);
        assert!(registry.panels().objects.iter().all(|row| !row.selected));
    }

    #[test]
    fn light_sublist_tracks_lights_only() {
        let mut ctx = context();
        let mut registry = ObjectRegistry::new();
        add_shape(&mut registry, &mut ctx, PrimitiveShape::Box, Vec3::ZERO);
        let point = add_light(&mut registry, &mut ctx, LightKind::Point);
        let spot = add_light(&mut registry, &mut ctx, LightKind::Spot);
        assert_eq!(registry.lights().count(), 2);
        assert!(registry.get(point).unwrap().mesh().is_none());

        registry.remove(&mut ctx, point);
        let remaining: Vec<EntryId> = registry.lights().map(SceneEntry::id).collect();
        assert_eq!(remaining, vec![spot]);
        assert_eq!(registry.panels().lights.len(), 1);
    }

    #[test]
    fn panel_sections_follow_kind() {
        let mut ctx = context();
        let mut registry = ObjectRegistry::new();
        let mesh = add_shape(&mut registry, &mut ctx, PrimitiveShape::Torus, Vec3::ZERO);
        let light = add_light(&mut registry, &mut ctx, LightKind::Directional);

        registry.select(&mut ctx, Some(mesh));
        let panel = &registry.panels().properties;
        assert!(panel.enabled && panel.sections.textures && panel.sections.geometry);
        assert_eq!(panel.geometry, Some(PrimitiveShape::Torus));

        registry.select(&mut ctx, Some(light));
        let panel = &registry.panels().properties;
        assert!(panel.sections.light && !panel.sections.scale && !panel.sections.textures);
        assert_eq!(panel.light.unwrap().kind, LightKind::Directional);
    }

    #[test]
    fn pick_hits_mesh_and_misses_empty_space() {
        let mut ctx = context();
        let mut registry = ObjectRegistry::new();
        let a = add_shape(&mut registry, &mut ctx, PrimitiveShape::Box, Vec3::ZERO);
        let center = viewport_center(&ctx);

        assert_eq!(registry.pick_at(&ctx, center).map(SceneEntry::id), Some(a));
        // grid and ground sit under the corner but are helpers
        assert!(registry.pick_at(&ctx, Vec2::new(2.0, ctx.viewport().height - 2.0)).is_none());
        assert!(registry.pick_at(&ctx, Vec2::new(2.0, 2.0)).is_none());
    }

    #[test]
    fn pick_ignores_invisible_entries() {
        let mut ctx = context();
        let mut registry = ObjectRegistry::new();
        let front = add_shape(&mut registry, &mut ctx, PrimitiveShape::Sphere, Vec3::new(0.0, 0.8, 3.0));
        let back = add_shape(&mut registry, &mut ctx, PrimitiveShape::Box, Vec3::ZERO);
        let center = viewport_center(&ctx);
        let ray = ctx.camera.screen_ray(center, ctx.viewport());
        // keep the sphere on the line of sight
        let on_ray = ray.origin + ray.direction * 2.0;
        let front_node = registry.get(front).unwrap().node();
        ctx.scene.get_mut(front_node).unwrap().transform.position = on_ray;

        assert_eq!(registry.pick_at(&ctx, center).map(SceneEntry::id), Some(front));
        registry.set_visible(&mut ctx, front, false);
        assert!(!registry.panels().object_row(front).unwrap().visible);
        assert_eq!(registry.pick_at(&ctx, center).map(SceneEntry::id), Some(back));
    }

    #[test]
    fn pick_resolves_model_children_to_model_entry() {
        let mut ctx = context();
        let mut registry = ObjectRegistry::new();
        let model = parse_gltf_slice(TEST_GLTF.as_bytes(), "truck".into(), "truck.gltf").unwrap();
        let root = instantiate(&mut ctx.scene, &model);
        let id = registry.add(&mut ctx, root, Some(model.name.clone()), EntryKind::Model).id();
        let wheel = *ctx.scene.descendants(root).last().unwrap();
        let target = ctx.scene.world_bounds(wheel).center();
        let point = ctx.camera.world_to_screen(target, ctx.viewport()).unwrap();
        assert_eq!(registry.pick_at(&ctx, point).map(SceneEntry::id), Some(id));
        assert!(registry.get(id).unwrap().mesh().is_none());
    }

    #[test]
    fn diffuse_opacity_round_trip() {
        let mut ctx = context();
        let mut registry = ObjectRegistry::new();
        let m = add_shape(&mut registry, &mut ctx, PrimitiveShape::Box, Vec3::ZERO);
        let slot = registry.attach_texture(&mut ctx, m, texture("wood.png")).unwrap();
        registry.set_texture_opacity(&mut ctx, m, slot, 0.5);

        let node = registry.get(m).unwrap().node();
        let material = |ctx: &EditorContext| ctx.scene.get(node).unwrap().as_mesh().unwrap().material.clone();
        assert!(material(&ctx).transparent);
        assert_eq!(material(&ctx).opacity, 0.5);
        assert_eq!(ctx.textures.len(), 1);

        registry.remove_texture(&mut ctx, m, slot);
        assert!(!material(&ctx).transparent);
        assert_eq!(material(&ctx).opacity, 1.0);
        assert!(material(&ctx).map.is_none());
        assert!(ctx.textures.is_empty());
    }

    #[test]
    fn texture_completions_append_in_arrival_order() {
        let mut ctx = context();
        let mut registry = ObjectRegistry::new();
        let m = add_shape(&mut registry, &mut ctx, PrimitiveShape::Box, Vec3::ZERO);
        let first = registry.attach_texture(&mut ctx, m, texture("late-request.png")).unwrap();
        let second = registry.attach_texture(&mut ctx, m, texture("early-request.png")).unwrap();

        let slots = registry.get(m).unwrap().textures();
        let names: Vec<&str> = slots.iter().map(|slot| slot.display_name.as_str()).collect();
        assert_eq!(names, ["late-request.png", "early-request.png"]);
        assert_eq!(slots.iter().map(|slot| slot.id).collect::<Vec<_>>(), [first, second]);
        assert!(slots.iter().all(|slot| slot.kind == TextureKind::Diffuse));

        let node = registry.get(m).unwrap().node();
        let material = ctx.scene.get(node).unwrap().as_mesh().unwrap().material.clone();
        assert_eq!(material.map, Some(slots[1].handle));
        assert_ne!(material.map, Some(slots[0].handle));
    }

    #[test]
    fn texture_kind_change_moves_channel() {
        let mut ctx = context();
        let mut registry = ObjectRegistry::new();
        let m = add_shape(&mut registry, &mut ctx, PrimitiveShape::Box, Vec3::ZERO);
        registry.select(&mut ctx, Some(m));
        let slot = registry.attach_texture(&mut ctx, m, texture("bumps.png")).unwrap();
        registry.set_texture_kind(&mut ctx, m, slot, TextureKind::Normal);
        registry.set_texture_intensity(&mut ctx, m, slot, 1.5);

        let node = registry.get(m).unwrap().node();
        let material = ctx.scene.get(node).unwrap().as_mesh().unwrap().material.clone();
        assert!(material.map.is_none());
        assert!(material.normal_map.is_some());
        assert_eq!(material.normal_scale, 1.5);
        let rows = &registry.panels().textures;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, TextureKind::Normal);
    }

    #[test]
    fn textures_never_attach_to_lights_or_removed_entries() {
        let mut ctx = context();
        let mut registry = ObjectRegistry::new();
        let light = add_light(&mut registry, &mut ctx, LightKind::Point);
        assert!(registry.attach_texture(&mut ctx, light, texture("a.png")).is_none());

        let m = add_shape(&mut registry, &mut ctx, PrimitiveShape::Box, Vec3::ZERO);
        registry.attach_texture(&mut ctx, m, texture("b.png"));
        registry.remove(&mut ctx, m);
        assert!(ctx.textures.is_empty());
        assert!(registry.attach_texture(&mut ctx, m, texture("c.png")).is_none());
        assert!(ctx.textures.is_empty());
    }

    #[test]
    fn scale_edits_refused_for_lights_and_non_positive_values() {
        let mut ctx = context();
        let mut registry = ObjectRegistry::new();
        let m = add_shape(&mut registry, &mut ctx, PrimitiveShape::Box, Vec3::ZERO);
        let light = add_light(&mut registry, &mut ctx, LightKind::Point);

        assert!(registry.set_transform(&mut ctx, m, TransformEdit::Scale(Axis::X, 2.0)));
        assert!(!registry.set_transform(&mut ctx, m, TransformEdit::Scale(Axis::Y, 0.0)));
        assert!(!registry.set_transform(&mut ctx, m, TransformEdit::Position(Axis::Y, f32::NAN)));
        assert!(!registry.set_transform(&mut ctx, light, TransformEdit::Scale(Axis::X, 2.0)));
        assert!(registry.set_transform(&mut ctx, light, TransformEdit::Position(Axis::Y, 7.0)));

        let node = ctx.scene.get(registry.get(m).unwrap().node()).unwrap();
        assert_eq!(node.transform.scale, Vec3::new(2.0, 1.0, 1.0));
        let light_node = ctx.scene.get(registry.get(light).unwrap().node()).unwrap();
        assert_eq!(light_node.transform.scale, Vec3::ONE);
        assert_eq!(light_node.transform.position.y, 7.0);
    }

    #[test]
    fn rotation_edits_are_degrees_and_sync_back() {
        let mut ctx = context();
        let mut registry = ObjectRegistry::new();
        let m = add_shape(&mut registry, &mut ctx, PrimitiveShape::Box, Vec3::ZERO);
        registry.select(&mut ctx, Some(m));
        registry.set_transform(&mut ctx, m, TransformEdit::RotationDeg(Axis::Y, 90.0));
        let node = ctx.scene.get(registry.get(m).unwrap().node()).unwrap();
        assert!((node.transform.rotation.y - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!((registry.panels().properties.rotation_deg[1] - 90.0).abs() < 1e-4);
    }

    #[test]
    fn geometry_swap_keeps_transform_and_material() {
        let mut ctx = context();
        let mut registry = ObjectRegistry::new();
        let m = add_shape(&mut registry, &mut ctx, PrimitiveShape::Box, Vec3::new(1.0, 2.0, 3.0));
        let params = MaterialParams {
            color: [1.0, 0.0, 0.0],
            metalness: 0.4,
            roughness: 0.6,
            wireframe: true,
        };
        registry.set_material_params(&mut ctx, m, params);
        registry.set_geometry(&mut ctx, m, PrimitiveShape::Cylinder);

        let node = ctx.scene.get(registry.get(m).unwrap().node()).unwrap();
        let mesh = node.as_mesh().unwrap();
        assert_eq!(mesh.geometry, Geometry::Primitive(PrimitiveShape::Cylinder));
        assert_eq!(node.transform.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.material.color, [1.0, 0.0, 0.0]);
        assert!(mesh.material.wireframe);
        assert_eq!(registry.get(m).unwrap().mesh().unwrap().shape, Some(PrimitiveShape::Cylinder));
    }

    #[test]
    fn material_params_are_clamped() {
        let mut ctx = context();
        let mut registry = ObjectRegistry::new();
        let m = add_shape(&mut registry, &mut ctx, PrimitiveShape::Box, Vec3::ZERO);
        registry.set_material_params(
            &mut ctx,
            m,
            MaterialParams {
                color: [2.0, -1.0, 0.5],
                metalness: 3.0,
                roughness: -2.0,
                wireframe: false,
            },
        );
        let base = registry.get(m).unwrap().mesh().unwrap().base;
        assert_eq!(base.color, [1.0, 0.0, 0.5]);
        assert_eq!((base.metalness, base.roughness), (1.0, 0.0));
    }

    #[test]
    fn shadows_reach_models_ground_and_lights() {
        let mut ctx = context();
        let mut registry = ObjectRegistry::new();
        add_shape(&mut registry, &mut ctx, PrimitiveShape::Box, Vec3::ZERO);
        let light = add_light(&mut registry, &mut ctx, LightKind::Directional);
        let model = parse_gltf_slice(TEST_GLTF.as_bytes(), "truck".into(), "truck.gltf").unwrap();
        let root = instantiate(&mut ctx.scene, &model);
        registry.add(&mut ctx, root, Some("truck".into()), EntryKind::Model);

        registry.set_shadows(&mut ctx, false);
        assert!(!ctx.settings.shadows);
        for entry in registry.entries() {
            for node in ctx.scene.descendants(entry.node()) {
                let node = ctx.scene.get(node).unwrap();
                if let Some(mesh) = node.as_mesh() {
                    assert!(!mesh.cast_shadow && !mesh.receive_shadow);
                }
            }
        }
        let light_node = registry.get(light).unwrap().node();
        assert!(!ctx.scene.get(light_node).unwrap().as_light().unwrap().cast_shadow);
        let ground = ctx.scene.get(ctx.fixtures.ground).unwrap();
        assert!(!ground.as_mesh().unwrap().receive_shadow);
    }

    #[test]
    fn light_params_are_applied_and_bounded() {
        let mut ctx = context();
        let mut registry = ObjectRegistry::new();
        let spot = add_light(&mut registry, &mut ctx, LightKind::Spot);
        registry.set_light_params(
            &mut ctx,
            spot,
            LightParams {
                color: [1.0, 0.5, 0.0],
                intensity: -3.0,
                cast_shadow: true,
                distance: 12.0,
                angle_deg: 120.0,
                penumbra: 0.3,
            },
        );
        let node = ctx.scene.get(registry.get(spot).unwrap().node()).unwrap();
        let light = node.as_light().unwrap();
        assert_eq!(light.intensity, 0.0);
        assert_eq!(light.distance, 12.0);
        assert!((light.angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(light.color, [1.0, 0.5, 0.0]);
    }

    #[test]
    fn rename_updates_rows_and_status() {
        let mut ctx = context();
        let mut registry = ObjectRegistry::new();
        let m = add_shape(&mut registry, &mut ctx, PrimitiveShape::Box, Vec3::ZERO);
        registry.select(&mut ctx, Some(m));
        registry.rename(&mut ctx, m, "  Crate ");
        registry.rename(&mut ctx, m, "   ");
        assert_eq!(registry.get(m).unwrap().name(), "Crate");
        assert_eq!(registry.panels().object_row(m).unwrap().name, "Crate");
        assert_eq!(ctx.status.selection(), "Selected: Crate");
    }
}
