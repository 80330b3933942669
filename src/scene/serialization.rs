use crate::context::EditorContext;
use crate::engine::{rgb_to_hex, Geometry, Layer, LightNode, NodeId, NodeKind};
use crate::render::CameraReadout;
use crate::scene::material::{TextureKind, TextureSlot};
use crate::scene::registry::{EntryId, EntryKind, ObjectRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SerializationError>;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub version: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub generator: String,
}

/// Scene-wide values that are not part of any node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsData {
    pub background: String,
    pub ambient_intensity: f32,
    pub fog_density: Option<f32>,
    pub shadows: bool,
    pub environment: Option<EnvironmentData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentData {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub intensity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureData {
    pub name: String,
    pub kind: TextureKind,
    pub intensity: f32,
    pub opacity: f32,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialData {
    pub color: String,
    pub metalness: f32,
    pub roughness: f32,
    pub wireframe: bool,
    pub transparent: bool,
    pub opacity: f32,
    pub textures: Vec<TextureData>,
}

/// One scene-graph node with its subtree. Registered nodes carry the id of
/// their entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub name: String,
    pub entry: Option<EntryId>,
    pub helper: bool,
    pub visible: bool,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub geometry: Option<Geometry>,
    pub material: Option<MaterialData>,
    pub light: Option<LightNode>,
    pub children: Vec<NodeData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryData {
    pub id: EntryId,
    pub name: String,
    pub kind: EntryKind,
    pub visible: bool,
}

/// Export-only snapshot of the whole scene. Never read back by the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    pub metadata: Metadata,
    pub settings: SettingsData,
    pub camera: CameraReadout,
    pub entries: Vec<EntryData>,
    pub object: NodeData,
}

impl SceneDocument {
    pub fn capture(ctx: &EditorContext, registry: &ObjectRegistry) -> Self {
        let settings = &ctx.settings;
        Self {
            metadata: Metadata {
                version: FORMAT_VERSION,
                kind: "Object".to_string(),
                generator: format!("scenepad {}", env!("CARGO_PKG_VERSION")),
            },
            settings: SettingsData {
                background: hex_string(settings.background),
                ambient_intensity: settings.ambient_intensity,
                fog_density: settings.fog_enabled.then_some(settings.fog_density),
                shadows: settings.shadows,
                environment: ctx.environment.as_ref().map(|env| EnvironmentData {
                    name: env.name.clone(),
                    width: env.width,
                    height: env.height,
                    intensity: settings.environment_intensity,
                }),
            },
            camera: ctx.camera.readout(),
            entries: registry
                .entries()
                .iter()
                .map(|entry| EntryData {
                    id: entry.id(),
                    name: entry.name().to_string(),
                    kind: entry.kind(),
                    visible: entry.visible(),
                })
                .collect(),
            object: capture_node(ctx, registry, ctx.scene.root()),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn capture_node(ctx: &EditorContext, registry: &ObjectRegistry, id: NodeId) -> NodeData {
    let Some(node) = ctx.scene.get(id) else {
        return NodeData {
            name: String::new(),
            entry: None,
            helper: false,
            visible: false,
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
            cast_shadow: false,
            receive_shadow: false,
            geometry: None,
            material: None,
            light: None,
            children: Vec::new(),
        };
    };
    let entry = registry.entry_for_node(id);
    let slots = entry.map_or(&[][..], |entry| entry.textures());

    let (geometry, material, cast_shadow, receive_shadow, light) = match &node.kind {
        NodeKind::Mesh(mesh) => (
            Some(mesh.geometry.clone()),
            Some(MaterialData {
                color: hex_string(mesh.material.color),
                metalness: mesh.material.metalness,
                roughness: mesh.material.roughness,
                wireframe: mesh.material.wireframe,
                transparent: mesh.material.transparent,
                opacity: mesh.material.opacity,
                textures: slots.iter().map(texture_data).collect(),
            }),
            mesh.cast_shadow,
            mesh.receive_shadow,
            None,
        ),
        NodeKind::Light(light) => (None, None, light.cast_shadow, false, Some(light.clone())),
        NodeKind::Group => (None, None, false, false, None),
    };

    NodeData {
        name: node.name.clone(),
        entry: entry.map(|entry| entry.id()),
        helper: node.layer == Layer::Helper,
        visible: node.visible,
        position: node.transform.position.to_array(),
        rotation: node.transform.rotation.to_array(),
        scale: node.transform.scale.to_array(),
        cast_shadow,
        receive_shadow,
        geometry,
        material,
        light,
        children: node
            .children()
            .iter()
            .map(|child| capture_node(ctx, registry, *child))
            .collect(),
    }
}

fn texture_data(slot: &TextureSlot) -> TextureData {
    TextureData {
        name: slot.display_name.clone(),
        kind: slot.kind,
        intensity: slot.intensity,
        opacity: slot.opacity,
        sha256: slot.source_hash.clone(),
    }
}

fn hex_string(rgb: [f32; 3]) -> String {
    format!("#{:06x}", rgb_to_hex(rgb))
}

pub fn save_scene_to_file(scene: &SceneDocument, path: &Path) -> Result<()> {
    let json = scene.to_json()?;
    std::fs::write(path, json)?;
    log::info!("Exported scene to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::DecodedTexture;
    use crate::engine::PrimitiveShape;
    use crate::scene::registry::tests::{add_shape, context};
    use glam::Vec3;

    #[test]
    fn test_empty_scene_has_fixtures_only() {
        let ctx = context();
        let registry = ObjectRegistry::new();
        let doc = SceneDocument::capture(&ctx, &registry);
        assert!(doc.entries.is_empty());
        assert_eq!(doc.metadata.kind, "Object");
        assert_eq!(doc.object.children.len(), 2);
        assert!(doc.object.children.iter().all(|child| child.helper));
        assert_eq!(doc.settings.background, "#111111");
        assert_eq!(doc.settings.fog_density, None);
    }

    #[test]
    fn test_every_entry_is_exported() {
        let mut ctx = context();
        let mut registry = ObjectRegistry::new();
        let a = add_shape(&mut registry, &mut ctx, PrimitiveShape::Box, Vec3::new(1.0, 2.0, 3.0));
        let b = add_shape(&mut registry, &mut ctx, PrimitiveShape::Torus, Vec3::ZERO);
        registry.attach_texture(
            &mut ctx,
            b,
            DecodedTexture {
                name: "rust.png".to_string(),
                width: 1,
                height: 1,
                rgba: vec![0; 4],
                source_hash: "abc123".to_string(),
            },
        );

        let json = SceneDocument::capture(&ctx, &registry).to_json().unwrap();
        assert!(json.contains("\"Box 1\""));
        assert!(json.contains("\"Torus 2\""));
        assert!(json.contains("abc123"));
        assert!(!json.contains("\"idx\""));

        let loaded: SceneDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.entries.len(), 2);
        let node = loaded
            .object
            .children
            .iter()
            .find(|child| child.entry == Some(a))
            .unwrap();
        assert_eq!(node.position, [1.0, 2.0, 3.0]);
        assert_eq!(node.geometry, Some(Geometry::Primitive(PrimitiveShape::Box)));
    }

    #[test]
    fn test_save_writes_pretty_json() {
        let ctx = context();
        let registry = ObjectRegistry::new();
        let doc = SceneDocument::capture(&ctx, &registry);
        let path = std::env::temp_dir().join(format!("scenepad_export_{}.json", std::process::id()));
        save_scene_to_file(&doc, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n"));
        assert!(text.contains("\"generator\""));
        let _ = std::fs::remove_file(path);
    }
}
