//! glTF import.
//!
//! Only the document is parsed: node hierarchy, transforms, primitive bounds
//! from the POSITION accessor min/max, and base PBR factors. Vertex buffers
//! stay with the file since the editor never rasterizes them itself.

use super::AssetError;
use crate::engine::{
    hex_to_rgb, Aabb, Geometry, NodeId, Node, NodeKind, SceneGraph, StandardMaterial, Transform,
};
use glam::{Quat, Vec3};
use std::path::Path;

/// Largest dimension an imported model is scaled down to.
pub const MODEL_MAX_DIMENSION: f32 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelMesh {
    pub bounds: Aabb,
    pub primitive_count: usize,
    pub material: StandardMaterial,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelNode {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<ModelMesh>,
    pub children: Vec<ModelNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportedModel {
    pub name: String,
    pub roots: Vec<ModelNode>,
}

impl ImportedModel {
    pub fn mesh_count(&self) -> usize {
        fn count(node: &ModelNode) -> usize {
            usize::from(node.mesh.is_some()) + node.children.iter().map(count).sum::<usize>()
        }
        self.roots.iter().map(count).sum()
    }
}

pub fn parse_gltf_file(path: &Path) -> Result<ImportedModel, AssetError> {
    let bytes = super::read_bytes(path)?;
    parse_gltf_slice(&bytes, super::file_stem(path, "Model"), &path.display().to_string())
}

pub fn parse_gltf_slice(bytes: &[u8], name: String, origin: &str) -> Result<ImportedModel, AssetError> {
    let gltf = gltf::Gltf::from_slice(bytes).map_err(|source| AssetError::ParseGltf {
        path: origin.to_string(),
        source,
    })?;
    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .ok_or_else(|| AssetError::EmptyModel {
            path: origin.to_string(),
        })?;
    let roots: Vec<ModelNode> = scene.nodes().map(|node| convert_node(&node)).collect();
    if roots.is_empty() {
        return Err(AssetError::EmptyModel {
            path: origin.to_string(),
        });
    }
    Ok(ImportedModel { name, roots })
}

fn convert_node(node: &gltf::Node) -> ModelNode {
    let (translation, rotation, scale) = node.transform().decomposed();
    let mut transform = Transform {
        position: Vec3::from_array(translation),
        scale: Vec3::from_array(scale),
        ..Transform::default()
    };
    transform.set_from_quat(Quat::from_array(rotation));

    ModelNode {
        name: node
            .name()
            .map(String::from)
            .unwrap_or_else(|| format!("Node {}", node.index())),
        transform,
        mesh: node.mesh().map(|mesh| convert_mesh(&mesh)),
        children: node.children().map(|child| convert_node(&child)).collect(),
    }
}

fn convert_mesh(mesh: &gltf::Mesh) -> ModelMesh {
    let mut bounds = Aabb::empty();
    let mut material = None;
    let mut primitive_count = 0;
    for primitive in mesh.primitives() {
        primitive_count += 1;
        if let Some(accessor) = primitive.get(&gltf::Semantic::Positions) {
            if let (Some(min), Some(max)) = (
                accessor.min().as_ref().and_then(json_vec3),
                accessor.max().as_ref().and_then(json_vec3),
            ) {
                bounds = bounds.union(&Aabb::new(min, max));
            }
        }
        if material.is_none() {
            material = Some(convert_material(&primitive.material()));
        }
    }
    if bounds.is_empty() {
        bounds = Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5));
    }
    ModelMesh {
        bounds,
        primitive_count,
        material: material.unwrap_or_else(|| StandardMaterial::with_color(hex_to_rgb(0xcccccc))),
    }
}

fn convert_material(material: &gltf::Material) -> StandardMaterial {
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, a] = pbr.base_color_factor();
    let mut out = StandardMaterial::with_color([r, g, b]);
    out.metalness = pbr.metallic_factor();
    out.roughness = pbr.roughness_factor();
    out.emissive = material.emissive_factor();
    if a < 1.0 {
        out.transparent = true;
        out.opacity = a;
    }
    out
}

fn json_vec3(value: &gltf::json::Value) -> Option<Vec3> {
    let values = value.as_array()?;
    if values.len() < 3 {
        return None;
    }
    let component = |index: usize| values[index].as_f64().map(|v| v as f32);
    Some(Vec3::new(component(0)?, component(1)?, component(2)?))
}

/// Adds `model` under the scene root as one group. The group is moved so the
/// model's bounding box is centered on the origin and uniformly scaled down
/// when its largest dimension exceeds [`MODEL_MAX_DIMENSION`]. Every mesh
/// casts and receives shadows.
pub fn instantiate(scene: &mut SceneGraph, model: &ImportedModel) -> NodeId {
    let root = scene.add_to_root(Node::group(model.name.clone()));
    for node in &model.roots {
        spawn(scene, root, node);
    }

    let bounds = scene.world_bounds(root);
    if !bounds.is_empty() {
        let center = bounds.center();
        let max_dim = bounds.size().max_element();
        let scale = if max_dim > MODEL_MAX_DIMENSION {
            MODEL_MAX_DIMENSION / max_dim
        } else {
            1.0
        };
        if let Some(group) = scene.get_mut(root) {
            group.transform.scale = Vec3::splat(scale);
            group.transform.position = -center * scale;
        }
    }
    root
}

fn spawn(scene: &mut SceneGraph, parent: NodeId, source: &ModelNode) {
    let mut node = match &source.mesh {
        Some(mesh) => Node::mesh(
            source.name.clone(),
            Geometry::Imported {
                bounds: mesh.bounds,
                primitive_count: mesh.primitive_count,
            },
            mesh.material.clone(),
        ),
        None => Node::group(source.name.clone()),
    };
    node.transform = source.transform;
    if let NodeKind::Mesh(mesh) = &mut node.kind {
        mesh.cast_shadow = true;
        mesh.receive_shadow = true;
    }
    let id = scene.add_child(parent, node);
    for child in &source.children {
        spawn(scene, id, child);
    }
}

#[cfg(test)]
pub(crate) const TEST_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [{ "nodes": [0] }],
  "nodes": [
    { "name": "Body", "mesh": 0, "translation": [10.0, 0.0, 0.0], "children": [1] },
    { "name": "Wheel", "mesh": 0, "translation": [0.0, 4.0, 0.0] }
  ],
  "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 }, "material": 0 }] }],
  "materials": [{ "pbrMetallicRoughness": { "baseColorFactor": [1.0, 0.0, 0.0, 1.0], "metallicFactor": 0.25 } }],
  "accessors": [{
    "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
    "min": [-1.0, -1.0, -1.0], "max": [1.0, 1.0, 1.0]
  }],
  "bufferViews": [{ "buffer": 0, "byteLength": 36 }],
  "buffers": [{ "byteLength": 36, "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA" }]
}"#;
