mod camera;
mod gizmo;
pub mod overlay;
pub mod pick;
mod wgpu_presenter;

pub use camera::{CameraKind, CameraParams, CameraReadout, CameraRig, OrbitController, Viewport};
pub use gizmo::{GizmoEvent, GizmoMode, GizmoOverlay, TransformGizmo};
pub use pick::{PickHit, PickSystem};
pub use wgpu_presenter::WgpuPresenter;

use crate::engine::{Geometry, LightNode, NodeId, SceneGraph, StandardMaterial};
use glam::{Mat4, Vec3};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create window surface: {0}")]
    SurfaceCreation(String),
    #[error("no graphics adapter can present to the window")]
    AdapterNotFound,
    #[error("failed to create graphics device: {0}")]
    DeviceCreation(String),
    #[error("surface has no usable texture format")]
    NoSurfaceFormat,
    #[error("failed to acquire frame: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub node: NodeId,
    pub world: Mat4,
    pub geometry: Geometry,
    pub material: StandardMaterial,
    pub helper: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightItem {
    pub node: NodeId,
    pub position: Vec3,
    pub light: LightNode,
}

/// Scene-wide values the rasterizer needs besides the draw list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameEnvironment {
    pub background: [f32; 3],
    pub ambient_intensity: f32,
    /// Exponential fog density when fog is on.
    pub fog_density: Option<f32>,
    pub shadows: bool,
    pub environment_intensity: Option<f32>,
}

/// Everything one frame draws. Built from node state only.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera: CameraReadout,
    pub environment: FrameEnvironment,
    pub items: Vec<DrawItem>,
    pub lights: Vec<LightItem>,
    pub gizmo: Option<GizmoOverlay>,
    pub ui: Vec<egui::ClippedPrimitive>,
    pub ui_textures: egui::TexturesDelta,
    pub pixels_per_point: f32,
    pub screen_size_px: [u32; 2],
}

impl FrameSnapshot {
    pub fn capture(
        scene: &SceneGraph,
        rig: &CameraRig,
        gizmo: &TransformGizmo,
        environment: FrameEnvironment,
    ) -> Self {
        let selected = gizmo.attached();
        let mut items = Vec::new();
        let mut lights = Vec::new();
        for (id, node) in scene.iter() {
            if !scene.is_effectively_visible(id) {
                continue;
            }
            let world = scene.world_matrix(id);
            if let Some(mesh) = node.as_mesh() {
                items.push(DrawItem {
                    node: id,
                    world,
                    geometry: mesh.geometry.clone(),
                    material: mesh.material.clone(),
                    helper: node.layer == crate::engine::Layer::Helper,
                    cast_shadow: mesh.cast_shadow,
                    receive_shadow: mesh.receive_shadow,
                    selected: selected
                        .map_or(false, |sel| sel == id || scene.ancestors(id).contains(&sel)),
                });
            } else if let Some(light) = node.as_light() {
                lights.push(LightItem {
                    node: id,
                    position: world.transform_point3(Vec3::ZERO),
                    light: light.clone(),
                });
            }
        }
        Self {
            view: rig.view_matrix(),
            projection: rig.projection_matrix(),
            camera: rig.readout(),
            environment,
            items,
            lights,
            gizmo: gizmo.overlay(scene, rig),
            ui: Vec::new(),
            ui_textures: egui::TexturesDelta::default(),
            pixels_per_point: 1.0,
            screen_size_px: [1, 1],
        }
    }
}

/// Window presentation seam. The editor hands it one snapshot per frame.
pub trait Presenter {
    fn present(&mut self, frame: &FrameSnapshot) -> Result<(), RenderError>;

    /// Window size in physical pixels.
    fn resize(&mut self, _size_px: [u32; 2]) {}
}

/// Presenter that only counts what it was given.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct LogPresenter {
    frames: u64,
    last_counts: (usize, usize),
}

#[cfg(test)]
impl LogPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
impl Presenter for LogPresenter {
    fn present(&mut self, frame: &FrameSnapshot) -> Result<(), RenderError> {
        self.frames += 1;
        let counts = (frame.items.len(), frame.lights.len());
        if counts != self.last_counts {
            log::debug!(
                "Presenting {} draw items, {} lights, {} ui primitives",
                counts.0,
                counts.1,
                frame.ui.len()
            );
            self.last_counts = counts;
        }
        Ok(())
    }

    fn resize(&mut self, size_px: [u32; 2]) {
        log::debug!("Window resized to {}x{}", size_px[0], size_px[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Layer, LightKind, Node, PrimitiveShape, Transform};

    fn environment() -> FrameEnvironment {
        FrameEnvironment {
            background: [0.0; 3],
            ambient_intensity: 0.5,
            fog_density: None,
            shadows: true,
            environment_intensity: None,
        }
    }

    #[test]
    fn snapshot_skips_hidden_and_flags_helpers() {
        let mut scene = SceneGraph::new();
        let visible = scene.add_to_root(Node::mesh(
            "Box",
            Geometry::Primitive(PrimitiveShape::Box),
            StandardMaterial::default(),
        ));
        let hidden = scene.add_to_root(Node::mesh(
            "Sphere",
            Geometry::Primitive(PrimitiveShape::Sphere),
            StandardMaterial::default(),
        ));
        scene.get_mut(hidden).unwrap().visible = false;
        scene.add_to_root(
            Node::mesh(
                "Ground",
                Geometry::Primitive(PrimitiveShape::Plane),
                StandardMaterial::default(),
            )
            .with_layer(Layer::Helper),
        );
        scene.add_to_root(
            Node::light("Point Light", LightNode::new(LightKind::Point))
                .with_transform(Transform::from_position(Vec3::new(0.0, 2.0, 0.0))),
        );

        let rig = CameraRig::new(CameraParams::default(), Viewport::new(640.0, 480.0));
        let mut gizmo = TransformGizmo::new(1.0);
        gizmo.attach(visible);
        let frame = FrameSnapshot::capture(&scene, &rig, &gizmo, environment());

        assert_eq!(frame.items.len(), 2);
        assert!(frame.items.iter().all(|item| item.node != hidden));
        assert_eq!(frame.items.iter().filter(|item| item.helper).count(), 1);
        assert!(frame.items.iter().any(|item| item.node == visible && item.selected));
        assert_eq!(frame.lights.len(), 1);
        assert_eq!(frame.lights[0].position, Vec3::new(0.0, 2.0, 0.0));
        assert!(frame.gizmo.is_some());

        let mut presenter = LogPresenter::new();
        presenter.present(&frame).unwrap();
        assert_eq!(presenter.frames(), 1);
    }
}
