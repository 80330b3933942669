//! CPU pick pass.
//!
//! A click is queued with [`PickSystem::request_pick`] and resolved once per
//! frame after input handling. Gizmo handles are tested in screen space
//! before the scene, so clicking a handle never changes the selection.

use super::camera::{CameraRig, Viewport};
use super::gizmo::TransformGizmo;
use crate::engine::{Axis, Layer, RayHit, SceneGraph};
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickHit {
    GizmoAxis(Axis),
    Scene(RayHit),
    None,
}

#[derive(Debug, Default)]
pub struct PickSystem {
    pending: Option<Vec2>,
}

impl PickSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later requests in the same frame replace earlier ones.
    pub fn request_pick(&mut self, point: Vec2) {
        self.pending = Some(point);
    }

    pub fn take_request(&mut self) -> Option<Vec2> {
        self.pending.take()
    }
}

/// Scene-layer hits under a viewport pixel, nearest first.
pub fn scene_hits(
    scene: &SceneGraph,
    rig: &CameraRig,
    viewport: Viewport,
    point: Vec2,
) -> Vec<RayHit> {
    let ray = rig.screen_ray(point, viewport);
    scene.raycast(&ray, |_, node| node.layer == Layer::Scene)
}

pub fn resolve(
    scene: &SceneGraph,
    rig: &CameraRig,
    viewport: Viewport,
    gizmo: &TransformGizmo,
    point: Vec2,
) -> PickHit {
    if let Some(axis) = gizmo.pick_handle(scene, rig, viewport, point) {
        return PickHit::GizmoAxis(axis);
    }
    scene_hits(scene, rig, viewport, point)
        .first()
        .copied()
        .map_or(PickHit::None, PickHit::Scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Geometry, Node, PrimitiveShape, StandardMaterial};
    use crate::render::camera::CameraParams;
    use glam::Vec3;

    #[test]
    fn latest_request_wins() {
        let mut picks = PickSystem::new();
        picks.request_pick(Vec2::new(1.0, 1.0));
        picks.request_pick(Vec2::new(2.0, 3.0));
        assert_eq!(picks.take_request(), Some(Vec2::new(2.0, 3.0)));
        assert_eq!(picks.take_request(), None);
    }

    #[test]
    fn gizmo_handle_takes_priority_over_mesh() {
        let mut scene = SceneGraph::new();
        let node = scene.add_to_root(Node::mesh(
            "Box",
            Geometry::Primitive(PrimitiveShape::Box),
            StandardMaterial::default(),
        ));
        let viewport = Viewport::new(800.0, 600.0);
        let mut rig = CameraRig::new(CameraParams::default(), viewport);
        rig.position = Vec3::new(0.0, 0.0, 10.0);
        let center = Vec2::new(400.0, 300.0);

        let mut gizmo = TransformGizmo::new(1.0);
        assert!(matches!(
            resolve(&scene, &rig, viewport, &gizmo, center),
            PickHit::Scene(hit) if hit.node == node
        ));

        gizmo.attach(node);
        let overlay = gizmo.overlay(&scene, &rig).unwrap();
        let on_handle = rig
            .world_to_screen(overlay.origin.lerp(overlay.handles[1].1, 0.6), viewport)
            .unwrap();
        assert_eq!(
            resolve(&scene, &rig, viewport, &gizmo, on_handle),
            PickHit::GizmoAxis(Axis::Y)
        );
        assert_eq!(resolve(&scene, &rig, viewport, &gizmo, Vec2::new(2.0, 2.0)), PickHit::None);
    }
}
