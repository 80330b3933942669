use super::camera::{CameraRig, Viewport};
use crate::engine::{Axis, NodeId, SceneGraph};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Handle length as a fraction of the camera distance, so the gizmo keeps a
/// roughly constant on-screen size.
const HANDLE_SCREEN_FRACTION: f32 = 0.15;
const PICK_TOLERANCE_PX: f32 = 8.0;
const ROTATE_RADIANS_PER_PX: f32 = 0.01;
const MIN_SCALE: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GizmoMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

impl GizmoMode {
    pub const ALL: [GizmoMode; 3] = [GizmoMode::Translate, GizmoMode::Rotate, GizmoMode::Scale];

    pub fn label(self) -> &'static str {
        match self {
            GizmoMode::Translate => "Move",
            GizmoMode::Rotate => "Rotate",
            GizmoMode::Scale => "Scale",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoEvent {
    DraggingChanged(bool),
}

/// Screen-space description of the attached gizmo for overlay drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GizmoOverlay {
    pub mode: GizmoMode,
    pub origin: Vec3,
    pub handles: [(Axis, Vec3); 3],
    pub active: Option<Axis>,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    axis: Axis,
}

/// Translate/rotate/scale handles bound to at most one node.
#[derive(Debug, Clone)]
pub struct TransformGizmo {
    mode: GizmoMode,
    enabled: bool,
    size: f32,
    attached: Option<NodeId>,
    drag: Option<Drag>,
    events: Vec<GizmoEvent>,
}

impl TransformGizmo {
    pub fn new(size: f32) -> Self {
        Self {
            mode: GizmoMode::Translate,
            enabled: true,
            size: size.max(0.1),
            attached: None,
            drag: None,
            events: Vec::new(),
        }
    }

    pub fn attach(&mut self, node: NodeId) {
        if self.attached != Some(node) {
            self.end_drag();
        }
        self.attached = Some(node);
    }

    pub fn detach(&mut self) {
        self.end_drag();
        self.attached = None;
    }

    pub fn attached(&self) -> Option<NodeId> {
        self.attached
    }

    pub fn mode(&self) -> GizmoMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: GizmoMode) {
        self.mode = mode;
    }

    /// Transform mode on/off. Turning it off also detaches.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.detach();
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn take_events(&mut self) -> Vec<GizmoEvent> {
        std::mem::take(&mut self.events)
    }

    fn handle_length(&self, origin: Vec3, rig: &CameraRig) -> f32 {
        origin.distance(rig.position).max(0.1) * HANDLE_SCREEN_FRACTION * self.size
    }

    pub fn overlay(&self, scene: &SceneGraph, rig: &CameraRig) -> Option<GizmoOverlay> {
        let node = self.attached.filter(|node| scene.contains(*node))?;
        let origin = scene.world_matrix(node).transform_point3(Vec3::ZERO);
        let length = self.handle_length(origin, rig);
        Some(GizmoOverlay {
            mode: self.mode,
            origin,
            handles: Axis::ALL.map(|axis| (axis, origin + axis.unit() * length)),
            active: self.drag.map(|drag| drag.axis),
        })
    }

    /// Axis handle under a viewport pixel, if any.
    pub fn pick_handle(
        &self,
        scene: &SceneGraph,
        rig: &CameraRig,
        viewport: Viewport,
        point: Vec2,
    ) -> Option<Axis> {
        let overlay = self.overlay(scene, rig)?;
        let origin = rig.world_to_screen(overlay.origin, viewport)?;
        overlay
            .handles
            .iter()
            .filter_map(|(axis, end)| {
                let end = rig.world_to_screen(*end, viewport)?;
                Some((*axis, distance_to_segment(point, origin, end)))
            })
            .filter(|(_, distance)| *distance <= PICK_TOLERANCE_PX)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(axis, _)| axis)
    }

    /// Starts dragging `axis`. Ignored while disabled or detached.
    pub fn begin_drag(&mut self, axis: Axis) -> bool {
        if !self.enabled || self.attached.is_none() || self.drag.is_some() {
            return false;
        }
        self.drag = Some(Drag { axis });
        self.events.push(GizmoEvent::DraggingChanged(true));
        true
    }

    pub fn end_drag(&mut self) {
        if self.drag.take().is_some() {
            self.events.push(GizmoEvent::DraggingChanged(false));
        }
    }

    /// Applies a pointer delta to the attached node. Returns whether the
    /// node transform changed.
    pub fn drag(
        &mut self,
        scene: &mut SceneGraph,
        rig: &CameraRig,
        viewport: Viewport,
        delta_px: Vec2,
    ) -> bool {
        let (Some(drag), Some(node)) = (self.drag, self.attached) else {
            return false;
        };
        let Some(overlay) = self.overlay(scene, rig) else {
            return false;
        };
        let (Some(origin), Some(end)) = (
            rig.world_to_screen(overlay.origin, viewport),
            rig.world_to_screen(overlay.handles[drag.axis.index()].1, viewport),
        ) else {
            return false;
        };
        let screen_axis = end - origin;
        let screen_len = screen_axis.length();
        if screen_len < 1e-3 {
            return false;
        }
        let along = delta_px.dot(screen_axis / screen_len) / screen_len;
        let world_len = overlay.origin.distance(overlay.handles[0].1);

        let Some(target) = scene.get_mut(node) else {
            return false;
        };
        let transform = &mut target.transform;
        let index = drag.axis.index();
        match self.mode {
            GizmoMode::Translate => transform.position += drag.axis.unit() * along * world_len,
            GizmoMode::Rotate => {
                transform.rotation[index] += (delta_px.x - delta_px.y) * ROTATE_RADIANS_PER_PX
            }
            GizmoMode::Scale => {
                transform.scale[index] = (transform.scale[index] * (1.0 + along)).max(MIN_SCALE)
            }
        }
        true
    }
}

fn distance_to_segment(point: Vec2, start: Vec2, end: Vec2) -> f32 {
    let segment = end - start;
    let len_sq = segment.length_squared();
    if len_sq <= f32::EPSILON {
        return point.distance(start);
    }
    let t = ((point - start).dot(segment) / len_sq).clamp(0.0, 1.0);
    point.distance(start + segment * t)
}
