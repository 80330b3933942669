//! Viewport wireframe drawn through the egui pass.
//!
//! Every draw item becomes the projected edges of its world bounds, the
//! grid fixture becomes its lines, lights become dots and the gizmo its
//! axis handles. Shapes are in viewport points.

use super::{FrameSnapshot, GizmoOverlay, Viewport};
use crate::engine::{Axis, Geometry};
use egui::{Color32, Pos2, Shape, Stroke};
use glam::{Mat4, Vec3};

const SELECTED_COLOR: Color32 = Color32::from_rgb(255, 170, 0);
const HELPER_COLOR: Color32 = Color32::from_gray(90);
const LIGHT_RADIUS: f32 = 5.0;

/// Corner index pairs of an [`crate::engine::Aabb`] that share an edge.
const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (2, 3),
    (4, 5),
    (6, 7),
    (0, 2),
    (1, 3),
    (4, 6),
    (5, 7),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

struct Projector {
    view_projection: Mat4,
    viewport: Viewport,
}

impl Projector {
    fn project(&self, point: Vec3) -> Option<Pos2> {
        let clip = self.view_projection * point.extend(1.0);
        if clip.w <= 1e-6 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Pos2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.width,
            (1.0 - ndc.y) * 0.5 * self.viewport.height,
        ))
    }

    /// Segments with an endpoint behind the eye are dropped whole.
    fn segment(&self, a: Vec3, b: Vec3, stroke: Stroke) -> Option<Shape> {
        Some(Shape::line_segment([self.project(a)?, self.project(b)?], stroke))
    }
}

fn color32(rgb: [f32; 3]) -> Color32 {
    let [r, g, b] = rgb.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    Color32::from_rgb(r, g, b)
}

fn axis_color(axis: Axis) -> Color32 {
    match axis {
        Axis::X => Color32::from_rgb(230, 60, 60),
        Axis::Y => Color32::from_rgb(80, 200, 80),
        Axis::Z => Color32::from_rgb(70, 120, 240),
    }
}

pub fn viewport_shapes(frame: &FrameSnapshot, viewport: Viewport) -> Vec<Shape> {
    let projector = Projector {
        view_projection: frame.projection * frame.view,
        viewport,
    };
    let mut shapes = Vec::new();

    for item in &frame.items {
        let stroke = if item.selected {
            Stroke::new(2.0, SELECTED_COLOR)
        } else if item.helper {
            Stroke::new(1.0, HELPER_COLOR)
        } else {
            Stroke::new(1.0, color32(item.material.color))
        };
        match item.geometry {
            Geometry::Grid { size, divisions } => {
                grid_lines(&projector, &item.world, size, divisions, stroke, &mut shapes)
            }
            _ => {
                let corners = item
                    .geometry
                    .local_bounds()
                    .corners()
                    .map(|corner| item.world.transform_point3(corner));
                shapes.extend(
                    BOX_EDGES
                        .iter()
                        .filter_map(|&(a, b)| projector.segment(corners[a], corners[b], stroke)),
                );
            }
        }
    }

    for light in &frame.lights {
        if let Some(center) = projector.project(light.position) {
            shapes.push(Shape::circle_filled(
                center,
                LIGHT_RADIUS,
                color32(light.light.color),
            ));
        }
    }

    if let Some(gizmo) = &frame.gizmo {
        gizmo_handles(&projector, gizmo, &mut shapes);
    }
    shapes
}

fn grid_lines(
    projector: &Projector,
    world: &Mat4,
    size: f32,
    divisions: u32,
    stroke: Stroke,
    shapes: &mut Vec<Shape>,
) {
    let divisions = divisions.max(1);
    let half = size * 0.5;
    let step = size / divisions as f32;
    for i in 0..=divisions {
        let offset = -half + step * i as f32;
        let lines = [
            (Vec3::new(offset, 0.0, -half), Vec3::new(offset, 0.0, half)),
            (Vec3::new(-half, 0.0, offset), Vec3::new(half, 0.0, offset)),
        ];
        for (a, b) in lines {
            let a = world.transform_point3(a);
            let b = world.transform_point3(b);
            shapes.extend(projector.segment(a, b, stroke));
        }
    }
}

fn gizmo_handles(projector: &Projector, gizmo: &GizmoOverlay, shapes: &mut Vec<Shape>) {
    for (axis, tip) in gizmo.handles {
        let width = if gizmo.active == Some(axis) { 4.0 } else { 2.0 };
        let stroke = Stroke::new(width, axis_color(axis));
        shapes.extend(projector.segment(gizmo.origin, tip, stroke));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{
        LightKind, LightNode, Node, PrimitiveShape, SceneGraph, StandardMaterial, Transform,
    };
    use crate::render::{CameraParams, CameraRig, FrameEnvironment, TransformGizmo};

    fn viewport() -> Viewport {
        Viewport::new(640.0, 480.0)
    }

    fn capture(scene: &SceneGraph, gizmo: &TransformGizmo) -> FrameSnapshot {
        let rig = CameraRig::new(CameraParams::default(), viewport());
        let environment = FrameEnvironment {
            background: [0.0; 3],
            ambient_intensity: 0.5,
            fog_density: None,
            shadows: false,
            environment_intensity: None,
        };
        FrameSnapshot::capture(scene, &rig, gizmo, environment)
    }

    fn add_box(scene: &mut SceneGraph, position: Vec3) -> crate::engine::NodeId {
        scene.add_to_root(
            Node::mesh(
                "Box",
                Geometry::Primitive(PrimitiveShape::Box),
                StandardMaterial::with_color([0.0, 0.0, 1.0]),
            )
            .with_transform(Transform::from_position(position)),
        )
    }

    fn segment_colors(shapes: &[Shape]) -> Vec<Color32> {
        shapes
            .iter()
            .filter_map(|shape| match shape {
                Shape::LineSegment { stroke, .. } => Some(stroke.color),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn box_in_view_draws_twelve_edges_in_material_color() {
        let mut scene = SceneGraph::new();
        add_box(&mut scene, Vec3::ZERO);
        let frame = capture(&scene, &TransformGizmo::new(1.0));

        let colors = segment_colors(&viewport_shapes(&frame, viewport()));
        assert_eq!(colors.len(), 12);
        assert!(colors.iter().all(|color| *color == Color32::from_rgb(0, 0, 255)));
    }

    #[test]
    fn selected_item_uses_highlight_and_gizmo_handles() {
        let mut scene = SceneGraph::new();
        let node = add_box(&mut scene, Vec3::ZERO);
        let mut gizmo = TransformGizmo::new(1.0);
        gizmo.attach(node);
        let frame = capture(&scene, &gizmo);

        let colors = segment_colors(&viewport_shapes(&frame, viewport()));
        assert_eq!(colors.iter().filter(|c| **c == SELECTED_COLOR).count(), 12);
        for axis in Axis::ALL {
            assert!(colors.contains(&axis_color(axis)));
        }
    }

    #[test]
    fn items_behind_the_eye_are_skipped() {
        let mut scene = SceneGraph::new();
        add_box(&mut scene, Vec3::new(0.0, 2.0, 20.0));
        let frame = capture(&scene, &TransformGizmo::new(1.0));

        assert!(viewport_shapes(&frame, viewport()).is_empty());
    }

    #[test]
    fn lights_are_dots_and_grid_draws_both_directions() {
        let mut scene = SceneGraph::new();
        scene.add_to_root(
            Node::light("Point Light", LightNode::new(LightKind::Point))
                .with_transform(Transform::from_position(Vec3::new(0.0, 1.0, 0.0))),
        );
        scene.add_to_root(Node::mesh(
            "Grid",
            Geometry::Grid {
                size: 2.0,
                divisions: 2,
            },
            StandardMaterial::default(),
        ));
        let frame = capture(&scene, &TransformGizmo::new(1.0));

        let shapes = viewport_shapes(&frame, viewport());
        let circles = shapes
            .iter()
            .filter(|shape| matches!(shape, Shape::Circle(_)))
            .count();
        assert_eq!(circles, 1);
        assert_eq!(segment_colors(&shapes).len(), 6);
    }

    #[test]
    fn color_channels_clamp_to_bytes() {
        assert_eq!(color32([1.5, 0.5, -1.0]), Color32::from_rgb(255, 128, 0));
    }
}
