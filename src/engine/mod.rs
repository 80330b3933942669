//! Retained scene graph consumed by the editor.
//!
//! Nodes live in an arena keyed by [`NodeId`] and form a tree under a single
//! root. The graph knows nothing about editor entries: it stores transforms,
//! visibility, layers and payloads, and answers transform and ray queries.

pub mod geometry;
pub mod light;
pub mod material;
pub mod node;

pub use geometry::{Aabb, Geometry, PrimitiveShape, Ray};
pub use light::{LightKind, LightNode};
pub use material::{hex_to_rgb, rgb_to_hex, StandardMaterial};
pub use node::{Axis, Layer, MeshNode, Node, NodeKind, Transform};

use glam::Mat4;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    pub struct NodeId;
    pub struct TextureHandle;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub node: NodeId,
    pub distance: f32,
    pub point: glam::Vec3,
}

pub struct SceneGraph {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::group("Scene"));
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn add_to_root(&mut self, node: Node) -> NodeId {
        let root = self.root;
        self.add_child(root, node)
    }

    /// Inserts `node` under `parent`. Falls back to the root when the parent
    /// no longer exists.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let parent = if self.nodes.contains_key(parent) {
            parent
        } else {
            self.root
        };
        node.parent = Some(parent);
        node.children.clear();
        let id = self.nodes.insert(node);
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(id);
        }
        id
    }

    /// Removes `id` and all of its descendants. The root cannot be removed.
    /// Returns how many nodes were dropped.
    pub fn remove_subtree(&mut self, id: NodeId) -> usize {
        if id == self.root || !self.nodes.contains_key(id) {
            return 0;
        }
        if let Some(parent) = self.nodes.get(id).and_then(|node| node.parent) {
            if let Some(parent_node) = self.nodes.get_mut(parent) {
                parent_node.children.retain(|child| *child != id);
            }
        }
        let doomed = self.descendants(id);
        for node in &doomed {
            self.nodes.remove(*node);
        }
        doomed.len()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    /// Parents of `id`, nearest first, ending with the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            out.push(node);
            current = self.parent(node);
        }
        out
    }

    /// `id` followed by every node below it, depth first.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Visible only when the node and every ancestor are visible.
    pub fn is_effectively_visible(&self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        node.visible
            && self
                .ancestors(id)
                .iter()
                .all(|ancestor| self.nodes.get(*ancestor).map_or(false, |n| n.visible))
    }

    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let Some(node) = self.nodes.get(id) else {
            return Mat4::IDENTITY;
        };
        let mut matrix = node.transform.matrix();
        let mut current = node.parent;
        while let Some(parent) = current {
            let Some(parent_node) = self.nodes.get(parent) else {
                break;
            };
            matrix = parent_node.transform.matrix() * matrix;
            current = parent_node.parent;
        }
        matrix
    }

    /// World-space bounds of every mesh in the subtree rooted at `id`.
    pub fn world_bounds(&self, id: NodeId) -> Aabb {
        let mut bounds = Aabb::empty();
        for node_id in self.descendants(id) {
            if let Some(mesh) = self.nodes.get(node_id).and_then(Node::as_mesh) {
                let local = mesh.geometry.local_bounds();
                bounds = bounds.union(&local.transformed(&self.world_matrix(node_id)));
            }
        }
        bounds
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }

    /// Intersects every visible scene-layer mesh accepted by `filter`.
    /// Hits are sorted nearest first.
    pub fn raycast<F>(&self, ray: &Ray, filter: F) -> Vec<RayHit>
    where
        F: Fn(NodeId, &Node) -> bool,
    {
        let mut hits = Vec::new();
        for (id, node) in self.nodes.iter() {
            let Some(mesh) = node.as_mesh() else {
                continue;
            };
            if node.layer != Layer::Scene || !filter(id, node) || !self.is_effectively_visible(id) {
                continue;
            }
            let world = self.world_matrix(id);
            if world.determinant().abs() < 1e-12 {
                continue;
            }
            let local_ray = ray.transformed(&world.inverse());
            if let Some(t) = mesh.geometry.intersect_local(&local_ray) {
                let point = ray.at(t);
                hits.push(RayHit {
                    node: id,
                    distance: (point - ray.origin).length(),
                    point,
                });
            }
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn cube_at(scene: &mut SceneGraph, parent: NodeId, position: Vec3) -> NodeId {
        let node = Node::mesh(
            "Box",
            Geometry::Primitive(PrimitiveShape::Box),
            StandardMaterial::default(),
        )
        .with_transform(Transform::from_position(position));
        scene.add_child(parent, node)
    }

    #[test]
    fn remove_subtree_drops_children_and_unlinks_parent() {
        let mut scene = SceneGraph::new();
        let group = scene.add_to_root(Node::group("Model"));
        let child = cube_at(&mut scene, group, Vec3::ZERO);
        let grandchild = cube_at(&mut scene, child, Vec3::X);

        assert_eq!(scene.remove_subtree(group), 3);
        assert!(!scene.contains(child));
        assert!(!scene.contains(grandchild));
        assert!(scene.get(scene.root()).unwrap().children().is_empty());
        assert_eq!(scene.remove_subtree(scene.root()), 0);
    }

    #[test]
    fn world_matrix_composes_parents() {
        let mut scene = SceneGraph::new();
        let group = scene.add_to_root(
            Node::group("Model").with_transform(Transform::from_position(Vec3::new(1.0, 0.0, 0.0))),
        );
        let child = cube_at(&mut scene, group, Vec3::new(0.0, 2.0, 0.0));
        let origin = scene.world_matrix(child).transform_point3(Vec3::ZERO);
        assert_eq!(origin, Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(scene.ancestors(child), vec![group, scene.root()]);
    }

    #[test]
    fn raycast_sorts_nearest_first_and_skips_hidden_ancestors() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let far = cube_at(&mut scene, root, Vec3::new(0.0, 0.0, -3.0));
        let near = cube_at(&mut scene, root, Vec3::ZERO);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0));

        let hits = scene.raycast(&ray, |_, _| true);
        assert_eq!(hits.iter().map(|hit| hit.node).collect::<Vec<_>>(), vec![near, far]);
        assert!((hits[0].distance - 9.5).abs() < 1e-5);

        let hidden_group = scene.add_to_root(Node::group("Hidden"));
        scene.get_mut(hidden_group).unwrap().visible = false;
        let inside_hidden = cube_at(&mut scene, hidden_group, Vec3::new(0.0, 0.0, 3.0));
        let hits = scene.raycast(&ray, |_, _| true);
        assert!(hits.iter().all(|hit| hit.node != inside_hidden));
        assert_eq!(hits[0].node, near);
    }

    #[test]
    fn raycast_ignores_helper_layer() {
        let mut scene = SceneGraph::new();
        let ground = Node::mesh(
            "Ground",
            Geometry::Primitive(PrimitiveShape::Plane),
            StandardMaterial::default(),
        )
        .with_layer(Layer::Helper);
        scene.add_to_root(ground);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(scene.raycast(&ray, |_, _| true).is_empty());
    }

    #[test]
    fn world_bounds_cover_subtree() {
        let mut scene = SceneGraph::new();
        let group = scene.add_to_root(Node::group("Model"));
        cube_at(&mut scene, group, Vec3::new(-2.0, 0.0, 0.0));
        cube_at(&mut scene, group, Vec3::new(2.0, 0.0, 0.0));
        let bounds = scene.world_bounds(group);
        assert_eq!(bounds.min, Vec3::new(-2.5, -0.5, -0.5));
        assert_eq!(bounds.max, Vec3::new(2.5, 0.5, 0.5));
    }
}
