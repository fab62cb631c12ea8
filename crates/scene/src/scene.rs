use glam::Mat4;
use outrun_common::{NodeId, Transform};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::mesh::MeshData;

/// Which shader family draws a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shading {
    /// Diffuse-lit with fog.
    Lit,
    /// Flat color, no lighting; still fogged.
    Unlit,
    /// Procedurally displaced mountain surface driven by the scroll uniforms.
    Terrain,
    /// Line overlay displaced exactly like `Terrain`.
    TerrainWire,
}

/// Per-node surface parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub shading: Shading,
    pub color: [f32; 4],
    /// Visual highlight toggled by picking.
    pub highlighted: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            shading: Shading::Lit,
            color: [0.8, 0.8, 0.8, 1.0],
            highlighted: false,
        }
    }
}

impl Material {
    pub fn lit(color: [f32; 4]) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    pub fn unlit(color: [f32; 4]) -> Self {
        Self {
            shading: Shading::Unlit,
            color,
            highlighted: false,
        }
    }
}

/// What a node contributes to the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Transform-only parent for children.
    Group,
    Mesh(Arc<MeshData>),
    PointLight {
        color: [f32; 3],
        intensity: f32,
        /// Node the light is aimed at, if any.
        target: Option<NodeId>,
    },
    DirectionalLight {
        color: [f32; 3],
        intensity: f32,
    },
    AmbientLight {
        color: [f32; 3],
        intensity: f32,
    },
}

/// A node in the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    pub material: Material,
    /// Hidden nodes hide their whole subtree.
    pub visible: bool,
    pub pickable: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            kind,
            material: Material::default(),
            visible: true,
            pickable: true,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn mesh(name: impl Into<String>, mesh: Arc<MeshData>, material: Material) -> Self {
        Self {
            material,
            ..Self::new(name, NodeKind::Mesh(mesh))
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// A visible node with its resolved world matrix.
#[derive(Debug, Clone, Copy)]
pub struct WorldNode<'a> {
    pub id: NodeId,
    pub node: &'a SceneNode,
    pub world: Mat4,
}

/// Errors from scene graph operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("node {0:?} not found")]
    NodeNotFound(NodeId),
}

/// The scene graph.
///
/// Nodes live in a BTreeMap keyed by id; traversal order comes from the
/// root list and each node's child list, both in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: BTreeMap<NodeId, SceneNode>,
    roots: Vec<NodeId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level nodes in insertion order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Add a top-level node. Returns its id.
    pub fn add(&mut self, mut node: SceneNode) -> NodeId {
        let id = NodeId::new();
        node.parent = None;
        node.children.clear();
        self.nodes.insert(id, node);
        self.roots.push(id);
        id
    }

    /// Add a node as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, mut node: SceneNode) -> Result<NodeId, SceneError> {
        let id = NodeId::new();
        let parent_node = self
            .nodes
            .get_mut(&parent)
            .ok_or(SceneError::NodeNotFound(parent))?;
        parent_node.children.push(id);
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.insert(id, node);
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Replace a node's local transform. Returns false if the node is gone.
    pub fn set_transform(&mut self, id: NodeId, transform: Transform) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.transform = transform;
                true
            }
            None => false,
        }
    }

    /// Children of `id` in insertion order; empty for unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(|n| n.children()).unwrap_or(&[])
    }

    /// Depth-first, pre-order search of the subtree rooted at `root`
    /// (including `root`) for the first node with the given name.
    pub fn find_by_name(&self, root: NodeId, name: &str) -> Option<NodeId> {
        let node = self.nodes.get(&root)?;
        if node.name == name {
            return Some(root);
        }
        node.children
            .iter()
            .find_map(|child| self.find_by_name(*child, name))
    }

    /// Local-to-world matrix, composed through all ancestors.
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let node = self.nodes.get(&id)?;
        let local = node.transform.matrix();
        match node.parent {
            Some(parent) => Some(self.world_matrix(parent)? * local),
            None => Some(local),
        }
    }

    /// Every visible node with its world matrix, parents before children,
    /// roots and siblings in insertion order.
    pub fn world_nodes(&self) -> Vec<WorldNode<'_>> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            self.collect_visible(*root, Mat4::IDENTITY, &mut out);
        }
        out
    }

    fn collect_visible<'a>(&'a self, id: NodeId, parent: Mat4, out: &mut Vec<WorldNode<'a>>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if !node.visible {
            return;
        }
        let world = parent * node.transform.matrix();
        out.push(WorldNode { id, node, world });
        for child in &node.children {
            self.collect_visible(*child, world, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn scene_starts_empty() {
        let scene = Scene::new();
        assert!(scene.is_empty());
        assert!(scene.world_nodes().is_empty());
    }

    #[test]
    fn add_child_preserves_order() {
        let mut scene = Scene::new();
        let root = scene.add(SceneNode::group("car"));
        let ids: Vec<NodeId> = (0..4)
            .map(|i| scene.add_child(root, SceneNode::group(format!("wheel{i}"))).unwrap())
            .collect();
        assert_eq!(scene.children(root), ids.as_slice());
        assert_eq!(scene.get(ids[2]).unwrap().parent(), Some(root));
    }

    #[test]
    fn add_child_to_missing_parent_fails() {
        let mut scene = Scene::new();
        let ghost = NodeId::new();
        assert_eq!(
            scene.add_child(ghost, SceneNode::group("x")),
            Err(SceneError::NodeNotFound(ghost))
        );
    }

    #[test]
    fn set_transform_on_missing_node() {
        let mut scene = Scene::new();
        assert!(!scene.set_transform(NodeId::new(), Transform::default()));
    }

    #[test]
    fn world_matrix_composes_parents() {
        let mut scene = Scene::new();
        let parent = scene.add(
            SceneNode::group("p").with_transform(Transform::from_position(Vec3::new(1.0, 0.0, 0.0))),
        );
        let child = scene
            .add_child(
                parent,
                SceneNode::group("c").with_transform(Transform::from_position(Vec3::new(0.0, 2.0, 0.0))),
            )
            .unwrap();
        let m = scene.world_matrix(child).unwrap();
        assert_eq!(m.transform_point3(Vec3::ZERO), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn find_by_name_searches_subtree() {
        let mut scene = Scene::new();
        let root = scene.add(SceneNode::group("root"));
        let body = scene.add_child(root, SceneNode::group("body")).unwrap();
        let wheels = scene.add_child(body, SceneNode::group("Car")).unwrap();
        assert_eq!(scene.find_by_name(root, "Car"), Some(wheels));
        assert_eq!(scene.find_by_name(root, "root"), Some(root));
        assert_eq!(scene.find_by_name(body, "missing"), None);
    }

    #[test]
    fn hidden_subtree_not_listed() {
        let mut scene = Scene::new();
        let root = scene.add(SceneNode::group("root"));
        scene.add_child(root, SceneNode::group("child")).unwrap();
        scene.add(SceneNode::group("other"));
        assert_eq!(scene.world_nodes().len(), 3);

        scene.get_mut(root).unwrap().visible = false;
        let names: Vec<&str> = scene.world_nodes().iter().map(|w| w.node.name.as_str()).collect();
        assert_eq!(names, vec!["other"]);
    }
}
