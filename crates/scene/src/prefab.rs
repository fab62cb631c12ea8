use outrun_common::{NodeId, Transform};

use crate::scene::{Material, NodeKind, Scene, SceneError, SceneNode};

/// A detached node tree that can be instantiated into a scene any number
/// of times.
///
/// Mesh data inside is `Arc`-shared, so every instance points at the same
/// vertex buffers; only names, transforms and materials are per instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Prefab {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    pub material: Material,
    pub children: Vec<Prefab>,
}

impl Prefab {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            kind,
            material: Material::default(),
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_child(mut self, child: Prefab) -> Self {
        self.children.push(child);
        self
    }

    /// Total node count including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Prefab::node_count).sum::<usize>()
    }

    fn to_node(&self) -> SceneNode {
        let mut node = SceneNode::new(self.name.clone(), self.kind.clone());
        node.transform = self.transform;
        node.material = self.material;
        node
    }
}

impl Scene {
    /// Copy a prefab tree into the scene, under `parent` or as a new root.
    /// Returns the id of the instantiated root.
    pub fn instantiate(
        &mut self,
        prefab: &Prefab,
        parent: Option<NodeId>,
    ) -> Result<NodeId, SceneError> {
        let id = match parent {
            Some(parent) => self.add_child(parent, prefab.to_node())?,
            None => {
                let id = self.add(prefab.to_node());
                tracing::debug!(prefab = %prefab.name, node = %id.short(), nodes = prefab.node_count(), "prefab instantiated");
                id
            }
        };
        for child in &prefab.children {
            self.instantiate(child, Some(id))?;
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MeshData;
    use glam::Vec3;
    use std::sync::Arc;

    fn tree() -> Prefab {
        let trunk = Arc::new(MeshData::cuboid("trunk", Vec3::new(0.3, 4.0, 0.3)));
        Prefab::group("palm")
            .with_child(Prefab::new("trunk", NodeKind::Mesh(trunk.clone())))
            .with_child(Prefab::new("crown", NodeKind::Mesh(trunk)))
    }

    #[test]
    fn instantiate_copies_tree_shape() {
        let mut scene = Scene::new();
        let prefab = tree();
        let root = scene.instantiate(&prefab, None).unwrap();
        assert_eq!(scene.len(), prefab.node_count());
        assert_eq!(scene.children(root).len(), 2);
        assert_eq!(scene.get(root).unwrap().name, "palm");
    }

    #[test]
    fn instances_share_mesh_data() {
        let mut scene = Scene::new();
        let prefab = tree();
        let a = scene.instantiate(&prefab, None).unwrap();
        let b = scene.instantiate(&prefab, None).unwrap();
        let mesh_of = |root: NodeId| match &scene.get(scene.children(root)[0]).unwrap().kind {
            NodeKind::Mesh(m) => m.clone(),
            _ => panic!("expected mesh"),
        };
        assert!(Arc::ptr_eq(&mesh_of(a), &mesh_of(b)));
    }

    #[test]
    fn instantiate_under_missing_parent_fails() {
        let mut scene = Scene::new();
        assert!(scene.instantiate(&tree(), Some(NodeId::new())).is_err());
    }
}
