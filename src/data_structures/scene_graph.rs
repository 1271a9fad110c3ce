//! Scene graph and hierarchical scene organization.
//!
//! The graph is an owned tree of [`SceneNode`]s. The set of node kinds is
//! closed (mesh, group, pending asset), so nodes are an enum rather than
//! trait objects. A parent owns its children: dropping a group drops its
//! whole subtree, which is how components are torn down.
//!
//! Child order is draw order. The scene assembler relies on this to layer
//! transparent elements the same way every frame.

use std::sync::atomic::{AtomicU64, Ordering};

use cgmath::{Matrix4, SquareMatrix};

use crate::{
    data_structures::{
        geometry::Geometry, instance::InstanceOffsets, material::Material, transform::Transform,
    },
    lifecycle::ComponentId,
};

/// Process-wide unique identity of a mesh, used to key GPU resources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Identifies a placeholder that is waiting for an asynchronous asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotId(pub u32);

#[derive(Debug)]
pub enum SceneNode {
    Mesh(MeshNode),
    Group(GroupNode),
    Pending(PendingNode),
}

/// Geometry drawn with one material, optionally instanced.
#[derive(Debug)]
pub struct MeshNode {
    id: NodeId,
    pub name: String,
    pub geometry: Geometry,
    pub material: Material,
    pub instances: Option<InstanceOffsets>,
    pub transform: Transform,
    pub owner: Option<ComponentId>,
}

impl MeshNode {
    pub fn new(name: impl Into<String>, geometry: Geometry, material: Material) -> Self {
        Self {
            id: NodeId::next(),
            name: name.into(),
            geometry,
            material,
            instances: None,
            transform: Transform::default(),
            owner: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn with_instances(mut self, instances: InstanceOffsets) -> Self {
        self.instances = Some(instances);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Number of copies the vertex stage will draw.
    pub fn instance_count(&self) -> usize {
        self.instances.as_ref().map_or(1, InstanceOffsets::len)
    }
}

#[derive(Debug, Default)]
pub struct GroupNode {
    pub name: String,
    pub transform: Transform,
    pub children: Vec<SceneNode>,
    pub owner: Option<ComponentId>,
}

impl GroupNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: impl Into<SceneNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn add_child(&mut self, child: impl Into<SceneNode>) {
        self.children.push(child.into());
    }
}

/// Stands in for a subtree whose asset has not arrived yet. Renders nothing.
#[derive(Debug)]
pub struct PendingNode {
    pub slot: SlotId,
    pub name: String,
    pub owner: Option<ComponentId>,
}

impl From<MeshNode> for SceneNode {
    fn from(mesh: MeshNode) -> Self {
        SceneNode::Mesh(mesh)
    }
}

impl From<GroupNode> for SceneNode {
    fn from(group: GroupNode) -> Self {
        SceneNode::Group(group)
    }
}

impl From<PendingNode> for SceneNode {
    fn from(pending: PendingNode) -> Self {
        SceneNode::Pending(pending)
    }
}

impl SceneNode {
    pub fn name(&self) -> &str {
        match self {
            SceneNode::Mesh(mesh) => &mesh.name,
            SceneNode::Group(group) => &group.name,
            SceneNode::Pending(pending) => &pending.name,
        }
    }

    pub fn owner(&self) -> Option<ComponentId> {
        match self {
            SceneNode::Mesh(mesh) => mesh.owner,
            SceneNode::Group(group) => group.owner,
            SceneNode::Pending(pending) => pending.owner,
        }
    }

    pub fn children(&self) -> &[SceneNode] {
        match self {
            SceneNode::Group(group) => &group.children,
            _ => &[],
        }
    }

    /// Stamps `owner` on this node and everything below it.
    pub fn claim(&mut self, owner: ComponentId) {
        match self {
            SceneNode::Mesh(mesh) => mesh.owner = Some(owner),
            SceneNode::Pending(pending) => pending.owner = Some(owner),
            SceneNode::Group(group) => {
                group.owner = Some(owner);
                group.children.iter_mut().for_each(|c| c.claim(owner));
            }
        }
    }

    /// Visits every mesh in draw order together with its world matrix.
    pub fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a MeshNode, Matrix4<f32>)) {
        self.walk_from(Matrix4::identity(), f);
    }

    fn walk_from<'a>(&'a self, parent: Matrix4<f32>, f: &mut dyn FnMut(&'a MeshNode, Matrix4<f32>)) {
        match self {
            SceneNode::Mesh(mesh) => f(mesh, parent * mesh.transform.to_matrix()),
            SceneNode::Group(group) => {
                let world = parent * group.transform.to_matrix();
                for child in &group.children {
                    child.walk_from(world, f);
                }
            }
            SceneNode::Pending(_) => (),
        }
    }

    pub fn for_each_mesh_mut(&mut self, f: &mut dyn FnMut(&mut MeshNode)) {
        match self {
            SceneNode::Mesh(mesh) => f(mesh),
            SceneNode::Group(group) => group
                .children
                .iter_mut()
                .for_each(|child| child.for_each_mesh_mut(f)),
            SceneNode::Pending(_) => (),
        }
    }

    pub fn meshes(&self) -> Vec<&MeshNode> {
        let mut meshes = Vec::new();
        self.walk(&mut |mesh, _| meshes.push(mesh));
        meshes
    }

    /// Depth-first search by name.
    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        if self.name() == name {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(name))
    }

    /// Detaches the first direct or nested child called `name`.
    pub fn remove(&mut self, name: &str) -> Option<SceneNode> {
        let SceneNode::Group(group) = self else {
            return None;
        };
        if let Some(idx) = group.children.iter().position(|c| c.name() == name) {
            return Some(group.children.remove(idx));
        }
        group.children.iter_mut().find_map(|child| child.remove(name))
    }

    /// Swaps the placeholder for `slot` with `node`. Returns `false` when no
    /// such placeholder exists (anymore).
    pub fn replace_pending(&mut self, slot: SlotId, node: SceneNode) -> bool {
        let mut node = Some(node);
        self.replace_pending_inner(slot, &mut node)
    }

    fn replace_pending_inner(&mut self, slot: SlotId, node: &mut Option<SceneNode>) -> bool {
        match self {
            SceneNode::Pending(pending) if pending.slot == slot => {
                let owner = pending.owner;
                if let Some(mut loaded) = node.take() {
                    if let Some(owner) = owner {
                        loaded.claim(owner);
                    }
                    *self = loaded;
                }
                true
            }
            SceneNode::Group(group) => group
                .children
                .iter_mut()
                .any(|child| child.replace_pending_inner(slot, node)),
            _ => false,
        }
    }

    /// Drops the placeholder for `slot`, leaving its parent without that subtree.
    pub fn remove_pending(&mut self, slot: SlotId) -> bool {
        let SceneNode::Group(group) = self else {
            return false;
        };
        let is_slot = |c: &SceneNode| matches!(c, SceneNode::Pending(p) if p.slot == slot);
        if let Some(idx) = group.children.iter().position(is_slot) {
            group.children.remove(idx);
            return true;
        }
        group
            .children
            .iter_mut()
            .any(|child| child.remove_pending(slot))
    }

    pub fn pending_count(&self) -> usize {
        match self {
            SceneNode::Pending(_) => 1,
            SceneNode::Group(group) => group.children.iter().map(SceneNode::pending_count).sum(),
            SceneNode::Mesh(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::material::ShaderProgram;

    fn mesh(name: &str) -> MeshNode {
        MeshNode::new(
            name,
            Geometry::plane(1.0, 1.0, 1, 1),
            Material::new(ShaderProgram::Standard),
        )
    }

    fn pending(slot: u32) -> PendingNode {
        PendingNode {
            slot: SlotId(slot),
            name: format!("slot{slot}"),
            owner: Some(ComponentId(7)),
        }
    }

    #[test]
    fn walk_visits_meshes_in_child_order_with_world_matrices() {
        let root: SceneNode = GroupNode::new("root")
            .with_child(mesh("a"))
            .with_child(
                GroupNode::new("moved")
                    .with_transform(Transform::at(0.0, 0.0, -10.0))
                    .with_child(mesh("b")),
            )
            .into();
        let mut seen = Vec::new();
        root.walk(&mut |mesh, world| seen.push((mesh.name.clone(), world.w.z)));
        assert_eq!(seen, vec![("a".into(), 0.0), ("b".into(), -10.0)]);
    }

    #[test]
    fn placeholder_is_swapped_and_inherits_its_owner() {
        let mut root: SceneNode = GroupNode::new("root").with_child(pending(1)).into();
        assert_eq!(root.pending_count(), 1);
        assert!(root.replace_pending(SlotId(1), mesh("loaded").into()));
        assert_eq!(root.pending_count(), 0);
        assert_eq!(root.find("loaded").and_then(SceneNode::owner), Some(ComponentId(7)));
        assert!(!root.replace_pending(SlotId(1), mesh("again").into()));
    }

    #[test]
    fn failed_placeholder_is_dropped() {
        let mut root: SceneNode = GroupNode::new("root")
            .with_child(GroupNode::new("svgs").with_child(pending(2)))
            .into();
        assert!(root.remove_pending(SlotId(2)));
        assert!(root.find("svgs").unwrap().children().is_empty());
    }

    #[test]
    fn remove_detaches_a_nested_subtree() {
        let mut root: SceneNode = GroupNode::new("root")
            .with_child(GroupNode::new("inner").with_child(mesh("leaf")))
            .into();
        let leaf = root.remove("leaf");
        assert!(matches!(leaf, Some(SceneNode::Mesh(_))));
        assert!(root.find("leaf").is_none());
    }
}
