//! Scene Graph
//!
//! Hierarchical assembly description consumed by the engines:
//! - Transform parenting with cached world matrices
//! - Transitive visibility
//! - Optional triangle mesh geometry per node
//!
//! The graph owns its nodes. Engines borrow it per call and refer to nodes by
//! [`NodeId`] only; a node's `parent` is a plain id used for ancestor walks and
//! coordinate conversion, never for ownership.

use ahash::AHashMap;
use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::math::Aabb;

/// Scene graph errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Parenting {child} under {parent} would create a cycle")]
    WouldCreateCycle { child: NodeId, parent: NodeId },
}

/// Result type for scene graph operations
pub type SceneResult<T> = Result<T, SceneError>;

/// Node identifier with generation counter for stable IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    /// Slot index
    index: u32,
    /// Generation counter to detect stale references
    generation: u32,
}

impl NodeId {
    /// Create a new id with the given index and generation
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Get the slot index
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Get the generation
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Local transform of a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Local position
    pub position: Vec3,
    /// Local rotation
    pub rotation: Quat,
    /// Local scale
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a new transform with the given position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Create a new transform from all components
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Get the local transformation matrix
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Triangle mesh attached to a node, in the node's local space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshGeometry {
    /// Vertex positions
    pub positions: Vec<Vec3>,
    /// Triangle indices; `None` means consecutive position triples
    pub indices: Option<Vec<u32>>,
    /// Local bounding box
    bounds: Aabb,
}

impl MeshGeometry {
    /// Indexed mesh
    pub fn indexed(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let bounds = Aabb::from_points(positions.iter().copied());
        Self {
            positions,
            indices: Some(indices),
            bounds,
        }
    }

    /// Non-indexed mesh, every three positions form a triangle
    pub fn triangles(positions: Vec<Vec3>) -> Self {
        let bounds = Aabb::from_points(positions.iter().copied());
        Self {
            positions,
            indices: None,
            bounds,
        }
    }

    /// Axis-aligned box centered on the origin with the given size
    pub fn cuboid(size: Vec3) -> Self {
        let h = size * 0.5;
        let positions = vec![
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, 0, 3, 2, // -z
            4, 5, 6, 4, 6, 7, // +z
            0, 1, 5, 0, 5, 4, // -y
            3, 6, 2, 3, 7, 6, // +y
            0, 4, 7, 0, 7, 3, // -x
            1, 2, 6, 1, 6, 5, // +x
        ];
        Self::indexed(positions, indices)
    }

    /// Local bounding box
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Number of complete triangles
    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    /// Vertex indices of triangle `i`, `None` if out of range or referencing
    /// a missing vertex
    pub fn triangle(&self, i: usize) -> Option<[u32; 3]> {
        let tri = match &self.indices {
            Some(indices) => {
                let base = i.checked_mul(3)?;
                let chunk = indices.get(base..base + 3)?;
                [chunk[0], chunk[1], chunk[2]]
            }
            None => {
                if i >= self.triangle_count() {
                    return None;
                }
                let base = (i * 3) as u32;
                [base, base + 1, base + 2]
            }
        };
        let len = self.positions.len() as u32;
        tri.iter().all(|&v| v < len).then_some(tri)
    }

    /// Iterate all valid triangles as index triples
    pub fn triangles_iter(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        (0..self.triangle_count()).filter_map(move |i| self.triangle(i))
    }
}

/// Scene graph node containing hierarchy information
#[derive(Debug, Clone)]
pub struct Node {
    /// Identifier of this node
    pub id: NodeId,
    /// Node name for identification
    pub name: String,
    /// Local transform
    pub local_transform: Transform,
    /// Cached world transform
    world_transform: Transform,
    /// Cached world matrix
    world_matrix: Mat4,
    /// Parent node (non-owning)
    pub parent: Option<NodeId>,
    /// Child nodes, in insertion order
    pub children: SmallVec<[NodeId; 8]>,
    /// Whether this node is visible
    pub visible: bool,
    /// Mesh geometry, if this is a mesh node
    pub mesh: Option<MeshGeometry>,
}

impl Node {
    /// Create a new node
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            local_transform: Transform::IDENTITY,
            world_transform: Transform::IDENTITY,
            world_matrix: Mat4::IDENTITY,
            parent: None,
            children: SmallVec::new(),
            visible: true,
            mesh: None,
        }
    }

    /// Get the world transform
    pub fn world_transform(&self) -> &Transform {
        &self.world_transform
    }

    /// Get the world matrix
    pub fn world_matrix(&self) -> Mat4 {
        self.world_matrix
    }

    /// World-space position of the node origin
    pub fn world_position(&self) -> Vec3 {
        self.world_transform.position
    }

    /// Whether this node carries mesh geometry
    pub fn is_mesh(&self) -> bool {
        self.mesh.is_some()
    }

    /// Add a child node
    pub fn add_child(&mut self, child: NodeId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    /// Remove a child node
    pub fn remove_child(&mut self, child: NodeId) {
        self.children.retain(|c| *c != child);
    }
}

/// Scene graph managing the hierarchy of nodes
pub struct SceneGraph {
    /// All nodes in the scene
    nodes: AHashMap<NodeId, Node>,
    /// Root nodes (no parent)
    roots: Vec<NodeId>,
    /// Next free slot index
    next_index: u32,
}

impl SceneGraph {
    /// Create a new empty scene graph
    pub fn new() -> Self {
        Self {
            nodes: AHashMap::new(),
            roots: Vec::new(),
            next_index: 0,
        }
    }

    /// Allocate a fresh id and add a root node for it
    pub fn spawn(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId::new(self.next_index, 0);
        self.add_node(id, name);
        id
    }

    /// Spawn a node with a local transform under `parent`
    pub fn spawn_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        local: Transform,
    ) -> SceneResult<NodeId> {
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        let id = self.spawn(name);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.local_transform = local;
        }
        self.set_parent(id, Some(parent))?;
        Ok(id)
    }

    /// Add a node to the scene as a root, replacing any node with the same id
    /// but keeping its name when `name` is empty
    pub fn add_node(&mut self, id: NodeId, name: impl Into<String>) -> &mut Node {
        let name = name.into();
        self.next_index = self.next_index.max(id.index().saturating_add(1));
        if !self.nodes.contains_key(&id) {
            self.roots.push(id);
        }
        let node = self.nodes.entry(id).or_insert_with(|| Node::new(id, String::new()));
        if !name.is_empty() {
            node.name = name;
        }
        node
    }

    /// Remove a node from the scene, orphaning its children
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;

        if let Some(parent_id) = node.parent {
            if let Some(parent) = self.nodes.get_mut(&parent_id) {
                parent.remove_child(id);
            }
        }

        self.roots.retain(|&e| e != id);

        for child in &node.children {
            if let Some(child_node) = self.nodes.get_mut(child) {
                child_node.parent = None;
                self.roots.push(*child);
            }
        }

        Some(node)
    }

    /// Get a node by id
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a mutable node by id
    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Set the parent of a node
    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> SceneResult<()> {
        if !self.nodes.contains_key(&child) {
            return Err(SceneError::NodeNotFound(child));
        }
        if let Some(parent_id) = parent {
            if !self.nodes.contains_key(&parent_id) {
                return Err(SceneError::NodeNotFound(parent_id));
            }
            if self.is_ancestor_or_self(child, parent_id) {
                return Err(SceneError::WouldCreateCycle { child, parent: parent_id });
            }
        }

        // Detach from the old parent
        let old_parent = self.nodes.get(&child).and_then(|n| n.parent);
        if let Some(old_parent) = old_parent {
            if let Some(old_parent_node) = self.nodes.get_mut(&old_parent) {
                old_parent_node.remove_child(child);
            }
        }

        match parent {
            Some(parent_id) => {
                if let Some(parent_node) = self.nodes.get_mut(&parent_id) {
                    parent_node.add_child(child);
                }
                self.roots.retain(|&e| e != child);
            }
            None => {
                if !self.roots.contains(&child) {
                    self.roots.push(child);
                }
            }
        }

        if let Some(child_node) = self.nodes.get_mut(&child) {
            child_node.parent = parent;
        }
        Ok(())
    }

    /// Whether `ancestor` is `node` or lies on its parent chain
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors_inclusive(node).any(|id| id == ancestor)
    }

    /// Walk from `node` up to its root, starting with `node` itself
    pub fn ancestors_inclusive(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.nodes.contains_key(&node).then_some(node);
        std::iter::from_fn(move || {
            let id = current?;
            current = self.nodes.get(&id).and_then(|n| n.parent);
            Some(id)
        })
    }

    /// Number of parent hops from `node` up to `ancestor`, `None` if
    /// `ancestor` is not on the chain
    pub fn depth_below(&self, ancestor: NodeId, node: NodeId) -> Option<usize> {
        self.ancestors_inclusive(node).position(|id| id == ancestor)
    }

    /// A node is visible only if it and every ancestor are visible
    pub fn is_visible_in_hierarchy(&self, node: NodeId) -> bool {
        let mut seen = false;
        for id in self.ancestors_inclusive(node) {
            seen = true;
            match self.nodes.get(&id) {
                Some(n) if n.visible => {}
                _ => return false,
            }
        }
        seen
    }

    /// Get root nodes
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Update world transforms for every node
    pub fn update_transforms(&mut self) {
        let roots: Vec<_> = self.roots.clone();
        for root in roots {
            self.update_transform_recursive(root, Mat4::IDENTITY);
        }
    }

    fn update_transform_recursive(&mut self, id: NodeId, parent_world: Mat4) {
        let (world_matrix, children) = {
            let node = match self.nodes.get_mut(&id) {
                Some(n) => n,
                None => return,
            };

            let world_matrix = parent_world * node.local_transform.local_matrix();
            node.world_matrix = world_matrix;

            let (scale, rotation, translation) = world_matrix.to_scale_rotation_translation();
            node.world_transform = Transform::new(translation, rotation, scale);

            (world_matrix, node.children.clone())
        };

        for child in children {
            self.update_transform_recursive(child, world_matrix);
        }
    }

    /// World matrix of `parent`, identity for a root (`None`) or unknown node
    pub fn parent_world_matrix(&self, parent: Option<NodeId>) -> Mat4 {
        parent
            .and_then(|p| self.nodes.get(&p))
            .map(|n| n.world_matrix)
            .unwrap_or(Mat4::IDENTITY)
    }

    /// Convert a world-space point into the local space of `parent`
    pub fn world_to_local(&self, parent: Option<NodeId>, point: Vec3) -> Vec3 {
        self.parent_world_matrix(parent).inverse().transform_point3(point)
    }

    /// World-space bounds of a node's own mesh, `None` for non-mesh nodes
    pub fn mesh_world_bounds(&self, node: NodeId) -> Option<Aabb> {
        let node = self.nodes.get(&node)?;
        let mesh = node.mesh.as_ref()?;
        Some(mesh.bounds().transform(node.world_matrix))
    }

    /// Depth-first pre-order walk from `root`, skipping invisible subtrees
    pub fn visible_subtree(&self, root: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            if !node.visible {
                continue;
            }
            result.push(id);
            // Reverse so children pop in insertion order
            stack.extend(node.children.iter().rev().copied());
        }
        result
    }

    /// Find a node by name
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes.values()
            .find(|node| node.name == name)
            .map(|node| node.id)
    }

    /// Get all descendants of a node
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut descendants = Vec::new();
        self.collect_descendants(id, &mut descendants);
        descendants
    }

    fn collect_descendants(&self, id: NodeId, result: &mut Vec<NodeId>) {
        if let Some(node) = self.nodes.get(&id) {
            for &child in &node.children {
                result.push(child);
                self.collect_descendants(child, result);
            }
        }
    }

    /// Position of `node` among its parent's children (0 for roots)
    pub fn sibling_index(&self, node: NodeId) -> usize {
        let parent = self.nodes.get(&node).and_then(|n| n.parent);
        match parent.and_then(|p| self.nodes.get(&p)) {
            Some(parent) => parent.children.iter().position(|&c| c == node).unwrap_or(0),
            None => self.roots.iter().position(|&r| r == node).unwrap_or(0),
        }
    }

    /// Get the number of nodes in the scene
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the scene is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Clear all nodes from the scene
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
