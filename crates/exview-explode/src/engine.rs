//! Explosion engine
//!
//! Snapshots an assembly once, then turns (progress, multiplier, mode, axis)
//! into a local-space position for every explodable part.
//!
//! The engine never owns the scene. Every call that reads or writes nodes
//! borrows the [`SceneGraph`] explicitly, and all derived data is keyed by
//! [`NodeId`] in maps owned by this engine instance.

use ahash::AHashMap;
use exview_core::math::{Aabb, BoundingSphere};
use exview_core::{NodeId, SceneGraph, Transform};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::direction::{CenterOutward, DirectionStrategy, PartContext};
use crate::mode::{AssemblyFrame, Drive, ExplosionMode, PartAttributes};
use crate::{ExplosionConfig, MULTIPLIER_RANGE, PROGRESS_RANGE};

/// Transform of a node as it was when the engine first saw it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OriginalTransform {
    pub world_position: Vec3,
    pub local: Transform,
}

/// User-facing explosion parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplosionState {
    /// In `[0, 1]`
    pub progress: f32,
    /// In `[0.1, 5]`
    pub multiplier: f32,
    pub mode: ExplosionMode,
    /// Unit axis used by axial mode
    pub axial_vector: Vec3,
}

impl Default for ExplosionState {
    fn default() -> Self {
        Self {
            progress: 0.0,
            multiplier: 1.0,
            mode: ExplosionMode::Radial,
            axial_vector: Vec3::Y,
        }
    }
}

/// Exploded-view engine over one assembly root
pub struct ExplosionEngine {
    config: ExplosionConfig,
    state: ExplosionState,
    strategy: Box<dyn DirectionStrategy>,
    root: Option<NodeId>,
    frame: AssemblyFrame,
    bounds: Aabb,
    /// Explodable parts in traversal order
    parts: Vec<NodeId>,
    originals: AHashMap<NodeId, OriginalTransform>,
    directions: AHashMap<NodeId, Vec3>,
    axial_projections: AHashMap<NodeId, f32>,
    size_weights: AHashMap<NodeId, f32>,
    depth_weights: AHashMap<NodeId, f32>,
}

impl ExplosionEngine {
    /// Build an engine over the subtree rooted at `root` with the default
    /// center-outward direction strategy
    pub fn new(scene: &mut SceneGraph, root: NodeId, config: ExplosionConfig) -> Self {
        let config = config.sanitized();
        let strategy = CenterOutward {
            epsilon: config.center_epsilon,
            sibling_perturbation: config.sibling_perturbation,
        };
        Self::with_strategy(scene, root, config, strategy)
    }

    /// Build an engine with a custom direction strategy
    pub fn with_strategy(
        scene: &mut SceneGraph,
        root: NodeId,
        config: ExplosionConfig,
        strategy: impl DirectionStrategy + 'static,
    ) -> Self {
        let mut engine = Self {
            config: config.sanitized(),
            state: ExplosionState::default(),
            strategy: Box::new(strategy),
            root: None,
            frame: AssemblyFrame::default(),
            bounds: Aabb::EMPTY,
            parts: Vec::new(),
            originals: AHashMap::new(),
            directions: AHashMap::new(),
            axial_projections: AHashMap::new(),
            size_weights: AHashMap::new(),
            depth_weights: AHashMap::new(),
        };
        engine.rebuild(scene, root);
        engine
    }

    /// Current explosion progress
    pub fn progress(&self) -> f32 {
        self.state.progress
    }

    /// Current distance multiplier
    pub fn multiplier(&self) -> f32 {
        self.state.multiplier
    }

    /// Active displacement mode
    pub fn mode(&self) -> ExplosionMode {
        self.state.mode
    }

    /// Unit axis for axial mode
    pub fn axial_vector(&self) -> Vec3 {
        self.state.axial_vector
    }

    pub fn state(&self) -> ExplosionState {
        self.state
    }

    pub fn config(&self) -> &ExplosionConfig {
        &self.config
    }

    /// Root of the current assembly, `None` after [`dispose`](Self::dispose)
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn assembly_center(&self) -> Vec3 {
        self.frame.center
    }

    pub fn assembly_radius(&self) -> f32 {
        self.frame.radius
    }

    /// Explodable parts in traversal order
    pub fn parts(&self) -> &[NodeId] {
        &self.parts
    }

    /// Snapshot taken for a node at build time
    pub fn original_of(&self, id: NodeId) -> Option<&OriginalTransform> {
        self.originals.get(&id)
    }

    /// Unit explosion direction of a part
    pub fn direction_of(&self, id: NodeId) -> Option<Vec3> {
        self.directions.get(&id).copied()
    }

    /// World-space displacement of a part under the current state
    pub fn offset_of(&self, id: NodeId) -> Option<Vec3> {
        let attributes = self.attributes(id)?;
        Some(self.state.mode.displacement(&attributes, &self.frame, &self.drive()))
    }

    /// Set progress, clamped to `[0, 1]`. Non-finite input is ignored.
    pub fn set_progress(&mut self, scene: &mut SceneGraph, progress: f32) {
        if !progress.is_finite() {
            log::warn!("Ignoring non-finite explosion progress {}", progress);
            return;
        }
        self.state.progress = progress.clamp(PROGRESS_RANGE.0, PROGRESS_RANGE.1);
        self.apply(scene);
    }

    /// Set the distance multiplier, clamped to `[0.1, 5]`. Non-finite input
    /// is ignored.
    pub fn set_multiplier(&mut self, scene: &mut SceneGraph, multiplier: f32) {
        if !multiplier.is_finite() {
            log::warn!("Ignoring non-finite explosion multiplier {}", multiplier);
            return;
        }
        self.state.multiplier = multiplier.clamp(MULTIPLIER_RANGE.0, MULTIPLIER_RANGE.1);
        self.apply(scene);
    }

    pub fn set_mode(&mut self, scene: &mut SceneGraph, mode: ExplosionMode) {
        self.state.mode = mode;
        self.apply(scene);
    }

    /// Set the axial-mode axis. The vector is normalized; zero or non-finite
    /// vectors are ignored.
    pub fn set_axial_vector(&mut self, scene: &mut SceneGraph, axis: Vec3) {
        if !axis.is_finite() || axis.length_squared() <= f32::EPSILON {
            log::warn!("Ignoring degenerate axial vector {:?}", axis);
            return;
        }
        self.state.axial_vector = axis.normalize();
        self.compute_axial_projections();
        self.apply(scene);
    }

    /// Replace the direction strategy and re-derive every part's direction
    pub fn set_direction_strategy(
        &mut self,
        scene: &mut SceneGraph,
        strategy: impl DirectionStrategy + 'static,
    ) {
        self.strategy = Box::new(strategy);
        self.compute_directions(scene);
        self.apply(scene);
    }

    /// Restore every part's original local transform and zero the progress
    pub fn reset(&mut self, scene: &mut SceneGraph) {
        self.state.progress = 0.0;
        for &id in &self.parts {
            let Some(original) = self.originals.get(&id) else {
                continue;
            };
            if let Some(node) = scene.get_node_mut(id) {
                node.local_transform = original.local;
            }
        }
        scene.update_transforms();
    }

    /// Restore the current assembly, then rebuild everything for `root`.
    /// Mode, multiplier and axis carry over; progress starts at zero.
    pub fn set_model(&mut self, scene: &mut SceneGraph, root: NodeId) {
        self.reset(scene);
        self.rebuild(scene, root);
    }

    /// Restore the assembly and drop all derived data. The engine is inert
    /// afterwards until [`set_model`](Self::set_model) is called.
    pub fn dispose(&mut self, scene: &mut SceneGraph) {
        self.reset(scene);
        self.clear();
        self.root = None;
        log::debug!("Explosion engine disposed");
    }

    fn clear(&mut self) {
        self.parts.clear();
        self.originals.clear();
        self.directions.clear();
        self.axial_projections.clear();
        self.size_weights.clear();
        self.depth_weights.clear();
        self.bounds = Aabb::EMPTY;
        self.frame = AssemblyFrame::default();
    }

    fn rebuild(&mut self, scene: &mut SceneGraph, root: NodeId) {
        let _span = tracing::debug_span!("explosion_rebuild", root = %root).entered();

        self.clear();
        self.state.progress = 0.0;
        self.root = Some(root);
        scene.update_transforms();

        let Some(root_node) = scene.get_node(root) else {
            log::warn!("Explosion root {} is not in the scene", root);
            return;
        };
        let root_position = root_node.world_position();

        for id in scene.visible_subtree(root) {
            let Some(node) = scene.get_node(id) else {
                continue;
            };
            self.originals.insert(
                id,
                OriginalTransform {
                    world_position: node.world_position(),
                    local: node.local_transform,
                },
            );
            if node.is_mesh() && node.children.is_empty() {
                self.parts.push(id);
            }
        }

        self.bounds = self
            .parts
            .iter()
            .filter_map(|&id| scene.mesh_world_bounds(id))
            .fold(Aabb::EMPTY, |acc, b| acc.merge(&b));

        self.frame = if self.bounds.is_empty() {
            AssemblyFrame {
                center: root_position,
                radius: 1.0,
            }
        } else {
            let sphere = BoundingSphere::from_aabb(&self.bounds);
            AssemblyFrame {
                center: sphere.center,
                radius: if sphere.radius < self.config.center_epsilon {
                    1.0
                } else {
                    sphere.radius
                },
            }
        };

        self.compute_weights(scene, root);
        self.compute_directions(scene);
        self.compute_axial_projections();

        log::debug!(
            "Explosion model built: {} nodes, {} parts, radius {:.4}",
            self.originals.len(),
            self.parts.len(),
            self.frame.radius
        );
    }

    fn compute_weights(&mut self, scene: &SceneGraph, root: NodeId) {
        let volumes: Vec<(NodeId, f32)> = self
            .parts
            .iter()
            .map(|&id| {
                let volume = scene.mesh_world_bounds(id).map(|b| b.volume()).unwrap_or(0.0);
                (id, volume)
            })
            .collect();
        let depths: Vec<(NodeId, usize)> = self
            .parts
            .iter()
            .map(|&id| (id, scene.depth_below(root, id).unwrap_or(0)))
            .collect();

        let max_volume = volumes.iter().map(|&(_, v)| v).fold(0.0f32, f32::max);
        let max_volume = if max_volume > 0.0 { max_volume } else { 1.0 };
        let max_depth = depths.iter().map(|&(_, d)| d).max().unwrap_or(0).max(1);

        for (id, volume) in volumes {
            let weight = self.config.size_weight_base + volume / max_volume * self.config.size_weight_scale;
            self.size_weights.insert(id, weight);
        }
        for (id, depth) in depths {
            let weight = self.config.depth_weight_base
                + depth as f32 / max_depth as f32 * self.config.depth_weight_scale;
            self.depth_weights.insert(id, weight);
        }
    }

    fn compute_directions(&mut self, scene: &SceneGraph) {
        self.directions.clear();
        for &id in &self.parts {
            let (Some(node), Some(original)) = (scene.get_node(id), self.originals.get(&id)) else {
                continue;
            };
            let context = PartContext {
                id,
                name: &node.name,
                world_position: original.world_position,
                sibling_index: scene.sibling_index(id),
            };
            let raw = self.strategy.direction(&context, self.frame.center);
            let direction = if raw.is_finite() && raw.length_squared() > f32::EPSILON {
                raw.normalize()
            } else {
                context.fallback(self.config.sibling_perturbation)
            };
            self.directions.insert(id, direction);
        }
    }

    fn compute_axial_projections(&mut self) {
        self.axial_projections.clear();
        let axis = self.state.axial_vector;
        let extent = if self.bounds.is_empty() {
            1.0
        } else {
            self.bounds.extent_along(axis)
        };
        let extent = if extent < self.config.center_epsilon { 1.0 } else { extent };

        for &id in &self.parts {
            if let Some(original) = self.originals.get(&id) {
                let projection = (original.world_position - self.frame.center).dot(axis) / extent;
                self.axial_projections.insert(id, projection);
            }
        }
    }

    fn attributes(&self, id: NodeId) -> Option<PartAttributes> {
        Some(PartAttributes {
            direction: *self.directions.get(&id)?,
            original_position: self.originals.get(&id)?.world_position,
            axial_projection: *self.axial_projections.get(&id)?,
            size_weight: *self.size_weights.get(&id)?,
            depth_weight: *self.depth_weights.get(&id)?,
        })
    }

    fn drive(&self) -> Drive {
        Drive {
            progress: self.state.progress,
            multiplier: self.state.multiplier,
            max_distance_factor: self.config.max_distance_factor,
            force_field_offset: self.config.force_field_offset,
            axis: self.state.axial_vector,
        }
    }

    /// Recompute and write back every part's local position
    fn apply(&self, scene: &mut SceneGraph) {
        let drive = self.drive();
        for &id in &self.parts {
            let (Some(original), Some(attributes)) = (self.originals.get(&id), self.attributes(id)) else {
                continue;
            };
            let Some(parent) = scene.get_node(id).map(|n| n.parent) else {
                continue;
            };

            let displacement = self.state.mode.displacement(&attributes, &self.frame, &drive);
            let position = if displacement == Vec3::ZERO {
                original.local.position
            } else {
                let inverse_parent = scene.parent_world_matrix(parent).inverse();
                let moved = original.local.position + inverse_parent.transform_vector3(displacement);
                if moved.is_finite() { moved } else { original.local.position }
            };

            if let Some(node) = scene.get_node_mut(id) {
                node.local_transform.position = position;
            }
        }
        scene.update_transforms();
    }
}

impl std::fmt::Debug for ExplosionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplosionEngine")
            .field("state", &self.state)
            .field("root", &self.root)
            .field("parts", &self.parts.len())
            .field("frame", &self.frame)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use exview_core::MeshGeometry;

    /// Root with two unit cubes at +-2 on X
    fn pair_scene() -> (SceneGraph, NodeId, NodeId, NodeId) {
        let mut scene = SceneGraph::new();
        let root = scene.spawn("root");
        let left = scene
            .spawn_child(root, "left", Transform::from_position(Vec3::new(-2.0, 0.0, 0.0)))
            .unwrap();
        let right = scene
            .spawn_child(root, "right", Transform::from_position(Vec3::new(2.0, 0.0, 0.0)))
            .unwrap();
        for id in [left, right] {
            scene.get_node_mut(id).unwrap().mesh = Some(MeshGeometry::cuboid(Vec3::ONE));
        }
        scene.update_transforms();
        (scene, root, left, right)
    }

    #[test]
    fn test_frame_and_parts() {
        let (mut scene, root, left, right) = pair_scene();
        let engine = ExplosionEngine::new(&mut scene, root, ExplosionConfig::default());

        assert_eq!(engine.parts(), &[left, right]);
        assert_eq!(engine.assembly_center(), Vec3::ZERO);
        // bounds 5 x 1 x 1
        assert_abs_diff_eq!(engine.assembly_radius(), (6.25f32 + 0.25 + 0.25).sqrt(), epsilon = 1e-5);
        assert_eq!(engine.direction_of(left), Some(Vec3::NEG_X));
        assert_eq!(engine.direction_of(root), None);
        assert!(engine.original_of(root).is_some());
    }

    #[test]
    fn test_radial_moves_parts_apart() {
        let (mut scene, root, left, right) = pair_scene();
        let mut engine = ExplosionEngine::new(&mut scene, root, ExplosionConfig::default());
        engine.set_progress(&mut scene, 1.0);

        let travel = engine.assembly_radius() * 1.5;
        let right_x = scene.get_node(right).unwrap().world_position().x;
        let left_x = scene.get_node(left).unwrap().world_position().x;
        assert_abs_diff_eq!(right_x, 2.0 + travel, epsilon = 1e-4);
        assert_abs_diff_eq!(left_x, -2.0 - travel, epsilon = 1e-4);
        assert_abs_diff_eq!(engine.offset_of(right).unwrap().x, travel, epsilon = 1e-4);
    }

    #[test]
    fn test_setters_clamp() {
        let (mut scene, root, ..) = pair_scene();
        let mut engine = ExplosionEngine::new(&mut scene, root, ExplosionConfig::default());

        engine.set_progress(&mut scene, 3.0);
        assert_eq!(engine.progress(), 1.0);
        engine.set_progress(&mut scene, -1.0);
        assert_eq!(engine.progress(), 0.0);
        engine.set_progress(&mut scene, f32::NAN);
        assert_eq!(engine.progress(), 0.0);

        engine.set_multiplier(&mut scene, 0.0);
        assert_eq!(engine.multiplier(), 0.1);
        engine.set_multiplier(&mut scene, 50.0);
        assert_eq!(engine.multiplier(), 5.0);
    }

    #[test]
    fn test_axial_vector_is_normalized_and_zero_ignored() {
        let (mut scene, root, ..) = pair_scene();
        let mut engine = ExplosionEngine::new(&mut scene, root, ExplosionConfig::default());

        engine.set_axial_vector(&mut scene, Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(engine.axial_vector(), Vec3::Z);
        engine.set_axial_vector(&mut scene, Vec3::ZERO);
        assert_eq!(engine.axial_vector(), Vec3::Z);
    }

    #[test]
    fn test_axial_mode_spreads_along_axis() {
        let (mut scene, root, left, right) = pair_scene();
        let mut engine = ExplosionEngine::new(&mut scene, root, ExplosionConfig::default());
        engine.set_mode(&mut scene, ExplosionMode::Axial);
        engine.set_axial_vector(&mut scene, Vec3::X);
        engine.set_progress(&mut scene, 1.0);

        // projection = 2 / 5
        let expected = 0.4 * engine.assembly_radius() * 1.5;
        assert_abs_diff_eq!(engine.offset_of(right).unwrap().x, expected, epsilon = 1e-4);
        assert_abs_diff_eq!(engine.offset_of(left).unwrap().x, -expected, epsilon = 1e-4);
    }

    #[test]
    fn test_custom_strategy_and_degenerate_output() {
        fn always_up(_: &PartContext<'_>, _: Vec3) -> Vec3 {
            Vec3::new(0.0, 10.0, 0.0)
        }
        fn broken(_: &PartContext<'_>, _: Vec3) -> Vec3 {
            Vec3::NAN
        }

        let (mut scene, root, left, _) = pair_scene();
        let mut engine =
            ExplosionEngine::with_strategy(&mut scene, root, ExplosionConfig::default(), always_up);
        assert_eq!(engine.direction_of(left), Some(Vec3::Y));

        engine.set_direction_strategy(&mut scene, broken);
        let direction = engine.direction_of(left).unwrap();
        assert!(direction.is_finite());
        assert_abs_diff_eq!(direction.length(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_missing_root_builds_empty_engine() {
        let mut scene = SceneGraph::new();
        let mut engine =
            ExplosionEngine::new(&mut scene, NodeId::new(42, 0), ExplosionConfig::default());
        assert!(engine.parts().is_empty());
        assert_eq!(engine.assembly_radius(), 1.0);
        engine.set_progress(&mut scene, 1.0);
        assert_eq!(engine.progress(), 1.0);
    }

    #[test]
    fn test_invisible_parts_are_not_exploded() {
        let (mut scene, root, left, right) = pair_scene();
        scene.get_node_mut(left).unwrap().visible = false;
        let engine = ExplosionEngine::new(&mut scene, root, ExplosionConfig::default());
        assert_eq!(engine.parts(), &[right]);
        assert!(engine.original_of(left).is_none());
    }

    #[test]
    fn test_dispose_restores_and_goes_inert() {
        let (mut scene, root, _, right) = pair_scene();
        let mut engine = ExplosionEngine::new(&mut scene, root, ExplosionConfig::default());
        engine.set_progress(&mut scene, 0.8);
        engine.dispose(&mut scene);

        assert_eq!(
            scene.get_node(right).unwrap().local_transform.position,
            Vec3::new(2.0, 0.0, 0.0)
        );
        assert!(engine.parts().is_empty());
        assert_eq!(engine.root(), None);

        engine.set_progress(&mut scene, 1.0);
        assert_eq!(
            scene.get_node(right).unwrap().local_transform.position,
            Vec3::new(2.0, 0.0, 0.0)
        );
    }
}
