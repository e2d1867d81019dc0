//! Snap structures and snap detection
//!
//! [`SnapStructures`] flattens an assembly into world-space vertices (in an
//! octree), unique triangle edges and hole edges. [`SnapDetector`] resolves a
//! cursor to the best vertex, edge, face or hole edge, trying kinds in the
//! caller's priority order.
//!
//! Structures are a snapshot: rebuild them after moving parts.

use std::fmt;
use std::str::FromStr;

use ahash::{AHashMap, AHashSet};
use exview_core::math::{Aabb, Ray};
use exview_core::{MeshGeometry, NodeId, SceneGraph, Viewport};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::{MeasureError, MeasureResult};
use crate::octree::{Octree, OctreeEntry, OctreeStats};

/// Geometric feature a cursor can snap to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapKind {
    Vertex,
    Edge,
    Face,
    /// Edge used by exactly one triangle
    HoleEdge,
}

impl SnapKind {
    pub const ALL: [SnapKind; 4] = [SnapKind::Vertex, SnapKind::Edge, SnapKind::Face, SnapKind::HoleEdge];

    /// Vertex and edge snaps land on real geometry; face and hole-edge
    /// snaps are approximations of the feature being measured
    pub fn is_exact(self) -> bool {
        matches!(self, SnapKind::Vertex | SnapKind::Edge)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SnapKind::Vertex => "vertex",
            SnapKind::Edge => "edge",
            SnapKind::Face => "face",
            SnapKind::HoleEdge => "hole_edge",
        }
    }
}

impl fmt::Display for SnapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SnapKind {
    type Err = MeasureError;

    fn from_str(s: &str) -> MeasureResult<Self> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        SnapKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == key)
            .ok_or_else(|| MeasureError::UnknownSnapKind(s.to_string()))
    }
}

/// What a snap landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapTarget {
    Vertex { node: NodeId, vertex: u32 },
    /// Index into [`SnapStructures::edges`]
    Edge { node: NodeId, edge: usize },
    Face { node: NodeId, triangle: usize },
    /// Index into [`SnapStructures::hole_edges`]
    HoleEdge { node: NodeId, edge: usize },
}

impl SnapTarget {
    /// Mesh node owning the feature
    pub fn node(&self) -> NodeId {
        match *self {
            SnapTarget::Vertex { node, .. }
            | SnapTarget::Edge { node, .. }
            | SnapTarget::Face { node, .. }
            | SnapTarget::HoleEdge { node, .. } => node,
        }
    }
}

/// A resolved snap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// World-space point
    pub position: Vec3,
    pub kind: SnapKind,
    pub target: SnapTarget,
    /// Distance from the ray origin
    pub distance: f32,
}

/// World-space triangle edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub start: Vec3,
    pub end: Vec3,
    pub node: NodeId,
}

/// Payload stored with every octree point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexRef {
    pub node: NodeId,
    pub vertex: u32,
}

#[derive(Debug, Clone)]
struct MeshSnapData {
    node: NodeId,
    positions: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    bounds: Aabb,
}

/// Spatial snapshot of an assembly's geometry
#[derive(Debug, Clone, Default)]
pub struct SnapStructures {
    octree: Option<Octree<VertexRef>>,
    edges: Vec<Edge>,
    hole_edges: Vec<Edge>,
    meshes: Vec<MeshSnapData>,
}

impl SnapStructures {
    /// Collect every mesh under `root`, visible or not. Visibility is checked
    /// when snapping.
    pub fn build(
        scene: &SceneGraph,
        root: NodeId,
        padding: f32,
        octree_capacity: usize,
        octree_max_depth: u32,
    ) -> Self {
        let _span = tracing::debug_span!("build_snap_structures", root = %root).entered();

        let mut structures = Self::default();
        let mut vertices = Vec::new();

        let nodes = std::iter::once(root).chain(scene.descendants(root));
        for id in nodes {
            let Some(node) = scene.get_node(id) else {
                continue;
            };
            let Some(mesh) = &node.mesh else {
                continue;
            };
            let matrix = node.world_matrix();
            let positions: Vec<Vec3> = mesh.positions.iter().map(|&p| matrix.transform_point3(p)).collect();
            let triangles = welded_triangles(mesh);

            let (edges, holes) = unique_edges(&triangles);
            let edge = |&(a, b): &(u32, u32)| Edge {
                start: positions[a as usize],
                end: positions[b as usize],
                node: id,
            };
            structures.edges.extend(edges.iter().map(edge));
            structures.hole_edges.extend(holes.iter().map(edge));

            vertices.extend(positions.iter().enumerate().map(|(i, &position)| OctreeEntry {
                position,
                data: VertexRef {
                    node: id,
                    vertex: i as u32,
                },
            }));

            structures.meshes.push(MeshSnapData {
                node: id,
                bounds: Aabb::from_points(positions.iter().copied()),
                positions,
                triangles,
            });
        }

        if !vertices.is_empty() {
            structures.octree = Some(Octree::from_entries(vertices, padding, octree_capacity, octree_max_depth));
        }

        log::debug!(
            "Snap structures built: {} meshes, {} vertices, {} edges, {} hole edges",
            structures.meshes.len(),
            structures.vertex_count(),
            structures.edges.len(),
            structures.hole_edges.len()
        );
        structures
    }

    pub fn is_empty(&self) -> bool {
        self.octree.is_none()
    }

    pub fn vertex_count(&self) -> usize {
        self.octree.as_ref().map_or(0, |o| o.len())
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn hole_edge_count(&self) -> usize {
        self.hole_edges.len()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn hole_edges(&self) -> &[Edge] {
        &self.hole_edges
    }

    pub fn octree(&self) -> Option<&Octree<VertexRef>> {
        self.octree.as_ref()
    }

    pub fn octree_stats(&self) -> OctreeStats {
        self.octree.as_ref().map(|o| o.stats()).unwrap_or_default()
    }
}

/// Triangles with non-indexed vertices merged by exact position, so that
/// neighbouring triangles share edge keys
fn welded_triangles(mesh: &MeshGeometry) -> Vec<[u32; 3]> {
    if mesh.indices.is_some() {
        return mesh.triangles_iter().collect();
    }

    let mut canonical: AHashMap<[u32; 3], u32> = AHashMap::new();
    let remap: Vec<u32> = mesh
        .positions
        .iter()
        .enumerate()
        .map(|(i, p)| *canonical.entry(p.to_array().map(f32::to_bits)).or_insert(i as u32))
        .collect();

    mesh.triangles_iter()
        .map(|tri| tri.map(|v| remap[v as usize]))
        .collect()
}

/// Unique undirected edges in first-seen order, and the subset used by
/// exactly one triangle
fn unique_edges(triangles: &[[u32; 3]]) -> (Vec<(u32, u32)>, Vec<(u32, u32)>) {
    let mut counts: AHashMap<(u32, u32), u32> = AHashMap::new();
    let mut order = Vec::new();

    for &[a, b, c] in triangles {
        for (u, v) in [(a, b), (b, c), (c, a)] {
            if u == v {
                continue;
            }
            let key = (u.min(v), u.max(v));
            let count = counts.entry(key).or_insert(0);
            if *count == 0 {
                order.push(key);
            }
            *count += 1;
        }
    }

    let holes = order.iter().copied().filter(|key| counts.get(key) == Some(&1)).collect();
    (order, holes)
}

/// Upper bound on sphere queries along one cursor ray
const MAX_RAY_SAMPLES: usize = 64;

/// Resolves cursor positions against a set of snap structures
pub struct SnapDetector<'a, V: Viewport + ?Sized> {
    structures: &'a SnapStructures,
    scene: &'a SceneGraph,
    viewport: &'a V,
    /// Maximum cursor distance in pixels
    pub pixel_threshold: f32,
    /// Vertex search radius as a fraction of the eye's distance to the origin
    pub vertex_search_factor: f32,
    visible: AHashSet<NodeId>,
}

impl<'a, V: Viewport + ?Sized> SnapDetector<'a, V> {
    pub fn new(structures: &'a SnapStructures, scene: &'a SceneGraph, viewport: &'a V) -> Self {
        let visible = structures
            .meshes
            .iter()
            .map(|m| m.node)
            .filter(|&id| scene.is_visible_in_hierarchy(id))
            .collect();
        Self {
            structures,
            scene,
            viewport,
            pixel_threshold: 12.0,
            vertex_search_factor: 0.1,
            visible,
        }
    }

    /// Set both thresholds
    pub fn with_thresholds(mut self, pixel_threshold: f32, vertex_search_factor: f32) -> Self {
        self.pixel_threshold = pixel_threshold;
        self.vertex_search_factor = vertex_search_factor;
        self
    }

    pub fn scene(&self) -> &SceneGraph {
        self.scene
    }

    fn is_visible(&self, node: NodeId) -> bool {
        self.visible.contains(&node)
    }

    /// First hit in `priority` order
    pub fn detect(&self, cursor: Vec2, priority: &[SnapKind]) -> Option<SnapResult> {
        if self.structures.is_empty() {
            return None;
        }
        let hit = priority.iter().find_map(|&kind| self.detect_kind(cursor, kind));
        log::trace!("Snap at {:?}: {:?}", cursor, hit.map(|h| h.kind));
        hit
    }

    pub fn detect_kind(&self, cursor: Vec2, kind: SnapKind) -> Option<SnapResult> {
        match kind {
            SnapKind::Vertex => self.snap_vertex(cursor),
            SnapKind::Edge => self.snap_edge(cursor, SnapKind::Edge),
            SnapKind::Face => self.snap_face(cursor),
            SnapKind::HoleEdge => self.snap_edge(cursor, SnapKind::HoleEdge),
        }
    }

    /// Pixel distance from the cursor to a world point, `None` behind the eye
    fn screen_distance(&self, cursor: Vec2, point: Vec3) -> Option<f32> {
        let ndc = self.viewport.project(point)?;
        Some(self.viewport.pixel_distance(cursor, ndc))
    }

    /// Nearest on-screen vertex around the cursor ray.
    ///
    /// The ray is sampled across the octree bounds grown by the search
    /// radius, up to just past the
    /// surface hit when there is one, and each sample queries a sphere of
    /// `vertex_search_factor · |eye|`. Every vertex found is then judged by
    /// its projected distance to the cursor.
    pub fn snap_vertex(&self, cursor: Vec2) -> Option<SnapResult> {
        let octree = self.structures.octree.as_ref()?;
        let ray = self.viewport.ray(cursor);
        let bounds = octree.bounds();

        let mut radius = self.vertex_search_factor * self.viewport.eye().length();
        if radius <= f32::EPSILON {
            radius = bounds.half_extents().length() * self.vertex_search_factor;
        }
        // Silhouette vertices sit on the bounds, so a cursor just outside them
        // still has to reach the search
        let reach = Aabb::new(bounds.min - Vec3::splat(radius), bounds.max + Vec3::splat(radius));
        let (t_enter, mut t_exit) = ray.intersect_aabb(&reach)?;
        if let Some(hit) = self.snap_face(cursor) {
            t_exit = t_exit.min(hit.distance + radius);
        }

        // Spheres spaced one radius apart cover the whole span
        let span = (t_exit - t_enter).max(0.0);
        let steps = ((span / radius).ceil() as usize).clamp(1, MAX_RAY_SAMPLES);
        let step = span / steps as f32;
        let radius = radius.max(step);

        let mut seen: AHashSet<VertexRef> = AHashSet::new();
        let mut best: Option<(f32, SnapResult)> = None;
        for i in 0..=steps {
            let center = ray.at(t_enter + step * i as f32);
            for neighbor in octree.find_nearest(center, radius) {
                let vertex = neighbor.entry.data;
                if !seen.insert(vertex) || !self.is_visible(vertex.node) {
                    continue;
                }
                let position = neighbor.entry.position;
                let Some(pixels) = self.screen_distance(cursor, position) else {
                    continue;
                };
                let distance = ray.origin.distance(position);
                // Ties go to the vertex nearer the eye
                let better = best.is_none_or(|(b, hit)| pixels < b || (pixels == b && distance < hit.distance));
                if pixels > self.pixel_threshold || !better {
                    continue;
                }
                best = Some((
                    pixels,
                    SnapResult {
                        position,
                        kind: SnapKind::Vertex,
                        target: SnapTarget::Vertex {
                            node: vertex.node,
                            vertex: vertex.vertex,
                        },
                        distance,
                    },
                ));
            }
        }
        best.map(|(_, hit)| hit)
    }

    /// Closest on-screen point on any visible edge (or hole edge)
    pub fn snap_edge(&self, cursor: Vec2, kind: SnapKind) -> Option<SnapResult> {
        let edges = match kind {
            SnapKind::HoleEdge => &self.structures.hole_edges,
            _ => &self.structures.edges,
        };
        let ray = self.viewport.ray(cursor);

        let mut best: Option<(f32, SnapResult)> = None;
        for (index, edge) in edges.iter().enumerate() {
            if !self.is_visible(edge.node) {
                continue;
            }
            let position = ray.closest_to_segment(edge.start, edge.end).on_segment;
            let Some(pixels) = self.screen_distance(cursor, position) else {
                continue;
            };
            if pixels > self.pixel_threshold || best.is_some_and(|(b, _)| pixels >= b) {
                continue;
            }
            let target = match kind {
                SnapKind::HoleEdge => SnapTarget::HoleEdge { node: edge.node, edge: index },
                _ => SnapTarget::Edge { node: edge.node, edge: index },
            };
            best = Some((
                pixels,
                SnapResult {
                    position,
                    kind: if kind == SnapKind::HoleEdge { SnapKind::HoleEdge } else { SnapKind::Edge },
                    target,
                    distance: ray.origin.distance(position),
                },
            ));
        }
        best.map(|(_, hit)| hit)
    }

    /// Nearest ray/triangle hit over all visible meshes
    pub fn snap_face(&self, cursor: Vec2) -> Option<SnapResult> {
        let ray = self.viewport.ray(cursor);
        let mut best: Option<SnapResult> = None;

        for mesh in &self.structures.meshes {
            if !self.is_visible(mesh.node) || ray.intersect_aabb(&mesh.bounds).is_none() {
                continue;
            }
            for (index, tri) in mesh.triangles.iter().enumerate() {
                let Some(t) = intersect(&ray, &mesh.positions, tri) else {
                    continue;
                };
                if best.is_some_and(|b| t >= b.distance) {
                    continue;
                }
                best = Some(SnapResult {
                    position: ray.at(t),
                    kind: SnapKind::Face,
                    target: SnapTarget::Face {
                        node: mesh.node,
                        triangle: index,
                    },
                    distance: t,
                });
            }
        }
        best
    }
}

fn intersect(ray: &Ray, positions: &[Vec3], tri: &[u32; 3]) -> Option<f32> {
    let v0 = *positions.get(tri[0] as usize)?;
    let v1 = *positions.get(tri[1] as usize)?;
    let v2 = *positions.get(tri[2] as usize)?;
    ray.intersect_triangle(v0, v1, v2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use exview_core::{PerspectiveCamera, Transform};

    /// Two triangles forming the unit square on z = 0, indexed
    fn quad() -> MeshGeometry {
        MeshGeometry::indexed(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    fn quad_scene(mesh: MeshGeometry) -> (SceneGraph, NodeId, NodeId) {
        let mut scene = SceneGraph::new();
        let root = scene.spawn("root");
        let part = scene.spawn_child(root, "quad", Transform::IDENTITY).unwrap();
        scene.get_node_mut(part).unwrap().mesh = Some(mesh);
        scene.update_transforms();
        (scene, root, part)
    }

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::looking_at(Vec3::new(0.5, 0.5, 3.0), Vec3::new(0.5, 0.5, 0.0))
            .with_viewport(800.0, 800.0)
    }

    #[test]
    fn test_edges_and_holes_of_quad() {
        let (scene, root, _) = quad_scene(quad());
        let structures = SnapStructures::build(&scene, root, 0.01, 8, 8);
        assert_eq!(structures.vertex_count(), 4);
        // 4 border + 1 diagonal
        assert_eq!(structures.edge_count(), 5);
        assert_eq!(structures.hole_edge_count(), 4);
    }

    #[test]
    fn test_non_indexed_meshes_are_welded() {
        let soup = MeshGeometry::triangles(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]);
        let (scene, root, _) = quad_scene(soup);
        let structures = SnapStructures::build(&scene, root, 0.01, 8, 8);
        assert_eq!(structures.vertex_count(), 6);
        assert_eq!(structures.edge_count(), 5);
        assert_eq!(structures.hole_edge_count(), 4);
    }

    #[test]
    fn test_closed_cube_has_no_hole_edges() {
        let (scene, root, _) = quad_scene(MeshGeometry::cuboid(Vec3::ONE));
        let structures = SnapStructures::build(&scene, root, 0.01, 8, 8);
        assert_eq!(structures.edge_count(), 18);
        assert_eq!(structures.hole_edge_count(), 0);
    }

    #[test]
    fn test_empty_structures_never_snap() {
        let scene = SceneGraph::new();
        let structures = SnapStructures::default();
        let camera = camera();
        let detector = SnapDetector::new(&structures, &scene, &camera);
        assert!(detector.detect(Vec2::ZERO, &SnapKind::ALL).is_none());
    }

    #[test]
    fn test_face_hit_inside_quad() {
        let (scene, root, part) = quad_scene(quad());
        let structures = SnapStructures::build(&scene, root, 0.01, 8, 8);
        let camera = camera();
        let detector = SnapDetector::new(&structures, &scene, &camera);

        let target = Vec3::new(0.3, 0.6, 0.0);
        let hit = detector.snap_face(camera.project(target).unwrap()).unwrap();
        assert_eq!(hit.kind, SnapKind::Face);
        assert_eq!(hit.target.node(), part);
        assert!((hit.position - target).length() < 1e-3);
        assert!((hit.distance - camera.position.distance(target)).abs() < 1e-3);
    }

    #[test]
    fn test_vertex_snap_near_corner() {
        let (scene, root, part) = quad_scene(quad());
        let structures = SnapStructures::build(&scene, root, 0.01, 8, 8);
        let camera = camera();
        let detector = SnapDetector::new(&structures, &scene, &camera);

        let corner = camera.project(Vec3::new(1.0, 1.0, 0.0)).unwrap();
        // A few pixels inside the quad, off the diagonal
        let cursor = corner - Vec2::new(0.004, 0.008);
        let hit = detector.detect(cursor, &[SnapKind::Vertex]).unwrap();
        assert_eq!(hit.position, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(hit.target, SnapTarget::Vertex { node: part, vertex: 2 });
    }

    #[test]
    fn test_vertex_snap_outside_silhouette_corners() {
        let mut scene = SceneGraph::new();
        let root = scene.spawn("root");
        let cube = scene.spawn_child(root, "cube", Transform::IDENTITY).unwrap();
        scene.get_node_mut(cube).unwrap().mesh = Some(MeshGeometry::cuboid(Vec3::splat(4.0)));
        scene.update_transforms();
        let structures = SnapStructures::build(&scene, root, 0.01, 8, 8);
        let camera = PerspectiveCamera::looking_at(Vec3::new(8.0, 6.0, 10.0), Vec3::ZERO).with_viewport(800.0, 800.0);
        let detector = SnapDetector::new(&structures, &scene, &camera);

        let center = camera.project(Vec3::ZERO).unwrap();
        for corner in [Vec3::new(-2.0, 2.0, -2.0), Vec3::new(2.0, -2.0, -2.0)] {
            let projected = camera.project(corner).unwrap();
            // 4 pixels outward, 400 pixels per NDC unit
            let cursor = projected + (projected - center).normalize() * 0.01;
            assert!(detector.snap_face(cursor).is_none());

            let hit = detector.detect(cursor, &[SnapKind::Vertex]).unwrap();
            assert_eq!(hit.position, corner);
            assert_eq!(hit.target.node(), cube);
        }
    }

    #[test]
    fn test_edge_snap_projects_onto_segment() {
        let (scene, root, _) = quad_scene(quad());
        let structures = SnapStructures::build(&scene, root, 0.01, 8, 8);
        let camera = camera();
        let detector = SnapDetector::new(&structures, &scene, &camera);

        let on_edge = camera.project(Vec3::new(0.5, 0.0, 0.0)).unwrap();
        let hit = detector.detect(on_edge + Vec2::new(0.0, 0.01), &[SnapKind::HoleEdge]).unwrap();
        assert_eq!(hit.kind, SnapKind::HoleEdge);
        assert!(hit.position.y.abs() < 1e-4);
        assert!((hit.position.x - 0.5).abs() < 0.02);
    }

    #[test]
    fn test_priority_order_wins() {
        let (scene, root, _) = quad_scene(quad());
        let structures = SnapStructures::build(&scene, root, 0.01, 8, 8);
        let camera = camera();
        let detector = SnapDetector::new(&structures, &scene, &camera);

        let corner = camera.project(Vec3::new(1.0, 1.0, 0.0)).unwrap() - Vec2::new(0.004, 0.008);
        let face_first = detector.detect(corner, &[SnapKind::Face, SnapKind::Vertex]).unwrap();
        assert_eq!(face_first.kind, SnapKind::Face);
        let vertex_first = detector.detect(corner, &[SnapKind::Vertex, SnapKind::Face]).unwrap();
        assert_eq!(vertex_first.kind, SnapKind::Vertex);
    }

    #[test]
    fn test_far_cursor_misses_vertex_and_border() {
        let (scene, root, _) = quad_scene(quad());
        let structures = SnapStructures::build(&scene, root, 0.01, 8, 8);
        let camera = camera();
        let detector = SnapDetector::new(&structures, &scene, &camera);

        // Well inside the quad, far from every vertex and border on screen
        let inside = camera.project(Vec3::new(0.35, 0.6, 0.0)).unwrap();
        assert!(detector.detect(inside, &[SnapKind::Vertex, SnapKind::HoleEdge]).is_none());
        let hit = detector.detect(inside, &[SnapKind::Vertex, SnapKind::HoleEdge, SnapKind::Face]);
        assert_eq!(hit.map(|h| h.kind), Some(SnapKind::Face));
    }

    #[test]
    fn test_hidden_ancestor_hides_geometry() {
        let (mut scene, root, _) = quad_scene(quad());
        let structures = SnapStructures::build(&scene, root, 0.01, 8, 8);
        scene.get_node_mut(root).unwrap().visible = false;
        let camera = camera();
        let detector = SnapDetector::new(&structures, &scene, &camera);
        assert!(detector.detect(Vec2::ZERO, &SnapKind::ALL).is_none());
    }

    #[test]
    fn test_snap_kind_parse() {
        assert_eq!("hole-edge".parse(), Ok(SnapKind::HoleEdge));
        assert_eq!("Vertex".parse(), Ok(SnapKind::Vertex));
        assert!(matches!("corner".parse::<SnapKind>(), Err(MeasureError::UnknownSnapKind(_))));
        assert!(SnapKind::Edge.is_exact());
        assert!(!SnapKind::HoleEdge.is_exact());
    }
}
