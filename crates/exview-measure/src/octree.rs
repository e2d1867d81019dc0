//! Bounded point octree
//!
//! Leaves hold up to `capacity` points and split into eight Morton-ordered
//! children when they overflow, unless they already sit at `max_depth`.
//! Splits are never undone; rebuild the tree to shrink it.

use exview_core::math::{Aabb, BoundingSphere};
use glam::Vec3;

/// A stored point and its payload
#[derive(Debug, Clone, PartialEq)]
pub struct OctreeEntry<T> {
    pub position: Vec3,
    pub data: T,
}

/// A query hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<'a, T> {
    pub entry: &'a OctreeEntry<T>,
    pub distance: f32,
}

#[derive(Debug, Clone)]
enum OctreeCell<T> {
    Leaf {
        bounds: Aabb,
        points: Vec<OctreeEntry<T>>,
    },
    /// Children in Morton order, see [`Aabb::octant`]
    Branch {
        bounds: Aabb,
        children: Box<[OctreeCell<T>; 8]>,
    },
}

impl<T> OctreeCell<T> {
    fn leaf(bounds: Aabb) -> Self {
        OctreeCell::Leaf {
            bounds,
            points: Vec::new(),
        }
    }

    fn bounds(&self) -> &Aabb {
        match self {
            OctreeCell::Leaf { bounds, .. } | OctreeCell::Branch { bounds, .. } => bounds,
        }
    }

    fn insert(&mut self, entry: OctreeEntry<T>, depth: u32, capacity: usize, max_depth: u32) {
        match self {
            OctreeCell::Branch { bounds, children } => {
                let index = child_index(bounds, entry.position);
                children[index].insert(entry, depth + 1, capacity, max_depth);
            }
            OctreeCell::Leaf { bounds, points } => {
                points.push(entry);
                if points.len() <= capacity || depth >= max_depth {
                    return;
                }

                let bounds = *bounds;
                let overflow = std::mem::take(points);
                let mut children: Box<[OctreeCell<T>; 8]> =
                    Box::new(std::array::from_fn(|i| OctreeCell::leaf(bounds.octant(i))));
                for point in overflow {
                    let index = child_index(&bounds, point.position);
                    children[index].insert(point, depth + 1, capacity, max_depth);
                }
                *self = OctreeCell::Branch { bounds, children };
            }
        }
    }

    fn query<'a>(&'a self, sphere: &BoundingSphere, out: &mut Vec<Neighbor<'a, T>>) {
        if !sphere.intersects_aabb(self.bounds()) {
            return;
        }
        match self {
            OctreeCell::Leaf { points, .. } => {
                let radius_sq = sphere.radius * sphere.radius;
                for entry in points {
                    let distance_sq = entry.position.distance_squared(sphere.center);
                    if distance_sq <= radius_sq {
                        out.push(Neighbor {
                            entry,
                            distance: distance_sq.sqrt(),
                        });
                    }
                }
            }
            OctreeCell::Branch { children, .. } => {
                for child in children.iter() {
                    child.query(sphere, out);
                }
            }
        }
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a OctreeEntry<T>>) {
        match self {
            OctreeCell::Leaf { points, .. } => out.extend(points.iter()),
            OctreeCell::Branch { children, .. } => {
                for child in children.iter() {
                    child.collect(out);
                }
            }
        }
    }

    fn stats(&self, depth: u32, stats: &mut OctreeStats) {
        stats.cells += 1;
        stats.depth = stats.depth.max(depth);
        match self {
            OctreeCell::Leaf { points, .. } => {
                stats.leaves += 1;
                stats.largest_leaf = stats.largest_leaf.max(points.len());
            }
            OctreeCell::Branch { children, .. } => {
                for child in children.iter() {
                    child.stats(depth + 1, stats);
                }
            }
        }
    }
}

/// Morton index of the child of `bounds` that owns `point`.
/// Points on a split plane go to the upper child.
fn child_index(bounds: &Aabb, point: Vec3) -> usize {
    let center = bounds.center();
    usize::from(point.x >= center.x) | usize::from(point.y >= center.y) << 1 | usize::from(point.z >= center.z) << 2
}

/// Shape of a built tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OctreeStats {
    pub cells: usize,
    pub leaves: usize,
    /// Deepest cell, root is 0
    pub depth: u32,
    pub largest_leaf: usize,
}

/// Point octree over fixed bounds
#[derive(Debug, Clone)]
pub struct Octree<T> {
    root: OctreeCell<T>,
    capacity: usize,
    max_depth: u32,
    len: usize,
}

impl<T> Octree<T> {
    /// Default leaf capacity before a split
    pub const DEFAULT_CAPACITY: usize = 8;
    /// Default depth limit
    pub const DEFAULT_MAX_DEPTH: u32 = 8;

    /// Empty tree over `bounds`
    pub fn new(bounds: Aabb, capacity: usize, max_depth: u32) -> Self {
        Self {
            root: OctreeCell::leaf(bounds),
            capacity: capacity.max(1),
            max_depth,
            len: 0,
        }
    }

    /// Tree sized to the points, padded by `padding` of the bounds size on
    /// every side, with every point inserted
    pub fn from_entries(
        entries: Vec<OctreeEntry<T>>,
        padding: f32,
        capacity: usize,
        max_depth: u32,
    ) -> Self {
        let bounds = Aabb::from_points(entries.iter().map(|e| e.position)).padded(padding);
        let mut tree = Self::new(bounds, capacity, max_depth);
        for entry in entries {
            tree.insert(entry.position, entry.data);
        }
        tree
    }

    pub fn bounds(&self) -> &Aabb {
        self.root.bounds()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a point. Points outside the root bounds are dropped and
    /// `false` is returned.
    pub fn insert(&mut self, position: Vec3, data: T) -> bool {
        if !self.root.bounds().contains_point(position) {
            log::warn!("Dropping point {:?} outside octree bounds {:?}", position, self.root.bounds());
            return false;
        }
        self.root
            .insert(OctreeEntry { position, data }, 0, self.capacity, self.max_depth);
        self.len += 1;
        true
    }

    /// All points within `radius` of `center`, nearest first
    pub fn find_nearest(&self, center: Vec3, radius: f32) -> Vec<Neighbor<'_, T>> {
        let mut hits = Vec::new();
        if radius < 0.0 || !radius.is_finite() || self.is_empty() {
            return hits;
        }
        self.root.query(&BoundingSphere::new(center, radius), &mut hits);
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Every stored point, in cell order
    pub fn entries(&self) -> Vec<&OctreeEntry<T>> {
        let mut out = Vec::with_capacity(self.len);
        self.root.collect(&mut out);
        out
    }

    pub fn stats(&self) -> OctreeStats {
        let mut stats = OctreeStats::default();
        self.root.stats(0, &mut stats);
        stats
    }

    /// Drop every point, keeping the bounds
    pub fn clear(&mut self) {
        let bounds = *self.root.bounds();
        self.root = OctreeCell::leaf(bounds);
        self.len = 0;
    }
}
