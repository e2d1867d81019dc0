//! Math utilities
//!
//! Bounds, spheres and rays shared by the engines.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create an empty AABB
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create an AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest AABB containing every point, `EMPTY` for no points
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        let mut result = Self::EMPTY;
        for point in points {
            result.expand_to_include(point);
        }
        result
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the half-extents of the AABB
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Get the full size of the AABB
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Volume enclosed by the box, zero when empty
    pub fn volume(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let size = self.size();
        size.x * size.y * size.z
    }

    /// Full width of the box measured along `axis`
    pub fn extent_along(&self, axis: Vec3) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        self.size().dot(axis.abs())
    }

    /// Check if the AABB is empty
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Check if a point is inside the AABB (boundary inclusive)
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Expand the AABB to include a point
    pub fn expand_to_include(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Grow every side by `fraction` of the box size.
    ///
    /// Degenerate axes (zero size) grow by `fraction` of the largest axis, or by
    /// `fraction` itself for a single point, so the result always has volume.
    pub fn padded(&self, fraction: f32) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        let size = self.size();
        let largest = size.max_element();
        let fallback = if largest > 0.0 { largest * fraction } else { fraction };
        let pad = Vec3::new(
            if size.x > 0.0 { size.x * fraction } else { fallback },
            if size.y > 0.0 { size.y * fraction } else { fallback },
            if size.z > 0.0 { size.z * fraction } else { fallback },
        );
        Aabb {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    /// Bounds of the octant selected by the low three bits of `index`
    ///
    /// Octants follow Morton order: bit 0 = +x, bit 1 = +y, bit 2 = +z.
    pub fn octant(&self, index: usize) -> Aabb {
        let center = self.center();
        let pick = |bit: usize, lo: f32, mid: f32, hi: f32| {
            if index & bit != 0 { (mid, hi) } else { (lo, mid) }
        };
        let (x0, x1) = pick(1, self.min.x, center.x, self.max.x);
        let (y0, y1) = pick(2, self.min.y, center.y, self.max.y);
        let (z0, z1) = pick(4, self.min.z, center.z, self.max.z);
        Aabb::new(Vec3::new(x0, y0, z0), Vec3::new(x1, y1, z1))
    }

    /// Merge with another AABB
    pub fn merge(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Transform the AABB by a matrix
    pub fn transform(&self, matrix: Mat4) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];

        let mut result = Aabb::EMPTY;
        for corner in corners {
            let transformed = matrix.transform_point3(corner);
            result.expand_to_include(transformed);
        }
        result
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Bounding sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// Center of the sphere
    pub center: Vec3,
    /// Radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Create a new bounding sphere
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if a point is inside the sphere
    pub fn contains_point(&self, point: Vec3) -> bool {
        (point - self.center).length_squared() <= self.radius * self.radius
    }

    /// Check if this sphere intersects an AABB
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        // Closest point on the box to the sphere center
        let closest = self.center.clamp(aabb.min, aabb.max);
        self.contains_point(closest)
    }

    /// Create a bounding sphere from an AABB
    pub fn from_aabb(aabb: &Aabb) -> Self {
        if aabb.is_empty() {
            return Self::new(Vec3::ZERO, 0.0);
        }
        Self {
            center: aabb.center(),
            radius: aabb.half_extents().length(),
        }
    }
}

/// Ray for raycasting
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin
    pub origin: Vec3,
    /// Ray direction (normalized)
    pub direction: Vec3,
}

/// Closest-approach result between a ray and a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentApproach {
    /// Point on the segment
    pub on_segment: Vec3,
    /// Point on the ray
    pub on_ray: Vec3,
    /// Squared distance between the two points
    pub distance_squared: f32,
}

impl Ray {
    /// Create a new ray
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Point on the ray nearest to `point` (never behind the origin)
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let t = (point - self.origin).dot(self.direction).max(0.0);
        self.at(t)
    }

    /// Intersect with an AABB, returns (t_min, t_max) if hit
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<(f32, f32)> {
        let inv_dir = Vec3::new(
            1.0 / self.direction.x,
            1.0 / self.direction.y,
            1.0 / self.direction.z,
        );

        let t1 = (aabb.min - self.origin) * inv_dir;
        let t2 = (aabb.max - self.origin) * inv_dir;

        let t_min = t1.min(t2);
        let t_max = t1.max(t2);

        let t_enter = t_min.x.max(t_min.y).max(t_min.z);
        let t_exit = t_max.x.min(t_max.y).min(t_max.z);

        if t_enter <= t_exit && t_exit >= 0.0 {
            Some((t_enter.max(0.0), t_exit))
        } else {
            None
        }
    }

    /// Intersect with a triangle (Möller–Trumbore), returns the hit distance
    pub fn intersect_triangle(&self, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
        const EPSILON: f32 = 1e-7;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let h = self.direction.cross(edge2);
        let a = edge1.dot(h);

        if a.abs() < EPSILON {
            return None; // Parallel to the triangle plane
        }

        let f = 1.0 / a;
        let s = self.origin - v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * self.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if t > EPSILON { Some(t) } else { None }
    }

    /// Closest points between the ray and the segment `start..end`
    pub fn closest_to_segment(&self, start: Vec3, end: Vec3) -> SegmentApproach {
        let seg = end - start;
        let seg_len_sq = seg.length_squared();
        let w0 = self.origin - start;

        // Degenerate segment collapses to a point query
        if seg_len_sq <= f32::EPSILON {
            let on_ray = self.closest_point(start);
            return SegmentApproach {
                on_segment: start,
                on_ray,
                distance_squared: on_ray.distance_squared(start),
            };
        }

        let b = self.direction.dot(seg);
        let d = self.direction.dot(w0);
        let e = seg.dot(w0);
        let denom = seg_len_sq - b * b;

        let mut s = if denom.abs() > f32::EPSILON {
            ((e - b * d) / denom).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mut t = b * s - d;
        if t < 0.0 {
            t = 0.0;
            s = (e / seg_len_sq).clamp(0.0, 1.0);
        }

        let on_ray = self.at(t);
        let on_segment = start + seg * s;
        SegmentApproach {
            on_segment,
            on_ray,
            distance_squared: on_ray.distance_squared(on_segment),
        }
    }
}
