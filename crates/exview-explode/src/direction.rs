//! Explosion directions
//!
//! A [`DirectionStrategy`] maps a part to the unit vector it travels along.
//! Parts sitting on the assembly center have no meaningful outward vector, so
//! they get a pseudo-random direction derived from a hash of their name. The
//! hash is a pure function of the name, which keeps explosions identical
//! across runs and machines.

use std::f32::consts::TAU;

use exview_core::NodeId;
use glam::Vec3;

/// What a strategy knows about the part it is orienting
#[derive(Debug, Clone, Copy)]
pub struct PartContext<'a> {
    pub id: NodeId,
    pub name: &'a str,
    /// Original world position
    pub world_position: Vec3,
    /// Index among the parent's children
    pub sibling_index: usize,
}

impl PartContext<'_> {
    /// Deterministic direction for this part, see [`fallback_direction`]
    pub fn fallback(&self, sibling_perturbation: f32) -> Vec3 {
        if self.name.is_empty() {
            fallback_direction(&self.id.to_string(), self.sibling_index, sibling_perturbation)
        } else {
            fallback_direction(self.name, self.sibling_index, sibling_perturbation)
        }
    }
}

/// Chooses the direction a part explodes along.
///
/// The returned vector does not need to be normalized. A zero or non-finite
/// result is replaced by the part's fallback direction.
pub trait DirectionStrategy {
    fn direction(&self, part: &PartContext<'_>, assembly_center: Vec3) -> Vec3;
}

impl<F> DirectionStrategy for F
where
    F: Fn(&PartContext<'_>, Vec3) -> Vec3,
{
    fn direction(&self, part: &PartContext<'_>, assembly_center: Vec3) -> Vec3 {
        self(part, assembly_center)
    }
}

/// Default strategy: away from the assembly center
#[derive(Debug, Clone, Copy)]
pub struct CenterOutward {
    /// Offsets shorter than this count as "at the center"
    pub epsilon: f32,
    pub sibling_perturbation: f32,
}

impl Default for CenterOutward {
    fn default() -> Self {
        Self {
            epsilon: 1e-4,
            sibling_perturbation: 0.35,
        }
    }
}

impl DirectionStrategy for CenterOutward {
    fn direction(&self, part: &PartContext<'_>, assembly_center: Vec3) -> Vec3 {
        let outward = part.world_position - assembly_center;
        let length = outward.length();
        if length < self.epsilon || !length.is_finite() {
            part.fallback(self.sibling_perturbation)
        } else {
            outward / length
        }
    }
}

/// 32-bit string hash (`h = 31 * h + byte`, wrapping)
pub fn stable_hash(key: &str) -> u32 {
    key.bytes()
        .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(u32::from(b)))
}

/// Unit direction derived from `key`, rotated about +Z by
/// `sibling_index * sibling_perturbation` radians.
///
/// The low 16 bits of the hash pick the azimuth and the high 16 bits the
/// height, kept within 0.9 of the poles.
pub fn fallback_direction(key: &str, sibling_index: usize, sibling_perturbation: f32) -> Vec3 {
    let hash = stable_hash(key);
    let u = (hash & 0xFFFF) as f32 / 65535.0;
    let v = (hash >> 16) as f32 / 65535.0;

    let theta = u * TAU + sibling_index as f32 * sibling_perturbation;
    let z = (2.0 * v - 1.0) * 0.9;
    let r = (1.0 - z * z).sqrt();
    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}
