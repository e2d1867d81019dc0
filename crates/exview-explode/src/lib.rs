//! # Exview Explode
//!
//! Exploded-view transform engine for hierarchical mesh assemblies.
//!
//! ## Features
//! - One-time snapshot of every node's original transform
//! - Per-part explosion direction with a deterministic fallback for parts at the center
//! - Six displacement modes (radial, axial, normalized radial, size weighted,
//!   hierarchical, force field) behind a single dispatch function
//! - Writes results back as local positions so any parent transform is respected

pub mod direction;
pub mod engine;
pub mod mode;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use direction::{CenterOutward, DirectionStrategy, PartContext, fallback_direction, stable_hash};
pub use engine::{ExplosionEngine, ExplosionState, OriginalTransform};
pub use mode::{AssemblyFrame, Drive, ExplosionMode, PartAttributes};

/// Explosion engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExplodeError {
    #[error("Unknown explosion mode: {0}")]
    UnknownMode(String),
}

/// Result type for explosion operations
pub type ExplodeResult<T> = Result<T, ExplodeError>;

/// Valid range of the progress parameter
pub const PROGRESS_RANGE: (f32, f32) = (0.0, 1.0);

/// Valid range of the distance multiplier
pub const MULTIPLIER_RANGE: (f32, f32) = (0.1, 5.0);

/// Tunables of the explosion engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosionConfig {
    /// Full-progress travel as a fraction of the assembly radius
    pub max_distance_factor: f32,
    /// Size weight given to the smallest part
    pub size_weight_base: f32,
    /// Size weight added for the largest part
    pub size_weight_scale: f32,
    /// Depth weight given to direct children of the root
    pub depth_weight_base: f32,
    /// Depth weight added for the deepest parts
    pub depth_weight_scale: f32,
    /// Added to normalized radial distance in force-field mode
    pub force_field_offset: f32,
    /// Below this distance from the center a part uses the fallback direction
    pub center_epsilon: f32,
    /// Azimuth offset in radians applied per sibling index to fallback directions
    pub sibling_perturbation: f32,
}

impl Default for ExplosionConfig {
    fn default() -> Self {
        Self {
            max_distance_factor: 1.5,
            size_weight_base: 0.5,
            size_weight_scale: 1.0,
            depth_weight_base: 0.5,
            depth_weight_scale: 1.0,
            force_field_offset: 0.5,
            center_epsilon: 1e-4,
            sibling_perturbation: 0.35,
        }
    }
}

impl ExplosionConfig {
    /// Set the full-progress travel factor
    pub fn with_max_distance_factor(mut self, factor: f32) -> Self {
        self.max_distance_factor = factor;
        self
    }

    /// Set the force-field offset
    pub fn with_force_field_offset(mut self, offset: f32) -> Self {
        self.force_field_offset = offset;
        self
    }

    /// Copy with every value forced into a usable range
    pub fn sanitized(&self) -> Self {
        fn finite_or(value: f32, fallback: f32) -> f32 {
            if value.is_finite() { value } else { fallback }
        }
        let defaults = Self::default();
        Self {
            max_distance_factor: finite_or(self.max_distance_factor, defaults.max_distance_factor).max(0.0),
            size_weight_base: finite_or(self.size_weight_base, defaults.size_weight_base),
            size_weight_scale: finite_or(self.size_weight_scale, defaults.size_weight_scale),
            depth_weight_base: finite_or(self.depth_weight_base, defaults.depth_weight_base),
            depth_weight_scale: finite_or(self.depth_weight_scale, defaults.depth_weight_scale),
            force_field_offset: finite_or(self.force_field_offset, defaults.force_field_offset).max(1e-3),
            center_epsilon: finite_or(self.center_epsilon, defaults.center_epsilon).max(f32::EPSILON),
            sibling_perturbation: finite_or(self.sibling_perturbation, defaults.sibling_perturbation),
        }
    }
}
