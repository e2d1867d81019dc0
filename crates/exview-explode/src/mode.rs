//! Displacement modes
//!
//! All six formulas live in [`ExplosionMode::displacement`]. Every formula is
//! linear in `progress`, so zero progress yields a zero offset in every mode.

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{ExplodeError, ExplodeResult};

/// How a part's offset is derived from progress, multiplier and its attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplosionMode {
    /// Along the explosion direction, equal distance for every part
    #[default]
    Radial,
    /// Along one axis, proportional to the part's signed position on it
    Axial,
    /// Scales each part's offset from the center
    NormalizedRadial,
    /// Radial, larger parts travel further
    SizeWeighted,
    /// Radial, deeper parts travel further
    Hierarchical,
    /// Radial, decaying with distance from the center
    ForceField,
}

impl ExplosionMode {
    /// Every mode, in menu order
    pub const ALL: [ExplosionMode; 6] = [
        ExplosionMode::Radial,
        ExplosionMode::Axial,
        ExplosionMode::NormalizedRadial,
        ExplosionMode::SizeWeighted,
        ExplosionMode::Hierarchical,
        ExplosionMode::ForceField,
    ];

    /// Stable lowercase identifier
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Radial => "radial",
            Self::Axial => "axial",
            Self::NormalizedRadial => "normalized_radial",
            Self::SizeWeighted => "size_weighted",
            Self::Hierarchical => "hierarchical",
            Self::ForceField => "force_field",
        }
    }

    /// Human readable name
    pub fn label(self) -> &'static str {
        match self {
            Self::Radial => "Radial",
            Self::Axial => "Axial",
            Self::NormalizedRadial => "Normalized radial",
            Self::SizeWeighted => "Size weighted",
            Self::Hierarchical => "Hierarchical",
            Self::ForceField => "Force field",
        }
    }

    /// World-space offset of one part
    pub fn displacement(self, part: &PartAttributes, frame: &AssemblyFrame, drive: &Drive) -> Vec3 {
        let scale = drive.max_distance_factor * drive.progress * drive.multiplier;
        let base_distance = frame.radius * scale;

        match self {
            Self::Radial => part.direction * base_distance,
            Self::Axial => drive.axis * (part.axial_projection * base_distance),
            Self::NormalizedRadial => (part.original_position - frame.center) * scale,
            Self::SizeWeighted => part.direction * (base_distance * part.size_weight),
            Self::Hierarchical => part.direction * (base_distance * part.depth_weight),
            Self::ForceField => {
                // -grad of a log potential: strength falls off as 1 / (r + offset)
                let normalized = (part.original_position - frame.center).length() / frame.radius;
                part.direction * (base_distance / (normalized + drive.force_field_offset))
            }
        }
    }
}

impl fmt::Display for ExplosionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExplosionMode {
    type Err = ExplodeError;

    fn from_str(s: &str) -> ExplodeResult<Self> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == key)
            .ok_or_else(|| ExplodeError::UnknownMode(s.to_string()))
    }
}

/// Per-part inputs to the displacement formulas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartAttributes {
    /// Unit explosion direction
    pub direction: Vec3,
    /// Original world position
    pub original_position: Vec3,
    /// Signed position along the axial vector, normalized by assembly extent
    pub axial_projection: f32,
    /// Normalized volume weight
    pub size_weight: f32,
    /// Normalized hierarchy-depth weight
    pub depth_weight: f32,
}

/// Assembly-wide reference frame captured at construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssemblyFrame {
    /// Center of the assembly bounding box
    pub center: Vec3,
    /// Bounding-sphere radius, never zero
    pub radius: f32,
}

impl Default for AssemblyFrame {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            radius: 1.0,
        }
    }
}

/// User-driven parameters shared by all parts for one recomputation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drive {
    pub progress: f32,
    pub multiplier: f32,
    pub max_distance_factor: f32,
    pub force_field_offset: f32,
    /// Unit axis for axial mode
    pub axis: Vec3,
}
