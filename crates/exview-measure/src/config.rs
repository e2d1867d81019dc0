//! Measurement configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::format::UnitMode;
use crate::snap::SnapKind;

/// Snap kinds in the order they are tried
pub type SnapPriority = SmallVec<[SnapKind; 4]>;

/// Measurement engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementConfig {
    /// Snap kinds tried in order; the first hit wins
    pub snap_priority: SnapPriority,
    /// Maximum on-screen distance in pixels between cursor and snap candidate
    pub pixel_threshold: f32,
    /// Vertex search radius as a fraction of the eye's distance to the origin
    pub vertex_search_factor: f32,
    /// Pointer travel in pixels between press and release that makes a click a drag
    pub drag_threshold: f32,
    /// Minimum time between live preview label refreshes
    pub preview_interval: Duration,
    /// Points per octree leaf before it splits
    pub octree_capacity: usize,
    pub octree_max_depth: u32,
    /// Octree bounds grow by this fraction of their size on every side
    pub bounds_padding: f32,
    pub unit: UnitMode,
    /// On-screen scale of the assembly; world distances are divided by it
    pub visual_scale: f32,
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            snap_priority: SmallVec::from_slice(&[SnapKind::Vertex, SnapKind::Edge, SnapKind::Face]),
            pixel_threshold: 12.0,
            vertex_search_factor: 0.1,
            drag_threshold: 5.0,
            preview_interval: Duration::from_millis(100),
            octree_capacity: 8,
            octree_max_depth: 8,
            bounds_padding: 0.01,
            unit: UnitMode::Auto,
            visual_scale: 1.0,
        }
    }
}

impl MeasurementConfig {
    /// Set the snap priority
    pub fn with_snap_priority(mut self, priority: &[SnapKind]) -> Self {
        if let Some(priority) = normalize_priority(priority) {
            self.snap_priority = priority;
        }
        self
    }

    /// Set the pixel threshold
    pub fn with_pixel_threshold(mut self, pixels: f32) -> Self {
        self.pixel_threshold = clamp_or(pixels, 1.0, 200.0, self.pixel_threshold);
        self
    }

    /// Set the display unit mode
    pub fn with_unit(mut self, unit: UnitMode) -> Self {
        self.unit = unit;
        self
    }

    /// Set the visual scale factor
    pub fn with_visual_scale(mut self, scale: f32) -> Self {
        self.visual_scale = clamp_visual_scale(scale).unwrap_or(self.visual_scale);
        self
    }

    /// Copy with every value clamped into its usable range
    pub fn sanitized(&self) -> Self {
        let mut clamped = Self::default();
        clamped.apply(&MeasurementConfigUpdate {
            snap_priority: Some(self.snap_priority.to_vec()),
            pixel_threshold: Some(self.pixel_threshold),
            vertex_search_factor: Some(self.vertex_search_factor),
            drag_threshold: Some(self.drag_threshold),
            preview_interval: Some(self.preview_interval),
            octree_capacity: Some(self.octree_capacity),
            octree_max_depth: Some(self.octree_max_depth),
            bounds_padding: Some(self.bounds_padding),
            unit: Some(self.unit),
            visual_scale: Some(self.visual_scale),
        });
        clamped
    }

    /// Apply a partial update, clamping every supplied value
    pub fn apply(&mut self, update: &MeasurementConfigUpdate) {
        if let Some(priority) = &update.snap_priority {
            match normalize_priority(priority) {
                Some(priority) => self.snap_priority = priority,
                None => log::warn!("Ignoring empty snap priority"),
            }
        }
        if let Some(v) = update.pixel_threshold {
            self.pixel_threshold = clamp_or(v, 1.0, 200.0, self.pixel_threshold);
        }
        if let Some(v) = update.vertex_search_factor {
            self.vertex_search_factor = clamp_or(v, 0.001, 10.0, self.vertex_search_factor);
        }
        if let Some(v) = update.drag_threshold {
            self.drag_threshold = clamp_or(v, 0.0, 100.0, self.drag_threshold);
        }
        if let Some(v) = update.preview_interval {
            self.preview_interval = v.min(Duration::from_secs(10));
        }
        if let Some(v) = update.octree_capacity {
            self.octree_capacity = v.clamp(1, 1024);
        }
        if let Some(v) = update.octree_max_depth {
            self.octree_max_depth = v.clamp(1, 16);
        }
        if let Some(v) = update.bounds_padding {
            self.bounds_padding = clamp_or(v, 0.0, 1.0, self.bounds_padding);
        }
        if let Some(v) = update.unit {
            self.unit = v;
        }
        if let Some(v) = update.visual_scale {
            self.visual_scale = clamp_visual_scale(v).unwrap_or(self.visual_scale);
        }
    }
}

/// Partial update for [`MeasurementConfig`]; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementConfigUpdate {
    pub snap_priority: Option<Vec<SnapKind>>,
    pub pixel_threshold: Option<f32>,
    pub vertex_search_factor: Option<f32>,
    pub drag_threshold: Option<f32>,
    pub preview_interval: Option<Duration>,
    pub octree_capacity: Option<usize>,
    pub octree_max_depth: Option<u32>,
    pub bounds_padding: Option<f32>,
    pub unit: Option<UnitMode>,
    pub visual_scale: Option<f32>,
}

/// Drop duplicates keeping first occurrence; `None` when nothing is left
pub(crate) fn normalize_priority(priority: &[SnapKind]) -> Option<SnapPriority> {
    let mut result = SnapPriority::new();
    for &kind in priority {
        if !result.contains(&kind) {
            result.push(kind);
        }
    }
    (!result.is_empty()).then_some(result)
}

pub(crate) fn clamp_visual_scale(scale: f32) -> Option<f32> {
    scale.is_finite().then(|| scale.clamp(1e-6, 1e6))
}

fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() { value.clamp(min, max) } else { fallback }
}
