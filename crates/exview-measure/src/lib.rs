//! # Exview Measure
//!
//! Snapping and two-point measurement over mesh assemblies.
//!
//! ## Features
//! - Octree over every world-space vertex for radius queries
//! - Vertex, edge, face and hole-edge snapping in a configurable priority order
//! - Millimeter/meter formatting with hysteresis around one meter
//! - Two-click measurement sessions with drag rejection and a throttled preview

pub mod config;
pub mod format;
pub mod octree;
pub mod session;
pub mod snap;

use thiserror::Error;

pub use config::{MeasurementConfig, MeasurementConfigUpdate, SnapPriority};
pub use format::{
    APPROXIMATE_MARKER, FormattedLength, LOWER_THRESHOLD_MM, LengthUnit, MeasurementFormatter, MeasurementKind,
    UPPER_THRESHOLD_MM, UnitMode,
};
pub use octree::{Neighbor, Octree, OctreeEntry, OctreeStats};
pub use session::{MeasurementEngine, MeasurementPhase, MeasurementPreview, MeasurementRecord, MeasurementStep};
pub use snap::{Edge, SnapDetector, SnapKind, SnapResult, SnapStructures, SnapTarget, VertexRef};

/// Measurement errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeasureError {
    #[error("Unknown snap kind: {0}")]
    UnknownSnapKind(String),

    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("Unknown measurement kind: {0}")]
    UnknownKind(String),
}

/// Result type for measurement operations
pub type MeasureResult<T> = Result<T, MeasureError>;
