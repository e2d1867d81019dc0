//! Measurement session
//!
//! Two accepted snaps make a measurement:
//!
//! ```text
//! Idle --snap--> FirstPointPlaced --snap--> (record) --> Idle
//! ```
//!
//! Pointer input goes through [`MeasurementEngine::pointer_down`] and
//! [`MeasurementEngine::pointer_up`]; a press and release further apart than
//! the drag threshold is a camera drag and places nothing. Hosts that pick
//! points themselves call [`MeasurementEngine::place_point`] directly.

use std::time::Instant;

use exview_core::{NodeId, SceneGraph, Throttle, Viewport};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::{MeasurementConfig, MeasurementConfigUpdate, clamp_visual_scale, normalize_priority};
use crate::format::{LengthUnit, MeasurementFormatter, MeasurementKind, UnitMode};
use crate::snap::{SnapDetector, SnapKind, SnapResult, SnapStructures};

/// Where the session is in the two-click flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MeasurementPhase {
    #[default]
    Idle,
    FirstPointPlaced,
}

/// A completed measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub id: u64,
    pub start: Vec3,
    pub end: Vec3,
    /// Distance in scene units
    pub world_distance: f32,
    /// Distance in meters after removing the visual scale
    pub physical_distance: f64,
    pub kind: MeasurementKind,
    pub unit: LengthUnit,
    /// Taken from a face or hole-edge snap
    pub approximate: bool,
    pub label: String,
}

/// Live preview while the second point is pending
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementPreview {
    pub start: Vec3,
    pub end: Vec3,
    pub world_distance: f32,
    /// Last refreshed label; refreshed at most once per preview interval
    pub label: String,
    /// Whether `label` was recomputed on this call
    pub label_refreshed: bool,
}

/// Outcome of an accepted point
#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementStep {
    /// First point stored; waiting for the second
    Started(SnapResult),
    /// Second point accepted; the record has been stored
    Completed(MeasurementRecord),
}

type StartCallback = Box<dyn FnMut(&SnapResult)>;
type SnapCallback = Box<dyn FnMut(Option<&SnapResult>)>;
type CompleteCallback = Box<dyn FnMut(&MeasurementRecord)>;

/// Two-point measurement engine over a snapshot of an assembly
pub struct MeasurementEngine {
    config: MeasurementConfig,
    enabled: bool,
    kind: MeasurementKind,
    structures: SnapStructures,
    formatter: MeasurementFormatter,
    phase: MeasurementPhase,
    first: Option<SnapResult>,
    press: Option<Vec2>,
    throttle: Throttle,
    preview_label: String,
    records: Vec<MeasurementRecord>,
    next_id: u64,
    on_start: Option<StartCallback>,
    on_snap: Option<SnapCallback>,
    on_complete: Option<CompleteCallback>,
}

impl MeasurementEngine {
    /// Create a disabled engine with no snap structures
    pub fn new(config: MeasurementConfig) -> Self {
        let config = config.sanitized();
        Self {
            formatter: MeasurementFormatter::new(config.unit),
            throttle: Throttle::new(config.preview_interval),
            config,
            enabled: false,
            kind: MeasurementKind::Linear,
            structures: SnapStructures::default(),
            phase: MeasurementPhase::Idle,
            first: None,
            press: None,
            preview_label: String::new(),
            records: Vec::new(),
            next_id: 1,
            on_start: None,
            on_snap: None,
            on_complete: None,
        }
    }

    pub fn config(&self) -> &MeasurementConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable_measurement(&mut self) {
        self.enabled = true;
        log::debug!("Measurement enabled");
    }

    /// Disable and drop any pending point
    pub fn disable_measurement(&mut self) {
        self.enabled = false;
        self.cancel();
        log::debug!("Measurement disabled");
    }

    /// Set the snap kinds to try, in order. Duplicates are dropped and an
    /// empty list is ignored.
    pub fn set_snap_mode(&mut self, priority: &[SnapKind]) {
        match normalize_priority(priority) {
            Some(priority) => self.config.snap_priority = priority,
            None => log::warn!("Ignoring empty snap priority"),
        }
    }

    /// Change the display unit and relabel every record
    pub fn set_unit(&mut self, unit: UnitMode) {
        self.config.unit = unit;
        self.formatter.set_mode(unit);
        self.relabel_records();
    }

    pub fn kind(&self) -> MeasurementKind {
        self.kind
    }

    /// Kind used for measurements completed from now on
    pub fn set_kind(&mut self, kind: MeasurementKind) {
        self.kind = kind;
    }

    /// Apply a partial config update
    pub fn update_config(&mut self, update: &MeasurementConfigUpdate) {
        let previous_unit = self.config.unit;
        let previous_scale = self.config.visual_scale;
        self.config.apply(update);

        self.throttle.set_interval(self.config.preview_interval);
        if self.config.unit != previous_unit {
            self.formatter.set_mode(self.config.unit);
        }
        if self.config.unit != previous_unit || self.config.visual_scale != previous_scale {
            self.relabel_records();
        }
    }

    pub fn visual_scale(&self) -> f32 {
        self.config.visual_scale
    }

    /// Set the on-screen scale of the assembly and re-derive every record's
    /// physical distance and label. Non-finite values are ignored.
    pub fn set_visual_scale(&mut self, scale: f32) {
        let Some(scale) = clamp_visual_scale(scale) else {
            log::warn!("Ignoring non-finite visual scale {}", scale);
            return;
        };
        self.config.visual_scale = scale;
        self.relabel_records();
    }

    /// Rebuild snap structures from the subtree at `root`
    pub fn build_snap_structures(&mut self, scene: &SceneGraph, root: NodeId) {
        self.structures = SnapStructures::build(
            scene,
            root,
            self.config.bounds_padding,
            self.config.octree_capacity,
            self.config.octree_max_depth,
        );
    }

    pub fn snap_structures(&self) -> &SnapStructures {
        &self.structures
    }

    /// Resolve a cursor (NDC) to a snap, `None` if nothing is close enough
    pub fn detect_snap<V: Viewport + ?Sized>(
        &self,
        scene: &SceneGraph,
        viewport: &V,
        cursor: Vec2,
    ) -> Option<SnapResult> {
        SnapDetector::new(&self.structures, scene, viewport)
            .with_thresholds(self.config.pixel_threshold, self.config.vertex_search_factor)
            .detect(cursor, &self.config.snap_priority)
    }

    pub fn phase(&self) -> MeasurementPhase {
        self.phase
    }

    /// First point of the measurement in progress
    pub fn pending_point(&self) -> Option<&SnapResult> {
        self.first.as_ref()
    }

    /// Record a press; the matching release decides whether it was a click
    pub fn pointer_down(&mut self, cursor: Vec2) {
        if self.enabled {
            self.press = Some(cursor);
        }
    }

    /// Finish a press. A release within the drag threshold snaps at the
    /// cursor and places the point.
    pub fn pointer_up<V: Viewport + ?Sized>(
        &mut self,
        scene: &SceneGraph,
        viewport: &V,
        cursor: Vec2,
    ) -> Option<MeasurementStep> {
        let press = self.press.take()?;
        if !self.enabled {
            return None;
        }
        let travel = viewport.pixel_distance(press, cursor);
        if travel > self.config.drag_threshold {
            log::debug!("Pointer travelled {:.1}px, treating as drag", travel);
            return None;
        }
        let snap = self.detect_snap(scene, viewport, cursor)?;
        self.place_point(snap)
    }

    /// Snap under the cursor and, with a point pending, a preview of the
    /// measurement. Geometry is recomputed on every call, the label only
    /// once per preview interval.
    pub fn pointer_move<V: Viewport + ?Sized>(
        &mut self,
        scene: &SceneGraph,
        viewport: &V,
        cursor: Vec2,
        now: Instant,
    ) -> Option<MeasurementPreview> {
        if !self.enabled {
            return None;
        }
        let snap = self.detect_snap(scene, viewport, cursor);
        if let Some(callback) = self.on_snap.as_mut() {
            callback(snap.as_ref());
        }

        let first = self.first?;
        let end = match snap {
            Some(hit) => hit.position,
            None => viewport.ray(cursor).closest_point(first.position),
        };
        let world_distance = first.position.distance(end);

        let label_refreshed = self.throttle.try_fire(now);
        if label_refreshed {
            let approximate = !first.kind.is_exact() || snap.is_some_and(|s| !s.kind.is_exact());
            self.preview_label = self
                .formatter
                .format(self.physical(world_distance), self.kind, approximate)
                .text;
        }

        Some(MeasurementPreview {
            start: first.position,
            end,
            world_distance,
            label: self.preview_label.clone(),
            label_refreshed,
        })
    }

    /// Accept a snap as the next point. Ignored while disabled.
    pub fn place_point(&mut self, snap: SnapResult) -> Option<MeasurementStep> {
        if !self.enabled {
            return None;
        }
        match self.first.take() {
            None => {
                self.first = Some(snap);
                self.phase = MeasurementPhase::FirstPointPlaced;
                self.throttle.reset();
                self.preview_label.clear();
                if let Some(callback) = self.on_start.as_mut() {
                    callback(&snap);
                }
                log::debug!("Measurement started at {:?} ({})", snap.position, snap.kind);
                Some(MeasurementStep::Started(snap))
            }
            Some(first) => {
                self.phase = MeasurementPhase::Idle;
                let record = self.finalize(first, snap);
                self.records.push(record.clone());
                if let Some(callback) = self.on_complete.as_mut() {
                    callback(&record);
                }
                log::debug!("Measurement {} completed: {}", record.id, record.label);
                Some(MeasurementStep::Completed(record))
            }
        }
    }

    /// Drop the pending point without touching completed records
    pub fn cancel(&mut self) {
        self.first = None;
        self.press = None;
        self.phase = MeasurementPhase::Idle;
        self.preview_label.clear();
        self.throttle.reset();
    }

    pub fn records(&self) -> &[MeasurementRecord] {
        &self.records
    }

    /// Remove one record; returns whether it existed
    pub fn delete_record(&mut self, id: u64) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }

    pub fn clear_records(&mut self) {
        self.records.clear();
    }

    pub fn on_measurement_start(&mut self, callback: impl FnMut(&SnapResult) + 'static) {
        self.on_start = Some(Box::new(callback));
    }

    pub fn on_snap_detected(&mut self, callback: impl FnMut(Option<&SnapResult>) + 'static) {
        self.on_snap = Some(Box::new(callback));
    }

    pub fn on_measurement_complete(&mut self, callback: impl FnMut(&MeasurementRecord) + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    /// Drop structures, records, callbacks and pending state; disable
    pub fn dispose(&mut self) {
        self.disable_measurement();
        self.structures = SnapStructures::default();
        self.records.clear();
        self.on_start = None;
        self.on_snap = None;
        self.on_complete = None;
        self.formatter.reset();
    }

    fn physical(&self, world_distance: f32) -> f64 {
        f64::from(world_distance) / f64::from(self.config.visual_scale)
    }

    fn finalize(&mut self, first: SnapResult, second: SnapResult) -> MeasurementRecord {
        let world_distance = first.position.distance(second.position);
        let physical_distance = self.physical(world_distance);
        let approximate = !first.kind.is_exact() || !second.kind.is_exact();
        let formatted = self.formatter.format(physical_distance, self.kind, approximate);

        let id = self.next_id;
        self.next_id += 1;
        MeasurementRecord {
            id,
            start: first.position,
            end: second.position,
            world_distance,
            physical_distance,
            kind: self.kind,
            unit: formatted.unit,
            approximate,
            label: formatted.text,
        }
    }

    /// Re-derive physical distance, unit and label of every record, each
    /// continuing from its own last unit
    fn relabel_records(&mut self) {
        let scale = f64::from(self.config.visual_scale);
        let mode = self.config.unit;
        for record in &mut self.records {
            record.physical_distance = f64::from(record.world_distance) / scale;
            let formatted = MeasurementFormatter::starting_at(mode, record.unit).format(
                record.physical_distance,
                record.kind,
                record.approximate,
            );
            record.unit = formatted.unit;
            record.label = formatted.text;
        }
    }
}

impl Default for MeasurementEngine {
    fn default() -> Self {
        Self::new(MeasurementConfig::default())
    }
}

impl std::fmt::Debug for MeasurementEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeasurementEngine")
            .field("enabled", &self.enabled)
            .field("phase", &self.phase)
            .field("kind", &self.kind)
            .field("records", &self.records.len())
            .field("vertices", &self.structures.vertex_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snap::SnapTarget;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn snap_at(position: Vec3, kind: SnapKind) -> SnapResult {
        SnapResult {
            position,
            kind,
            target: SnapTarget::Vertex {
                node: NodeId::new(0, 0),
                vertex: 0,
            },
            distance: 1.0,
        }
    }

    fn enabled_engine() -> MeasurementEngine {
        let mut engine = MeasurementEngine::default();
        engine.enable_measurement();
        engine
    }

    #[test]
    fn test_two_points_make_a_record() {
        let mut engine = enabled_engine();

        let step = engine.place_point(snap_at(Vec3::ZERO, SnapKind::Vertex));
        assert!(matches!(step, Some(MeasurementStep::Started(_))));
        assert_eq!(engine.phase(), MeasurementPhase::FirstPointPlaced);

        let step = engine.place_point(snap_at(Vec3::new(0.0, 0.0, 0.25), SnapKind::Vertex));
        let Some(MeasurementStep::Completed(record)) = step else {
            panic!("expected a completed measurement");
        };
        assert_eq!(record.label, "250 mm");
        assert!(!record.approximate);
        assert_eq!(engine.phase(), MeasurementPhase::Idle);
        assert_eq!(engine.records().len(), 1);
    }

    #[test]
    fn test_disabled_engine_ignores_points() {
        let mut engine = MeasurementEngine::default();
        assert!(engine.place_point(snap_at(Vec3::ZERO, SnapKind::Vertex)).is_none());
        assert_eq!(engine.phase(), MeasurementPhase::Idle);
    }

    #[test]
    fn test_face_snap_marks_approximate() {
        let mut engine = enabled_engine();
        engine.place_point(snap_at(Vec3::ZERO, SnapKind::Face));
        engine.place_point(snap_at(Vec3::X * 0.02, SnapKind::Vertex));
        assert_eq!(engine.records()[0].label, "≈ 20.0 mm");
    }

    #[test]
    fn test_radius_kind_halves_span() {
        let mut engine = enabled_engine();
        engine.set_kind(MeasurementKind::Radius);
        engine.place_point(snap_at(Vec3::ZERO, SnapKind::Edge));
        engine.place_point(snap_at(Vec3::Y * 0.05, SnapKind::Edge));
        assert_eq!(engine.records()[0].label, "R25.0 mm");
    }

    #[test]
    fn test_visual_scale_relabels_records() {
        let mut engine = enabled_engine();
        engine.place_point(snap_at(Vec3::ZERO, SnapKind::Vertex));
        engine.place_point(snap_at(Vec3::new(3.0, 0.0, 0.0), SnapKind::Vertex));
        assert_eq!(engine.records()[0].label, "3.00 m");

        engine.set_visual_scale(2.0);
        assert_eq!(engine.records()[0].label, "1.50 m");
        engine.set_visual_scale(10.0);
        assert_eq!(engine.records()[0].label, "300 mm");
        assert_eq!(engine.records()[0].unit, LengthUnit::Millimeters);
    }

    #[test]
    fn test_set_unit_relabels_records() {
        let mut engine = enabled_engine();
        engine.place_point(snap_at(Vec3::ZERO, SnapKind::Vertex));
        engine.place_point(snap_at(Vec3::new(0.5, 0.0, 0.0), SnapKind::Vertex));
        engine.set_unit(UnitMode::Meters);
        assert_eq!(engine.records()[0].label, "0.500 m");
    }

    #[test]
    fn test_delete_and_clear_records() {
        let mut engine = enabled_engine();
        for x in [1.0, 2.0] {
            engine.place_point(snap_at(Vec3::ZERO, SnapKind::Vertex));
            engine.place_point(snap_at(Vec3::X * x, SnapKind::Vertex));
        }
        let first = engine.records()[0].id;
        assert!(engine.delete_record(first));
        assert!(!engine.delete_record(first));
        assert_eq!(engine.records().len(), 1);
        engine.clear_records();
        assert!(engine.records().is_empty());
    }

    #[test]
    fn test_cancel_keeps_records() {
        let mut engine = enabled_engine();
        engine.place_point(snap_at(Vec3::ZERO, SnapKind::Vertex));
        engine.place_point(snap_at(Vec3::X, SnapKind::Vertex));
        engine.place_point(snap_at(Vec3::Y, SnapKind::Vertex));
        engine.cancel();
        assert_eq!(engine.phase(), MeasurementPhase::Idle);
        assert!(engine.pending_point().is_none());
        assert_eq!(engine.records().len(), 1);
    }

    #[test]
    fn test_callbacks_fire() {
        let mut engine = enabled_engine();
        let started = Rc::new(RefCell::new(0));
        let completed = Rc::new(RefCell::new(Vec::new()));
        {
            let started = Rc::clone(&started);
            engine.on_measurement_start(move |_| *started.borrow_mut() += 1);
        }
        {
            let completed = Rc::clone(&completed);
            engine.on_measurement_complete(move |record| completed.borrow_mut().push(record.id));
        }

        engine.place_point(snap_at(Vec3::ZERO, SnapKind::Vertex));
        engine.place_point(snap_at(Vec3::X, SnapKind::Vertex));
        assert_eq!(*started.borrow(), 1);
        assert_eq!(*completed.borrow(), vec![1]);
    }

    #[test]
    fn test_update_config_changes_throttle_and_scale() {
        let mut engine = enabled_engine();
        engine.update_config(&MeasurementConfigUpdate {
            preview_interval: Some(Duration::from_millis(250)),
            visual_scale: Some(4.0),
            ..Default::default()
        });
        assert_eq!(engine.config().preview_interval, Duration::from_millis(250));
        assert_eq!(engine.visual_scale(), 4.0);
    }

    #[test]
    fn test_dispose_disables_and_clears() {
        let mut engine = enabled_engine();
        engine.place_point(snap_at(Vec3::ZERO, SnapKind::Vertex));
        engine.place_point(snap_at(Vec3::X, SnapKind::Vertex));
        engine.dispose();
        assert!(!engine.is_enabled());
        assert!(engine.records().is_empty());
        assert!(engine.snap_structures().is_empty());
    }
}
