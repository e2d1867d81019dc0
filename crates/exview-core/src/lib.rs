//! # Exview Core
//!
//! Shared foundation for the exview assembly engines.
//!
//! This crate provides what both engines consume from their host:
//! - **Scene Graph**: Hierarchical transforms, parenting, visibility and mesh geometry
//! - **Math**: Bounding volumes, rays and the closest-point / intersection queries
//! - **Camera**: The `Viewport` seam plus a reference perspective camera
//! - **Time**: Minimum-interval throttling for per-frame work

pub mod camera;
pub mod math;
pub mod scene;
pub mod time;

pub use camera::{PerspectiveCamera, Viewport};
pub use math::{Aabb, BoundingSphere, Ray};
pub use scene::{MeshGeometry, Node, NodeId, SceneError, SceneGraph, SceneResult, Transform};
pub use time::Throttle;
