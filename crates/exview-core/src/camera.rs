//! Camera and viewport seam
//!
//! The engines never build projection matrices themselves. They ask a
//! [`Viewport`] for a picking ray and for the normalized-device position of a
//! world point, and do the rest with dot products.

use glam::{Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::math::Ray;

/// What the host renderer exposes to the picking code.
///
/// Cursor positions and projected points are normalized device coordinates:
/// `x` and `y` in `[-1, 1]`, `+y` up.
pub trait Viewport {
    /// Ray from the eye through the cursor
    fn ray(&self, cursor: Vec2) -> Ray;

    /// NDC position of a world point, `None` if the point is behind the eye
    fn project(&self, point: Vec3) -> Option<Vec2>;

    /// Viewport size in pixels
    fn size(&self) -> Vec2;

    /// Eye position in world space
    fn eye(&self) -> Vec3;

    /// Distance in pixels between two NDC positions
    fn pixel_distance(&self, a: Vec2, b: Vec2) -> f32 {
        ((a - b) * self.size() * 0.5).length()
    }
}

/// Perspective camera looking at a target point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerspectiveCamera {
    /// Camera position
    pub position: Vec3,
    /// Camera target
    pub target: Vec3,
    /// Up direction
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
    /// Viewport width in pixels
    pub width: f32,
    /// Viewport height in pixels
    pub height: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(5.0, 5.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 60.0,
            near: 0.1,
            far: 10000.0,
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl PerspectiveCamera {
    /// Camera at `position` looking at `target`, default lens and viewport
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            ..Default::default()
        }
    }

    /// Set the viewport size in pixels
    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
        self
    }

    /// Width over height
    pub fn aspect(&self) -> f32 {
        self.width.max(1.0) / self.height.max(1.0)
    }

    /// World-to-view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// View-to-clip matrix (OpenGL depth range)
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), self.aspect(), self.near, self.far)
    }

    /// Combined world-to-clip matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Viewport for PerspectiveCamera {
    fn ray(&self, cursor: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let on_near = inverse.project_point3(Vec3::new(cursor.x, cursor.y, -1.0));
        Ray::new(self.position, on_near - self.position)
    }

    fn project(&self, point: Vec3) -> Option<Vec2> {
        let clip = self.view_projection() * Vec4::new(point.x, point.y, point.z, 1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        Some(Vec2::new(clip.x / clip.w, clip.y / clip.w))
    }

    fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    fn eye(&self) -> Vec3 {
        self.position
    }
}
