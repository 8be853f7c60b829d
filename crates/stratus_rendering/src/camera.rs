//! Camera ray generation.
//!
//! Un-projects pixel centres through the inverse view-projection matrix.
//! OpenGL clip conventions: NDC depth in `[-1, 1]`, pixel row 0 at the top.

use glam::{Mat4, Vec3};
use stratus_core::Ray;

/// Vertical field of view used by the default viewpoint, in degrees.
pub const DEFAULT_FOV_DEGREES: f32 = 60.0;

/// Default near plane distance.
pub const DEFAULT_NEAR: f32 = 1.0;

/// Default far plane distance.
pub const DEFAULT_FAR: f32 = 1000.0;

/// Camera state needed to build view rays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraRig {
    /// Clip space to world space.
    pub inv_view_proj: Mat4,
    /// Ray origin.
    pub position: Vec3,
}

impl CameraRig {
    /// Builds a rig from a view-projection matrix and the eye position.
    #[must_use]
    pub fn from_view_proj(view_proj: Mat4, position: Vec3) -> Self {
        Self {
            inv_view_proj: view_proj.inverse(),
            position,
        }
    }

    /// Right-handed perspective camera looking along `forward`, Y up.
    ///
    /// `forward` must not be parallel to Y.
    #[must_use]
    pub fn perspective(
        position: Vec3,
        forward: Vec3,
        vertical_fov_deg: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let view = Mat4::look_to_rh(position, forward.normalize_or_zero(), Vec3::Y);
        let projection = Mat4::perspective_rh_gl(vertical_fov_deg.to_radians(), aspect, near, far);
        Self::from_view_proj(projection * view, position)
    }

    /// View ray through the centre of pixel `(x, y)`.
    #[must_use]
    pub fn ray_for_pixel(&self, x: u32, y: u32, width: u32, height: u32) -> Ray {
        let u = (x as f32 + 0.5) / width.max(1) as f32;
        let v = (y as f32 + 0.5) / height.max(1) as f32;
        let ndc = Vec3::new(u * 2.0 - 1.0, 1.0 - v * 2.0, 1.0);
        let far = self.inv_view_proj.project_point3(ndc);
        Ray::new(self.position, far - self.position)
    }
}
