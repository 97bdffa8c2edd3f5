//! # Viewer Camera
//!
//! A free camera described by a position and Euler angles. Scene viewpoints
//! (PerspectiveCamera and OrthographicCamera nodes) are applied to it by
//! [`Camera::activate_viewpoint`], and mouse input moves it afterwards.
//!
//! ## Conventions
//! - Right-handed, Y-up world space
//! - Zero yaw and pitch look down -Z
//! - Positive pitch looks down, positive yaw turns toward +X
//! - Clip depth in `[0, 1]`

use crate::core::config::CameraConfig;
use crate::foundation::math::{constants, utils, Mat4, Mat4Ext, Point3, Vec2, Vec3, Vec4};
use crate::physics::Ray;
use crate::scene::node::{CameraNode, CameraProjection};

/// Projection model
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective with a vertical field of view in radians
    Perspective {
        /// Vertical field of view
        fov: f32,
    },
    /// Orthographic covering `height` world units vertically
    Orthographic {
        /// Visible height
        height: f32,
    },
}

/// Viewer camera
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Eye position in world space
    pub position: Vec3,
    /// Rotation about the right axis in radians
    pub pitch: f32,
    /// Rotation about world Y in radians
    pub yaw: f32,
    /// Projection model
    pub projection: Projection,
    /// Distance to near clipping plane
    pub near: f32,
    /// Distance to far clipping plane
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

/// Pitch stays just inside straight up or down
const PITCH_LIMIT: f32 = constants::HALF_PI - 0.01;

impl Camera {
    /// Camera at the configured start position looking down -Z
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            position: Vec3::from(config.start_position),
            pitch: 0.0,
            yaw: 0.0,
            projection: Projection::Perspective { fov: utils::deg_to_rad(config.fov_degrees) },
            near: config.near,
            far: config.far,
        }
    }

    /// Unit view direction
    pub fn forward(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(sin_yaw * cos_pitch, -sin_pitch, -cos_yaw * cos_pitch)
    }

    /// Unit right vector, always horizontal
    pub fn right(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(cos_yaw, 0.0, sin_yaw)
    }

    /// Up vector orthogonal to `forward` and `right`
    pub fn up(&self) -> Vec3 {
        self.right().cross(&self.forward())
    }

    /// Point the camera along `direction`
    pub fn look_along(&mut self, direction: Vec3) {
        let Some(forward) = direction.try_normalize(f32::EPSILON) else {
            return;
        };
        self.pitch = -utils::clamp(forward.y, -1.0, 1.0).asin();
        self.yaw = forward.x.atan2(-forward.z);
    }

    /// View matrix looking from `position` along `forward`
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.position + self.forward(), Vec3::y())
    }

    /// Projection matrix for a viewport aspect ratio
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect > 0.0 { aspect } else { 1.0 };
        match self.projection {
            Projection::Perspective { fov } => Mat4::perspective_zo(fov, aspect, self.near, self.far),
            Projection::Orthographic { height } => Mat4::orthographic_zo(height, aspect, self.near, self.far),
        }
    }

    /// Projection times view
    pub fn view_projection_matrix(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// Cast a world-space ray through a pixel.
    ///
    /// # Arguments
    /// * `screen` - Pixel position, origin at the top-left
    /// * `viewport` - Viewport size in pixels
    ///
    /// # Returns
    /// The ray from the near plane toward the far plane, or `None` when the
    /// viewport is empty or the view-projection is singular
    pub fn screen_to_world_ray(&self, screen: Vec2, viewport: Vec2) -> Option<Ray> {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return None;
        }
        let ndc_x = (screen.x / viewport.x) * 2.0 - 1.0;
        let ndc_y = -((screen.y / viewport.y) * 2.0 - 1.0);

        let inverse = self.view_projection_matrix(viewport.x / viewport.y).try_inverse()?;
        let unproject = |z: f32| {
            let p = inverse * Vec4::new(ndc_x, ndc_y, z, 1.0);
            p.xyz() / p.w
        };
        let near = unproject(0.0);
        let far = unproject(1.0);

        log::trace!("Pick ray from {:?} toward {:?}", near, far);
        Some(Ray::new(near, far - near))
    }

    /// Move to a scene viewpoint placed by `world`.
    ///
    /// The viewpoint's orientation rotates the default -Z view direction.
    /// `heightAngle` and `height` replace the current projection.
    pub fn activate_viewpoint(&mut self, viewpoint: &CameraNode, world: &Mat4) {
        self.position = world.transform_point(&Point3::from(viewpoint.position)).coords;
        let local_forward = Mat4::from_axis_angle4(viewpoint.orientation).transform_vector(&-Vec3::z());
        self.look_along(world.transform_vector(&local_forward));
        self.projection = match viewpoint.projection {
            CameraProjection::Perspective { height_angle } => Projection::Perspective { fov: height_angle },
            CameraProjection::Orthographic { height } => Projection::Orthographic { height },
        };
        log::info!(
            "Camera moved to viewpoint at {:?} (pitch {:.3}, yaw {:.3})",
            self.position,
            self.pitch,
            self.yaw
        );
    }

    /// Rotate by a mouse drag in pixels
    pub fn apply_drag(&mut self, delta: Vec2, sensitivity: f32) {
        self.yaw += delta.x * sensitivity;
        self.pitch = utils::clamp(self.pitch + delta.y * sensitivity, -PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Move along `forward` by a scroll amount
    pub fn apply_scroll(&mut self, delta: f32, sensitivity: f32) {
        self.position += self.forward() * (delta * sensitivity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_looks_down_negative_z() {
        let camera = Camera::default();
        assert_relative_eq!(camera.forward(), Vec3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(camera.right(), Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(camera.up(), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_look_along_round_trips_forward() {
        let mut camera = Camera::default();
        let direction = Vec3::new(1.0, -0.5, -2.0).normalize();
        camera.look_along(direction);
        assert_relative_eq!(camera.forward(), direction, epsilon = 1e-5);
    }

    #[test]
    fn test_viewpoint_orientation_turns_camera() {
        let mut camera = Camera::default();
        let mut viewpoint = CameraNode::perspective();
        viewpoint.position = Vec3::new(0.0, 1.0, 10.0);
        viewpoint.orientation = Vec4::new(0.0, 1.0, 0.0, constants::HALF_PI);
        camera.activate_viewpoint(&viewpoint, &Mat4::identity());

        assert_relative_eq!(camera.position, Vec3::new(0.0, 1.0, 10.0));
        assert_relative_eq!(camera.forward(), Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-5);
        assert_eq!(camera.projection, Projection::Perspective { fov: 0.785_398 });
    }

    #[test]
    fn test_orthographic_viewpoint() {
        let mut camera = Camera::default();
        camera.activate_viewpoint(&CameraNode::orthographic(), &Mat4::identity());
        assert_eq!(camera.projection, Projection::Orthographic { height: 2.0 });
    }

    #[test]
    fn test_center_pixel_ray_follows_forward() {
        let camera = Camera::default();
        let ray = camera
            .screen_to_world_ray(Vec2::new(400.0, 300.0), Vec2::new(800.0, 600.0))
            .unwrap();
        assert_relative_eq!(ray.direction, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-4);
        assert_relative_eq!(ray.origin.z, 5.0 - 0.1, epsilon = 1e-3);
    }

    #[test]
    fn test_top_pixel_ray_points_up() {
        let camera = Camera::default();
        let ray = camera
            .screen_to_world_ray(Vec2::new(400.0, 0.0), Vec2::new(800.0, 600.0))
            .unwrap();
        assert!(ray.direction.y > 0.0);
    }

    #[test]
    fn test_drag_clamps_pitch() {
        let mut camera = Camera::default();
        camera.apply_drag(Vec2::new(0.0, 1.0e4), 0.01);
        assert_relative_eq!(camera.pitch, PITCH_LIMIT);
    }

    #[test]
    fn test_scroll_dollies_forward() {
        let mut camera = Camera::default();
        camera.apply_scroll(10.0, 0.1);
        assert_relative_eq!(camera.position, Vec3::new(0.0, 0.0, 4.0), epsilon = 1e-6);
    }
}
