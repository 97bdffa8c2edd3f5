//! Math utilities and types
//!
//! Provides the vector and matrix aliases used by the scene interpreter, plus the
//! projection and rotation helpers the traversal and camera code share.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min { min } else if value > max { max } else { value }
    }
}

/// Extension trait for Mat4 with the projection and rotation builders the
/// renderer needs.
///
/// Projections follow a right-handed view space looking down -Z with clip
/// depth in `[0, 1]`.
pub trait Mat4Ext {
    /// Rotation about an arbitrary axis packed as `(x, y, z, angle)`.
    ///
    /// A zero-length axis yields the identity.
    fn from_axis_angle4(rotation: Vec4) -> Mat4;

    /// Create a perspective projection matrix
    fn perspective_zo(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create an orthographic projection covering `height` world units vertically
    fn orthographic_zo(height: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;

    /// Embed a 2D texture-space affine matrix into the top-left of a 4x4
    fn from_texture_affine(affine: &Mat3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn from_axis_angle4(rotation: Vec4) -> Mat4 {
        let axis = Vec3::new(rotation.x, rotation.y, rotation.z);
        match nalgebra::Unit::try_new(axis, f32::EPSILON) {
            Some(axis) => Mat4::from_axis_angle(&axis, rotation.w),
            None => Mat4::identity(),
        }
    }

    fn perspective_zo(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let ys = 1.0 / (fov_y * 0.5).tan();
        let xs = ys / aspect;
        let zs = far / (near - far);

        Mat4::new(
            xs,  0.0, 0.0, 0.0,
            0.0, ys,  0.0, 0.0,
            0.0, 0.0, zs,  zs * near,
            0.0, 0.0, -1.0, 0.0,
        )
    }

    fn orthographic_zo(height: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let width = height * aspect;
        let depth = near - far;

        Mat4::new(
            2.0 / width, 0.0, 0.0, 0.0,
            0.0, 2.0 / height, 0.0, 0.0,
            0.0, 0.0, 1.0 / depth, near / depth,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let forward = (target - eye).normalize();
        let right = forward.cross(&up).normalize();
        let camera_up = right.cross(&forward);

        let translation = Mat4::new(
            1.0, 0.0, 0.0, -eye.x,
            0.0, 1.0, 0.0, -eye.y,
            0.0, 0.0, 1.0, -eye.z,
            0.0, 0.0, 0.0, 1.0,
        );

        let rotation = Mat4::new(
            right.x, right.y, right.z, 0.0,
            camera_up.x, camera_up.y, camera_up.z, 0.0,
            -forward.x, -forward.y, -forward.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );

        rotation * translation
    }

    fn from_texture_affine(affine: &Mat3) -> Mat4 {
        Mat4::new(
            affine.m11, affine.m12, 0.0, affine.m13,
            affine.m21, affine.m22, 0.0, affine.m23,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }
}

/// Convert a column-major matrix into the `[[f32; 4]; 4]` layout GPU buffers expect
pub fn mat4_to_cols(matrix: &Mat4) -> [[f32; 4]; 4] {
    (*matrix).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_axis_angle_quarter_turn_about_y() {
        let m = Mat4::from_axis_angle4(Vec4::new(0.0, 1.0, 0.0, constants::HALF_PI));
        let p = m.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.z, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_axis_is_identity() {
        let m = Mat4::from_axis_angle4(Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(m, Mat4::identity());
    }

    #[test]
    fn test_perspective_maps_near_and_far_to_unit_depth() {
        let p = Mat4::perspective_zo(constants::PI / 3.0, 1.0, 0.1, 100.0);
        let near = p * Vec4::new(0.0, 0.0, -0.1, 1.0);
        let far = p * Vec4::new(0.0, 0.0, -100.0, 1.0);
        assert_relative_eq!(near.z / near.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_orthographic_depth_range() {
        let p = Mat4::orthographic_zo(2.0, 1.0, 0.1, 100.0);
        let near = p * Vec4::new(1.0, 1.0, -0.1, 1.0);
        let far = p * Vec4::new(0.0, 0.0, -100.0, 1.0);
        assert_relative_eq!(near.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(near.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(near.z, 0.0, epsilon = 1e-6);
        assert_relative_eq!(far.z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_look_at_places_target_on_negative_z() {
        let view = Mat4::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::zeros(), Vec3::y());
        let p = view.transform_point(&Point3::origin());
        assert_relative_eq!(p.z, -5.0, epsilon = 1e-6);
    }
}
