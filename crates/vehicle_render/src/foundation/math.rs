//! Math utilities and types
//!
//! Provides the fundamental math types used by the model-rendering core.
//! All simulation-facing math is done in f64: tread paths and gun aim
//! accumulate over thousands of ticks, and f32 drift is visible there.

pub use nalgebra::{Matrix3, Matrix4, Rotation3, Unit, UnitQuaternion, Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f64>;

/// 3D vector type
pub type Vec3 = Vector3<f64>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f64>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f64>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f64>;

/// Math constants
pub mod constants {
    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f64 = 180.0 / std::f64::consts::PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f64) -> f64 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f64) -> f64 {
        radians * constants::RAD_TO_DEG
    }

    /// Linear interpolation
    pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a + (b - a) * t
    }

    /// Normalize an angle delta into (-180, 180].
    ///
    /// Used wherever two angles on a closed loop are interpolated: the
    /// shortest rotational step between them never exceeds a half turn.
    pub fn wrap_delta_degrees(mut delta: f64) -> f64 {
        while delta > 180.0 {
            delta -= 360.0;
        }
        while delta <= -180.0 {
            delta += 360.0;
        }
        delta
    }

    /// Signed shortest-path yaw delta from `current` to `target`, in degrees.
    ///
    /// Yaw is periodic, so a target of 179 from a current of -179 is a
    /// 2-degree move, not 358.
    pub fn clamped_yaw_delta(current: f64, target: f64) -> f64 {
        wrap_delta_degrees(target - current)
    }
}

/// Extension trait for [`Mat4`] with the transform-composition helpers the
/// render pipeline uses.
///
/// All `apply_*` methods post-multiply, i.e. they operate in the matrix's
/// current local frame, matching how per-object transforms are chained from
/// the entity root down to individual tread links.
pub trait Mat4Ext {
    /// Post-multiply a translation onto this transform
    fn apply_translation(&mut self, x: f64, y: f64, z: f64);

    /// Post-multiply another transform onto this one
    fn apply_transform(&mut self, other: &Mat4);

    /// Create a rotation about an arbitrary axis, angle in degrees
    fn axis_rotation_degrees(axis: &Vec3, degrees: f64) -> Mat4;

    /// Create a rotation about the X axis, angle in degrees
    fn rotation_x_degrees(degrees: f64) -> Mat4;

    /// Create the rotation that maps +Z onto the given (non-zero) axis.
    ///
    /// Flare and beam geometry is authored facing +Z and oriented to its
    /// placement axis with this.
    fn rotation_to_axis(axis: &Vec3) -> Mat4;

    /// Create a rotation from (pitch, yaw, roll) angles in degrees,
    /// applied yaw-then-pitch-then-roll.
    fn rotation_degrees(angles: &Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn apply_translation(&mut self, x: f64, y: f64, z: f64) {
        *self *= Mat4::new_translation(&Vec3::new(x, y, z));
    }

    fn apply_transform(&mut self, other: &Mat4) {
        *self *= other;
    }

    fn axis_rotation_degrees(axis: &Vec3, degrees: f64) -> Mat4 {
        let unit = Unit::new_normalize(*axis);
        Mat4::from_axis_angle(&unit, utils::deg_to_rad(degrees))
    }

    fn rotation_x_degrees(degrees: f64) -> Mat4 {
        Self::axis_rotation_degrees(&Vec3::x(), degrees)
    }

    fn rotation_to_axis(axis: &Vec3) -> Mat4 {
        match Rotation3::rotation_between(&Vec3::z(), axis) {
            Some(rotation) => rotation.to_homogeneous(),
            // Antiparallel axis: rotation_between has no unique answer,
            // flip around Y.
            None => Rotation3::from_axis_angle(&Vec3::y_axis(), std::f64::consts::PI)
                .to_homogeneous(),
        }
    }

    fn rotation_degrees(angles: &Vec3) -> Mat4 {
        let yaw = Rotation3::from_axis_angle(&Vec3::y_axis(), utils::deg_to_rad(angles.y));
        let pitch = Rotation3::from_axis_angle(&Vec3::x_axis(), utils::deg_to_rad(angles.x));
        let roll = Rotation3::from_axis_angle(&Vec3::z_axis(), utils::deg_to_rad(angles.z));
        (yaw * pitch * roll).to_homogeneous()
    }
}

/// Rotate a vector by (pitch, yaw, roll) angles in degrees.
pub fn rotate_degrees(vector: &Vec3, angles: &Vec3) -> Vec3 {
    Mat4::rotation_degrees(angles).transform_vector(vector)
}
