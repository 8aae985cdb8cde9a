//! Math utilities and types
//!
//! Provides fundamental math types for the scene graph and culling pipeline.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector3, Vector4};

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

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Scale / rotation / translation triple for a scene-graph node.
///
/// `to_matrix` composes the three in the fixed order scale, then rotation,
/// then translation (i.e. the scale is applied to a vector first).
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Scale factors per axis
    pub scale: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Translation in parent space
    pub translation: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: Vec3::new(1.0, 1.0, 1.0),
            rotation: Quat::identity(),
            translation: Vec3::zeros(),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    #[must_use]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only a translation
    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    /// Create a transform with translation and rotation
    #[must_use]
    pub fn from_translation_rotation(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
            ..Default::default()
        }
    }

    /// Convert to a transformation matrix (translation * rotation * scale)
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.translation)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    #[must_use]
    pub fn transform_point(&self, point: Point3) -> Point3 {
        self.to_matrix().transform_point(&point)
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a rotation matrix around the X axis
    fn rotation_x(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Y axis
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Z axis
    fn rotation_z(angle: f32) -> Mat4;

    /// Largest per-axis scale factor encoded in the upper 3x3 block.
    ///
    /// Used to transform bounding-sphere radii conservatively under
    /// non-uniform scale.
    fn max_axis_scale(&self) -> f32;
}

impl Mat4Ext for Mat4 {
    fn rotation_x(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), angle)
    }

    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }

    fn max_axis_scale(&self) -> f32 {
        let sx = self.fixed_view::<3, 1>(0, 0).norm();
        let sy = self.fixed_view::<3, 1>(0, 1).norm();
        let sz = self.fixed_view::<3, 1>(0, 2).norm();
        sx.max(sy).max(sz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn transform_composition_order_is_scale_rotation_translation() {
        let t = Transform {
            scale: Vec3::new(2.0, 2.0, 2.0),
            rotation: Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2),
            translation: Vec3::new(1.0, 0.0, 0.0),
        };

        // (1,0,0) scaled to (2,0,0), rotated 90° about Y to (0,0,-2),
        // then translated by (1,0,0).
        let p = t.transform_point(Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(p.z, -2.0, epsilon = 1e-5);
    }

    #[test]
    fn max_axis_scale_reads_largest_column() {
        let m = Mat4::new_nonuniform_scaling(&Vec3::new(2.0, 3.0, 0.5));
        assert_relative_eq!(m.max_axis_scale(), 3.0, epsilon = 1e-6);
    }
}
