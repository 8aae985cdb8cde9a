//! Bounding sphere

use crate::foundation::math::{Mat4, Mat4Ext, Point3, Vec3};

/// A bounding sphere for culling and collision detection
#[derive(Debug, Clone, Copy)]
pub struct BoundingSphere {
    /// The center position of the sphere
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    #[must_use]
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if this sphere intersects with another
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        let distance_squared = (self.center - other.center).norm_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// Check if this sphere contains a point
    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        (point - self.center).norm_squared() <= self.radius * self.radius
    }

    /// Sphere transformed by a matrix: the center is transformed as a point,
    /// the radius scaled by the largest axis scale so the result stays
    /// conservative under non-uniform scale.
    #[must_use]
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self {
            center: matrix.transform_point(&Point3::from(self.center)).coords,
            radius: self.radius * matrix.max_axis_scale(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn touching_spheres_intersect() {
        let a = BoundingSphere::new(Vec3::zeros(), 1.0);
        let b = BoundingSphere::new(Vec3::new(2.0, 0.0, 0.0), 1.0);
        let c = BoundingSphere::new(Vec3::new(2.1, 0.0, 0.0), 1.0);

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn nonuniform_scale_takes_largest_axis() {
        let sphere = BoundingSphere::new(Vec3::new(1.0, 0.0, 0.0), 1.0);
        let scaled = sphere.transformed(&Mat4::new_nonuniform_scaling(&Vec3::new(2.0, 4.0, 1.0)));

        assert_relative_eq!(scaled.radius, 4.0, epsilon = 1e-5);
        assert_relative_eq!(scaled.center.x, 2.0, epsilon = 1e-5);
    }
}
