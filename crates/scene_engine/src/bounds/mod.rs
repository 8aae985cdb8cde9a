//! Bounding volumes and intersection math
//!
//! Provides the bounding shapes carried by geometry nodes (sphere,
//! axis-aligned box, convex region) plus the camera frustum used for
//! visibility culling. All shapes support transformation into world space
//! by a node's world matrix and pairwise intersection tests.

mod aabb;
mod frustum;
mod plane;
mod region;
mod sphere;

pub use aabb::Aabb;
pub use frustum::Frustum;
pub use plane::Plane;
pub use region::ConvexRegion;
pub use sphere::BoundingSphere;

use crate::foundation::math::{Mat4, Vec3};

/// A bounding volume attached to a geometry node.
///
/// Local volumes are immutable shapes in node space; world volumes are
/// derived by [`BoundingVolume::transformed`] with the node's world matrix.
#[derive(Debug, Clone)]
pub enum BoundingVolume {
    /// Center + radius sphere (cheapest tests)
    Sphere(BoundingSphere),
    /// Axis-aligned bounding box
    Aabb(Aabb),
    /// Convex frustum-hull region (8 corners, 6 planes)
    Region(ConvexRegion),
}

impl BoundingVolume {
    /// Create a sphere volume
    #[must_use]
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self::Sphere(BoundingSphere::new(center, radius))
    }

    /// Create an axis-aligned box volume
    #[must_use]
    pub fn aabb(min: Vec3, max: Vec3) -> Self {
        Self::Aabb(Aabb::new(min, max))
    }

    /// Center of the volume
    #[must_use]
    pub fn center(&self) -> Vec3 {
        match self {
            Self::Sphere(s) => s.center,
            Self::Aabb(b) => b.center(),
            Self::Region(r) => r.centroid(),
        }
    }

    /// Radius of a sphere enclosing the volume, for distance and
    /// screen-size estimates.
    #[must_use]
    pub fn enclosing_radius(&self) -> f32 {
        match self {
            Self::Sphere(s) => s.radius,
            Self::Aabb(b) => b.extents().norm(),
            Self::Region(r) => r.enclosing_radius(),
        }
    }

    /// The volume transformed by a world matrix.
    ///
    /// Spheres stay spheres (radius scaled by the largest axis scale), boxes
    /// are re-wrapped around their eight transformed corners, regions
    /// transform their corners and rebuild their planes.
    #[must_use]
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        match self {
            Self::Sphere(s) => Self::Sphere(s.transformed(matrix)),
            Self::Aabb(b) => Self::Aabb(b.transformed(matrix)),
            Self::Region(r) => Self::Region(r.transformed(matrix)),
        }
    }

    /// Test whether two volumes intersect.
    ///
    /// Sphere/sphere, sphere/box, and box/box tests are exact; tests
    /// involving a region are conservative plane-separation tests (they may
    /// report an intersection for nearly-touching volumes, never the
    /// reverse).
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Sphere(a), Self::Sphere(b)) => a.intersects(b),
            (Self::Sphere(s), Self::Aabb(b)) | (Self::Aabb(b), Self::Sphere(s)) => {
                b.intersects_sphere(s)
            }
            (Self::Aabb(a), Self::Aabb(b)) => a.intersects(b),
            (Self::Region(r), Self::Sphere(s)) | (Self::Sphere(s), Self::Region(r)) => {
                r.intersects_sphere(s)
            }
            (Self::Region(r), Self::Aabb(b)) | (Self::Aabb(b), Self::Region(r)) => {
                r.intersects_aabb(b)
            }
            (Self::Region(a), Self::Region(b)) => a.intersects_region(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat4;

    #[test]
    fn sphere_aabb_cross_variant_intersection() {
        let sphere = BoundingVolume::sphere(Vec3::new(2.0, 0.0, 0.0), 1.5);
        let aabb = BoundingVolume::aabb(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        assert!(sphere.intersects(&aabb));
        assert!(aabb.intersects(&sphere));

        let far = BoundingVolume::sphere(Vec3::new(10.0, 0.0, 0.0), 1.0);
        assert!(!far.intersects(&aabb));
    }

    #[test]
    fn transformed_sphere_follows_translation() {
        let volume = BoundingVolume::sphere(Vec3::zeros(), 1.0);
        let world = volume.transformed(&Mat4::new_translation(&Vec3::new(5.0, 0.0, 0.0)));

        assert!((world.center() - Vec3::new(5.0, 0.0, 0.0)).norm() < 1e-5);
    }
}
