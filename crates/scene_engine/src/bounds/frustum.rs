//! View frustum for visibility culling

use crate::foundation::math::{Mat4, Vec3};

use super::{Aabb, BoundingSphere, BoundingVolume, ConvexRegion, Plane};

/// Frustum for visibility culling
#[derive(Debug, Clone)]
pub struct Frustum {
    /// Six planes defining the frustum (left, right, bottom, top, near, far),
    /// normals facing inward
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Create a frustum from six planes
    #[must_use]
    pub fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extract frustum planes from a combined view-projection matrix using
    /// the Gribb–Hartmann method.
    ///
    /// Assumes OpenGL-style clip space (`-w <= z <= w`), which is what
    /// nalgebra's `new_perspective` produces.
    #[must_use]
    pub fn from_view_proj(m: &Mat4) -> Self {
        let row = |i: usize| {
            let r = m.row(i);
            (Vec3::new(r[0], r[1], r[2]), r[3])
        };

        let (r0, d0) = row(0);
        let (r1, d1) = row(1);
        let (r2, d2) = row(2);
        let (r3, d3) = row(3);

        Self {
            planes: [
                Plane::new(r3 + r0, d3 + d0), // left
                Plane::new(r3 - r0, d3 - d0), // right
                Plane::new(r3 + r1, d3 + d1), // bottom
                Plane::new(r3 - r1, d3 - d1), // top
                Plane::new(r3 + r2, d3 + d2), // near
                Plane::new(r3 - r2, d3 - d2), // far
            ],
        }
    }

    /// Check if a sphere is inside or intersects the frustum
    #[must_use]
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        self.planes
            .iter()
            .all(|p| p.distance_to_point(sphere.center) >= -sphere.radius)
    }

    /// Check if an AABB is inside or intersects the frustum
    /// (positive-vertex test per plane)
    #[must_use]
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        for plane in &self.planes {
            let mut p = aabb.min;
            if plane.normal.x >= 0.0 {
                p.x = aabb.max.x;
            }
            if plane.normal.y >= 0.0 {
                p.y = aabb.max.y;
            }
            if plane.normal.z >= 0.0 {
                p.z = aabb.max.z;
            }
            if plane.distance_to_point(p) < 0.0 {
                return false;
            }
        }
        true
    }

    /// Check if a convex region is inside or intersects the frustum
    /// (conservative: rejected only when a frustum plane separates all
    /// region corners)
    #[must_use]
    pub fn intersects_region(&self, region: &ConvexRegion) -> bool {
        !self.planes.iter().any(|p| {
            region
                .corners()
                .iter()
                .all(|c| p.distance_to_point(*c) < 0.0)
        })
    }

    /// Check a bounding volume of any kind against the frustum
    #[must_use]
    pub fn intersects_volume(&self, volume: &BoundingVolume) -> bool {
        match volume {
            BoundingVolume::Sphere(s) => self.intersects_sphere(s),
            BoundingVolume::Aabb(b) => self.intersects_aabb(b),
            BoundingVolume::Region(r) => self.intersects_region(r),
        }
    }

    /// Check if a point is inside the frustum
    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|p| p.distance_to_point(point) >= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Point3;

    fn looking_down_neg_z() -> Frustum {
        let proj = Mat4::new_perspective(1.0, std::f32::consts::FRAC_PI_2, 0.1, 100.0);
        let view = Mat4::look_at_rh(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(0.0, 0.0, -1.0),
            &Vec3::y(),
        );
        Frustum::from_view_proj(&(proj * view))
    }

    #[test]
    fn point_classification() {
        let frustum = looking_down_neg_z();

        assert!(frustum.contains_point(Vec3::new(0.0, 0.0, -10.0)));
        // Behind the camera.
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, 10.0)));
        // Beyond the far plane.
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, -200.0)));
        // Outside the 90° horizontal field of view.
        assert!(!frustum.contains_point(Vec3::new(50.0, 0.0, -10.0)));
    }

    #[test]
    fn sphere_straddling_a_plane_intersects() {
        let frustum = looking_down_neg_z();

        // Center behind the near plane but radius reaching through it.
        let sphere = BoundingSphere::new(Vec3::new(0.0, 0.0, 0.0), 1.0);
        assert!(frustum.intersects_sphere(&sphere));

        let outside = BoundingSphere::new(Vec3::new(0.0, 0.0, 50.0), 1.0);
        assert!(!frustum.intersects_sphere(&outside));
    }

    #[test]
    fn aabb_classification() {
        let frustum = looking_down_neg_z();

        let inside = Aabb::from_center_extents(Vec3::new(0.0, 0.0, -10.0), Vec3::new(1.0, 1.0, 1.0));
        let behind = Aabb::from_center_extents(Vec3::new(0.0, 0.0, 20.0), Vec3::new(1.0, 1.0, 1.0));

        assert!(frustum.intersects_aabb(&inside));
        assert!(!frustum.intersects_aabb(&behind));
    }

    #[test]
    fn region_classification() {
        let frustum = looking_down_neg_z();

        let inside = ConvexRegion::from_aabb(&Aabb::from_center_extents(
            Vec3::new(0.0, 0.0, -10.0),
            Vec3::new(1.0, 1.0, 1.0),
        ));
        let behind = ConvexRegion::from_aabb(&Aabb::from_center_extents(
            Vec3::new(0.0, 0.0, 20.0),
            Vec3::new(1.0, 1.0, 1.0),
        ));

        assert!(frustum.intersects_region(&inside));
        assert!(!frustum.intersects_region(&behind));
    }
}
