//! Convex frustum-hull region

use crate::foundation::math::{Mat4, Point3, Vec3};

use super::{Aabb, BoundingSphere, Plane};

/// A convex region bounded by six planes, stored as a frustum-like hull of
/// eight corners (a near quad and a far quad).
///
/// Intersection tests against regions are conservative plane-separation
/// tests: they can report an intersection for disjoint but nearly-touching
/// shapes, never a miss for intersecting ones.
#[derive(Debug, Clone)]
pub struct ConvexRegion {
    corners: [Vec3; 8],
    planes: [Plane; 6],
}

impl ConvexRegion {
    /// Build a region from a near quad and a far quad; `far[i]` must be the
    /// corner paired with `near[i]`. Winding does not matter — every plane
    /// normal is oriented toward the region's centroid.
    #[must_use]
    pub fn from_quads(near: [Vec3; 4], far: [Vec3; 4]) -> Self {
        let corners = [
            near[0], near[1], near[2], near[3], far[0], far[1], far[2], far[3],
        ];
        let planes = Self::build_planes(&corners);
        Self { corners, planes }
    }

    /// Region with the shape of an axis-aligned box
    #[must_use]
    pub fn from_aabb(aabb: &Aabb) -> Self {
        let (lo, hi) = (aabb.min, aabb.max);
        Self::from_quads(
            [
                Vec3::new(lo.x, lo.y, lo.z),
                Vec3::new(hi.x, lo.y, lo.z),
                Vec3::new(hi.x, hi.y, lo.z),
                Vec3::new(lo.x, hi.y, lo.z),
            ],
            [
                Vec3::new(lo.x, lo.y, hi.z),
                Vec3::new(hi.x, lo.y, hi.z),
                Vec3::new(hi.x, hi.y, hi.z),
                Vec3::new(lo.x, hi.y, hi.z),
            ],
        )
    }

    fn build_planes(corners: &[Vec3; 8]) -> [Plane; 6] {
        let centroid = corners.iter().fold(Vec3::zeros(), |acc, c| acc + c) / 8.0;

        // Face corner triples; near quad is 0..4, far quad 4..8, corner i
        // paired with corner i+4.
        let faces = [
            [corners[0], corners[1], corners[2]], // near
            [corners[4], corners[5], corners[6]], // far
            [corners[0], corners[1], corners[5]], // bottom edge 0-1
            [corners[1], corners[2], corners[6]], // edge 1-2
            [corners[2], corners[3], corners[7]], // edge 2-3
            [corners[3], corners[0], corners[4]], // edge 3-0
        ];

        faces.map(|[a, b, c]| {
            let plane = Plane::from_points(a, b, c);
            if plane.distance_to_point(centroid) < 0.0 {
                Plane {
                    normal: -plane.normal,
                    distance: -plane.distance,
                }
            } else {
                plane
            }
        })
    }

    /// The eight hull corners
    #[must_use]
    pub fn corners(&self) -> &[Vec3; 8] {
        &self.corners
    }

    /// The six inward-facing boundary planes
    #[must_use]
    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    /// Mean of the corners
    #[must_use]
    pub fn centroid(&self) -> Vec3 {
        self.corners.iter().fold(Vec3::zeros(), |acc, c| acc + c) / 8.0
    }

    /// Radius of a sphere around the centroid enclosing all corners
    #[must_use]
    pub fn enclosing_radius(&self) -> f32 {
        let centroid = self.centroid();
        self.corners
            .iter()
            .map(|c| (c - centroid).norm())
            .fold(0.0, f32::max)
    }

    /// Check if the region contains a point
    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|p| p.distance_to_point(point) >= 0.0)
    }

    /// Conservative region/sphere intersection: rejected only when some
    /// boundary plane fully separates the sphere.
    #[must_use]
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        self.planes
            .iter()
            .all(|p| p.distance_to_point(sphere.center) >= -sphere.radius)
    }

    /// Conservative region/AABB intersection: plane-separation test against
    /// the box's positive vertex, plus the box's own slabs against the
    /// region corners.
    #[must_use]
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        for plane in &self.planes {
            let mut positive = aabb.min;
            if plane.normal.x >= 0.0 {
                positive.x = aabb.max.x;
            }
            if plane.normal.y >= 0.0 {
                positive.y = aabb.max.y;
            }
            if plane.normal.z >= 0.0 {
                positive.z = aabb.max.z;
            }
            if plane.distance_to_point(positive) < 0.0 {
                return false;
            }
        }

        // Box slabs against region corners.
        for axis in 0..3 {
            if self.corners.iter().all(|c| c[axis] < aabb.min[axis])
                || self.corners.iter().all(|c| c[axis] > aabb.max[axis])
            {
                return false;
            }
        }

        true
    }

    /// Conservative region/region intersection: each region's planes tested
    /// against the other's corners.
    #[must_use]
    pub fn intersects_region(&self, other: &Self) -> bool {
        let separated = |planes: &[Plane; 6], corners: &[Vec3; 8]| {
            planes
                .iter()
                .any(|p| corners.iter().all(|c| p.distance_to_point(*c) < 0.0))
        };

        !separated(&self.planes, &other.corners) && !separated(&other.planes, &self.corners)
    }

    /// Region transformed by a matrix: corners are transformed and the
    /// boundary planes rebuilt from them.
    #[must_use]
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let corners = self
            .corners
            .map(|c| matrix.transform_point(&Point3::from(c)).coords);
        let planes = Self::build_planes(&corners);
        Self { corners, planes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_region() -> ConvexRegion {
        ConvexRegion::from_aabb(&Aabb::from_center_extents(
            Vec3::zeros(),
            Vec3::new(1.0, 1.0, 1.0),
        ))
    }

    #[test]
    fn contains_centroid_and_rejects_outside() {
        let region = unit_region();
        assert!(region.contains_point(Vec3::zeros()));
        assert!(!region.contains_point(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn sphere_separation() {
        let region = unit_region();
        assert!(region.intersects_sphere(&BoundingSphere::new(Vec3::new(1.5, 0.0, 0.0), 1.0)));
        assert!(!region.intersects_sphere(&BoundingSphere::new(Vec3::new(3.0, 0.0, 0.0), 1.0)));
    }

    #[test]
    fn aabb_separation() {
        let region = unit_region();
        let overlapping = Aabb::from_center_extents(Vec3::new(1.5, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let disjoint = Aabb::from_center_extents(Vec3::new(5.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));

        assert!(region.intersects_aabb(&overlapping));
        assert!(!region.intersects_aabb(&disjoint));
    }

    #[test]
    fn region_region_separation() {
        let a = unit_region();
        let b = a.transformed(&Mat4::new_translation(&Vec3::new(1.5, 0.0, 0.0)));
        let c = a.transformed(&Mat4::new_translation(&Vec3::new(5.0, 0.0, 0.0)));

        assert!(a.intersects_region(&b));
        assert!(!a.intersects_region(&c));
    }

    #[test]
    fn transform_moves_planes_with_corners() {
        let region = unit_region().transformed(&Mat4::new_translation(&Vec3::new(10.0, 0.0, 0.0)));
        assert!(region.contains_point(Vec3::new(10.0, 0.0, 0.0)));
        assert!(!region.contains_point(Vec3::zeros()));
    }
}
