//! Plane primitive shared by the frustum and convex regions

use crate::foundation::math::Vec3;

/// Plane defined by normal and distance from origin.
///
/// A point `p` satisfies `normal · p + distance >= 0` when it is on the
/// plane's positive (inside) half-space.
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    /// Normal vector (normalized)
    pub normal: Vec3,
    /// Distance from origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a new plane from a normal and distance; the normal is
    /// normalized and the distance rescaled to match.
    #[must_use]
    pub fn new(normal: Vec3, distance: f32) -> Self {
        let len = normal.norm();
        Self {
            normal: normal / len,
            distance: distance / len,
        }
    }

    /// Plane through three counter-clockwise points, normal facing the
    /// viewer of the winding.
    #[must_use]
    pub fn from_points(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let normal = (b - a).cross(&(c - a)).normalize();
        Self {
            normal,
            distance: -normal.dot(&a),
        }
    }

    /// Signed distance from the plane to a point (positive = inside
    /// half-space).
    #[must_use]
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) + self.distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn signed_distance() {
        // Plane y = 2 with normal +Y.
        let plane = Plane::new(Vec3::y(), -2.0);
        assert_relative_eq!(plane.distance_to_point(Vec3::new(0.0, 5.0, 0.0)), 3.0);
        assert_relative_eq!(plane.distance_to_point(Vec3::new(0.0, 0.0, 0.0)), -2.0);
    }

    #[test]
    fn from_points_winding_sets_normal() {
        // XZ-plane triangle wound so the normal faces +Y.
        let plane = Plane::from_points(
            Vec3::zeros(),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
        );
        assert!(plane.distance_to_point(Vec3::new(0.0, 1.0, 0.0)) > 0.0);
    }

    #[test]
    fn new_normalizes_coefficients() {
        let plane = Plane::new(Vec3::new(0.0, 2.0, 0.0), -4.0);
        assert_relative_eq!(plane.normal.norm(), 1.0);
        assert_relative_eq!(plane.distance_to_point(Vec3::new(0.0, 2.0, 0.0)), 0.0);
    }
}
