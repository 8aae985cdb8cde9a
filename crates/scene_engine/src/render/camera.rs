//! Perspective camera with a cached culling frustum

use crate::bounds::Frustum;
use crate::foundation::math::{Mat4, Point3, Vec3};

/// A perspective camera.
///
/// Caches the view, projection, and combined matrices plus the world-space
/// frustum extracted from them; every setter recomputes the caches so the
/// frustum can never go stale relative to the matrices.
#[derive(Debug, Clone)]
pub struct Camera {
    eye: Vec3,
    target: Vec3,
    up: Vec3,
    fovy: f32,
    aspect: f32,
    near: f32,
    far: f32,
    view: Mat4,
    projection: Mat4,
    view_projection: Mat4,
    frustum: Frustum,
}

impl Camera {
    /// Create a perspective camera looking from `eye` toward `target`
    #[must_use]
    pub fn perspective(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fovy: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let mut camera = Self {
            eye,
            target,
            up,
            fovy,
            aspect,
            near,
            far,
            view: Mat4::identity(),
            projection: Mat4::identity(),
            view_projection: Mat4::identity(),
            frustum: Frustum::from_view_proj(&Mat4::identity()),
        };
        camera.recompute();
        camera
    }

    fn recompute(&mut self) {
        self.view = Mat4::look_at_rh(
            &Point3::from(self.eye),
            &Point3::from(self.target),
            &self.up,
        );
        self.projection = Mat4::new_perspective(self.aspect, self.fovy, self.near, self.far);
        self.view_projection = self.projection * self.view;
        self.frustum = Frustum::from_view_proj(&self.view_projection);
    }

    /// Move the camera and re-derive the cached matrices and frustum
    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.eye = eye;
        self.target = target;
        self.up = up;
        self.recompute();
    }

    /// Change the projection parameters and re-derive the caches
    pub fn set_projection(&mut self, fovy: f32, aspect: f32, near: f32, far: f32) {
        self.fovy = fovy;
        self.aspect = aspect;
        self.near = near;
        self.far = far;
        self.recompute();
    }

    /// Camera position in world space
    #[must_use]
    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    /// View matrix
    #[must_use]
    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    /// Projection matrix
    #[must_use]
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Combined projection * view matrix
    #[must_use]
    pub fn view_projection(&self) -> &Mat4 {
        &self.view_projection
    }

    /// World-space culling frustum
    #[must_use]
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// Approximate NDC-space height of a sphere of `radius` centered at
    /// `center`. Spheres at or behind the eye report as arbitrarily large so
    /// they are never size-culled while potentially on screen.
    #[must_use]
    pub fn projected_size(&self, center: Vec3, radius: f32) -> f32 {
        let distance = (center - self.eye).norm();
        if distance <= radius {
            return f32::INFINITY;
        }
        self.projection[(1, 1)] * radius / distance
    }
}
