//! # Picking
//!
//! Mouse ray casting against axis-aligned bounds and planes.
//!
//! 1. **Mouse to Ray**: [`screen_to_ray`] unprojects a cursor position
//! 2. **Intersection**: [`AABB::intersect_ray`] and [`Ray::intersect_plane`]

use cgmath::{ElementWise, InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4, Zero};

use crate::gfx::camera::orbit_camera::OrbitCamera;

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the plane through `point` with `normal`.
    ///
    /// `None` when the ray is parallel to the plane or the plane is behind it.
    pub fn intersect_plane(&self, point: Vector3<f32>, normal: Vector3<f32>) -> Option<f32> {
        let denom = normal.dot(self.direction);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = normal.dot(point - self.origin) / denom;
        (t >= 0.0).then_some(t)
    }
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl AABB {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Create AABB from a set of vertices
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        let Some(first) = vertices.first() else {
            return Self::new(Vector3::zero(), Vector3::zero());
        };

        let mut min = Vector3::from(*first);
        let mut max = min;

        for vertex in vertices.iter().skip(1) {
            min.x = min.x.min(vertex[0]);
            min.y = min.y.min(vertex[1]);
            min.z = min.z.min(vertex[2]);
            max.x = max.x.max(vertex[0]);
            max.y = max.y.max(vertex[1]);
            max.z = max.z.max(vertex[2]);
        }

        Self::new(min, max)
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    /// Test ray-AABB intersection
    /// Returns the distance to intersection point, or None if no intersection
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }

    /// Apply a transformation matrix to the AABB
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        let corners = [
            [self.min.x, self.min.y, self.min.z],
            [self.max.x, self.min.y, self.min.z],
            [self.min.x, self.max.y, self.min.z],
            [self.min.x, self.min.y, self.max.z],
            [self.max.x, self.max.y, self.min.z],
            [self.max.x, self.min.y, self.max.z],
            [self.min.x, self.max.y, self.max.z],
            [self.max.x, self.max.y, self.max.z],
        ];

        let transformed = corners.map(|c| {
            let p = matrix * Vector4::new(c[0], c[1], c[2], 1.0);
            [p.x / p.w, p.y / p.w, p.z / p.w]
        });

        Self::from_vertices(&transformed)
    }
}

/// Converts a cursor position in physical pixels to a world-space ray
pub fn screen_to_ray(
    screen_pos: (f32, f32),
    screen_size: (f32, f32),
    camera: &OrbitCamera,
) -> Option<Ray> {
    let (mouse_x, mouse_y) = screen_pos;
    let (screen_width, screen_height) = screen_size;
    if screen_width <= 0.0 || screen_height <= 0.0 {
        return None;
    }

    // Normalized device coordinates, Y up
    let ndc_x = (2.0 * mouse_x) / screen_width - 1.0;
    let ndc_y = 1.0 - (2.0 * mouse_y) / screen_height;

    let inv_view_proj = (camera.projection_matrix() * camera.view_matrix()).invert()?;

    // wgpu clip space depth runs from 0 (near) to 1 (far)
    let unproject = |z: f32| {
        let p = inv_view_proj * Vector4::new(ndc_x, ndc_y, z, 1.0);
        Vector3::new(p.x / p.w, p.y / p.w, p.z / p.w)
    };
    let near = unproject(0.0);
    let far = unproject(1.0);

    Some(Ray::new(near, far - near))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::orbit_camera::OrbitPose;
    use cgmath::Deg;

    #[test]
    fn test_aabb_creation() {
        let aabb = AABB::from_vertices(&[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [-1.0, -1.0, -1.0]]);

        assert_eq!(aabb.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(aabb.max, Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(aabb.center(), Vector3::zero());
    }

    #[test]
    fn test_ray_aabb_intersection() {
        let aabb = AABB::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));

        let ray = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(aabb.intersect_ray(&ray), Some(4.0));

        let ray_miss = Ray::new(Vector3::new(5.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&ray_miss).is_none());
    }

    #[test]
    fn test_aabb_transform_translates_bounds() {
        let aabb = AABB::new(Vector3::new(-0.5, -0.5, -0.5), Vector3::new(0.5, 0.5, 0.5));
        let moved = aabb.transform(&Matrix4::from_translation(Vector3::new(2.0, 0.0, 0.0)));
        assert_eq!(moved.center(), Vector3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_plane_intersection() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let t = ray.intersect_plane(Vector3::zero(), Vector3::unit_z());
        assert_eq!(t, Some(5.0));

        let parallel = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::unit_x());
        assert!(parallel.intersect_plane(Vector3::zero(), Vector3::unit_z()).is_none());
    }

    #[test]
    fn test_center_of_screen_ray_points_at_target() {
        let camera = OrbitCamera::new(
            OrbitPose::looking_at(Vector3::new(-0.7, 0.8, 3.0), Vector3::zero()),
            1200.0 / 800.0,
            Deg(75.0).into(),
            0.1,
            100.0,
        );
        let ray = screen_to_ray((600.0, 400.0), (1200.0, 800.0), &camera).unwrap();
        let to_target = (camera.target - camera.eye).normalize();
        assert!((ray.direction - to_target).magnitude() < 1e-3);
    }
}
