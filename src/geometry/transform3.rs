use super::{Matrix3, Plane3, Ray3, Vector3};
use crate::scalar::Scalar;
use serde::{Deserialize, Serialize};

/// A rigid transform with uniform scale: world = position + orientation * (object * scale).
///
/// `orientation` is assumed orthonormal, so its inverse is its transpose.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform3<T> {
    pub position: Vector3<T>,
    pub orientation: Matrix3<T>,
    pub scale: T,
}

impl<T: Scalar> Default for Transform3<T> {
    fn default() -> Self {
        Self::new(Vector3::ZERO, Matrix3::IDENTITY, T::ONE)
    }
}

impl<T: Scalar> Transform3<T> {
    #[inline]
    pub fn new(position: Vector3<T>, orientation: Matrix3<T>, scale: T) -> Self {
        Self { position, orientation, scale }
    }

    #[inline]
    pub fn from_position(position: Vector3<T>) -> Self {
        Self::new(position, Matrix3::IDENTITY, T::ONE)
    }

    pub fn point_to_object_space(&self, point: Vector3<T>) -> Vector3<T> {
        ((point - self.position) * self.orientation) / self.scale
    }

    pub fn point_to_world_space(&self, point: Vector3<T>) -> Vector3<T> {
        self.position + (self.orientation * point) * self.scale
    }

    #[inline]
    pub fn matrix_to_object_space(&self, matrix: Matrix3<T>) -> Matrix3<T> {
        matrix * self.orientation
    }

    #[inline]
    pub fn matrix_to_world_space(&self, matrix: Matrix3<T>) -> Matrix3<T> {
        self.orientation * matrix
    }

    pub fn ray_to_object_space(&self, ray: &Ray3<T>) -> Ray3<T> {
        Ray3::new(self.point_to_object_space(ray.origin), ray.direction * self.orientation)
    }

    pub fn ray_to_world_space(&self, ray: &Ray3<T>) -> Ray3<T> {
        Ray3::new(self.point_to_world_space(ray.origin), self.orientation * ray.direction)
    }

    /// Maps a plane with a unit normal into object space.
    pub fn plane_to_object_space(&self, plane: &Plane3<T>) -> Plane3<T> {
        Plane3::from_point(plane.normal * self.orientation, self.point_to_object_space(plane.point()))
    }

    /// Maps a plane with a unit normal into world space.
    pub fn plane_to_world_space(&self, plane: &Plane3<T>) -> Plane3<T> {
        Plane3::from_point(self.orientation * plane.normal, self.point_to_world_space(plane.point()))
    }

    #[inline]
    pub fn rotate_to_object_space(&self, v: Vector3<T>) -> Vector3<T> {
        v * self.orientation
    }

    #[inline]
    pub fn rotate_to_world_space(&self, v: Vector3<T>) -> Vector3<T> {
        self.orientation * v
    }

    #[inline]
    pub fn scale_to_object_space(&self, v: Vector3<T>) -> Vector3<T> {
        v / self.scale
    }

    #[inline]
    pub fn scale_to_world_space(&self, v: Vector3<T>) -> Vector3<T> {
        v * self.scale
    }

    /// Object-space length of a world-space length.
    #[inline]
    pub fn length_to_object_space(&self, length: T) -> T {
        length / self.scale
    }

    #[inline]
    pub fn length_to_world_space(&self, length: T) -> T {
        length * self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn near(a: Vector3<f64>, b: Vector3<f64>) -> bool {
        (a - b).magnitude() < 1e-9
    }

    fn sample() -> Transform3<f64> {
        Transform3::new(Vector3::new(1.0, 2.0, 3.0), Matrix3::rotation_z_degrees(90.0), 2.0)
    }

    #[test]
    fn points_round_trip() {
        let t = sample();
        let p = Vector3::new(0.5, -4.0, 7.0);
        assert!(near(t.point_to_object_space(t.point_to_world_space(p)), p));
        assert!(near(t.point_to_world_space(t.point_to_object_space(p)), p));
    }

    #[test]
    fn identity_leaves_everything_alone() {
        let t = Transform3::<f32>::default();
        let ray = Ray3::new(Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(t.ray_to_world_space(&ray), ray);
        assert_eq!(t.ray_to_object_space(&ray), ray);
        assert_eq!(t.length_to_world_space(4.0), 4.0);
    }

    #[test]
    fn planes_follow_their_points() {
        let t = sample();
        let plane = Plane3::from_point(Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, 1.0));
        let world = t.plane_to_world_space(&plane);
        let on_plane = t.point_to_world_space(Vector3::new(3.0, -1.0, 1.0));
        assert!(world.signed_distance_to(on_plane).abs() < 1e-9);
        let back = t.plane_to_object_space(&world);
        assert!(near(back.normal, plane.normal));
        assert!((back.offset - plane.offset).abs() < 1e-9);
    }
}
