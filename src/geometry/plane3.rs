use super::Vector3;
use crate::scalar::Scalar;
use core::ops::Neg;
use serde::{Deserialize, Serialize};

/// The plane `dot(normal, p) + offset == 0`.
///
/// The normal need not be unit length; the `*_normalized` queries assume it
/// is and skip the division.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plane3<T> {
    pub normal: Vector3<T>,
    pub offset: T,
}

impl<T: Scalar> Default for Plane3<T> {
    /// The XY plane through the origin.
    fn default() -> Self {
        Self::new(Vector3::new(T::ZERO, T::ZERO, T::ONE), T::ZERO)
    }
}

impl<T: Scalar> Plane3<T> {
    #[inline]
    pub fn new(normal: Vector3<T>, offset: T) -> Self {
        Self { normal, offset }
    }

    /// The plane with `normal` passing through `point`.
    #[inline]
    pub fn from_point(normal: Vector3<T>, point: Vector3<T>) -> Self {
        Self::new(normal, T::ZERO - point.dot(normal))
    }

    /// The plane through three points, with a unit normal following their
    /// counter-clockwise winding.
    pub fn from_points(a: Vector3<T>, b: Vector3<T>, c: Vector3<T>) -> Self {
        Self::from_point((b - a).cross(c - a).normalize(), a)
    }

    #[inline]
    pub fn signed_distance_to(&self, point: Vector3<T>) -> T {
        self.normal.dot(point) + self.offset
    }

    #[inline]
    pub fn distance_to(&self, point: Vector3<T>) -> T {
        self.signed_distance_to(point).abs()
    }

    /// Closest point of the plane to `point`.
    pub fn projection(&self, point: Vector3<T>) -> Vector3<T> {
        let t = self.signed_distance_to(point) / self.normal.magnitude_squared();
        point - self.normal * t
    }

    #[inline]
    pub fn projection_normalized(&self, point: Vector3<T>) -> Vector3<T> {
        point - self.normal * self.signed_distance_to(point)
    }

    /// Mirror image of `point` across the plane.
    pub fn reflection(&self, point: Vector3<T>) -> Vector3<T> {
        let t = self.signed_distance_to(point) / self.normal.magnitude_squared();
        point - self.normal * (t + t)
    }

    #[inline]
    pub fn reflection_normalized(&self, point: Vector3<T>) -> Vector3<T> {
        let t = self.signed_distance_to(point);
        point - self.normal * (t + t)
    }

    /// The same plane with a unit normal.
    pub fn normalize(&self) -> Self {
        let inverse = T::ONE / self.normal.magnitude();
        Self::new(self.normal * inverse, self.offset * inverse)
    }

    /// A point on the plane, assuming a unit normal.
    #[inline]
    pub fn point(&self) -> Vector3<T> {
        self.normal * (T::ZERO - self.offset)
    }
}

impl<T: Scalar + Neg<Output = T>> Neg for Plane3<T> {
    type Output = Self;

    /// Same plane, facing the other way.
    fn neg(self) -> Self {
        Self::new(-self.normal, -self.offset)
    }
}
