//! Axis-aligned bounding intervals and boxes.
//!
//! Neither type enforces `min <= max`. An inverted box is a valid value (an
//! empty accumulator, for instance); `enlarge_for` and `union` are how the
//! ordering is established.

use super::Vector3;
use crate::scalar::{self, Scalar};
use core::ops::{Add, AddAssign};
use serde::{Deserialize, Serialize};

/// A closed 1D interval.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Aabb1<T> {
    pub min: T,
    pub max: T,
}

impl<T: Scalar> Aabb1<T> {
    #[inline]
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// True if `other` lies entirely inside `self`.
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        self.min <= other.min && self.max >= other.max
    }

    #[inline]
    pub fn contains_point(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }

    /// Strict overlap: touching intervals do not intersect.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min < other.max && self.max > other.min
    }

    #[inline]
    pub fn width(&self) -> T {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> T {
        scalar::average(self.min, self.max)
    }

    pub fn enlarge_for(&mut self, value: T) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(scalar::min(self.min, other.min), scalar::max(self.max, other.max))
    }
}

/// A box bounded by two corners.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Aabb3<T> {
    pub min: Vector3<T>,
    pub max: Vector3<T>,
}

impl<T: Scalar> Aabb3<T> {
    #[inline]
    pub fn new(min: Vector3<T>, max: Vector3<T>) -> Self {
        Self { min, max }
    }

    /// Builds a box from per-axis extents.
    #[inline]
    pub fn from_bounds(x_min: T, x_max: T, y_min: T, y_max: T, z_min: T, z_max: T) -> Self {
        Self::new(Vector3::new(x_min, y_min, z_min), Vector3::new(x_max, y_max, z_max))
    }

    /// The box spanning one axis of `self`.
    #[inline]
    pub fn axis(&self, axis: usize) -> Aabb1<T> {
        Aabb1::new(self.min[axis], self.max[axis])
    }

    /// True if `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Self) -> bool {
        (0..3).all(|axis| self.axis(axis).contains(&other.axis(axis)))
    }

    pub fn contains_point(&self, point: Vector3<T>) -> bool {
        (0..3).all(|axis| self.axis(axis).contains_point(point[axis]))
    }

    /// Strict overlap on every axis.
    pub fn intersects(&self, other: &Self) -> bool {
        (0..3).all(|axis| self.axis(axis).intersects(&other.axis(axis)))
    }

    #[inline]
    pub fn width(&self) -> T {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> T {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn depth(&self) -> T {
        self.max.z - self.min.z
    }

    #[inline]
    pub fn diagonal(&self) -> Vector3<T> {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vector3<T> {
        self.min.midpoint(self.max)
    }

    #[inline]
    pub fn volume(&self) -> T {
        self.width() * self.height() * self.depth()
    }

    /// Grows the box to include `point`. Each axis checks both bounds, so a
    /// box that starts inverted ends up containing the point.
    pub fn enlarge_for(&mut self, point: Vector3<T>) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }
}

impl<T: Scalar> Add<Vector3<T>> for Aabb3<T> {
    type Output = Self;

    fn add(mut self, point: Vector3<T>) -> Self {
        self.enlarge_for(point);
        self
    }
}

impl<T: Scalar> Add for Aabb3<T> {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        self.union(&other)
    }
}

impl<T: Scalar> AddAssign<Vector3<T>> for Aabb3<T> {
    fn add_assign(&mut self, point: Vector3<T>) {
        self.enlarge_for(point);
    }
}

impl<T: Scalar> AddAssign for Aabb3<T> {
    fn add_assign(&mut self, other: Self) {
        *self = self.union(&other);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_queries() {
        let a = Aabb1::new(0, 4);
        assert!(a.contains(&Aabb1::new(1, 4)));
        assert!(a.contains_point(0));
        assert!(!a.intersects(&Aabb1::new(4, 6)));
        assert!(a.intersects(&Aabb1::new(3, 6)));
        assert_eq!(a.union(&Aabb1::new(-1, 2)), Aabb1::new(-1, 4));
        assert_eq!(a.center(), 2);
    }

    #[test]
    fn box_measurements() {
        let b = Aabb3::from_bounds(0.0f32, 2.0, -1.0, 1.0, 0.0, 4.0);
        assert_eq!(b.diagonal(), Vector3::new(2.0, 2.0, 4.0));
        assert_eq!(b.center(), Vector3::new(1.0, 0.0, 2.0));
        assert_eq!(b.volume(), 16.0);
        assert!(b.contains_point(Vector3::new(2.0, 1.0, 4.0)));
        assert!(!b.contains_point(Vector3::new(2.0, 1.1, 4.0)));
    }

    #[test]
    fn enlarge_from_inverted_box_covers_both_bounds() {
        let mut b = Aabb3::new(Vector3::splat(f32::MAX), Vector3::splat(-f32::MAX));
        b.enlarge_for(Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(b, Aabb3::new(Vector3::new(1.0, 2.0, 3.0), Vector3::new(1.0, 2.0, 3.0)));
        b += Vector3::new(-1.0, 5.0, 3.0);
        assert_eq!(b, Aabb3::from_bounds(-1.0, 1.0, 2.0, 5.0, 3.0, 3.0));
    }

    #[test]
    fn union_contains_both_and_intersection_is_symmetric() {
        let a = Aabb3::from_bounds(0, 2, 0, 2, 0, 2);
        let b = Aabb3::from_bounds(1, 3, -1, 1, 1, 5);
        let u = a + b;
        assert!(u.contains(&a) && u.contains(&b));
        assert_eq!(a.intersects(&b), b.intersects(&a));
        assert!(a.intersects(&b));
    }
}
