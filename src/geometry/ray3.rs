use super::Vector3;
use crate::scalar::Scalar;
use serde::{Deserialize, Serialize};

/// A half-line `origin + t * direction`, `t >= 0`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ray3<T> {
    pub origin: Vector3<T>,
    pub direction: Vector3<T>,
}

impl<T: Scalar> Ray3<T> {
    #[inline]
    pub fn new(origin: Vector3<T>, direction: Vector3<T>) -> Self {
        Self { origin, direction }
    }

    #[inline]
    pub fn point_at(&self, t: T) -> Vector3<T> {
        self.origin + self.direction * t
    }

    /// Same ray with a unit direction.
    #[inline]
    pub fn normalize(&self) -> Self {
        Self::new(self.origin, self.direction.normalize())
    }
}
