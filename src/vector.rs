//! Structure-of-arrays 3D vectors.
//!
//! A [`SimdVector3`] holds four independent 3D vectors, one per lane: lane
//! `i` of `x`, `y` and `z` together form vector `i`. Everything here works
//! lane by lane. [`dot`] yields four dot products and [`cross`] four cross
//! products; nothing reduces across lanes.

use crate::backend::{Lane4, SimdF32, SimdNum, LANES};
use crate::geometry::Vector3;
use core::array;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Four 3D vectors in SoA layout.
#[derive(Copy, Clone, Debug)]
pub struct SimdVector3<S> {
    pub x: S,
    pub y: S,
    pub z: S,
}

impl<S: SimdNum> SimdVector3<S> {
    #[inline(always)]
    pub fn new(x: S, y: S, z: S) -> Self {
        Self { x, y, z }
    }

    /// The same vector in every lane.
    #[inline(always)]
    pub fn splat(v: &Vector3<S::Elem>) -> Self {
        Self::new(S::splat(v.x), S::splat(v.y), S::splat(v.z))
    }

    /// Packs four vectors, vector `i` into lane `i`. Uses the backend's
    /// register transpose instead of per-lane stores.
    #[inline(always)]
    pub fn transpose(vectors: &[Vector3<S::Elem>; LANES]) -> Self {
        let [x, y, z] = S::transpose3(vectors.map(Vector3::to_array));
        Self::new(x, y, z)
    }

    /// The vector held in `lane`.
    #[inline]
    pub fn lane(&self, lane: usize) -> Vector3<S::Elem> {
        Vector3::new(self.x.get(lane), self.y.get(lane), self.z.get(lane))
    }

    /// All four vectors, lane order.
    pub fn to_array(&self) -> [Vector3<S::Elem>; LANES] {
        let (x, y, z) = (self.x.to_array(), self.y.to_array(), self.z.to_array());
        array::from_fn(|lane| Vector3::new(x[lane], y[lane], z[lane]))
    }

    #[inline(always)]
    pub fn select(mask: S::Mask, if_true: Self, if_false: Self) -> Self {
        Self::new(
            S::select(mask, if_true.x, if_false.x),
            S::select(mask, if_true.y, if_false.y),
            S::select(mask, if_true.z, if_false.z),
        )
    }

    /// Lanes whose three components all compare equal.
    #[inline(always)]
    pub fn simd_eq(self, rhs: Self) -> S::Mask {
        self.x.simd_eq(rhs.x) & self.y.simd_eq(rhs.y) & self.z.simd_eq(rhs.z)
    }

    #[inline(always)]
    pub fn dot(self, rhs: Self) -> S {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline(always)]
    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    #[inline(always)]
    pub fn magnitude_squared(self) -> S {
        self.dot(self)
    }

    #[inline(always)]
    pub fn component_mul(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }

    #[inline(always)]
    pub fn component_div(self, rhs: Self) -> Self {
        Self::new(self.x / rhs.x, self.y / rhs.y, self.z / rhs.z)
    }

    #[inline(always)]
    pub fn min(self, rhs: Self) -> Self {
        Self::new(self.x.min(rhs.x), self.y.min(rhs.y), self.z.min(rhs.z))
    }

    #[inline(always)]
    pub fn max(self, rhs: Self) -> Self {
        Self::new(self.x.max(rhs.x), self.y.max(rhs.y), self.z.max(rhs.z))
    }

    #[inline(always)]
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }
}

impl<S: SimdF32> SimdVector3<S> {
    #[inline(always)]
    pub fn magnitude(self) -> S {
        self.magnitude_squared().sqrt()
    }

    /// Per-lane unit vectors. Unlike [`Vector3::normalize`] there is no zero
    /// guard: a zero-length lane comes out NaN.
    #[inline(always)]
    pub fn normalize(self) -> Self {
        self * self.magnitude().recip()
    }

    /// Per-lane reciprocal of each component.
    #[inline(always)]
    pub fn recip(self) -> Self {
        Self::new(self.x.recip(), self.y.recip(), self.z.recip())
    }
}

/// Per-lane dot product.
#[inline(always)]
pub fn dot<S: SimdNum>(a: SimdVector3<S>, b: SimdVector3<S>) -> S {
    a.dot(b)
}

/// Per-lane cross product.
#[inline(always)]
pub fn cross<S: SimdNum>(a: SimdVector3<S>, b: SimdVector3<S>) -> SimdVector3<S> {
    a.cross(b)
}

impl<S: SimdNum> Add for SimdVector3<S> {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl<S: SimdNum> Sub for SimdVector3<S> {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl<S: SimdNum> Neg for SimdVector3<S> {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Scales lane `i` of every component by lane `i` of `rhs`.
impl<S: SimdNum> Mul<S> for SimdVector3<S> {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: S) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl<S: SimdNum> Div<S> for SimdVector3<S> {
    type Output = Self;
    #[inline(always)]
    fn div(self, rhs: S) -> Self {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl<S: SimdNum> AddAssign for SimdVector3<S> {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<S: SimdNum> SubAssign for SimdVector3<S> {
    #[inline(always)]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<S: SimdNum> MulAssign<S> for SimdVector3<S> {
    #[inline(always)]
    fn mul_assign(&mut self, rhs: S) {
        *self = *self * rhs;
    }
}

impl<S: SimdNum> DivAssign<S> for SimdVector3<S> {
    #[inline(always)]
    fn div_assign(&mut self, rhs: S) {
        *self = *self / rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::portable::F32x4 as PortableF32;
    use crate::backend::SimdMask;
    use crate::lanes::{F32x4, I32x4};

    fn sample() -> [Vector3<f32>; 4] {
        [
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(-4.0, 5.0, 0.5),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(7.0, -8.0, 9.0),
        ]
    }

    #[test]
    fn transpose_then_lane_reads_back() {
        let packed = SimdVector3::<F32x4>::transpose(&sample());
        assert_eq!(packed.to_array(), sample());
        assert_eq!(packed.x.to_array(), [1.0, -4.0, 0.0, 7.0]);
        let portable = SimdVector3::<PortableF32>::transpose(&sample());
        assert_eq!(portable.to_array(), sample());
    }

    #[test]
    fn splat_fills_every_lane() {
        let v = Vector3::new(3, -1, 2);
        let packed = SimdVector3::<I32x4>::splat(&v);
        assert_eq!(packed.to_array(), [v; 4]);
    }

    #[test]
    fn dot_and_cross_are_per_lane() {
        let a = sample();
        let b = [
            Vector3::new(0.5, 0.5, 0.5),
            Vector3::new(1.0, 0.0, -1.0),
            Vector3::new(2.0, 2.0, 2.0),
            Vector3::new(-1.0, 3.0, 0.25),
        ];
        let (pa, pb) = (SimdVector3::<F32x4>::transpose(&a), SimdVector3::transpose(&b));
        let dots = dot(pa, pb).to_array();
        let crosses = cross(pa, pb).to_array();
        for lane in 0..LANES {
            assert_eq!(dots[lane], a[lane].dot(b[lane]));
            assert_eq!(crosses[lane], a[lane].cross(b[lane]));
        }
    }

    #[test]
    fn select_and_equality() {
        let a = SimdVector3::<F32x4>::transpose(&sample());
        let b = SimdVector3::splat(&Vector3::new(1.0, 2.0, 3.0));
        let same = a.simd_eq(b);
        assert_eq!(same.bitmask(), 0b0001);
        let picked = SimdVector3::select(!same, a, -a);
        assert_eq!(picked.lane(0), Vector3::new(-1.0, -2.0, -3.0));
        assert_eq!(picked.lane(3), sample()[3]);
    }

    #[test]
    fn normalize_has_no_zero_guard() {
        let unit = SimdVector3::<F32x4>::transpose(&sample()).normalize();
        assert!(unit.lane(2).x.is_nan());
        assert!((unit.lane(3).magnitude() - 1.0).abs() < 1e-6);
    }
}
