//! Four boxes, rays or triangles packed lane-wise.
//!
//! A batch is always full: lane `i` of every field describes primitive `i`.
//! Callers with fewer than four live primitives pad by repeating one and mask
//! the padded lanes out of the results.
//!
//! Two ways in:
//!
//! - `splat` broadcasts one primitive, for testing one object against four
//!   different queries;
//! - `transpose` packs four primitives, for testing one query against four
//!   different objects.

use crate::backend::{SimdF32, SimdMask, SimdNum, LANES};
use crate::geometry::{Aabb3, Ray3, Vector3};
use crate::scalar::Scalar;
use crate::vector::SimdVector3;
use core::array;

/// Four axis-aligned boxes.
#[derive(Copy, Clone, Debug)]
pub struct SimdAabb3<S> {
    pub min: SimdVector3<S>,
    pub max: SimdVector3<S>,
}

impl<S: SimdNum> SimdAabb3<S>
where
    S::Elem: Scalar,
{
    #[inline(always)]
    pub fn new(min: SimdVector3<S>, max: SimdVector3<S>) -> Self {
        Self { min, max }
    }

    #[inline(always)]
    pub fn splat(aabb: &Aabb3<S::Elem>) -> Self {
        Self::new(SimdVector3::splat(&aabb.min), SimdVector3::splat(&aabb.max))
    }

    #[inline(always)]
    pub fn transpose(boxes: &[Aabb3<S::Elem>; LANES]) -> Self {
        Self::new(
            SimdVector3::transpose(&boxes.map(|b| b.min)),
            SimdVector3::transpose(&boxes.map(|b| b.max)),
        )
    }

    /// Corner 0 is `min`, corner 1 is `max`.
    ///
    /// Slab tests index this with a ray direction sign to pick the near and
    /// far planes without branching on the box.
    #[inline(always)]
    pub fn min_max(&self, corner: usize) -> &SimdVector3<S> {
        debug_assert!(corner < 2, "corner {corner} out of range");
        if corner == 0 {
            &self.min
        } else {
            &self.max
        }
    }

    #[inline]
    pub fn lane(&self, lane: usize) -> Aabb3<S::Elem> {
        Aabb3::new(self.min.lane(lane), self.max.lane(lane))
    }

    pub fn to_array(&self) -> [Aabb3<S::Elem>; LANES] {
        array::from_fn(|lane| self.lane(lane))
    }
}

/// Four rays.
#[derive(Copy, Clone, Debug)]
pub struct SimdRay3<S> {
    pub origin: SimdVector3<S>,
    pub direction: SimdVector3<S>,
}

impl<S: SimdNum> SimdRay3<S>
where
    S::Elem: Scalar,
{
    #[inline(always)]
    pub fn new(origin: SimdVector3<S>, direction: SimdVector3<S>) -> Self {
        Self { origin, direction }
    }

    #[inline(always)]
    pub fn splat(ray: &Ray3<S::Elem>) -> Self {
        Self::new(SimdVector3::splat(&ray.origin), SimdVector3::splat(&ray.direction))
    }

    #[inline(always)]
    pub fn transpose(rays: &[Ray3<S::Elem>; LANES]) -> Self {
        Self::new(
            SimdVector3::transpose(&rays.map(|r| r.origin)),
            SimdVector3::transpose(&rays.map(|r| r.direction)),
        )
    }

    /// `origin + t * direction`, per lane.
    #[inline(always)]
    pub fn point_at(&self, t: S) -> SimdVector3<S> {
        self.origin + self.direction * t
    }

    #[inline]
    pub fn lane(&self, lane: usize) -> Ray3<S::Elem> {
        Ray3::new(self.origin.lane(lane), self.direction.lane(lane))
    }

    pub fn to_array(&self) -> [Ray3<S::Elem>; LANES] {
        array::from_fn(|lane| self.lane(lane))
    }
}

/// Four triangles.
#[derive(Copy, Clone, Debug)]
pub struct SimdTriangle3<S> {
    pub v0: SimdVector3<S>,
    pub v1: SimdVector3<S>,
    pub v2: SimdVector3<S>,
}

impl<S: SimdNum> SimdTriangle3<S>
where
    S::Elem: Scalar,
{
    #[inline(always)]
    pub fn from_lanes(v0: SimdVector3<S>, v1: SimdVector3<S>, v2: SimdVector3<S>) -> Self {
        Self { v0, v1, v2 }
    }

    /// The triangle `(v0, v1, v2)` in every lane.
    #[inline(always)]
    pub fn splat(v0: &Vector3<S::Elem>, v1: &Vector3<S::Elem>, v2: &Vector3<S::Elem>) -> Self {
        Self::from_lanes(SimdVector3::splat(v0), SimdVector3::splat(v1), SimdVector3::splat(v2))
    }

    /// Packs four triangles given as vertex triples.
    #[inline(always)]
    pub fn transpose(triangles: &[[Vector3<S::Elem>; 3]; LANES]) -> Self {
        Self::from_lanes(
            SimdVector3::transpose(&triangles.map(|t| t[0])),
            SimdVector3::transpose(&triangles.map(|t| t[1])),
            SimdVector3::transpose(&triangles.map(|t| t[2])),
        )
    }

    #[inline]
    pub fn lane(&self, lane: usize) -> [Vector3<S::Elem>; 3] {
        [self.v0.lane(lane), self.v1.lane(lane), self.v2.lane(lane)]
    }

    pub fn to_array(&self) -> [[Vector3<S::Elem>; 3]; LANES] {
        array::from_fn(|lane| self.lane(lane))
    }
}

/// One ray broadcast to four lanes, with what a slab test needs precomputed.
#[derive(Copy, Clone, Debug)]
pub struct FatRay3<S> {
    pub origin: SimdVector3<S>,
    pub direction: SimdVector3<S>,
    /// Per-axis `1 / direction`.
    pub inverse_direction: SimdVector3<S>,
    /// Per-axis 1 where `inverse_direction` is positive, else 0. A `+0.0`
    /// direction component has a `+inf` reciprocal and counts as positive.
    pub sign: [usize; 3],
}

impl<S: SimdF32> FatRay3<S> {
    pub fn new(ray: &Ray3<f32>) -> Self {
        let d = ray.direction;
        let inverse = Vector3::new(d.x.recip(), d.y.recip(), d.z.recip());
        Self {
            origin: SimdVector3::splat(&ray.origin),
            direction: SimdVector3::splat(&d),
            inverse_direction: SimdVector3::splat(&inverse),
            sign: [
                (inverse.x > 0.0) as usize,
                (inverse.y > 0.0) as usize,
                (inverse.z > 0.0) as usize,
            ],
        }
    }

    /// The plain ray batch, for routines that do not need the extras.
    #[inline]
    pub fn as_rays(&self) -> SimdRay3<S> {
        SimdRay3::new(self.origin, self.direction)
    }
}

/// Four triangles with a caller-supplied payload per lane, so a hit lane can
/// be traced back to its source.
#[derive(Copy, Clone, Debug)]
pub struct FatTriangles3<S, P> {
    pub triangles: SimdTriangle3<S>,
    pub payload: [P; LANES],
}

impl<S: SimdF32, P: Copy> FatTriangles3<S, P> {
    #[inline]
    pub fn new(triangles: SimdTriangle3<S>, payload: [P; LANES]) -> Self {
        Self { triangles, payload }
    }

    /// Packs up to four triangles. A short chunk is padded by repeating its
    /// last triangle; `live` marks the lanes that hold real input.
    pub fn pack(chunk: &[([Vector3<f32>; 3], P)]) -> Option<(Self, S::Mask)> {
        let last = *chunk.last()?;
        let entry = |lane: usize| chunk.get(lane).copied().unwrap_or(last);
        let triangles = SimdTriangle3::transpose(&array::from_fn(|lane| entry(lane).0));
        let payload = array::from_fn(|lane| entry(lane).1);
        let live = S::Mask::from_bits((1u32 << chunk.len().min(LANES)) - 1);
        Some((Self::new(triangles, payload), live))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Lane4;
    use crate::lanes::F32x4;

    fn boxes() -> [Aabb3<f32>; 4] {
        array::from_fn(|i| {
            let i = i as f32;
            Aabb3::from_bounds(i, i + 1.0, -i, i, 0.0, 2.0 * i)
        })
    }

    #[test]
    fn aabb_transpose_round_trips() {
        let packed = SimdAabb3::<F32x4>::transpose(&boxes());
        assert_eq!(packed.to_array(), boxes());
        assert_eq!(packed.min_max(0).x.to_array(), [0.0, 1.0, 2.0, 3.0]);
        assert_eq!(packed.min_max(1).x.to_array(), [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn broadcast_repeats_one_primitive() {
        let ray = Ray3::new(Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.0, -1.0, 0.0));
        let rays = SimdRay3::<F32x4>::splat(&ray);
        assert_eq!(rays.to_array(), [ray; 4]);
        let far = rays.point_at(F32x4::new(0.0, 1.0, 2.0, 3.0));
        assert_eq!(far.lane(3), ray.point_at(3.0));
        let aabb = boxes()[2];
        assert_eq!(SimdAabb3::<F32x4>::splat(&aabb).to_array(), [aabb; 4]);
    }

    #[test]
    fn triangle_transpose_round_trips() {
        let tris: [[Vector3<f32>; 3]; 4] = array::from_fn(|i| {
            let i = i as f32;
            [Vector3::new(i, 0.0, 0.0), Vector3::new(i + 1.0, 0.0, 0.0), Vector3::new(i, 1.0, 0.0)]
        });
        let packed = SimdTriangle3::<F32x4>::transpose(&tris);
        assert_eq!(packed.to_array(), tris);
        assert_eq!(packed.lane(2), tris[2]);
    }

    #[test]
    fn fat_ray_signs_and_reciprocals() {
        let ray = Ray3::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(2.0, -4.0, 0.0));
        let fat = FatRay3::<F32x4>::new(&ray);
        assert_eq!(fat.sign, [1, 0, 1]);
        assert_eq!(fat.inverse_direction.lane(1), Vector3::new(0.5, -0.25, f32::INFINITY));
        assert_eq!(fat.as_rays().lane(0), ray);
    }

    #[test]
    fn pack_pads_short_chunks() {
        let tri = |x: f32| [Vector3::new(x, 0.0, 0.0), Vector3::new(x + 1.0, 0.0, 0.0), Vector3::new(x, 1.0, 0.0)];
        let chunk = [(tri(0.0), 10u32), (tri(5.0), 11)];
        let (packed, live) = FatTriangles3::<F32x4, u32>::pack(&chunk).expect("non-empty");
        assert_eq!(packed.payload, [10, 11, 11, 11]);
        assert_eq!(packed.triangles.lane(3), tri(5.0));
        assert_eq!(live.bitmask(), 0b0011);
        assert!(FatTriangles3::<F32x4, u32>::pack(&[]).is_none());
    }
}
