//! Packet intersection built on the lane primitives.
//!
//! These are the routines a traversal layer runs at each node and leaf: one
//! ray against four boxes, four rays against four triangles, and the
//! branch-free pick of the nearest lane. All of them answer with a mask
//! instead of branching per lane.

use crate::backend::{shuffle_mask, Lane4, SimdF32, SimdMask, SimdNum};
use crate::batch::{FatRay3, FatTriangles3, SimdAabb3, SimdRay3, SimdTriangle3};
use crate::geometry::Ray3;
use crate::vector::{cross, dot};

/// Default determinant cutoff below which a ray counts as parallel to a
/// triangle.
pub const DEFAULT_TRIANGLE_EPSILON: f32 = 1e-6;

/// Result of [`ray_boxes`].
#[derive(Copy, Clone, Debug)]
pub struct BoxHits<S: Lane4> {
    pub mask: S::Mask,
    /// Entry distance per lane. Only meaningful where `mask` is set.
    pub distance: S,
}

/// Result of [`ray_triangles`].
#[derive(Copy, Clone, Debug)]
pub struct TriangleHits<S: Lane4> {
    pub mask: S::Mask,
    pub t: S,
    /// Barycentric weight of `v1`.
    pub u: S,
    /// Barycentric weight of `v2`.
    pub v: S,
}

/// Nearest triangle hit found by [`nearest_triangle`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriangleHit<P> {
    pub payload: P,
    pub distance: f32,
    pub u: f32,
    pub v: f32,
}

/// Slab test of one ray against four boxes.
///
/// A lane hits when the ray's entry distance does not exceed its exit
/// distance and the exit lies in front of the origin. A ray starting inside a
/// box hits it with a negative entry distance.
pub fn ray_boxes<S: SimdF32>(ray: &FatRay3<S>, boxes: &SimdAabb3<S>) -> BoxHits<S> {
    let near = boxes.min_max(1 - ray.sign[0]);
    let far = boxes.min_max(ray.sign[0]);
    let mut t_min = (near.x - ray.origin.x) * ray.inverse_direction.x;
    let mut t_max = (far.x - ray.origin.x) * ray.inverse_direction.x;

    let near = boxes.min_max(1 - ray.sign[1]);
    let far = boxes.min_max(ray.sign[1]);
    let ty_min = (near.y - ray.origin.y) * ray.inverse_direction.y;
    let ty_max = (far.y - ray.origin.y) * ray.inverse_direction.y;

    let mut hit = t_min.simd_le(ty_max) & ty_min.simd_le(t_max);
    t_min = t_min.max(ty_min);
    t_max = t_max.min(ty_max);

    let near = boxes.min_max(1 - ray.sign[2]);
    let far = boxes.min_max(ray.sign[2]);
    let tz_min = (near.z - ray.origin.z) * ray.inverse_direction.z;
    let tz_max = (far.z - ray.origin.z) * ray.inverse_direction.z;

    hit &= t_min.simd_le(tz_max) & tz_min.simd_le(t_max);
    t_min = t_min.max(tz_min);
    t_max = t_max.min(tz_max);

    hit &= t_min.simd_le(t_max) & t_max.simd_gt(S::splat(0.0));
    BoxHits { mask: hit, distance: t_min }
}

/// Möller–Trumbore, lane `i` of `rays` against lane `i` of `triangles`.
///
/// Rays nearly parallel to a triangle (`|det| <= epsilon`) miss it, as do
/// hits behind the origin. Edges and vertices count as inside.
pub fn ray_triangles<S: SimdF32>(rays: &SimdRay3<S>, triangles: &SimdTriangle3<S>, epsilon: f32) -> TriangleHits<S> {
    let zero = S::splat(0.0);
    let one = S::splat(1.0);

    let edge1 = triangles.v1 - triangles.v0;
    let edge2 = triangles.v2 - triangles.v0;
    let p = cross(rays.direction, edge2);
    let det = dot(edge1, p);
    let upright = det.abs().simd_gt(S::splat(epsilon));
    let inverse_det = det.recip();

    let to_origin = rays.origin - triangles.v0;
    let u = dot(to_origin, p) * inverse_det;
    let q = cross(to_origin, edge1);
    let v = dot(rays.direction, q) * inverse_det;
    let t = dot(edge2, q) * inverse_det;

    let inside = u.simd_ge(zero) & u.simd_le(one) & v.simd_ge(zero) & (u + v).simd_le(one);
    TriangleHits { mask: upright & inside & t.simd_ge(zero), t, u, v }
}

/// Lane with the smallest `t` among the lanes set in `mask`, and that `t`.
///
/// Two shuffle rounds leave the minimum and its lane index in lane 0. The
/// mask travels with the reduction so a masked-out lane never beats a live
/// one, even when the live `t` is infinite. Ties go to the lower lane.
pub fn closest_hit<S: SimdF32>(mask: S::Mask, t: S) -> Option<(usize, f32)> {
    if mask.none() {
        return None;
    }
    let t = S::select(mask, t, S::splat(f32::INFINITY));
    let index = S::Int::new(0, 1, 2, 3);

    let (t, index, mask) = keep_nearer(
        (t, index, mask),
        (
            t.shuffle::<{ shuffle_mask(2, 3, 0, 1) }>(),
            index.shuffle::<{ shuffle_mask(2, 3, 0, 1) }>(),
            mask.shuffle::<{ shuffle_mask(2, 3, 0, 1) }>(),
        ),
    );
    let (t, index, _) = keep_nearer(
        (t, index, mask),
        (
            t.shuffle::<{ shuffle_mask(1, 0, 3, 2) }>(),
            index.shuffle::<{ shuffle_mask(1, 0, 3, 2) }>(),
            mask.shuffle::<{ shuffle_mask(1, 0, 3, 2) }>(),
        ),
    );
    Some((index.get(0) as usize, t.get(0)))
}

type Candidate<S> = (S, <S as SimdF32>::Int, <S as Lane4>::Mask);

#[inline(always)]
fn keep_nearer<S: SimdF32>(
    (t, index, live): Candidate<S>,
    (other_t, other_index, other_live): Candidate<S>,
) -> Candidate<S> {
    let nearer = t.simd_lt(other_t) | (t.simd_eq(other_t) & index.simd_lt(other_index));
    let keep = (live & !other_live) | (live.simd_eq(other_live) & nearer);
    (
        S::select(keep, t, other_t),
        S::Int::select(keep, index, other_index),
        live | other_live,
    )
}

/// Nearest hit of one ray over a list of triangle packets.
///
/// `live` masks give each packet's real lanes; padded lanes never report.
pub fn nearest_triangle<S: SimdF32, P: Copy>(
    ray: &Ray3<f32>,
    packets: &[(FatTriangles3<S, P>, S::Mask)],
    epsilon: f32,
) -> Option<TriangleHit<P>> {
    let rays = SimdRay3::splat(ray);
    let mut nearest: Option<TriangleHit<P>> = None;
    for (packet, live) in packets {
        let hits = ray_triangles(&rays, &packet.triangles, epsilon);
        let Some((lane, distance)) = closest_hit(hits.mask & *live, hits.t) else {
            continue;
        };
        if nearest.map_or(true, |best| distance < best.distance) {
            nearest = Some(TriangleHit {
                payload: packet.payload[lane],
                distance,
                u: hits.u.get(lane),
                v: hits.v.get(lane),
            });
        }
    }
    nearest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Aabb3, Vector3};
    use crate::lanes::{F32x4, Mask4};

    fn scenario_triangles() -> [[Vector3<f32>; 3]; 4] {
        let v0 = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)];
        v0.map(|(x, y)| {
            [
                Vector3::new(x, y, 0.0),
                Vector3::new(x + 1.0, y, 0.0),
                Vector3::new(x, y + 1.0, 0.0),
            ]
        })
    }

    fn down_ray(x: f32, y: f32) -> Ray3<f32> {
        Ray3::new(Vector3::new(x, y, 1.0), Vector3::new(0.0, 0.0, -1.0))
    }

    #[test]
    fn only_lane_zero_is_hit() {
        let triangles = SimdTriangle3::<F32x4>::transpose(&scenario_triangles());
        let rays = SimdRay3::splat(&down_ray(0.4, 0.4));
        let hits = ray_triangles(&rays, &triangles, DEFAULT_TRIANGLE_EPSILON);
        assert_eq!(hits.mask.bitmask(), 0b0001);
        assert!((hits.t.get(0) - 1.0).abs() < 1e-6);
        assert!((hits.u.get(0) - 0.4).abs() < 1e-6);
        assert!((hits.v.get(0) - 0.4).abs() < 1e-6);
        let (lane, t) = closest_hit::<F32x4>(hits.mask, hits.t).expect("lane 0 hits");
        assert_eq!(lane, 0);
        assert!((t - 1.0).abs() < 1e-6);
    }

    #[test]
    fn parallel_and_backward_rays_miss() {
        let triangles = SimdTriangle3::<F32x4>::transpose(&scenario_triangles());
        let sideways = Ray3::new(Vector3::new(0.4, 0.4, 1.0), Vector3::new(1.0, 0.0, 0.0));
        let hits = ray_triangles(&SimdRay3::splat(&sideways), &triangles, DEFAULT_TRIANGLE_EPSILON);
        assert!(hits.mask.none());
        let upward = Ray3::new(Vector3::new(0.4, 0.4, 1.0), Vector3::new(0.0, 0.0, 1.0));
        let hits = ray_triangles(&SimdRay3::splat(&upward), &triangles, DEFAULT_TRIANGLE_EPSILON);
        assert!(hits.mask.none());
    }

    #[test]
    fn closest_hit_picks_minimum_and_breaks_ties_low() {
        let t = F32x4::new(5.0, 2.0, 9.0, 2.0);
        assert_eq!(closest_hit::<F32x4>(Mask4::splat(true), t), Some((1, 2.0)));
        assert_eq!(closest_hit::<F32x4>(Mask4::new(true, false, true, false), t), Some((0, 5.0)));
        assert_eq!(closest_hit::<F32x4>(Mask4::new(false, false, true, true), t), Some((3, 2.0)));
        assert_eq!(closest_hit::<F32x4>(Mask4::splat(false), t), None);
    }

    #[test]
    fn closest_hit_never_reports_a_masked_lane() {
        let inf = f32::INFINITY;
        let t = F32x4::new(0.0, inf, 0.0, 0.0);
        assert_eq!(closest_hit::<F32x4>(Mask4::new(false, true, false, false), t), Some((1, inf)));
        let t = F32x4::new(1.0, 1.0, f32::MAX, 1.0);
        assert_eq!(closest_hit::<F32x4>(Mask4::new(false, false, true, false), t), Some((2, f32::MAX)));
        let t = F32x4::new(inf, 3.0, inf, inf);
        assert_eq!(closest_hit::<F32x4>(Mask4::new(false, false, true, true), t), Some((2, inf)));
    }

    #[test]
    fn slab_test_against_four_boxes() {
        let boxes = SimdAabb3::<F32x4>::transpose(&[
            Aabb3::from_bounds(0.0, 1.0, 0.0, 1.0, -1.0, 0.0),
            Aabb3::from_bounds(2.0, 3.0, 0.0, 1.0, -1.0, 0.0),
            Aabb3::from_bounds(0.0, 1.0, 0.0, 1.0, 2.0, 3.0),
            Aabb3::from_bounds(-5.0, 5.0, -5.0, 5.0, -5.0, 5.0),
        ]);
        let hits = ray_boxes(&FatRay3::new(&down_ray(0.5, 0.5)), &boxes);
        // Lane 1 is off to the side, lane 2 is behind the origin, lane 3
        // contains the origin.
        assert_eq!(hits.mask.bitmask(), 0b1001);
        assert_eq!(hits.distance.get(0), 1.0);
        assert_eq!(hits.distance.get(3), -4.0);
    }

    #[test]
    fn nearest_triangle_uses_payloads_and_skips_padding() {
        let near = [Vector3::new(0.0, 0.0, 0.5), Vector3::new(1.0, 0.0, 0.5), Vector3::new(0.0, 1.0, 0.5)];
        let far = scenario_triangles()[0];
        let packets = [
            FatTriangles3::<F32x4, u32>::pack(&[(far, 7)]).expect("packet"),
            FatTriangles3::<F32x4, u32>::pack(&[(far, 8), (near, 9)]).expect("packet"),
        ];
        let hit = nearest_triangle(&down_ray(0.25, 0.25), &packets, DEFAULT_TRIANGLE_EPSILON).expect("hit");
        assert_eq!(hit.payload, 9);
        assert!((hit.distance - 0.5).abs() < 1e-6);
        assert!(nearest_triangle(&down_ray(3.0, 3.0), &packets, DEFAULT_TRIANGLE_EPSILON).is_none());
    }
}
