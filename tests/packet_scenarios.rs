//! End-to-end packet scenarios: width-N lanes and packet intersection through
//! the public API.

use raysound_math::backend::{Lane4, SimdMask};
use raysound_math::geometry::{Aabb3, Ray3, Vector3};
use raysound_math::intersect::{closest_hit, nearest_triangle, ray_boxes, ray_triangles, DEFAULT_TRIANGLE_EPSILON};
use raysound_math::lanes::{F32x4, Mask4, SimdScalar};
use raysound_math::{FatRay3, FatTriangles3, SimdAabb3, SimdRay3, SimdTriangle3};
use test_log::test;

fn quad_triangles() -> [[Vector3<f32>; 3]; 4] {
    [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)].map(|(x, y)| {
        [Vector3::new(x, y, 0.0), Vector3::new(x + 1.0, y, 0.0), Vector3::new(x, y + 1.0, 0.0)]
    })
}

fn down(x: f32, y: f32) -> Ray3<f32> {
    Ray3::new(Vector3::new(x, y, 1.0), Vector3::new(0.0, 0.0, -1.0))
}

#[test]
fn ray_into_first_of_four_triangles() {
    let triangles = SimdTriangle3::<F32x4>::transpose(&quad_triangles());
    let hits = ray_triangles(&SimdRay3::splat(&down(0.4, 0.4)), &triangles, DEFAULT_TRIANGLE_EPSILON);
    assert_eq!(hits.mask.bitmask(), 0b0001);
    assert!((hits.t.get(0) - 1.0).abs() < 1e-6);
    assert!((hits.u.get(0) - 0.4).abs() < 1e-6);
    assert!((hits.v.get(0) - 0.4).abs() < 1e-6);
    assert_eq!(closest_hit::<F32x4>(hits.mask, hits.t).map(|(lane, _)| lane), Some(0));
}

#[test]
fn four_rays_against_one_triangle() {
    let [v0, v1, v2] = quad_triangles()[0];
    let triangle = SimdTriangle3::<F32x4>::splat(&v0, &v1, &v2);
    let rays = SimdRay3::transpose(&[down(0.1, 0.1), down(0.9, 0.9), down(0.5, 0.0), down(-0.1, 0.5)]);
    let hits = ray_triangles(&rays, &triangle, DEFAULT_TRIANGLE_EPSILON);
    // Lane 2 lands on an edge, which counts as inside.
    assert_eq!(hits.mask.bitmask(), 0b0101);
}

#[test]
fn ray_through_a_row_of_boxes() {
    let boxes: [Aabb3<f32>; 4] = std::array::from_fn(|i| {
        let x = 2.0 * i as f32;
        Aabb3::from_bounds(x, x + 1.0, -1.0, 1.0, -1.0, 1.0)
    });
    let ray = Ray3::new(Vector3::new(-1.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
    let hits = ray_boxes(&FatRay3::<F32x4>::new(&ray), &SimdAabb3::transpose(&boxes));
    assert!(hits.mask.all());
    assert_eq!(hits.distance.to_array(), [1.0, 3.0, 5.0, 7.0]);
    assert_eq!(closest_hit::<F32x4>(hits.mask, hits.distance), Some((0, 1.0)));
}

#[test]
fn closest_hit_keeps_unbounded_hits_inside_the_mask() {
    let t = F32x4::new(0.0, f32::INFINITY, 0.0, 0.0);
    assert_eq!(closest_hit::<F32x4>(Mask4::new(false, true, false, false), t), Some((1, f32::INFINITY)));

    let t = F32x4::new(1.0, 1.0, f32::MAX, 1.0);
    assert_eq!(closest_hit::<F32x4>(Mask4::new(false, false, true, false), t), Some((2, f32::MAX)));

    // A finite live lane still beats an infinite live one.
    let t = F32x4::new(f32::INFINITY, 4.0, 2.0, f32::INFINITY);
    assert_eq!(closest_hit::<F32x4>(Mask4::new(true, true, false, true), t), Some((1, 4.0)));
}

#[test]
fn nearest_triangle_over_a_soup() {
    let soup: Vec<([Vector3<f32>; 3], usize)> = (0..10)
        .map(|i| {
            let z = -(i as f32);
            ([Vector3::new(-1.0, -1.0, z), Vector3::new(3.0, -1.0, z), Vector3::new(-1.0, 3.0, z)], i)
        })
        .rev()
        .collect();
    let packets: Vec<_> = soup.chunks(4).filter_map(FatTriangles3::<F32x4, usize>::pack).collect();
    assert_eq!(packets.len(), 3);
    let hit = nearest_triangle(&down(0.0, 0.0), &packets, DEFAULT_TRIANGLE_EPSILON).expect("soup is hit");
    assert_eq!(hit.payload, 0);
    assert!((hit.distance - 1.0).abs() < 1e-6);
}

#[test]
fn seven_lane_scalars_ignore_padding() {
    let a = SimdScalar::<f32, 7, 2>::from_array([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    let b = SimdScalar::<f32, 7, 2>::splat(4.0);
    assert_eq!((a * b).to_array(), [4.0, 8.0, 12.0, 16.0, 20.0, 24.0, 28.0]);
    assert_eq!(a.sum(), 28.0);

    let below = a.simd_lt(b);
    assert_eq!(below.bitmask(), 0b000_0111);
    assert!(a.simd_gt(SimdScalar::<f32, 7, 2>::splat(0.0)).all());
    assert!(!a.simd_gt(SimdScalar::<f32, 7, 2>::splat(7.0)).any());

    let clamped = SimdScalar::<f32, 7, 2>::select(below, b, a);
    assert_eq!(clamped.to_array(), [4.0, 4.0, 4.0, 4.0, 5.0, 6.0, 7.0]);
}

#[test]
fn five_lane_integers_and_masks() {
    let mut x = SimdScalar::<i32, 5, 2>::from_array([1, -2, 3, -4, 5]);
    x.set(4, i32::MAX);
    assert_eq!((x + 1).to_array(), [2, -1, 4, -3, i32::MIN]);
    assert_eq!((x << 1).get(0), 2);
    assert_eq!(x.abs().to_array(), [1, 2, 3, 4, i32::MAX]);

    let flags = SimdScalar::<bool, 5, 2>::from_array([true, false, true, false, true]);
    assert_eq!(flags.bitmask(), 0b10101);
    assert_eq!((!flags).bitmask(), 0b01010);
    assert!(!(!flags & flags).any());
}
