//! Property tests: the compiled backend agrees lane for lane with the
//! portable backend and with the scalar geometry types.

use proptest::prelude::*;
use raysound_math::backend::portable;
use raysound_math::backend::{Lane4, SimdF32, SimdI32, SimdMask, SimdNum};
use raysound_math::geometry::{Aabb3, Ray3, Vector3};
use raysound_math::lanes::{F32x4, I32x4, Mask4, SimdScalar};
use raysound_math::{SimdAabb3, SimdRay3, SimdTriangle3, SimdVector3};

fn finite() -> impl Strategy<Value = f32> {
    -1.0e4f32..1.0e4
}

fn lanes() -> impl Strategy<Value = [f32; 4]> {
    prop::array::uniform4(finite())
}

fn vector() -> impl Strategy<Value = Vector3<f32>> {
    prop::array::uniform3(-100.0f32..100.0).prop_map(Vector3::from_array)
}

fn vectors() -> impl Strategy<Value = [Vector3<f32>; 4]> {
    prop::array::uniform4(vector())
}

fn bits_of(values: [bool; 4]) -> u32 {
    values.iter().enumerate().fold(0, |bits, (i, &v)| bits | ((v as u32) << i))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn float_arithmetic_matches_portable(a in lanes(), b in lanes()) {
        let (x, y) = (F32x4::from_array(a), F32x4::from_array(b));
        let (px, py) = (portable::F32x4::from_array(a), portable::F32x4::from_array(b));
        prop_assert_eq!((x + y).to_array(), (px + py).to_array());
        prop_assert_eq!((x - y).to_array(), (px - py).to_array());
        prop_assert_eq!((x * y).to_array(), (px * py).to_array());
        prop_assert_eq!(x.min(y).to_array(), px.min(py).to_array());
        prop_assert_eq!(x.max(y).to_array(), px.max(py).to_array());
        prop_assert_eq!(x.abs().sqrt().to_array(), px.abs().sqrt().to_array());
        prop_assert_eq!(x.floor().to_array(), px.floor().to_array());
        prop_assert_eq!(x.ceil().to_array(), px.ceil().to_array());
    }

    #[test]
    fn comparisons_match_scalar(a in lanes(), b in lanes()) {
        let (x, y) = (F32x4::from_array(a), F32x4::from_array(b));
        prop_assert_eq!(x.simd_lt(y).bitmask(), bits_of(std::array::from_fn(|i| a[i] < b[i])));
        prop_assert_eq!(x.simd_le(y).bitmask(), bits_of(std::array::from_fn(|i| a[i] <= b[i])));
        prop_assert_eq!(x.simd_gt(y).bitmask(), bits_of(std::array::from_fn(|i| a[i] > b[i])));
        prop_assert_eq!(x.simd_ge(y).bitmask(), bits_of(std::array::from_fn(|i| a[i] >= b[i])));
        prop_assert_eq!(x.simd_eq(x).bitmask(), 0b1111);
    }

    #[test]
    fn integer_arithmetic_wraps(a in prop::array::uniform4(any::<i32>()), b in prop::array::uniform4(any::<i32>())) {
        let (x, y) = (I32x4::from_array(a), I32x4::from_array(b));
        prop_assert_eq!((x + y).to_array(), std::array::from_fn::<i32, 4, _>(|i| a[i].wrapping_add(b[i])));
        prop_assert_eq!((x * y).to_array(), std::array::from_fn::<i32, 4, _>(|i| a[i].wrapping_mul(b[i])));
        prop_assert_eq!((x / y).to_array(), std::array::from_fn::<i32, 4, _>(|i| a[i].checked_div(b[i]).unwrap_or(0)));
        prop_assert_eq!((x ^ y).to_array(), std::array::from_fn::<i32, 4, _>(|i| a[i] ^ b[i]));
        prop_assert_eq!(x.sum(), a.iter().fold(0i32, |acc, &v| acc.wrapping_add(v)));
    }

    #[test]
    fn select_picks_per_lane(bits in 0u32..16, a in lanes(), b in lanes()) {
        let mask = Mask4::from_bits(bits);
        prop_assert_eq!(mask.bitmask(), bits);
        let picked = F32x4::select(mask, F32x4::from_array(a), F32x4::from_array(b)).to_array();
        let ints = I32x4::select(mask, I32x4::splat(1), I32x4::splat(0)).to_array();
        for lane in 0..4 {
            let set = bits & (1 << lane) != 0;
            prop_assert_eq!(picked[lane], if set { a[lane] } else { b[lane] });
            prop_assert_eq!(ints[lane], set as i32);
        }
        prop_assert_eq!(I32x4::from_mask(mask).to_array(), std::array::from_fn::<i32, 4, _>(|i| -(((bits >> i) & 1) as i32)));
    }

    #[test]
    fn dot_and_cross_match_scalar(a in vectors(), b in vectors()) {
        let (pa, pb) = (SimdVector3::<F32x4>::transpose(&a), SimdVector3::<F32x4>::transpose(&b));
        let dots = pa.dot(pb).to_array();
        let crosses = pa.cross(pb).to_array();
        for lane in 0..4 {
            prop_assert_eq!(dots[lane], a[lane].dot(b[lane]));
            prop_assert_eq!(crosses[lane], a[lane].cross(b[lane]));
        }
    }

    #[test]
    fn transposes_round_trip(a in vectors(), b in vectors(), c in vectors()) {
        prop_assert_eq!(SimdVector3::<F32x4>::transpose(&a).to_array(), a);

        let boxes: [Aabb3<f32>; 4] = std::array::from_fn(|i| Aabb3::new(a[i].min(b[i]), a[i].max(b[i])));
        prop_assert_eq!(SimdAabb3::<F32x4>::transpose(&boxes).to_array(), boxes);

        let rays: [Ray3<f32>; 4] = std::array::from_fn(|i| Ray3::new(a[i], b[i]));
        prop_assert_eq!(SimdRay3::<F32x4>::transpose(&rays).to_array(), rays);

        let triangles: [[Vector3<f32>; 3]; 4] = std::array::from_fn(|i| [a[i], b[i], c[i]]);
        prop_assert_eq!(SimdTriangle3::<F32x4>::transpose(&triangles).to_array(), triangles);
    }

    #[test]
    fn broadcast_fills_every_lane(v in vector(), w in vector()) {
        prop_assert_eq!(SimdVector3::<F32x4>::splat(&v).to_array(), [v; 4]);
        let triangle = SimdTriangle3::<F32x4>::splat(&v, &w, &v);
        prop_assert_eq!(triangle.to_array(), [[v, w, v]; 4]);
    }
}

// Width-N composition against plain scalar loops. Float inputs are multiples
// of 0.25 so sums and products are exact in any order.

fn quarters() -> impl Strategy<Value = f32> {
    (-4000i32..4000).prop_map(|v| v as f32 * 0.25)
}

fn ints() -> impl Strategy<Value = i32> {
    prop_oneof![any::<i32>(), -3i32..3]
}

fn lanes_of<S: Strategy, const N: usize>(element: S) -> impl Strategy<Value = [S::Value; N]> {
    prop::collection::vec(element, N).prop_map(|values| match <[_; N]>::try_from(values) {
        Ok(array) => array,
        Err(values) => panic!("expected {} lanes, got {}", N, values.len()),
    })
}

fn zip<T: Copy, const N: usize>(a: [T; N], b: [T; N], f: impl Fn(T, T) -> T) -> [T; N] {
    std::array::from_fn(|i| f(a[i], b[i]))
}

fn bits_where<const N: usize>(f: impl Fn(usize) -> bool) -> u64 {
    (0..N).filter(|&i| f(i)).fold(0, |bits, i| bits | (1 << i))
}

fn all_lanes<const N: usize>() -> u64 {
    u64::MAX >> (64 - N)
}

fn floats_match_scalar<const N: usize, const U: usize>(a: [f32; N], b: [f32; N]) -> Result<(), TestCaseError> {
    let (x, y) = (SimdScalar::<f32, N, U>::from_array(a), SimdScalar::<f32, N, U>::from_array(b));
    prop_assert_eq!((x + y).to_array(), zip(a, b, |p, q| p + q));
    prop_assert_eq!((x - y).to_array(), zip(a, b, |p, q| p - q));
    prop_assert_eq!((x * y).to_array(), zip(a, b, |p, q| p * q));
    prop_assert_eq!(x.min(y).to_array(), zip(a, b, |p, q| if p < q { p } else { q }));
    prop_assert_eq!(x.max(y).to_array(), zip(a, b, |p, q| if p > q { p } else { q }));
    prop_assert_eq!(x.sum(), a.iter().sum::<f32>());

    let below = x.simd_lt(y);
    prop_assert_eq!(below.bitmask(), bits_where::<N>(|i| a[i] < b[i]));
    prop_assert_eq!(x.simd_le(y).bitmask(), bits_where::<N>(|i| a[i] <= b[i]));
    prop_assert_eq!(x.simd_gt(y).bitmask(), bits_where::<N>(|i| a[i] > b[i]));
    prop_assert_eq!(x.simd_ge(y).bitmask(), bits_where::<N>(|i| a[i] >= b[i]));
    prop_assert_eq!(x.simd_ne(y).bitmask(), bits_where::<N>(|i| a[i] != b[i]));
    prop_assert_eq!(x.simd_eq(x).bitmask(), all_lanes::<N>());

    prop_assert_eq!(below.any(), (0..N).any(|i| a[i] < b[i]));
    prop_assert_eq!(below.all(), (0..N).all(|i| a[i] < b[i]));
    prop_assert_eq!(below.none(), !below.any());
    prop_assert_eq!(SimdScalar::<f32, N, U>::select(below, y, x).to_array(), zip(a, b, |p, q| if p < q { q } else { p }));
    Ok(())
}

fn ints_match_scalar<const N: usize, const U: usize>(a: [i32; N], b: [i32; N]) -> Result<(), TestCaseError> {
    let (x, y) = (SimdScalar::<i32, N, U>::from_array(a), SimdScalar::<i32, N, U>::from_array(b));
    prop_assert_eq!((x + y).to_array(), zip(a, b, i32::wrapping_add));
    prop_assert_eq!((x - y).to_array(), zip(a, b, i32::wrapping_sub));
    prop_assert_eq!((x * y).to_array(), zip(a, b, i32::wrapping_mul));
    prop_assert_eq!((x / y).to_array(), zip(a, b, |p, q| p.checked_div(q).unwrap_or(0)));
    prop_assert_eq!((x & y).to_array(), zip(a, b, |p, q| p & q));
    prop_assert_eq!((x ^ y).to_array(), zip(a, b, |p, q| p ^ q));
    prop_assert_eq!(x.min(y).to_array(), zip(a, b, i32::min));
    prop_assert_eq!(x.max(y).to_array(), zip(a, b, i32::max));
    prop_assert_eq!(x.sum(), a.iter().fold(0i32, |acc, &v| acc.wrapping_add(v)));
    prop_assert_eq!(x.simd_lt(y).bitmask(), bits_where::<N>(|i| a[i] < b[i]));
    prop_assert_eq!(x.simd_ne(y).bitmask(), bits_where::<N>(|i| a[i] != b[i]));
    Ok(())
}

fn masks_match_scalar<const N: usize, const U: usize>(a: [bool; N], b: [bool; N]) -> Result<(), TestCaseError> {
    let (m, n) = (SimdScalar::<bool, N, U>::from_array(a), SimdScalar::<bool, N, U>::from_array(b));
    let bits = bits_where::<N>(|i| a[i]);
    prop_assert_eq!(m.to_array(), a);
    prop_assert_eq!(m.bitmask(), bits);
    prop_assert_eq!((!m).bitmask(), !bits & all_lanes::<N>());
    prop_assert_eq!((m & n).bitmask(), bits_where::<N>(|i| a[i] && b[i]));
    prop_assert_eq!((m | n).bitmask(), bits_where::<N>(|i| a[i] || b[i]));
    prop_assert_eq!((m ^ n).bitmask(), bits_where::<N>(|i| a[i] != b[i]));
    prop_assert_eq!(m.any(), a.contains(&true));
    prop_assert_eq!(m.all(), !a.contains(&false));
    prop_assert_eq!(m.none(), !a.contains(&true));
    prop_assert!((m | !m).all());
    prop_assert!((m & !m).none());
    prop_assert_eq!(m == n, a == b);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn one_wide_floats(a in lanes_of::<_, 1>(quarters()), b in lanes_of::<_, 1>(quarters())) {
        floats_match_scalar::<1, 1>(a, b)?;
    }

    #[test]
    fn five_wide_floats(a in lanes_of::<_, 5>(quarters()), b in lanes_of::<_, 5>(quarters())) {
        floats_match_scalar::<5, 2>(a, b)?;
    }

    #[test]
    fn seven_wide_floats(a in lanes_of::<_, 7>(quarters()), b in lanes_of::<_, 7>(quarters())) {
        floats_match_scalar::<7, 2>(a, b)?;
    }

    #[test]
    fn sixteen_wide_floats(a in lanes_of::<_, 16>(quarters()), b in lanes_of::<_, 16>(quarters())) {
        floats_match_scalar::<16, 4>(a, b)?;
    }

    #[test]
    fn five_wide_ints(a in lanes_of::<_, 5>(ints()), b in lanes_of::<_, 5>(ints())) {
        ints_match_scalar::<5, 2>(a, b)?;
    }

    #[test]
    fn seven_wide_ints(a in lanes_of::<_, 7>(ints()), b in lanes_of::<_, 7>(ints())) {
        ints_match_scalar::<7, 2>(a, b)?;
    }

    #[test]
    fn five_wide_masks(a in lanes_of::<_, 5>(any::<bool>()), b in lanes_of::<_, 5>(any::<bool>())) {
        masks_match_scalar::<5, 2>(a, b)?;
    }

    #[test]
    fn seven_wide_masks(a in lanes_of::<_, 7>(any::<bool>()), b in lanes_of::<_, 7>(any::<bool>())) {
        masks_match_scalar::<7, 2>(a, b)?;
    }
}
