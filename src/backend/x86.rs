//! x86_64 backend.
//!
//! SSE2 is part of the x86_64 baseline, so this backend needs no runtime
//! detection. Newer instructions are used when the build enables them
//! (`-C target-feature=+sse4.1` or `-C target-cpu=native`), otherwise they
//! are emulated with SSE2 sequences that produce the same lanes.

use super::{
    div_lane, shuffle_mask, Backend, Lane4, SimdF32, SimdI32, SimdMask, SimdNum, LANES,
};
use core::arch::x86_64::*;
use core::fmt::{Debug, Formatter};
use core::ops::*;

// ============================================================================
// SSE2 Backend
// ============================================================================

/// SSE2 Backend (4 lanes).
#[derive(Copy, Clone, Debug, Default)]
pub struct Sse2;

impl Backend for Sse2 {
    const NAME: &'static str = "sse2";
    type Mask = Mask4;
    type F32 = F32x4;
    type I32 = I32x4;
}

const SWAP_HALVES: i32 = shuffle_mask(2, 3, 0, 1);
const SWAP_PAIRS: i32 = shuffle_mask(1, 0, 3, 2);

#[inline(always)]
unsafe fn all_ones() -> __m128i {
    _mm_set1_epi32(-1)
}

// ============================================================================
// Mask4 - 4-lane mask stored in a float register
// ============================================================================

/// 4-lane mask for SSE2.
///
/// SSE has no separate mask registers. Masks live in float registers where
/// each lane is either all-1s (true) or all-0s (false).
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct Mask4(__m128);

impl Default for Mask4 {
    fn default() -> Self {
        unsafe { Self(_mm_setzero_ps()) }
    }
}

impl Debug for Mask4 {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "Mask4({:04b})", self.bitmask())
    }
}

impl PartialEq for Mask4 {
    fn eq(&self, other: &Self) -> bool {
        self.bitmask() == other.bitmask()
    }
}

impl Lane4 for Mask4 {
    type Elem = bool;
    type Mask = Self;

    #[inline(always)]
    fn splat(value: bool) -> Self {
        unsafe { Self(_mm_castsi128_ps(_mm_set1_epi32(-(value as i32)))) }
    }

    #[inline(always)]
    fn from_array(lanes: [bool; LANES]) -> Self {
        let [a, b, c, d] = lanes.map(|lane| -(lane as i32));
        unsafe { Self(_mm_castsi128_ps(_mm_setr_epi32(a, b, c, d))) }
    }

    /// A lane reads true only when all 32 bits are set.
    #[inline(always)]
    fn to_array(self) -> [bool; LANES] {
        let mut raw = [0u32; LANES];
        unsafe { _mm_storeu_si128(raw.as_mut_ptr() as *mut __m128i, _mm_castps_si128(self.0)) };
        raw.map(|lane| lane == u32::MAX)
    }

    #[inline(always)]
    fn select(mask: Self, if_true: Self, if_false: Self) -> Self {
        unsafe {
            Self(_mm_or_ps(
                _mm_and_ps(mask.0, if_true.0),
                _mm_andnot_ps(mask.0, if_false.0),
            ))
        }
    }

    #[inline(always)]
    fn simd_eq(self, rhs: Self) -> Self {
        unsafe {
            Self(_mm_castsi128_ps(_mm_cmpeq_epi32(
                _mm_castps_si128(self.0),
                _mm_castps_si128(rhs.0),
            )))
        }
    }

    #[inline(always)]
    fn shuffle<const MASK: i32>(self) -> Self {
        unsafe { Self(_mm_shuffle_ps::<MASK>(self.0, self.0)) }
    }

    #[inline(always)]
    fn shuffle2<const MASK: i32>(self, other: Self) -> Self {
        unsafe { Self(_mm_shuffle_ps::<MASK>(self.0, other.0)) }
    }
}

impl SimdMask for Mask4 {
    #[inline(always)]
    fn bitmask(self) -> u32 {
        unsafe { _mm_movemask_ps(self.0) as u32 }
    }
}

impl BitAnd for Mask4 {
    type Output = Self;
    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        unsafe { Self(_mm_and_ps(self.0, rhs.0)) }
    }
}

impl BitOr for Mask4 {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        unsafe { Self(_mm_or_ps(self.0, rhs.0)) }
    }
}

impl BitXor for Mask4 {
    type Output = Self;
    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self {
        unsafe { Self(_mm_xor_ps(self.0, rhs.0)) }
    }
}

impl Not for Mask4 {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        unsafe { Self(_mm_xor_ps(self.0, _mm_castsi128_ps(all_ones()))) }
    }
}

impl_assign_ops!(Mask4;
    BitAnd::bitand => BitAndAssign::bitand_assign,
    BitOr::bitor => BitOrAssign::bitor_assign,
    BitXor::bitxor => BitXorAssign::bitxor_assign,
);

// ============================================================================
// F32x4
// ============================================================================

/// 4-lane f32 SIMD vector for SSE2.
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct F32x4(__m128);

impl Default for F32x4 {
    fn default() -> Self {
        unsafe { Self(_mm_setzero_ps()) }
    }
}

impl Debug for F32x4 {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "F32x4({:?})", self.to_array())
    }
}

impl F32x4 {
    /// Magnitude above which every f32 is already an integer.
    const INTEGRAL_LIMIT: f32 = 8_388_608.0;

    /// Truncation toward zero, passing through lanes that are already
    /// integral (or NaN) so `cvttps` never sees an out-of-range value.
    #[inline(always)]
    #[cfg_attr(target_feature = "sse4.1", allow(dead_code))]
    unsafe fn truncate(self) -> (__m128, __m128) {
        let magnitude = SimdNum::abs(self).0;
        let passthrough = _mm_cmpnlt_ps(magnitude, _mm_set1_ps(Self::INTEGRAL_LIMIT));
        let trunc = _mm_cvtepi32_ps(_mm_cvttps_epi32(self.0));
        (trunc, passthrough)
    }

    /// Copies the sign of `source` onto `rounded`. Rounding never flips a
    /// nonzero sign, so this only turns `+0.0` into `-0.0` for negative input.
    #[inline(always)]
    #[cfg_attr(target_feature = "sse4.1", allow(dead_code))]
    unsafe fn keep_sign(rounded: __m128, source: __m128) -> __m128 {
        _mm_or_ps(rounded, _mm_and_ps(source, _mm_set1_ps(-0.0)))
    }

    #[inline(always)]
    #[cfg_attr(target_feature = "sse4.1", allow(dead_code))]
    unsafe fn blend(mask: __m128, if_true: __m128, if_false: __m128) -> __m128 {
        _mm_or_ps(_mm_and_ps(mask, if_true), _mm_andnot_ps(mask, if_false))
    }
}

impl Lane4 for F32x4 {
    type Elem = f32;
    type Mask = Mask4;

    #[inline(always)]
    fn splat(value: f32) -> Self {
        unsafe { Self(_mm_set1_ps(value)) }
    }

    #[inline(always)]
    fn new(a: f32, b: f32, c: f32, d: f32) -> Self {
        unsafe { Self(_mm_setr_ps(a, b, c, d)) }
    }

    #[inline(always)]
    fn from_array(lanes: [f32; LANES]) -> Self {
        unsafe { Self(_mm_loadu_ps(lanes.as_ptr())) }
    }

    #[inline(always)]
    fn to_array(self) -> [f32; LANES] {
        let mut arr = [0.0f32; LANES];
        unsafe { _mm_storeu_ps(arr.as_mut_ptr(), self.0) };
        arr
    }

    #[inline(always)]
    fn from_slice(values: &[f32]) -> Self {
        assert!(values.len() >= LANES);
        unsafe { Self(_mm_loadu_ps(values.as_ptr())) }
    }

    #[inline(always)]
    fn store(self, out: &mut [f32]) {
        assert!(out.len() >= LANES);
        unsafe { _mm_storeu_ps(out.as_mut_ptr(), self.0) }
    }

    #[inline(always)]
    fn select(mask: Mask4, if_true: Self, if_false: Self) -> Self {
        unsafe {
            #[cfg(target_feature = "sse4.1")]
            {
                Self(_mm_blendv_ps(if_false.0, if_true.0, mask.0))
            }
            #[cfg(not(target_feature = "sse4.1"))]
            {
                Self(Self::blend(mask.0, if_true.0, if_false.0))
            }
        }
    }

    #[inline(always)]
    fn simd_eq(self, rhs: Self) -> Mask4 {
        unsafe { Mask4(_mm_cmpeq_ps(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn simd_ne(self, rhs: Self) -> Mask4 {
        unsafe { Mask4(_mm_cmpneq_ps(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn shuffle<const MASK: i32>(self) -> Self {
        unsafe { Self(_mm_shuffle_ps::<MASK>(self.0, self.0)) }
    }

    #[inline(always)]
    fn shuffle2<const MASK: i32>(self, other: Self) -> Self {
        unsafe { Self(_mm_shuffle_ps::<MASK>(self.0, other.0)) }
    }
}

impl SimdNum for F32x4 {
    #[inline(always)]
    fn simd_lt(self, rhs: Self) -> Mask4 {
        unsafe { Mask4(_mm_cmplt_ps(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn simd_le(self, rhs: Self) -> Mask4 {
        unsafe { Mask4(_mm_cmple_ps(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn simd_gt(self, rhs: Self) -> Mask4 {
        unsafe { Mask4(_mm_cmpgt_ps(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn simd_ge(self, rhs: Self) -> Mask4 {
        unsafe { Mask4(_mm_cmpge_ps(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn abs(self) -> Self {
        unsafe {
            let sign_clear = _mm_castsi128_ps(_mm_set1_epi32(0x7FFF_FFFF));
            Self(_mm_and_ps(self.0, sign_clear))
        }
    }

    #[inline(always)]
    fn sqrt(self) -> Self {
        unsafe { Self(_mm_sqrt_ps(self.0)) }
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        unsafe { Self(_mm_min_ps(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        unsafe { Self(_mm_max_ps(self.0, rhs.0)) }
    }

    /// `(l0 + l1) + (l2 + l3)` with SSE3, `(l0 + l2) + (l1 + l3)` without.
    #[inline(always)]
    fn sum(self) -> f32 {
        unsafe {
            #[cfg(target_feature = "sse3")]
            {
                let pairs = _mm_hadd_ps(self.0, self.0);
                _mm_cvtss_f32(_mm_hadd_ps(pairs, pairs))
            }
            #[cfg(not(target_feature = "sse3"))]
            {
                let halves = _mm_add_ps(self.0, _mm_shuffle_ps::<SWAP_HALVES>(self.0, self.0));
                let total = _mm_add_ps(halves, _mm_shuffle_ps::<SWAP_PAIRS>(halves, halves));
                _mm_cvtss_f32(total)
            }
        }
    }

    /// Four `(x, y, z, 0)` rows, then the classic unpack/move transpose.
    #[inline(always)]
    fn transpose3(rows: [[f32; 3]; LANES]) -> [Self; 3] {
        let [r0, r1, r2, r3] = rows;
        unsafe {
            let r0 = _mm_setr_ps(r0[0], r0[1], r0[2], 0.0);
            let r1 = _mm_setr_ps(r1[0], r1[1], r1[2], 0.0);
            let r2 = _mm_setr_ps(r2[0], r2[1], r2[2], 0.0);
            let r3 = _mm_setr_ps(r3[0], r3[1], r3[2], 0.0);

            // (x0, x1, y0, y1), (x2, x3, y2, y3)
            let xy01 = _mm_unpacklo_ps(r0, r1);
            let xy23 = _mm_unpacklo_ps(r2, r3);
            // (z0, z1, 0, 0), (z2, z3, 0, 0)
            let z01 = _mm_unpackhi_ps(r0, r1);
            let z23 = _mm_unpackhi_ps(r2, r3);

            [
                Self(_mm_movelh_ps(xy01, xy23)),
                Self(_mm_movehl_ps(xy23, xy01)),
                Self(_mm_movelh_ps(z01, z23)),
            ]
        }
    }
}

impl SimdF32 for F32x4 {
    type Int = I32x4;

    #[inline(always)]
    fn floor(self) -> Self {
        unsafe {
            #[cfg(target_feature = "sse4.1")]
            {
                Self(_mm_floor_ps(self.0))
            }
            #[cfg(not(target_feature = "sse4.1"))]
            {
                // Truncation rounds toward zero, so step down where it went up.
                let (trunc, passthrough) = self.truncate();
                let correction = _mm_and_ps(_mm_cmpgt_ps(trunc, self.0), _mm_set1_ps(1.0));
                let floored = Self::keep_sign(_mm_sub_ps(trunc, correction), self.0);
                Self(Self::blend(passthrough, self.0, floored))
            }
        }
    }

    #[inline(always)]
    fn ceil(self) -> Self {
        unsafe {
            #[cfg(target_feature = "sse4.1")]
            {
                Self(_mm_ceil_ps(self.0))
            }
            #[cfg(not(target_feature = "sse4.1"))]
            {
                let (trunc, passthrough) = self.truncate();
                let correction = _mm_and_ps(_mm_cmplt_ps(trunc, self.0), _mm_set1_ps(1.0));
                let ceiled = Self::keep_sign(_mm_add_ps(trunc, correction), self.0);
                Self(Self::blend(passthrough, self.0, ceiled))
            }
        }
    }

    #[inline(always)]
    fn recip(self) -> Self {
        // rcpps is only 12 bits accurate; lanes must match a true division.
        unsafe { Self(_mm_div_ps(_mm_set1_ps(1.0), self.0)) }
    }

    #[inline(always)]
    fn to_int(self) -> I32x4 {
        unsafe { I32x4(_mm_cvttps_epi32(self.0)) }
    }

    #[inline(always)]
    fn from_int(lanes: I32x4) -> Self {
        unsafe { Self(_mm_cvtepi32_ps(lanes.0)) }
    }
}

impl Add for F32x4 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        unsafe { Self(_mm_add_ps(self.0, rhs.0)) }
    }
}

impl Sub for F32x4 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        unsafe { Self(_mm_sub_ps(self.0, rhs.0)) }
    }
}

impl Mul for F32x4 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        unsafe { Self(_mm_mul_ps(self.0, rhs.0)) }
    }
}

impl Div for F32x4 {
    type Output = Self;
    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        unsafe { Self(_mm_div_ps(self.0, rhs.0)) }
    }
}

impl Neg for F32x4 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        unsafe {
            let sign = _mm_castsi128_ps(_mm_set1_epi32(i32::MIN));
            Self(_mm_xor_ps(self.0, sign))
        }
    }
}

impl_broadcast_ops!(F32x4, f32;
    Add::add => AddAssign::add_assign,
    Sub::sub => SubAssign::sub_assign,
    Mul::mul => MulAssign::mul_assign,
    Div::div => DivAssign::div_assign,
);

// ============================================================================
// I32x4
// ============================================================================

/// 4-lane i32 SIMD vector for SSE2.
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct I32x4(__m128i);

impl Default for I32x4 {
    fn default() -> Self {
        unsafe { Self(_mm_setzero_si128()) }
    }
}

impl Debug for I32x4 {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "I32x4({:?})", self.to_array())
    }
}

impl I32x4 {
    #[inline(always)]
    unsafe fn blend(mask: __m128i, if_true: __m128i, if_false: __m128i) -> __m128i {
        _mm_or_si128(_mm_and_si128(mask, if_true), _mm_andnot_si128(mask, if_false))
    }
}

impl Lane4 for I32x4 {
    type Elem = i32;
    type Mask = Mask4;

    #[inline(always)]
    fn splat(value: i32) -> Self {
        unsafe { Self(_mm_set1_epi32(value)) }
    }

    #[inline(always)]
    fn new(a: i32, b: i32, c: i32, d: i32) -> Self {
        unsafe { Self(_mm_setr_epi32(a, b, c, d)) }
    }

    #[inline(always)]
    fn from_array(lanes: [i32; LANES]) -> Self {
        unsafe { Self(_mm_loadu_si128(lanes.as_ptr() as *const __m128i)) }
    }

    #[inline(always)]
    fn to_array(self) -> [i32; LANES] {
        let mut arr = [0i32; LANES];
        unsafe { _mm_storeu_si128(arr.as_mut_ptr() as *mut __m128i, self.0) };
        arr
    }

    #[inline(always)]
    fn select(mask: Mask4, if_true: Self, if_false: Self) -> Self {
        unsafe { Self(Self::blend(_mm_castps_si128(mask.0), if_true.0, if_false.0)) }
    }

    #[inline(always)]
    fn simd_eq(self, rhs: Self) -> Mask4 {
        unsafe { Mask4(_mm_castsi128_ps(_mm_cmpeq_epi32(self.0, rhs.0))) }
    }

    #[inline(always)]
    fn shuffle<const MASK: i32>(self) -> Self {
        unsafe { Self(_mm_shuffle_epi32::<MASK>(self.0)) }
    }

    #[inline(always)]
    fn shuffle2<const MASK: i32>(self, other: Self) -> Self {
        unsafe {
            let mixed =
                _mm_shuffle_ps::<MASK>(_mm_castsi128_ps(self.0), _mm_castsi128_ps(other.0));
            Self(_mm_castps_si128(mixed))
        }
    }
}

impl SimdNum for I32x4 {
    #[inline(always)]
    fn simd_lt(self, rhs: Self) -> Mask4 {
        unsafe { Mask4(_mm_castsi128_ps(_mm_cmplt_epi32(self.0, rhs.0))) }
    }

    #[inline(always)]
    fn simd_le(self, rhs: Self) -> Mask4 {
        !self.simd_gt(rhs)
    }

    #[inline(always)]
    fn simd_gt(self, rhs: Self) -> Mask4 {
        unsafe { Mask4(_mm_castsi128_ps(_mm_cmpgt_epi32(self.0, rhs.0))) }
    }

    #[inline(always)]
    fn simd_ge(self, rhs: Self) -> Mask4 {
        !self.simd_lt(rhs)
    }

    #[inline(always)]
    fn abs(self) -> Self {
        unsafe {
            #[cfg(target_feature = "ssse3")]
            {
                Self(_mm_abs_epi32(self.0))
            }
            #[cfg(not(target_feature = "ssse3"))]
            {
                let sign = _mm_srai_epi32::<31>(self.0);
                Self(_mm_sub_epi32(_mm_xor_si128(self.0, sign), sign))
            }
        }
    }

    /// Truncated f32 square root; negative lanes yield 0.
    #[inline(always)]
    fn sqrt(self) -> Self {
        let clamped = SimdNum::max(self, Self::default());
        F32x4::from_int(clamped).sqrt().to_int()
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        unsafe {
            #[cfg(target_feature = "sse4.1")]
            {
                Self(_mm_min_epi32(self.0, rhs.0))
            }
            #[cfg(not(target_feature = "sse4.1"))]
            {
                Self(Self::blend(_mm_cmplt_epi32(self.0, rhs.0), self.0, rhs.0))
            }
        }
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        unsafe {
            #[cfg(target_feature = "sse4.1")]
            {
                Self(_mm_max_epi32(self.0, rhs.0))
            }
            #[cfg(not(target_feature = "sse4.1"))]
            {
                Self(Self::blend(_mm_cmpgt_epi32(self.0, rhs.0), self.0, rhs.0))
            }
        }
    }

    #[inline(always)]
    fn sum(self) -> i32 {
        unsafe {
            let halves = _mm_add_epi32(self.0, _mm_shuffle_epi32::<SWAP_HALVES>(self.0));
            let total = _mm_add_epi32(halves, _mm_shuffle_epi32::<SWAP_PAIRS>(halves));
            _mm_cvtsi128_si32(total)
        }
    }
}

impl SimdI32 for I32x4 {
    #[inline(always)]
    fn from_mask(mask: Mask4) -> Self {
        unsafe { Self(_mm_castps_si128(mask.0)) }
    }
}

impl Add for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        unsafe { Self(_mm_add_epi32(self.0, rhs.0)) }
    }
}

impl Sub for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        unsafe { Self(_mm_sub_epi32(self.0, rhs.0)) }
    }
}

impl Mul for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        unsafe {
            #[cfg(target_feature = "sse4.1")]
            {
                Self(_mm_mullo_epi32(self.0, rhs.0))
            }
            #[cfg(not(target_feature = "sse4.1"))]
            {
                // pmuludq multiplies lanes 0 and 2 into 64-bit products; the
                // low halves are the wrapped 32-bit results.
                const EVEN_LOWS: i32 = shuffle_mask(0, 2, 0, 0);
                let even = _mm_mul_epu32(self.0, rhs.0);
                let odd = _mm_mul_epu32(_mm_srli_epi64::<32>(self.0), _mm_srli_epi64::<32>(rhs.0));
                Self(_mm_unpacklo_epi32(
                    _mm_shuffle_epi32::<EVEN_LOWS>(even),
                    _mm_shuffle_epi32::<EVEN_LOWS>(odd),
                ))
            }
        }
    }
}

/// There is no vector integer division; lanes divide one at a time.
impl Div for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        let (a, b) = (self.to_array(), rhs.to_array());
        Self::new(
            div_lane(a[0], b[0]),
            div_lane(a[1], b[1]),
            div_lane(a[2], b[2]),
            div_lane(a[3], b[3]),
        )
    }
}

impl Neg for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        unsafe { Self(_mm_sub_epi32(_mm_setzero_si128(), self.0)) }
    }
}

impl BitAnd for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        unsafe { Self(_mm_and_si128(self.0, rhs.0)) }
    }
}

impl BitOr for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        unsafe { Self(_mm_or_si128(self.0, rhs.0)) }
    }
}

impl BitXor for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self {
        unsafe { Self(_mm_xor_si128(self.0, rhs.0)) }
    }
}

impl Not for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        unsafe { Self(_mm_xor_si128(self.0, all_ones())) }
    }
}

/// `pslld` with a register count: 32 or more clears the lanes.
impl Shl<i32> for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn shl(self, count: i32) -> Self {
        unsafe { Self(_mm_sll_epi32(self.0, _mm_cvtsi32_si128(count))) }
    }
}

/// `psrad` with a register count: 32 or more fills with the sign bit.
impl Shr<i32> for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn shr(self, count: i32) -> Self {
        unsafe { Self(_mm_sra_epi32(self.0, _mm_cvtsi32_si128(count))) }
    }
}

impl_broadcast_ops!(I32x4, i32;
    Add::add => AddAssign::add_assign,
    Sub::sub => SubAssign::sub_assign,
    Mul::mul => MulAssign::mul_assign,
    Div::div => DivAssign::div_assign,
);

impl_assign_ops!(I32x4;
    BitAnd::bitand => BitAndAssign::bitand_assign,
    BitOr::bitor => BitOrAssign::bitor_assign,
    BitXor::bitxor => BitXorAssign::bitxor_assign,
);

impl_int_mask_ops!(I32x4, Mask4);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transpose_packs_rows_into_planes() {
        let rows = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0], [10.0, 11.0, 12.0]];
        let [x, y, z] = F32x4::transpose3(rows);
        assert_eq!(x.to_array(), [1.0, 4.0, 7.0, 10.0]);
        assert_eq!(y.to_array(), [2.0, 5.0, 8.0, 11.0]);
        assert_eq!(z.to_array(), [3.0, 6.0, 9.0, 12.0]);
    }

    #[test]
    fn floor_and_ceil_handle_negatives_and_large_values() {
        let x = F32x4::new(-1.5, 2.5, -0.25, 1.0e10);
        assert_eq!(x.floor().to_array(), [-2.0, 2.0, -1.0, 1.0e10]);
        assert_eq!(x.ceil().to_array(), [-1.0, 3.0, 0.0, 1.0e10]);
        assert!(F32x4::splat(f32::NAN).floor().get(0).is_nan());
    }

    #[test]
    fn floor_and_ceil_keep_the_sign_of_zero() {
        let x = F32x4::new(-0.0, -0.25, 0.25, -0.75);
        let bits = |v: [f32; 4]| v.map(f32::to_bits);
        assert_eq!(bits(x.floor().to_array()), bits(x.to_array().map(libm::floorf)));
        assert_eq!(bits(x.ceil().to_array()), bits(x.to_array().map(libm::ceilf)));
        assert_eq!(x.ceil().get(1).to_bits(), (-0.0f32).to_bits());
    }

    #[test]
    fn wrapping_multiply_matches_scalar() {
        let a = I32x4::new(i32::MAX, -3, 65_536, -1);
        let b = I32x4::new(2, 7, 65_536, i32::MIN);
        let expected = [
            i32::MAX.wrapping_mul(2),
            -21,
            65_536i32.wrapping_mul(65_536),
            (-1i32).wrapping_mul(i32::MIN),
        ];
        assert_eq!((a * b).to_array(), expected);
    }

    #[test]
    fn mask_lanes_read_back_canonically() {
        let m = F32x4::new(1.0, 2.0, 3.0, 4.0).simd_gt(F32x4::splat(2.5));
        assert_eq!(m.to_array(), [false, false, true, true]);
        assert_eq!(m.bitmask(), 0b1100);
        assert_eq!(I32x4::from_mask(m).to_array(), [0, 0, -1, -1]);
    }

    #[test]
    fn integer_min_max_and_abs() {
        let a = I32x4::new(-5, 3, i32::MIN, 0);
        let b = I32x4::new(2, -9, 0, 0);
        assert_eq!(SimdNum::min(a, b).to_array(), [-5, -9, i32::MIN, 0]);
        assert_eq!(SimdNum::max(a, b).to_array(), [2, 3, 0, 0]);
        assert_eq!(SimdNum::abs(a).to_array(), [5, 3, i32::MIN, 0]);
    }
}
