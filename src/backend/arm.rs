//! ARM NEON backend for AArch64.
//!
//! NEON is mandatory on AArch64, so like SSE2 on x86_64 it needs no runtime
//! detection. Comparisons return `uint32x4_t` lanes of all-ones/all-zeros,
//! which is exactly the mask representation the rest of the kernel expects.
//!
//! Two places avoid the obvious instruction:
//!
//! - `vminq_f32`/`vmaxq_f32` propagate NaN, while SSE and the portable
//!   backend return the second operand. Float min/max are built from a
//!   compare and `vbslq_f32` instead.
//! - NEON has no immediate 4-lane shuffle. Shuffles become byte table
//!   lookups (`tbl`) with an index vector derived from the shuffle mask.

use super::{
    div_lane, shuffle_index, Backend, Lane4, SimdF32, SimdI32, SimdMask, SimdNum, LANES,
};
use core::arch::aarch64::*;
use core::fmt::{Debug, Formatter};
use core::ops::*;

// ============================================================================
// NEON Backend
// ============================================================================

/// NEON Backend (4 lanes).
#[derive(Copy, Clone, Debug, Default)]
pub struct Neon;

impl Backend for Neon {
    const NAME: &'static str = "neon";
    type Mask = Mask4;
    type F32 = F32x4;
    type I32 = I32x4;
}

/// Byte indices for `tbl` that move whole 32-bit lanes. Lanes 2 and 3 read
/// from the second table register (bytes 16..32).
const fn shuffle_table(mask: i32) -> [u8; 16] {
    let mut table = [0u8; 16];
    let mut lane = 0;
    while lane < LANES {
        let source = shuffle_index(mask, lane) as u8;
        let base = (if lane < 2 { 0 } else { 16 }) + source * 4;
        let mut byte = 0;
        while byte < 4 {
            table[lane * 4 + byte] = base + byte as u8;
            byte += 1;
        }
        lane += 1;
    }
    table
}

#[inline(always)]
unsafe fn permute<const MASK: i32>(first: uint8x16_t, second: uint8x16_t) -> uint8x16_t {
    let table = shuffle_table(MASK);
    // SAFETY: the table array is 16 bytes, the width of one q register.
    unsafe { vqtbl2q_u8(uint8x16x2_t(first, second), vld1q_u8(table.as_ptr())) }
}

// ============================================================================
// Mask4
// ============================================================================

/// 4-lane mask for NEON.
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct Mask4(uint32x4_t);

impl Default for Mask4 {
    fn default() -> Self {
        // SAFETY: vdupq_n_u32 has no preconditions.
        unsafe { Self(vdupq_n_u32(0)) }
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

impl Mask4 {
    #[inline(always)]
    fn raw(self) -> [u32; LANES] {
        let mut raw = [0u32; LANES];
        // SAFETY: raw is 4 u32s, exactly one register.
        unsafe { vst1q_u32(raw.as_mut_ptr(), self.0) };
        raw
    }
}

impl Lane4 for Mask4 {
    type Elem = bool;
    type Mask = Self;

    #[inline(always)]
    fn splat(value: bool) -> Self {
        // SAFETY: vdupq_n_u32 has no preconditions.
        unsafe { Self(vdupq_n_u32(super::lane_mask(value))) }
    }

    #[inline(always)]
    fn from_array(lanes: [bool; LANES]) -> Self {
        let raw = lanes.map(super::lane_mask);
        // SAFETY: raw is 4 u32s, exactly one register.
        unsafe { Self(vld1q_u32(raw.as_ptr())) }
    }

    #[inline(always)]
    fn to_array(self) -> [bool; LANES] {
        self.raw().map(|lane| lane == u32::MAX)
    }

    #[inline(always)]
    fn select(mask: Self, if_true: Self, if_false: Self) -> Self {
        unsafe { Self(vbslq_u32(mask.0, if_true.0, if_false.0)) }
    }

    #[inline(always)]
    fn simd_eq(self, rhs: Self) -> Self {
        unsafe { Self(vceqq_u32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn shuffle<const MASK: i32>(self) -> Self {
        self.shuffle2::<MASK>(self)
    }

    #[inline(always)]
    fn shuffle2<const MASK: i32>(self, other: Self) -> Self {
        unsafe {
            let bytes = permute::<MASK>(vreinterpretq_u8_u32(self.0), vreinterpretq_u8_u32(other.0));
            Self(vreinterpretq_u32_u8(bytes))
        }
    }
}

impl SimdMask for Mask4 {
    #[inline(always)]
    fn bitmask(self) -> u32 {
        const WEIGHTS: [u32; LANES] = [1, 2, 4, 8];
        // SAFETY: WEIGHTS is 4 u32s, exactly one register.
        unsafe { vaddvq_u32(vandq_u32(self.0, vld1q_u32(WEIGHTS.as_ptr()))) }
    }
}

impl BitAnd for Mask4 {
    type Output = Self;
    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        unsafe { Self(vandq_u32(self.0, rhs.0)) }
    }
}

impl BitOr for Mask4 {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        unsafe { Self(vorrq_u32(self.0, rhs.0)) }
    }
}

impl BitXor for Mask4 {
    type Output = Self;
    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self {
        unsafe { Self(veorq_u32(self.0, rhs.0)) }
    }
}

impl Not for Mask4 {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        unsafe { Self(vmvnq_u32(self.0)) }
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

/// 4-lane f32 vector for NEON.
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct F32x4(float32x4_t);

impl Default for F32x4 {
    fn default() -> Self {
        unsafe { Self(vdupq_n_f32(0.0)) }
    }
}

impl Debug for F32x4 {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "F32x4({:?})", self.to_array())
    }
}

impl Lane4 for F32x4 {
    type Elem = f32;
    type Mask = Mask4;

    #[inline(always)]
    fn splat(value: f32) -> Self {
        unsafe { Self(vdupq_n_f32(value)) }
    }

    #[inline(always)]
    fn from_array(lanes: [f32; LANES]) -> Self {
        // SAFETY: lanes is 4 f32s, exactly one register.
        unsafe { Self(vld1q_f32(lanes.as_ptr())) }
    }

    #[inline(always)]
    fn to_array(self) -> [f32; LANES] {
        let mut arr = [0.0f32; LANES];
        // SAFETY: arr is 4 f32s, exactly one register.
        unsafe { vst1q_f32(arr.as_mut_ptr(), self.0) };
        arr
    }

    #[inline(always)]
    fn from_slice(values: &[f32]) -> Self {
        assert!(values.len() >= LANES);
        // SAFETY: bounds checked above.
        unsafe { Self(vld1q_f32(values.as_ptr())) }
    }

    #[inline(always)]
    fn store(self, out: &mut [f32]) {
        assert!(out.len() >= LANES);
        // SAFETY: bounds checked above.
        unsafe { vst1q_f32(out.as_mut_ptr(), self.0) }
    }

    #[inline(always)]
    fn select(mask: Mask4, if_true: Self, if_false: Self) -> Self {
        unsafe { Self(vbslq_f32(mask.0, if_true.0, if_false.0)) }
    }

    #[inline(always)]
    fn simd_eq(self, rhs: Self) -> Mask4 {
        unsafe { Mask4(vceqq_f32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn shuffle<const MASK: i32>(self) -> Self {
        self.shuffle2::<MASK>(self)
    }

    #[inline(always)]
    fn shuffle2<const MASK: i32>(self, other: Self) -> Self {
        unsafe {
            let bytes = permute::<MASK>(vreinterpretq_u8_f32(self.0), vreinterpretq_u8_f32(other.0));
            Self(vreinterpretq_f32_u8(bytes))
        }
    }
}

impl SimdNum for F32x4 {
    #[inline(always)]
    fn simd_lt(self, rhs: Self) -> Mask4 {
        unsafe { Mask4(vcltq_f32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn simd_le(self, rhs: Self) -> Mask4 {
        unsafe { Mask4(vcleq_f32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn simd_gt(self, rhs: Self) -> Mask4 {
        unsafe { Mask4(vcgtq_f32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn simd_ge(self, rhs: Self) -> Mask4 {
        unsafe { Mask4(vcgeq_f32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn abs(self) -> Self {
        unsafe { Self(vabsq_f32(self.0)) }
    }

    #[inline(always)]
    fn sqrt(self) -> Self {
        unsafe { Self(vsqrtq_f32(self.0)) }
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        Self::select(self.simd_lt(rhs), self, rhs)
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        Self::select(self.simd_gt(rhs), self, rhs)
    }

    /// Pairwise: `(l0 + l1) + (l2 + l3)`.
    #[inline(always)]
    fn sum(self) -> f32 {
        unsafe { vaddvq_f32(self.0) }
    }

    #[inline(always)]
    fn transpose3(rows: [[f32; 3]; LANES]) -> [Self; 3] {
        let padded = rows.map(|[x, y, z]| [x, y, z, 0.0]);
        unsafe {
            let r0 = vld1q_f32(padded[0].as_ptr());
            let r1 = vld1q_f32(padded[1].as_ptr());
            let r2 = vld1q_f32(padded[2].as_ptr());
            let r3 = vld1q_f32(padded[3].as_ptr());

            // (x0, x1, y0, y1), (x2, x3, y2, y3)
            let xy01 = vreinterpretq_f64_f32(vzip1q_f32(r0, r1));
            let xy23 = vreinterpretq_f64_f32(vzip1q_f32(r2, r3));
            // (z0, z1, 0, 0), (z2, z3, 0, 0)
            let z01 = vreinterpretq_f64_f32(vzip2q_f32(r0, r1));
            let z23 = vreinterpretq_f64_f32(vzip2q_f32(r2, r3));

            [
                Self(vreinterpretq_f32_f64(vzip1q_f64(xy01, xy23))),
                Self(vreinterpretq_f32_f64(vzip2q_f64(xy01, xy23))),
                Self(vreinterpretq_f32_f64(vzip1q_f64(z01, z23))),
            ]
        }
    }
}

impl SimdF32 for F32x4 {
    type Int = I32x4;

    #[inline(always)]
    fn floor(self) -> Self {
        unsafe { Self(vrndmq_f32(self.0)) }
    }

    #[inline(always)]
    fn ceil(self) -> Self {
        unsafe { Self(vrndpq_f32(self.0)) }
    }

    #[inline(always)]
    fn recip(self) -> Self {
        unsafe { Self(vdivq_f32(vdupq_n_f32(1.0), self.0)) }
    }

    #[inline(always)]
    fn to_int(self) -> I32x4 {
        unsafe { I32x4(vcvtq_s32_f32(self.0)) }
    }

    #[inline(always)]
    fn from_int(lanes: I32x4) -> Self {
        unsafe { Self(vcvtq_f32_s32(lanes.0)) }
    }
}

impl Add for F32x4 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        unsafe { Self(vaddq_f32(self.0, rhs.0)) }
    }
}

impl Sub for F32x4 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        unsafe { Self(vsubq_f32(self.0, rhs.0)) }
    }
}

impl Mul for F32x4 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        unsafe { Self(vmulq_f32(self.0, rhs.0)) }
    }
}

impl Div for F32x4 {
    type Output = Self;
    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        unsafe { Self(vdivq_f32(self.0, rhs.0)) }
    }
}

impl Neg for F32x4 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        unsafe { Self(vnegq_f32(self.0)) }
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

/// 4-lane i32 vector for NEON.
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct I32x4(int32x4_t);

impl Default for I32x4 {
    fn default() -> Self {
        unsafe { Self(vdupq_n_s32(0)) }
    }
}

impl Debug for I32x4 {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "I32x4({:?})", self.to_array())
    }
}

impl Lane4 for I32x4 {
    type Elem = i32;
    type Mask = Mask4;

    #[inline(always)]
    fn splat(value: i32) -> Self {
        unsafe { Self(vdupq_n_s32(value)) }
    }

    #[inline(always)]
    fn from_array(lanes: [i32; LANES]) -> Self {
        // SAFETY: lanes is 4 i32s, exactly one register.
        unsafe { Self(vld1q_s32(lanes.as_ptr())) }
    }

    #[inline(always)]
    fn to_array(self) -> [i32; LANES] {
        let mut arr = [0i32; LANES];
        // SAFETY: arr is 4 i32s, exactly one register.
        unsafe { vst1q_s32(arr.as_mut_ptr(), self.0) };
        arr
    }

    #[inline(always)]
    fn select(mask: Mask4, if_true: Self, if_false: Self) -> Self {
        unsafe { Self(vbslq_s32(mask.0, if_true.0, if_false.0)) }
    }

    #[inline(always)]
    fn simd_eq(self, rhs: Self) -> Mask4 {
        unsafe { Mask4(vceqq_s32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn shuffle<const MASK: i32>(self) -> Self {
        self.shuffle2::<MASK>(self)
    }

    #[inline(always)]
    fn shuffle2<const MASK: i32>(self, other: Self) -> Self {
        unsafe {
            let bytes = permute::<MASK>(vreinterpretq_u8_s32(self.0), vreinterpretq_u8_s32(other.0));
            Self(vreinterpretq_s32_u8(bytes))
        }
    }
}

impl SimdNum for I32x4 {
    #[inline(always)]
    fn simd_lt(self, rhs: Self) -> Mask4 {
        unsafe { Mask4(vcltq_s32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn simd_le(self, rhs: Self) -> Mask4 {
        unsafe { Mask4(vcleq_s32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn simd_gt(self, rhs: Self) -> Mask4 {
        unsafe { Mask4(vcgtq_s32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn simd_ge(self, rhs: Self) -> Mask4 {
        unsafe { Mask4(vcgeq_s32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn abs(self) -> Self {
        unsafe { Self(vabsq_s32(self.0)) }
    }

    /// Truncated f32 square root; negative lanes yield 0.
    #[inline(always)]
    fn sqrt(self) -> Self {
        let clamped = SimdNum::max(self, Self::default());
        F32x4::from_int(clamped).sqrt().to_int()
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        unsafe { Self(vminq_s32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        unsafe { Self(vmaxq_s32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn sum(self) -> i32 {
        unsafe { vaddvq_s32(self.0) }
    }
}

impl SimdI32 for I32x4 {
    #[inline(always)]
    fn from_mask(mask: Mask4) -> Self {
        unsafe { Self(vreinterpretq_s32_u32(mask.0)) }
    }
}

impl Add for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        unsafe { Self(vaddq_s32(self.0, rhs.0)) }
    }
}

impl Sub for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        unsafe { Self(vsubq_s32(self.0, rhs.0)) }
    }
}

impl Mul for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        unsafe { Self(vmulq_s32(self.0, rhs.0)) }
    }
}

/// There is no vector integer division; lanes divide one at a time.
impl Div for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        let (a, b) = (self.to_array(), rhs.to_array());
        Self::from_array([
            div_lane(a[0], b[0]),
            div_lane(a[1], b[1]),
            div_lane(a[2], b[2]),
            div_lane(a[3], b[3]),
        ])
    }
}

impl Neg for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        unsafe { Self(vnegq_s32(self.0)) }
    }
}

impl BitAnd for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        unsafe { Self(vandq_s32(self.0, rhs.0)) }
    }
}

impl BitOr for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        unsafe { Self(vorrq_s32(self.0, rhs.0)) }
    }
}

impl BitXor for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self {
        unsafe { Self(veorq_s32(self.0, rhs.0)) }
    }
}

impl Not for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        unsafe { Self(vmvnq_s32(self.0)) }
    }
}

/// `sshl` treats negative counts as right shifts, so out-of-range counts
/// are resolved before reaching it: 32 or more clears the lanes.
impl Shl<i32> for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn shl(self, count: i32) -> Self {
        if count as u32 >= 32 {
            return Self::default();
        }
        unsafe { Self(vshlq_s32(self.0, vdupq_n_s32(count))) }
    }
}

/// Arithmetic shift; 32 or more fills with the sign bit.
impl Shr<i32> for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn shr(self, count: i32) -> Self {
        let count = (count as u32).min(31) as i32;
        unsafe { Self(vshlq_s32(self.0, vdupq_n_s32(-count))) }
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
    use crate::backend::shuffle_mask;

    #[test]
    fn table_shuffle_moves_whole_lanes() {
        let a = F32x4::from_array([0.0, 1.0, 2.0, 3.0]);
        let b = F32x4::from_array([4.0, 5.0, 6.0, 7.0]);
        assert_eq!(a.shuffle::<{ shuffle_mask(2, 3, 0, 1) }>().to_array(), [2.0, 3.0, 0.0, 1.0]);
        assert_eq!(a.shuffle2::<{ shuffle_mask(0, 3, 1, 2) }>(b).to_array(), [0.0, 3.0, 5.0, 6.0]);
    }

    #[test]
    fn min_max_return_second_operand_on_nan() {
        let a = F32x4::splat(f32::NAN);
        let b = F32x4::splat(2.0);
        assert_eq!(SimdNum::min(a, b).to_array(), [2.0; 4]);
        assert_eq!(SimdNum::max(a, b).to_array(), [2.0; 4]);
    }

    #[test]
    fn transpose_packs_rows_into_planes() {
        let rows = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0], [10.0, 11.0, 12.0]];
        let [x, y, z] = F32x4::transpose3(rows);
        assert_eq!(x.to_array(), [1.0, 4.0, 7.0, 10.0]);
        assert_eq!(y.to_array(), [2.0, 5.0, 8.0, 11.0]);
        assert_eq!(z.to_array(), [3.0, 6.0, 9.0, 12.0]);
    }

    #[test]
    fn mask_bitmask_uses_lane_weights() {
        assert_eq!(Mask4::from_array([true, false, true, true]).bitmask(), 0b1101);
    }
}
