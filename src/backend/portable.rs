//! Portable backend: four-element arrays and per-lane loops.
//!
//! This is the reference every hardware backend must agree with lane for
//! lane. It is also the backend for targets without a supported vector unit
//! (including PowerPC, whose AltiVec intrinsics are not available on stable
//! Rust) and for any build with the `portable` feature.
//!
//! Masks store `u32` lanes holding `!0` or `0`, so `select` is the same
//! branch-free `b ^ (m & (a ^ b))` blend the hardware performs.

use super::{
    div_lane, lane_mask, shuffle_index, Backend, Lane4, SimdF32, SimdI32, SimdMask, SimdNum,
    LANES,
};
use core::array;
use core::fmt::{Debug, Formatter};
use core::ops::*;

/// Portable backend (4 lanes, no intrinsics).
#[derive(Copy, Clone, Debug, Default)]
pub struct Portable;

impl Backend for Portable {
    const NAME: &'static str = "portable";
    type Mask = Mask4;
    type F32 = F32x4;
    type I32 = I32x4;
}

#[inline(always)]
fn blend(mask: u32, a: u32, b: u32) -> u32 {
    b ^ (mask & (a ^ b))
}

#[inline(always)]
fn zip<T: Copy, U>(a: [T; LANES], b: [T; LANES], f: impl Fn(T, T) -> U) -> [U; LANES] {
    array::from_fn(|i| f(a[i], b[i]))
}

#[inline(always)]
fn permute<T: Copy>(a: &[T; LANES], b: &[T; LANES], mask: i32) -> [T; LANES] {
    array::from_fn(|i| {
        let source = if i < 2 { a } else { b };
        source[shuffle_index(mask, i)]
    })
}

// ============================================================================
// Mask4
// ============================================================================

/// 4-lane mask, each lane `!0` (true) or `0` (false).
#[derive(Copy, Clone, Default, PartialEq, Eq)]
#[repr(C, align(16))]
pub struct Mask4([u32; LANES]);

impl Debug for Mask4 {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "Mask4({:04b})", self.bitmask())
    }
}

impl Lane4 for Mask4 {
    type Elem = bool;
    type Mask = Self;

    #[inline(always)]
    fn splat(value: bool) -> Self {
        Self([lane_mask(value); LANES])
    }

    #[inline(always)]
    fn from_array(lanes: [bool; LANES]) -> Self {
        Self(lanes.map(lane_mask))
    }

    #[inline(always)]
    fn to_array(self) -> [bool; LANES] {
        self.0.map(|lane| lane == u32::MAX)
    }

    #[inline(always)]
    fn select(mask: Self, if_true: Self, if_false: Self) -> Self {
        Self(array::from_fn(|i| blend(mask.0[i], if_true.0[i], if_false.0[i])))
    }

    #[inline(always)]
    fn simd_eq(self, rhs: Self) -> Self {
        Self(zip(self.0, rhs.0, |a, b| !(a ^ b)))
    }

    #[inline(always)]
    fn shuffle<const MASK: i32>(self) -> Self {
        Self(permute(&self.0, &self.0, MASK))
    }

    #[inline(always)]
    fn shuffle2<const MASK: i32>(self, other: Self) -> Self {
        Self(permute(&self.0, &other.0, MASK))
    }
}

impl SimdMask for Mask4 {
    #[inline(always)]
    fn bitmask(self) -> u32 {
        self.0
            .iter()
            .enumerate()
            .fold(0, |bits, (i, &lane)| bits | ((lane >> 31) << i))
    }
}

impl BitAnd for Mask4 {
    type Output = Self;
    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        Self(zip(self.0, rhs.0, |a, b| a & b))
    }
}

impl BitOr for Mask4 {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        Self(zip(self.0, rhs.0, |a, b| a | b))
    }
}

impl BitXor for Mask4 {
    type Output = Self;
    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self {
        Self(zip(self.0, rhs.0, |a, b| a ^ b))
    }
}

impl Not for Mask4 {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        Self(self.0.map(|lane| !lane))
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

/// 4-lane f32 vector.
#[derive(Copy, Clone, Default)]
#[repr(C, align(16))]
pub struct F32x4([f32; LANES]);

impl Debug for F32x4 {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "F32x4({:?})", self.0)
    }
}

impl Lane4 for F32x4 {
    type Elem = f32;
    type Mask = Mask4;

    #[inline(always)]
    fn splat(value: f32) -> Self {
        Self([value; LANES])
    }

    #[inline(always)]
    fn from_array(lanes: [f32; LANES]) -> Self {
        Self(lanes)
    }

    #[inline(always)]
    fn to_array(self) -> [f32; LANES] {
        self.0
    }

    #[inline(always)]
    fn get(self, lane: usize) -> f32 {
        self.0[lane]
    }

    #[inline(always)]
    fn set(&mut self, lane: usize, value: f32) {
        self.0[lane] = value;
    }

    #[inline(always)]
    fn select(mask: Mask4, if_true: Self, if_false: Self) -> Self {
        Self(array::from_fn(|i| {
            f32::from_bits(blend(mask.0[i], if_true.0[i].to_bits(), if_false.0[i].to_bits()))
        }))
    }

    #[inline(always)]
    fn simd_eq(self, rhs: Self) -> Mask4 {
        Mask4(zip(self.0, rhs.0, |a, b| lane_mask(a == b)))
    }

    #[inline(always)]
    fn shuffle<const MASK: i32>(self) -> Self {
        Self(permute(&self.0, &self.0, MASK))
    }

    #[inline(always)]
    fn shuffle2<const MASK: i32>(self, other: Self) -> Self {
        Self(permute(&self.0, &other.0, MASK))
    }
}

impl SimdNum for F32x4 {
    #[inline(always)]
    fn simd_lt(self, rhs: Self) -> Mask4 {
        Mask4(zip(self.0, rhs.0, |a, b| lane_mask(a < b)))
    }

    #[inline(always)]
    fn simd_le(self, rhs: Self) -> Mask4 {
        Mask4(zip(self.0, rhs.0, |a, b| lane_mask(a <= b)))
    }

    #[inline(always)]
    fn abs(self) -> Self {
        Self(self.0.map(libm::fabsf))
    }

    #[inline(always)]
    fn sqrt(self) -> Self {
        Self(self.0.map(libm::sqrtf))
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        Self(zip(self.0, rhs.0, |a, b| if a < b { a } else { b }))
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        Self(zip(self.0, rhs.0, |a, b| if a > b { a } else { b }))
    }

    #[inline(always)]
    fn sum(self) -> f32 {
        ((self.0[0] + self.0[1]) + self.0[2]) + self.0[3]
    }
}

impl SimdF32 for F32x4 {
    type Int = I32x4;

    #[inline(always)]
    fn floor(self) -> Self {
        Self(self.0.map(libm::floorf))
    }

    #[inline(always)]
    fn ceil(self) -> Self {
        Self(self.0.map(libm::ceilf))
    }

    #[inline(always)]
    fn recip(self) -> Self {
        Self(self.0.map(|x| 1.0 / x))
    }

    #[inline(always)]
    fn to_int(self) -> I32x4 {
        I32x4(self.0.map(|x| x as i32))
    }

    #[inline(always)]
    fn from_int(lanes: I32x4) -> Self {
        Self(lanes.0.map(|x| x as f32))
    }
}

impl Add for F32x4 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self(zip(self.0, rhs.0, |a, b| a + b))
    }
}

impl Sub for F32x4 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self(zip(self.0, rhs.0, |a, b| a - b))
    }
}

impl Mul for F32x4 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        Self(zip(self.0, rhs.0, |a, b| a * b))
    }
}

impl Div for F32x4 {
    type Output = Self;
    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        Self(zip(self.0, rhs.0, |a, b| a / b))
    }
}

impl Neg for F32x4 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self(self.0.map(|x| -x))
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

/// 4-lane i32 vector. Arithmetic wraps.
#[derive(Copy, Clone, Default)]
#[repr(C, align(16))]
pub struct I32x4([i32; LANES]);

impl Debug for I32x4 {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "I32x4({:?})", self.0)
    }
}

impl Lane4 for I32x4 {
    type Elem = i32;
    type Mask = Mask4;

    #[inline(always)]
    fn splat(value: i32) -> Self {
        Self([value; LANES])
    }

    #[inline(always)]
    fn from_array(lanes: [i32; LANES]) -> Self {
        Self(lanes)
    }

    #[inline(always)]
    fn to_array(self) -> [i32; LANES] {
        self.0
    }

    #[inline(always)]
    fn get(self, lane: usize) -> i32 {
        self.0[lane]
    }

    #[inline(always)]
    fn set(&mut self, lane: usize, value: i32) {
        self.0[lane] = value;
    }

    #[inline(always)]
    fn select(mask: Mask4, if_true: Self, if_false: Self) -> Self {
        Self(array::from_fn(|i| {
            blend(mask.0[i], if_true.0[i] as u32, if_false.0[i] as u32) as i32
        }))
    }

    #[inline(always)]
    fn simd_eq(self, rhs: Self) -> Mask4 {
        Mask4(zip(self.0, rhs.0, |a, b| lane_mask(a == b)))
    }

    #[inline(always)]
    fn shuffle<const MASK: i32>(self) -> Self {
        Self(permute(&self.0, &self.0, MASK))
    }

    #[inline(always)]
    fn shuffle2<const MASK: i32>(self, other: Self) -> Self {
        Self(permute(&self.0, &other.0, MASK))
    }
}

impl SimdNum for I32x4 {
    #[inline(always)]
    fn simd_lt(self, rhs: Self) -> Mask4 {
        Mask4(zip(self.0, rhs.0, |a, b| lane_mask(a < b)))
    }

    #[inline(always)]
    fn simd_le(self, rhs: Self) -> Mask4 {
        Mask4(zip(self.0, rhs.0, |a, b| lane_mask(a <= b)))
    }

    #[inline(always)]
    fn abs(self) -> Self {
        Self(self.0.map(i32::wrapping_abs))
    }

    /// Truncated f32 square root; negative lanes yield 0.
    #[inline(always)]
    fn sqrt(self) -> Self {
        Self(self.0.map(|x| libm::sqrtf(x.max(0) as f32) as i32))
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        Self(zip(self.0, rhs.0, Ord::min))
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        Self(zip(self.0, rhs.0, Ord::max))
    }

    #[inline(always)]
    fn sum(self) -> i32 {
        self.0.iter().fold(0, |acc, &x| acc.wrapping_add(x))
    }
}

impl SimdI32 for I32x4 {
    #[inline(always)]
    fn from_mask(mask: Mask4) -> Self {
        Self(mask.0.map(|lane| lane as i32))
    }
}

impl Add for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self(zip(self.0, rhs.0, i32::wrapping_add))
    }
}

impl Sub for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self(zip(self.0, rhs.0, i32::wrapping_sub))
    }
}

impl Mul for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        Self(zip(self.0, rhs.0, i32::wrapping_mul))
    }
}

impl Div for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        Self(zip(self.0, rhs.0, div_lane))
    }
}

impl Neg for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self(self.0.map(i32::wrapping_neg))
    }
}

impl BitAnd for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        Self(zip(self.0, rhs.0, |a, b| a & b))
    }
}

impl BitOr for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        Self(zip(self.0, rhs.0, |a, b| a | b))
    }
}

impl BitXor for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self {
        Self(zip(self.0, rhs.0, |a, b| a ^ b))
    }
}

impl Not for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        Self(self.0.map(|x| !x))
    }
}

/// Counts of 32 or more (or negative) clear every bit, like `pslld`.
impl Shl<i32> for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn shl(self, count: i32) -> Self {
        let count = count as u32;
        if count >= 32 {
            return Self::default();
        }
        Self(self.0.map(|x| x << count))
    }
}

/// Arithmetic shift; counts of 32 or more fill with the sign bit.
impl Shr<i32> for I32x4 {
    type Output = Self;
    #[inline(always)]
    fn shr(self, count: i32) -> Self {
        let count = (count as u32).min(31);
        Self(self.0.map(|x| x >> count))
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
    fn select_blends_by_lane() {
        let mask = Mask4::new(true, false, false, true);
        let a = F32x4::new(1.0, 2.0, 3.0, 4.0);
        let b = F32x4::splat(-1.0);
        assert_eq!(F32x4::select(mask, a, b).to_array(), [1.0, -1.0, -1.0, 4.0]);
        let ints = I32x4::select(mask, I32x4::splat(7), I32x4::new(0, 1, 2, 3));
        assert_eq!(ints.to_array(), [7, 1, 2, 7]);
    }

    #[test]
    fn mask_bitmask_bit_i_is_lane_i() {
        assert_eq!(Mask4::new(true, false, false, false).bitmask(), 0b0001);
        assert_eq!(Mask4::new(false, false, true, true).bitmask(), 0b1100);
        assert_eq!(Mask4::from_halves(false, true).bitmask(), 0b1100);
        assert_eq!(format!("{:?}", Mask4::from_bits(0b0101)), "Mask4(0101)");
    }

    #[test]
    fn shuffles_pick_source_lanes() {
        let a = I32x4::new(10, 11, 12, 13);
        let b = I32x4::new(20, 21, 22, 23);
        assert_eq!(a.shuffle::<{ shuffle_mask(3, 2, 1, 0) }>().to_array(), [13, 12, 11, 10]);
        assert_eq!(a.shuffle2::<{ shuffle_mask(1, 0, 3, 2) }>(b).to_array(), [11, 10, 23, 22]);
    }

    #[test]
    fn integer_shifts_saturate_counts() {
        let x = I32x4::new(1, -8, i32::MAX, 3);
        assert_eq!((x << 1).to_array(), [2, -16, -2, 6]);
        assert_eq!((x << 32).to_array(), [0; 4]);
        assert_eq!((x >> 2).to_array(), [0, -2, i32::MAX >> 2, 0]);
        assert_eq!((x >> 40).to_array(), [0, -1, 0, 0]);
    }

    #[test]
    fn sum_folds_left_to_right() {
        let x = F32x4::new(1.0e8, 1.0, -1.0e8, 1.0);
        assert_eq!(x.sum(), ((1.0e8f32 + 1.0) + -1.0e8) + 1.0);
        assert_eq!(I32x4::new(i32::MAX, 1, 0, 0).sum(), i32::MIN);
    }
}
