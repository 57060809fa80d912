//! Width-4 lane contracts.
//!
//! This module defines the interface every 4-lane register implementation
//! satisfies. Implementations are provided in submodules:
//!
//! - `portable`: plain arrays and per-lane loops. Always compiled, so the
//!   hardware paths can be checked against it on any machine.
//! - `x86`: SSE2 registers, with SSE3/SSSE3/SSE4.1 fast paths when those
//!   target features are enabled at build time.
//! - `arm`: AArch64 NEON registers.
//!
//! # Masks
//!
//! Comparisons produce a [`SimdMask`] whose lanes are either all-ones (true)
//! or all-zeros (false), never anything in between. Every mask operation
//! preserves that, which is what lets [`Lane4::select`] blend with plain bit
//! operations instead of branching.
//!
//! # Shuffles
//!
//! Lane permutations take a single immediate built with [`shuffle_mask`],
//! the same encoding as `_MM_SHUFFLE` but with the lanes listed in result
//! order: `x.shuffle::<{ shuffle_mask(2, 3, 0, 1) }>()` yields
//! `(x[2], x[3], x[0], x[1])`.

use core::fmt::Debug;
use core::ops::{
    Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Div,
    DivAssign, Mul, MulAssign, Neg, Not, Shl, Shr, Sub, SubAssign,
};

// Scalar-broadcast operators (`lanes op elem`, `elem op lanes`) and the
// compound assignment forms, derived from each backend's `lanes op lanes`.
macro_rules! impl_broadcast_ops {
    ($lanes:ty, $elem:ty; $($op:ident :: $method:ident => $assign:ident :: $assign_method:ident),* $(,)?) => {
        $(
            impl core::ops::$op<$elem> for $lanes {
                type Output = $lanes;
                #[inline(always)]
                fn $method(self, rhs: $elem) -> $lanes {
                    core::ops::$op::$method(self, <$lanes as $crate::backend::Lane4>::splat(rhs))
                }
            }

            impl core::ops::$op<$lanes> for $elem {
                type Output = $lanes;
                #[inline(always)]
                fn $method(self, rhs: $lanes) -> $lanes {
                    core::ops::$op::$method(<$lanes as $crate::backend::Lane4>::splat(self), rhs)
                }
            }

            impl core::ops::$assign<$elem> for $lanes {
                #[inline(always)]
                fn $assign_method(&mut self, rhs: $elem) {
                    *self = core::ops::$op::$method(*self, rhs);
                }
            }
        )*
        impl_assign_ops!($lanes; $($op::$method => $assign::$assign_method),*);
    };
}

macro_rules! impl_assign_ops {
    ($lanes:ty; $($op:ident :: $method:ident => $assign:ident :: $assign_method:ident),* $(,)?) => {
        $(
            impl core::ops::$assign for $lanes {
                #[inline(always)]
                fn $assign_method(&mut self, rhs: $lanes) {
                    *self = core::ops::$op::$method(*self, rhs);
                }
            }
        )*
    };
}

// Integer lanes combined with a mask, as if the mask were -1/0 integers.
macro_rules! impl_int_mask_ops {
    ($int:ty, $mask:ty) => {
        impl core::ops::BitAnd<$mask> for $int {
            type Output = $int;
            #[inline(always)]
            fn bitand(self, rhs: $mask) -> $int {
                self & <$int as $crate::backend::SimdI32>::from_mask(rhs)
            }
        }

        impl core::ops::BitOr<$mask> for $int {
            type Output = $int;
            #[inline(always)]
            fn bitor(self, rhs: $mask) -> $int {
                self | <$int as $crate::backend::SimdI32>::from_mask(rhs)
            }
        }

        impl core::ops::BitXor<$mask> for $int {
            type Output = $int;
            #[inline(always)]
            fn bitxor(self, rhs: $mask) -> $int {
                self ^ <$int as $crate::backend::SimdI32>::from_mask(rhs)
            }
        }
    };
}

pub mod portable;

#[cfg(target_arch = "x86_64")]
pub mod x86;

#[cfg(target_arch = "aarch64")]
pub mod arm;

/// Lanes in every hardware unit.
pub const LANES: usize = 4;

bitflags::bitflags! {
    /// One bit per lane of a width-4 mask, bit `i` for lane `i`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    pub struct LaneBits: u8 {
        const LANE0 = 1 << 0;
        const LANE1 = 1 << 1;
        const LANE2 = 1 << 2;
        const LANE3 = 1 << 3;
    }
}

impl LaneBits {
    /// Index of the lowest set lane.
    #[inline]
    pub fn first(self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(self.bits().trailing_zeros() as usize)
        }
    }

    /// Iterates the indices of the set lanes in ascending order.
    pub fn indices(self) -> impl Iterator<Item = usize> {
        (0..LANES).filter(move |&lane| self.bits() & (1 << lane) != 0)
    }
}

/// Packs four lane indices into a shuffle immediate.
///
/// Result lane `k` takes source lane `ik`. For the two-source form lanes 0
/// and 1 come from the receiver and lanes 2 and 3 from the argument.
#[inline(always)]
pub const fn shuffle_mask(i0: u32, i1: u32, i2: u32, i3: u32) -> i32 {
    ((i0 & 3) | ((i1 & 3) << 2) | ((i2 & 3) << 4) | ((i3 & 3) << 6)) as i32
}

/// Source lane of result lane `lane` under `mask`.
#[inline(always)]
pub(crate) const fn shuffle_index(mask: i32, lane: usize) -> usize {
    ((mask >> (2 * lane)) & 3) as usize
}

/// Mask lane for a boolean: all-ones or all-zeros.
#[inline(always)]
pub(crate) const fn lane_mask(condition: bool) -> u32 {
    0u32.wrapping_sub(condition as u32)
}

/// Lane division as the kernel defines it: a zero divisor (or the one
/// overflowing quotient) yields 0 instead of trapping.
#[inline(always)]
pub(crate) fn div_lane(a: i32, b: i32) -> i32 {
    a.checked_div(b).unwrap_or(0)
}

/// A backend provides the width-4 lane types for one platform.
pub trait Backend: 'static + Copy + Clone + Debug + Default + Send + Sync {
    /// Human readable name, used in logs.
    const NAME: &'static str;

    /// Mask produced by every comparison of this backend.
    type Mask: SimdMask;

    /// Four f32 lanes.
    type F32: SimdF32<Mask = Self::Mask, Int = Self::I32>;

    /// Four i32 lanes.
    type I32: SimdI32<Mask = Self::Mask>;
}

/// Operations shared by every width-4 lane type.
pub trait Lane4: Copy + Clone + Debug + Send + Sync + 'static {
    /// Value held by one lane.
    type Elem: Copy + Debug + Default + PartialEq;

    /// Mask type produced by lane comparisons.
    type Mask: SimdMask;

    /// Broadcast one value to all lanes.
    fn splat(value: Self::Elem) -> Self;

    /// Load lanes from an array, lane `i` from `lanes[i]`.
    fn from_array(lanes: [Self::Elem; LANES]) -> Self;

    /// Copy lanes out to an array.
    fn to_array(self) -> [Self::Elem; LANES];

    /// Build from explicit per-lane values.
    #[inline(always)]
    fn new(a: Self::Elem, b: Self::Elem, c: Self::Elem, d: Self::Elem) -> Self {
        Self::from_array([a, b, c, d])
    }

    /// Load the first four values of a slice.
    #[inline(always)]
    fn from_slice(values: &[Self::Elem]) -> Self {
        assert!(values.len() >= LANES);
        Self::new(values[0], values[1], values[2], values[3])
    }

    /// Store all lanes to the front of `out`.
    #[inline(always)]
    fn store(self, out: &mut [Self::Elem]) {
        assert!(out.len() >= LANES);
        out[..LANES].copy_from_slice(&self.to_array());
    }

    #[inline(always)]
    fn get(self, lane: usize) -> Self::Elem {
        debug_assert!(lane < LANES, "lane {lane} out of range");
        self.to_array()[lane]
    }

    #[inline(always)]
    fn set(&mut self, lane: usize, value: Self::Elem) {
        debug_assert!(lane < LANES, "lane {lane} out of range");
        let mut lanes = self.to_array();
        lanes[lane] = value;
        *self = Self::from_array(lanes);
    }

    /// Per lane: `if_true` where `mask` is set, `if_false` elsewhere.
    /// Branch free.
    fn select(mask: Self::Mask, if_true: Self, if_false: Self) -> Self;

    /// Lane-wise equality.
    fn simd_eq(self, rhs: Self) -> Self::Mask;

    /// Lane-wise inequality. NaN lanes compare unequal.
    #[inline(always)]
    fn simd_ne(self, rhs: Self) -> Self::Mask {
        !self.simd_eq(rhs)
    }

    /// Single-source permutation, see [`shuffle_mask`].
    fn shuffle<const MASK: i32>(self) -> Self;

    /// Two-source permutation: `(self[i0], self[i1], other[i2], other[i3])`.
    fn shuffle2<const MASK: i32>(self, other: Self) -> Self;
}

/// Boolean lanes.
pub trait SimdMask:
    Lane4<Elem = bool, Mask = Self>
    + PartialEq
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + Not<Output = Self>
    + BitAndAssign
    + BitOrAssign
    + BitXorAssign
{
    /// Compact lane mask, bit `i` set iff lane `i` is true.
    fn bitmask(self) -> u32;

    /// Lanes 0 and 1 take `low`, lanes 2 and 3 take `high`.
    #[inline(always)]
    fn from_halves(low: bool, high: bool) -> Self {
        Self::new(low, low, high, high)
    }

    /// Inverse of [`SimdMask::bitmask`]. Bits above lane 3 are ignored.
    #[inline(always)]
    fn from_bits(bits: u32) -> Self {
        Self::new(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0)
    }

    #[inline(always)]
    fn lanes(self) -> LaneBits {
        LaneBits::from_bits_truncate(self.bitmask() as u8)
    }

    /// True if any lane is set.
    #[inline(always)]
    fn any(self) -> bool {
        self.bitmask() != 0
    }

    #[inline(always)]
    fn all(self) -> bool {
        self.bitmask() == 0xF
    }

    #[inline(always)]
    fn none(self) -> bool {
        self.bitmask() == 0
    }

    /// Lane-wise comparison against a broadcast boolean.
    #[inline(always)]
    fn eq_bool(self, value: bool) -> Self {
        self.simd_eq(Self::splat(value))
    }
}

/// Numeric lanes: arithmetic, ordering and reductions.
pub trait SimdNum:
    Lane4
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
{
    fn simd_lt(self, rhs: Self) -> Self::Mask;
    fn simd_le(self, rhs: Self) -> Self::Mask;

    #[inline(always)]
    fn simd_gt(self, rhs: Self) -> Self::Mask {
        rhs.simd_lt(self)
    }

    #[inline(always)]
    fn simd_ge(self, rhs: Self) -> Self::Mask {
        rhs.simd_le(self)
    }

    fn abs(self) -> Self;
    fn sqrt(self) -> Self;

    /// `if self < rhs { self } else { rhs }` per lane.
    fn min(self, rhs: Self) -> Self;

    /// `if self > rhs { self } else { rhs }` per lane.
    fn max(self, rhs: Self) -> Self;

    /// Horizontal sum. Hardware backends pair lanes, so float sums may round
    /// differently from the portable left-to-right fold.
    fn sum(self) -> Self::Elem;

    /// Packs four xyz rows into three lane registers (x, y and z planes).
    #[inline(always)]
    fn transpose3(rows: [[Self::Elem; 3]; LANES]) -> [Self; 3] {
        let [r0, r1, r2, r3] = rows;
        [
            Self::new(r0[0], r1[0], r2[0], r3[0]),
            Self::new(r0[1], r1[1], r2[1], r3[1]),
            Self::new(r0[2], r1[2], r2[2], r3[2]),
        ]
    }
}

/// Four f32 lanes.
pub trait SimdF32:
    SimdNum<Elem = f32>
    + Add<f32, Output = Self>
    + Sub<f32, Output = Self>
    + Mul<f32, Output = Self>
    + Div<f32, Output = Self>
    + AddAssign<f32>
    + SubAssign<f32>
    + MulAssign<f32>
    + DivAssign<f32>
{
    /// Integer lanes of the same backend.
    type Int: SimdI32<Mask = Self::Mask>;

    fn floor(self) -> Self;
    fn ceil(self) -> Self;

    /// Exact `1 / x` per lane.
    fn recip(self) -> Self;

    /// Truncating conversion. Lanes outside the i32 range (and NaN) are
    /// backend defined.
    fn to_int(self) -> Self::Int;

    /// Round-to-nearest conversion from integer lanes.
    fn from_int(lanes: Self::Int) -> Self;
}

/// Four i32 lanes. Arithmetic wraps, like the hardware.
pub trait SimdI32:
    SimdNum<Elem = i32>
    + Add<i32, Output = Self>
    + Sub<i32, Output = Self>
    + Mul<i32, Output = Self>
    + Div<i32, Output = Self>
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + Not<Output = Self>
    + BitAndAssign
    + BitOrAssign
    + BitXorAssign
    + Shl<i32, Output = Self>
    + Shr<i32, Output = Self>
{
    /// Reinterprets a mask as integer lanes: -1 for true, 0 for false.
    fn from_mask(mask: Self::Mask) -> Self;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffle_mask_matches_mm_shuffle_encoding() {
        // _MM_SHUFFLE(3, 2, 1, 0) is the identity, 0b11_10_01_00.
        assert_eq!(shuffle_mask(0, 1, 2, 3), 0b11_10_01_00);
        assert_eq!(shuffle_mask(2, 3, 0, 1), 0b01_00_11_10);
        for lane in 0..LANES {
            assert_eq!(shuffle_index(shuffle_mask(3, 1, 0, 2), lane), [3, 1, 0, 2][lane]);
        }
    }

    #[test]
    fn lane_bits_iterate_in_order() {
        let bits = LaneBits::LANE1 | LaneBits::LANE3;
        assert_eq!(bits.first(), Some(1));
        let mut lanes = bits.indices();
        assert_eq!(lanes.next(), Some(1));
        assert_eq!(lanes.next(), Some(3));
        assert_eq!(lanes.next(), None);
        assert_eq!(LaneBits::empty().first(), None);
    }

    #[test]
    fn masks_are_canonical() {
        assert_eq!(lane_mask(true), u32::MAX);
        assert_eq!(lane_mask(false), 0);
    }

    #[test]
    fn lane_division_never_traps() {
        assert_eq!(div_lane(7, 2), 3);
        assert_eq!(div_lane(-7, 2), -3);
        assert_eq!(div_lane(7, 0), 0);
        assert_eq!(div_lane(i32::MIN, -1), 0);
    }
}
