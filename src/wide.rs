//! Lane-scalars wider than one hardware register.
//!
//! `Wide<S, N, U>` stores `N` logical lanes in `U = ceil(N / 4)` width-4
//! units of type `S`. Every operation applies the unit operation to each
//! unit in turn. When `N` is not a multiple of four the last unit carries
//! padding lanes; they travel through arithmetic like any other lane but no
//! public operation reads them:
//!
//! - constructors fill padding with `Elem::default()`;
//! - reductions and mask queries ignore padding lanes;
//! - `to_array`, `get` and `store` only see the first `N` lanes.
//!
//! `U` is spelled out because stable Rust cannot compute it from `N` in a
//! type. A mismatched pair fails to compile as soon as a value is built.

use crate::backend::{Lane4, SimdF32, SimdI32, SimdMask, SimdNum, LANES};
use core::array;
use core::fmt::{Debug, Formatter};
use core::ops::*;

/// `N` lanes stored in `U` width-4 units.
#[derive(Copy, Clone)]
pub struct Wide<S, const N: usize, const U: usize> {
    units: [S; U],
}

impl<S: Lane4, const N: usize, const U: usize> Debug for Wide<S, N, U> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "Wide<{}>({:?})", N, self.to_array())
    }
}

impl<S: Lane4, const N: usize, const U: usize> Wide<S, N, U> {
    const LAYOUT: () = assert!(N > 0 && U == (N + LANES - 1) / LANES, "Wide<S, N, U> needs U == ceil(N / 4)");

    /// Logical lane count.
    pub const WIDTH: usize = N;

    /// Valid lanes of unit `unit`, as a bitmask.
    #[inline(always)]
    const fn unit_bits(unit: usize) -> u32 {
        let defined = N - unit * LANES;
        if defined >= LANES {
            0xF
        } else {
            (1 << defined) - 1
        }
    }

    #[inline(always)]
    pub fn width() -> usize {
        N
    }

    #[inline(always)]
    pub fn from_units(units: [S; U]) -> Self {
        let () = Self::LAYOUT;
        Self { units }
    }

    #[inline(always)]
    pub fn units(&self) -> &[S; U] {
        &self.units
    }

    #[inline(always)]
    pub fn splat(value: S::Elem) -> Self {
        Self::from_units([S::splat(value); U])
    }

    /// Loads the first `N` values of `values`.
    pub fn from_slice(values: &[S::Elem]) -> Self {
        assert!(values.len() >= N, "need {} values, got {}", N, values.len());
        Self::from_units(array::from_fn(|unit| {
            S::from_array(array::from_fn(|lane| {
                values.get(unit * LANES + lane).filter(|_| unit * LANES + lane < N).copied().unwrap_or_default()
            }))
        }))
    }

    #[inline]
    pub fn from_array(values: [S::Elem; N]) -> Self {
        Self::from_slice(&values)
    }

    pub fn to_array(self) -> [S::Elem; N] {
        let mut out = [S::Elem::default(); N];
        for (unit, lanes) in self.units.iter().enumerate() {
            for (lane, value) in lanes.to_array().into_iter().enumerate() {
                if let Some(slot) = out.get_mut(unit * LANES + lane) {
                    *slot = value;
                }
            }
        }
        out
    }

    /// Writes the `N` lanes to the front of `out`.
    pub fn store(self, out: &mut [S::Elem]) {
        assert!(out.len() >= N);
        out[..N].copy_from_slice(&self.to_array());
    }

    #[inline]
    pub fn get(&self, lane: usize) -> S::Elem {
        debug_assert!(lane < N, "lane {lane} out of range for width {N}");
        self.units[lane / LANES].get(lane % LANES)
    }

    #[inline]
    pub fn set(&mut self, lane: usize, value: S::Elem) {
        debug_assert!(lane < N, "lane {lane} out of range for width {N}");
        self.units[lane / LANES].set(lane % LANES, value);
    }

    #[inline(always)]
    fn map<T>(self, f: impl Fn(S) -> T) -> Wide<T, N, U> {
        Wide { units: self.units.map(f) }
    }

    #[inline(always)]
    fn zip<T>(self, rhs: Self, f: impl Fn(S, S) -> T) -> Wide<T, N, U> {
        Wide { units: array::from_fn(|i| f(self.units[i], rhs.units[i])) }
    }

    /// Per lane: `if_true` where `mask` is set, `if_false` elsewhere.
    #[inline]
    pub fn select(mask: Wide<S::Mask, N, U>, if_true: Self, if_false: Self) -> Self {
        Wide {
            units: array::from_fn(|i| S::select(mask.units[i], if_true.units[i], if_false.units[i])),
        }
    }

    #[inline]
    pub fn simd_eq(self, rhs: Self) -> Wide<S::Mask, N, U> {
        self.zip(rhs, S::simd_eq)
    }

    #[inline]
    pub fn simd_ne(self, rhs: Self) -> Wide<S::Mask, N, U> {
        self.zip(rhs, S::simd_ne)
    }
}

impl<S: SimdNum, const N: usize, const U: usize> Wide<S, N, U> {
    #[inline]
    pub fn simd_lt(self, rhs: Self) -> Wide<S::Mask, N, U> {
        self.zip(rhs, S::simd_lt)
    }

    #[inline]
    pub fn simd_le(self, rhs: Self) -> Wide<S::Mask, N, U> {
        self.zip(rhs, S::simd_le)
    }

    #[inline]
    pub fn simd_gt(self, rhs: Self) -> Wide<S::Mask, N, U> {
        self.zip(rhs, S::simd_gt)
    }

    #[inline]
    pub fn simd_ge(self, rhs: Self) -> Wide<S::Mask, N, U> {
        self.zip(rhs, S::simd_ge)
    }

    #[inline]
    pub fn abs(self) -> Self {
        self.map(S::abs)
    }

    #[inline]
    pub fn sqrt(self) -> Self {
        self.map(S::sqrt)
    }

    #[inline]
    pub fn min(self, rhs: Self) -> Self {
        self.zip(rhs, S::min)
    }

    #[inline]
    pub fn max(self, rhs: Self) -> Self {
        self.zip(rhs, S::max)
    }

    /// Sum of the `N` defined lanes. Units are added lane-wise first, with
    /// the padding of the last unit zeroed, and the result is reduced once.
    /// Integer sums wrap.
    pub fn sum(self) -> S::Elem {
        let zero = S::splat(S::Elem::default());
        self.units
            .iter()
            .enumerate()
            .fold(zero, |acc, (unit, &lanes)| {
                let defined = <S::Mask as SimdMask>::from_bits(Self::unit_bits(unit));
                acc + S::select(defined, lanes, zero)
            })
            .sum()
    }
}

impl<S: SimdF32, const N: usize, const U: usize> Wide<S, N, U> {
    #[inline]
    pub fn floor(self) -> Self {
        self.map(S::floor)
    }

    #[inline]
    pub fn ceil(self) -> Self {
        self.map(S::ceil)
    }

    #[inline]
    pub fn recip(self) -> Self {
        self.map(S::recip)
    }
}

impl<M: SimdMask, const N: usize, const U: usize> Wide<M, N, U> {
    /// Bit `i` set iff lane `i` is true. Lanes past 64 are not representable.
    pub fn bitmask(self) -> u64 {
        debug_assert!(N <= 64, "bitmask holds at most 64 lanes");
        self.units.iter().enumerate().fold(0u64, |bits, (unit, lanes)| {
            let defined = (lanes.bitmask() & Self::unit_bits(unit)) as u64;
            bits | defined.checked_shl((unit * LANES) as u32).unwrap_or(0)
        })
    }

    /// True if any defined lane is set.
    pub fn any(self) -> bool {
        self.units
            .iter()
            .enumerate()
            .any(|(unit, lanes)| lanes.bitmask() & Self::unit_bits(unit) != 0)
    }

    pub fn all(self) -> bool {
        self.units.iter().enumerate().all(|(unit, lanes)| {
            let defined = Self::unit_bits(unit);
            lanes.bitmask() & defined == defined
        })
    }

    pub fn none(self) -> bool {
        !self.any()
    }
}

impl<M: SimdMask, const N: usize, const U: usize> PartialEq for Wide<M, N, U> {
    fn eq(&self, other: &Self) -> bool {
        self.units.iter().zip(other.units.iter()).enumerate().all(|(unit, (a, b))| {
            (a.bitmask() ^ b.bitmask()) & Self::unit_bits(unit) == 0
        })
    }
}

// ============================================================================
// Operators
// ============================================================================

macro_rules! impl_wide_binary {
    ($bound:ident; $($op:ident :: $method:ident => $assign:ident :: $assign_method:ident),* $(,)?) => {
        $(
            impl<S: $bound, const N: usize, const U: usize> $op for Wide<S, N, U> {
                type Output = Self;
                #[inline]
                fn $method(self, rhs: Self) -> Self {
                    self.zip(rhs, S::$method)
                }
            }

            impl<S: $bound, const N: usize, const U: usize> $assign for Wide<S, N, U> {
                #[inline]
                fn $assign_method(&mut self, rhs: Self) {
                    *self = $op::$method(*self, rhs);
                }
            }
        )*
    };
}

impl_wide_binary!(SimdNum;
    Add::add => AddAssign::add_assign,
    Sub::sub => SubAssign::sub_assign,
    Mul::mul => MulAssign::mul_assign,
    Div::div => DivAssign::div_assign,
);

impl<S: SimdNum, const N: usize, const U: usize> Neg for Wide<S, N, U> {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        self.map(S::neg)
    }
}

impl<S: SimdI32, const N: usize, const U: usize> Shl<i32> for Wide<S, N, U> {
    type Output = Self;
    #[inline]
    fn shl(self, count: i32) -> Self {
        self.map(|lanes| lanes << count)
    }
}

impl<S: SimdI32, const N: usize, const U: usize> Shr<i32> for Wide<S, N, U> {
    type Output = Self;
    #[inline]
    fn shr(self, count: i32) -> Self {
        self.map(|lanes| lanes >> count)
    }
}

// Bitwise operators. Masks are covered generically; integer lanes get one
// impl per concrete type so the two families cannot overlap.
macro_rules! impl_wide_bits {
    (@ops [$($generics:tt)*] $ty:ty, $map:expr) => {
        impl<$($generics)* const N: usize, const U: usize> BitAnd for Wide<$ty, N, U> {
            type Output = Self;
            #[inline]
            fn bitand(self, rhs: Self) -> Self {
                Wide { units: array::from_fn(|i| self.units[i] & rhs.units[i]) }
            }
        }

        impl<$($generics)* const N: usize, const U: usize> BitOr for Wide<$ty, N, U> {
            type Output = Self;
            #[inline]
            fn bitor(self, rhs: Self) -> Self {
                Wide { units: array::from_fn(|i| self.units[i] | rhs.units[i]) }
            }
        }

        impl<$($generics)* const N: usize, const U: usize> BitXor for Wide<$ty, N, U> {
            type Output = Self;
            #[inline]
            fn bitxor(self, rhs: Self) -> Self {
                Wide { units: array::from_fn(|i| self.units[i] ^ rhs.units[i]) }
            }
        }

        impl<$($generics)* const N: usize, const U: usize> Not for Wide<$ty, N, U> {
            type Output = Self;
            #[inline]
            fn not(self) -> Self {
                Wide { units: self.units.map($map) }
            }
        }

        impl<$($generics)* const N: usize, const U: usize> BitAndAssign for Wide<$ty, N, U> {
            #[inline]
            fn bitand_assign(&mut self, rhs: Self) {
                *self = *self & rhs;
            }
        }

        impl<$($generics)* const N: usize, const U: usize> BitOrAssign for Wide<$ty, N, U> {
            #[inline]
            fn bitor_assign(&mut self, rhs: Self) {
                *self = *self | rhs;
            }
        }

        impl<$($generics)* const N: usize, const U: usize> BitXorAssign for Wide<$ty, N, U> {
            #[inline]
            fn bitxor_assign(&mut self, rhs: Self) {
                *self = *self ^ rhs;
            }
        }
    };
    ($($int:ty),* $(,)?) => {
        $(impl_wide_bits!(@ops [] $int, <$int as Not>::not);)*
    };
}

impl_wide_bits!(@ops [M: SimdMask,] M, M::not);
impl_wide_bits!(crate::backend::portable::I32x4);

#[cfg(target_arch = "x86_64")]
impl_wide_bits!(crate::backend::x86::I32x4);

#[cfg(target_arch = "aarch64")]
impl_wide_bits!(crate::backend::arm::I32x4);

// Scalar-broadcast forms for the two numeric element types.
macro_rules! impl_wide_broadcast {
    ($bound:ident, $elem:ty; $($op:ident :: $method:ident => $assign:ident :: $assign_method:ident),* $(,)?) => {
        $(
            impl<S: $bound, const N: usize, const U: usize> $op<$elem> for Wide<S, N, U> {
                type Output = Self;
                #[inline]
                fn $method(self, rhs: $elem) -> Self {
                    $op::$method(self, Self::splat(rhs))
                }
            }

            impl<S: $bound, const N: usize, const U: usize> $op<Wide<S, N, U>> for $elem {
                type Output = Wide<S, N, U>;
                #[inline]
                fn $method(self, rhs: Wide<S, N, U>) -> Wide<S, N, U> {
                    $op::$method(Wide::splat(self), rhs)
                }
            }

            impl<S: $bound, const N: usize, const U: usize> $assign<$elem> for Wide<S, N, U> {
                #[inline]
                fn $assign_method(&mut self, rhs: $elem) {
                    *self = $op::$method(*self, rhs);
                }
            }
        )*
    };
}

impl_wide_broadcast!(SimdF32, f32;
    Add::add => AddAssign::add_assign,
    Sub::sub => SubAssign::sub_assign,
    Mul::mul => MulAssign::mul_assign,
    Div::div => DivAssign::div_assign,
);

impl_wide_broadcast!(SimdI32, i32;
    Add::add => AddAssign::add_assign,
    Sub::sub => SubAssign::sub_assign,
    Mul::mul => MulAssign::mul_assign,
    Div::div => DivAssign::div_assign,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lanes::{F32x4, I32x4, Mask4};

    type F7 = Wide<F32x4, 7, 2>;
    type I5 = Wide<I32x4, 5, 2>;
    type M7 = Wide<Mask4, 7, 2>;

    #[test]
    fn array_round_trip_hides_padding() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let wide = F7::from_array(values);
        assert_eq!(wide.to_array(), values);
        assert_eq!(wide.units()[1].to_array(), [5.0, 6.0, 7.0, 0.0]);
        assert_eq!(F7::width(), 7);
    }

    #[test]
    fn arithmetic_matches_lane_by_lane() {
        let a = I5::from_array([1, -2, 3, -4, 5]);
        let b = I5::from_array([10, 20, 30, 40, 50]);
        assert_eq!((a + b).to_array(), [11, 18, 33, 36, 55]);
        assert_eq!((a * b - 1).to_array(), [9, -41, 89, -161, 249]);
        assert_eq!((b / a).to_array(), [10, -10, 10, -10, 10]);
        assert_eq!((-a).to_array(), [-1, 2, -3, 4, -5]);
    }

    #[test]
    fn integer_division_by_padding_never_traps() {
        // The divisor's padding lanes are zero and must not fault.
        let a = I5::splat(9);
        let b = I5::from_array([3, 3, 3, 3, 3]);
        assert_eq!((a / b).to_array(), [3; 5]);
        assert_eq!((b / I5::from_array([0, 1, 0, 1, 0])).to_array(), [0, 3, 0, 3, 0]);
    }

    #[test]
    fn sum_ignores_padding() {
        let mut wide = F7::splat(1.0);
        assert_eq!(wide.sum(), 7.0);
        wide.set(6, 10.0);
        assert_eq!(wide.get(6), 10.0);
        assert_eq!(wide.sum(), 16.0);
    }

    #[test]
    fn mask_queries_ignore_padding() {
        // splat(true) sets the padding lane too; it must not count.
        let all = M7::splat(true);
        assert_eq!(all.bitmask(), 0b111_1111);
        assert!(all.all());

        let a = F7::from_array([0.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let hit = a.simd_gt(F7::splat(1.0));
        assert_eq!(hit.bitmask(), 0b000_0010);
        assert!(hit.any());
        assert!(!hit.all());
        assert!((!hit & hit).none());
    }

    #[test]
    fn select_picks_per_lane() {
        let mask = M7::from_array([true, false, true, false, true, false, true]);
        let picked = F7::select(mask, F7::splat(1.0), F7::splat(-1.0));
        assert_eq!(picked.to_array(), [1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0]);
    }
}
