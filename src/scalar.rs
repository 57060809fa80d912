//! Generic single-value numeric primitives.
//!
//! Every primitive integer and float type implements [`Scalar`]. Floats follow
//! IEEE-754 (through `libm`, so the kernel stays usable without `std`), while
//! integer types degrade to sentinel values instead of trapping:
//!
//! - integers have no NaN, so [`Scalar::nan`] is zero;
//! - integers have no infinity, so the sentinels are the type's extremes;
//! - unsigned types have no negative infinity, it is zero.
//!
//! The free functions at the bottom of the module mirror the trait methods so
//! call sites can read `scalar::clamp(x, lo, hi)`.

use core::fmt::Debug;
use core::ops::{Add, Div, Mul, Neg, Sub};

/// Conversion factor from radians to degrees.
pub const RADIANS_TO_DEGREES: f64 = 57.295_779_513_082_325;

/// Conversion factor from degrees to radians.
pub const DEGREES_TO_RADIANS: f64 = 0.017_453_292_519_943;

/// A primitive number usable by the scalar geometry and the lane types.
pub trait Scalar:
    Copy
    + Debug
    + Default
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
    const ZERO: Self;
    const ONE: Self;
    const IS_INTEGER: bool;
    const IS_FLOAT: bool;
    const IS_SIGNED: bool;

    /// Largest representable finite value.
    fn max_value() -> Self;
    /// Smallest representable finite value (`-max` for floats).
    fn min_value() -> Self;
    /// Machine epsilon for floats, one for integers.
    fn epsilon() -> Self;
    fn nan() -> Self;
    fn infinity() -> Self;
    fn negative_infinity() -> Self;

    fn is_nan(self) -> bool;
    fn is_infinity(self) -> bool;
    fn is_negative_infinity(self) -> bool;

    #[inline]
    fn is_infinite(self) -> bool {
        self.is_infinity() || self.is_negative_infinity()
    }

    #[inline]
    fn is_finite(self) -> bool {
        !self.is_infinite() && !self.is_nan()
    }

    fn abs(self) -> Self;
    /// -1, 0 or 1. Unsigned values always report 1.
    fn sign(self) -> Self;
    fn floor(self) -> Self;
    fn ceiling(self) -> Self;
    /// Rounds half up: `floor(x + 0.5)`.
    fn round(self) -> Self;
    fn sqrt(self) -> Self;
    fn pow(self, exponent: Self) -> Self;
    fn ln(self) -> Self;
    fn log10(self) -> Self;

    /// Lossy conversion, saturating for integers.
    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;

    /// `None` where integer arithmetic would overflow or divide by zero.
    /// Floats always answer.
    fn checked_add(self, rhs: Self) -> Option<Self>;
    fn checked_sub(self, rhs: Self) -> Option<Self>;
    fn checked_mul(self, rhs: Self) -> Option<Self>;
    fn checked_div(self, rhs: Self) -> Option<Self>;
}

/// Floating point scalars: the types the geometry layer is normally
/// instantiated with.
pub trait Float: Scalar + Neg<Output = Self> {
    const PI: Self;
    const E: Self;

    fn exp(self) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn tan(self) -> Self;
    fn acos(self) -> Self;
    fn atan2(self, x: Self) -> Self;
    fn recip(self) -> Self {
        Self::ONE / self
    }
}

/// Floor square root of a non-negative integer.
///
/// Newton's iteration in a 128-bit working type. It stops once a step would
/// no longer decrease the estimate, i.e. once the change drops below one unit
/// of the integer type, so the result is exact for every integer width.
fn newton_isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

/// Floor base-10 logarithm of a positive integer.
fn int_log10(mut n: u128) -> u32 {
    let mut log = 0;
    while n >= 10 {
        n /= 10;
        log += 1;
    }
    log
}

macro_rules! impl_scalar_int {
    ($($t:ty => $signed:expr),* $(,)?) => {
        $(
            impl Scalar for $t {
                const ZERO: Self = 0;
                const ONE: Self = 1;
                const IS_INTEGER: bool = true;
                const IS_FLOAT: bool = false;
                const IS_SIGNED: bool = $signed;

                #[inline] fn max_value() -> Self { <$t>::MAX }
                #[inline] fn min_value() -> Self { <$t>::MIN }
                #[inline] fn epsilon() -> Self { 1 }
                #[inline] fn nan() -> Self { 0 }
                #[inline] fn infinity() -> Self { <$t>::MAX }
                #[inline] fn negative_infinity() -> Self { <$t>::MIN }

                #[inline] fn is_nan(self) -> bool { false }
                #[inline] fn is_infinity(self) -> bool { self == <$t>::MAX }
                #[inline]
                fn is_negative_infinity(self) -> bool {
                    $signed && self == <$t>::MIN
                }

                #[inline]
                #[allow(unused_comparisons)]
                fn abs(self) -> Self {
                    if self < 0 { (0 as $t).wrapping_sub(self) } else { self }
                }

                #[inline]
                #[allow(unused_comparisons)]
                fn sign(self) -> Self {
                    if !$signed || self > 0 {
                        1
                    } else if self < 0 {
                        (0 as $t).wrapping_sub(1)
                    } else {
                        0
                    }
                }

                #[inline] fn floor(self) -> Self { self }
                #[inline] fn ceiling(self) -> Self { self }
                #[inline] fn round(self) -> Self { self }

                #[inline]
                #[allow(unused_comparisons)]
                fn sqrt(self) -> Self {
                    if self < 0 {
                        return Self::nan();
                    }
                    newton_isqrt(self as u128) as $t
                }

                #[allow(unused_comparisons)]
                fn pow(self, exponent: Self) -> Self {
                    if exponent < 0 {
                        // Only |base| == 1 survives a negative power.
                        return match self {
                            1 => 1,
                            _ if $signed && self == (0 as $t).wrapping_sub(1) => {
                                if exponent % 2 == 0 { 1 } else { self }
                            }
                            _ => 0,
                        };
                    }
                    let exp = u32::try_from(exponent).unwrap_or(u32::MAX);
                    match self.checked_pow(exp) {
                        Some(value) => value,
                        None if self < 0 && exp % 2 == 1 => Self::negative_infinity(),
                        None => Self::infinity(),
                    }
                }

                #[inline]
                #[allow(unused_comparisons)]
                fn ln(self) -> Self {
                    if self <= 0 {
                        return Self::negative_infinity();
                    }
                    libm::log(self as f64) as $t
                }

                #[inline]
                #[allow(unused_comparisons)]
                fn log10(self) -> Self {
                    if self <= 0 {
                        return Self::negative_infinity();
                    }
                    int_log10(self as u128) as $t
                }

                #[inline] fn from_f64(value: f64) -> Self { value as $t }
                #[inline] fn to_f64(self) -> f64 { self as f64 }

                #[inline] fn checked_add(self, rhs: Self) -> Option<Self> { <$t>::checked_add(self, rhs) }
                #[inline] fn checked_sub(self, rhs: Self) -> Option<Self> { <$t>::checked_sub(self, rhs) }
                #[inline] fn checked_mul(self, rhs: Self) -> Option<Self> { <$t>::checked_mul(self, rhs) }
                #[inline] fn checked_div(self, rhs: Self) -> Option<Self> { <$t>::checked_div(self, rhs) }
            }
        )*
    };
}

impl_scalar_int! {
    i8 => true, i16 => true, i32 => true, i64 => true, isize => true,
    u8 => false, u16 => false, u32 => false, u64 => false, usize => false,
}

macro_rules! impl_scalar_float {
    ($t:ident, $consts:ident, {
        abs: $abs:path, floor: $floor:path, ceil: $ceil:path, sqrt: $sqrt:path,
        pow: $pow:path, ln: $ln:path, log10: $log10:path, exp: $exp:path,
        sin: $sin:path, cos: $cos:path, tan: $tan:path, acos: $acos:path,
        atan2: $atan2:path $(,)?
    }) => {
        impl Scalar for $t {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const IS_INTEGER: bool = false;
            const IS_FLOAT: bool = true;
            const IS_SIGNED: bool = true;

            #[inline] fn max_value() -> Self { $t::MAX }
            #[inline] fn min_value() -> Self { -$t::MAX }
            #[inline] fn epsilon() -> Self { $t::EPSILON }
            #[inline] fn nan() -> Self { $t::NAN }
            #[inline] fn infinity() -> Self { $t::INFINITY }
            #[inline] fn negative_infinity() -> Self { $t::NEG_INFINITY }

            #[inline] fn is_nan(self) -> bool { <$t>::is_nan(self) }
            #[inline] fn is_infinity(self) -> bool { self == $t::INFINITY }
            #[inline] fn is_negative_infinity(self) -> bool { self == $t::NEG_INFINITY }

            #[inline] fn abs(self) -> Self { $abs(self) }

            #[inline]
            fn sign(self) -> Self {
                if self > 0.0 {
                    1.0
                } else if self < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }

            #[inline] fn floor(self) -> Self { $floor(self) }
            #[inline] fn ceiling(self) -> Self { $ceil(self) }
            #[inline] fn round(self) -> Self { $floor(self + 0.5) }
            #[inline] fn sqrt(self) -> Self { $sqrt(self) }
            #[inline] fn pow(self, exponent: Self) -> Self { $pow(self, exponent) }
            #[inline] fn ln(self) -> Self { $ln(self) }
            #[inline] fn log10(self) -> Self { $log10(self) }

            #[inline] fn from_f64(value: f64) -> Self { value as $t }
            #[inline] fn to_f64(self) -> f64 { self as f64 }

            #[inline] fn checked_add(self, rhs: Self) -> Option<Self> { Some(self + rhs) }
            #[inline] fn checked_sub(self, rhs: Self) -> Option<Self> { Some(self - rhs) }
            #[inline] fn checked_mul(self, rhs: Self) -> Option<Self> { Some(self * rhs) }
            #[inline] fn checked_div(self, rhs: Self) -> Option<Self> { Some(self / rhs) }
        }

        impl Float for $t {
            const PI: Self = core::$consts::consts::PI;
            const E: Self = core::$consts::consts::E;

            #[inline] fn exp(self) -> Self { $exp(self) }
            #[inline] fn sin(self) -> Self { $sin(self) }
            #[inline] fn cos(self) -> Self { $cos(self) }
            #[inline] fn tan(self) -> Self { $tan(self) }
            #[inline] fn acos(self) -> Self { $acos(self) }
            #[inline] fn atan2(self, x: Self) -> Self { $atan2(self, x) }
        }
    };
}

impl_scalar_float!(f32, f32, {
    abs: libm::fabsf, floor: libm::floorf, ceil: libm::ceilf, sqrt: libm::sqrtf,
    pow: libm::powf, ln: libm::logf, log10: libm::log10f, exp: libm::expf,
    sin: libm::sinf, cos: libm::cosf, tan: libm::tanf, acos: libm::acosf,
    atan2: libm::atan2f,
});

impl_scalar_float!(f64, f64, {
    abs: libm::fabs, floor: libm::floor, ceil: libm::ceil, sqrt: libm::sqrt,
    pow: libm::pow, ln: libm::log, log10: libm::log10, exp: libm::exp,
    sin: libm::sin, cos: libm::cos, tan: libm::tan, acos: libm::acos,
    atan2: libm::atan2,
});

// ============================================================================
// Free functions
// ============================================================================

#[inline]
pub fn pi<T: Float>() -> T {
    T::PI
}

#[inline]
pub fn e<T: Float>() -> T {
    T::E
}

#[inline]
pub fn epsilon<T: Scalar>() -> T {
    T::epsilon()
}

#[inline]
pub fn nan<T: Scalar>() -> T {
    T::nan()
}

#[inline]
pub fn infinity<T: Scalar>() -> T {
    T::infinity()
}

#[inline]
pub fn negative_infinity<T: Scalar>() -> T {
    T::negative_infinity()
}

#[inline]
pub fn max_value<T: Scalar>() -> T {
    T::max_value()
}

#[inline]
pub fn min_value<T: Scalar>() -> T {
    T::min_value()
}

#[inline]
pub fn is_integer<T: Scalar>() -> bool {
    T::IS_INTEGER
}

#[inline]
pub fn is_floating_point<T: Scalar>() -> bool {
    T::IS_FLOAT
}

#[inline]
pub fn abs<T: Scalar>(value: T) -> T {
    value.abs()
}

#[inline]
pub fn sign<T: Scalar>(value: T) -> T {
    value.sign()
}

/// Exact for integers; floats compare within machine epsilon.
#[inline]
pub fn equals<T: Scalar>(a: T, b: T) -> bool {
    if T::IS_FLOAT {
        abs(a - b) < T::epsilon()
    } else {
        a == b
    }
}

#[inline]
pub fn fuzzy_equals<T: Scalar>(a: T, b: T, tolerance: T) -> bool {
    let (high, low) = if a > b { (a, b) } else { (b, a) };
    // A gap too wide for the type is never within tolerance.
    high.checked_sub(low).map_or(false, |gap| gap < tolerance)
}

#[inline]
pub fn is_zero<T: Scalar>(value: T) -> bool {
    if T::IS_FLOAT {
        abs(value) < T::epsilon()
    } else {
        value == T::ZERO
    }
}

/// Midpoint of `a` and `b`; integers truncate toward zero and never overflow.
pub fn average<T: Scalar>(a: T, b: T) -> T {
    let two = T::ONE + T::ONE;
    match a.checked_add(b) {
        Some(sum) => sum / two,
        // Only same-sign integers overflow, where halving first rounds alike.
        None => {
            let (half_a, half_b) = (a / two, b / two);
            half_a + half_b + ((a - half_a * two) + (b - half_b * two)) / two
        }
    }
}

#[inline]
pub fn max<T: Scalar>(a: T, b: T) -> T {
    if a > b {
        a
    } else {
        b
    }
}

#[inline]
pub fn min<T: Scalar>(a: T, b: T) -> T {
    if a < b {
        a
    } else {
        b
    }
}

#[inline]
pub fn clamp<T: Scalar>(value: T, lo: T, hi: T) -> T {
    min(max(value, lo), hi)
}

#[inline]
pub fn floor<T: Scalar>(value: T) -> T {
    value.floor()
}

#[inline]
pub fn ceiling<T: Scalar>(value: T) -> T {
    value.ceiling()
}

#[inline]
pub fn round<T: Scalar>(value: T) -> T {
    value.round()
}

#[inline]
pub fn sqrt<T: Scalar>(value: T) -> T {
    value.sqrt()
}

#[inline]
pub fn pow<T: Scalar>(base: T, exponent: T) -> T {
    base.pow(exponent)
}

/// Integer squares saturate at the infinity sentinel.
#[inline]
pub fn square<T: Scalar>(value: T) -> T {
    saturating_product(value, value)
}

/// `a * b`, or the infinity sentinel of the product's sign on overflow.
fn saturating_product<T: Scalar>(a: T, b: T) -> T {
    a.checked_mul(b).unwrap_or_else(|| {
        if (a < T::ZERO) != (b < T::ZERO) {
            T::negative_infinity()
        } else {
            T::infinity()
        }
    })
}

#[inline]
pub fn ln<T: Scalar>(value: T) -> T {
    value.ln()
}

#[inline]
pub fn log10<T: Scalar>(value: T) -> T {
    value.log10()
}

/// Logarithm in an arbitrary base. A base of one yields zero.
pub fn log<T: Scalar>(value: T, base: T) -> T {
    if base == T::ONE {
        return T::ZERO;
    }
    if value <= T::ZERO {
        return T::negative_infinity();
    }
    T::from_f64(libm::log(value.to_f64()) / libm::log(base.to_f64()))
}

/// `floor(number / base) * base`. Integer quotients floor as well, so for a
/// positive base this is the largest multiple not greater than `number`.
///
/// A zero base returns `number`; a product past the type's range saturates.
#[inline]
pub fn previous_multiple<T: Scalar>(number: T, base: T) -> T {
    multiple(number, base, false)
}

/// `ceiling(number / base) * base`, with the same edge rules as
/// [`previous_multiple`].
#[inline]
pub fn next_multiple<T: Scalar>(number: T, base: T) -> T {
    multiple(number, base, true)
}

fn multiple<T: Scalar>(number: T, base: T, up: bool) -> T {
    if base == T::ZERO {
        return number;
    }
    // Only MIN / -1 has no quotient, and every value is a multiple of -1.
    let Some(quotient) = number.checked_div(base) else {
        return number;
    };
    let quotient = if T::IS_FLOAT {
        if up {
            ceiling(quotient)
        } else {
            floor(quotient)
        }
    } else {
        // Integer division truncated toward zero; step to the rounded side.
        let inexact = quotient.checked_mul(base) != Some(number);
        let negative = (number < T::ZERO) != (base < T::ZERO);
        match (inexact, negative, up) {
            (true, true, false) => quotient - T::ONE,
            (true, false, true) => quotient + T::ONE,
            _ => quotient,
        }
    };
    saturating_product(quotient, base)
}

/// Smallest power of two not less than `number`, saturating at the
/// infinity sentinel.
pub fn next_power_of_two<T: Scalar>(number: T) -> T {
    if !number.is_finite() {
        return number;
    }
    let two = T::ONE + T::ONE;
    let limit = T::max_value() / two;
    let mut power = T::ONE;
    while power < number {
        if power > limit {
            return T::infinity();
        }
        power = power * two;
    }
    power
}

#[inline]
pub fn radians_to_degrees<T: Scalar>(radians: T) -> T {
    T::from_f64(radians.to_f64() * RADIANS_TO_DEGREES)
}

#[inline]
pub fn degrees_to_radians<T: Scalar>(degrees: T) -> T {
    T::from_f64(degrees.to_f64() * DEGREES_TO_RADIANS)
}
