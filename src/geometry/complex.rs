use crate::scalar::Scalar;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use serde::{Deserialize, Serialize};

/// A complex number with real part `r` and imaginary part `i`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Complex<T> {
    pub r: T,
    pub i: T,
}

impl<T: Scalar> Complex<T> {
    #[inline]
    pub fn new(r: T, i: T) -> Self {
        Self { r, i }
    }

    #[inline]
    pub fn conjugate(self) -> Self {
        Self::new(self.r, T::ZERO - self.i)
    }

    #[inline]
    pub fn magnitude_squared(self) -> T {
        self.r * self.r + self.i * self.i
    }

    #[inline]
    pub fn magnitude(self) -> T {
        self.magnitude_squared().sqrt()
    }

    /// Same as [`Complex::magnitude`].
    #[inline]
    pub fn abs(self) -> T {
        self.magnitude()
    }
}

impl<T: Scalar> Add for Complex<T> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.r + rhs.r, self.i + rhs.i)
    }
}

impl<T: Scalar> Sub for Complex<T> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.r - rhs.r, self.i - rhs.i)
    }
}

impl<T: Scalar> Mul for Complex<T> {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.r * rhs.r - self.i * rhs.i, self.r * rhs.i + self.i * rhs.r)
    }
}

impl<T: Scalar> Div for Complex<T> {
    type Output = Self;

    /// `a / b == a * conj(b) / |b|^2`.
    #[inline]
    fn div(self, rhs: Self) -> Self {
        let numerator = self * rhs.conjugate();
        numerator / rhs.magnitude_squared()
    }
}

impl<T: Scalar> Add<T> for Complex<T> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: T) -> Self {
        Self::new(self.r + rhs, self.i)
    }
}

impl<T: Scalar> Sub<T> for Complex<T> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: T) -> Self {
        Self::new(self.r - rhs, self.i)
    }
}

impl<T: Scalar> Mul<T> for Complex<T> {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: T) -> Self {
        Self::new(self.r * rhs, self.i * rhs)
    }
}

impl<T: Scalar> Div<T> for Complex<T> {
    type Output = Self;
    #[inline]
    fn div(self, rhs: T) -> Self {
        Self::new(self.r / rhs, self.i / rhs)
    }
}

impl<T: Scalar + Neg<Output = T>> Neg for Complex<T> {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.r, -self.i)
    }
}

macro_rules! impl_complex_assign {
    ($($assign:ident :: $method:ident => $op:tt ; $rhs:ty),* $(,)?) => {
        $(
            impl<T: Scalar> $assign<$rhs> for Complex<T> {
                #[inline]
                fn $method(&mut self, rhs: $rhs) {
                    *self = *self $op rhs;
                }
            }
        )*
    };
}

impl_complex_assign!(
    AddAssign::add_assign => + ; Complex<T>,
    SubAssign::sub_assign => - ; Complex<T>,
    MulAssign::mul_assign => * ; Complex<T>,
    DivAssign::div_assign => / ; Complex<T>,
    AddAssign::add_assign => + ; T,
    SubAssign::sub_assign => - ; T,
    MulAssign::mul_assign => * ; T,
    DivAssign::div_assign => / ; T,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplication_and_division_invert() {
        let a = Complex::new(3.0f64, 4.0);
        let b = Complex::new(1.0, -2.0);
        assert_eq!(a * b, Complex::new(11.0, -2.0));
        assert_eq!((a * b) / b, a);
        assert_eq!(a / Complex::new(0.0, 1.0), Complex::new(4.0, -3.0));
        assert_eq!(a.magnitude(), 5.0);
        assert_eq!(a.conjugate(), Complex::new(3.0, -4.0));
    }

    #[test]
    fn real_scalars_touch_the_real_part_only_for_add() {
        let mut a = Complex::new(1.0f32, 1.0);
        a += 2.0;
        assert_eq!(a, Complex::new(3.0, 1.0));
        a *= 2.0;
        assert_eq!(a, Complex::new(6.0, 2.0));
        assert_eq!(-a, Complex::new(-6.0, -2.0));
    }
}
