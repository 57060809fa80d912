use crate::scalar::{self, Scalar};
use core::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};
use serde::{Deserialize, Serialize};

/// A 3-component vector.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T> Vector3<T> {
    #[inline]
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }
}

impl<T: Copy> Vector3<T> {
    #[inline]
    pub fn splat(value: T) -> Self {
        Self::new(value, value, value)
    }

    #[inline]
    pub fn from_array([x, y, z]: [T; 3]) -> Self {
        Self::new(x, y, z)
    }

    #[inline]
    pub fn to_array(self) -> [T; 3] {
        [self.x, self.y, self.z]
    }
}

impl<T: Scalar> Vector3<T> {
    pub const ZERO: Self = Self::new(T::ZERO, T::ZERO, T::ZERO);

    #[inline]
    pub fn dot(self, rhs: Self) -> T {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline]
    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    #[inline]
    pub fn magnitude_squared(self) -> T {
        self.dot(self)
    }

    #[inline]
    pub fn magnitude(self) -> T {
        self.magnitude_squared().sqrt()
    }

    /// Unit vector in the same direction. A zero vector stays zero instead of
    /// turning into NaN.
    pub fn normalize(self) -> Self {
        let magnitude = self.magnitude();
        if magnitude == T::ZERO {
            Self::ZERO
        } else {
            self / magnitude
        }
    }

    /// Projection of `self` onto `axis`.
    pub fn project_on(self, axis: Self) -> Self {
        let length_squared = axis.magnitude_squared();
        if length_squared == T::ZERO {
            return Self::ZERO;
        }
        axis * (self.dot(axis) / length_squared)
    }

    /// Projection onto an axis already known to be unit length.
    #[inline]
    pub fn project_on_normalized(self, axis: Self) -> Self {
        axis * self.dot(axis)
    }

    #[inline]
    pub fn distance_to(self, other: Self) -> T {
        (other - self).magnitude()
    }

    #[inline]
    pub fn distance_to_squared(self, other: Self) -> T {
        (other - self).magnitude_squared()
    }

    #[inline]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new(
            scalar::average(self.x, other.x),
            scalar::average(self.y, other.y),
            scalar::average(self.z, other.z),
        )
    }

    #[inline]
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Component-wise minimum.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        Self::new(
            scalar::min(self.x, other.x),
            scalar::min(self.y, other.y),
            scalar::min(self.z, other.z),
        )
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        Self::new(
            scalar::max(self.x, other.x),
            scalar::max(self.y, other.y),
            scalar::max(self.z, other.z),
        )
    }

    /// Component-wise product.
    #[inline]
    pub fn component_mul(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }

    #[inline]
    pub fn component_div(self, other: Self) -> Self {
        Self::new(self.x / other.x, self.y / other.y, self.z / other.z)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl<T> Index<usize> for Vector3<T> {
    type Output = T;

    fn index(&self, axis: usize) -> &T {
        match axis {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("axis {axis} out of range for Vector3"),
        }
    }
}

impl<T> IndexMut<usize> for Vector3<T> {
    fn index_mut(&mut self, axis: usize) -> &mut T {
        match axis {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("axis {axis} out of range for Vector3"),
        }
    }
}

impl<T: Scalar> Add for Vector3<T> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl<T: Scalar> Sub for Vector3<T> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl<T: Scalar> Add<T> for Vector3<T> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: T) -> Self {
        Self::new(self.x + rhs, self.y + rhs, self.z + rhs)
    }
}

impl<T: Scalar> Sub<T> for Vector3<T> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: T) -> Self {
        Self::new(self.x - rhs, self.y - rhs, self.z - rhs)
    }
}

impl<T: Scalar> Mul<T> for Vector3<T> {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: T) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl<T: Scalar> Div<T> for Vector3<T> {
    type Output = Self;
    #[inline]
    fn div(self, rhs: T) -> Self {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl<T: Scalar + Neg<Output = T>> Neg for Vector3<T> {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

macro_rules! impl_vector_assign {
    ($($assign:ident :: $method:ident => $op:tt ; $rhs:ty),* $(,)?) => {
        $(
            impl<T: Scalar> $assign<$rhs> for Vector3<T> {
                #[inline]
                fn $method(&mut self, rhs: $rhs) {
                    *self = *self $op rhs;
                }
            }
        )*
    };
}

impl_vector_assign!(
    AddAssign::add_assign => + ; Vector3<T>,
    SubAssign::sub_assign => - ; Vector3<T>,
    AddAssign::add_assign => + ; T,
    SubAssign::sub_assign => - ; T,
    MulAssign::mul_assign => * ; T,
    DivAssign::div_assign => / ; T,
);

// Scalar on the left.
macro_rules! impl_scalar_times_vector {
    ($($t:ty),*) => {
        $(
            impl Mul<Vector3<$t>> for $t {
                type Output = Vector3<$t>;
                #[inline]
                fn mul(self, rhs: Vector3<$t>) -> Vector3<$t> {
                    rhs * self
                }
            }
        )*
    };
}

impl_scalar_times_vector!(f32, f64, i32, i64);

/// Free-function form of [`Vector3::dot`].
#[inline]
pub fn dot<T: Scalar>(a: Vector3<T>, b: Vector3<T>) -> T {
    a.dot(b)
}

/// Free-function form of [`Vector3::cross`].
#[inline]
pub fn cross<T: Scalar>(a: Vector3<T>, b: Vector3<T>) -> Vector3<T> {
    a.cross(b)
}
