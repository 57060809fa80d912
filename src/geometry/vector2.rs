use super::Vector3;
use crate::scalar::{self, Scalar};
use core::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};
use serde::{Deserialize, Serialize};

/// A 2-component vector, e.g. a point in a plane's local basis.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2<T> {
    pub x: T,
    pub y: T,
}

impl<T> Vector2<T> {
    #[inline]
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: Copy> Vector2<T> {
    #[inline]
    pub fn splat(value: T) -> Self {
        Self::new(value, value)
    }

    #[inline]
    pub fn from_array([x, y]: [T; 2]) -> Self {
        Self::new(x, y)
    }

    #[inline]
    pub fn to_array(self) -> [T; 2] {
        [self.x, self.y]
    }

    /// Lifts into 3D with the given `z`.
    #[inline]
    pub fn extend(self, z: T) -> Vector3<T> {
        Vector3::new(self.x, self.y, z)
    }
}

impl<T: Scalar> Vector2<T> {
    pub const ZERO: Self = Self::new(T::ZERO, T::ZERO);

    #[inline]
    pub fn dot(self, rhs: Self) -> T {
        self.x * rhs.x + self.y * rhs.y
    }

    /// The z component of the 3D cross product: positive when `rhs` lies
    /// counter-clockwise of `self`.
    #[inline]
    pub fn cross(self, rhs: Self) -> T {
        self.x * rhs.y - self.y * rhs.x
    }

    #[inline]
    pub fn magnitude_squared(self) -> T {
        self.dot(self)
    }

    #[inline]
    pub fn magnitude(self) -> T {
        self.magnitude_squared().sqrt()
    }

    /// Unit vector in the same direction; zero stays zero.
    pub fn normalize(self) -> Self {
        let magnitude = self.magnitude();
        if magnitude > T::ZERO {
            self / magnitude
        } else {
            Self::ZERO
        }
    }

    pub fn project_on(self, axis: Self) -> Self {
        let length_squared = axis.magnitude_squared();
        if length_squared == T::ZERO {
            return Self::ZERO;
        }
        axis * (self.dot(axis) / length_squared)
    }

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
        Self::new(scalar::average(self.x, other.x), scalar::average(self.y, other.y))
    }

    #[inline]
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs())
    }

    #[inline]
    pub fn min(self, other: Self) -> Self {
        Self::new(scalar::min(self.x, other.x), scalar::min(self.y, other.y))
    }

    #[inline]
    pub fn max(self, other: Self) -> Self {
        Self::new(scalar::max(self.x, other.x), scalar::max(self.y, other.y))
    }

    #[inline]
    pub fn component_mul(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl<T: Scalar + Neg<Output = T>> Vector2<T> {
    /// Rotated a quarter turn counter-clockwise, same length.
    #[inline]
    pub fn perp(self) -> Self {
        Self::new(-self.y, self.x)
    }
}

impl<T> Index<usize> for Vector2<T> {
    type Output = T;

    fn index(&self, axis: usize) -> &T {
        match axis {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("axis {axis} out of range for Vector2"),
        }
    }
}

impl<T> IndexMut<usize> for Vector2<T> {
    fn index_mut(&mut self, axis: usize) -> &mut T {
        match axis {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => panic!("axis {axis} out of range for Vector2"),
        }
    }
}

macro_rules! impl_vector_op {
    ($($op:ident :: $method:ident => $sym:tt),* $(,)?) => {
        $(
            impl<T: Scalar> $op for Vector2<T> {
                type Output = Self;
                #[inline]
                fn $method(self, rhs: Self) -> Self {
                    Self::new(self.x $sym rhs.x, self.y $sym rhs.y)
                }
            }

            impl<T: Scalar> $op<T> for Vector2<T> {
                type Output = Self;
                #[inline]
                fn $method(self, rhs: T) -> Self {
                    Self::new(self.x $sym rhs, self.y $sym rhs)
                }
            }
        )*
    };
}

impl_vector_op!(Add::add => +, Sub::sub => -);

impl<T: Scalar> Mul<T> for Vector2<T> {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: T) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl<T: Scalar> Div<T> for Vector2<T> {
    type Output = Self;
    #[inline]
    fn div(self, rhs: T) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl<T: Scalar + Neg<Output = T>> Neg for Vector2<T> {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

macro_rules! impl_vector_assign {
    ($($assign:ident :: $method:ident => $op:tt ; $rhs:ty),* $(,)?) => {
        $(
            impl<T: Scalar> $assign<$rhs> for Vector2<T> {
                #[inline]
                fn $method(&mut self, rhs: $rhs) {
                    *self = *self $op rhs;
                }
            }
        )*
    };
}

impl_vector_assign!(
    AddAssign::add_assign => + ; Vector2<T>,
    SubAssign::sub_assign => - ; Vector2<T>,
    AddAssign::add_assign => + ; T,
    SubAssign::sub_assign => - ; T,
    MulAssign::mul_assign => * ; T,
    DivAssign::div_assign => / ; T,
);

macro_rules! impl_scalar_times_vector {
    ($($t:ty),*) => {
        $(
            impl Mul<Vector2<$t>> for $t {
                type Output = Vector2<$t>;
                #[inline]
                fn mul(self, rhs: Vector2<$t>) -> Vector2<$t> {
                    rhs * self
                }
            }
        )*
    };
}

impl_scalar_times_vector!(f32, f64, i32, i64);
