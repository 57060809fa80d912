use super::Vector3;
use crate::scalar::{self, Float, Scalar};
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use serde::{Deserialize, Serialize};

/// A 3x3 matrix stored as three column vectors.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Matrix3<T> {
    /// First column.
    pub x: Vector3<T>,
    /// Second column.
    pub y: Vector3<T>,
    /// Third column.
    pub z: Vector3<T>,
}

impl<T: Scalar> Matrix3<T> {
    pub const ZERO: Self = Self::from_columns(Vector3::ZERO, Vector3::ZERO, Vector3::ZERO);

    pub const IDENTITY: Self = Self::from_columns(
        Vector3::new(T::ONE, T::ZERO, T::ZERO),
        Vector3::new(T::ZERO, T::ONE, T::ZERO),
        Vector3::new(T::ZERO, T::ZERO, T::ONE),
    );

    /// Builds a matrix from its entries in row-major reading order.
    #[allow(clippy::too_many_arguments)]
    #[inline]
    pub const fn new(a: T, b: T, c: T, d: T, e: T, f: T, g: T, h: T, i: T) -> Self {
        Self::from_columns(Vector3::new(a, d, g), Vector3::new(b, e, h), Vector3::new(c, f, i))
    }

    #[inline]
    pub const fn from_columns(x: Vector3<T>, y: Vector3<T>, z: Vector3<T>) -> Self {
        Self { x, y, z }
    }

    /// Builds a matrix from nine entries in column-major order.
    #[inline]
    pub fn from_array(values: [T; 9]) -> Self {
        Self::from_columns(
            Vector3::new(values[0], values[1], values[2]),
            Vector3::new(values[3], values[4], values[5]),
            Vector3::new(values[6], values[7], values[8]),
        )
    }

    /// Entries in column-major order.
    pub fn to_array(self) -> [T; 9] {
        [
            self.x.x, self.x.y, self.x.z, self.y.x, self.y.y, self.y.z, self.z.x, self.z.y,
            self.z.z,
        ]
    }

    /// The matrix `S` with `S * u == v.cross(u)` for every `u`.
    pub fn skew_symmetric(v: Vector3<T>) -> Self {
        let zero = T::ZERO;
        Self::new(zero, zero - v.z, v.y, v.z, zero, zero - v.x, zero - v.y, v.x, zero)
    }

    #[inline]
    pub fn column(&self, index: usize) -> Vector3<T> {
        match index {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            _ => panic!("column {index} out of range for Matrix3"),
        }
    }

    #[inline]
    pub fn row(&self, index: usize) -> Vector3<T> {
        Vector3::new(self.x[index], self.y[index], self.z[index])
    }

    /// Entry at `column`, `row`.
    #[inline]
    pub fn get(&self, column: usize, row: usize) -> T {
        self.column(column)[row]
    }

    pub fn set(&mut self, column: usize, row: usize, value: T) {
        self.column_mut(column)[row] = value;
    }

    pub fn set_column(&mut self, index: usize, column: Vector3<T>) {
        *self.column_mut(index) = column;
    }

    pub fn set_row(&mut self, index: usize, row: Vector3<T>) {
        self.x[index] = row.x;
        self.y[index] = row.y;
        self.z[index] = row.z;
    }

    fn column_mut(&mut self, index: usize) -> &mut Vector3<T> {
        match index {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("column {index} out of range for Matrix3"),
        }
    }

    #[inline]
    pub fn diagonal(&self) -> Vector3<T> {
        Vector3::new(self.x.x, self.y.y, self.z.z)
    }

    /// Scalar triple product of the columns.
    #[inline]
    pub fn determinant(&self) -> T {
        self.x.dot(self.y.cross(self.z))
    }

    /// The inverse, or [`Matrix3::ZERO`] when the matrix is singular.
    pub fn invert(&self) -> Self {
        let determinant = self.determinant();
        if determinant == T::ZERO {
            return Self::ZERO;
        }
        let inverse = T::ONE / determinant;
        // Rows of the inverse are the pairwise cross products of the columns.
        Self::from_rows(
            self.y.cross(self.z) * inverse,
            self.z.cross(self.x) * inverse,
            self.x.cross(self.y) * inverse,
        )
    }

    #[inline]
    pub fn from_rows(r0: Vector3<T>, r1: Vector3<T>, r2: Vector3<T>) -> Self {
        Self::new(r0.x, r0.y, r0.z, r1.x, r1.y, r1.z, r2.x, r2.y, r2.z)
    }

    #[inline]
    pub fn transpose(&self) -> Self {
        Self::from_rows(self.x, self.y, self.z)
    }

    /// Unit-length, mutually perpendicular columns. The first column keeps its
    /// direction and the second stays in the plane of the first two.
    pub fn orthonormalize(&self) -> Self {
        let x = self.x.normalize();
        let z = x.cross(self.y).normalize();
        Self::from_columns(x, z.cross(x).normalize(), z)
    }

    #[inline]
    pub fn abs(&self) -> Self {
        Self::from_columns(self.x.abs(), self.y.abs(), self.z.abs())
    }
}

impl<T: Float> Matrix3<T> {
    /// Orthonormal frame whose third column is `normal`.
    ///
    /// The first tangent is built against the smallest component of the
    /// normal so it never degenerates.
    pub fn plane_basis(normal: Vector3<T>) -> Self {
        let n = normal.abs();
        let zero = T::ZERO;
        let binormal = if n.x <= n.y && n.x <= n.z {
            Vector3::new(zero, -normal.z, normal.y)
        } else if n.y <= n.x && n.y <= n.z {
            Vector3::new(-normal.z, zero, normal.x)
        } else {
            Vector3::new(-normal.y, normal.x, zero)
        }
        .normalize();
        Self::from_columns(binormal.cross(normal), binormal, normal)
    }

    pub fn rotation_x(angle: T) -> Self {
        let (sin, cos) = (angle.sin(), angle.cos());
        let (zero, one) = (T::ZERO, T::ONE);
        Self::new(one, zero, zero, zero, cos, sin, zero, -sin, cos)
    }

    pub fn rotation_y(angle: T) -> Self {
        let (sin, cos) = (angle.sin(), angle.cos());
        let (zero, one) = (T::ZERO, T::ONE);
        Self::new(cos, zero, -sin, zero, one, zero, sin, zero, cos)
    }

    pub fn rotation_z(angle: T) -> Self {
        let (sin, cos) = (angle.sin(), angle.cos());
        let (zero, one) = (T::ZERO, T::ONE);
        Self::new(cos, sin, zero, -sin, cos, zero, zero, zero, one)
    }

    #[inline]
    pub fn rotation_x_degrees(angle: T) -> Self {
        Self::rotation_x(scalar::degrees_to_radians(angle))
    }

    #[inline]
    pub fn rotation_y_degrees(angle: T) -> Self {
        Self::rotation_y(scalar::degrees_to_radians(angle))
    }

    #[inline]
    pub fn rotation_z_degrees(angle: T) -> Self {
        Self::rotation_z(scalar::degrees_to_radians(angle))
    }
}

impl<T: Scalar> Mul for Matrix3<T> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::from_columns(self * rhs.x, self * rhs.y, self * rhs.z)
    }
}

/// Matrix times column vector.
impl<T: Scalar> Mul<Vector3<T>> for Matrix3<T> {
    type Output = Vector3<T>;

    #[inline]
    fn mul(self, v: Vector3<T>) -> Vector3<T> {
        self.x * v.x + self.y * v.y + self.z * v.z
    }
}

/// Row vector times matrix, i.e. multiplication by the transpose.
impl<T: Scalar> Mul<Matrix3<T>> for Vector3<T> {
    type Output = Vector3<T>;

    #[inline]
    fn mul(self, m: Matrix3<T>) -> Vector3<T> {
        Vector3::new(self.dot(m.x), self.dot(m.y), self.dot(m.z))
    }
}

impl<T: Scalar> Mul<T> for Matrix3<T> {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: T) -> Self {
        Self::from_columns(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl<T: Scalar> Div<T> for Matrix3<T> {
    type Output = Self;
    #[inline]
    fn div(self, rhs: T) -> Self {
        Self::from_columns(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl<T: Scalar> Add for Matrix3<T> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::from_columns(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl<T: Scalar> Sub for Matrix3<T> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::from_columns(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl<T: Scalar + Neg<Output = T>> Neg for Matrix3<T> {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::from_columns(-self.x, -self.y, -self.z)
    }
}

impl<T: Scalar> AddAssign for Matrix3<T> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<T: Scalar> SubAssign for Matrix3<T> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<T: Scalar> MulAssign<T> for Matrix3<T> {
    fn mul_assign(&mut self, rhs: T) {
        *self = *self * rhs;
    }
}

impl<T: Scalar> DivAssign<T> for Matrix3<T> {
    fn div_assign(&mut self, rhs: T) {
        *self = *self / rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Matrix3<f64>, b: Matrix3<f64>) -> bool {
        a.to_array().iter().zip(b.to_array()).all(|(p, q)| (p - q).abs() < 1e-9)
    }

    #[test]
    fn new_reads_rows_and_stores_columns() {
        let m = Matrix3::new(1, 2, 3, 4, 5, 6, 7, 8, 9);
        assert_eq!(m.x, Vector3::new(1, 4, 7));
        assert_eq!(m.row(0), Vector3::new(1, 2, 3));
        assert_eq!(m.get(2, 1), 6);
        assert_eq!(m.transpose().x, Vector3::new(1, 2, 3));
    }

    #[test]
    fn determinant_is_triple_product() {
        let m = Matrix3::new(2.0, 0.0, 1.0, 1.0, 3.0, 2.0, 1.0, 1.0, 1.0);
        // 2(3-2) - 0(1-2) + 1(1-3)
        assert_eq!(m.determinant(), 0.0);
        let m = Matrix3::new(2.0, 0.0, 1.0, 1.0, 3.0, 2.0, 1.0, 1.0, 2.0);
        assert_eq!(m.determinant(), 6.0);
        assert_eq!(Matrix3::<f32>::IDENTITY.determinant(), 1.0);
    }

    #[test]
    fn invert_round_trips_and_singular_is_zero() {
        let m = Matrix3::new(2.0, 0.0, 1.0, 1.0, 3.0, 2.0, 1.0, 1.0, 2.0);
        assert!(close(m * m.invert(), Matrix3::IDENTITY));
        let singular = Matrix3::new(1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 1.0, 1.0);
        assert_eq!(singular.invert(), Matrix3::ZERO);
    }

    #[test]
    fn vector_on_the_left_uses_the_transpose() {
        let m = Matrix3::new(1, 2, 3, 4, 5, 6, 7, 8, 9);
        let v = Vector3::new(1, 0, 0);
        assert_eq!(m * v, Vector3::new(1, 4, 7));
        assert_eq!(v * m, Vector3::new(1, 2, 3));
        assert_eq!(v * m, m.transpose() * v);
    }

    #[test]
    fn skew_symmetric_is_cross_product() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        let u = Vector3::new(-2.0, 0.5, 4.0);
        assert_eq!(Matrix3::skew_symmetric(v) * u, v.cross(u));
    }

    #[test]
    fn rotations_are_orthonormal() {
        let r = Matrix3::rotation_z_degrees(90.0f64);
        assert!(close(r * r.transpose(), Matrix3::IDENTITY));
        let basis = Matrix3::plane_basis(Vector3::new(0.0, 0.0, 1.0f64));
        assert!(close(basis.transpose() * basis, Matrix3::IDENTITY));
        assert_eq!(basis.z, Vector3::new(0.0, 0.0, 1.0));
        let skewed = Matrix3::from_columns(
            Vector3::new(2.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 5.0f64),
        );
        assert!(close(skewed.orthonormalize(), Matrix3::IDENTITY));
    }
}
