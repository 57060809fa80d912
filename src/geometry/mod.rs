//! Scalar reference geometry.
//!
//! One value per type, no batching. The SIMD batches in [`crate::batch`] are
//! built from these types and must agree with them lane for lane.

mod aabb;
mod complex;
mod matrix3;
mod plane3;
mod ray3;
mod transform3;
mod vector2;
mod vector3;

pub use aabb::{Aabb1, Aabb3};
pub use complex::Complex;
pub use matrix3::Matrix3;
pub use plane3::Plane3;
pub use ray3::Ray3;
pub use transform3::Transform3;
pub use vector2::Vector2;
pub use vector3::{cross, dot, Vector3};
