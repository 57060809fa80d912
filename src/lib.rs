//! SIMD geometry kernel for acoustic ray tracing.
//!
//! The crate is layered bottom-up:
//!
//! - [`scalar`]: single-value numeric primitives with sentinel semantics;
//! - [`backend`]: the width-4 lane contracts and their portable, SSE2 and
//!   NEON implementations;
//! - [`lanes`]: the backend this build uses, and [`lanes::SimdScalar`] for
//!   arbitrary widths via [`wide::Wide`];
//! - [`vector`] and [`batch`]: four 3D vectors, boxes, rays or triangles
//!   packed lane-wise;
//! - [`intersect`]: packet ray/box and ray/triangle tests built on the above;
//! - [`geometry`]: the scalar reference types every batch is built from and
//!   checked against.
//!
//! ```
//! use raysound_math::geometry::{Ray3, Vector3};
//! use raysound_math::intersect::{closest_hit, ray_triangles, DEFAULT_TRIANGLE_EPSILON};
//! use raysound_math::lanes::F32x4;
//! use raysound_math::{SimdRay3, SimdTriangle3};
//!
//! let tri = |x: f32| [Vector3::new(x, 0.0, 0.0), Vector3::new(x + 1.0, 0.0, 0.0), Vector3::new(x, 1.0, 0.0)];
//! let triangles = SimdTriangle3::<F32x4>::transpose(&[tri(0.0), tri(2.0), tri(4.0), tri(6.0)]);
//! let ray = Ray3::new(Vector3::new(2.25, 0.25, 1.0), Vector3::new(0.0, 0.0, -1.0));
//! let hits = ray_triangles(&SimdRay3::splat(&ray), &triangles, DEFAULT_TRIANGLE_EPSILON);
//! assert_eq!(closest_hit::<F32x4>(hits.mask, hits.t), Some((1, 1.0)));
//! ```
//!
//! Without the default `std` feature the crate is `no_std`; only [`config`]
//! and the `lane-check` binary need the standard library.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod backend;
pub mod batch;
pub mod geometry;
pub mod intersect;
pub mod lanes;
pub mod scalar;
pub mod vector;
pub mod wide;

#[cfg(feature = "std")]
pub mod config;

pub use batch::{FatRay3, FatTriangles3, SimdAabb3, SimdRay3, SimdTriangle3};
pub use lanes::{Active, SimdScalar};
pub use vector::{cross, dot, SimdVector3};
pub use wide::Wide;
