//! The lane types this build uses.
//!
//! The hardware backend is fixed at compile time: SSE2 on x86_64, NEON on
//! aarch64, and the portable backend everywhere else or when the `portable`
//! feature is enabled. Nothing is dispatched at runtime.

pub use crate::backend::{shuffle_mask, Backend, Lane4, LaneBits, SimdF32, SimdI32, SimdMask, SimdNum, LANES};

#[cfg(all(target_arch = "x86_64", not(feature = "portable")))]
pub use crate::backend::x86::{F32x4, I32x4, Mask4, Sse2 as Active};

#[cfg(all(target_arch = "aarch64", not(feature = "portable")))]
pub use crate::backend::arm::{F32x4, I32x4, Mask4, Neon as Active};

#[cfg(any(
    feature = "portable",
    not(any(target_arch = "x86_64", target_arch = "aarch64"))
))]
pub use crate::backend::portable::{F32x4, I32x4, Mask4, Portable as Active};

use crate::wide::Wide;

/// Maps a lane element type to the width-4 unit that stores it.
pub trait Element: Copy {
    type Unit: Lane4<Elem = Self>;
}

impl Element for f32 {
    type Unit = F32x4;
}

impl Element for i32 {
    type Unit = I32x4;
}

impl Element for bool {
    type Unit = Mask4;
}

/// `N` lanes of `T`, stored as `U = ceil(N / 4)` hardware units.
///
/// `SimdScalar<f32, 4, 1>` is a single register; `SimdScalar<f32, 7, 2>`
/// spans two with one padding lane.
pub type SimdScalar<T, const N: usize, const U: usize> = Wide<<T as Element>::Unit, N, U>;

/// Name of the backend compiled into this build.
pub fn backend_name() -> &'static str {
    <Active as Backend>::NAME
}

/// Logs and returns the compiled backend together with the optional x86
/// extensions the build enabled.
pub fn describe_backend() -> &'static str {
    let name = backend_name();
    log::debug!(
        "lane backend: {} (sse3: {}, ssse3: {}, sse4.1: {})",
        name,
        cfg!(target_feature = "sse3"),
        cfg!(target_feature = "ssse3"),
        cfg!(target_feature = "sse4.1"),
    );
    name
}
