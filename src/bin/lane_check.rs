//! Randomized equivalence check of the compiled lane backend.
//!
//! Runs every lane operation on random inputs through the hardware backend,
//! the portable backend and the scalar reference, and reports any lane where
//! they disagree. Inputs come from a seeded generator, so a failing run can be
//! replayed with the same configuration.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin lane-check
//! RAYSOUND_MATH_CONFIG=check.json RUST_LOG=debug cargo run --bin lane-check
//! ```

use anyhow::{bail, ensure, Context, Result};
use log::{error, info, warn};
use raysound_math::backend::portable;
use raysound_math::backend::{Backend, Lane4, SimdF32, SimdI32, SimdMask, SimdNum, LANES};
use raysound_math::config::{LaneCheckConfig, CONFIG};
use raysound_math::geometry::{Aabb3, Ray3, Vector3};
use raysound_math::intersect::{closest_hit, ray_triangles};
use raysound_math::lanes::{self, F32x4, I32x4};
use raysound_math::{SimdAabb3, SimdRay3, SimdTriangle3, SimdVector3, Wide};

/// xorshift64* generator. Deterministic for a given seed.
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        // Zero is a fixed point of xorshift.
        Rng(seed.max(1))
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn next_i32(&mut self) -> i32 {
        (self.next_u64() >> 32) as i32
    }

    /// Uniform in `[-range, range)`.
    fn next_f32(&mut self, range: f32) -> f32 {
        let unit = (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32;
        (unit * 2.0 - 1.0) * range
    }

    fn f32s<const N: usize>(&mut self, range: f32) -> [f32; N] {
        std::array::from_fn(|_| self.next_f32(range))
    }

    fn vector(&mut self) -> Vector3<f32> {
        Vector3::from_array(self.f32s(100.0))
    }
}

fn same(a: f32, b: f32) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

/// `scale` bounds the magnitude of the intermediate terms, so cancellation
/// in a sum does not shrink the allowed error.
fn close(a: f32, b: f32, tolerance: f32, scale: f32) -> bool {
    same(a, b) || (a - b).abs() <= tolerance * scale.max(1.0)
}

fn abs_sum(values: &[f32]) -> f32 {
    values.iter().map(|x| x.abs()).sum()
}

fn mask_bits(lanes: [bool; LANES]) -> u32 {
    lanes.iter().enumerate().fold(0, |bits, (i, &set)| bits | ((set as u32) << i))
}

/// Binary float lane operations against the scalar formula, exact.
fn check_float_lanes<S: SimdF32>(rng: &mut Rng, config: &LaneCheckConfig) -> Result<()> {
    type Binary<S> = (&'static str, fn(S, S) -> S, fn(f32, f32) -> f32);
    let binary: [Binary<S>; 6] = [
        ("add", |a, b| a + b, |a, b| a + b),
        ("sub", |a, b| a - b, |a, b| a - b),
        ("mul", |a, b| a * b, |a, b| a * b),
        ("div", |a, b| a / b, |a, b| a / b),
        ("min", S::min, |a, b| if a < b { a } else { b }),
        ("max", S::max, |a, b| if a > b { a } else { b }),
    ];
    type Unary<S> = (&'static str, fn(S) -> S, fn(f32) -> f32);
    let unary: [Unary<S>; 6] = [
        ("abs", S::abs, f32::abs),
        ("sqrt", |a| a.abs().sqrt(), |a| a.abs().sqrt()),
        ("floor", S::floor, f32::floor),
        ("ceil", S::ceil, f32::ceil),
        ("recip", S::recip, |a| 1.0 / a),
        ("neg", |a| -a, |a| -a),
    ];

    for _ in 0..config.samples {
        let (a, b) = (rng.f32s::<LANES>(1.0e4), rng.f32s::<LANES>(1.0e4));
        let (va, vb) = (S::from_array(a), S::from_array(b));
        for (name, lanes_op, scalar_op) in &binary {
            let got = lanes_op(va, vb).to_array();
            for lane in 0..LANES {
                let want = scalar_op(a[lane], b[lane]);
                ensure!(same(got[lane], want), "{name}({}, {}) lane {lane}: {} != {want}", a[lane], b[lane], got[lane]);
            }
        }
        for (name, lanes_op, scalar_op) in &unary {
            let got = lanes_op(va).to_array();
            for lane in 0..LANES {
                let want = scalar_op(a[lane]);
                ensure!(same(got[lane], want), "{name}({}) lane {lane}: {} != {want}", a[lane], got[lane]);
            }
        }

        let lt = mask_bits(std::array::from_fn(|i| a[i] < b[i]));
        let le = mask_bits(std::array::from_fn(|i| a[i] <= b[i]));
        let eq = mask_bits(std::array::from_fn(|i| a[i] == b[i]));
        ensure!(va.simd_lt(vb).bitmask() == lt, "lt mask for {a:?} {b:?}");
        ensure!(va.simd_le(vb).bitmask() == le, "le mask for {a:?} {b:?}");
        ensure!(va.simd_gt(vb).bitmask() == vb.simd_lt(va).bitmask(), "gt mask for {a:?} {b:?}");
        ensure!(va.simd_eq(vb).bitmask() == eq, "eq mask for {a:?} {b:?}");
        ensure!(va.simd_ne(vb).bitmask() == eq ^ 0xF, "ne mask for {a:?} {b:?}");

        let sum: f32 = a.iter().sum();
        ensure!(close(va.sum(), sum, config.relative_tolerance, abs_sum(&a)), "sum of {a:?}: {} vs {sum}", va.sum());
        let truncated = S::from_array(rng.f32s(1.0e6)).to_int();
        let back = S::from_int(truncated).to_array();
        ensure!(back.iter().all(|x| x.fract() == 0.0), "to_int/from_int left a fraction: {back:?}");
    }
    Ok(())
}

/// Integer lane operations, exact and wrapping.
fn check_int_lanes<S: SimdI32>(rng: &mut Rng, config: &LaneCheckConfig) -> Result<()> {
    type Binary<S> = (&'static str, fn(S, S) -> S, fn(i32, i32) -> i32);
    let binary: [Binary<S>; 8] = [
        ("add", |a, b| a + b, i32::wrapping_add),
        ("sub", |a, b| a - b, i32::wrapping_sub),
        ("mul", |a, b| a * b, i32::wrapping_mul),
        ("div", |a, b| a / b, |a, b| a.checked_div(b).unwrap_or(0)),
        ("and", |a, b| a & b, |a, b| a & b),
        ("or", |a, b| a | b, |a, b| a | b),
        ("xor", |a, b| a ^ b, |a, b| a ^ b),
        ("min", S::min, i32::min),
    ];

    for _ in 0..config.samples {
        let a: [i32; LANES] = std::array::from_fn(|_| rng.next_i32());
        // Small divisors, zero included, so division is exercised.
        let b: [i32; LANES] = std::array::from_fn(|_| rng.next_i32() % 7);
        let (va, vb) = (S::from_array(a), S::from_array(b));
        for (name, lanes_op, scalar_op) in &binary {
            let got = lanes_op(va, vb).to_array();
            for lane in 0..LANES {
                let want = scalar_op(a[lane], b[lane]);
                ensure!(got[lane] == want, "{name}({}, {}) lane {lane}: {} != {want}", a[lane], b[lane], got[lane]);
            }
        }

        let count = (rng.next_u64() % 40) as i32;
        let shl = (va << count).to_array();
        let shr = (va >> count).to_array();
        let sqrt = va.sqrt().to_array();
        for lane in 0..LANES {
            let want_shl = if count >= 32 { 0 } else { a[lane] << count };
            ensure!(shl[lane] == want_shl, "{} << {count}: {} != {want_shl}", a[lane], shl[lane]);
            ensure!(shr[lane] == a[lane] >> count.min(31), "{} >> {count}", a[lane]);
            let want_sqrt = (a[lane].max(0) as f32).sqrt() as i32;
            ensure!(sqrt[lane] == want_sqrt, "sqrt({}): {} != {want_sqrt}", a[lane], sqrt[lane]);
        }
        let wrapped = a.iter().fold(0i32, |acc, &x| acc.wrapping_add(x));
        ensure!(va.sum() == wrapped, "sum of {a:?}");
        ensure!((!va).to_array() == a.map(|x| !x), "not of {a:?}");
    }
    Ok(())
}

/// Select, mask algebra and bitmask round trips for every mask pattern.
fn check_masks<S: SimdF32>(rng: &mut Rng, _config: &LaneCheckConfig) -> Result<()> {
    for bits in 0..16u32 {
        let mask = S::Mask::from_bits(bits);
        ensure!(mask.bitmask() == bits, "from_bits({bits:04b}) round trip");
        ensure!(mask.any() == (bits != 0), "any({bits:04b})");
        ensure!(mask.all() == (bits == 0xF), "all({bits:04b})");
        ensure!((!mask).bitmask() == bits ^ 0xF, "not({bits:04b})");
        for lane in 0..LANES {
            ensure!(mask.get(lane) == (bits & (1 << lane) != 0), "get({lane}) of {bits:04b}");
        }
        for other in 0..16u32 {
            let rhs = S::Mask::from_bits(other);
            ensure!((mask & rhs).bitmask() == bits & other, "and({bits:04b}, {other:04b})");
            ensure!((mask | rhs).bitmask() == bits | other, "or({bits:04b}, {other:04b})");
            ensure!((mask ^ rhs).bitmask() == bits ^ other, "xor({bits:04b}, {other:04b})");
        }

        let (a, b) = (rng.f32s::<LANES>(1.0), rng.f32s::<LANES>(1.0));
        let picked = S::select(mask, S::from_array(a), S::from_array(b)).to_array();
        let ints = S::Int::select(mask, S::Int::splat(1), S::Int::splat(-1)).to_array();
        for lane in 0..LANES {
            let set = bits & (1 << lane) != 0;
            ensure!(picked[lane] == if set { a[lane] } else { b[lane] }, "float select lane {lane} of {bits:04b}");
            ensure!(ints[lane] == if set { 1 } else { -1 }, "int select lane {lane} of {bits:04b}");
        }
        let flags = S::Mask::select(mask, S::Mask::splat(false), S::Mask::splat(true));
        ensure!(flags.bitmask() == bits ^ 0xF, "mask select of {bits:04b}");
    }
    Ok(())
}

/// Per-lane dot and cross products against the scalar reference.
fn check_vectors<S: SimdF32>(rng: &mut Rng, config: &LaneCheckConfig) -> Result<()> {
    for _ in 0..config.samples {
        let a: [Vector3<f32>; LANES] = std::array::from_fn(|_| rng.vector());
        let b: [Vector3<f32>; LANES] = std::array::from_fn(|_| rng.vector());
        let (pa, pb) = (SimdVector3::<S>::transpose(&a), SimdVector3::<S>::transpose(&b));
        ensure!(pa.to_array() == a, "transpose round trip of {a:?}");
        let dots = pa.dot(pb).to_array();
        let crosses = pa.cross(pb).to_array();
        for lane in 0..LANES {
            let (want_dot, want_cross) = (a[lane].dot(b[lane]), a[lane].cross(b[lane]));
            let scale = a[lane].magnitude() * b[lane].magnitude();
            ensure!(close(dots[lane], want_dot, config.relative_tolerance, scale), "dot lane {lane}: {} vs {want_dot}", dots[lane]);
            let got = crosses[lane].to_array();
            for (axis, want) in want_cross.to_array().into_iter().enumerate() {
                ensure!(close(got[axis], want, config.relative_tolerance, scale), "cross lane {lane} axis {axis}: {} vs {want}", got[axis]);
            }
        }
    }
    Ok(())
}

/// Batch transpose and broadcast round trips.
fn check_batches<S: SimdF32>(rng: &mut Rng, config: &LaneCheckConfig) -> Result<()> {
    for _ in 0..config.samples.min(1_000) {
        let boxes: [Aabb3<f32>; LANES] = std::array::from_fn(|_| {
            let (p, q) = (rng.vector(), rng.vector());
            Aabb3::new(p.min(q), p.max(q))
        });
        ensure!(SimdAabb3::<S>::transpose(&boxes).to_array() == boxes, "box transpose round trip");
        ensure!(SimdAabb3::<S>::splat(&boxes[0]).to_array() == [boxes[0]; LANES], "box broadcast");

        let rays: [Ray3<f32>; LANES] = std::array::from_fn(|_| Ray3::new(rng.vector(), rng.vector()));
        ensure!(SimdRay3::<S>::transpose(&rays).to_array() == rays, "ray transpose round trip");

        let triangles: [[Vector3<f32>; 3]; LANES] = std::array::from_fn(|_| [rng.vector(), rng.vector(), rng.vector()]);
        ensure!(SimdTriangle3::<S>::transpose(&triangles).to_array() == triangles, "triangle transpose round trip");
    }
    Ok(())
}

/// Width-N composition against per-lane scalar results.
fn check_width<const N: usize, const U: usize>(rng: &mut Rng, config: &LaneCheckConfig) -> Result<()> {
    for _ in 0..config.samples.min(1_000) {
        let a: [f32; N] = rng.f32s(1.0e3);
        let b: [f32; N] = rng.f32s(1.0e3);
        let (wa, wb) = (Wide::<F32x4, N, U>::from_array(a), Wide::<F32x4, N, U>::from_array(b));

        let sum = (wa + wb).to_array();
        let product = (wa * wb).to_array();
        let lower = wa.min(wb).to_array();
        for lane in 0..N {
            ensure!(sum[lane] == a[lane] + b[lane], "width {N} add lane {lane}");
            ensure!(product[lane] == a[lane] * b[lane], "width {N} mul lane {lane}");
            ensure!(lower[lane] == if a[lane] < b[lane] { a[lane] } else { b[lane] }, "width {N} min lane {lane}");
        }

        let want_bits = (0..N).filter(|&i| a[i] < b[i]).fold(0u64, |bits, i| bits | 1 << i);
        let less = wa.simd_lt(wb);
        ensure!(less.bitmask() == want_bits, "width {N} lt mask {:b} != {want_bits:b}", less.bitmask());
        ensure!(less.any() == (want_bits != 0), "width {N} any");
        ensure!(less.all() == (want_bits.count_ones() as usize == N), "width {N} all");

        let picked = Wide::select(less, wa, wb).to_array();
        ensure!(picked == lower, "width {N} select");

        let want_sum: f32 = a.iter().sum();
        ensure!(close(wa.sum(), want_sum, config.relative_tolerance, abs_sum(&a)), "width {N} sum");

        let ints: [i32; N] = std::array::from_fn(|_| rng.next_i32());
        let wide = Wide::<I32x4, N, U>::from_array(ints);
        let wrapped = ints.iter().fold(0i32, |acc, &x| acc.wrapping_add(x));
        ensure!(wide.sum() == wrapped, "width {N} int sum");
    }
    Ok(())
}

fn check_width_dyn(width: usize, rng: &mut Rng, config: &LaneCheckConfig) -> Result<()> {
    match width {
        1 => check_width::<1, 1>(rng, config),
        2 => check_width::<2, 1>(rng, config),
        3 => check_width::<3, 1>(rng, config),
        4 => check_width::<4, 1>(rng, config),
        5 => check_width::<5, 2>(rng, config),
        6 => check_width::<6, 2>(rng, config),
        7 => check_width::<7, 2>(rng, config),
        8 => check_width::<8, 2>(rng, config),
        9 => check_width::<9, 3>(rng, config),
        10 => check_width::<10, 3>(rng, config),
        11 => check_width::<11, 3>(rng, config),
        12 => check_width::<12, 3>(rng, config),
        13 => check_width::<13, 4>(rng, config),
        14 => check_width::<14, 4>(rng, config),
        15 => check_width::<15, 4>(rng, config),
        16 => check_width::<16, 4>(rng, config),
        other => bail!("width {other} is not instantiated"),
    }
}

/// Four triangles tiling a 2x2 square, one ray straight down into the first.
fn check_scenario<S: SimdF32>(_rng: &mut Rng, _config: &LaneCheckConfig) -> Result<()> {
    let corners = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)];
    let triangles = corners.map(|(x, y)| {
        [Vector3::new(x, y, 0.0), Vector3::new(x + 1.0, y, 0.0), Vector3::new(x, y + 1.0, 0.0)]
    });
    let ray = Ray3::new(Vector3::new(0.4, 0.4, 1.0), Vector3::new(0.0, 0.0, -1.0));
    let epsilon = CONFIG.intersection.triangle_epsilon;

    let hits = ray_triangles(&SimdRay3::<S>::splat(&ray), &SimdTriangle3::transpose(&triangles), epsilon);
    ensure!(hits.mask.bitmask() == 0b0001, "expected only lane 0 to hit, got {:04b}", hits.mask.bitmask());
    let (lane, t) = closest_hit::<S>(hits.mask, hits.t).context("no closest hit")?;
    ensure!(lane == 0 && close(t, 1.0, 1e-6, 1.0), "closest hit lane {lane} at t = {t}");
    Ok(())
}

struct Run<'a> {
    rng: Rng,
    config: &'a LaneCheckConfig,
    passed: usize,
    failed: Vec<String>,
}

impl<'a> Run<'a> {
    fn new(config: &'a LaneCheckConfig) -> Self {
        Run { rng: Rng::new(config.seed), config, passed: 0, failed: Vec::new() }
    }

    fn check(&mut self, name: &str, check: impl FnOnce(&mut Rng, &LaneCheckConfig) -> Result<()>) {
        match check(&mut self.rng, self.config) {
            Ok(()) => {
                info!("ok   {}", name);
                self.passed += 1;
            }
            Err(err) => {
                error!("FAIL {}: {:#}", name, err);
                self.failed.push(name.to_string());
            }
        }
    }

    /// Runs one check against the compiled backend and the portable one.
    fn both<A, P>(&mut self, name: &str, active: A, portable: P)
    where
        A: FnOnce(&mut Rng, &LaneCheckConfig) -> Result<()>,
        P: FnOnce(&mut Rng, &LaneCheckConfig) -> Result<()>,
    {
        self.check(&format!("{} [{}]", name, lanes::backend_name()), active);
        self.check(&format!("{} [portable]", name), portable);
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let config = &CONFIG.lane_check;
    CONFIG.validate().context("Refusing to run with an invalid configuration")?;
    info!(
        "lane-check: backend {}, {} samples, seed {:#x}",
        lanes::describe_backend(),
        config.samples,
        config.seed
    );
    if lanes::backend_name() == portable::Portable::NAME {
        warn!("compiled backend is the portable one; hardware paths are not exercised");
    }

    let mut run = Run::new(config);
    run.both("float lanes", check_float_lanes::<F32x4>, check_float_lanes::<portable::F32x4>);
    run.both("int lanes", check_int_lanes::<I32x4>, check_int_lanes::<portable::I32x4>);
    run.both("masks and select", check_masks::<F32x4>, check_masks::<portable::F32x4>);
    run.both("dot and cross", check_vectors::<F32x4>, check_vectors::<portable::F32x4>);
    run.both("batch transpose", check_batches::<F32x4>, check_batches::<portable::F32x4>);
    run.both("triangle scenario", check_scenario::<F32x4>, check_scenario::<portable::F32x4>);
    for &width in &config.widths {
        run.check(&format!("width {}", width), |rng, config| check_width_dyn(width, rng, config));
    }

    if !run.failed.is_empty() {
        bail!("{} of {} checks failed: {}", run.failed.len(), run.failed.len() + run.passed, run.failed.join(", "));
    }
    info!("all {} checks passed", run.passed);
    Ok(())
}
