// src/config.rs

//! Runtime configuration for the kernel and the `lane-check` binary.
//!
//! The lane types themselves have nothing to configure; the backend is fixed
//! when the crate is compiled. What is tunable is the tolerance of the packet
//! intersection routines and how hard `lane-check` exercises the backends.
//!
//! Configuration is JSON. Every field has a default, so a file only needs the
//! values it changes:
//!
//! ```json
//! { "lane_check": { "samples": 100000, "widths": [5, 13] } }
//! ```

use anyhow::{bail, Context, Result};
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "RAYSOUND_MATH_CONFIG";

/// Widest lane count `lane-check` instantiates.
pub const MAX_CHECK_WIDTH: usize = 16;

/// Process-wide configuration, loaded on first use from [`CONFIG_ENV`].
pub static CONFIG: Lazy<KernelConfig> = Lazy::new(KernelConfig::from_env);

/// Root of the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KernelConfig {
    /// Packet intersection settings.
    pub intersection: IntersectionConfig,
    /// Settings for the `lane-check` binary.
    pub lane_check: LaneCheckConfig,
}

/// Packet intersection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntersectionConfig {
    /// Determinant magnitude below which a ray is treated as parallel to a
    /// triangle.
    pub triangle_epsilon: f32,
}

impl Default for IntersectionConfig {
    fn default() -> Self {
        IntersectionConfig {
            triangle_epsilon: crate::intersect::DEFAULT_TRIANGLE_EPSILON,
        }
    }
}

/// How `lane-check` samples the backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneCheckConfig {
    /// Random inputs per check.
    pub samples: usize,
    /// Seed for the input generator. The same seed replays the same inputs.
    pub seed: u64,
    /// Relative tolerance for float results that may round differently
    /// between backends.
    pub relative_tolerance: f32,
    /// Logical widths to check the width-N composition at, each in
    /// `1..=MAX_CHECK_WIDTH`.
    pub widths: Vec<usize>,
}

impl Default for LaneCheckConfig {
    fn default() -> Self {
        LaneCheckConfig {
            samples: 10_000,
            seed: 0x5EED_1E55_0F_5A4D,
            relative_tolerance: 1e-5,
            widths: vec![5, 7, 8, 12],
        }
    }
}

impl KernelConfig {
    /// Reads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: KernelConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Loads the file named by [`CONFIG_ENV`], or the defaults when the
    /// variable is unset. A file that cannot be loaded is reported and the
    /// defaults are used instead.
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV) else {
            info!("{} not set, using default configuration", CONFIG_ENV);
            return KernelConfig::default();
        };
        match KernelConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!("{:#}; using default configuration", err);
                KernelConfig::default()
            }
        }
    }

    /// Rejects values the kernel cannot work with.
    pub fn validate(&self) -> Result<()> {
        let epsilon = self.intersection.triangle_epsilon;
        if !(epsilon.is_finite() && epsilon > 0.0) {
            bail!("intersection.triangle_epsilon must be positive, got {}", epsilon);
        }
        let tolerance = self.lane_check.relative_tolerance;
        if !(tolerance.is_finite() && tolerance > 0.0) {
            bail!("lane_check.relative_tolerance must be positive, got {}", tolerance);
        }
        if self.lane_check.samples == 0 {
            bail!("lane_check.samples must be at least 1");
        }
        if let Some(width) = self.lane_check.widths.iter().find(|&&w| w == 0 || w > MAX_CHECK_WIDTH) {
            bail!("lane_check.widths entries must be in 1..={}, got {}", MAX_CHECK_WIDTH, width);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use test_log::test;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("raysound-math-{}-{}.json", name, std::process::id()));
        let mut file = std::fs::File::create(&path).expect("create temp config");
        file.write_all(contents.as_bytes()).expect("write temp config");
        path
    }

    #[test]
    fn defaults_are_valid() {
        let config = KernelConfig::default();
        config.validate().expect("defaults validate");
        assert_eq!(config.lane_check.widths, vec![5, 7, 8, 12]);
        assert_eq!(config.intersection.triangle_epsilon, 1e-6);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let path = write_temp("partial", r#"{ "lane_check": { "samples": 42 } }"#);
        let config = KernelConfig::load(&path).expect("load partial config");
        std::fs::remove_file(&path).ok();
        assert_eq!(config.lane_check.samples, 42);
        assert_eq!(config.lane_check.relative_tolerance, 1e-5);
        assert_eq!(config.intersection, IntersectionConfig::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let path = write_temp("invalid", r#"{ "intersection": { "triangle_epsilon": -1.0 } }"#);
        let err = KernelConfig::load(&path).expect_err("negative epsilon");
        std::fs::remove_file(&path).ok();
        assert!(format!("{:#}", err).contains("triangle_epsilon"));

        let mut config = KernelConfig::default();
        config.lane_check.widths.push(0);
        assert!(config.validate().is_err());
        config.lane_check.widths = vec![MAX_CHECK_WIDTH + 1];
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = KernelConfig::load("/nonexistent/raysound.json").expect_err("missing file");
        assert!(err.to_string().contains("/nonexistent/raysound.json"));
    }

    #[test]
    fn round_trips_through_json() {
        let config = KernelConfig::default();
        let text = serde_json::to_string_pretty(&config).expect("serialize");
        let back: KernelConfig = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back, config);
    }
}
