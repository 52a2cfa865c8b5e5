//! Configuration system using Figment.
//!
//! This module provides strongly-typed configuration loading for the
//! pipeline. Configuration is loaded from:
//! 1. a TOML file (base configuration)
//! 2. environment variables (prefixed with `CRF_PREP_`)
//!
//! The loaded [`Config`] is immutable and passed by reference into each
//! component; no transform reads ambient global state.
//!
//! # Example
//! ```no_run
//! use crf_prep::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! config.validate()?;
//! println!("Classes: {}", config.labels.num_classes);
//! # Ok(())
//! # }
//! ```

use crate::error::{PrepError, PrepResult};
use crate::labels::{Offset, OffsetPattern};
use crate::validation;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    #[serde(default)]
    pub application: ApplicationConfig,
    /// Label-transform settings
    pub labels: LabelConfig,
    /// Image normalization settings
    pub image: ImageConfig,
    /// Dataset layout settings
    pub dataset: DatasetConfig,
    /// Record storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

/// Label-transform configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Total class count K; labels must lie in `[0, K)`.
    pub num_classes: u32,
    /// Integer factor the label map is reduced by before pairwise
    /// generation.
    #[serde(default = "default_subsample_factor")]
    pub subsample_factor: u32,
    /// Scale multiplier applied together with the subsample factor.
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,
    /// Sentinel written where a neighbor lookup leaves the map. Must lie
    /// outside `[0, K^2)`.
    #[serde(default = "default_ignore_sentinel")]
    pub ignore_sentinel: i32,
    /// Override for the surrounding offsets, `[drow, dcol]` pairs.
    #[serde(default)]
    pub surrounding_offsets: Option<Vec<[i32; 2]>>,
    /// Override for the above-below offsets, `[drow, dcol]` pairs.
    #[serde(default)]
    pub above_below_offsets: Option<Vec<[i32; 2]>>,
}

/// Image normalization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Expected image width; also the `<width>x<height>` path component.
    pub width: u32,
    /// Expected image height; also the `<width>x<height>` path component.
    pub height: u32,
    /// Red-channel mean subtracted during normalization (0 disables).
    #[serde(default)]
    pub r_mean: f32,
    /// Green-channel mean subtracted during normalization (0 disables).
    #[serde(default)]
    pub g_mean: f32,
    /// Blue-channel mean subtracted during normalization (0 disables).
    #[serde(default)]
    pub b_mean: f32,
}

/// Dataset layout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Root directory holding `<split>/<WxH>/img` and `<split>/<WxH>/gt_bin`.
    pub dataset_dir: PathBuf,
    /// Root directory records are written under.
    pub save_dir: PathBuf,
    /// Splits converted by `prepare` when no split is named.
    #[serde(default = "default_splits")]
    pub splits: Vec<String>,
    /// Worker threads for per-image conversion (0 = one per core).
    #[serde(default)]
    pub workers: usize,
}

/// Record storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Record backend (`bin`, or `arrow` with the `storage_arrow` feature).
    #[serde(default = "default_backend")]
    pub backend: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "crf_prep".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_subsample_factor() -> u32 {
    16
}

fn default_max_scale() -> f64 {
    1.0
}

fn default_ignore_sentinel() -> i32 {
    -1
}

fn default_splits() -> Vec<String> {
    vec![
        "train_train".to_string(),
        "train_val".to_string(),
        "val".to_string(),
    ]
}

fn default_backend() -> String {
    "bin".to_string()
}

impl Config {
    /// Load configuration from `config/prep.toml` and environment variables.
    ///
    /// Environment variables can override configuration with prefix
    /// `CRF_PREP_`. Example: `CRF_PREP_STORAGE_BACKEND=arrow`.
    pub fn load() -> PrepResult<Self> {
        Self::load_from("config/prep.toml")
    }

    /// Load configuration from a specific file path.
    pub fn load_from<P: AsRef<Path>>(path: P) -> PrepResult<Self> {
        let config: Self = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("CRF_PREP_").split("_"))
            .extract()?;
        Ok(config)
    }

    /// Validate configuration after loading.
    ///
    /// All semantic violations surface here, before any dataset file is
    /// touched.
    pub fn validate(&self) -> PrepResult<()> {
        let fail = |msg: String| Err(PrepError::Configuration(msg));

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.as_str()) {
            return fail(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            ));
        }

        if let Err(e) = validation::is_valid_class_count(i64::from(self.labels.num_classes)) {
            return fail(format!("num_classes = {}: {e}", self.labels.num_classes));
        }
        if let Err(e) = validation::is_valid_subsample_factor(self.labels.subsample_factor) {
            return fail(format!(
                "subsample_factor = {}: {e}",
                self.labels.subsample_factor
            ));
        }
        if let Err(e) = validation::is_valid_scale(self.labels.max_scale) {
            return fail(format!("max_scale = {}: {e}", self.labels.max_scale));
        }
        if let Err(e) = validation::is_valid_sentinel(
            i64::from(self.labels.ignore_sentinel),
            i64::from(self.labels.num_classes),
        ) {
            return fail(format!(
                "ignore_sentinel = {}: {e}",
                self.labels.ignore_sentinel
            ));
        }

        if self.image.width == 0 || self.image.height == 0 {
            return fail(format!(
                "image dimensions must be non-zero, got {}x{}",
                self.image.width, self.image.height
            ));
        }

        if self.dataset.splits.is_empty() {
            return fail("at least one dataset split is required".to_string());
        }
        for split in &self.dataset.splits {
            if let Err(e) = validation::is_valid_split_name(split) {
                return fail(format!("split '{split}': {e}"));
            }
        }

        // Pattern overrides re-validate their axis contracts.
        self.surrounding_pattern()?;
        self.above_below_pattern()?;

        Ok(())
    }

    /// The surrounding pattern, from the override or the default set.
    pub fn surrounding_pattern(&self) -> PrepResult<OffsetPattern> {
        match &self.labels.surrounding_offsets {
            Some(pairs) => OffsetPattern::surrounding(to_offsets(pairs)),
            None => Ok(OffsetPattern::default_surrounding()),
        }
    }

    /// The above-below pattern, from the override or the default set.
    pub fn above_below_pattern(&self) -> PrepResult<OffsetPattern> {
        match &self.labels.above_below_offsets {
            Some(pairs) => OffsetPattern::above_below(to_offsets(pairs)),
            None => Ok(OffsetPattern::default_above_below()),
        }
    }

    /// The `<width>x<height>` directory component under each split.
    pub fn resolution_dir(&self) -> String {
        format!("{}x{}", self.image.width, self.image.height)
    }

    /// Per-channel means in RGB order.
    pub fn channel_means(&self) -> [f32; 3] {
        [self.image.r_mean, self.image.g_mean, self.image.b_mean]
    }
}

fn to_offsets(pairs: &[[i32; 2]]) -> Vec<Offset> {
    pairs
        .iter()
        .map(|&[drow, dcol]| Offset::new(drow, dcol))
        .collect()
}
