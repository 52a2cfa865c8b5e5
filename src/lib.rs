//! # CRF Record Preparation Library
//!
//! This crate converts per-pixel semantic-segmentation annotations into
//! packaged training records for a piecewise-CRF structured-prediction
//! model. For every source image it emits one record holding the
//! mean-centered image, the subsampled per-pixel ("unary") label map, and
//! two derived "pairwise" joint-label maps built under two neighbor
//! connectivity patterns (surrounding and above-below).
//!
//! ## Crate Structure
//!
//! The library is organized into modules with distinct responsibilities:
//!
//! - **`config`**: Strongly-typed, layered configuration (TOML file plus
//!   `CRF_PREP_` environment overrides) with semantic validation. The loaded
//!   [`config::Config`] is immutable and passed into each component; nothing
//!   reads ambient global state.
//! - **`error`**: The central [`error::PrepError`] taxonomy, distinguishing
//!   caller contract violations from per-image alignment failures and
//!   storage errors.
//! - **`grid`**: Dense row-major grid types (class maps, normalized images,
//!   and pairwise joint-label maps) with checked shapes and range
//!   invariants.
//! - **`labels`**: The pure transform core: joint label encoding, neighbor
//!   offset patterns, pairwise map generation with IGNORE boundary handling,
//!   and label-preserving subsampling.
//! - **`loader`**: The input boundary: image decode, per-channel mean
//!   subtraction, raw label-map loading, and the image/label alignment
//!   check.
//! - **`record`**: Training-record assembly plus the storage backends (`bin`
//!   container always, Arrow IPC behind `storage_arrow`) and their
//!   feature-aware registry.
//! - **`dataset`**: Split discovery and the parallel per-image conversion
//!   pipeline with per-image failure isolation.
//! - **`logging`**: Tracing initialization from configuration.
//! - **`validation`**: Small reusable validators backing configuration
//!   checks.

pub mod config;
pub mod dataset;
pub mod error;
pub mod grid;
pub mod labels;
pub mod loader;
pub mod logging;
pub mod record;
pub mod validation;
