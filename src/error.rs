//! Custom error types for the application.
//!
//! This module defines the primary error type, `PrepError`, for the entire
//! pipeline. Using the `thiserror` crate, it provides a centralized and
//! consistent way to handle the different kinds of failures that can occur,
//! from I/O and configuration issues to violated caller contracts.
//!
//! ## Error Hierarchy
//!
//! `PrepError` is an enum that consolidates the error sources:
//!
//! - **`Config`**: Wraps errors from the `figment` extraction step, typically
//!   related to file parsing or type mismatches in the configuration files.
//! - **`Configuration`**: Represents semantic errors in the configuration,
//!   such as values that parse but are logically invalid (e.g., an IGNORE
//!   sentinel that collides with the joint-label range). These are caught by
//!   the validation step before any file is touched.
//! - **`Io`**: Wraps standard `std::io::Error`, covering all file I/O issues.
//! - **`Image`**: Wraps decode errors from the `image` crate.
//! - **`Precondition`**: A caller contract violation on one of the pure
//!   transforms (a label outside `[0, K)`, a zero class count, a zero
//!   subsample factor). Detected and surfaced immediately, never clamped.
//! - **`ShapeMismatch`**: The image and its label map are not aligned 1:1 at
//!   source resolution. Surfaced as a hard failure for that image only;
//!   conversion continues for the rest of the batch.
//! - **`Storage`**: Failures while packaging or writing a training record.
//! - **`FeatureNotEnabled`**: A record backend was requested that was not
//!   compiled in, with a clear message on how to enable it.
//!
//! Out-of-bounds neighbor lookups during pairwise generation are NOT errors;
//! they are a defined boundary case handled with the IGNORE sentinel.

use thiserror::Error;

/// Convenience alias for results using the pipeline error type.
pub type PrepResult<T> = std::result::Result<T, PrepError>;

/// Central error type for the record-preparation pipeline.
#[derive(Error, Debug)]
pub enum PrepError {
    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    /// Configuration parsed but failed semantic validation.
    #[error("Configuration validation error: {0}")]
    Configuration(String),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decode failure.
    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    /// A caller contract on a pure transform was violated.
    #[error("Precondition violation: {0}")]
    Precondition(String),

    /// Image and label map disagree on the source resolution.
    #[error(
        "label map holds {label_cells} cells, image is {image_rows}x{image_cols} \
         ({expected} expected)"
    )]
    ShapeMismatch {
        /// Image rows at source resolution.
        image_rows: usize,
        /// Image columns at source resolution.
        image_cols: usize,
        /// Number of cells found in the label map.
        label_cells: usize,
        /// Number of cells implied by the image dimensions.
        expected: usize,
    },

    /// Record packaging or writing failed.
    #[error("Record storage error: {0}")]
    Storage(String),

    /// A record backend was requested without its feature compiled in.
    #[error("Feature '{0}' is not enabled. Please build with --features {0}")]
    FeatureNotEnabled(String),
}
