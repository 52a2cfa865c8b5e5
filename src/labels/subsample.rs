//! Label-preserving subsampling.
//!
//! Class labels are categorical, so resizing must never interpolate across
//! class boundaries; every output cell is copied from the nearest input cell
//! (order-0 sampling, center-aligned). The output shape is
//! `floor(dim / factor * scale)` per axis, and the subsampled map is what the
//! pairwise builder consumes, keeping pairwise output proportional to the
//! working resolution rather than the native one.

use crate::error::{PrepError, PrepResult};
use crate::grid::ClassMap;

/// Reduces `class_map` to `floor(dim / factor * scale)` per axis using
/// nearest-neighbor sampling.
///
/// # Errors
///
/// Returns [`PrepError::Precondition`] when `factor` is zero, `scale` is not
/// a positive finite number, or the target shape collapses to zero cells.
pub fn subsample(class_map: &ClassMap, factor: u32, scale: f64) -> PrepResult<ClassMap> {
    if factor == 0 {
        return Err(PrepError::Precondition(
            "subsample factor must be at least 1".to_string(),
        ));
    }
    if !scale.is_finite() || scale <= 0.0 {
        return Err(PrepError::Precondition(format!(
            "scale must be a positive, finite number, got {scale}"
        )));
    }

    let rows = class_map.rows();
    let cols = class_map.cols();
    let out_rows = ((rows as f64 / f64::from(factor)) * scale).floor() as usize;
    let out_cols = ((cols as f64 / f64::from(factor)) * scale).floor() as usize;
    if out_rows == 0 || out_cols == 0 {
        return Err(PrepError::Precondition(format!(
            "subsampling {rows}x{cols} by factor {factor} at scale {scale} leaves no cells"
        )));
    }

    let mut data = Vec::with_capacity(out_rows * out_cols);
    for out_row in 0..out_rows {
        let src_row = nearest_source(out_row, out_rows, rows);
        for out_col in 0..out_cols {
            let src_col = nearest_source(out_col, out_cols, cols);
            data.push(class_map.get(src_row, src_col));
        }
    }
    ClassMap::from_vec(out_rows, out_cols, data)
}

/// Maps an output index to its nearest source index, sampling at cell
/// centers.
fn nearest_source(out_idx: usize, out_dim: usize, src_dim: usize) -> usize {
    let center = (out_idx as f64 + 0.5) * src_dim as f64 / out_dim as f64;
    (center.floor() as usize).min(src_dim - 1)
}
