//! Dense grid types shared by the label transforms and the record assembler.
//!
//! All three grids are owned, row-major buffers with explicit dimensions:
//!
//! - [`ClassMap`]: per-pixel class labels, `(rows, cols)`, cells in `[0, K)`.
//! - [`NormalizedImage`]: mean-centered color values, `(rows, cols, 3)`.
//! - [`PairwiseMap`]: joint labels per neighbor channel,
//!   `(rows, cols, channels)`, cells in `[0, K^2)` or the IGNORE sentinel.
//!
//! Constructors validate that buffer length matches the claimed shape, so a
//! grid that exists is always internally consistent. Cells are `i32` to match
//! the serialized record layout; labels originate from `u8` sources.

use crate::error::{PrepError, PrepResult};
use bytes::Bytes;

/// A 2D grid of integer class labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMap {
    rows: usize,
    cols: usize,
    data: Vec<i32>,
}

impl ClassMap {
    /// Builds a class map from a row-major buffer, checking the shape.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<i32>) -> PrepResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(PrepError::Precondition(format!(
                "class map dimensions must be non-zero, got {rows}x{cols}"
            )));
        }
        if data.len() != rows * cols {
            return Err(PrepError::Precondition(format!(
                "class map buffer holds {} cells, shape {rows}x{cols} needs {}",
                data.len(),
                rows * cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Builds a class map from raw `u8` label bytes (the on-disk format).
    pub fn from_raw(rows: usize, cols: usize, raw: &[u8]) -> PrepResult<Self> {
        Self::from_vec(rows, cols, raw.iter().map(|&b| i32::from(b)).collect())
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Label at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds; callers index within
    /// `(rows, cols)`.
    pub fn get(&self, row: usize, col: usize) -> i32 {
        assert!(row < self.rows && col < self.cols, "coordinate out of bounds");
        self.data[row * self.cols + col]
    }

    /// Read-only view of the row-major cell buffer.
    pub fn data(&self) -> &[i32] {
        &self.data
    }

    /// Checks every cell against `[0, num_classes)`, failing fast on the
    /// first violation.
    pub fn validate_range(&self, num_classes: i32) -> PrepResult<()> {
        if num_classes <= 0 {
            return Err(PrepError::Precondition(format!(
                "class count must be positive, got {num_classes}"
            )));
        }
        for (idx, &label) in self.data.iter().enumerate() {
            if label < 0 || label >= num_classes {
                return Err(PrepError::Precondition(format!(
                    "label {label} at cell ({}, {}) is outside [0, {num_classes})",
                    idx / self.cols,
                    idx % self.cols
                )));
            }
        }
        Ok(())
    }

    /// Serializes the cells as little-endian `i32` bytes for record packing.
    pub fn to_le_bytes(&self) -> Bytes {
        let mut out = Vec::with_capacity(self.data.len() * 4);
        for &cell in &self.data {
            out.extend_from_slice(&cell.to_le_bytes());
        }
        Bytes::from(out)
    }
}

/// A mean-centered RGB image, `(rows, cols, 3)` of `f32`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedImage {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl NormalizedImage {
    /// Number of color channels carried per pixel.
    pub const DEPTH: usize = 3;

    /// Builds an image from a row-major interleaved buffer, checking the
    /// shape.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> PrepResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(PrepError::Precondition(format!(
                "image dimensions must be non-zero, got {rows}x{cols}"
            )));
        }
        if data.len() != rows * cols * Self::DEPTH {
            return Err(PrepError::Precondition(format!(
                "image buffer holds {} values, shape {rows}x{cols}x{} needs {}",
                data.len(),
                Self::DEPTH,
                rows * cols * Self::DEPTH
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Read-only view of the interleaved channel buffer.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Serializes the values as little-endian `f32` bytes for record packing.
    pub fn to_le_bytes(&self) -> Bytes {
        let mut out = Vec::with_capacity(self.data.len() * 4);
        for &value in &self.data {
            out.extend_from_slice(&value.to_le_bytes());
        }
        Bytes::from(out)
    }
}

/// A joint-label map, `(rows, cols, channels)` with one channel per offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairwiseMap {
    rows: usize,
    cols: usize,
    channels: usize,
    data: Vec<i32>,
}

impl PairwiseMap {
    /// Builds a pairwise map from a row-major interleaved buffer, checking
    /// the shape.
    pub fn from_vec(
        rows: usize,
        cols: usize,
        channels: usize,
        data: Vec<i32>,
    ) -> PrepResult<Self> {
        if rows == 0 || cols == 0 || channels == 0 {
            return Err(PrepError::Precondition(format!(
                "pairwise map dimensions must be non-zero, got {rows}x{cols}x{channels}"
            )));
        }
        if data.len() != rows * cols * channels {
            return Err(PrepError::Precondition(format!(
                "pairwise buffer holds {} cells, shape {rows}x{cols}x{channels} needs {}",
                data.len(),
                rows * cols * channels
            )));
        }
        Ok(Self {
            rows,
            cols,
            channels,
            data,
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of offset channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Joint label at `(row, col, channel)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds; callers index within
    /// `(rows, cols, channels)`.
    pub fn get(&self, row: usize, col: usize, channel: usize) -> i32 {
        assert!(
            row < self.rows && col < self.cols && channel < self.channels,
            "coordinate out of bounds"
        );
        self.data[(row * self.cols + col) * self.channels + channel]
    }

    /// Read-only view of the interleaved channel buffer.
    pub fn data(&self) -> &[i32] {
        &self.data
    }

    /// Serializes the cells as little-endian `i32` bytes for record packing.
    pub fn to_le_bytes(&self) -> Bytes {
        let mut out = Vec::with_capacity(self.data.len() * 4);
        for &cell in &self.data {
            out.extend_from_slice(&cell.to_le_bytes());
        }
        Bytes::from(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_map_rejects_bad_buffer_length() {
        assert!(ClassMap::from_vec(2, 2, vec![0, 1, 2]).is_err());
        assert!(ClassMap::from_vec(0, 2, vec![]).is_err());
        assert!(ClassMap::from_vec(2, 2, vec![0, 1, 2, 3]).is_ok());
    }

    #[test]
    fn class_map_range_validation_reports_cell() {
        let map = ClassMap::from_vec(2, 3, vec![0, 1, 2, 0, 5, 1]).unwrap();
        assert!(map.validate_range(6).is_ok());
        let err = map.validate_range(3).unwrap_err();
        assert!(err.to_string().contains("(1, 1)"), "got: {err}");
    }

    #[test]
    fn class_map_from_raw_widens_bytes() {
        let map = ClassMap::from_raw(1, 3, &[0u8, 128, 255]).unwrap();
        assert_eq!(map.data(), &[0, 128, 255]);
    }

    #[test]
    fn le_serialization_is_four_bytes_per_cell() {
        let map = ClassMap::from_vec(1, 2, vec![1, -1]).unwrap();
        let bytes = map.to_le_bytes();
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[..4], &1i32.to_le_bytes());
        assert_eq!(&bytes[4..], &(-1i32).to_le_bytes());
    }

    #[test]
    fn pairwise_map_indexing_is_channel_interleaved() {
        let map = PairwiseMap::from_vec(1, 2, 2, vec![10, 11, 20, 21]).unwrap();
        assert_eq!(map.get(0, 0, 1), 11);
        assert_eq!(map.get(0, 1, 0), 20);
    }
}
