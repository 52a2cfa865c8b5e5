//! Training-record assembly and storage.
//!
//! A [`TrainingRecord`] packages everything the CRF trainer reads for one
//! image: the mean-centered image, the subsampled unary label map, and the
//! two pairwise joint-label maps. Records are created once, never mutated,
//! and durable once written.
//!
//! Two backends write records, selected through
//! [`factory::RecordWriterRegistry`]:
//!
//! - `bin`: a small self-describing container (magic, JSON header, raw
//!   little-endian blocks), always compiled;
//! - `arrow`: an Arrow IPC file with one single-row batch per image, behind
//!   the `storage_arrow` feature.

pub mod factory;
pub mod writer;

#[cfg(feature = "storage_arrow")]
pub mod arrow_writer;

use crate::error::PrepResult;
use crate::grid::{ClassMap, NormalizedImage, PairwiseMap};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One packaged training example.
#[derive(Debug, Clone)]
pub struct TrainingRecord {
    /// Image rows at source resolution.
    pub height: u64,
    /// Image columns at source resolution.
    pub width: u64,
    /// Color channels per pixel.
    pub depth: u64,
    /// Source identifier (the image file stem).
    pub name: String,
    /// Mean-centered image, `f32` little-endian, `(height, width, depth)`.
    pub rgb: Bytes,
    /// Subsampled unary label map, `i32` little-endian.
    pub labels_unary: Bytes,
    /// Surrounding-pattern joint labels, `i32` little-endian.
    pub labels_binary_surrounding: Bytes,
    /// Above-below-pattern joint labels, `i32` little-endian.
    pub labels_binary_above_below: Bytes,
}

impl TrainingRecord {
    /// Assembles a record from the per-image pipeline outputs.
    pub fn assemble(
        name: &str,
        image: &NormalizedImage,
        unary: &ClassMap,
        surrounding: &PairwiseMap,
        above_below: &PairwiseMap,
    ) -> Self {
        Self {
            height: image.rows() as u64,
            width: image.cols() as u64,
            depth: NormalizedImage::DEPTH as u64,
            name: name.to_string(),
            rgb: image.to_le_bytes(),
            labels_unary: unary.to_le_bytes(),
            labels_binary_surrounding: surrounding.to_le_bytes(),
            labels_binary_above_below: above_below.to_le_bytes(),
        }
    }

    /// Header describing this record's scalar fields and block lengths.
    pub fn header(&self) -> RecordHeader {
        RecordHeader {
            height: self.height,
            width: self.width,
            depth: self.depth,
            name: self.name.clone(),
            rgb_len: self.rgb.len() as u64,
            labels_unary_len: self.labels_unary.len() as u64,
            labels_binary_surrounding_len: self.labels_binary_surrounding.len() as u64,
            labels_binary_above_below_len: self.labels_binary_above_below.len() as u64,
        }
    }
}

/// Scalar fields and block lengths of a packaged record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordHeader {
    /// Image rows at source resolution.
    pub height: u64,
    /// Image columns at source resolution.
    pub width: u64,
    /// Color channels per pixel.
    pub depth: u64,
    /// Source identifier.
    pub name: String,
    /// Byte length of the image block.
    pub rgb_len: u64,
    /// Byte length of the unary block.
    pub labels_unary_len: u64,
    /// Byte length of the surrounding pairwise block.
    pub labels_binary_surrounding_len: u64,
    /// Byte length of the above-below pairwise block.
    pub labels_binary_above_below_len: u64,
}

/// Reads a `bin`-backend record back from disk.
///
/// Provided for consumers and tests; see [`writer::BinRecordWriter`] for the
/// container layout.
pub fn read_record<P: AsRef<std::path::Path>>(path: P) -> PrepResult<TrainingRecord> {
    writer::read_bin_record(path)
}
