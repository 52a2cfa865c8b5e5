//! Record writer trait and the built-in binary container backend.

use crate::error::{PrepError, PrepResult};
use crate::record::{RecordHeader, TrainingRecord};
use bytes::Bytes;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Magic bytes opening every `bin` record file.
const BIN_MAGIC: &[u8; 8] = b"CRFREC1\0";

/// A backend that persists one [`TrainingRecord`] per file.
///
/// Writers are stateless; the output directory is supplied per call so one
/// writer instance can serve a whole worker pool.
pub trait RecordWriter: std::fmt::Debug + Send + Sync {
    /// File extension produced by this backend, without the dot.
    fn extension(&self) -> &'static str;

    /// Writes `record` under `dir`, returning the file path.
    fn write(&self, record: &TrainingRecord, dir: &Path) -> PrepResult<PathBuf>;
}

/// Writer for the self-describing binary container.
///
/// Layout: the 8-byte magic `CRFREC1\0`, a little-endian `u32` header
/// length, the JSON-encoded [`RecordHeader`], then the four raw blocks in
/// header order (rgb, unary, surrounding, above-below).
#[derive(Debug, Default)]
pub struct BinRecordWriter;

impl BinRecordWriter {
    /// Creates the writer.
    pub fn new() -> Self {
        Self
    }
}

impl RecordWriter for BinRecordWriter {
    fn extension(&self) -> &'static str {
        "rec"
    }

    fn write(&self, record: &TrainingRecord, dir: &Path) -> PrepResult<PathBuf> {
        let path = dir.join(format!("{}.{}", record.name, self.extension()));
        let header = serde_json::to_vec(&record.header())
            .map_err(|e| PrepError::Storage(format!("failed to encode record header: {e}")))?;
        let header_len = u32::try_from(header.len())
            .map_err(|_| PrepError::Storage("record header exceeds u32 length".to_string()))?;

        let file = File::create(&path)?;
        let mut out = BufWriter::new(file);
        out.write_all(BIN_MAGIC)?;
        out.write_all(&header_len.to_le_bytes())?;
        out.write_all(&header)?;
        out.write_all(&record.rgb)?;
        out.write_all(&record.labels_unary)?;
        out.write_all(&record.labels_binary_surrounding)?;
        out.write_all(&record.labels_binary_above_below)?;
        out.flush()?;

        tracing::debug!(
            path = %path.display(),
            dimensions = format!("{}x{}", record.height, record.width),
            "Wrote bin record"
        );
        Ok(path)
    }
}

/// Reads a record written by [`BinRecordWriter`].
pub fn read_bin_record<P: AsRef<Path>>(path: P) -> PrepResult<TrainingRecord> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let mut magic = [0u8; 8];
    file.read_exact(&mut magic)?;
    if &magic != BIN_MAGIC {
        return Err(PrepError::Storage(format!(
            "{} is not a bin record (bad magic)",
            path.display()
        )));
    }

    let mut len_bytes = [0u8; 4];
    file.read_exact(&mut len_bytes)?;
    let header_len = u32::from_le_bytes(len_bytes) as usize;

    let mut header_bytes = vec![0u8; header_len];
    file.read_exact(&mut header_bytes)?;
    let header: RecordHeader = serde_json::from_slice(&header_bytes)
        .map_err(|e| PrepError::Storage(format!("failed to decode record header: {e}")))?;

    let mut read_block = |len: u64| -> PrepResult<Bytes> {
        let mut block = vec![0u8; len as usize];
        file.read_exact(&mut block)?;
        Ok(Bytes::from(block))
    };

    let rgb = read_block(header.rgb_len)?;
    let labels_unary = read_block(header.labels_unary_len)?;
    let labels_binary_surrounding = read_block(header.labels_binary_surrounding_len)?;
    let labels_binary_above_below = read_block(header.labels_binary_above_below_len)?;

    Ok(TrainingRecord {
        height: header.height,
        width: header.width,
        depth: header.depth,
        name: header.name,
        rgb,
        labels_unary,
        labels_binary_surrounding,
        labels_binary_above_below,
    })
}

/// Reads just the header of a `bin` record.
pub fn read_bin_header<P: AsRef<Path>>(path: P) -> PrepResult<RecordHeader> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let mut magic = [0u8; 8];
    file.read_exact(&mut magic)?;
    if &magic != BIN_MAGIC {
        return Err(PrepError::Storage(format!(
            "{} is not a bin record (bad magic)",
            path.display()
        )));
    }

    let mut len_bytes = [0u8; 4];
    file.read_exact(&mut len_bytes)?;
    let mut header_bytes = vec![0u8; u32::from_le_bytes(len_bytes) as usize];
    file.read_exact(&mut header_bytes)?;
    serde_json::from_slice(&header_bytes)
        .map_err(|e| PrepError::Storage(format!("failed to decode record header: {e}")))
}
