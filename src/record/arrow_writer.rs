//! Arrow IPC record backend (`storage_arrow` feature).
//!
//! Each record becomes its own `.arrow` file holding one single-row
//! [`RecordBatch`] whose columns mirror the record fields. Keeping one file
//! per image preserves the per-image durability contract of the `bin`
//! backend while staying readable by any Arrow consumer.

use crate::error::{PrepError, PrepResult};
use crate::record::writer::RecordWriter;
use crate::record::TrainingRecord;
use arrow::array::{ArrayRef, BinaryBuilder, StringBuilder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::RecordBatch;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Writer producing one Arrow IPC file per record.
#[derive(Debug, Default)]
pub struct ArrowRecordWriter;

impl ArrowRecordWriter {
    /// Creates the writer.
    pub fn new() -> Self {
        Self
    }

    fn schema() -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("height", DataType::UInt64, false),
            Field::new("width", DataType::UInt64, false),
            Field::new("depth", DataType::UInt64, false),
            Field::new("img_name", DataType::Utf8, false),
            Field::new("rgb", DataType::Binary, false),
            Field::new("labels_unary", DataType::Binary, false),
            Field::new("labels_binary_surrounding", DataType::Binary, false),
            Field::new("labels_binary_above_below", DataType::Binary, false),
        ]))
    }

    fn batch(record: &TrainingRecord) -> PrepResult<RecordBatch> {
        let mut height = UInt64Builder::new();
        height.append_value(record.height);
        let mut width = UInt64Builder::new();
        width.append_value(record.width);
        let mut depth = UInt64Builder::new();
        depth.append_value(record.depth);
        let mut name = StringBuilder::new();
        name.append_value(&record.name);
        let mut rgb = BinaryBuilder::new();
        rgb.append_value(&record.rgb);
        let mut unary = BinaryBuilder::new();
        unary.append_value(&record.labels_unary);
        let mut surrounding = BinaryBuilder::new();
        surrounding.append_value(&record.labels_binary_surrounding);
        let mut above_below = BinaryBuilder::new();
        above_below.append_value(&record.labels_binary_above_below);

        let columns: Vec<ArrayRef> = vec![
            Arc::new(height.finish()),
            Arc::new(width.finish()),
            Arc::new(depth.finish()),
            Arc::new(name.finish()),
            Arc::new(rgb.finish()),
            Arc::new(unary.finish()),
            Arc::new(surrounding.finish()),
            Arc::new(above_below.finish()),
        ];
        RecordBatch::try_new(Self::schema(), columns)
            .map_err(|e| PrepError::Storage(format!("failed to build record batch: {e}")))
    }
}

impl RecordWriter for ArrowRecordWriter {
    fn extension(&self) -> &'static str {
        "arrow"
    }

    fn write(&self, record: &TrainingRecord, dir: &Path) -> PrepResult<PathBuf> {
        let path = dir.join(format!("{}.{}", record.name, self.extension()));
        let batch = Self::batch(record)?;

        let file = File::create(&path)?;
        let mut writer = FileWriter::try_new(file, &Self::schema())
            .map_err(|e| PrepError::Storage(format!("failed to open IPC writer: {e}")))?;
        writer
            .write(&batch)
            .map_err(|e| PrepError::Storage(format!("failed to write record batch: {e}")))?;
        writer
            .finish()
            .map_err(|e| PrepError::Storage(format!("failed to finalize IPC file: {e}")))?;

        tracing::debug!(
            path = %path.display(),
            dimensions = format!("{}x{}", record.height, record.width),
            "Wrote arrow record"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::ipc::reader::FileReader;
    use bytes::Bytes;
    use tempfile::TempDir;

    fn sample_record() -> TrainingRecord {
        TrainingRecord {
            height: 4,
            width: 4,
            depth: 3,
            name: "frame_a".to_string(),
            rgb: Bytes::from_static(&[7; 192]),
            labels_unary: Bytes::from_static(&[1; 16]),
            labels_binary_surrounding: Bytes::from_static(&[2; 32]),
            labels_binary_above_below: Bytes::from_static(&[3; 32]),
        }
    }

    #[test]
    fn writes_one_single_row_batch() {
        let dir = TempDir::new().unwrap();
        let path = ArrowRecordWriter::new()
            .write(&sample_record(), dir.path())
            .unwrap();
        assert!(path.exists());

        let file = File::open(&path).unwrap();
        let mut reader = FileReader::try_new(file, None).unwrap();
        let batch = reader.next().unwrap().unwrap();
        assert_eq!(batch.num_rows(), 1);
        assert_eq!(batch.num_columns(), 8);
        assert!(reader.next().is_none());
    }
}
