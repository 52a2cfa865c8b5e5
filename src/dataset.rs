//! Dataset conversion pipeline.
//!
//! Walks the dataset layout the annotation tooling produces
//! (`<dataset_dir>/<split>/<WxH>/img` for images, `.../gt_bin` for flat
//! `u8` label maps keyed by file stem) and converts each image into one
//! training record under `<save_dir>/<split>/<WxH>/records`.
//!
//! Images are independent, so conversion fans out over a rayon worker pool
//! with no synchronization beyond result counters. A failed image is logged
//! and counted, never aborts the split. Within one image, the two pairwise
//! builds run concurrently; the subsample step completes first because both
//! builds consume its output.

use crate::config::Config;
use crate::error::{PrepError, PrepResult};
use crate::labels::{generate_pairwise, subsample, OffsetPattern};
use crate::loader;
use crate::record::factory::RecordWriterRegistry;
use crate::record::writer::RecordWriter;
use crate::record::TrainingRecord;
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering::Relaxed};

/// Image extensions accepted from the `img` directory.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff"];

/// Conversion totals for one split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSummary {
    /// Split name.
    pub split: String,
    /// Records written.
    pub converted: usize,
    /// Images that failed and were skipped.
    pub failed: usize,
}

/// Manifest written next to each split's records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitManifest {
    /// Split name.
    pub split: String,
    /// Source image width.
    pub width: u32,
    /// Source image height.
    pub height: u32,
    /// Class count the records were generated with.
    pub num_classes: u32,
    /// Subsample factor applied to the label maps.
    pub subsample_factor: u32,
    /// Scale multiplier applied with the subsample factor.
    pub max_scale: f64,
    /// IGNORE sentinel used in the pairwise blocks.
    pub ignore_sentinel: i32,
    /// Record backend the files were written with.
    pub backend: String,
    /// Records written.
    pub converted: usize,
    /// Images that failed and were skipped.
    pub failed: usize,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// Converts every split named in the configuration.
pub fn prepare_all(config: &Config) -> PrepResult<Vec<SplitSummary>> {
    let mut summaries = Vec::with_capacity(config.dataset.splits.len());
    for split in &config.dataset.splits {
        summaries.push(prepare_split(config, split)?);
    }
    Ok(summaries)
}

/// Converts one split into training records.
///
/// # Errors
///
/// Fails when the split directories are unusable, the backend cannot be
/// created, or the worker pool cannot be built. Per-image failures do not
/// propagate; they are counted in the returned [`SplitSummary`].
pub fn prepare_split(config: &Config, split: &str) -> PrepResult<SplitSummary> {
    let resolution = config.resolution_dir();
    let img_dir = config.dataset.dataset_dir.join(split).join(&resolution).join("img");
    let gt_dir = config
        .dataset
        .dataset_dir
        .join(split)
        .join(&resolution)
        .join("gt_bin");
    let out_dir = config
        .dataset
        .save_dir
        .join(split)
        .join(&resolution)
        .join("records");
    fs::create_dir_all(&out_dir)?;

    let surrounding = config.surrounding_pattern()?;
    let above_below = config.above_below_pattern()?;
    let writer = RecordWriterRegistry::new().create(&config.storage.backend)?;

    let mut images = list_images(&img_dir)?;
    images.sort();
    tracing::info!(
        split,
        images = images.len(),
        backend = %config.storage.backend,
        "Preparing split"
    );
    if images.is_empty() {
        tracing::warn!(split, img_dir = %img_dir.display(), "No images found");
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.dataset.workers)
        .build()
        .map_err(|e| PrepError::Configuration(format!("failed to build worker pool: {e}")))?;

    let pb = ProgressBar::new(images.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );
    pb.set_message(split.to_string());

    let converted = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    pool.install(|| {
        images.par_iter().for_each(|img_path| {
            match convert_one(
                config,
                &surrounding,
                &above_below,
                writer.as_ref(),
                img_path,
                &gt_dir,
                &out_dir,
            ) {
                Ok(record_path) => {
                    converted.fetch_add(1, Relaxed);
                    tracing::debug!(record = %record_path.display(), "Converted");
                }
                Err(e) => {
                    failed.fetch_add(1, Relaxed);
                    tracing::warn!(image = %img_path.display(), error = %e, "Skipping image");
                }
            }
            pb.inc(1);
        });
    });
    pb.finish();

    let summary = SplitSummary {
        split: split.to_string(),
        converted: converted.load(Relaxed),
        failed: failed.load(Relaxed),
    };
    write_manifest(config, &out_dir, &summary)?;

    tracing::info!(
        split,
        converted = summary.converted,
        failed = summary.failed,
        out_dir = %out_dir.display(),
        "Split prepared"
    );
    Ok(summary)
}

/// Converts one image/label pair into a written record.
///
/// Pure transforms only between the load and the write; the two pairwise
/// builds share nothing and run on both sides of a `rayon::join`.
fn convert_one(
    config: &Config,
    surrounding: &OffsetPattern,
    above_below: &OffsetPattern,
    writer: &dyn RecordWriter,
    img_path: &Path,
    gt_dir: &Path,
    out_dir: &Path,
) -> PrepResult<PathBuf> {
    let stem = img_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            PrepError::Precondition(format!("image path {} has no stem", img_path.display()))
        })?;

    let num_classes = config.labels.num_classes as i32;
    let image = loader::load_normalized_image(img_path, config.channel_means())?;
    let labels = loader::load_class_map(gt_dir.join(format!("{stem}.bin")), &image)?;
    labels.validate_range(num_classes)?;

    let unary = subsample(
        &labels,
        config.labels.subsample_factor,
        config.labels.max_scale,
    )?;
    let (surrounding_map, above_below_map) = rayon::join(
        || generate_pairwise(&unary, surrounding, num_classes, config.labels.ignore_sentinel),
        || generate_pairwise(&unary, above_below, num_classes, config.labels.ignore_sentinel),
    );

    let record = TrainingRecord::assemble(
        stem,
        &image,
        &unary,
        &surrounding_map?,
        &above_below_map?,
    );
    writer.write(&record, out_dir)
}

/// Lists the image files directly under `dir`.
fn list_images(dir: &Path) -> PrepResult<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_image = path.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()));
        if is_image {
            images.push(path);
        }
    }
    Ok(images)
}

fn write_manifest(config: &Config, out_dir: &Path, summary: &SplitSummary) -> PrepResult<()> {
    let manifest = SplitManifest {
        split: summary.split.clone(),
        width: config.image.width,
        height: config.image.height,
        num_classes: config.labels.num_classes,
        subsample_factor: config.labels.subsample_factor,
        max_scale: config.labels.max_scale,
        ignore_sentinel: config.labels.ignore_sentinel,
        backend: config.storage.backend.clone(),
        converted: summary.converted,
        failed: summary.failed,
        created_at: Utc::now().to_rfc3339(),
    };
    let file = fs::File::create(out_dir.join("manifest.json"))?;
    serde_json::to_writer_pretty(file, &manifest)
        .map_err(|e| PrepError::Storage(format!("failed to write manifest: {e}")))
}
