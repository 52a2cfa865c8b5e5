//! End-to-end conversion through temporary dataset directories: record
//! contents, per-image failure isolation, and the split manifest.

use crf_prep::config::{
    ApplicationConfig, Config, DatasetConfig, ImageConfig, LabelConfig, StorageConfig,
};
use crf_prep::dataset::{self, SplitManifest};
use crf_prep::record::read_record;
use image::{Rgb, RgbImage};
use std::path::Path;
use tempfile::TempDir;

const SIDE: u32 = 8;
const CLASSES: u32 = 4;
const FACTOR: u32 = 2;

fn test_config(root: &Path) -> Config {
    Config {
        application: ApplicationConfig {
            name: "crf_prep".to_string(),
            log_level: "error".to_string(),
        },
        labels: LabelConfig {
            num_classes: CLASSES,
            subsample_factor: FACTOR,
            max_scale: 1.0,
            ignore_sentinel: -1,
            surrounding_offsets: None,
            above_below_offsets: None,
        },
        image: ImageConfig {
            width: SIDE,
            height: SIDE,
            r_mean: 10.0,
            g_mean: 0.0,
            b_mean: 0.0,
        },
        dataset: DatasetConfig {
            dataset_dir: root.join("data"),
            save_dir: root.join("out"),
            splits: vec!["val".to_string()],
            workers: 1,
        },
        storage: StorageConfig {
            backend: "bin".to_string(),
        },
    }
}

fn seed_split(config: &Config) {
    let base = config.dataset.dataset_dir.join("val").join("8x8");
    let img_dir = base.join("img");
    let gt_dir = base.join("gt_bin");
    std::fs::create_dir_all(&img_dir).unwrap();
    std::fs::create_dir_all(&gt_dir).unwrap();

    let mut rgb = RgbImage::new(SIDE, SIDE);
    for (x, y, pixel) in rgb.enumerate_pixels_mut() {
        *pixel = Rgb([(10 + x) as u8, (20 + y) as u8, 30]);
    }
    rgb.save(img_dir.join("frame_a.png")).unwrap();
    std::fs::write(gt_dir.join("frame_a.bin"), [2u8; (SIDE * SIDE) as usize]).unwrap();

    // Misaligned pair: the label file is too short for an 8x8 image.
    rgb.save(img_dir.join("frame_b.png")).unwrap();
    std::fs::write(gt_dir.join("frame_b.bin"), [1u8; 10]).unwrap();

    // Stray non-image files are not conversion inputs.
    std::fs::write(img_dir.join("notes.txt"), b"not an image").unwrap();
}

fn le_i32s(bytes: &[u8]) -> Vec<i32> {
    bytes
        .chunks_exact(4)
        .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[test]
fn converts_a_split_and_isolates_the_misaligned_image() {
    let root = TempDir::new().unwrap();
    let config = test_config(root.path());
    config.validate().unwrap();
    seed_split(&config);

    let summary = dataset::prepare_split(&config, "val").unwrap();
    assert_eq!(summary.converted, 1);
    assert_eq!(summary.failed, 1);

    let records_dir = config.dataset.save_dir.join("val").join("8x8").join("records");
    assert!(records_dir.join("frame_a.rec").exists());
    assert!(!records_dir.join("frame_b.rec").exists());

    let record = read_record(records_dir.join("frame_a.rec")).unwrap();
    assert_eq!(record.name, "frame_a");
    assert_eq!((record.height, record.width, record.depth), (8, 8, 3));

    // Image block: f32 per channel, mean-centered. Pixel (0, 0) red channel
    // was 10 with r_mean = 10.
    assert_eq!(record.rgb.len(), (SIDE * SIDE * 3 * 4) as usize);
    let first_red = f32::from_le_bytes([
        record.rgb[0],
        record.rgb[1],
        record.rgb[2],
        record.rgb[3],
    ]);
    assert_eq!(first_red, 0.0);

    // Unary block: the 8x8 constant-2 map halves to 4x4, labels preserved.
    let unary = le_i32s(&record.labels_unary);
    assert_eq!(unary.len(), 16);
    assert!(unary.iter().all(|&label| label == 2));

    // Pairwise blocks: (4, 4, channels) i32 grids. Every in-bounds pair on
    // the constant map encodes (2, 2) -> 2*4+2 = 10; boundary cells carry
    // the sentinel.
    let surrounding = le_i32s(&record.labels_binary_surrounding);
    assert_eq!(surrounding.len(), 16 * 6);
    assert!(surrounding.iter().all(|&cell| cell == 10 || cell == -1));
    assert!(surrounding.contains(&10));
    assert!(surrounding.contains(&-1));

    let above_below = le_i32s(&record.labels_binary_above_below);
    assert_eq!(above_below.len(), 16 * 2);
    // Exactly the top and bottom rows lose one vertical neighbor each.
    assert_eq!(above_below.iter().filter(|&&cell| cell == -1).count(), 8);
}

#[test]
fn split_manifest_reports_totals_and_settings() {
    let root = TempDir::new().unwrap();
    let config = test_config(root.path());
    seed_split(&config);

    dataset::prepare_split(&config, "val").unwrap();

    let manifest_path = config
        .dataset
        .save_dir
        .join("val")
        .join("8x8")
        .join("records")
        .join("manifest.json");
    let manifest: SplitManifest =
        serde_json::from_str(&std::fs::read_to_string(manifest_path).unwrap()).unwrap();
    assert_eq!(manifest.split, "val");
    assert_eq!(manifest.converted, 1);
    assert_eq!(manifest.failed, 1);
    assert_eq!(manifest.num_classes, CLASSES);
    assert_eq!(manifest.subsample_factor, FACTOR);
    assert_eq!(manifest.backend, "bin");
}

#[test]
fn unknown_backend_fails_before_touching_images() {
    let root = TempDir::new().unwrap();
    let mut config = test_config(root.path());
    config.storage.backend = "tfrecord".to_string();
    seed_split(&config);

    assert!(dataset::prepare_split(&config, "val").is_err());
}

#[test]
fn out_of_range_labels_fail_that_image_only() {
    let root = TempDir::new().unwrap();
    let config = test_config(root.path());
    seed_split(&config);

    // Labels >= num_classes violate the unary range contract.
    let gt_dir = config.dataset.dataset_dir.join("val").join("8x8").join("gt_bin");
    std::fs::write(gt_dir.join("frame_a.bin"), [200u8; (SIDE * SIDE) as usize]).unwrap();

    let summary = dataset::prepare_split(&config, "val").unwrap();
    assert_eq!(summary.converted, 0);
    assert_eq!(summary.failed, 2);
}
