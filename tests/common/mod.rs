#![allow(dead_code)]

use std::path::Path;

use image::{Rgba, RgbaImage};
use shotdiff::batch::BatchConfig;
use tempfile::TempDir;

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

/// Create fresh baseline/candidate directories under a temp dir, returning
/// the dir handle and a config pointing at them. The output directory is not
/// created. The caller must hold onto `TempDir` to keep it alive.
pub fn setup_dirs() -> (TempDir, BatchConfig) {
    let dir = tempfile::tempdir().unwrap();
    let config = BatchConfig {
        baseline_dir: dir.path().join("web"),
        candidate_dir: dir.path().join("mobile"),
        output_dir: dir.path().join("diff"),
        ..Default::default()
    };
    std::fs::create_dir(&config.baseline_dir).unwrap();
    std::fs::create_dir(&config.candidate_dir).unwrap();
    (dir, config)
}

pub fn solid(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_pixel(width, height, color)
}

/// White canvas with a `size`x`size` square of `color` at (`x`, `y`).
pub fn with_square(width: u32, height: u32, x: u32, y: u32, size: u32, color: Rgba<u8>) -> RgbaImage {
    let mut img = solid(width, height, WHITE);
    for py in y..y + size {
        for px in x..x + size {
            img.put_pixel(px, py, color);
        }
    }
    img
}

pub fn write_png(path: &Path, img: &RgbaImage) {
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}
