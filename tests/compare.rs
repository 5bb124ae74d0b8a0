mod common;

use common::{solid, with_square, write_png, BLUE, RED, WHITE};
use shotdiff::compare::{compare_files, decode_png, CompareOptions};
use shotdiff::error::ShotdiffError;
use shotdiff::model::Dimensions;

#[test]
fn byte_identical_files_are_identical() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.png");
    let b = dir.path().join("b.png");
    write_png(&a, &with_square(40, 30, 5, 5, 10, RED));
    std::fs::copy(&a, &b).unwrap();

    let pair = compare_files(&a, &b, None, &CompareOptions::default()).unwrap();
    assert_eq!(pair.diff_pixels, 0);
    assert_eq!(pair.diff_percentage, 0.0);
    assert!(pair.is_identical());
    assert_eq!(pair.diff_image_path, None);
}

#[test]
fn mismatched_sizes_compare_the_overlap() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.png");
    let b = dir.path().join("b.png");
    write_png(&a, &solid(100, 100, WHITE));
    // Only the part outside the overlap differs.
    let mut tall = solid(50, 200, WHITE);
    for y in 100..200 {
        for x in 0..50 {
            tall.put_pixel(x, y, RED);
        }
    }
    write_png(&b, &tall);

    let pair = compare_files(&a, &b, None, &CompareOptions::default()).unwrap();
    assert_eq!(pair.overlap, Dimensions::new(50, 100));
    assert_eq!(pair.total_pixels, 5000);
    assert_eq!(pair.diff_pixels, 0);
    assert_eq!(pair.baseline_dimensions, Dimensions::new(100, 100));
    assert_eq!(pair.candidate_dimensions, Dimensions::new(50, 200));
}

#[test]
fn recolored_square_counts_every_pixel() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("home.png");
    let b = dir.path().join("home-mobile.png");
    let diff = dir.path().join("diff-home.png");
    write_png(&a, &with_square(300, 300, 20, 40, 10, RED));
    write_png(&b, &with_square(300, 300, 20, 40, 10, BLUE));

    let pair = compare_files(&a, &b, Some(&diff), &CompareOptions::default()).unwrap();
    assert_eq!(pair.diff_pixels, 100);
    assert_eq!(pair.diff_percentage, 0.11);
    assert!(!pair.is_identical());
    assert_eq!(pair.diff_image_path.as_deref(), Some(diff.as_path()));

    let rendered = decode_png(&diff).unwrap();
    assert_eq!(rendered.dimensions(), (300, 300));
    assert_eq!(*rendered.get_pixel(25, 45), image::Rgba([255, 0, 0, 255]));
    assert_ne!(*rendered.get_pixel(0, 0), image::Rgba([255, 0, 0, 255]));
}

#[test]
fn identical_diff_image_written_unless_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.png");
    write_png(&a, &solid(8, 8, WHITE));
    let diff = dir.path().join("diff-a.png");

    compare_files(&a, &a, Some(&diff), &CompareOptions::default()).unwrap();
    assert!(diff.exists());
    std::fs::remove_file(&diff).unwrap();

    let options = CompareOptions::default().with_write_identical_diff(false);
    let pair = compare_files(&a, &a, Some(&diff), &options).unwrap();
    assert!(pair.is_identical());
    assert_eq!(pair.diff_image_path, None);
    assert!(!diff.exists());
}

#[test]
fn corrupt_candidate_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.png");
    let b = dir.path().join("b.png");
    write_png(&a, &solid(10, 10, WHITE));
    let bytes = std::fs::read(&a).unwrap();
    std::fs::write(&b, &bytes[..bytes.len() / 2]).unwrap();

    let err = compare_files(&a, &b, None, &CompareOptions::default()).unwrap_err();
    match &err {
        ShotdiffError::ImageDecode { path, .. } => assert_eq!(path, &b),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!err.to_string().is_empty());
}

#[test]
fn non_png_file_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.png");
    std::fs::write(&a, b"definitely not a png").unwrap();

    let err = decode_png(&a).unwrap_err();
    assert!(matches!(err, ShotdiffError::ImageDecode { .. }));
}

#[test]
fn missing_file_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = decode_png(&dir.path().join("gone.png")).unwrap_err();
    assert!(matches!(err, ShotdiffError::ImageDecode { .. }));
}
