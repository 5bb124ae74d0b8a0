//! Perceptual pixel comparison of two screenshots.
//!
//! Pixels are compared in YIQ color space after blending each over white by
//! its alpha. A pixel differs when the squared YIQ distance exceeds
//! `MAX_YIQ_DELTA * threshold²`. Only the top-left overlap of the two images
//! is compared; nothing outside it is read.
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};

use crate::error::{Result, ShotdiffError};
use crate::model::{percentage, Dimensions};

/// Upper bound of the squared YIQ distance between two colors.
pub const MAX_YIQ_DELTA: f64 = 35215.0;

/// Options for a single pairwise comparison.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Color distance tolerance on a 0-1 scale. Smaller is stricter.
    pub threshold: f64,
    /// Treat anti-aliased edge pixels as matching. Off by default, in which
    /// case they are compared like any other pixel.
    pub detect_antialiasing: bool,
    /// Opacity of the faded baseline drawn behind the highlights (0-1).
    pub alpha: f64,
    /// Highlight for differing pixels.
    pub diff_color: [u8; 3],
    /// Highlight for pixels classified as anti-aliasing.
    pub aa_color: [u8; 3],
    /// Write the diff image even when no pixel differs.
    pub write_identical_diff: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            detect_antialiasing: false,
            alpha: 0.1,
            diff_color: [255, 0, 0],
            aa_color: [255, 255, 0],
            write_identical_diff: true,
        }
    }
}

impl CompareOptions {
    /// Sets the color distance threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Enables or disables anti-aliasing detection.
    pub fn with_detect_antialiasing(mut self, detect: bool) -> Self {
        self.detect_antialiasing = detect;
        self
    }

    /// Controls whether identical pairs still get a diff image.
    pub fn with_write_identical_diff(mut self, write: bool) -> Self {
        self.write_identical_diff = write;
        self
    }

    fn max_delta(&self) -> f64 {
        MAX_YIQ_DELTA * self.threshold * self.threshold
    }
}

/// Pixel-level outcome of comparing two in-memory images.
#[derive(Debug, Clone)]
pub struct PixelDiff {
    /// Size of the compared overlap region.
    pub overlap: Dimensions,
    pub diff_pixels: u64,
    /// Rendered diff covering the overlap region.
    pub diff_image: RgbaImage,
}

impl PixelDiff {
    #[must_use]
    pub fn total_pixels(&self) -> u64 {
        self.overlap.pixels()
    }

    #[must_use]
    pub fn is_identical(&self) -> bool {
        self.diff_pixels == 0
    }
}

/// Outcome of comparing two screenshot files.
#[derive(Debug, Clone)]
pub struct PairComparison {
    pub overlap: Dimensions,
    pub total_pixels: u64,
    pub diff_pixels: u64,
    pub diff_percentage: f64,
    pub baseline_dimensions: Dimensions,
    pub candidate_dimensions: Dimensions,
    /// Where the diff image was written, if it was.
    pub diff_image_path: Option<PathBuf>,
}

impl PairComparison {
    #[must_use]
    pub fn is_identical(&self) -> bool {
        self.diff_pixels == 0
    }
}

/// Compare the overlapping region of two decoded images.
pub fn compare_images(
    baseline: &RgbaImage,
    candidate: &RgbaImage,
    options: &CompareOptions,
) -> Result<PixelDiff> {
    let base_dims = Dimensions::new(baseline.width(), baseline.height());
    let cand_dims = Dimensions::new(candidate.width(), candidate.height());
    let overlap = base_dims.overlap(&cand_dims);

    if overlap.pixels() == 0 && (base_dims.pixels() > 0 || cand_dims.pixels() > 0) {
        return Err(ShotdiffError::EmptyOverlap {
            baseline: (base_dims.width, base_dims.height),
            candidate: (cand_dims.width, cand_dims.height),
        });
    }

    let mut output = RgbaImage::new(overlap.width, overlap.height);
    let max_delta = options.max_delta();
    let mut diff_pixels = 0u64;

    for y in 0..overlap.height {
        for x in 0..overlap.width {
            let a = baseline.get_pixel(x, y);
            let b = candidate.get_pixel(x, y);
            let delta = color_delta(a, b, false);

            if delta.abs() > max_delta {
                let antialiased = options.detect_antialiasing
                    && (is_antialiased(baseline, candidate, x, y, overlap)
                        || is_antialiased(candidate, baseline, x, y, overlap));
                if antialiased {
                    output.put_pixel(x, y, opaque(options.aa_color));
                } else {
                    output.put_pixel(x, y, opaque(options.diff_color));
                    diff_pixels += 1;
                }
            } else {
                output.put_pixel(x, y, faded(a, options.alpha));
            }
        }
    }

    Ok(PixelDiff {
        overlap,
        diff_pixels,
        diff_image: output,
    })
}

/// Decode two PNG files, compare them, and optionally write the diff image.
///
/// The diff image is written whenever `diff_out` is given, including for
/// identical images unless `write_identical_diff` is off. A 0x0 overlap
/// produces no diff image.
pub fn compare_files(
    baseline_path: &Path,
    candidate_path: &Path,
    diff_out: Option<&Path>,
    options: &CompareOptions,
) -> Result<PairComparison> {
    let baseline = decode_png(baseline_path)?;
    let candidate = decode_png(candidate_path)?;
    let diff = compare_images(&baseline, &candidate, options)?;

    let diff_image_path = match diff_out {
        Some(path)
            if diff.total_pixels() > 0
                && (options.write_identical_diff || !diff.is_identical()) =>
        {
            diff.diff_image
                .save_with_format(path, image::ImageFormat::Png)
                .map_err(|source| ShotdiffError::ImageEncode {
                    path: path.to_path_buf(),
                    source,
                })?;
            Some(path.to_path_buf())
        }
        _ => None,
    };

    Ok(PairComparison {
        overlap: diff.overlap,
        total_pixels: diff.total_pixels(),
        diff_pixels: diff.diff_pixels,
        diff_percentage: percentage(diff.diff_pixels, diff.total_pixels()),
        baseline_dimensions: Dimensions::new(baseline.width(), baseline.height()),
        candidate_dimensions: Dimensions::new(candidate.width(), candidate.height()),
        diff_image_path,
    })
}

/// Read a file and decode it as PNG into RGBA8.
pub fn decode_png(path: &Path) -> Result<RgbaImage> {
    let decode_err = |source| ShotdiffError::ImageDecode {
        path: path.to_path_buf(),
        source,
    };
    let bytes = std::fs::read(path).map_err(|e| decode_err(image::ImageError::IoError(e)))?;
    let img = image::load_from_memory_with_format(&bytes, image::ImageFormat::Png)
        .map_err(decode_err)?;
    Ok(img.to_rgba8())
}

fn opaque([r, g, b]: [u8; 3]) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}

/// Grayscale copy of a pixel, faded towards white.
fn faded(p: &Rgba<u8>, alpha: f64) -> Rgba<u8> {
    let [r, g, b, a] = p.0;
    let luma = rgb_to_y(f64::from(r), f64::from(g), f64::from(b));
    let v = blend(luma, alpha * f64::from(a) / 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba([v, v, v, 255])
}

fn blend(c: f64, a: f64) -> f64 {
    255.0 + (c - 255.0) * a
}

fn rgb_to_y(r: f64, g: f64, b: f64) -> f64 {
    r * 0.298_895_31 + g * 0.586_622_47 + b * 0.114_482_23
}

fn rgb_to_i(r: f64, g: f64, b: f64) -> f64 {
    r * 0.595_977_99 - g * 0.274_176_10 - b * 0.321_801_89
}

fn rgb_to_q(r: f64, g: f64, b: f64) -> f64 {
    r * 0.211_470_17 - g * 0.522_617_11 + b * 0.311_146_94
}

/// Blend a pixel over white by its alpha, returning `(r, g, b)`.
fn over_white(p: &Rgba<u8>) -> (f64, f64, f64) {
    let [r, g, b, a] = p.0;
    let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
    if a == 255 {
        return (r, g, b);
    }
    let a = f64::from(a) / 255.0;
    (blend(r, a), blend(g, a), blend(b, a))
}

/// Squared YIQ distance between two pixels. The sign is negative when the
/// first pixel is brighter. With `luma_only` the signed brightness difference
/// is returned instead.
fn color_delta(p1: &Rgba<u8>, p2: &Rgba<u8>, luma_only: bool) -> f64 {
    if p1 == p2 {
        return 0.0;
    }
    let (r1, g1, b1) = over_white(p1);
    let (r2, g2, b2) = over_white(p2);

    let y1 = rgb_to_y(r1, g1, b1);
    let y2 = rgb_to_y(r2, g2, b2);
    let y = y1 - y2;
    if luma_only {
        return y;
    }

    let i = rgb_to_i(r1, g1, b1) - rgb_to_i(r2, g2, b2);
    let q = rgb_to_q(r1, g1, b1) - rgb_to_q(r2, g2, b2);
    let delta = 0.5053 * y * y + 0.299 * i * i + 0.1957 * q * q;
    if y1 > y2 {
        -delta
    } else {
        delta
    }
}

/// 3x3 neighbourhood of `(x, y)` clipped to `bounds`, excluding the centre.
/// The flag is true when the pixel lies on the edge of the bounds.
fn neighbours(x: u32, y: u32, bounds: Dimensions) -> (bool, impl Iterator<Item = (u32, u32)>) {
    let x0 = x.saturating_sub(1);
    let y0 = y.saturating_sub(1);
    let x2 = (x + 1).min(bounds.width - 1);
    let y2 = (y + 1).min(bounds.height - 1);
    let on_edge = x == x0 || x == x2 || y == y0 || y == y2;
    let iter = (x0..=x2)
        .flat_map(move |nx| (y0..=y2).map(move |ny| (nx, ny)))
        .filter(move |&(nx, ny)| nx != x || ny != y);
    (on_edge, iter)
}

/// Whether the pixel at `(x, y)` in `img` looks like an anti-aliased edge
/// between two flat regions that also exist in `other`.
fn is_antialiased(img: &RgbaImage, other: &RgbaImage, x: u32, y: u32, bounds: Dimensions) -> bool {
    let (on_edge, around) = neighbours(x, y, bounds);
    let center = img.get_pixel(x, y);
    let mut zeroes = u32::from(on_edge);
    let mut min = 0.0;
    let mut max = 0.0;
    let mut min_at = None;
    let mut max_at = None;

    for (nx, ny) in around {
        let delta = color_delta(center, img.get_pixel(nx, ny), true);
        if delta == 0.0 {
            zeroes += 1;
            if zeroes > 2 {
                return false;
            }
        } else if delta < min {
            min = delta;
            min_at = Some((nx, ny));
        } else if delta > max {
            max = delta;
            max_at = Some((nx, ny));
        }
    }

    let (Some(min_at), Some(max_at)) = (min_at, max_at) else {
        return false;
    };

    let flat_in_both = |(px, py): (u32, u32)| {
        has_many_siblings(img, px, py, bounds) && has_many_siblings(other, px, py, bounds)
    };
    flat_in_both(min_at) || flat_in_both(max_at)
}

/// Whether at least three neighbours have exactly the same color.
fn has_many_siblings(img: &RgbaImage, x: u32, y: u32, bounds: Dimensions) -> bool {
    let (on_edge, around) = neighbours(x, y, bounds);
    let center = img.get_pixel(x, y);
    let mut zeroes = u32::from(on_edge);
    for (nx, ny) in around {
        if img.get_pixel(nx, ny) == center {
            zeroes += 1;
        }
        if zeroes > 2 {
            return true;
        }
    }
    false
}
