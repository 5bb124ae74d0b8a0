use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShotdiffError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode image {}: {source}", path.display())]
    ImageDecode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to write diff image {}: {source}", path.display())]
    ImageEncode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error(
        "Nothing to compare: baseline is {}x{} but candidate is {}x{}",
        baseline.0, baseline.1, candidate.0, candidate.1
    )]
    EmptyOverlap {
        baseline: (u32, u32),
        candidate: (u32, u32),
    },

    #[error("Failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Baseline directory not found: {}", .0.display())]
    BaselineDirMissing(PathBuf),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ShotdiffError>;
