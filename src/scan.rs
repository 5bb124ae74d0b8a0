//! Discovery of baseline screenshots and their candidates.
//!
//! Only the top level of the baseline directory is listed; subdirectories
//! are not recursed into. The `.png` suffix match is case-sensitive, so
//! `HOME.PNG` is ignored.
use std::path::{Path, PathBuf};

use crate::error::{Result, ShotdiffError};

const PNG_SUFFIX: &str = ".png";

/// List baseline screenshot file names in directory listing order.
pub fn list_baselines(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(ShotdiffError::BaselineDirMissing(dir.to_path_buf()));
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        // Follows symlinks, matching how candidates are looked up.
        if !entry.path().is_file() {
            continue;
        }
        // Non-UTF-8 names cannot be reported as screen names.
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            log::warn!("Skipping non UTF-8 file name in {}", dir.display());
            continue;
        };
        if is_screenshot(&name) {
            names.push(name);
        }
    }
    Ok(names)
}

/// Whether a file name looks like a screenshot we compare.
pub fn is_screenshot(file_name: &str) -> bool {
    file_name.len() > PNG_SUFFIX.len() && file_name.ends_with(PNG_SUFFIX)
}

/// Path of the candidate matching `file_name`, if it exists.
pub fn candidate_for(candidate_dir: &Path, file_name: &str) -> Option<PathBuf> {
    let path = candidate_dir.join(file_name);
    path.is_file().then_some(path)
}

/// Screen name for a screenshot file: the file name without its extension.
pub fn screen_name(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(idx) => &file_name[..idx],
    }
}

/// Name of the diff image written for `file_name`.
pub fn diff_file_name(file_name: &str) -> String {
    format!("diff-{file_name}")
}

/// Where the diff image for `file_name` is written.
pub fn diff_path_for(output_dir: &Path, file_name: &str) -> PathBuf {
    output_dir.join(diff_file_name(file_name))
}
