use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use tempfile::NamedTempFile;

use crate::compare::{self, CompareOptions};
use crate::error::{Result, ShotdiffError};
use crate::model::{ComparisonReport, ComparisonResult};
use crate::report::HtmlFormatter;
use crate::scan;

pub const DEFAULT_BASELINE_DIR: &str = "tests/visual/web";
pub const DEFAULT_CANDIDATE_DIR: &str = "tests/visual/mobile";
pub const DEFAULT_OUTPUT_DIR: &str = "tests/visual/diff";

pub const JSON_REPORT: &str = "comparison-report.json";
pub const HTML_REPORT: &str = "comparison-report.html";

/// Directories and comparison settings for one batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub baseline_dir: PathBuf,
    pub candidate_dir: PathBuf,
    pub output_dir: PathBuf,
    pub compare: CompareOptions,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            baseline_dir: PathBuf::from(DEFAULT_BASELINE_DIR),
            candidate_dir: PathBuf::from(DEFAULT_CANDIDATE_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            compare: CompareOptions::default(),
        }
    }
}

/// Compare every baseline screenshot against its candidate and write the
/// JSON and HTML reports into the output directory.
///
/// Screens are processed one at a time in directory listing order and
/// `on_result` is called as each one settles. A missing candidate or an
/// undecodable image is recorded in the report and does not stop the run;
/// a missing baseline directory or an unwritable output directory does.
/// The reports are only written after every screen has been processed.
pub fn run_batch(
    config: &BatchConfig,
    html: &HtmlFormatter,
    on_result: &mut dyn FnMut(&ComparisonResult),
) -> Result<ComparisonReport> {
    let baselines = scan::list_baselines(&config.baseline_dir)?;
    std::fs::create_dir_all(&config.output_dir).map_err(|source| ShotdiffError::OutputDir {
        path: config.output_dir.clone(),
        source,
    })?;
    log::debug!(
        "Found {} baseline screenshots in {}",
        baselines.len(),
        config.baseline_dir.display()
    );

    let mut results = Vec::with_capacity(baselines.len());
    for file_name in &baselines {
        let result = compare_screen(config, file_name);
        on_result(&result);
        results.push(result);
    }

    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let report = ComparisonReport::new(timestamp, results);
    write_reports(&report, &config.output_dir, html)?;
    Ok(report)
}

/// Compare a single baseline file against its candidate.
pub fn compare_screen(config: &BatchConfig, file_name: &str) -> ComparisonResult {
    let screen = scan::screen_name(file_name).to_string();
    let baseline = config.baseline_dir.join(file_name);

    let Some(candidate) = scan::candidate_for(&config.candidate_dir, file_name) else {
        let expected = config.candidate_dir.join(file_name);
        log::debug!("No candidate for {screen} at {}", expected.display());
        return ComparisonResult::missing(
            screen,
            format!("Mobile screenshot not found: {}", expected.display()),
        );
    };

    let diff_out = scan::diff_path_for(&config.output_dir, file_name);
    match compare::compare_files(&baseline, &candidate, Some(&diff_out), &config.compare) {
        Ok(pair) => ComparisonResult::compared(
            screen,
            pair.overlap,
            pair.diff_pixels,
            pair.baseline_dimensions,
            pair.candidate_dimensions,
            pair.diff_image_path.map(|p| p.display().to_string()),
        ),
        Err(e) => {
            log::warn!("Comparison of {screen} failed: {e}");
            ComparisonResult::failed(screen, e.to_string())
        }
    }
}

/// Write the JSON and HTML reports, returning their paths.
pub fn write_reports(
    report: &ComparisonReport,
    output_dir: &Path,
    html: &HtmlFormatter,
) -> Result<(PathBuf, PathBuf)> {
    let json_path = output_dir.join(JSON_REPORT);
    let html_path = output_dir.join(HTML_REPORT);

    let json = serde_json::to_string_pretty(report)?;
    write_atomic(&json_path, json.as_bytes())?;
    write_atomic(&html_path, report.format(html).as_bytes())?;

    Ok((json_path, html_path))
}

/// Load a previously written JSON report.
pub fn read_report(path: &Path) -> Result<ComparisonReport> {
    let content = std::fs::read(path)?;
    Ok(serde_json::from_slice(&content)?)
}

/// Write through a temporary file in the same directory, then rename it
/// into place so a reader never sees a partial file.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
