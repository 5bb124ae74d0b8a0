//! Command handler for the shotdiff CLI.
//!
//! The handler writes its progress to a caller-supplied writer and returns
//! the process exit code, so it can be tested without spawning a process.

use std::io::Write;

use anyhow::{Context, Result};

use crate::batch::{self, BatchConfig};
use crate::model::ReportSummary;
use crate::report::{progress_line, HtmlFormatter, TextFormatter};

/// Exit code for a run whose report passed.
pub const EXIT_PASSED: u8 = 0;
/// Exit code for a run with differences (or, in strict mode, gaps).
pub const EXIT_FAILED: u8 = 1;

/// Parse and validate a `--threshold` value.
pub fn parse_threshold(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("threshold must be between 0 and 1, got {value}"));
    }
    Ok(value)
}

/// Exit code for a finished run.
///
/// `passedVisualTest` alone decides by default, which means a run where
/// nothing could be compared still passes. `strict` additionally fails runs
/// with missing candidates or comparison errors.
#[must_use]
pub fn exit_code(summary: &ReportSummary, strict: bool) -> u8 {
    if !summary.passed_visual_test || (strict && summary.has_incomplete()) {
        EXIT_FAILED
    } else {
        EXIT_PASSED
    }
}

/// Run a batch comparison, printing a line per screen and a final summary.
pub fn cmd_compare(config: &BatchConfig, strict: bool, out: &mut dyn Write) -> Result<u8> {
    writeln!(
        out,
        "Comparing {} against {}",
        config.candidate_dir.display(),
        config.baseline_dir.display()
    )?;

    let mut write_err = None;
    let report = batch::run_batch(config, &HtmlFormatter::default(), &mut |result| {
        if write_err.is_none() {
            if let Err(e) = writeln!(out, "  {}", progress_line(result)) {
                write_err = Some(e);
            }
        }
    })
    .context("Visual comparison failed")?;
    if let Some(e) = write_err {
        return Err(e).context("Failed to write progress");
    }

    writeln!(out)?;
    write!(out, "{}", report.format(&TextFormatter))?;
    writeln!(
        out,
        "Reports written to {}",
        config
            .output_dir
            .join(batch::HTML_REPORT)
            .display()
    )?;

    let code = exit_code(&report.summary, strict);
    if strict && report.summary.has_incomplete() {
        writeln!(
            out,
            "Strict mode: {} missing, {} errors",
            report.summary.missing, report.summary.errors
        )?;
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComparisonResult, Dimensions};

    fn summary(results: &[ComparisonResult]) -> ReportSummary {
        ReportSummary::from_results(results)
    }

    fn compared(diff: u64) -> ComparisonResult {
        let dims = Dimensions::new(10, 10);
        ComparisonResult::compared("s".into(), dims, diff, dims, dims, None)
    }

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("0.1"), Ok(0.1));
        assert_eq!(parse_threshold("0"), Ok(0.0));
        assert_eq!(parse_threshold("1"), Ok(1.0));
        assert!(parse_threshold("1.5").is_err());
        assert!(parse_threshold("-0.1").is_err());
        assert!(parse_threshold("abc").is_err());
    }

    #[test]
    fn test_exit_code_pass_and_fail() {
        assert_eq!(exit_code(&summary(&[compared(0)]), false), EXIT_PASSED);
        assert_eq!(
            exit_code(&summary(&[compared(0), compared(3)]), false),
            EXIT_FAILED
        );
    }

    #[test]
    fn test_exit_code_strict_mode() {
        let results = [
            compared(0),
            ComparisonResult::missing("gone".into(), "missing".into()),
        ];
        assert_eq!(exit_code(&summary(&results), false), EXIT_PASSED);
        assert_eq!(exit_code(&summary(&results), true), EXIT_FAILED);
    }

    #[test]
    fn test_cmd_compare_missing_baseline_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = BatchConfig {
            baseline_dir: dir.path().join("web"),
            candidate_dir: dir.path().join("mobile"),
            output_dir: dir.path().join("diff"),
            ..Default::default()
        };
        let mut out = Vec::new();
        let err = cmd_compare(&config, false, &mut out).unwrap_err();
        assert!(format!("{err:#}").contains("Baseline directory not found"));
        assert!(!dir.path().join("diff").exists());
    }

    #[test]
    fn test_cmd_compare_empty_baseline_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("web")).unwrap();
        let config = BatchConfig {
            baseline_dir: dir.path().join("web"),
            candidate_dir: dir.path().join("mobile"),
            output_dir: dir.path().join("diff"),
            ..Default::default()
        };
        let mut out = Vec::new();
        let code = cmd_compare(&config, false, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(code, EXIT_PASSED);
        assert!(out.contains("Screens:       0"));
        assert!(dir.path().join("diff").join(batch::JSON_REPORT).exists());
        assert!(dir.path().join("diff").join(batch::HTML_REPORT).exists());
    }
}
