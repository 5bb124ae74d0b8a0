//! Report data types. A `ComparisonReport` is built fresh on every run and
//! serialized as the JSON report; field names follow the camelCase schema
//! that CI tooling consumes.

use serde::{Deserialize, Serialize};

/// Percentage of `part` in `total`, rounded half-up to two decimals.
///
/// Computed in integer hundredths so boundary values such as exactly 0.005%
/// always round up instead of depending on float representation. Returns 0.0
/// when the total is zero.
#[must_use]
pub fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let (part, total) = (u128::from(part), u128::from(total));
    let hundredths = (part * 20_000 + total) / (total * 2);
    hundredths as f64 / 100.0
}

/// Width and height of an image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// The top-left region shared by both sizes.
    #[must_use]
    pub fn overlap(&self, other: &Dimensions) -> Dimensions {
        Dimensions::new(self.width.min(other.width), self.height.min(other.height))
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Outcome of comparing one screenshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonStatus {
    Identical,
    Different,
    MissingMobile,
    Error,
}

impl ComparisonStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonStatus::Identical => "identical",
            ComparisonStatus::Different => "different",
            ComparisonStatus::MissingMobile => "missing_mobile",
            ComparisonStatus::Error => "error",
        }
    }

    /// Whether the screen's pixels count towards the overall percentage.
    pub fn is_compared(&self) -> bool {
        matches!(
            self,
            ComparisonStatus::Identical | ComparisonStatus::Different
        )
    }
}

impl std::fmt::Display for ComparisonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the report, keyed by screen name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub screen: String,
    pub status: ComparisonStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pixels: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_pixels: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_dimensions: Option<Dimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_dimensions: Option<Dimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComparisonResult {
    fn bare(screen: String, status: ComparisonStatus) -> Self {
        Self {
            screen,
            status,
            width: None,
            height: None,
            total_pixels: None,
            diff_pixels: None,
            diff_percentage: None,
            web_dimensions: None,
            mobile_dimensions: None,
            diff_image_path: None,
            error: None,
        }
    }

    /// A screen whose candidate screenshot does not exist.
    pub fn missing(screen: String, message: String) -> Self {
        Self {
            error: Some(message),
            ..Self::bare(screen, ComparisonStatus::MissingMobile)
        }
    }

    /// A screen whose comparison failed.
    pub fn failed(screen: String, message: String) -> Self {
        Self {
            error: Some(message),
            ..Self::bare(screen, ComparisonStatus::Error)
        }
    }

    /// A screen that was compared; status follows from the pixel count.
    pub fn compared(
        screen: String,
        overlap: Dimensions,
        diff_pixels: u64,
        web: Dimensions,
        mobile: Dimensions,
        diff_image_path: Option<String>,
    ) -> Self {
        let total = overlap.pixels();
        let status = if diff_pixels == 0 {
            ComparisonStatus::Identical
        } else {
            ComparisonStatus::Different
        };
        Self {
            width: Some(overlap.width),
            height: Some(overlap.height),
            total_pixels: Some(total),
            diff_pixels: Some(diff_pixels),
            diff_percentage: Some(percentage(diff_pixels, total)),
            web_dimensions: Some(web),
            mobile_dimensions: Some(mobile),
            diff_image_path,
            ..Self::bare(screen, status)
        }
    }

    /// Pixels that count towards the overall aggregate: `(diff, total)`.
    #[must_use]
    pub fn aggregate_pixels(&self) -> (u64, u64) {
        if !self.status.is_compared() {
            return (0, 0);
        }
        (
            self.diff_pixels.unwrap_or(0),
            self.total_pixels.unwrap_or(0),
        )
    }
}

/// Summary counts across all screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_screens: usize,
    pub identical: usize,
    pub different: usize,
    pub errors: usize,
    pub missing: usize,
    pub overall_diff_percentage: f64,
    pub passed_visual_test: bool,
}

impl ReportSummary {
    /// Tally statuses and aggregate pixel totals.
    ///
    /// The overall percentage is total differing pixels over total compared
    /// pixels, not a mean of per-screen percentages. Screens that were not
    /// compared contribute nothing, so a run with no compared pixels reports
    /// 0% and passes. The gate is decided on the raw differing pixel count,
    /// so a single differing pixel fails even when the rounded percentage
    /// shows 0.00.
    pub fn from_results(results: &[ComparisonResult]) -> Self {
        let mut summary = ReportSummary {
            total_screens: results.len(),
            identical: 0,
            different: 0,
            errors: 0,
            missing: 0,
            overall_diff_percentage: 0.0,
            passed_visual_test: false,
        };
        let mut diff_pixels = 0u64;
        let mut total_pixels = 0u64;

        for r in results {
            match r.status {
                ComparisonStatus::Identical => summary.identical += 1,
                ComparisonStatus::Different => summary.different += 1,
                ComparisonStatus::MissingMobile => summary.missing += 1,
                ComparisonStatus::Error => summary.errors += 1,
            }
            let (diff, total) = r.aggregate_pixels();
            diff_pixels += diff;
            total_pixels += total;
        }

        summary.overall_diff_percentage = percentage(diff_pixels, total_pixels);
        summary.passed_visual_test = diff_pixels == 0;
        summary
    }

    /// True when some screens could not be compared at all.
    #[must_use]
    pub fn has_incomplete(&self) -> bool {
        self.missing > 0 || self.errors > 0
    }
}

/// The complete result of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// ISO-8601 generation time.
    pub timestamp: String,
    pub summary: ReportSummary,
    pub results: Vec<ComparisonResult>,
}

impl ComparisonReport {
    /// Build the report, sorting results by screen name.
    pub fn new(timestamp: String, mut results: Vec<ComparisonResult>) -> Self {
        let summary = ReportSummary::from_results(&results);
        results.sort_by(|a, b| a.screen.cmp(&b.screen));
        Self {
            timestamp,
            summary,
            results,
        }
    }
}
