//! Output formatting for comparison reports.

use std::fmt::Write;

use chrono::{DateTime, Local};

use crate::model::{ComparisonReport, ComparisonResult, ComparisonStatus};

impl ComparisonReport {
    /// Format using a specific formatter.
    #[must_use]
    pub fn format(&self, formatter: &dyn ReportFormatter) -> String {
        formatter.format(self)
    }
}

/// Trait for formatting comparison reports.
pub trait ReportFormatter {
    /// Format the report to a string.
    fn format(&self, report: &ComparisonReport) -> String;
}

/// Render an ISO-8601 timestamp in the local time zone. Unparseable input is
/// returned unchanged.
pub fn local_timestamp(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(t) => t.with_timezone(&Local).format("%c").to_string(),
        Err(_) => timestamp.to_string(),
    }
}

/// Escape HTML entities for safe embedding.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// One-line progress message for a settled screen.
#[must_use]
pub fn progress_line(result: &ComparisonResult) -> String {
    let screen = &result.screen;
    match result.status {
        ComparisonStatus::Identical => format!("✓ {screen}: identical"),
        ComparisonStatus::Different => format!(
            "✗ {screen}: {} pixels different ({:.2}%)",
            result.diff_pixels.unwrap_or(0),
            result.diff_percentage.unwrap_or(0.0)
        ),
        ComparisonStatus::MissingMobile => format!("? {screen}: mobile screenshot missing"),
        ComparisonStatus::Error => format!(
            "! {screen}: {}",
            result.error.as_deref().unwrap_or("unknown error")
        ),
    }
}

/// Plain text summary printed at the end of a run.
pub struct TextFormatter;

impl ReportFormatter for TextFormatter {
    fn format(&self, report: &ComparisonReport) -> String {
        let s = &report.summary;
        let mut out = String::new();
        writeln!(out, "Visual comparison summary").unwrap();
        writeln!(out, "{}", "-".repeat(32)).unwrap();
        writeln!(out, "Screens:       {}", s.total_screens).unwrap();
        writeln!(out, "Identical:     {}", s.identical).unwrap();
        writeln!(out, "Different:     {}", s.different).unwrap();
        writeln!(out, "Missing:       {}", s.missing).unwrap();
        writeln!(out, "Errors:        {}", s.errors).unwrap();
        writeln!(out, "Overall diff:  {:.2}%", s.overall_diff_percentage).unwrap();
        let verdict = if s.passed_visual_test { "PASSED" } else { "FAILED" };
        writeln!(out, "Result:        {verdict}").unwrap();
        out
    }
}

/// Self-contained HTML report with inline styles.
pub struct HtmlFormatter {
    /// Renders the report timestamp in the page header.
    pub format_timestamp: fn(&str) -> String,
}

impl Default for HtmlFormatter {
    fn default() -> Self {
        Self {
            format_timestamp: local_timestamp,
        }
    }
}

const STYLE: &str = r#"
      body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif; margin: 0; padding: 24px; background: #f5f6f8; color: #1f2933; }
      header { margin-bottom: 24px; }
      h1 { margin: 0 0 4px 0; font-size: 24px; }
      .timestamp { color: #616e7c; }
      .summary { display: flex; gap: 16px; margin-bottom: 16px; }
      .counter { flex: 1; background: #fff; border-radius: 8px; padding: 16px; text-align: center; box-shadow: 0 1px 2px rgba(0,0,0,0.08); }
      .counter .value { font-size: 28px; font-weight: bold; }
      .counter .label { color: #616e7c; text-transform: uppercase; font-size: 12px; }
      .banner { padding: 12px 16px; border-radius: 8px; font-weight: bold; margin-bottom: 24px; }
      .banner.pass { background: #e3f9e5; color: #207227; }
      .banner.fail { background: #ffe3e3; color: #a61b1b; }
      .results { display: grid; grid-template-columns: repeat(auto-fill, minmax(320px, 1fr)); gap: 16px; }
      .card { background: #fff; border-radius: 8px; padding: 16px; box-shadow: 0 1px 2px rgba(0,0,0,0.08); }
      .card h3 { margin: 0 0 8px 0; font-size: 16px; word-break: break-all; }
      .badge { display: inline-block; padding: 2px 8px; border-radius: 12px; font-size: 12px; font-weight: bold; margin-bottom: 8px; }
      .badge.identical { background: #e3f9e5; color: #207227; }
      .badge.different { background: #fff3c4; color: #8d6708; }
      .badge.missing_mobile { background: #e6f6ff; color: #0b69a3; }
      .badge.error { background: #ffe3e3; color: #a61b1b; }
      .details { color: #3e4c59; font-size: 14px; }
      .error-message { font-family: monospace; white-space: pre-wrap; color: #a61b1b; }
      .diff-image img { max-width: 100%; margin-top: 8px; border: 1px solid #e4e7eb; }
"#;

impl ReportFormatter for HtmlFormatter {
    fn format(&self, report: &ComparisonReport) -> String {
        let s = &report.summary;
        let timestamp = escape_html(&(self.format_timestamp)(&report.timestamp));

        let mut html = String::new();
        write!(
            html,
            r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Visual Comparison Report</title>
    <style>{STYLE}    </style>
  </head>
  <body>
    <header>
      <h1>Visual Comparison Report</h1>
      <div class="timestamp">Generated {timestamp}</div>
    </header>
    <section class="summary">
      <div class="counter"><div class="value">{identical}</div><div class="label">Identical</div></div>
      <div class="counter"><div class="value">{different}</div><div class="label">Different</div></div>
      <div class="counter"><div class="value">{missing}</div><div class="label">Missing</div></div>
      <div class="counter"><div class="value">{errors}</div><div class="label">Errors</div></div>
    </section>
"#,
            identical = s.identical,
            different = s.different,
            missing = s.missing,
            errors = s.errors,
        )
        .unwrap();

        let pct = s.overall_diff_percentage;
        if s.passed_visual_test {
            writeln!(
                html,
                r#"    <div class="banner pass">PASSED: {pct:.2}% overall difference across {} screens</div>"#,
                s.total_screens
            )
            .unwrap();
        } else {
            writeln!(
                html,
                r#"    <div class="banner fail">FAILED: {pct:.2}% overall difference across {} screens</div>"#,
                s.total_screens
            )
            .unwrap();
        }

        html.push_str("    <section class=\"results\">\n");
        for result in &report.results {
            html.push_str(&result_card(result));
        }
        html.push_str("    </section>\n  </body>\n</html>\n");
        html
    }
}

fn status_label(status: ComparisonStatus) -> &'static str {
    match status {
        ComparisonStatus::Identical => "Identical",
        ComparisonStatus::Different => "Different",
        ComparisonStatus::MissingMobile => "Missing mobile",
        ComparisonStatus::Error => "Error",
    }
}

fn dimensions_text(result: &ComparisonResult) -> String {
    match (result.width, result.height) {
        (Some(w), Some(h)) => format!("{w}x{h}"),
        _ => "unknown size".to_string(),
    }
}

fn result_card(result: &ComparisonResult) -> String {
    let mut card = String::new();
    writeln!(
        card,
        r#"      <div class="card {status}">
        <h3>{screen}</h3>
        <span class="badge {status}">{label}</span>"#,
        status = result.status.as_str(),
        screen = escape_html(&result.screen),
        label = status_label(result.status),
    )
    .unwrap();

    match result.status {
        ComparisonStatus::Identical => {
            writeln!(
                card,
                r#"        <div class="details">{} &middot; 0 pixels different</div>"#,
                dimensions_text(result)
            )
            .unwrap();
        }
        ComparisonStatus::Different => {
            writeln!(
                card,
                r#"        <div class="details">{} &middot; {} pixels different ({:.2}%)</div>"#,
                dimensions_text(result),
                result.diff_pixels.unwrap_or(0),
                result.diff_percentage.unwrap_or(0.0)
            )
            .unwrap();
        }
        ComparisonStatus::MissingMobile => {
            card.push_str(
                "        <div class=\"details\">No mobile screenshot was found for this screen.</div>\n",
            );
        }
        ComparisonStatus::Error => {
            writeln!(
                card,
                r#"        <div class="details error-message">{}</div>"#,
                escape_html(result.error.as_deref().unwrap_or("unknown error"))
            )
            .unwrap();
        }
    }

    if let (Some(web), Some(mobile)) = (result.web_dimensions, result.mobile_dimensions) {
        if web != mobile {
            writeln!(
                card,
                r#"        <div class="details">Size mismatch: web {web}, mobile {mobile}</div>"#
            )
            .unwrap();
        }
    }

    // The HTML sits next to the diff images, so link by file name.
    if let Some(path) = &result.diff_image_path {
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(path.as_str());
        let src = escape_html(&file_name);
        writeln!(
            card,
            r#"        <a class="diff-image" href="{src}"><img src="{src}" alt="Diff for {}"></a>"#,
            escape_html(&result.screen)
        )
        .unwrap();
    }

    card.push_str("      </div>\n");
    card
}
