use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use shotdiff::batch::{
    BatchConfig, DEFAULT_BASELINE_DIR, DEFAULT_CANDIDATE_DIR, DEFAULT_OUTPUT_DIR,
};
use shotdiff::cli;
use shotdiff::compare::CompareOptions;

/// shotdiff — compare candidate screenshots against baselines and write
/// JSON and HTML visual regression reports.
#[derive(Parser)]
#[command(name = "shotdiff", version, about)]
struct Cli {
    /// Directory of baseline (web) screenshots.
    #[arg(default_value = DEFAULT_BASELINE_DIR)]
    baseline_dir: PathBuf,

    /// Directory of candidate (mobile) screenshots with matching file names.
    #[arg(default_value = DEFAULT_CANDIDATE_DIR)]
    candidate_dir: PathBuf,

    /// Where diff images and reports are written (created if missing).
    #[arg(default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Color distance threshold between 0 and 1 (smaller is stricter).
    #[arg(long, default_value_t = 0.1, value_parser = cli::parse_threshold)]
    threshold: f64,

    /// Ignore pixels that look like anti-aliased edges.
    #[arg(long)]
    detect_antialiasing: bool,

    /// Don't write diff images for identical screenshots.
    #[arg(long)]
    skip_identical_diffs: bool,

    /// Also fail when candidates are missing or images can't be compared.
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Cli::parse();

    let config = BatchConfig {
        baseline_dir: args.baseline_dir,
        candidate_dir: args.candidate_dir,
        output_dir: args.output_dir,
        compare: CompareOptions::default()
            .with_threshold(args.threshold)
            .with_detect_antialiasing(args.detect_antialiasing)
            .with_write_identical_diff(!args.skip_identical_diffs),
    };

    let code = cli::cmd_compare(&config, args.strict, &mut std::io::stdout().lock())?;
    Ok(ExitCode::from(code))
}
