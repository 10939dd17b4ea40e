//! heli-tune - Helicopter Rig Oscillation Analysis
//!
//! Lists the ultimate gain and oscillation period of the most recent
//! sessions in each rig log.
//!
//! # Usage
//!
//! ```bash
//! # Every *.txt log in ./data, last session of each
//! heli-tune
//!
//! # Last three sessions of two specific logs, with Ziegler-Nichols settings
//! heli-tune --last 3 --zn logs/heli1.txt logs/heli2.txt
//!
//! # Machine-readable output
//! heli-tune --json --data-dir logs
//! ```
//!
//! # Environment Variables
//!
//! - `HELI_TUNE_CONFIG`: Path to a TOML config file
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use heli_tune::acquisition::{discover_log_files, heli_identifier, parse_sessions, SessionParser};
use heli_tune::config::HeliTuneConfig;
use heli_tune::processing::{find_dominant_frequencies, OscillationEstimator};
use heli_tune::report::{render_dump, render_json, FileReport};

/// Peaks listed per session by `--dump`.
const DUMP_PEAKS: usize = 3;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "heli-tune")]
#[command(about = "Ultimate gain / oscillation period extraction from helicopter rig logs")]
#[command(version)]
struct CliArgs {
    /// Log files to analyse. Defaults to every log in the data directory.
    files: Vec<PathBuf>,

    /// Directory scanned for logs (overrides `data.dir`)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Number of most recent sessions per file (overrides `report.last_sessions`)
    #[arg(short = 'n', long, value_name = "N")]
    last: Option<usize>,

    /// Sampling rate of the logged readings in Hz (overrides `acquisition.sampling_rate_hz`)
    #[arg(long, value_name = "HZ")]
    sampling_rate: Option<f64>,

    /// Path to a TOML config file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print a JSON array instead of the text report
    #[arg(long)]
    json: bool,

    /// Add Ziegler-Nichols P / PI / PID settings to each session
    #[arg(long)]
    zn: bool,

    /// List parsed sessions and their strongest spectral peaks instead of periods
    #[arg(long, conflicts_with = "json")]
    dump: bool,

    /// Stop at the first log that fails instead of skipping it
    #[arg(long)]
    strict: bool,
}

impl CliArgs {
    /// Fold command-line overrides into the loaded config.
    fn apply_overrides(&self, config: &mut HeliTuneConfig) {
        if let Some(dir) = &self.data_dir {
            config.data.dir = dir.clone();
        }
        if let Some(last) = self.last {
            config.report.last_sessions = last;
        }
        if let Some(rate) = self.sampling_rate {
            config.acquisition.sampling_rate_hz = rate;
        }
    }
}

// ============================================================================
// Per-file Processing
// ============================================================================

fn read_log(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn analyze_file(
    path: &Path,
    parser: &mut SessionParser,
    last_sessions: usize,
    with_tuning: bool,
) -> Result<FileReport> {
    let text = read_log(path)?;
    let analysis = parser
        .analyze(&text, last_sessions)
        .with_context(|| format!("Failed to analyse {}", path.display()))?;

    info!(
        path = %path.display(),
        total_sessions = analysis.total_sessions,
        reported = analysis.sessions.len(),
        "Log analysed"
    );

    Ok(FileReport::new(
        path,
        heli_identifier(&text),
        analysis.total_sessions,
        &analysis.sessions,
        with_tuning,
    ))
}

fn dump_file(path: &Path, estimator: &mut OscillationEstimator, last_sessions: usize) -> Result<String> {
    let text = read_log(path)?;
    let sessions = parse_sessions(&text, last_sessions)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let peaks: Vec<Vec<(f64, f64)>> = sessions
        .iter()
        .map(|session| match estimator.spectrum(&session.samples_f64()) {
            Ok(spectrum) => find_dominant_frequencies(&spectrum, DUMP_PEAKS),
            Err(e) => {
                warn!(session = session.id, error = %e, "No spectrum");
                Vec::new()
            }
        })
        .collect();

    Ok(render_dump(path, &sessions, &peaks))
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let mut config =
        HeliTuneConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply_overrides(&mut config);
    config.validate().context("Invalid settings")?;

    let files = if args.files.is_empty() {
        discover_log_files(&config.data.dir, &config.data.extension)?
    } else {
        args.files.clone()
    };
    if files.is_empty() {
        warn!(dir = %config.data.dir.display(), ext = %config.data.extension, "No log files to analyse");
        return Ok(());
    }

    let rate = config.acquisition.sampling_rate_hz;
    let last_sessions = config.report.last_sessions;
    info!(files = files.len(), sampling_rate_hz = rate, last_sessions, "Starting analysis");

    let mut parser = SessionParser::new(rate)?;
    let mut estimator = OscillationEstimator::new(rate)?;
    let mut reports = Vec::with_capacity(files.len());
    let mut failures = 0usize;

    for path in &files {
        let outcome = if args.dump {
            dump_file(path, &mut estimator, last_sessions).map(|text| print!("{text}"))
        } else {
            analyze_file(path, &mut parser, last_sessions, args.zn).map(|report| {
                if !args.json {
                    print!("{}", report.render_text());
                    println!();
                }
                reports.push(report);
            })
        };

        if let Err(e) = outcome {
            if args.strict {
                return Err(e);
            }
            error!(path = %path.display(), error = %format!("{e:#}"), "Skipping log");
            failures += 1;
        }
    }

    if args.json {
        println!("{}", render_json(&reports)?);
    }

    if failures > 0 {
        bail!("{failures} of {} log files failed", files.len());
    }
    Ok(())
}
