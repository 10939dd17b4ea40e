//! Console reports
//!
//! Renders per-file session results as the plain-text listing engineers read
//! gains and periods from, or as JSON for scripting.

use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::config::defaults::REPORT_SEPARATOR_WIDTH;
use crate::tuning::ZieglerNichols;
use crate::types::{Session, SessionResult};

/// Label printed when a log has no heli identifier line.
pub const MISSING_HELI_LABEL: &str = "None";

/// One session's line items.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub id: usize,
    pub gain: f64,
    pub period_s: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ziegler_nichols: Option<ZieglerNichols>,
}

/// Report for one log file. Sessions are listed newest first.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub heli: Option<String>,
    pub total_sessions: usize,
    pub sessions: Vec<SessionReport>,
}

impl FileReport {
    /// Build a report; `with_tuning` adds Ziegler-Nichols settings per session.
    pub fn new(
        path: &Path,
        heli: Option<&str>,
        total_sessions: usize,
        results: &SessionResult,
        with_tuning: bool,
    ) -> Self {
        let sessions = results
            .iter()
            .rev()
            .map(|(&id, summary)| {
                let ziegler_nichols = if with_tuning {
                    match ZieglerNichols::from_session(summary) {
                        Ok(zn) => Some(zn),
                        Err(e) => {
                            tracing::warn!(session = id, error = %e, "No Ziegler-Nichols settings");
                            None
                        }
                    }
                } else {
                    None
                };
                SessionReport {
                    id,
                    gain: summary.gain,
                    period_s: summary.period_s,
                    ziegler_nichols,
                }
            })
            .collect();

        Self {
            path: path.to_path_buf(),
            heli: heli.map(str::to_string),
            total_sessions,
            sessions,
        }
    }

    /// Plain-text listing.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let heli = self.heli.as_deref().unwrap_or(MISSING_HELI_LABEL);

        let _ = writeln!(out, "{}", "-".repeat(REPORT_SEPARATOR_WIDTH));
        let _ = writeln!(out, "{} - {}", heli, self.path.display());
        let _ = writeln!(out, "{} sessions in total\n", self.total_sessions);

        for session in &self.sessions {
            let _ = writeln!(out, "Session {}:", session.id);
            let _ = writeln!(out, "Ultimate gain: {:?}", session.gain);
            let _ = writeln!(out, "Oscillation period (s): {:.3}", session.period_s);
            if let Some(zn) = &session.ziegler_nichols {
                let _ = writeln!(out, "Ziegler-Nichols:");
                let _ = writeln!(out, "  P:   Kp = {:.3}", zn.p.kp);
                let _ = writeln!(out, "  PI:  Kp = {:.3}  Ki = {:.3}", zn.pi.kp, zn.pi.ki);
                let _ = writeln!(
                    out,
                    "  PID: Kp = {:.3}  Ki = {:.3}  Kd = {:.3}",
                    zn.pid.kp, zn.pid.ki, zn.pid.kd
                );
            }
            out.push('\n');
        }

        out
    }
}

/// All file reports as a pretty-printed JSON array.
pub fn render_json(reports: &[FileReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}

/// Diagnostic listing of parsed sessions: sample counts and strongest peaks.
///
/// `peaks` holds `(frequency_hz, magnitude)` pairs per session, strongest first.
pub fn render_dump(path: &Path, sessions: &[Session], peaks: &[Vec<(f64, f64)>]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "-".repeat(REPORT_SEPARATOR_WIDTH));
    let _ = writeln!(out, "{}", path.display());

    for (session, session_peaks) in sessions.iter().zip(peaks) {
        let (min, max) = session
            .samples
            .iter()
            .fold((i64::MAX, i64::MIN), |(lo, hi), &s| (lo.min(s), hi.max(s)));
        if session.samples.is_empty() {
            let _ = writeln!(out, "Session {}: gain {:?}, no samples", session.id, session.gain);
        } else {
            let _ = writeln!(
                out,
                "Session {}: gain {:?}, {} samples (min {}, max {})",
                session.id,
                session.gain,
                session.samples.len(),
                min,
                max
            );
        }
        for (freq, mag) in session_peaks {
            let _ = writeln!(out, "  peak {freq:.3} Hz  |X| = {mag:.1}");
        }
    }

    out
}
