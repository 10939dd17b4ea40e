//! Session types

use serde::Serialize;
use std::collections::BTreeMap;

/// Divisor converting the logged gain (milli-units) to physical units.
pub const GAIN_SCALE: f64 = 1000.0;

/// One recorded test session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    /// 1-based position among all blocks discovered in the file
    pub id: usize,
    /// Controller gain in physical units (`raw / 1000`)
    pub gain: f64,
    /// Height or yaw readings in recording order
    pub samples: Vec<i64>,
}

impl Session {
    /// Samples widened to `f64` for spectral analysis.
    pub fn samples_f64(&self) -> Vec<f64> {
        self.samples.iter().map(|&s| s as f64).collect()
    }
}

/// Gain / oscillation period pair for one session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionSummary {
    /// Ultimate gain candidate
    pub gain: f64,
    /// Oscillation period (seconds)
    pub period_s: f64,
}

/// Session id → (gain, period). Ordered so reports are deterministic.
pub type SessionResult = BTreeMap<usize, SessionSummary>;

/// Convert a logged milli-unit gain to physical units.
pub fn gain_from_raw(raw: i64) -> f64 {
    raw as f64 / GAIN_SCALE
}
