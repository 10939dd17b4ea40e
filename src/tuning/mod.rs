//! Ziegler-Nichols ultimate-cycle tuning
//!
//! Turns an ultimate gain `Ku` (the gain at which the rig sustained its
//! oscillation) and the oscillation period `Tu` into classic controller
//! settings:
//!
//! | rule | Kp       | Ti       | Td     |
//! |------|----------|----------|--------|
//! | P    | 0.50 Ku  | -        | -      |
//! | PI   | 0.45 Ku  | Tu / 1.2 | -      |
//! | PID  | 0.60 Ku  | Tu / 2   | Tu / 8 |
//!
//! with `Ki = Kp / Ti` and `Kd = Kp * Td`.

use serde::Serialize;
use thiserror::Error;

use crate::types::SessionSummary;

/// Tuning input errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TuningError {
    #[error("Invalid ultimate gain: {0} (must be finite and > 0)")]
    InvalidGain(f64),

    #[error("Invalid oscillation period: {0} s (must be finite and > 0)")]
    InvalidPeriod(f64),
}

/// Parallel-form controller gains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PidParameters {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

/// P, PI and PID settings derived from one (Ku, Tu) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZieglerNichols {
    pub ultimate_gain: f64,
    pub ultimate_period_s: f64,
    pub p: PidParameters,
    pub pi: PidParameters,
    pub pid: PidParameters,
}

impl ZieglerNichols {
    /// Apply the ultimate-cycle table to `ku` and `tu` (seconds).
    pub fn from_ultimate(ku: f64, tu: f64) -> Result<Self, TuningError> {
        if !ku.is_finite() || ku <= 0.0 {
            return Err(TuningError::InvalidGain(ku));
        }
        if !tu.is_finite() || tu <= 0.0 {
            return Err(TuningError::InvalidPeriod(tu));
        }

        let p = PidParameters {
            kp: 0.5 * ku,
            ki: 0.0,
            kd: 0.0,
        };

        let pi_kp = 0.45 * ku;
        let pi = PidParameters {
            kp: pi_kp,
            ki: pi_kp / (tu / 1.2),
            kd: 0.0,
        };

        let pid_kp = 0.6 * ku;
        let pid = PidParameters {
            kp: pid_kp,
            ki: pid_kp / (tu / 2.0),
            kd: pid_kp * (tu / 8.0),
        };

        tracing::debug!(ku, tu, kp = pid.kp, ki = pid.ki, kd = pid.kd, "Ziegler-Nichols PID");

        Ok(Self {
            ultimate_gain: ku,
            ultimate_period_s: tu,
            p,
            pi,
            pid,
        })
    }

    /// Settings for one estimated session.
    pub fn from_session(summary: &SessionSummary) -> Result<Self, TuningError> {
        Self::from_ultimate(summary.gain, summary.period_s)
    }
}
