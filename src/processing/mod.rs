//! Signal processing module - oscillation period estimation for rig sessions

mod fft;

pub use fft::*;

use serde::Serialize;
use thiserror::Error;

/// Errors in signal processing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessingError {
    #[error("Empty sample series: no dominant frequency can be computed")]
    EmptySeries,

    #[error("Invalid sampling rate: {0} (must be finite and > 0)")]
    InvalidSamplingRate(f64),

    #[error("No oscillation: dominant bin is DC (series of {samples} samples is constant)")]
    NoOscillation { samples: usize },
}

/// Half-spectrum of a detrended real series.
#[derive(Debug, Clone, Serialize)]
pub struct FrequencySpectrum {
    /// Frequency bins (Hz), `k / (n * dt)` for `k = 0..=n/2`
    pub frequencies: Vec<f64>,
    /// Unscaled magnitude at each frequency bin
    pub magnitudes: Vec<f64>,
    /// Index of the largest magnitude (first occurrence on ties)
    pub peak_index: usize,
    /// Frequency of `peak_index`
    pub peak_frequency: f64,
    /// Sample rate used
    pub sample_rate: f64,
    /// Length of the input series
    pub sample_count: usize,
}

impl FrequencySpectrum {
    /// Frequency resolution (Hz per bin).
    pub fn resolution(&self) -> f64 {
        if self.sample_count == 0 {
            return 0.0;
        }
        self.sample_rate / self.sample_count as f64
    }
}
