//! Oscillation estimation using rustfft
//!
//! Converts the height or yaw readings of one rig session into the period of
//! its induced oscillation.
//!
//! # Pipeline
//!
//! 1. Constant detrend (mean removal) so the DC offset of the sensor does not
//!    dominate the spectrum
//! 2. Forward FFT of the real series, keeping the non-negative half
//! 3. Peak bin selection (largest magnitude, lowest index on ties)
//! 4. Period = 1 / peak frequency
//!
//! # Example
//!
//! ```ignore
//! use heli_tune::processing::OscillationEstimator;
//!
//! let mut estimator = OscillationEstimator::new(10.0)?;
//! let period_s = estimator.estimate_period(&samples)?;
//! ```

use ndarray::Array1;
use num_complex::Complex;
use rustfft::FftPlanner;

use super::{FrequencySpectrum, ProcessingError};

// ============================================================================
// Detrend / Frequency Axis
// ============================================================================

/// Subtract the arithmetic mean from every sample.
///
/// An empty input yields an empty output.
pub fn detrend_constant(samples: &[f64]) -> Array1<f64> {
    let series = Array1::from(samples.to_vec());
    match series.mean() {
        Some(mean) => series - mean,
        None => series,
    }
}

/// Sample frequencies of a real FFT of length `n` with sample spacing `d` (seconds).
///
/// Returns `n / 2 + 1` bins: `[0, 1, ..., n/2] / (n * d)`.
pub fn rfft_frequencies(n: usize, d: f64) -> Vec<f64> {
    if n == 0 || d <= 0.0 {
        return Vec::new();
    }
    let step = 1.0 / (n as f64 * d);
    (0..=n / 2).map(|k| k as f64 * step).collect()
}

/// Index of the largest value; the first one wins on ties.
fn peak_bin(magnitudes: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &m) in magnitudes.iter().enumerate() {
        if best.map_or(true, |(_, b)| m > b) {
            best = Some((i, m));
        }
    }
    best.map(|(i, _)| i)
}

fn validate_sampling_rate(sampling_rate: f64) -> Result<(), ProcessingError> {
    if !sampling_rate.is_finite() || sampling_rate <= 0.0 {
        return Err(ProcessingError::InvalidSamplingRate(sampling_rate));
    }
    Ok(())
}

// ============================================================================
// Oscillation Estimator (planner reused across sessions)
// ============================================================================

/// Estimates the dominant oscillation of series sampled at a fixed rate.
///
/// Holds one FFT planner so that the sessions of a file, which usually share
/// a handful of lengths, reuse their plans.
pub struct OscillationEstimator {
    planner: FftPlanner<f64>,
    sampling_rate: f64,
}

impl std::fmt::Debug for OscillationEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OscillationEstimator")
            .field("sampling_rate", &self.sampling_rate)
            .finish_non_exhaustive()
    }
}

impl OscillationEstimator {
    /// Create an estimator for series sampled at `sampling_rate` Hz.
    pub fn new(sampling_rate: f64) -> Result<Self, ProcessingError> {
        validate_sampling_rate(sampling_rate)?;
        Ok(Self {
            planner: FftPlanner::new(),
            sampling_rate,
        })
    }

    /// Sampling rate in Hz
    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    /// Detrend `samples` and compute the magnitude of its non-negative half-spectrum.
    pub fn spectrum(&mut self, samples: &[f64]) -> Result<FrequencySpectrum, ProcessingError> {
        if samples.is_empty() {
            return Err(ProcessingError::EmptySeries);
        }

        let detrended = detrend_constant(samples);
        let n = detrended.len();

        let mut buffer: Vec<Complex<f64>> =
            detrended.iter().map(|&x| Complex::new(x, 0.0)).collect();
        self.planner.plan_fft_forward(n).process(&mut buffer);

        // Real input: bins above n/2 mirror the lower half
        let n_positive = n / 2 + 1;
        let frequencies = rfft_frequencies(n, 1.0 / self.sampling_rate);

        // Unscaled, so DC and Nyquist compete with the rest on equal terms
        let magnitudes: Vec<f64> = buffer.iter().take(n_positive).map(|c| c.norm()).collect();

        let peak_index = peak_bin(&magnitudes).unwrap_or(0);
        let peak_frequency = frequencies.get(peak_index).copied().unwrap_or(0.0);

        tracing::trace!(
            samples = n,
            peak_index,
            peak_frequency,
            "Spectrum computed"
        );

        Ok(FrequencySpectrum {
            frequencies,
            magnitudes,
            peak_index,
            peak_frequency,
            sample_rate: self.sampling_rate,
            sample_count: n,
        })
    }

    /// Frequency (Hz) of the dominant bin of the detrended series.
    pub fn dominant_frequency(&mut self, samples: &[f64]) -> Result<f64, ProcessingError> {
        Ok(self.spectrum(samples)?.peak_frequency)
    }

    /// Period (s) of the induced oscillation: `1 / dominant_frequency`.
    ///
    /// Fails with [`ProcessingError::NoOscillation`] when the dominant bin is DC.
    pub fn estimate_period(&mut self, samples: &[f64]) -> Result<f64, ProcessingError> {
        let spectrum = self.spectrum(samples)?;
        if spectrum.peak_index == 0 || spectrum.peak_frequency <= 0.0 {
            return Err(ProcessingError::NoOscillation {
                samples: spectrum.sample_count,
            });
        }
        Ok(1.0 / spectrum.peak_frequency)
    }
}

// ============================================================================
// Standalone Functions
// ============================================================================

/// One-shot [`OscillationEstimator::estimate_period`].
pub fn estimate_period(samples: &[f64], sampling_rate: f64) -> Result<f64, ProcessingError> {
    OscillationEstimator::new(sampling_rate)?.estimate_period(samples)
}

/// One-shot [`OscillationEstimator::dominant_frequency`].
pub fn dominant_frequency(samples: &[f64], sampling_rate: f64) -> Result<f64, ProcessingError> {
    OscillationEstimator::new(sampling_rate)?.dominant_frequency(samples)
}

/// Find dominant frequencies in a spectrum using true peak detection.
///
/// Identifies local maxima (peaks) where the amplitude is higher than
/// both neighboring bins, then returns the top N by amplitude.
///
/// # Returns
/// Vector of (frequency, magnitude) tuples sorted by magnitude descending
pub fn find_dominant_frequencies(spectrum: &FrequencySpectrum, n_peaks: usize) -> Vec<(f64, f64)> {
    if spectrum.magnitudes.len() < 3 {
        let mut all: Vec<(f64, f64)> = spectrum
            .frequencies
            .iter()
            .zip(spectrum.magnitudes.iter())
            .skip(1)
            .map(|(&f, &m)| (f, m))
            .collect();
        all.truncate(n_peaks);
        return all;
    }

    let mut peaks: Vec<(f64, f64)> = Vec::new();

    for i in 1..spectrum.magnitudes.len() {
        let prev = spectrum.magnitudes[i - 1];
        let curr = spectrum.magnitudes[i];
        // Nyquist bin has no right neighbour
        let next = spectrum.magnitudes.get(i + 1).copied().unwrap_or(f64::MIN);

        if curr > prev && curr > next {
            peaks.push((spectrum.frequencies[i], curr));
        }
    }

    // Stable sort keeps lower frequencies first among equal magnitudes
    peaks.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    peaks.truncate(n_peaks);
    peaks
}

// ============================================================================
// Tests
// ============================================================================
