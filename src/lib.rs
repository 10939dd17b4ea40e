//! heli-tune: Helicopter Rig Oscillation Analysis
//!
//! Reads the session logs written by the helicopter rig during ultimate-gain
//! experiments and estimates the induced oscillation period of each session,
//! giving the (Ku, Tu) pairs needed for Ziegler-Nichols tuning.
//!
//! ## Architecture
//!
//! - **Acquisition**: log discovery and the `start … end [gain]` session parser
//! - **Processing**: detrend + FFT oscillation estimator
//! - **Tuning**: Ziegler-Nichols ultimate-cycle rules
//! - **Report**: text / JSON output

pub mod acquisition;
pub mod config;
pub mod processing;
pub mod report;
pub mod tuning;
pub mod types;

// Re-export configuration
pub use config::HeliTuneConfig;

// Re-export commonly used types
pub use types::{Session, SessionResult, SessionSummary};

// Re-export the core pipeline
pub use acquisition::{process_sessions, FileAnalysis, SessionError, SessionParser};
pub use processing::{estimate_period, OscillationEstimator, ProcessingError};
pub use tuning::ZieglerNichols;
