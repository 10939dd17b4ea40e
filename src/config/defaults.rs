//! System-wide default constants.
//!
//! Every value here can be overridden from `heli_tune.toml` or the CLI.

// ============================================================================
// Acquisition
// ============================================================================

/// Rate of the rig's serial output (samples per second).
///
/// Fixed by the firmware, not recorded in the log itself.
pub const SAMPLING_RATE_HZ: f64 = 10.0;

/// Sampling rates above this are accepted but flagged as suspicious.
pub const MAX_PLAUSIBLE_SAMPLING_RATE_HZ: f64 = 1_000.0;

// ============================================================================
// Data Files
// ============================================================================

/// Directory scanned for rig logs when no files are given.
pub const DATA_DIR: &str = "data";

/// Extension of rig log files.
pub const LOG_EXTENSION: &str = "txt";

// ============================================================================
// Report
// ============================================================================

/// Number of most recent sessions reported per file.
pub const LAST_SESSIONS: usize = 1;

/// Width of the dashed separator printed before each file.
pub const REPORT_SEPARATOR_WIDTH: usize = 30;

// ============================================================================
// Config Discovery
// ============================================================================

/// Environment variable holding a config file path.
pub const CONFIG_ENV_VAR: &str = "HELI_TUNE_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "heli_tune.toml";
