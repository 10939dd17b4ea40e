//! Runtime Configuration Module
//!
//! Provides analysis settings loaded from TOML files. The sampling rate and
//! data location are plain values passed to the parser, never globals, so
//! tests can vary them freely.
//!
//! ## Loading Order
//!
//! 1. Explicit `--config <path>` on the command line
//! 2. `HELI_TUNE_CONFIG` environment variable (path to TOML file)
//! 3. `heli_tune.toml` in the current working directory
//! 4. Built-in defaults (see [`defaults`])
//!
//! ## Usage
//!
//! ```ignore
//! let config = HeliTuneConfig::load(None)?;
//! config.validate()?;
//! let mut parser = SessionParser::new(config.acquisition.sampling_rate_hz)?;
//! ```

mod heli_config;
pub mod defaults;
pub mod validation;

pub use heli_config::*;
