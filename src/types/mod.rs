//! Shared data structures for rig session analysis
//!
//! - `Session`: one `start … end [gain]` block, parsed
//! - `SessionSummary` / `SessionResult`: per-session (gain, period) output

mod session;

pub use session::*;
