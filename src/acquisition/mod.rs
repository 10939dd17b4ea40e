//! Log acquisition module
//!
//! Handles finding rig log files and turning their text into sessions.

pub mod discovery;
pub mod session_parser;

pub use discovery::{discover_log_files, heli_identifier, DiscoveryError};
pub use session_parser::{
    parse_sessions, process_sessions, scan_blocks, FileAnalysis, NumeralField, RawBlock, SessionError,
    SessionParser,
};
