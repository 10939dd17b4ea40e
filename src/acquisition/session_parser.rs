//! Rig Session Log Parser
//!
//! Parses the plain-text logs written by the rig's serial output:
//!
//! ```text
//! start
//! <reading>,<timestamp>
//! <reading>,<timestamp>
//! ...
//! end [<gain_milli_units>]
//! ```
//!
//! Blocks are discovered by a line-scanning state machine
//! (`SeekingStart -> InBody -> SeekingGainAfterEnd`). Discovery only checks
//! the block shape; numbers are parsed afterwards, for the trailing sessions
//! the caller asked for.
//!
//! Free text may sit between `end` and the gain (`end of run [1500]`); the
//! gain is the last bracketed group closing the line. If the `end` line has
//! no such group, the first later line that does supplies it.
//!
//! A block is excluded from discovery (and from id numbering) when:
//! - its `end` marker is missing (another `start` or EOF comes first)
//! - the bracketed gain is not an integer, e.g. `end [abc]`

use crate::processing::{OscillationEstimator, ProcessingError};
use crate::types::{gain_from_raw, Session, SessionResult, SessionSummary};
use std::num::ParseIntError;
use thiserror::Error;
use tracing::{debug, warn};

/// Session parsing errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Insufficient sessions: requested {requested}, found {found}")]
    InsufficientSessions { requested: usize, found: usize },

    #[error("Malformed {field} in session {session_id} (line {line}): {value:?}")]
    MalformedNumeral {
        session_id: usize,
        line: usize,
        field: NumeralField,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Session {session_id}: {source}")]
    Estimation {
        session_id: usize,
        #[source]
        source: ProcessingError,
    },

    #[error(transparent)]
    Processing(#[from] ProcessingError),
}

/// Which numeric field failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumeralField {
    Gain,
    Sample,
}

impl std::fmt::Display for NumeralField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gain => write!(f, "gain"),
            Self::Sample => write!(f, "sample"),
        }
    }
}

// ============================================================================
// Block Discovery
// ============================================================================

/// A well-formed `start … end [gain]` block, numbers still unparsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock<'a> {
    /// 1-based position among all discovered blocks
    pub id: usize,
    /// Line number of the `start` marker
    pub start_line: usize,
    /// Line number holding the `[gain]` marker
    pub gain_line: usize,
    /// Text between the brackets
    pub gain_text: &'a str,
    /// Every line between `start` and `end`, blank lines included
    pub body_lines: Vec<&'a str>,
}

enum ScanState<'a> {
    SeekingStart,
    InBody {
        start_line: usize,
        body: Vec<&'a str>,
    },
    SeekingGainAfterEnd {
        start_line: usize,
        body: Vec<&'a str>,
    },
}

fn is_start_marker(line: &str) -> bool {
    line.trim() == "start"
}

/// Text following an `end` marker, or `None` if the line is not one.
fn end_marker(line: &str) -> Option<&str> {
    line.trim().strip_prefix("end")
}

/// Last `[...]` group, when it closes the line: `of run [1500]` -> `[1500]`.
fn trailing_bracket(text: &str) -> Option<&str> {
    let text = text.trim_end();
    if !text.ends_with(']') {
        return None;
    }
    text.rfind('[').map(|open| &text[open..])
}

/// Bracketed integer numeral, e.g. `[1500]` -> `1500`.
fn gain_marker(text: &str) -> Option<&str> {
    let inner = text
        .trim()
        .strip_prefix('[')?
        .strip_suffix(']')?
        .trim();
    let digits = inner
        .strip_prefix('-')
        .or_else(|| inner.strip_prefix('+'))
        .unwrap_or(inner);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some(inner)
    } else {
        None
    }
}

/// Discover every well-formed session block, in textual order.
///
/// Ids are 1-based and count only well-formed blocks.
pub fn scan_blocks<'a>(text: &'a str) -> Vec<RawBlock<'a>> {
    let mut blocks = Vec::new();
    let mut state = ScanState::SeekingStart;

    let mut emit = |start_line: usize, gain_line: usize, gain_text: &'a str, body_lines: Vec<&'a str>| {
        let id = blocks.len() + 1;
        debug!(id, start_line, gain_line, "Session block discovered");
        blocks.push(RawBlock {
            id,
            start_line,
            gain_line,
            gain_text,
            body_lines,
        });
    };

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;

        state = match state {
            ScanState::SeekingStart => {
                if is_start_marker(line) {
                    ScanState::InBody {
                        start_line: line_no,
                        body: Vec::new(),
                    }
                } else {
                    ScanState::SeekingStart
                }
            }

            ScanState::InBody {
                start_line,
                mut body,
            } => {
                if is_start_marker(line) {
                    warn!(start_line, line = line_no, "Block has no end marker, skipping");
                    ScanState::InBody {
                        start_line: line_no,
                        body: Vec::new(),
                    }
                } else if let Some(rest) = end_marker(line) {
                    match trailing_bracket(rest) {
                        None => ScanState::SeekingGainAfterEnd { start_line, body },
                        Some(bracket) => match gain_marker(bracket) {
                            Some(gain_text) => {
                                emit(start_line, line_no, gain_text, body);
                                ScanState::SeekingStart
                            }
                            None => {
                                warn!(start_line, line = line_no, marker = line.trim(), "Block has malformed gain, skipping");
                                ScanState::SeekingStart
                            }
                        },
                    }
                } else {
                    body.push(line);
                    ScanState::InBody { start_line, body }
                }
            }

            ScanState::SeekingGainAfterEnd { start_line, body } => {
                if is_start_marker(line) {
                    warn!(start_line, line = line_no, "Block has no gain after end marker, skipping");
                    ScanState::InBody {
                        start_line: line_no,
                        body: Vec::new(),
                    }
                } else if let Some(bracket) = trailing_bracket(line) {
                    if let Some(gain_text) = gain_marker(bracket) {
                        emit(start_line, line_no, gain_text, body);
                    } else {
                        warn!(start_line, line = line_no, marker = line.trim(), "Block has malformed gain, skipping");
                    }
                    ScanState::SeekingStart
                } else {
                    ScanState::SeekingGainAfterEnd { start_line, body }
                }
            }
        };
    }

    match state {
        ScanState::SeekingStart => {}
        ScanState::InBody { start_line, .. } | ScanState::SeekingGainAfterEnd { start_line, .. } => {
            warn!(start_line, "Block unterminated at end of text, skipping");
        }
    }

    blocks
}

// ============================================================================
// Number Parsing
// ============================================================================

impl RawBlock<'_> {
    /// Parse gain and samples.
    ///
    /// Blank lines are skipped; each remaining line contributes the integer
    /// before its first comma.
    pub fn to_session(&self) -> Result<Session, SessionError> {
        let raw_gain: i64 = self
            .gain_text
            .parse()
            .map_err(|source| SessionError::MalformedNumeral {
                session_id: self.id,
                line: self.gain_line,
                field: NumeralField::Gain,
                value: self.gain_text.to_string(),
                source,
            })?;

        let mut samples = Vec::with_capacity(self.body_lines.len());
        for (offset, line) in self.body_lines.iter().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let reading = line.split(',').next().unwrap_or_default().trim();
            let value: i64 = reading
                .parse()
                .map_err(|source| SessionError::MalformedNumeral {
                    session_id: self.id,
                    line: self.start_line + 1 + offset,
                    field: NumeralField::Sample,
                    value: reading.to_string(),
                    source,
                })?;
            samples.push(value);
        }

        Ok(Session {
            id: self.id,
            gain: gain_from_raw(raw_gain),
            samples,
        })
    }
}

/// Trailing `n_last` blocks, or `InsufficientSessions` if there are fewer.
fn trailing<'b, 'a>(blocks: &'b [RawBlock<'a>], n_last: usize) -> Result<&'b [RawBlock<'a>], SessionError> {
    if blocks.len() < n_last {
        return Err(SessionError::InsufficientSessions {
            requested: n_last,
            found: blocks.len(),
        });
    }
    Ok(&blocks[blocks.len() - n_last..])
}

/// Parse the last `n_last` sessions of `text` without estimating periods.
pub fn parse_sessions(text: &str, n_last: usize) -> Result<Vec<Session>, SessionError> {
    let blocks = scan_blocks(text);
    trailing(&blocks, n_last)?
        .iter()
        .map(RawBlock::to_session)
        .collect()
}

// ============================================================================
// Session Parser
// ============================================================================

/// Estimated sessions of one log, plus the number of blocks it holds.
#[derive(Debug, Clone, PartialEq)]
pub struct FileAnalysis {
    /// Well-formed blocks discovered in the whole text
    pub total_sessions: usize,
    /// The requested trailing sessions
    pub sessions: SessionResult,
}

/// Turns raw log text into session id → (gain, period).
#[derive(Debug)]
pub struct SessionParser {
    estimator: OscillationEstimator,
}

impl SessionParser {
    /// Parser for logs recorded at `sampling_rate_hz`.
    pub fn new(sampling_rate_hz: f64) -> Result<Self, SessionError> {
        Ok(Self {
            estimator: OscillationEstimator::new(sampling_rate_hz)?,
        })
    }

    /// Sampling rate applied to every session.
    pub fn sampling_rate(&self) -> f64 {
        self.estimator.sampling_rate()
    }

    /// Estimate the last `n_last` sessions of `text`.
    ///
    /// Results are keyed by the absolute block id, so asking for fewer
    /// sessions never renumbers them.
    pub fn process(&mut self, text: &str, n_last: usize) -> Result<SessionResult, SessionError> {
        Ok(self.analyze(text, n_last)?.sessions)
    }

    /// [`Self::process`], also reporting how many blocks the text holds.
    pub fn analyze(&mut self, text: &str, n_last: usize) -> Result<FileAnalysis, SessionError> {
        let blocks = scan_blocks(text);
        let selected = trailing(&blocks, n_last)?;

        let mut results = SessionResult::new();
        for block in selected {
            let session = block.to_session()?;
            let period_s = self
                .estimator
                .estimate_period(&session.samples_f64())
                .map_err(|source| SessionError::Estimation {
                    session_id: session.id,
                    source,
                })?;

            debug!(
                session = session.id,
                gain = session.gain,
                samples = session.samples.len(),
                period_s,
                "Session estimated"
            );

            results.insert(
                session.id,
                SessionSummary {
                    gain: session.gain,
                    period_s,
                },
            );
        }

        Ok(FileAnalysis {
            total_sessions: blocks.len(),
            sessions: results,
        })
    }
}

/// One-shot [`SessionParser::process`].
pub fn process_sessions(
    text: &str,
    n_last: usize,
    sampling_rate_hz: f64,
) -> Result<SessionResult, SessionError> {
    SessionParser::new(sampling_rate_hz)?.process(text, n_last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers() {
        assert!(is_start_marker("start"));
        assert!(is_start_marker("  start \r"));
        assert!(!is_start_marker("started"));

        assert_eq!(end_marker("end [1500]"), Some(" [1500]"));
        assert_eq!(end_marker("end[1500]"), Some("[1500]"));
        assert_eq!(end_marker("end"), Some(""));
        assert_eq!(end_marker("  end of run [1500] "), Some(" of run [1500]"));
        assert_eq!(end_marker("12,end"), None);

        assert_eq!(trailing_bracket(" of run [1500] "), Some("[1500]"));
        assert_eq!(trailing_bracket(" [x] then [20]"), Some("[20]"));
        assert_eq!(trailing_bracket(" of run"), None);
        assert_eq!(trailing_bracket(" [1500] done"), None);

        assert_eq!(gain_marker(" [1500]"), Some("1500"));
        assert_eq!(gain_marker("[ -20 ]"), Some("-20"));
        assert_eq!(gain_marker("[abc]"), None);
        assert_eq!(gain_marker("[]"), None);
        assert_eq!(gain_marker("[-]"), None);
        assert_eq!(gain_marker("1500"), None);
    }

    #[test]
    fn test_scan_single_block() {
        let text = "start\n1,0\n\n2,1\nend [2000]\n";
        let blocks = scan_blocks(text);
        assert_eq!(blocks.len(), 1);
        let b = &blocks[0];
        assert_eq!(b.id, 1);
        assert_eq!(b.start_line, 1);
        assert_eq!(b.gain_line, 5);
        assert_eq!(b.gain_text, "2000");
        assert_eq!(b.body_lines, vec!["1,0", "", "2,1"]);
    }

    #[test]
    fn test_gain_on_line_after_end() {
        let text = "start\n5,0\nend\n\n[750]\n";
        let blocks = scan_blocks(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].gain_text, "750");
        assert_eq!(blocks[0].gain_line, 5);
    }

    #[test]
    fn test_free_text_between_end_and_gain() {
        let text = "start\n1,0\n2,1\nend of run [1500]\nstart\n3,0\n4,1\nend [2000]\n";
        let blocks = scan_blocks(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].gain_text, "1500");
        assert_eq!(blocks[0].gain_line, 4);
        assert_eq!(blocks[1].id, 2);
        assert_eq!(blocks[1].gain_text, "2000");
    }

    #[test]
    fn test_gain_found_past_note_lines() {
        let text = "start\n1,0\nend of run\noperator note\nkp [600]\n";
        let blocks = scan_blocks(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].gain_text, "600");
        assert_eq!(blocks[0].gain_line, 5);
    }

    #[test]
    fn test_text_outside_blocks_ignored() {
        let text = "Heli 3 - yaw test\nnoise\nstart\n1,0\nend [100]\ntrailing\n";
        let blocks = scan_blocks(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start_line, 3);
    }

    #[test]
    fn test_unterminated_block_replaced_by_next_start() {
        let text = "start\n1,0\nstart\n2,0\n3,1\nend [300]\n";
        let blocks = scan_blocks(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start_line, 3);
        assert_eq!(blocks[0].body_lines, vec!["2,0", "3,1"]);
    }

    #[test]
    fn test_unterminated_trailing_block_dropped() {
        let text = "start\n1,0\nend [100]\nstart\n2,0\n";
        assert_eq!(scan_blocks(text).len(), 1);
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "start\r\n10,0\r\n20,1\r\nend [1500]\r\n";
        let sessions = parse_sessions(text, 1).expect("parse");
        assert_eq!(sessions[0].samples, vec![10, 20]);
        assert_eq!(sessions[0].gain, 1.5);
    }

    #[test]
    fn test_to_session_reports_sample_line() {
        let text = "start\n1,0\n\nx,2\nend [100]\n";
        let err = parse_sessions(text, 1).expect_err("should fail");
        match err {
            SessionError::MalformedNumeral {
                session_id,
                line,
                field,
                value,
                ..
            } => {
                assert_eq!(session_id, 1);
                assert_eq!(line, 4);
                assert_eq!(field, NumeralField::Sample);
                assert_eq!(value, "x");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_gain_overflow_is_malformed_numeral() {
        let text = "start\n1,0\n2,1\nend [99999999999999999999999]\n";
        let err = parse_sessions(text, 1).expect_err("should fail");
        assert!(matches!(
            err,
            SessionError::MalformedNumeral {
                field: NumeralField::Gain,
                line: 4,
                ..
            }
        ));
    }

    #[test]
    fn test_sample_without_timestamp() {
        let sessions = parse_sessions("start\n42\n43\nend [1]\n", 1).expect("parse");
        assert_eq!(sessions[0].samples, vec![42, 43]);
    }

    #[test]
    fn test_empty_body_fails_in_estimator() {
        let err = process_sessions("start\n\n   \nend [100]\n", 1, 10.0).expect_err("should fail");
        assert!(matches!(
            err,
            SessionError::Estimation {
                session_id: 1,
                source: ProcessingError::EmptySeries
            }
        ));
    }

    #[test]
    fn test_zero_sessions_requested() {
        let mut parser = SessionParser::new(10.0).expect("parser");
        let analysis = parser.analyze("start\n1,0\n2,1\nend [100]\n", 0).expect("analyze");
        assert!(analysis.sessions.is_empty());
        assert_eq!(analysis.total_sessions, 1);
        // Even an empty text satisfies n_last = 0
        assert!(process_sessions("", 0, 10.0).expect("process").is_empty());
    }

    #[test]
    fn test_invalid_sampling_rate() {
        assert!(matches!(
            SessionParser::new(0.0),
            Err(SessionError::Processing(ProcessingError::InvalidSamplingRate(_)))
        ));
    }
}
