//! Session Parsing Tests
//!
//! Exercises the public parsing and estimation API on complete log texts:
//! block discovery, trailing-session selection, gain scaling and the period
//! reported per session.

use heli_tune::acquisition::{parse_sessions, scan_blocks, SessionError, SessionParser};
use heli_tune::processing::{dominant_frequency, estimate_period, ProcessingError};
use heli_tune::{process_sessions, SessionSummary};

const RATE_HZ: f64 = 10.0;

/// 2 Hz sine around 1000 counts, sampled at 10 Hz, as log body lines.
fn sine_body(samples: usize) -> String {
    (0..samples)
        .map(|k| {
            let t = k as f64 / RATE_HZ;
            let reading = (1000.0 + 100.0 * (2.0 * std::f64::consts::PI * 2.0 * t).sin()).round();
            format!("{},{}\n", reading as i64, k * 100)
        })
        .collect()
}

fn two_block_log() -> String {
    "Heli 2 - pitch loop\nstart\n1,0\n5,100\n2,200\nend [2000]\nstart\n3,0\n4,100\nend [3000]\n"
        .to_string()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ============================================================================
// Trailing Session Selection
// ============================================================================

#[test]
fn last_session_keeps_absolute_id() {
    let result = process_sessions(&two_block_log(), 1, RATE_HZ).expect("process");
    assert_eq!(result.len(), 1);
    let summary = result.get(&2).expect("session 2");
    assert!(close(summary.gain, 3.0));
    assert!(close(summary.period_s, 0.2), "period was {}", summary.period_s);
}

#[test]
fn parse_sessions_numbers_blocks_in_order() {
    let sessions = parse_sessions(&two_block_log(), 2).expect("parse");
    let ids: Vec<usize> = sessions.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(close(sessions[0].gain, 2.0));
    assert!(close(sessions[1].gain, 3.0));
    assert_eq!(sessions[0].samples, vec![1, 5, 2]);
    assert_eq!(sessions[1].samples, vec![3, 4]);
}

#[test]
fn every_request_up_to_total_returns_the_last_n() {
    let log = two_block_log();
    for n in 0..=2 {
        let result = process_sessions(&log, n, RATE_HZ).expect("process");
        let ids: Vec<usize> = result.keys().copied().collect();
        let expected: Vec<usize> = (3 - n..=2).collect();
        assert_eq!(ids, expected, "n_last = {n}");
    }
}

#[test]
fn requesting_more_than_available_fails() {
    let err = process_sessions(&two_block_log(), 3, RATE_HZ).expect_err("should fail");
    assert!(matches!(
        err,
        SessionError::InsufficientSessions {
            requested: 3,
            found: 2
        }
    ));
    assert!(err.to_string().contains("requested 3"));

    let err = parse_sessions("no blocks here\n", 1).expect_err("should fail");
    assert!(matches!(
        err,
        SessionError::InsufficientSessions {
            requested: 1,
            found: 0
        }
    ));
}

#[test]
fn processing_is_repeatable() {
    let mut parser = SessionParser::new(RATE_HZ).expect("parser");
    let log = two_block_log();
    let first = parser.process(&log, 2).expect("first");
    let second = parser.process(&log, 2).expect("second");
    assert_eq!(first, second);
}

// ============================================================================
// Gain and Block Shape
// ============================================================================

#[test]
fn gain_is_scaled_by_one_thousand() {
    let sessions = parse_sessions("start\n1,0\n2,1\nend [1500]\n", 1).expect("parse");
    assert!(close(sessions[0].gain, 1.5));

    let sessions = parse_sessions("start\n1,0\n2,1\nend [-250]\n", 1).expect("parse");
    assert!(close(sessions[0].gain, -0.25));
}

#[test]
fn malformed_block_is_skipped_and_ids_shift() {
    let log = "start\n1,0\n2,1\nend [1000]\n\
               start\n9,0\n9,1\nend [abc]\n\
               start\n3,0\n4,1\nend [4000]\n";

    let blocks = scan_blocks(log);
    assert_eq!(blocks.len(), 2);

    let sessions = parse_sessions(log, 2).expect("parse");
    assert_eq!(sessions[1].id, 2);
    assert!(close(sessions[1].gain, 4.0));
    assert_eq!(sessions[1].samples, vec![3, 4]);
}

#[test]
fn free_text_after_end_keeps_block_and_later_ids() {
    let log = "start\n1,0\n2,1\nend of run [1500]\n\
               start\n3,0\n4,1\nend [4000]\n";

    let blocks = scan_blocks(log);
    assert_eq!(blocks.len(), 2);

    let result = process_sessions(log, 2, RATE_HZ).expect("process");
    assert!(close(result[&1].gain, 1.5));
    assert!(close(result[&2].gain, 4.0));
}

#[test]
fn analysis_reports_total_blocks() {
    let mut parser = SessionParser::new(RATE_HZ).expect("parser");
    let analysis = parser.analyze(&two_block_log(), 1).expect("analyze");
    assert_eq!(analysis.total_sessions, 2);
    assert_eq!(analysis.sessions.len(), 1);
}

#[test]
fn constant_session_has_no_oscillation() {
    let err = process_sessions("start\n7,0\n7,1\n7,2\nend [500]\n", 1, RATE_HZ)
        .expect_err("should fail");
    assert!(matches!(
        err,
        SessionError::Estimation {
            session_id: 1,
            source: ProcessingError::NoOscillation { samples: 3 }
        }
    ));
}

// ============================================================================
// Period Estimation
// ============================================================================

#[test]
fn sine_session_period_matches_oscillation() {
    let log = format!("heli 1\nstart\n{}end [1200]\n", sine_body(50));
    let result = process_sessions(&log, 1, RATE_HZ).expect("process");
    let SessionSummary { gain, period_s } = result.get(&1).copied().expect("session 1");
    assert!(close(gain, 1.2));
    assert!(close(period_s, 0.5), "period was {period_s}");
}

#[test]
fn period_is_reciprocal_of_dominant_frequency() {
    let samples: Vec<f64> = sine_body(50)
        .lines()
        .filter_map(|l| l.split(',').next())
        .filter_map(|v| v.parse().ok())
        .collect();

    let freq = dominant_frequency(&samples, RATE_HZ).expect("frequency");
    let period = estimate_period(&samples, RATE_HZ).expect("period");
    assert!(close(freq, 2.0));
    assert!(close(period * freq, 1.0));
}

#[test]
fn sampling_rate_scales_period() {
    let log = "start\n3,0\n4,1\nend [1000]\n";
    let at_10 = process_sessions(log, 1, 10.0).expect("10 Hz");
    let at_20 = process_sessions(log, 1, 20.0).expect("20 Hz");
    assert!(close(at_10[&1].period_s, 0.2));
    assert!(close(at_20[&1].period_s, 0.1));
}
