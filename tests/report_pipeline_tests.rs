//! Report Pipeline Tests
//!
//! Runs the discovery -> parse -> estimate -> report chain on log files
//! written to a temporary data directory.

use heli_tune::acquisition::{discover_log_files, heli_identifier, SessionParser};
use heli_tune::config::HeliTuneConfig;
use heli_tune::report::{render_json, FileReport};
use std::path::Path;

const HELI_1_LOG: &str = "\
Heli 1 - roll loop
start
10,0
14,100
10,200
14,300
end [1000]
start
3,0
4,100
end [2500]
";

const HELI_2_LOG: &str = "\
start
3,0
4,100
3,200
4,300
end
[800]
";

fn write_logs(dir: &Path) {
    std::fs::write(dir.join("heli1.txt"), HELI_1_LOG).expect("write heli1");
    std::fs::write(dir.join("heli2.txt"), HELI_2_LOG).expect("write heli2");
    std::fs::write(dir.join("readme.md"), "not a log").expect("write readme");
}

fn build_reports(dir: &Path, last_sessions: usize, with_tuning: bool) -> Vec<FileReport> {
    let config = HeliTuneConfig::default();
    let mut parser = SessionParser::new(config.acquisition.sampling_rate_hz).expect("parser");

    discover_log_files(dir, &config.data.extension)
        .expect("discover")
        .iter()
        .map(|path| {
            let text = std::fs::read_to_string(path).expect("read");
            let analysis = parser.analyze(&text, last_sessions).expect("analyze");
            FileReport::new(
                path,
                heli_identifier(&text),
                analysis.total_sessions,
                &analysis.sessions,
                with_tuning,
            )
        })
        .collect()
}

#[test]
fn text_report_lists_each_log() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_logs(tmp.path());

    let reports = build_reports(tmp.path(), 1, false);
    assert_eq!(reports.len(), 2);

    let first = reports[0].render_text();
    assert!(first.starts_with(&"-".repeat(30)));
    assert!(first.contains("Heli 1 - roll loop - "));
    assert!(first.contains("2 sessions in total\n"));
    assert!(first.contains("Session 2:\nUltimate gain: 2.5\nOscillation period (s): 0.200\n"));

    let second = reports[1].render_text();
    assert!(second.contains("\nNone - "));
    assert!(second.contains("Session 1:\nUltimate gain: 0.8\nOscillation period (s): 0.200\n"));
}

#[test]
fn sessions_listed_newest_first() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_logs(tmp.path());

    let reports = build_reports(tmp.path(), 2, false);
    let ids: Vec<usize> = reports[0].sessions.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[test]
fn json_report_carries_tuning() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_logs(tmp.path());

    let reports = build_reports(tmp.path(), 1, true);
    let json = render_json(&reports).expect("json");
    let value: serde_json::Value = serde_json::from_str(&json).expect("parse json");

    assert_eq!(value.as_array().map(Vec::len), Some(2));
    assert_eq!(value[0]["heli"], "Heli 1 - roll loop");
    assert_eq!(value[1]["heli"], serde_json::Value::Null);
    assert_eq!(value[0]["sessions"][0]["id"], 2);

    let pid_kp = value[0]["sessions"][0]["ziegler_nichols"]["pid"]["kp"]
        .as_f64()
        .expect("pid kp");
    assert!((pid_kp - 1.5).abs() < 1e-9);
}

#[test]
fn too_few_sessions_fails_only_that_log() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_logs(tmp.path());

    let mut parser = SessionParser::new(10.0).expect("parser");
    let files = discover_log_files(tmp.path(), "txt").expect("discover");
    let outcomes: Vec<bool> = files
        .iter()
        .map(|path| {
            let text = std::fs::read_to_string(path).expect("read");
            parser.analyze(&text, 2).is_ok()
        })
        .collect();
    assert_eq!(outcomes, vec![true, false]);
}
