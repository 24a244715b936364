use std::fs;
use std::path::{Path, PathBuf};

use makair_telemetry_core::{Message, PacketStatus, Report, decode_hex_file};
use serde_json::Value;

fn repo_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

fn load_expected_report(dir: &str) -> Report {
    let expected_path = repo_root().join(dir).join("expected_report.json");
    let expected_json = fs::read_to_string(&expected_path).expect("read expected_report.json");
    serde_json::from_str(&expected_json).expect("parse expected report")
}

fn run_golden(dir: &str) {
    let input = repo_root().join(dir).join("input.hex");
    let expected_path = repo_root().join(dir).join("expected_report.json");
    let expected_json = fs::read_to_string(&expected_path).expect("read expected_report.json");
    let expected: Value = serde_json::from_str(&expected_json).expect("parse expected report");

    let mut actual = decode_hex_file(&input).expect("decode capture");
    actual.input.path = expected["input"]["path"]
        .as_str()
        .expect("expected input path")
        .to_string();

    let actual_value = serde_json::to_value(actual).expect("serialize actual");
    assert_eq!(actual_value, expected, "golden mismatch in {dir}");
}

#[test]
fn golden_boot() {
    run_golden("tests/golden/boot");
}

#[test]
fn golden_stopped() {
    run_golden("tests/golden/stopped");
}

#[test]
fn golden_session() {
    run_golden("tests/golden/session");
}

#[test]
fn golden_malformed() {
    run_golden("tests/golden/malformed");
}

#[test]
fn golden_boot_matches_reference_record() {
    let report = load_expected_report("tests/golden/boot");
    let Some(Message::Boot(boot)) = report.packets[0].message.as_ref() else {
        panic!("expected boot message");
    };
    assert_eq!(boot.header.version, "v");
    assert_eq!(boot.header.systick, 1000);
    assert_eq!(boot.value128, 42);
}

#[test]
fn golden_session_has_every_message_type() {
    let report = load_expected_report("tests/golden/session");
    assert_eq!(report.summary.recognized, 9);
    assert_eq!(report.summary.by_type.len(), 5);
    assert!(
        report
            .packets
            .iter()
            .all(|packet| packet.status == PacketStatus::Recognized)
    );
}

#[test]
fn golden_malformed_keeps_unrecognized_apart() {
    let report = load_expected_report("tests/golden/malformed");
    assert_eq!(report.summary.malformed, 8);
    assert_eq!(report.summary.unrecognized, 3);
    assert!(report.summary.by_type.is_empty());
    for packet in &report.packets {
        assert_eq!(
            packet.error.is_some(),
            packet.status == PacketStatus::Malformed,
            "line {}",
            packet.line
        );
    }
}
