use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

const STOPPED_HEX: &str = "4f3a0101763031323334353637383941420900000000000003e8";
const BAD_PRIORITY_HEX: &str = "543a010176303132333435363738394142090000000000000004090001090002091109000000050906090309f0090000000709000000080900000009";

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("makair-telemetry"))
}

fn repo_root() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest
        .parent()
        .and_then(|p| p.parent())
        .expect("repo root")
        .to_path_buf()
}

fn golden_input(case: &str) -> std::path::PathBuf {
    repo_root()
        .join("tests")
        .join("golden")
        .join(case)
        .join("input.hex")
}

fn stdout_json(assert: &assert_cmd::assert::Assert) -> Value {
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    serde_json::from_str(&stdout).expect("valid json")
}

#[test]
fn help_supports_decode_and_parse() {
    cmd().arg("decode").arg("--help").assert().success();
    cmd().arg("parse").arg("--help").assert().success();
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.hex");
    let report = temp.path().join("report.json");

    cmd()
        .arg("decode")
        .arg("-f")
        .arg(missing)
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn stdout_outputs_json_report() {
    let assert = cmd()
        .arg("decode")
        .arg("-f")
        .arg(golden_input("session"))
        .arg("--stdout")
        .assert()
        .success();
    let report = stdout_json(&assert);
    assert_eq!(report["summary"]["recognized"], 9);
    assert_eq!(report["packets"][0]["message"]["type"], "BootMessage");
}

#[test]
fn inline_packets_are_decoded() {
    let assert = cmd()
        .arg("decode")
        .arg(STOPPED_HEX)
        .arg("583a")
        .arg("--stdout")
        .assert()
        .success();
    let report = stdout_json(&assert);
    assert_eq!(report["input"]["path"], "<args>");
    assert_eq!(report["summary"]["recognized"], 1);
    assert_eq!(report["summary"]["unrecognized"], 1);
    assert_eq!(report["packets"][0]["message"]["systick"], 1000);
}

#[test]
fn inline_packets_keep_empty_and_comment_arguments() {
    let assert = cmd()
        .arg("decode")
        .arg("")
        .arg(STOPPED_HEX)
        .arg("--stdout")
        .assert()
        .success();
    let report = stdout_json(&assert);
    assert_eq!(report["summary"]["packets_total"], 2);
    assert_eq!(report["summary"]["unrecognized"], 1);
    assert_eq!(report["packets"][1]["line"], 2);

    cmd()
        .arg("decode")
        .arg(STOPPED_HEX)
        .arg("#583a")
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("invalid hex on line 2"));
}

#[test]
fn inline_packet_with_newline_stays_one_packet() {
    let (head, tail) = STOPPED_HEX.split_at(10);
    let assert = cmd()
        .arg("decode")
        .arg(format!("{head}\n{tail}"))
        .arg("--stdout")
        .assert()
        .success();
    let report = stdout_json(&assert);
    assert_eq!(report["summary"]["packets_total"], 1);
    assert_eq!(report["summary"]["recognized"], 1);
}

#[test]
fn report_written_to_file() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("out").join("report.json");

    cmd()
        .arg("decode")
        .arg("-f")
        .arg(golden_input("boot"))
        .arg("-o")
        .arg(&report)
        .assert()
        .success()
        .stderr(contains("OK: report written"));

    let json = std::fs::read_to_string(&report).expect("report written");
    let value: Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["packets"][0]["message"]["mode"], "PRODUCTION");
}

#[test]
fn stdout_and_report_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("report.json");

    cmd()
        .arg("decode")
        .arg("-f")
        .arg(golden_input("boot"))
        .arg("--stdout")
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn pretty_and_compact_conflict() {
    cmd()
        .arg("decode")
        .arg(STOPPED_HEX)
        .arg("--stdout")
        .arg("--pretty")
        .arg("--compact")
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn report_path_must_differ_from_input() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("capture.hex");
    std::fs::write(&input, format!("{STOPPED_HEX}\n")).expect("write input");

    cmd()
        .arg("decode")
        .arg("-f")
        .arg(&input)
        .arg("-o")
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("report path must differ from input"));
}

#[test]
fn quiet_suppresses_ok_message() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("report.json");

    cmd()
        .arg("decode")
        .arg("-f")
        .arg(golden_input("boot"))
        .arg("-o")
        .arg(report)
        .arg("--quiet")
        .assert()
        .success()
        .stderr(predicates::str::contains("OK:").not());
}

#[test]
fn list_errors_outputs_lines() {
    cmd()
        .arg("decode")
        .arg("-f")
        .arg(golden_input("malformed"))
        .arg("--stdout")
        .arg("--list-errors")
        .assert()
        .success()
        .stderr(contains("Malformed packets:").and(contains("line 5: invalid alarm priority")));
}

#[test]
fn strict_fails_when_packets_are_malformed() {
    cmd()
        .arg("decode")
        .arg("-f")
        .arg(golden_input("malformed"))
        .arg("--stdout")
        .arg("--strict")
        .assert()
        .failure()
        .stderr(contains("malformed packet(s) detected"));
}

#[test]
fn strict_passes_on_clean_capture() {
    cmd()
        .arg("decode")
        .arg("-f")
        .arg(golden_input("session"))
        .arg("--stdout")
        .arg("--strict")
        .assert()
        .success();
}

#[test]
fn invalid_hex_argument_is_an_error() {
    cmd()
        .arg("decode")
        .arg("4f3")
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("invalid hex on line 1"));
}

#[test]
fn functions_lists_registered_names() {
    cmd()
        .arg("functions")
        .assert()
        .success()
        .stdout(contains("MAKAIR.TELEMETRY->"));
}

#[test]
fn call_decodes_packet() {
    let assert = cmd()
        .arg("call")
        .arg("MAKAIR.TELEMETRY->")
        .arg(STOPPED_HEX)
        .assert()
        .success();
    let value = stdout_json(&assert);
    assert_eq!(value["type"], "StoppedMessage");
    assert_eq!(value["version"], "v");
}

#[test]
fn call_pushes_null_for_unrecognized_packet() {
    cmd()
        .arg("call")
        .arg("MAKAIR.TELEMETRY->")
        .arg("583a00")
        .assert()
        .success()
        .stdout(contains("null"));
}

#[test]
fn call_rejects_non_byte_argument() {
    cmd()
        .arg("call")
        .arg("MAKAIR.TELEMETRY->")
        .arg("not a packet")
        .assert()
        .failure()
        .stderr(contains("operates on a byte array"));
}

#[test]
fn call_reports_malformed_packet() {
    cmd()
        .arg("call")
        .arg("MAKAIR.TELEMETRY->")
        .arg(BAD_PRIORITY_HEX)
        .assert()
        .failure()
        .stderr(contains("invalid alarm priority: 0x03"));
}

#[test]
fn call_unknown_function() {
    cmd()
        .arg("call")
        .arg("MAKAIR.NOPE")
        .arg(STOPPED_HEX)
        .assert()
        .failure()
        .stderr(contains("unknown function").and(contains("hint:")));
}
