use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use makair_telemetry_core::decode_hex_file;

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<(), String> {
    let root = PathBuf::from("tests").join("golden");
    let mut cases = fs::read_dir(&root)
        .map_err(|err| format!("failed to read {}: {}", root.display(), err))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| format!("failed to read entry: {}", err))?;
    cases.retain(|path| path.join("input.hex").is_file());
    cases.sort();

    for case in &cases {
        let output = case.join("expected_report.json");
        regenerate_one(&case.join("input.hex"), &output)?;
        println!("regenerated {}", output.display());
    }

    Ok(())
}

fn regenerate_one(input: &Path, output: &Path) -> Result<(), String> {
    let report = decode_hex_file(input)
        .map_err(|err| format!("decoding failed for {}: {}", input.display(), err))?;
    let mut json = serde_json::to_string_pretty(&report)
        .map_err(|err| format!("JSON serialization failed: {}", err))?;
    json.push('\n');
    fs::write(output, json)
        .map_err(|err| format!("failed to write {}: {}", output.display(), err))?;
    Ok(())
}
