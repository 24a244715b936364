use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use glob::glob;
use makair_telemetry_core::host::{self, Stack, StackValue};
use makair_telemetry_core::{HexArgsSource, InputInfo, PacketStatus, Report};
use tracing::Level;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("MAKAIR_BUILD_COMMIT"),
    " ",
    env!("MAKAIR_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "makair-telemetry")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decoder for MakAir ventilator telemetry packets.",
    long_about = None,
    after_help = "Examples:\n  makair-telemetry decode -f capture.hex -o report.json\n  makair-telemetry decode 4f3a0101... --stdout --pretty\n  makair-telemetry call MAKAIR.TELEMETRY-> 4f3a0101..."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode hex-encoded packets and generate a versioned JSON report.
    #[command(alias = "parse")]
    #[command(
        after_help = "Examples:\n  makair-telemetry decode -f capture.hex -o report.json\n  makair-telemetry decode 4f3a0101... --stdout"
    )]
    Decode {
        /// Hex-encoded packets (one per argument)
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        packets: Vec<String>,

        /// File with one hex-encoded packet per line
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Exit with a non-zero code if any packet is malformed
        #[arg(long)]
        strict: bool,

        /// List malformed packets after decoding
        #[arg(long)]
        list_errors: bool,
    },
    /// List the registered host functions.
    Functions,
    /// Apply a registered host function to one argument.
    Call {
        /// Registered function name (e.g. MAKAIR.TELEMETRY->)
        name: String,

        /// Argument pushed on the stack: bytes when valid hex, text otherwise
        arg: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Decode {
            packets,
            file,
            report,
            stdout,
            pretty,
            compact,
            quiet,
            strict,
            list_errors,
        } => cmd_decode(
            DecodeInput::from_args(packets, file),
            OutputOptions {
                report,
                stdout,
                pretty,
                compact,
                quiet,
                strict,
                list_errors,
            },
        ),
        Commands::Functions => cmd_functions(),
        Commands::Call { name, arg } => cmd_call(&name, &arg),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

#[derive(Debug)]
enum DecodeInput {
    Inline(Vec<String>),
    File(PathBuf),
}

impl DecodeInput {
    fn from_args(packets: Vec<String>, file: Option<PathBuf>) -> Self {
        match file {
            Some(path) => DecodeInput::File(path),
            None => DecodeInput::Inline(packets),
        }
    }
}

#[derive(Debug)]
struct OutputOptions {
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    quiet: bool,
    strict: bool,
    list_errors: bool,
}

fn cmd_decode(input: DecodeInput, options: OutputOptions) -> Result<(), CliError> {
    let report_path = if options.stdout {
        None
    } else {
        Some(options.report.clone().ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };

    let rep = match input {
        DecodeInput::File(path) => {
            let resolved = resolve_input_path(&path)?;
            validate_input_file(&resolved)?;
            if let Some(report_path) = report_path.as_ref() {
                ensure_distinct_paths(&resolved, report_path)?;
            }
            makair_telemetry_core::decode_hex_file(&resolved)
                .context("telemetry decoding failed")?
        }
        DecodeInput::Inline(packets) => {
            let info = InputInfo {
                path: "<args>".to_string(),
                bytes: packets.iter().map(|p| p.len() as u64).sum(),
            };
            let source = HexArgsSource::new(packets);
            makair_telemetry_core::decode_source(info, source)
                .context("telemetry decoding failed")?
        }
    };
    tracing::info!(
        packets = rep.summary.packets_total,
        recognized = rep.summary.recognized,
        malformed = rep.summary.malformed,
        "decoded telemetry"
    );

    let json = serialize_report(&rep, options.pretty, options.compact)?;

    match report_path {
        None => print!("{}", json),
        Some(report) => {
            if let Some(parent) = report.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&report, json)
                .with_context(|| format!("Failed to write report: {}", report.display()))?;
            if !options.quiet {
                eprintln!("OK: report written -> {}", report.display());
            }
        }
    }

    if options.list_errors && !options.quiet {
        print_errors(&rep);
    }
    if options.strict && rep.summary.malformed > 0 {
        return Err(CliError::new(
            format!("{} malformed packet(s) detected", rep.summary.malformed),
            Some("use --list-errors to inspect".to_string()),
        ));
    }
    Ok(())
}

fn cmd_functions() -> Result<(), CliError> {
    for function in host::functions() {
        println!("{}", function.name());
    }
    Ok(())
}

fn cmd_call(name: &str, arg: &str) -> Result<(), CliError> {
    let function = host::lookup(name).ok_or_else(|| {
        CliError::new(
            format!("unknown function '{}'", name),
            Some("run `makair-telemetry functions` to list registered functions".to_string()),
        )
    })?;

    let digits: String = arg.split_ascii_whitespace().collect();
    let value = match hex::decode(&digits) {
        Ok(bytes) => StackValue::Bytes(bytes),
        Err(_) => StackValue::Text(arg.to_string()),
    };

    let mut stack = Stack::new();
    stack.push(value);
    function
        .apply(&mut stack)
        .map_err(|err| CliError::new(err.to_string(), None))?;

    let top = stack
        .peek()
        .map(StackValue::to_json)
        .transpose()
        .context("JSON serialization failed")?;
    let json =
        serde_json::to_string(&top.unwrap_or_default()).context("JSON serialization failed")?;
    println!("{}", json);
    Ok(())
}

fn serialize_report(rep: &Report, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn print_errors(rep: &Report) {
    eprintln!("Malformed packets:");
    for packet in rep
        .packets
        .iter()
        .filter(|packet| packet.status == PacketStatus::Malformed)
    {
        eprintln!(
            "  line {}: {}",
            packet.line,
            packet.error.as_deref().unwrap_or("unknown error")
        );
    }
}

fn ensure_distinct_paths(input: &PathBuf, report_path: &PathBuf) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let report_dir = report_path
        .parent()
        .map(|parent| {
            if parent.as_os_str().is_empty() {
                fs::canonicalize(".")
            } else {
                fs::canonicalize(parent)
            }
        })
        .transpose()
        .ok()
        .flatten();
    // Output directory may not exist yet.
    let Some(report_dir) = report_dir else {
        return Ok(());
    };
    let report_target = report_dir.join(
        report_path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid report path"))?,
    );
    if report_target == input_abs {
        return Err(CliError::new(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn validate_input_file(input: &PathBuf) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a text file with one hex packet per line".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a text file with one hex packet per line".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &PathBuf) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.clone());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    if matches.len() > 1 {
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let more = if matches.len() > 3 { ", ..." } else { "" };
        return Err(CliError::new(
            format!(
                "multiple files match pattern '{}' ({} matches); matches: {}{}",
                pattern,
                matches.len(),
                listed,
                more
            ),
            Some("pass a single capture file, or run once per file".to_string()),
        ));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
