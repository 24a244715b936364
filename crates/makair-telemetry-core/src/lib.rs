//! MakAir telemetry core library.
//!
//! The decoder turns one framed telemetry packet emitted by the MakAir
//! ventilator firmware into a typed [`Message`]. It is pure and stateless:
//! no I/O, no logging of failures, no retained borrows. Around it sit the
//! offline pieces used by the CLI: packet sources (`source`), batch decoding
//! into a deterministic report (`analysis`), and the stack-function host
//! binding (`host`).
//!
//! Invariants:
//! - A packet without the `<type>:` prefix or with an unknown type decodes to
//!   `Ok(None)`, never to an error.
//! - A recognized packet either decodes completely or fails with a
//!   [`TelemetryError`]; no partial record is produced.
//! - Report outputs are deterministic for identical input.
//!
//! Version française (résumé):
//! Cette crate décode les trames de télémétrie du respirateur MakAir.
//! Le décodeur est pur ; les sources, le rapport et la liaison hôte restent
//! dans leurs modules respectifs.
//!
//! # Examples
//! ```
//! use makair_telemetry_core::{Message, decode};
//!
//! let mut packet = vec![b'O', b':', 0x01, 0x01, b'v'];
//! packet.extend_from_slice(&[0u8; 12]);
//! packet.push(0x09);
//! packet.extend_from_slice(&1000u64.to_be_bytes());
//!
//! let message = decode(&packet)?.expect("stopped message");
//! assert!(matches!(message, Message::Stopped(_)));
//! assert_eq!(message.header().systick, 1000);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

mod analysis;
pub mod host;
mod source;
mod telemetry;

pub use analysis::{AnalysisError, decode_hex_file, decode_source};
pub use source::{HexArgsSource, HexLineSource, PacketEvent, PacketSource, SourceError};
pub use telemetry::{
    AlarmPriority, AlarmTrap, BootMessage, DataSnapshot, Header, MachineStateSnapshot, Message,
    MessageKind, Mode, Phase, StoppedMessage, SubPhase, TelemetryError, decode,
};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;

/// Batch decoding report with packets in source order.
///
/// # Examples
/// ```
/// use makair_telemetry_core::make_stub_report;
///
/// let report = make_stub_report("capture.hex", 123);
/// assert_eq!(report.report_version, makair_telemetry_core::REPORT_VERSION);
/// assert!(report.packets.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// Input metadata.
    pub input: InputInfo,
    /// Outcome counters.
    pub summary: DecodeSummary,
    /// One record per packet, in source order.
    pub packets: Vec<PacketRecord>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Input metadata embedded in reports.
///
/// # Examples
/// ```
/// use makair_telemetry_core::InputInfo;
///
/// let input = InputInfo {
///     path: "capture.hex".to_string(),
///     bytes: 1024,
/// };
/// assert_eq!(input.bytes, 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided, or a label such as `<args>`.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Outcome counters for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeSummary {
    pub packets_total: u64,
    pub recognized: u64,
    pub unrecognized: u64,
    pub malformed: u64,
    /// Recognized packets per message type name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub by_type: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacketStatus {
    Recognized,
    Unrecognized,
    Malformed,
}

/// Decoding outcome for a single packet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketRecord {
    /// Line number of the packet within the input.
    pub line: u64,
    pub status: PacketStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    /// Decoder error for malformed packets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Build a stub report with base fields filled and no packets.
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "makair-telemetry".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        summary: DecodeSummary::default(),
        packets: vec![],
    }
}
