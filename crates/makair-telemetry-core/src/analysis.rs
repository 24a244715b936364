use std::path::Path;

use thiserror::Error;

use crate::source::{HexLineSource, PacketEvent, PacketSource, SourceError};
use crate::telemetry::decode;
use crate::{InputInfo, PacketRecord, PacketStatus, Report, make_stub_report};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Decode every packet of a hex capture file (one packet per line).
pub fn decode_hex_file(path: &Path) -> Result<Report, AnalysisError> {
    let input = InputInfo {
        path: path.display().to_string(),
        bytes: path.metadata()?.len(),
    };
    let source = HexLineSource::open(path)?;
    decode_source(input, source)
}

/// Decode every packet produced by `source`.
///
/// Malformed packets are recorded with their error and do not stop the batch;
/// source errors do.
pub fn decode_source<S: PacketSource>(
    input: InputInfo,
    mut source: S,
) -> Result<Report, AnalysisError> {
    let mut report = make_stub_report(&input.path, input.bytes);

    while let Some(PacketEvent { line, data }) = source.next_packet()? {
        let record = decode_packet(line, &data);
        let summary = &mut report.summary;
        summary.packets_total += 1;
        match record.status {
            PacketStatus::Recognized => summary.recognized += 1,
            PacketStatus::Unrecognized => summary.unrecognized += 1,
            PacketStatus::Malformed => summary.malformed += 1,
        }
        if let Some(message) = record.message.as_ref() {
            *summary
                .by_type
                .entry(message.kind().type_name().to_string())
                .or_default() += 1;
        }
        report.packets.push(record);
    }

    Ok(report)
}

fn decode_packet(line: u64, data: &[u8]) -> PacketRecord {
    match decode(data) {
        Ok(Some(message)) => PacketRecord {
            line,
            status: PacketStatus::Recognized,
            message: Some(message),
            error: None,
        },
        Ok(None) => PacketRecord {
            line,
            status: PacketStatus::Unrecognized,
            message: None,
            error: None,
        },
        Err(err) => {
            tracing::debug!(line, error = %err, "malformed telemetry packet");
            PacketRecord {
                line,
                status: PacketStatus::Malformed,
                message: None,
                error: Some(err.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::decode_source;
    use crate::source::HexLineSource;
    use crate::{InputInfo, PacketStatus};

    const STOPPED: &str = "4f3a0101763031323334353637383941420900000000000003e8";

    fn input() -> InputInfo {
        InputInfo {
            path: "<memory>".to_string(),
            bytes: 0,
        }
    }

    #[test]
    fn counts_each_outcome() {
        let text = format!("{STOPPED}\n583a00\n423a01\n{STOPPED}\n");
        let source = HexLineSource::from_reader(Cursor::new(text));
        let report = decode_source(input(), source).unwrap();

        assert_eq!(report.summary.packets_total, 4);
        assert_eq!(report.summary.recognized, 2);
        assert_eq!(report.summary.unrecognized, 1);
        assert_eq!(report.summary.malformed, 1);
        assert_eq!(report.summary.by_type.get("StoppedMessage"), Some(&2));

        let statuses: Vec<_> = report.packets.iter().map(|p| p.status).collect();
        assert_eq!(
            statuses,
            vec![
                PacketStatus::Recognized,
                PacketStatus::Unrecognized,
                PacketStatus::Malformed,
                PacketStatus::Recognized,
            ]
        );
        let malformed = &report.packets[2];
        assert_eq!(malformed.line, 3);
        assert!(malformed.error.as_deref().unwrap().contains("payload too short"));
    }

    #[test]
    fn invalid_hex_aborts_batch() {
        let source = HexLineSource::from_reader(Cursor::new("4f3a\nnot-hex\n"));
        let err = decode_source(input(), source).unwrap_err();
        assert!(err.to_string().contains("invalid hex on line 2"));
    }

    #[test]
    fn empty_source_yields_empty_report() {
        let source = HexLineSource::from_reader(Cursor::new(""));
        let report = decode_source(input(), source).unwrap();
        assert_eq!(report.summary.packets_total, 0);
        assert!(report.packets.is_empty());
    }
}
