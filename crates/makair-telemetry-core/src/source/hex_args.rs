use std::iter::Enumerate;
use std::vec::IntoIter;

use super::{PacketEvent, PacketSource, SourceError};

/// Packet source over a list of hex strings, one packet per entry.
///
/// Entries are numbered from 1 and are never skipped: an empty entry is an
/// empty packet. ASCII whitespace (newlines included) inside an entry is
/// ignored.
pub struct HexArgsSource {
    entries: Enumerate<IntoIter<String>>,
}

impl HexArgsSource {
    pub fn new(entries: Vec<String>) -> Self {
        Self {
            entries: entries.into_iter().enumerate(),
        }
    }
}

impl PacketSource for HexArgsSource {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError> {
        let Some((index, entry)) = self.entries.next() else {
            return Ok(None);
        };
        let line = index as u64 + 1;
        let digits: String = entry.split_ascii_whitespace().collect();
        let data = hex::decode(&digits).map_err(|err| SourceError::InvalidHex {
            line,
            message: err.to_string(),
        })?;
        Ok(Some(PacketEvent { line, data }))
    }
}
