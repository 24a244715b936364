use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{PacketEvent, PacketSource, SourceError};

const COMMENT_PREFIX: char = '#';

/// Packet source reading one hex-encoded packet per line.
///
/// ASCII whitespace inside a line is ignored so that dumps like
/// `42 3a 01 ...` are accepted. Blank lines and `#` comments are skipped.
pub struct HexLineSource<R> {
    reader: R,
    line: u64,
    buf: String,
}

impl HexLineSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> HexLineSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> PacketSource for HexLineSource<R> {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let trimmed = self.buf.trim();
            if trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX) {
                continue;
            }

            let digits: String = trimmed.split_ascii_whitespace().collect();
            let data = hex::decode(&digits).map_err(|err| SourceError::InvalidHex {
                line: self.line,
                message: err.to_string(),
            })?;
            return Ok(Some(PacketEvent {
                line: self.line,
                data,
            }));
        }
    }
}
