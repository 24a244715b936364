mod hex_args;
mod hex_lines;

pub use hex_args::HexArgsSource;
pub use hex_lines::HexLineSource;

use thiserror::Error;

/// One framed packet read from a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketEvent {
    /// 1-based line (or record) number within the source.
    pub line: u64,
    pub data: Vec<u8>,
}

pub trait PacketSource {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex on line {line}: {message}")]
    InvalidHex { line: u64, message: String },
}
