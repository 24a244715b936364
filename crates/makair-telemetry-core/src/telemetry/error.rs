use thiserror::Error;

/// Errors returned when a recognized telemetry packet is malformed.
///
/// An unrecognized packet is not an error: `decode` returns `Ok(None)` for it.
///
/// # Examples
/// ```
/// use makair_telemetry_core::TelemetryError;
///
/// let err = TelemetryError::InvalidAlarmPriority { value: 0x03 };
/// assert!(err.to_string().contains("invalid alarm priority"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TelemetryError {
    #[error("payload too short reading {field} at offset {offset}: need {needed} bytes, got {actual}")]
    TooShort {
        field: &'static str,
        offset: usize,
        needed: usize,
        actual: usize,
    },
    #[error("invalid protocol marker: expected 0x01, found {found:#04x}")]
    InvalidProtocolMarker { found: u8 },
    #[error("invalid separator after {after} at offset {offset}: expected 0x09, found {found:#04x}")]
    InvalidSeparator {
        after: &'static str,
        offset: usize,
        found: u8,
    },
    #[error("invalid phase: {value:#04x}")]
    InvalidPhase { value: u8 },
    #[error("invalid subphase: {value:#04x}")]
    InvalidSubPhase { value: u8 },
    #[error("invalid alarm priority: {value:#04x}")]
    InvalidAlarmPriority { value: u8 },
    #[error("invalid triggered value: {value:#04x}")]
    InvalidTriggered { value: u8 },
    #[error("invalid mode: {value}")]
    InvalidMode { value: u8 },
}
