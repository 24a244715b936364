use std::fmt;

use serde::{Deserialize, Serialize};

use super::layout;

/// Message type selected by the discriminant byte at offset 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageKind {
    Boot,
    Stopped,
    DataSnapshot,
    MachineStateSnapshot,
    AlarmTrap,
}

impl MessageKind {
    pub fn from_discriminant(value: u8) -> Option<Self> {
        match value {
            layout::TYPE_BOOT => Some(Self::Boot),
            layout::TYPE_STOPPED => Some(Self::Stopped),
            layout::TYPE_DATA_SNAPSHOT => Some(Self::DataSnapshot),
            layout::TYPE_MACHINE_STATE_SNAPSHOT => Some(Self::MachineStateSnapshot),
            layout::TYPE_ALARM_TRAP => Some(Self::AlarmTrap),
            _ => None,
        }
    }

    pub fn discriminant(self) -> u8 {
        match self {
            Self::Boot => layout::TYPE_BOOT,
            Self::Stopped => layout::TYPE_STOPPED,
            Self::DataSnapshot => layout::TYPE_DATA_SNAPSHOT,
            Self::MachineStateSnapshot => layout::TYPE_MACHINE_STATE_SNAPSHOT,
            Self::AlarmTrap => layout::TYPE_ALARM_TRAP,
        }
    }

    /// Name used for the `type` key of a decoded record.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Boot => "BootMessage",
            Self::Stopped => "StoppedMessage",
            Self::DataSnapshot => "DataSnapshot",
            Self::MachineStateSnapshot => "MachineStateSnapshot",
            Self::AlarmTrap => "AlarmTrap",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Firmware build mode reported at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "PRODUCTION")]
    Production,
    #[serde(rename = "QUALIFICATION")]
    Qualification,
    #[serde(rename = "INTEGRATIONTEST")]
    IntegrationTest,
}

impl Mode {
    const ORDERED: [Mode; 3] = [Mode::Production, Mode::Qualification, Mode::IntegrationTest];

    /// Wire values are 1-based ordinals.
    pub fn from_wire(value: u8) -> Option<Self> {
        let index = value.checked_sub(1)?;
        Self::ORDERED.get(index as usize).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Inhalation,
    Exhalation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubPhase {
    Inspiration,
    HoldInspiration,
    Exhale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmPriority {
    Low,
    Medium,
    High,
}

impl AlarmPriority {
    /// Only the exact single-bit values are accepted.
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            layout::PRIORITY_LOW => Some(Self::Low),
            layout::PRIORITY_MEDIUM => Some(Self::Medium),
            layout::PRIORITY_HIGH => Some(Self::High),
            _ => None,
        }
    }
}

/// Fields shared by every message type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub version: String,
    /// Opaque device identifier, kept as raw bytes.
    pub device_id: [u8; layout::DEVICE_ID_LEN],
    /// Firmware tick counter.
    pub systick: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootMessage {
    #[serde(flatten)]
    pub header: Header,
    pub mode: Mode,
    pub value128: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoppedMessage {
    #[serde(flatten)]
    pub header: Header,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSnapshot {
    #[serde(flatten)]
    pub header: Header,
    pub centile: u16,
    pub pressure: u16,
    pub phase: Phase,
    pub subphase: SubPhase,
    pub blower_valve_position: u8,
    pub patient_valve_position: u8,
    pub blower_rpm: u8,
    pub battery_level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineStateSnapshot {
    #[serde(flatten)]
    pub header: Header,
    pub cycle: u32,
    pub peak_command: u8,
    pub plateau_command: u8,
    pub peep_command: u8,
    pub cpm_command: u8,
    pub previous_peak_pressure: u16,
    pub previous_plateau_pressure: u16,
    pub previous_peep_pressure: u16,
    /// Alarm codes in wire order.
    pub current_alarm_codes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmTrap {
    #[serde(flatten)]
    pub header: Header,
    pub centile: u16,
    pub pressure: u16,
    pub phase: Phase,
    pub subphase: SubPhase,
    pub cycle: u32,
    pub alarm_code: u8,
    pub alarm_priority: AlarmPriority,
    pub triggered: bool,
    pub expected: u32,
    pub measured: u32,
    pub cycles_since_trigger: u32,
}

/// A decoded telemetry message.
///
/// Serializes as a flat map whose `type` key names the variant.
///
/// # Examples
/// ```
/// use makair_telemetry_core::{Header, Message, StoppedMessage};
///
/// let message = Message::Stopped(StoppedMessage {
///     header: Header {
///         version: "v1".to_string(),
///         device_id: [0; 12],
///         systick: 42,
///     },
/// });
/// let value = serde_json::to_value(&message).unwrap();
/// assert_eq!(value["type"], "StoppedMessage");
/// assert_eq!(value["systick"], 42);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    #[serde(rename = "BootMessage")]
    Boot(BootMessage),
    #[serde(rename = "StoppedMessage")]
    Stopped(StoppedMessage),
    DataSnapshot(DataSnapshot),
    MachineStateSnapshot(MachineStateSnapshot),
    AlarmTrap(AlarmTrap),
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Boot(_) => MessageKind::Boot,
            Message::Stopped(_) => MessageKind::Stopped,
            Message::DataSnapshot(_) => MessageKind::DataSnapshot,
            Message::MachineStateSnapshot(_) => MessageKind::MachineStateSnapshot,
            Message::AlarmTrap(_) => MessageKind::AlarmTrap,
        }
    }

    pub fn header(&self) -> &Header {
        match self {
            Message::Boot(message) => &message.header,
            Message::Stopped(message) => &message.header,
            Message::DataSnapshot(message) => &message.header,
            Message::MachineStateSnapshot(message) => &message.header,
            Message::AlarmTrap(message) => &message.header,
        }
    }
}
