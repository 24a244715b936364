pub const MIN_LEN: usize = 2;
pub const DISCRIMINANT_OFFSET: usize = 0;
pub const MARKER_OFFSET: usize = 1;
pub const MARKER: u8 = b':';

pub const PROTOCOL_MARKER: u8 = 0x01;
pub const SEPARATOR: u8 = 0x09;
pub const DEVICE_ID_LEN: usize = 12;

pub const TYPE_BOOT: u8 = b'B';
pub const TYPE_STOPPED: u8 = b'O';
pub const TYPE_DATA_SNAPSHOT: u8 = b'D';
pub const TYPE_MACHINE_STATE_SNAPSHOT: u8 = b'S';
pub const TYPE_ALARM_TRAP: u8 = b'T';

pub const PHASE_INHALATION: u8 = 0x10;
pub const PHASE_EXHALATION: u8 = 0x40;
pub const SUBPHASE_INSPIRATION: u8 = 0x01;
pub const SUBPHASE_HOLD_INSPIRATION: u8 = 0x02;
pub const SUBPHASE_EXHALE: u8 = 0x04;

pub const PRIORITY_LOW: u8 = 0x01;
pub const PRIORITY_MEDIUM: u8 = 0x02;
pub const PRIORITY_HIGH: u8 = 0x04;

pub const TRIGGERED_ON: u8 = 0xF0;
pub const TRIGGERED_OFF: u8 = 0x0F;
