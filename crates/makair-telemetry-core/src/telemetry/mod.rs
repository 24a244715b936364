//! MakAir telemetry packet decoding.
//!
//! A packet starts with a `<type>:` prefix, followed by a shared header
//! (protocol marker, length-prefixed version, 12-byte device id, systick)
//! and a fixed per-type field table. Fields are big-endian and separated by
//! `0x09` bytes, which are checked rather than skipped.
//!
//! Unrecognized packets decode to `Ok(None)`; a recognized packet that breaks
//! its layout is a `TelemetryError`. Wire positions live in `layout`, bounded
//! cursor reads in `reader`, typed records in `message`.
//!
//! Version française (résumé):
//! Décodage des trames de télémétrie MakAir. Une trame inconnue donne
//! `Ok(None)`, une trame reconnue mais corrompue donne une erreur explicite.

pub mod error;
pub mod layout;
pub mod message;
pub mod parser;
pub mod reader;

pub use error::TelemetryError;
pub use message::{
    AlarmPriority, AlarmTrap, BootMessage, DataSnapshot, Header, MachineStateSnapshot, Message,
    MessageKind, Mode, Phase, StoppedMessage, SubPhase,
};
pub use parser::decode;
