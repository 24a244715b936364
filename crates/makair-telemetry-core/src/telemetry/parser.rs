use super::error::TelemetryError;
use super::layout;
use super::message::{
    AlarmPriority, AlarmTrap, BootMessage, DataSnapshot, Header, MachineStateSnapshot, Message,
    MessageKind, Mode, Phase, StoppedMessage, SubPhase,
};
use super::reader::TelemetryReader;

/// Decode one telemetry packet.
///
/// Returns `Ok(None)` when the packet does not carry the `<type>:` prefix or
/// the type is not one of `B`, `O`, `D`, `S`, `T`. Any violation inside a
/// recognized packet is an error; no partial message is returned.
///
/// # Examples
/// ```
/// use makair_telemetry_core::decode;
///
/// assert_eq!(decode(b"X:payload").unwrap(), None);
/// assert_eq!(decode(b"B").unwrap(), None);
/// assert!(decode(b"B:").is_err());
/// ```
pub fn decode(payload: &[u8]) -> Result<Option<Message>, TelemetryError> {
    let mut reader = TelemetryReader::new(payload);
    let Some(discriminant) = reader.read_prefix() else {
        return Ok(None);
    };
    let Some(kind) = MessageKind::from_discriminant(discriminant) else {
        return Ok(None);
    };

    let message = match kind {
        MessageKind::Boot => Message::Boot(read_boot(&mut reader)?),
        MessageKind::Stopped => Message::Stopped(read_stopped(&mut reader)?),
        MessageKind::DataSnapshot => Message::DataSnapshot(read_data_snapshot(&mut reader)?),
        MessageKind::MachineStateSnapshot => {
            Message::MachineStateSnapshot(read_machine_state_snapshot(&mut reader)?)
        }
        MessageKind::AlarmTrap => Message::AlarmTrap(read_alarm_trap(&mut reader)?),
    };
    Ok(Some(message))
}

/// Header up to and including systick. The separator after systick belongs to
/// the variant since the stopped message has none.
fn read_header(reader: &mut TelemetryReader<'_>) -> Result<Header, TelemetryError> {
    let marker = reader.read_u8("protocol marker")?;
    if marker != layout::PROTOCOL_MARKER {
        return Err(TelemetryError::InvalidProtocolMarker { found: marker });
    }
    let version = reader.read_latin1_string("version")?;
    let device_id = reader.read_array::<{ layout::DEVICE_ID_LEN }>("device_id")?;
    reader.expect_separator("device_id")?;
    let systick = reader.read_u64_be("systick")?;

    Ok(Header {
        version,
        device_id,
        systick,
    })
}

fn read_boot(reader: &mut TelemetryReader<'_>) -> Result<BootMessage, TelemetryError> {
    let header = read_header(reader)?;
    reader.expect_separator("systick")?;
    let mode = reader.read_u8("mode")?;
    let mode = Mode::from_wire(mode).ok_or(TelemetryError::InvalidMode { value: mode })?;
    reader.expect_separator("mode")?;
    let value128 = reader.read_u8("value128")?;

    Ok(BootMessage {
        header,
        mode,
        value128,
    })
}

fn read_stopped(reader: &mut TelemetryReader<'_>) -> Result<StoppedMessage, TelemetryError> {
    let header = read_header(reader)?;
    Ok(StoppedMessage { header })
}

fn read_data_snapshot(reader: &mut TelemetryReader<'_>) -> Result<DataSnapshot, TelemetryError> {
    let header = read_header(reader)?;
    reader.expect_separator("systick")?;
    let centile = reader.read_u16_be("centile")?;
    reader.expect_separator("centile")?;
    let pressure = reader.read_u16_be("pressure")?;
    reader.expect_separator("pressure")?;
    let (phase, subphase) = decode_phases(reader.read_u8("phases")?)?;
    reader.expect_separator("phases")?;
    let blower_valve_position = reader.read_u8("blower_valve_position")?;
    reader.expect_separator("blower_valve_position")?;
    let patient_valve_position = reader.read_u8("patient_valve_position")?;
    reader.expect_separator("patient_valve_position")?;
    let blower_rpm = reader.read_u8("blower_rpm")?;
    reader.expect_separator("blower_rpm")?;
    let battery_level = reader.read_u8("battery_level")?;

    Ok(DataSnapshot {
        header,
        centile,
        pressure,
        phase,
        subphase,
        blower_valve_position,
        patient_valve_position,
        blower_rpm,
        battery_level,
    })
}

fn read_machine_state_snapshot(
    reader: &mut TelemetryReader<'_>,
) -> Result<MachineStateSnapshot, TelemetryError> {
    let header = read_header(reader)?;
    reader.expect_separator("systick")?;
    let cycle = reader.read_u32_be("cycle")?;
    tracing::trace!(cycle, systick = header.systick, "machine state snapshot");
    reader.expect_separator("cycle")?;
    let peak_command = reader.read_u8("peak_command")?;
    reader.expect_separator("peak_command")?;
    let plateau_command = reader.read_u8("plateau_command")?;
    reader.expect_separator("plateau_command")?;
    let peep_command = reader.read_u8("peep_command")?;
    reader.expect_separator("peep_command")?;
    let cpm_command = reader.read_u8("cpm_command")?;
    reader.expect_separator("cpm_command")?;
    let previous_peak_pressure = reader.read_u16_be("previous_peak_pressure")?;
    reader.expect_separator("previous_peak_pressure")?;
    let previous_plateau_pressure = reader.read_u16_be("previous_plateau_pressure")?;
    reader.expect_separator("previous_plateau_pressure")?;
    let previous_peep_pressure = reader.read_u16_be("previous_peep_pressure")?;
    reader.expect_separator("previous_peep_pressure")?;
    let current_alarm_codes = reader.read_length_prefixed("current_alarm_codes")?.to_vec();

    Ok(MachineStateSnapshot {
        header,
        cycle,
        peak_command,
        plateau_command,
        peep_command,
        cpm_command,
        previous_peak_pressure,
        previous_plateau_pressure,
        previous_peep_pressure,
        current_alarm_codes,
    })
}

fn read_alarm_trap(reader: &mut TelemetryReader<'_>) -> Result<AlarmTrap, TelemetryError> {
    let header = read_header(reader)?;
    reader.expect_separator("systick")?;
    let centile = reader.read_u16_be("centile")?;
    reader.expect_separator("centile")?;
    let pressure = reader.read_u16_be("pressure")?;
    reader.expect_separator("pressure")?;
    let (phase, subphase) = decode_phases(reader.read_u8("phases")?)?;
    reader.expect_separator("phases")?;
    let cycle = reader.read_u32_be("cycle")?;
    reader.expect_separator("cycle")?;
    let alarm_code = reader.read_u8("alarm_code")?;
    reader.expect_separator("alarm_code")?;
    let priority = reader.read_u8("alarm_priority")?;
    let alarm_priority = AlarmPriority::from_wire(priority)
        .ok_or(TelemetryError::InvalidAlarmPriority { value: priority })?;
    reader.expect_separator("alarm_priority")?;
    let triggered = decode_triggered(reader.read_u8("triggered")?)?;
    reader.expect_separator("triggered")?;
    let expected = reader.read_u32_be("expected")?;
    reader.expect_separator("expected")?;
    let measured = reader.read_u32_be("measured")?;
    reader.expect_separator("measured")?;
    let cycles_since_trigger = reader.read_u32_be("cycles_since_trigger")?;

    Ok(AlarmTrap {
        header,
        centile,
        pressure,
        phase,
        subphase,
        cycle,
        alarm_code,
        alarm_priority,
        triggered,
        expected,
        measured,
        cycles_since_trigger,
    })
}

/// Phase and subphase are independent bit tests on the same byte; the first
/// matching bit wins in each group.
pub(crate) fn decode_phases(value: u8) -> Result<(Phase, SubPhase), TelemetryError> {
    let phase = if value & layout::PHASE_INHALATION != 0 {
        Phase::Inhalation
    } else if value & layout::PHASE_EXHALATION != 0 {
        Phase::Exhalation
    } else {
        return Err(TelemetryError::InvalidPhase { value });
    };

    let subphase = if value & layout::SUBPHASE_INSPIRATION != 0 {
        SubPhase::Inspiration
    } else if value & layout::SUBPHASE_HOLD_INSPIRATION != 0 {
        SubPhase::HoldInspiration
    } else if value & layout::SUBPHASE_EXHALE != 0 {
        SubPhase::Exhale
    } else {
        return Err(TelemetryError::InvalidSubPhase { value });
    };

    Ok((phase, subphase))
}

pub(crate) fn decode_triggered(value: u8) -> Result<bool, TelemetryError> {
    match value {
        layout::TRIGGERED_ON => Ok(true),
        layout::TRIGGERED_OFF => Ok(false),
        _ => Err(TelemetryError::InvalidTriggered { value }),
    }
}
