use super::error::TelemetryError;
use super::layout;

/// Forward-only cursor over a telemetry packet.
///
/// Every read is bounds-checked and names the field being read so that a
/// truncated packet reports where decoding stopped.
pub struct TelemetryReader<'a> {
    payload: &'a [u8],
    position: usize,
}

impl<'a> TelemetryReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self {
            payload,
            position: 0,
        }
    }

    #[cfg(test)]
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.payload.len().saturating_sub(self.position)
    }

    /// Consume the `<type>:` prefix and return the type discriminant.
    ///
    /// Returns `None` (without advancing) when the payload is too short or the
    /// marker byte is not `:`.
    pub fn read_prefix(&mut self) -> Option<u8> {
        if self.payload.len() < layout::MIN_LEN {
            return None;
        }
        if self.payload.get(layout::MARKER_OFFSET) != Some(&layout::MARKER) {
            return None;
        }
        let discriminant = self.payload.get(layout::DISCRIMINANT_OFFSET).copied()?;
        self.position = layout::MIN_LEN;
        Some(discriminant)
    }

    pub fn read_slice(
        &mut self,
        len: usize,
        field: &'static str,
    ) -> Result<&'a [u8], TelemetryError> {
        let too_short = TelemetryError::TooShort {
            field,
            offset: self.position,
            needed: len,
            actual: self.remaining(),
        };
        let end = self.position.checked_add(len).ok_or(too_short.clone())?;
        let bytes = self.payload.get(self.position..end).ok_or(too_short)?;
        self.position = end;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(
        &mut self,
        field: &'static str,
    ) -> Result<[u8; N], TelemetryError> {
        let bytes = self.read_slice(N, field)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self, field: &'static str) -> Result<u8, TelemetryError> {
        let [value] = self.read_array::<1>(field)?;
        Ok(value)
    }

    pub fn read_u16_be(&mut self, field: &'static str) -> Result<u16, TelemetryError> {
        self.read_array(field).map(u16::from_be_bytes)
    }

    pub fn read_u32_be(&mut self, field: &'static str) -> Result<u32, TelemetryError> {
        self.read_array(field).map(u32::from_be_bytes)
    }

    pub fn read_u64_be(&mut self, field: &'static str) -> Result<u64, TelemetryError> {
        self.read_array(field).map(u64::from_be_bytes)
    }

    /// Read one length byte followed by that many bytes.
    pub fn read_length_prefixed(
        &mut self,
        field: &'static str,
    ) -> Result<&'a [u8], TelemetryError> {
        let len = self.read_u8(field)?;
        self.read_slice(len as usize, field)
    }

    /// Read a length-prefixed ISO-8859-1 string (byte value == code point).
    pub fn read_latin1_string(&mut self, field: &'static str) -> Result<String, TelemetryError> {
        let bytes = self.read_length_prefixed(field)?;
        Ok(bytes.iter().copied().map(char::from).collect())
    }

    /// Read the separator that must follow `after`.
    pub fn expect_separator(&mut self, after: &'static str) -> Result<(), TelemetryError> {
        let offset = self.position;
        let found = self.read_u8("separator")?;
        if found != layout::SEPARATOR {
            return Err(TelemetryError::InvalidSeparator {
                after,
                offset,
                found,
            });
        }
        Ok(())
    }
}
