//! `Serializer`: an append-only byte buffer with one `write_*` method per primitive
//! the wire format supports (§3.1). Multi-byte values are written big-endian.

/// An append-only byte buffer. Every `write_*` call appends to the end; there is no
/// way to rewind, matching the original engine's one-shot message-building use.
#[derive(Debug, Clone, Default)]
pub struct Serializer {
    buffer: Vec<u8>,
}

impl Serializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.buffer.extend_from_slice(&value.to_bits().to_be_bytes());
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buffer.push(u8::from(value));
    }

    /// Length-prefixed (`u32`) UTF-8 bytes. Embedded NUL bytes survive intact since
    /// the length prefix, not a terminator, marks the end.
    pub fn write_string(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
    }

    /// Length-prefixed (`u32`) raw bytes.
    pub fn write_bytes(&mut self, value: &[u8]) {
        self.write_u32(value.len() as u32);
        self.buffer.extend_from_slice(value);
    }

    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    pub fn take_data(self) -> Vec<u8> {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Deserializer;

    #[test]
    fn u32_round_trips_as_big_endian() {
        let mut writer = Serializer::new();
        writer.write_u32(0xDEAD_BEEF);
        assert_eq!(writer.data(), &[0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn mixed_primitives_round_trip_through_one_frame() {
        let mut writer = Serializer::new();
        writer.write_u32(0xDEAD_BEEF);
        writer.write_string("roundtrip");
        writer.write_bool(true);

        let data = writer.take_data();
        let mut reader = Deserializer::new(&data);
        assert_eq!(reader.read_u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(reader.read_string().unwrap(), "roundtrip");
        assert!(reader.read_bool().unwrap());
        assert!(!reader.has_remaining());
    }
}
