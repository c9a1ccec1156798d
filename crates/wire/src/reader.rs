//! `Deserializer`: a cursor over a borrowed byte slice with the mirror-image
//! `read_*` methods. A read past the end of the buffer raises `Underflow` rather than
//! panicking (§7) — the one error class in this core modeled as a typed `Result`.

use crate::{Result, Underflow};

#[derive(Debug, Clone, Copy)]
pub struct Deserializer<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Deserializer<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub const fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub const fn has_remaining(&self) -> bool {
        self.offset < self.data.len()
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(Underflow { requested: len, remaining: self.remaining() });
        }
        let slice = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes: [u8; 2] = self.take(2)?.try_into().expect("length checked by take");
        Ok(u16::from_be_bytes(bytes))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes: [u8; 4] = self.take(4)?.try_into().expect("length checked by take");
        Ok(u32::from_be_bytes(bytes))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let bytes: [u8; 8] = self.take(8)?.try_into().expect("length checked by take");
        Ok(u64::from_be_bytes(bytes))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let bytes: [u8; 4] = self.take(4)?.try_into().expect("length checked by take");
        Ok(i32::from_be_bytes(bytes))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        let bytes: [u8; 8] = self.take(8)?.try_into().expect("length checked by take");
        Ok(i64::from_be_bytes(bytes))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        let bytes: [u8; 8] = self.take(8)?.try_into().expect("length checked by take");
        Ok(f64::from_bits(u64::from_be_bytes(bytes)))
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32()? as usize;
        self.take(len)
    }

    pub fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_bytes()?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Serializer;

    #[test]
    fn reading_past_the_end_raises_underflow() {
        let mut reader = Deserializer::new(&[]);
        assert_eq!(reader.read_u8(), Err(Underflow { requested: 1, remaining: 0 }));
    }

    #[test]
    fn strings_with_embedded_nul_bytes_survive() {
        let mut writer = Serializer::new();
        writer.write_string("a\0b");
        let data = writer.take_data();
        let mut reader = Deserializer::new(&data);
        assert_eq!(reader.read_string().unwrap(), "a\0b");
    }

    #[test]
    fn f64_special_values_preserve_bit_pattern() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 0.0, -0.0, f64::MIN, f64::MAX, f64::MIN_POSITIVE] {
            let mut writer = Serializer::new();
            writer.write_f64(value);
            let data = writer.take_data();
            let mut reader = Deserializer::new(&data);
            let round_tripped = reader.read_f64().unwrap();
            assert_eq!(round_tripped.to_bits(), value.to_bits());
        }
    }

    #[test]
    fn zero_length_byte_blob_round_trips() {
        let mut writer = Serializer::new();
        writer.write_bytes(&[]);
        let data = writer.take_data();
        let mut reader = Deserializer::new(&data);
        assert_eq!(reader.read_bytes().unwrap(), &[] as &[u8]);
        assert!(!reader.has_remaining());
    }
}
