use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};

/// Longest string the peer can decode; its length prefix is a signed short.
pub const MAX_STRING_UNITS: usize = i16::MAX as usize;

/// Builds one outbound message in memory so it can be written to the socket
/// under a single acquisition of the output lock.
pub struct PacketWriter {
    buf: BytesMut,
}

impl PacketWriter {
    pub fn new() -> Self {
        Self { buf: BytesMut::new() }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    pub fn write_i8(&mut self, v: i8) {
        self.buf.put_i8(v);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.buf.put_u8(v as u8);
    }

    pub fn write_i16(&mut self, v: i16) {
        self.buf.put_i16(v);
    }

    pub fn write_i32(&mut self, v: i32) {
        self.buf.put_i32(v);
    }

    pub fn write_i64(&mut self, v: i64) {
        self.buf.put_i64(v);
    }

    pub fn write_f32(&mut self, v: f32) {
        self.buf.put_f32(v);
    }

    pub fn write_f64(&mut self, v: f64) {
        self.buf.put_f64(v);
    }

    /// Write a UTF-16 string: big-endian code-unit count, then the units
    /// big-endian. The empty string is exactly two zero bytes.
    pub fn write_string(&mut self, s: &str) -> Result<()> {
        let units: Vec<u16> = s.encode_utf16().collect();
        if units.len() > MAX_STRING_UNITS {
            return Err(Error::StringTooLong { len: units.len(), max: MAX_STRING_UNITS });
        }
        self.buf.reserve(2 + units.len() * 2);
        self.buf.put_u16(units.len() as u16);
        for unit in units {
            self.buf.put_u16(unit);
        }
        Ok(())
    }
}

impl Default for PacketWriter {
    fn default() -> Self {
        Self::new()
    }
}
