//! Little-endian parameter streams used for method-call payloads.
//!
//! Every request and response body is a flat stream of primitives,
//! length-prefixed strings/buffers and counted lists. Strings carry a
//! u16 length that includes a single NUL terminator; buffers carry a
//! u32 length; "q" buffers carry a u16 length.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors that can occur while decoding a parameter stream
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unexpected end of stream")]
    UnexpectedEof,
    #[error("malformed string data")]
    InvalidString,
}

/// Types that can be decoded from a parameter stream
pub trait FromStream: Sized {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self>;
}

/// Types that can be encoded onto a parameter stream
pub trait ToStream {
    fn to_stream(&self, w: &mut StreamWriter);
}

/// Reader over a borrowed payload slice
pub struct StreamReader<'a> {
    buf: &'a [u8],
}

impl<'a> StreamReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Number of bytes left unread
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    fn take(&mut self, length: usize) -> DecodeResult<&'a [u8]> {
        if self.buf.len() < length {
            return Err(DecodeError::UnexpectedEof);
        }
        let (head, tail) = self.buf.split_at(length);
        self.buf = tail;
        Ok(head)
    }

    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_bool(&mut self) -> DecodeResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> DecodeResult<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> DecodeResult<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u64(&mut self) -> DecodeResult<u64> {
        let bytes = self.take(8)?;
        let mut value = [0u8; 8];
        value.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(value))
    }

    /// Reads a string: u16 length including the NUL terminator
    pub fn read_string(&mut self) -> DecodeResult<String> {
        let length = self.read_u16()? as usize;
        if length == 0 {
            return Ok(String::new());
        }
        let bytes = self.take(length)?;
        let (last, chars) = bytes.split_last().ok_or(DecodeError::InvalidString)?;
        if *last != 0 {
            return Err(DecodeError::InvalidString);
        }
        String::from_utf8(chars.to_vec()).map_err(|_| DecodeError::InvalidString)
    }

    /// Reads a buffer: u32 length prefix
    pub fn read_buffer(&mut self) -> DecodeResult<Vec<u8>> {
        let length = self.read_u32()? as usize;
        Ok(self.take(length)?.to_vec())
    }

    /// Reads a quick buffer: u16 length prefix
    pub fn read_qbuffer(&mut self) -> DecodeResult<Vec<u8>> {
        let length = self.read_u16()? as usize;
        Ok(self.take(length)?.to_vec())
    }

    /// Reads a counted list of decodable values: u32 count prefix
    pub fn read_list<T: FromStream>(&mut self) -> DecodeResult<Vec<T>> {
        let count = self.read_u32()? as usize;
        let mut output = Vec::with_capacity(count.min(0x1000));
        for _ in 0..count {
            output.push(T::from_stream(self)?);
        }
        Ok(output)
    }
}

/// Writer producing a response payload
#[derive(Default)]
pub struct StreamWriter {
    buf: BytesMut,
}

impl StreamWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.put_u8(value as u8);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.put_u16_le(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.put_u64_le(value);
    }

    pub fn write_string(&mut self, value: &str) {
        self.buf.put_u16_le((value.len() + 1) as u16);
        self.buf.put_slice(value.as_bytes());
        self.buf.put_u8(0);
    }

    pub fn write_buffer(&mut self, value: &[u8]) {
        self.buf.put_u32_le(value.len() as u32);
        self.buf.put_slice(value);
    }

    pub fn write_qbuffer(&mut self, value: &[u8]) {
        self.buf.put_u16_le(value.len() as u16);
        self.buf.put_slice(value);
    }

    pub fn write_list<T: ToStream>(&mut self, values: &[T]) {
        self.buf.put_u32_le(values.len() as u32);
        for value in values {
            value.to_stream(self);
        }
    }
}

impl FromStream for u8 {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        r.read_u8()
    }
}

impl FromStream for u16 {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        r.read_u16()
    }
}

impl FromStream for u32 {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        r.read_u32()
    }
}

impl FromStream for u64 {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        r.read_u64()
    }
}

impl FromStream for String {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        r.read_string()
    }
}

impl FromStream for bool {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        r.read_bool()
    }
}

impl ToStream for u8 {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_u8(*self);
    }
}

impl ToStream for u16 {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_u16(*self);
    }
}

impl ToStream for u32 {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_u32(*self);
    }
}

impl ToStream for u64 {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_u64(*self);
    }
}

impl ToStream for String {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_string(self);
    }
}

impl ToStream for bool {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_bool(*self);
    }
}

impl<T: ToStream> ToStream for Vec<T> {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_list(self);
    }
}

#[cfg(test)]
mod test {
    use super::{DecodeError, StreamReader, StreamWriter};

    #[test]
    fn test_primitive_round_trip() {
        let mut w = StreamWriter::new();
        w.write_u8(7);
        w.write_u16(0x1234);
        w.write_u32(0xDEADBEEF);
        w.write_u64(0x0102030405060708);
        w.write_bool(true);

        let bytes = w.into_bytes();
        let mut r = StreamReader::new(&bytes);
        assert_eq!(r.read_u8().unwrap(), 7);
        assert_eq!(r.read_u16().unwrap(), 0x1234);
        assert_eq!(r.read_u32().unwrap(), 0xDEADBEEF);
        assert_eq!(r.read_u64().unwrap(), 0x0102030405060708);
        assert!(r.read_bool().unwrap());
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_string_round_trip() {
        let mut w = StreamWriter::new();
        w.write_string("123456789012");
        w.write_string("");

        let bytes = w.into_bytes();
        let mut r = StreamReader::new(&bytes);
        assert_eq!(r.read_string().unwrap(), "123456789012");
        assert_eq!(r.read_string().unwrap(), "");
    }

    #[test]
    fn test_buffers_and_lists() {
        let mut w = StreamWriter::new();
        w.write_buffer(&[1, 2, 3]);
        w.write_qbuffer(&[4, 5]);
        w.write_list(&[10u32, 20, 30]);

        let bytes = w.into_bytes();
        let mut r = StreamReader::new(&bytes);
        assert_eq!(r.read_buffer().unwrap(), vec![1, 2, 3]);
        assert_eq!(r.read_qbuffer().unwrap(), vec![4, 5]);
        assert_eq!(r.read_list::<u32>().unwrap(), vec![10, 20, 30]);
    }

    #[test]
    fn test_truncated_input() {
        let mut r = StreamReader::new(&[0x01, 0x00]);
        assert!(matches!(r.read_u32(), Err(DecodeError::UnexpectedEof)));

        // String length prefix pointing past the end of the payload
        let mut r = StreamReader::new(&[0x08, 0x00, b'a']);
        assert!(matches!(
            r.read_string(),
            Err(DecodeError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_string_missing_terminator() {
        let mut r = StreamReader::new(&[0x02, 0x00, b'a', b'b']);
        assert!(matches!(r.read_string(), Err(DecodeError::InvalidString)));
    }
}
