//! Little-endian primitive readers over a byte cursor

use super::ParseError;

/// Forward-only cursor over a borrowed byte buffer
#[derive(Debug, Clone, Copy)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn error(&self, message: impl Into<std::borrow::Cow<'static, str>>) -> ParseError {
        ParseError::new(message, self.position)
    }

    /// Take exactly `count` bytes as a zero-copy slice
    pub fn take(&mut self, count: usize) -> Result<&'a [u8], ParseError> {
        if count > self.remaining() {
            return Err(self.error(format!(
                "unexpected end of input: need {} bytes, {} left",
                count,
                self.remaining()
            )));
        }
        let slice = &self.data[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], ParseError> {
        let bytes = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8, ParseError> {
        Ok(self.array::<1>()?[0])
    }

    pub fn u16_le(&mut self) -> Result<u16, ParseError> {
        self.array().map(u16::from_le_bytes)
    }

    pub fn u32_le(&mut self) -> Result<u32, ParseError> {
        self.array().map(u32::from_le_bytes)
    }

    pub fn u64_le(&mut self) -> Result<u64, ParseError> {
        self.array().map(u64::from_le_bytes)
    }

    pub fn i64_le(&mut self) -> Result<i64, ParseError> {
        self.array().map(i64::from_le_bytes)
    }

    pub fn f64_le(&mut self) -> Result<f64, ParseError> {
        self.array().map(f64::from_le_bytes)
    }

    /// u64 length that must fit in memory on this platform
    pub fn len_u64(&mut self) -> Result<usize, ParseError> {
        let start = self.position;
        let n = self.u64_le()?;
        usize::try_from(n).map_err(|_| ParseError::new(format!("length {} too large", n), start))
    }

    /// u32 length-prefixed UTF-8 string (for values)
    pub fn string(&mut self) -> Result<&'a str, ParseError> {
        let len = self.u32_le()? as usize;
        self.utf8(len)
    }

    /// u16 length-prefixed UTF-8 string (for names and attribute keys)
    pub fn key(&mut self) -> Result<&'a str, ParseError> {
        let len = self.u16_le()? as usize;
        self.utf8(len)
    }

    fn utf8(&mut self, len: usize) -> Result<&'a str, ParseError> {
        let start = self.position;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes).map_err(|_| ParseError::new("invalid UTF-8 in string", start))
    }
}
