//! Binary parser for grove containers
//!
//! Parses into an owned [`Group`] tree; dataset buffers stay raw until
//! they are read back into values.

mod buffer;
mod node;
mod primitives;

pub use buffer::decode_buffer;
pub use node::{parse_dataset_body, parse_group_body};
pub use primitives::ByteCursor;

use crate::container::{Group, HEADER_SIZE, MAGIC, NodeTag, VERSION};
use crate::error::{Error, Position};
use std::borrow::Cow;
use std::fmt;

/// Parse failure with the byte offset it occurred at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: Cow<'static, str>,
    pub offset: usize,
}

impl ParseError {
    pub fn new(message: impl Into<Cow<'static, str>>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }

    /// Shift the offset by a base, for errors from a sub-slice
    pub fn at_base(mut self, base: usize) -> Self {
        self.offset += base;
        self
    }

    pub fn into_error(self, encoding: &str) -> Error {
        Error::decode(encoding, self.message, Some(Position::Byte(self.offset)))
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.message, self.offset)
    }
}

impl std::error::Error for ParseError {}

/// Parse a grove container from bytes
pub fn parse(bytes: &[u8]) -> Result<Group, ParseError> {
    // Check minimum size for header
    if bytes.len() < HEADER_SIZE {
        return Err(ParseError::new("unexpected end of input in header", bytes.len()));
    }

    // Validate magic bytes
    if &bytes[0..8] != MAGIC {
        return Err(ParseError::new("invalid magic bytes", 0));
    }

    // Validate version
    let version = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    if version != VERSION {
        return Err(ParseError::new(
            format!("unsupported version: {}, expected {}", version, VERSION),
            8,
        ));
    }

    // Root group follows the header
    let mut cursor = ByteCursor::new(&bytes[HEADER_SIZE..]);
    let root = parse_root(&mut cursor).map_err(|e| e.at_base(HEADER_SIZE))?;
    Ok(root)
}

fn parse_root(cursor: &mut ByteCursor<'_>) -> Result<Group, ParseError> {
    let tag = cursor.u8()?;
    if tag != NodeTag::Group as u8 {
        return Err(ParseError::new(
            format!("root must be a group, found tag 0x{:02X}", tag),
            0,
        ));
    }
    let root = parse_group_body(cursor)?;
    if !cursor.is_empty() {
        return Err(cursor.error("trailing bytes after root group"));
    }
    Ok(root)
}
