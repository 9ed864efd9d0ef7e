//! Raw element buffer parsing

use super::{ByteCursor, ParseError};
use crate::container::StorageKind;
use crate::types::{ArrayData, Scalar};

/// Decode `count` elements laid out as `kind`; the buffer must be consumed exactly
pub fn decode_buffer(
    kind: &StorageKind,
    count: usize,
    bytes: &[u8],
) -> Result<ArrayData, ParseError> {
    let mut cursor = ByteCursor::new(bytes);
    let data = match kind {
        StorageKind::I64 => {
            check_size(&cursor, count, 8)?;
            ArrayData::Int64((0..count).map(|_| cursor.i64_le()).collect::<Result<_, _>>()?)
        }
        StorageKind::F64 => {
            check_size(&cursor, count, 8)?;
            ArrayData::Float64((0..count).map(|_| cursor.f64_le()).collect::<Result<_, _>>()?)
        }
        StorageKind::Bool => {
            check_size(&cursor, count, 1)?;
            ArrayData::Bool((0..count).map(|_| read_bool(&mut cursor)).collect::<Result<_, _>>()?)
        }
        StorageKind::FixedUtf8(width) => {
            if *width == 0 {
                return Err(cursor.error("fixed-width strings of width 0"));
            }
            check_size(&cursor, count, *width)?;
            ArrayData::Utf8(
                (0..count)
                    .map(|_| read_str(&mut cursor, kind))
                    .collect::<Result<_, _>>()?,
            )
        }
        StorageKind::Utf8 => {
            // every string carries at least its u32 length prefix
            check_min_size(&cursor, count, 4)?;
            ArrayData::Utf8(
                (0..count)
                    .map(|_| read_str(&mut cursor, kind))
                    .collect::<Result<_, _>>()?,
            )
        }
        StorageKind::Compound(fields) => {
            let row_size = min_width(kind);
            if row_size == 0 {
                return Err(cursor.error("compound rows of zero width"));
            }
            check_min_size(&cursor, count, row_size)?;
            let mut rows = Vec::with_capacity(count.min(cursor.remaining()));
            for _ in 0..count {
                let row = fields
                    .iter()
                    .map(|(_, field)| read_scalar(&mut cursor, field))
                    .collect::<Result<Vec<_>, _>>()?;
                rows.push(row);
            }
            ArrayData::Record(rows)
        }
    };

    if !cursor.is_empty() {
        return Err(cursor.error(format!(
            "{} trailing bytes after {} elements",
            cursor.remaining(),
            count
        )));
    }
    Ok(data)
}

/// Reject impossible counts before allocating
fn check_size(cursor: &ByteCursor<'_>, count: usize, size: usize) -> Result<(), ParseError> {
    match count.checked_mul(size) {
        Some(needed) if needed == cursor.remaining() => Ok(()),
        _ => Err(cursor.error(format!(
            "data size mismatch: {} elements of {} bytes, got {} bytes",
            count,
            size,
            cursor.remaining()
        ))),
    }
}

/// Reject counts the remaining bytes cannot hold, for variable-size elements
fn check_min_size(cursor: &ByteCursor<'_>, count: usize, size: usize) -> Result<(), ParseError> {
    match count.checked_mul(size) {
        Some(needed) if needed <= cursor.remaining() => Ok(()),
        _ => Err(cursor.error(format!(
            "{} elements need at least {} bytes each, got {} bytes",
            count,
            size,
            cursor.remaining()
        ))),
    }
}

/// Fewest bytes one element of `kind` can occupy
fn min_width(kind: &StorageKind) -> usize {
    match kind {
        StorageKind::I64 | StorageKind::F64 => 8,
        StorageKind::Bool => 1,
        StorageKind::Utf8 => 4,
        StorageKind::FixedUtf8(width) => *width,
        StorageKind::Compound(fields) => fields.iter().map(|(_, field)| min_width(field)).sum(),
    }
}

fn read_bool(cursor: &mut ByteCursor<'_>) -> Result<bool, ParseError> {
    match cursor.u8()? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(ParseError::new(
            format!("invalid bool byte 0x{:02X}", other),
            cursor.position() - 1,
        )),
    }
}

fn read_str(cursor: &mut ByteCursor<'_>, kind: &StorageKind) -> Result<String, ParseError> {
    match kind {
        StorageKind::FixedUtf8(width) => {
            let start = cursor.position();
            let bytes = cursor.take(*width)?;
            let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
            std::str::from_utf8(&bytes[..end])
                .map(str::to_string)
                .map_err(|_| ParseError::new("invalid UTF-8 in fixed-width string", start))
        }
        _ => cursor.string().map(str::to_string),
    }
}

fn read_scalar(cursor: &mut ByteCursor<'_>, kind: &StorageKind) -> Result<Scalar, ParseError> {
    match kind {
        StorageKind::I64 => cursor.i64_le().map(Scalar::Int),
        StorageKind::F64 => cursor.f64_le().map(Scalar::Float),
        StorageKind::Bool => read_bool(cursor).map(Scalar::Bool),
        StorageKind::Utf8 | StorageKind::FixedUtf8(_) => read_str(cursor, kind).map(Scalar::Str),
        StorageKind::Compound(_) => Err(cursor.error("nested compound field")),
    }
}
