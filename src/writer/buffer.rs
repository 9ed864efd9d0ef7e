//! Raw element buffer serialization

use crate::container::StorageKind;
use crate::types::{ArrayData, Scalar};
use std::io::{self, Write};

fn invalid(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message)
}

/// Write the elements of `data` using the layout of `kind`
pub fn encode_buffer<W: Write>(
    writer: &mut W,
    kind: &StorageKind,
    data: &ArrayData,
) -> io::Result<()> {
    match (kind, data) {
        (StorageKind::I64, ArrayData::Int64(values)) => {
            for v in values {
                writer.write_all(&v.to_le_bytes())?;
            }
        }
        (StorageKind::F64, ArrayData::Float64(values)) => {
            for v in values {
                writer.write_all(&v.to_le_bytes())?;
            }
        }
        (StorageKind::Bool, ArrayData::Bool(values)) => {
            for v in values {
                writer.write_all(&[u8::from(*v)])?;
            }
        }
        (StorageKind::Utf8, ArrayData::Utf8(values)) => {
            for v in values {
                write_string(writer, v)?;
            }
        }
        (StorageKind::FixedUtf8(width), ArrayData::Utf8(values)) => {
            for v in values {
                write_fixed(writer, v, *width)?;
            }
        }
        (StorageKind::Compound(fields), ArrayData::Record(rows)) => {
            for row in rows {
                if row.len() != fields.len() {
                    return Err(invalid(format!(
                        "record row has {} values, compound has {} fields",
                        row.len(),
                        fields.len()
                    )));
                }
                for ((name, field_kind), value) in fields.iter().zip(row) {
                    write_scalar(writer, name, field_kind, value)?;
                }
            }
        }
        (kind, _) => {
            return Err(invalid(format!(
                "elements do not match storage kind {:?}",
                kind
            )));
        }
    }
    Ok(())
}

fn write_scalar<W: Write>(
    writer: &mut W,
    name: &str,
    kind: &StorageKind,
    value: &Scalar,
) -> io::Result<()> {
    match (kind, value) {
        (StorageKind::I64, Scalar::Int(v)) => writer.write_all(&v.to_le_bytes()),
        (StorageKind::F64, Scalar::Float(v)) => writer.write_all(&v.to_le_bytes()),
        (StorageKind::Bool, Scalar::Bool(v)) => writer.write_all(&[u8::from(*v)]),
        (StorageKind::Utf8, Scalar::Str(v)) => write_string(writer, v),
        (StorageKind::FixedUtf8(width), Scalar::Str(v)) => write_fixed(writer, v, *width),
        _ => Err(invalid(format!(
            "field '{}' does not match storage kind {:?}",
            name, kind
        ))),
    }
}

fn write_string<W: Write>(writer: &mut W, value: &str) -> io::Result<()> {
    let len = u32::try_from(value.len())
        .map_err(|_| invalid(format!("string of {} bytes is too long", value.len())))?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(value.as_bytes())
}

fn write_fixed<W: Write>(writer: &mut W, value: &str, width: usize) -> io::Result<()> {
    if value.len() > width || value.contains('\0') {
        return Err(invalid(format!(
            "string {:?} does not fit fixed width {}",
            value, width
        )));
    }
    writer.write_all(value.as_bytes())?;
    writer.write_all(&vec![0u8; width - value.len()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::decode_buffer;

    fn roundtrip(kind: &StorageKind, data: &ArrayData) -> ArrayData {
        let mut buf = Vec::new();
        encode_buffer(&mut buf, kind, data).unwrap();
        decode_buffer(kind, data.len(), &buf).unwrap()
    }

    #[test]
    fn roundtrip_numeric_is_bit_exact() {
        let data = ArrayData::Float64(vec![0.1, -0.0, f64::MIN_POSITIVE, f64::NAN]);
        let back = roundtrip(&StorageKind::F64, &data);
        let (ArrayData::Float64(a), ArrayData::Float64(b)) = (&data, &back) else {
            panic!("kind changed");
        };
        for (x, y) in a.iter().zip(b) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn fixed_strings_are_padded() {
        let data = ArrayData::Utf8(vec!["ab".into(), "c".into()]);
        let mut buf = Vec::new();
        encode_buffer(&mut buf, &StorageKind::FixedUtf8(3), &data).unwrap();
        assert_eq!(buf, b"ab\0c\0\0");
        assert_eq!(roundtrip(&StorageKind::FixedUtf8(3), &data), data);
    }

    #[test]
    fn fixed_width_overflow_is_rejected() {
        let data = ArrayData::Utf8(vec!["abcd".into()]);
        let mut buf = Vec::new();
        assert!(encode_buffer(&mut buf, &StorageKind::FixedUtf8(3), &data).is_err());
    }

    #[test]
    fn compound_rows() {
        let kind = StorageKind::Compound(vec![
            ("f0".into(), StorageKind::Utf8),
            ("f1".into(), StorageKind::F64),
        ]);
        let data = ArrayData::Record(vec![
            vec![Scalar::Str("ALA".into()), Scalar::Float(1.0)],
            vec![Scalar::Str("FF".into()), Scalar::Float(3.0)],
        ]);
        assert_eq!(roundtrip(&kind, &data), data);
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let mut buf = Vec::new();
        let err = encode_buffer(&mut buf, &StorageKind::I64, &ArrayData::Bool(vec![true]));
        assert_eq!(err.unwrap_err().kind(), io::ErrorKind::InvalidInput);
    }
}
