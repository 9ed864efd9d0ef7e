//! Group and dataset serialization

use crate::container::{Dataset, Group, Node, NodeTag, StorageKind};
use std::io::{self, Write};

fn invalid(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message)
}

/// Write a u16 length-prefixed name
fn write_key<W: Write>(writer: &mut W, key: &str) -> io::Result<()> {
    let len = u16::try_from(key.len())
        .map_err(|_| invalid(format!("name of {} bytes is too long", key.len())))?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(key.as_bytes())
}

fn count_u32(len: usize, what: &str) -> io::Result<u32> {
    u32::try_from(len).map_err(|_| invalid(format!("{} {} is too many", len, what)))
}

/// Write a group and everything below it
pub fn write_group<W: Write>(writer: &mut W, group: &Group) -> io::Result<()> {
    writer.write_all(&[NodeTag::Group as u8])?;
    writer.write_all(&count_u32(group.len(), "children")?.to_le_bytes())?;
    for (name, node) in group.iter() {
        write_key(writer, name)?;
        match node {
            Node::Group(child) => write_group(writer, child)?,
            Node::Dataset(dataset) => write_dataset(writer, dataset)?,
        }
    }
    Ok(())
}

pub fn write_dataset<W: Write>(writer: &mut W, dataset: &Dataset) -> io::Result<()> {
    writer.write_all(&[NodeTag::Dataset as u8])?;
    write_storage_kind(writer, dataset.kind())?;

    let ndim = u8::try_from(dataset.shape().len())
        .map_err(|_| invalid(format!("{} dimensions is too many", dataset.shape().len())))?;
    writer.write_all(&[ndim])?;
    for dim in dataset.shape() {
        writer.write_all(&(*dim as u64).to_le_bytes())?;
    }

    writer.write_all(&count_u32(dataset.attrs().len(), "attributes")?.to_le_bytes())?;
    for (key, value) in dataset.attrs() {
        write_key(writer, key)?;
        let len = u32::try_from(value.len())
            .map_err(|_| invalid(format!("attribute '{}' is too long", key)))?;
        writer.write_all(&len.to_le_bytes())?;
        writer.write_all(value.as_bytes())?;
    }

    writer.write_all(&(dataset.data().len() as u64).to_le_bytes())?;
    writer.write_all(dataset.data())
}

fn write_storage_kind<W: Write>(writer: &mut W, kind: &StorageKind) -> io::Result<()> {
    writer.write_all(&[kind.tag() as u8])?;
    match kind {
        StorageKind::FixedUtf8(width) => {
            let width = u32::try_from(*width)
                .map_err(|_| invalid(format!("fixed width {} is too large", width)))?;
            writer.write_all(&width.to_le_bytes())
        }
        StorageKind::Compound(fields) => {
            let n = u16::try_from(fields.len())
                .map_err(|_| invalid(format!("{} compound fields is too many", fields.len())))?;
            writer.write_all(&n.to_le_bytes())?;
            for (name, field) in fields {
                write_key(writer, name)?;
                write_storage_kind(writer, field)?;
            }
            Ok(())
        }
        StorageKind::I64 | StorageKind::F64 | StorageKind::Bool | StorageKind::Utf8 => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ByteCursor;
    use crate::parser::parse_group_body;

    #[test]
    fn dataset_layout() {
        let data = [1i64, 2].iter().flat_map(|v| v.to_le_bytes()).collect();
        let mut dataset = Dataset::new(StorageKind::I64, vec![2], data);
        dataset.set_attr("a_units", "angstrom");

        let mut buf = Vec::new();
        write_dataset(&mut buf, &dataset).unwrap();

        assert_eq!(buf[0], NodeTag::Dataset as u8);
        assert_eq!(buf[1], StorageKind::I64.tag() as u8);
        assert_eq!(buf[2], 1); // ndim
        assert_eq!(u64::from_le_bytes(buf[3..11].try_into().unwrap()), 2);
    }

    #[test]
    fn too_many_compound_fields() {
        let fields = (0..=u16::MAX as usize)
            .map(|i| (format!("f{}", i), StorageKind::Bool))
            .collect();
        let dataset = Dataset::new(StorageKind::Compound(fields), vec![], vec![]);

        let err = write_dataset(&mut Vec::new(), &dataset).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(err.to_string().contains("65536 compound fields"));
    }

    #[test]
    fn roundtrip_nested_groups() {
        let mut root = Group::new();
        let inner = root.create_group("inner").unwrap();
        let x = Dataset::new(StorageKind::F64, vec![], 2.5f64.to_le_bytes().to_vec());
        inner.create_dataset("x", x).unwrap();

        let mut buf = Vec::new();
        write_group(&mut buf, &root).unwrap();

        let mut cursor = ByteCursor::new(&buf);
        assert_eq!(cursor.u8().unwrap(), NodeTag::Group as u8);
        let parsed = parse_group_body(&mut cursor).unwrap();
        assert_eq!(parsed, root);
        assert!(cursor.is_empty());
    }
}
