//! Group and dataset parsing

use super::{ByteCursor, ParseError};
use crate::container::{Dataset, Group, Node, NodeTag, StorageKind, StorageTag};
use indexmap::IndexMap;

const MAX_GROUP_DEPTH: usize = 512;

/// Parse a group body (after its tag has been consumed)
pub fn parse_group_body(cursor: &mut ByteCursor<'_>) -> Result<Group, ParseError> {
    parse_group_at(cursor, 0)
}

fn parse_group_at(cursor: &mut ByteCursor<'_>, depth: usize) -> Result<Group, ParseError> {
    if depth > MAX_GROUP_DEPTH {
        return Err(cursor.error("groups nested too deeply"));
    }

    let count = cursor.u32_le()?;
    let mut children = IndexMap::new();
    for _ in 0..count {
        let key_start = cursor.position();
        let name = cursor.key()?.to_string();

        let tag_start = cursor.position();
        let tag_byte = cursor.u8()?;
        let node = match NodeTag::from_u8(tag_byte) {
            Some(NodeTag::Group) => Node::Group(parse_group_at(cursor, depth + 1)?),
            Some(NodeTag::Dataset) => Node::Dataset(parse_dataset_body(cursor)?),
            None => {
                return Err(ParseError::new(
                    format!("invalid node tag: 0x{:02X}", tag_byte),
                    tag_start,
                ));
            }
        };

        if children.insert(name.clone(), node).is_some() {
            return Err(ParseError::new(format!("duplicate name '{}'", name), key_start));
        }
    }
    Ok(Group::from_children(children))
}

/// Parse a dataset body (after its tag has been consumed)
pub fn parse_dataset_body(cursor: &mut ByteCursor<'_>) -> Result<Dataset, ParseError> {
    let kind = parse_storage_kind(cursor, true)?;

    let ndim = cursor.u8()?;
    let shape = (0..ndim)
        .map(|_| cursor.len_u64())
        .collect::<Result<Vec<_>, _>>()?;

    let attr_count = cursor.u32_le()?;
    let mut attrs = IndexMap::new();
    for _ in 0..attr_count {
        let key = cursor.key()?.to_string();
        let value = cursor.string()?.to_string();
        attrs.insert(key, value);
    }

    let data_size = cursor.len_u64()?;
    let data = cursor.take(data_size)?.to_vec();

    let mut dataset = Dataset::new(kind, shape, data);
    for (key, value) in attrs {
        dataset.set_attr(key, value);
    }
    Ok(dataset)
}

fn parse_storage_kind(
    cursor: &mut ByteCursor<'_>,
    allow_compound: bool,
) -> Result<StorageKind, ParseError> {
    let start = cursor.position();
    let tag_byte = cursor.u8()?;
    let tag = StorageTag::from_u8(tag_byte)
        .ok_or_else(|| ParseError::new(format!("invalid storage tag: 0x{:02X}", tag_byte), start))?;

    Ok(match tag {
        StorageTag::I64 => StorageKind::I64,
        StorageTag::F64 => StorageKind::F64,
        StorageTag::Bool => StorageKind::Bool,
        StorageTag::Utf8 => StorageKind::Utf8,
        StorageTag::FixedUtf8 => match cursor.u32_le()? {
            0 => return Err(ParseError::new("fixed-width string kind of width 0", start)),
            width => StorageKind::FixedUtf8(width as usize),
        },
        StorageTag::Compound if !allow_compound => {
            return Err(ParseError::new("nested compound storage kind", start));
        }
        StorageTag::Compound => {
            let n = cursor.u16_le()?;
            if n == 0 {
                return Err(ParseError::new("compound storage kind without fields", start));
            }
            let mut fields = Vec::with_capacity(n as usize);
            for _ in 0..n {
                let name = cursor.key()?.to_string();
                fields.push((name, parse_storage_kind(cursor, false)?));
            }
            StorageKind::Compound(fields)
        }
    })
}
