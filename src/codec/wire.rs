//! Serde intermediate shared by every text and binary codec
//!
//! Values are lowered to [`Wire`] before serialization and lifted back
//! after deserialization. Typed arrays lower either to nested lists or to
//! a tagged mapping carrying the raw element buffer:
//!
//! ```text
//! {"_nd_": true, "dtype": "<f8", "shape": [3], "data": <hex string or bin>}
//! ```

use super::Encoding;
use crate::container::StorageKind;
use crate::error::{Error, Result};
use crate::parser::decode_buffer;
use crate::types::{ElementKind, Tree, TypedArray, Value, element_count};
use crate::writer::encode_buffer;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

/// Marker key of a tagged array mapping
pub(crate) const ARRAY_TAG: &str = "_nd_";

/// Format-neutral value tree
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Wire {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Seq(Vec<Wire>),
    Map(Vec<(String, Wire)>),
}

impl Wire {
    fn kind_name(&self) -> &'static str {
        match self {
            Wire::Null => "null",
            Wire::Bool(_) => "bool",
            Wire::Int(_) => "int",
            Wire::Float(_) => "float",
            Wire::Str(_) => "string",
            Wire::Bytes(_) => "bytes",
            Wire::Seq(_) => "list",
            Wire::Map(_) => "map",
        }
    }
}

impl Serialize for Wire {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Wire::Null => serializer.serialize_unit(),
            Wire::Bool(b) => serializer.serialize_bool(*b),
            Wire::Int(i) => serializer.serialize_i64(*i),
            Wire::Float(f) => serializer.serialize_f64(*f),
            Wire::Str(s) => serializer.serialize_str(s),
            Wire::Bytes(b) => serializer.serialize_bytes(b),
            Wire::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Wire::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

struct WireVisitor;

impl<'de> Visitor<'de> for WireVisitor {
    type Value = Wire;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("null, bool, number, string, bytes, list or map")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Wire, E> {
        Ok(Wire::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Wire, E> {
        Ok(Wire::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Wire, D::Error> {
        Wire::deserialize(d)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Wire, E> {
        Ok(Wire::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Wire, E> {
        Ok(Wire::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Wire, E> {
        i64::try_from(v)
            .map(Wire::Int)
            .map_err(|_| E::custom(format!("integer {} out of range for int64", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Wire, E> {
        Ok(Wire::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Wire, E> {
        Ok(Wire::Str(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Wire, E> {
        Ok(Wire::Str(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> std::result::Result<Wire, E> {
        Ok(Wire::Bytes(v.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> std::result::Result<Wire, E> {
        Ok(Wire::Bytes(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Wire, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Wire::Seq(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Wire, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0).min(4096));
        while let Some((key, value)) = map.next_entry::<String, Wire>()? {
            entries.push((key, value));
        }
        Ok(Wire::Map(entries))
    }
}

impl<'de> Deserialize<'de> for Wire {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(WireVisitor)
    }
}

/// How typed arrays are written by an encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayRepr {
    /// Nested lists, element kind lost
    Nested,
    /// Tagged mapping with a hex string buffer
    Hex,
    /// Tagged mapping with a binary buffer
    Bytes,
}

impl ArrayRepr {
    fn of(encoding: Encoding) -> Self {
        match encoding {
            Encoding::Json | Encoding::Yaml => ArrayRepr::Nested,
            Encoding::JsonExt => ArrayRepr::Hex,
            Encoding::MsgpackExt | Encoding::Pickle => ArrayRepr::Bytes,
        }
    }
}

/// Lower a value for `encoding`
pub(crate) fn lower(value: &Value, encoding: Encoding) -> Result<Wire> {
    lower_with(value, ArrayRepr::of(encoding), encoding)
}

/// Lower a tree for `encoding`
pub(crate) fn lower_tree(tree: &Tree, encoding: Encoding) -> Result<Wire> {
    lower_map(tree, ArrayRepr::of(encoding), encoding)
}

fn lower_map(tree: &Tree, repr: ArrayRepr, encoding: Encoding) -> Result<Wire> {
    tree.iter()
        .map(|(key, value)| Ok((key.clone(), lower_with(value, repr, encoding)?)))
        .collect::<Result<Vec<_>>>()
        .map(Wire::Map)
}

fn lower_with(value: &Value, repr: ArrayRepr, encoding: Encoding) -> Result<Wire> {
    Ok(match value {
        Value::Null => Wire::Null,
        Value::Bool(b) => Wire::Bool(*b),
        Value::Int(i) => Wire::Int(*i),
        Value::Float(f) => Wire::Float(*f),
        Value::Str(s) => Wire::Str(s.clone()),
        Value::Map(tree) => lower_map(tree, repr, encoding)?,
        Value::Seq(items) | Value::Tuple(items) => Wire::Seq(
            items
                .iter()
                .map(|item| lower_with(item, repr, encoding))
                .collect::<Result<_>>()?,
        ),
        Value::Array(arr) => match repr {
            ArrayRepr::Nested => lower_with(&arr.to_nested(), repr, encoding)?,
            ArrayRepr::Hex | ArrayRepr::Bytes => lower_array(arr, repr, encoding)?,
        },
    })
}

fn lower_array(arr: &TypedArray, repr: ArrayRepr, encoding: Encoding) -> Result<Wire> {
    let mut buffer = Vec::new();
    encode_buffer(&mut buffer, &StorageKind::for_element(arr.kind()), arr.data())
        .map_err(|e| Error::encode(encoding.name(), e))?;

    let data = match repr {
        ArrayRepr::Hex => Wire::Str(hex::encode(&buffer)),
        _ => Wire::Bytes(buffer),
    };
    let shape = arr
        .shape()
        .iter()
        .map(|&d| {
            i64::try_from(d)
                .map(Wire::Int)
                .map_err(|_| Error::encode(encoding.name(), format!("dimension {} too large", d)))
        })
        .collect::<Result<_>>()?;

    Ok(Wire::Map(vec![
        (ARRAY_TAG.to_string(), Wire::Bool(true)),
        ("dtype".to_string(), Wire::Str(arr.kind().descr())),
        ("shape".to_string(), Wire::Seq(shape)),
        ("data".to_string(), data),
    ]))
}

/// Lift a decoded wire value; tagged arrays are recognised for ext encodings
pub(crate) fn lift(wire: Wire, encoding: Encoding) -> Result<Value> {
    let tagged = ArrayRepr::of(encoding) != ArrayRepr::Nested;
    lift_with(wire, tagged).map_err(|message| Error::decode(encoding.name(), message, None))
}

/// Lift a decoded wire value that must be a mapping
pub(crate) fn lift_tree(wire: Wire, encoding: Encoding) -> Result<Tree> {
    match lift(wire, encoding)? {
        Value::Map(tree) => Ok(tree),
        other => Err(Error::decode(
            encoding.name(),
            format!("top-level value is {}, expected a mapping", other.tag().name()),
            None,
        )),
    }
}

fn lift_with(wire: Wire, tagged: bool) -> std::result::Result<Value, String> {
    Ok(match wire {
        Wire::Null => Value::Null,
        Wire::Bool(b) => Value::Bool(b),
        Wire::Int(i) => Value::Int(i),
        Wire::Float(f) => Value::Float(f),
        Wire::Str(s) => Value::Str(s),
        Wire::Bytes(_) => return Err("binary data outside a tagged array".to_string()),
        Wire::Seq(items) => Value::Seq(
            items
                .into_iter()
                .map(|item| lift_with(item, tagged))
                .collect::<std::result::Result<_, _>>()?,
        ),
        Wire::Map(entries) if tagged && is_tagged_array(&entries) => {
            Value::Array(lift_array(entries)?)
        }
        Wire::Map(entries) => {
            let mut tree = Tree::with_capacity(entries.len());
            for (key, value) in entries {
                tree.insert(key, lift_with(value, tagged)?);
            }
            Value::Map(tree)
        }
    })
}

fn is_tagged_array(entries: &[(String, Wire)]) -> bool {
    entries
        .iter()
        .any(|(key, value)| key == ARRAY_TAG && *value == Wire::Bool(true))
}

fn lift_array(entries: Vec<(String, Wire)>) -> std::result::Result<TypedArray, String> {
    let mut dtype = None;
    let mut shape = None;
    let mut data = None;
    for (key, value) in entries {
        match key.as_str() {
            "dtype" => dtype = Some(value),
            "shape" => shape = Some(value),
            "data" => data = Some(value),
            _ => {}
        }
    }

    let kind = match dtype {
        Some(Wire::Str(descr)) => ElementKind::from_descr(&descr)
            .ok_or_else(|| format!("unknown array dtype '{}'", descr))?,
        Some(other) => return Err(format!("array dtype is {}, expected string", other.kind_name())),
        None => return Err("tagged array without dtype".to_string()),
    };

    let shape = match shape {
        Some(Wire::Seq(dims)) => dims
            .into_iter()
            .map(|d| match d {
                Wire::Int(n) => usize::try_from(n).map_err(|_| format!("invalid dimension {}", n)),
                other => Err(format!("array dimension is {}, expected int", other.kind_name())),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?,
        Some(other) => return Err(format!("array shape is {}, expected list", other.kind_name())),
        None => return Err("tagged array without shape".to_string()),
    };

    let bytes = match data {
        Some(Wire::Bytes(bytes)) => bytes,
        Some(Wire::Str(text)) => {
            hex::decode(&text).map_err(|e| format!("invalid hex array data: {}", e))?
        }
        Some(other) => return Err(format!("array data is {}, expected bytes", other.kind_name())),
        None => return Err("tagged array without data".to_string()),
    };

    let count = element_count(&shape).ok_or_else(|| "array shape overflows".to_string())?;
    let elements = decode_buffer(&StorageKind::for_element(&kind), count, &bytes)
        .map_err(|e| format!("array data: {}", e))?;
    TypedArray::new(kind, shape, elements).map_err(|e| e.to_string())
}
