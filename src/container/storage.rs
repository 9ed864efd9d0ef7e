//! Storage kinds and the mapping between values and datasets

use super::Dataset;
use crate::coerce::{make_array, scalar_list_kind};
use crate::error::{Error, Result};
use crate::parser::decode_buffer;
use crate::types::{ArrayData, ElementKind, Field, Scalar, TypedArray, Value, element_count};
use crate::writer::encode_buffer;

/// On-disk storage tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StorageTag {
    I64 = 0x01,
    F64 = 0x02,
    Bool = 0x03,
    Utf8 = 0x04,
    FixedUtf8 = 0x05,
    Compound = 0x06,
}

impl StorageTag {
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(StorageTag::I64),
            0x02 => Some(StorageTag::F64),
            0x03 => Some(StorageTag::Bool),
            0x04 => Some(StorageTag::Utf8),
            0x05 => Some(StorageTag::FixedUtf8),
            0x06 => Some(StorageTag::Compound),
            _ => None,
        }
    }
}

/// Storage type of a dataset's raw buffer
///
/// Buffer layout per element: `I64`/`F64` 8 bytes little-endian, `Bool` one
/// byte, `Utf8` a u32 byte length then the bytes, `FixedUtf8(w)` exactly `w`
/// bytes NUL-padded, `Compound` each field's layout in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageKind {
    I64,
    F64,
    Bool,
    Utf8,
    FixedUtf8(usize),
    Compound(Vec<(String, StorageKind)>),
}

impl StorageKind {
    pub fn tag(&self) -> StorageTag {
        match self {
            StorageKind::I64 => StorageTag::I64,
            StorageKind::F64 => StorageTag::F64,
            StorageKind::Bool => StorageTag::Bool,
            StorageKind::Utf8 => StorageTag::Utf8,
            StorageKind::FixedUtf8(_) => StorageTag::FixedUtf8,
            StorageKind::Compound(_) => StorageTag::Compound,
        }
    }

    /// Fixed kind table from element kinds, strings stored variable-length
    pub fn for_element(kind: &ElementKind) -> Self {
        match kind {
            ElementKind::Int64 => StorageKind::I64,
            ElementKind::Float64 => StorageKind::F64,
            ElementKind::Bool => StorageKind::Bool,
            ElementKind::Utf8 => StorageKind::Utf8,
            ElementKind::Record(fields) => StorageKind::Compound(
                fields
                    .iter()
                    .map(|f| (f.name.clone(), StorageKind::for_element(&f.kind)))
                    .collect(),
            ),
        }
    }

    /// Element kind read back from this storage kind
    pub fn element_kind(&self) -> ElementKind {
        match self {
            StorageKind::I64 => ElementKind::Int64,
            StorageKind::F64 => ElementKind::Float64,
            StorageKind::Bool => ElementKind::Bool,
            StorageKind::Utf8 | StorageKind::FixedUtf8(_) => ElementKind::Utf8,
            StorageKind::Compound(fields) => ElementKind::Record(
                fields
                    .iter()
                    .map(|(name, kind)| Field::new(name.clone(), kind.element_kind()))
                    .collect(),
            ),
        }
    }
}

/// Storage kind for a non-mapping value
///
/// Compound kinds are built from the first tuple only; the remaining rows
/// are checked when the value is coerced by [`to_dataset`]. Scalar lists take
/// the unified kind of their elements, as [`infer_kind`](crate::coerce::infer_kind)
/// does, so mixed ints and floats are stored as `F64`. Nested lists and
/// values without a storage mapping fail with [`Error::NotImplemented`].
pub fn infer_storage_kind(value: &Value) -> Result<StorageKind> {
    match value {
        Value::Str(_) => Ok(StorageKind::Utf8),
        Value::Float(_) => Ok(StorageKind::F64),
        Value::Int(_) => Ok(StorageKind::I64),
        Value::Bool(_) => Ok(StorageKind::Bool),
        Value::Array(arr) => Ok(array_storage_kind(arr)),
        Value::Seq(items) | Value::Tuple(items) => match items.first() {
            None => Ok(StorageKind::F64),
            Some(Value::Tuple(fields)) => {
                let fields = fields
                    .iter()
                    .enumerate()
                    .map(|(i, field)| {
                        let kind = match field {
                            Value::Seq(_) | Value::Tuple(_) | Value::Array(_) => {
                                return Err(Error::NotImplemented(format!(
                                    "tuple field of type {}",
                                    field.tag().name()
                                )));
                            }
                            scalar => infer_storage_kind(scalar)?,
                        };
                        Ok((format!("f{}", i), kind))
                    })
                    .collect::<Result<Vec<_>>>()?;
                if fields.is_empty() {
                    return Err(Error::NotImplemented("empty tuple".to_string()));
                }
                Ok(StorageKind::Compound(fields))
            }
            Some(Value::Seq(_)) => Err(Error::NotImplemented("list of lists".to_string())),
            Some(Value::Array(_)) => Err(Error::NotImplemented("list of arrays".to_string())),
            Some(first) => {
                // null and mapping elements report NotImplemented
                infer_storage_kind(first)?;
                let kind = scalar_list_kind(items).map_err(|e| match e {
                    Error::UnsupportedType(msg) => Error::Type(msg),
                    other => other,
                })?;
                Ok(StorageKind::for_element(&kind))
            }
        },
        Value::Null | Value::Map(_) => Err(Error::NotImplemented(format!(
            "no storage mapping for type {}",
            value.tag().name()
        ))),
    }
}

/// Strings in arrays are stored fixed-width when no element contains NUL
fn array_storage_kind(arr: &TypedArray) -> StorageKind {
    match arr.data() {
        ArrayData::Utf8(values) if !values.iter().any(|s| s.contains('\0')) => {
            let width = values.iter().map(|s| s.len()).max().unwrap_or(0);
            StorageKind::FixedUtf8(width.max(1))
        }
        _ => StorageKind::for_element(arr.kind()),
    }
}

/// Coerce a value to a dataset of its inferred storage kind
pub fn to_dataset(value: &Value) -> Result<Dataset> {
    let kind = infer_storage_kind(value)?;
    let array = make_array(value, &kind.element_kind())?;
    let mut data = Vec::new();
    encode_buffer(&mut data, &kind, array.data()).map_err(|e| Error::encode("grove", e))?;
    Ok(Dataset::new(kind, array.shape().to_vec(), data))
}

/// Read a dataset back into a value
///
/// 0-d datasets become scalars (tuples for compounds). Compounds with fewer
/// than two fields are returned as a plain array of the single field.
pub fn from_dataset(dataset: &Dataset) -> Result<Value> {
    let count = element_count(dataset.shape()).ok_or_else(|| {
        Error::decode(
            "grove",
            format!("dataset shape {:?} overflows", dataset.shape()),
            None,
        )
    })?;
    let data = decode_buffer(dataset.kind(), count, dataset.data())
        .map_err(|e| e.into_error("grove"))?;

    let (kind, data) = match (dataset.kind(), data) {
        (StorageKind::Compound(fields), ArrayData::Record(rows)) if fields.len() < 2 => {
            let kind = fields
                .first()
                .map(|(_, field)| field.element_kind())
                .ok_or_else(|| Error::decode("grove", "compound without fields", None))?;
            let data = unwrap_single_field(&kind, rows);
            (kind, data)
        }
        (kind, data) => (kind.element_kind(), data),
    };
    let array = TypedArray::new(kind, dataset.shape().to_vec(), data)?;

    Ok(match array.to_scalar() {
        Some(scalar) => scalar,
        None => Value::Array(array),
    })
}

fn unwrap_single_field(kind: &ElementKind, rows: Vec<Vec<Scalar>>) -> ArrayData {
    let scalars = rows.into_iter().flatten();
    match kind {
        ElementKind::Int64 => ArrayData::Int64(
            scalars
                .filter_map(|s| if let Scalar::Int(i) = s { Some(i) } else { None })
                .collect(),
        ),
        ElementKind::Float64 => ArrayData::Float64(
            scalars
                .filter_map(|s| if let Scalar::Float(f) = s { Some(f) } else { None })
                .collect(),
        ),
        ElementKind::Bool => ArrayData::Bool(
            scalars
                .filter_map(|s| if let Scalar::Bool(b) = s { Some(b) } else { None })
                .collect(),
        ),
        ElementKind::Utf8 | ElementKind::Record(_) => ArrayData::Utf8(
            scalars
                .filter_map(|s| if let Scalar::Str(s) = s { Some(s) } else { None })
                .collect(),
        ),
    }
}
