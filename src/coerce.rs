//! Building typed arrays from plain values
//!
//! [`make_array`] coerces nested sequences into a rectangular array of a
//! requested kind; [`infer_kind`] picks the narrowest kind for a value.

use crate::error::{Error, Result};
use crate::types::{ArrayData, ElementKind, Field, Scalar, TypedArray, Value, element_count};

/// Coerce `elements` into a homogeneous array of `kind`
///
/// Nested `Seq`/`Tuple` levels become dimensions and must be rectangular.
/// A scalar gives a 0-d array. For record kinds the innermost sequences are
/// the rows. Integers are promoted to float64; every other mismatch fails
/// with [`Error::Type`].
pub fn make_array(elements: &Value, kind: &ElementKind) -> Result<TypedArray> {
    kind.validate().map_err(Error::Type)?;

    if let Value::Array(arr) = elements {
        return cast_array(arr, kind);
    }

    // the shape is only a guess from first elements until `fill` has checked it
    let shape = discover_shape(elements, kind);
    if element_count(&shape).is_none() {
        return Err(Error::Type(format!(
            "ragged nested sequence: shape {:?} overflows",
            shape
        )));
    }
    let mut data = empty_data(kind);
    fill(elements, kind, &shape, 0, &mut data)?;
    TypedArray::new(kind.clone(), shape, data)
}

/// Narrowest element kind able to hold `value`
///
/// Only scalars, flat homogeneous sequences, tuples of scalars and
/// sequences of uniform tuples have a kind; everything else fails with
/// [`Error::UnsupportedType`].
pub fn infer_kind(value: &Value) -> Result<ElementKind> {
    match value {
        Value::Str(_) => Ok(ElementKind::Utf8),
        Value::Bool(_) => Ok(ElementKind::Bool),
        Value::Float(_) => Ok(ElementKind::Float64),
        Value::Int(_) => Ok(ElementKind::Int64),
        Value::Array(arr) => Ok(arr.kind().clone()),
        Value::Tuple(items) => record_kind(items),
        Value::Seq(items) => {
            let Some(first) = items.first() else {
                return Ok(ElementKind::Float64);
            };
            match first {
                Value::Tuple(_) => {
                    let kind = infer_kind(first)?;
                    for item in &items[1..] {
                        let other = match item {
                            Value::Tuple(_) => infer_kind(item)?,
                            _ => return Err(unsupported(item, "mixed with tuples")),
                        };
                        if other != kind {
                            return Err(Error::UnsupportedType(format!(
                                "tuples are not uniform: {} vs {}",
                                kind, other
                            )));
                        }
                    }
                    Ok(kind)
                }
                _ => scalar_list_kind(items),
            }
        }
        Value::Null | Value::Map(_) => Err(unsupported(value, "has no element kind")),
    }
}

/// Unified kind of a flat list of scalars; ints widen to float64
pub(crate) fn scalar_list_kind(items: &[Value]) -> Result<ElementKind> {
    let Some((first, rest)) = items.split_first() else {
        return Ok(ElementKind::Float64);
    };
    let mut kind = scalar_kind(first)?;
    for item in rest {
        kind = unify(&kind, &scalar_kind(item)?)?;
    }
    Ok(kind)
}

fn unsupported(value: &Value, why: &str) -> Error {
    Error::UnsupportedType(format!("{} {}", value.tag().name(), why))
}

fn scalar_kind(value: &Value) -> Result<ElementKind> {
    match value {
        Value::Str(_) => Ok(ElementKind::Utf8),
        Value::Bool(_) => Ok(ElementKind::Bool),
        Value::Float(_) => Ok(ElementKind::Float64),
        Value::Int(_) => Ok(ElementKind::Int64),
        Value::Seq(_) | Value::Tuple(_) | Value::Array(_) => {
            Err(unsupported(value, "nested in a sequence"))
        }
        Value::Null | Value::Map(_) => Err(unsupported(value, "has no element kind")),
    }
}

fn unify(a: &ElementKind, b: &ElementKind) -> Result<ElementKind> {
    match (a, b) {
        _ if a == b => Ok(a.clone()),
        (ElementKind::Int64, ElementKind::Float64) | (ElementKind::Float64, ElementKind::Int64) => {
            Ok(ElementKind::Float64)
        }
        _ => Err(Error::UnsupportedType(format!(
            "heterogeneous sequence of {} and {}",
            a, b
        ))),
    }
}

fn record_kind(items: &[Value]) -> Result<ElementKind> {
    if items.is_empty() {
        return Err(Error::UnsupportedType("empty tuple".to_string()));
    }
    let kinds = items.iter().map(scalar_kind).collect::<Result<Vec<_>>>()?;
    Ok(ElementKind::record_of(kinds))
}

/// Dimensions found by descending into first elements
fn discover_shape(value: &Value, kind: &ElementKind) -> Vec<usize> {
    let mut shape = Vec::new();
    let mut current = value;
    while let Some(items) = current.as_seq() {
        // A record row is the innermost sequence: its items are scalars
        if kind.is_record()
            && items
                .first()
                .is_some_and(|first| !matches!(first, Value::Seq(_) | Value::Tuple(_)))
        {
            break;
        }
        shape.push(items.len());
        match items.first() {
            Some(first) => current = first,
            None => break,
        }
    }
    shape
}

fn empty_data(kind: &ElementKind) -> ArrayData {
    match kind {
        ElementKind::Int64 => ArrayData::Int64(Vec::new()),
        ElementKind::Float64 => ArrayData::Float64(Vec::new()),
        ElementKind::Bool => ArrayData::Bool(Vec::new()),
        ElementKind::Utf8 => ArrayData::Utf8(Vec::new()),
        ElementKind::Record(_) => ArrayData::Record(Vec::new()),
    }
}

fn fill(
    value: &Value,
    kind: &ElementKind,
    shape: &[usize],
    depth: usize,
    out: &mut ArrayData,
) -> Result<()> {
    if depth == shape.len() {
        return push_element(value, kind, out);
    }
    let items = value.as_seq().ok_or_else(|| {
        Error::Type(format!(
            "ragged nested sequence: expected a sequence at depth {}, got {}",
            depth,
            value.tag().name()
        ))
    })?;
    if items.len() != shape[depth] {
        return Err(Error::Type(format!(
            "ragged nested sequence: length {} at depth {}, expected {}",
            items.len(),
            depth,
            shape[depth]
        )));
    }
    for item in items {
        fill(item, kind, shape, depth + 1, out)?;
    }
    Ok(())
}

fn push_element(value: &Value, kind: &ElementKind, out: &mut ArrayData) -> Result<()> {
    match (kind, out) {
        (ElementKind::Record(fields), ArrayData::Record(rows)) => {
            rows.push(coerce_row(value, fields)?);
            Ok(())
        }
        (_, out) => {
            let scalar = coerce_scalar(value, kind)?;
            match (out, scalar) {
                (ArrayData::Int64(v), Scalar::Int(i)) => v.push(i),
                (ArrayData::Float64(v), Scalar::Float(f)) => v.push(f),
                (ArrayData::Bool(v), Scalar::Bool(b)) => v.push(b),
                (ArrayData::Utf8(v), Scalar::Str(s)) => v.push(s),
                _ => unreachable!("coerce_scalar returns the requested kind"),
            }
            Ok(())
        }
    }
}

fn coerce_row(value: &Value, fields: &[Field]) -> Result<Vec<Scalar>> {
    let items = value.as_seq().ok_or_else(|| {
        Error::Type(format!("record row must be a tuple, got {}", value.tag().name()))
    })?;
    if items.len() != fields.len() {
        return Err(Error::Type(format!(
            "record row has {} values, kind has {} fields",
            items.len(),
            fields.len()
        )));
    }
    fields
        .iter()
        .zip(items)
        .map(|(field, item)| {
            coerce_scalar(item, &field.kind).map_err(|_| {
                Error::Type(format!(
                    "record field '{}' expects {}, got {}",
                    field.name,
                    field.kind,
                    item.tag().name()
                ))
            })
        })
        .collect()
}

fn coerce_scalar(value: &Value, kind: &ElementKind) -> Result<Scalar> {
    match (kind, value) {
        (ElementKind::Int64, Value::Int(i)) => Ok(Scalar::Int(*i)),
        (ElementKind::Float64, Value::Float(f)) => Ok(Scalar::Float(*f)),
        (ElementKind::Float64, Value::Int(i)) => Ok(Scalar::Float(*i as f64)),
        (ElementKind::Bool, Value::Bool(b)) => Ok(Scalar::Bool(*b)),
        (ElementKind::Utf8, Value::Str(s)) => Ok(Scalar::Str(s.clone())),
        _ => Err(Error::Type(format!(
            "cannot convert {} to {}",
            value.tag().name(),
            kind
        ))),
    }
}

fn cast_array(arr: &TypedArray, kind: &ElementKind) -> Result<TypedArray> {
    if arr.kind() == kind {
        return Ok(arr.clone());
    }
    match (arr.data(), kind) {
        (ArrayData::Int64(values), ElementKind::Float64) => TypedArray::from_f64(
            arr.shape().to_vec(),
            values.iter().map(|&i| i as f64).collect(),
        ),
        _ => Err(Error::Type(format!(
            "cannot cast {} array to {}",
            arr.kind(),
            kind
        ))),
    }
}
