//! Typed array types

use super::{ElementKind, Scalar, Value};
use crate::error::{Error, Result};

/// Contiguous row-major element buffer, one variant per element kind
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Bool(Vec<bool>),
    Utf8(Vec<String>),
    /// One row per element, one scalar per record field
    Record(Vec<Vec<Scalar>>),
}

impl ArrayData {
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Int64(v) => v.len(),
            ArrayData::Float64(v) => v.len(),
            ArrayData::Bool(v) => v.len(),
            ArrayData::Utf8(v) => v.len(),
            ArrayData::Record(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at flat index `i` as a scalar value (records become tuples)
    fn element(&self, i: usize) -> Value {
        match self {
            ArrayData::Int64(v) => Value::Int(v[i]),
            ArrayData::Float64(v) => Value::Float(v[i]),
            ArrayData::Bool(v) => Value::Bool(v[i]),
            ArrayData::Utf8(v) => Value::Str(v[i].clone()),
            ArrayData::Record(rows) => {
                Value::Tuple(rows[i].iter().cloned().map(Value::from).collect())
            }
        }
    }
}

/// Number of elements in `shape`, or `None` when the product overflows
pub fn element_count(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

/// Homogeneous N-dimensional array with an explicit element kind
#[derive(Debug, Clone, PartialEq)]
pub struct TypedArray {
    kind: ElementKind,
    shape: Vec<usize>,
    data: ArrayData,
}

impl TypedArray {
    /// Build an array, checking that `data` matches `kind` and `shape`
    pub fn new(kind: ElementKind, shape: Vec<usize>, data: ArrayData) -> Result<Self> {
        kind.validate().map_err(Error::Type)?;

        let expected = element_count(&shape)
            .ok_or_else(|| Error::Type(format!("shape {:?} overflows", shape)))?;
        if data.len() != expected {
            return Err(Error::Type(format!(
                "shape {:?} needs {} elements, got {}",
                shape,
                expected,
                data.len()
            )));
        }

        match (&kind, &data) {
            (ElementKind::Int64, ArrayData::Int64(_))
            | (ElementKind::Float64, ArrayData::Float64(_))
            | (ElementKind::Bool, ArrayData::Bool(_))
            | (ElementKind::Utf8, ArrayData::Utf8(_)) => {}
            (ElementKind::Record(fields), ArrayData::Record(rows)) => {
                for row in rows {
                    if row.len() != fields.len() {
                        return Err(Error::Type(format!(
                            "record row has {} values, kind has {} fields",
                            row.len(),
                            fields.len()
                        )));
                    }
                    for (field, value) in fields.iter().zip(row) {
                        if value.kind() != field.kind {
                            return Err(Error::Type(format!(
                                "record field '{}' expects {}, got {}",
                                field.name,
                                field.kind,
                                value.kind()
                            )));
                        }
                    }
                }
            }
            _ => {
                return Err(Error::Type(format!(
                    "buffer does not hold {} elements",
                    kind.name()
                )));
            }
        }

        Ok(Self { kind, shape, data })
    }

    pub fn from_f64(shape: Vec<usize>, values: Vec<f64>) -> Result<Self> {
        Self::new(ElementKind::Float64, shape, ArrayData::Float64(values))
    }

    pub fn from_i64(shape: Vec<usize>, values: Vec<i64>) -> Result<Self> {
        Self::new(ElementKind::Int64, shape, ArrayData::Int64(values))
    }

    pub fn from_bool(shape: Vec<usize>, values: Vec<bool>) -> Result<Self> {
        Self::new(ElementKind::Bool, shape, ArrayData::Bool(values))
    }

    pub fn from_strings(shape: Vec<usize>, values: Vec<String>) -> Result<Self> {
        Self::new(ElementKind::Utf8, shape, ArrayData::Utf8(values))
    }

    /// One-dimensional float64 array
    pub fn vector(values: Vec<f64>) -> Self {
        Self {
            kind: ElementKind::Float64,
            shape: vec![values.len()],
            data: ArrayData::Float64(values),
        }
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    pub fn into_parts(self) -> (ElementKind, Vec<usize>, ArrayData) {
        (self.kind, self.shape, self.data)
    }

    /// Number of dimensions
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements
    pub fn num_elements(&self) -> usize {
        self.data.len()
    }

    /// Element of a 0-d array as a plain value
    pub fn to_scalar(&self) -> Option<Value> {
        if self.shape.is_empty() {
            Some(self.data.element(0))
        } else {
            None
        }
    }

    /// Nested-list form: sequences per dimension, tuples for record rows
    pub fn to_nested(&self) -> Value {
        fn build(data: &ArrayData, shape: &[usize], offset: usize) -> Value {
            match shape.split_first() {
                None => data.element(offset),
                Some((&dim, rest)) => {
                    // only zero-length dims can hide an overflowing tail
                    let stride = element_count(rest).unwrap_or(0);
                    Value::Seq(
                        (0..dim)
                            .map(|i| build(data, rest, offset + i * stride))
                            .collect(),
                    )
                }
            }
        }
        build(&self.data, &self.shape, 0)
    }
}
