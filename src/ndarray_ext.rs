//! ndarray integration for typed arrays
//!
//! Conversions between [`TypedArray`] and ndarray's `ArrayD` for the
//! scalar element kinds. Record arrays have no ndarray counterpart.
//!
//! Enable with the `ndarray` feature flag.

use crate::types::{ArrayData, ElementKind, TypedArray};
use ndarray::{ArrayD, IxDyn};

/// Error type for ndarray conversions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NdarrayError {
    /// Element kind mismatch between expected and actual
    KindMismatch {
        expected: ElementKind,
        actual: ElementKind,
    },
    /// Shape doesn't match element count
    ShapeMismatch { shape: Vec<usize>, len: usize },
}

impl std::fmt::Display for NdarrayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NdarrayError::KindMismatch { expected, actual } => {
                write!(f, "element kind mismatch: expected {}, got {}", expected, actual)
            }
            NdarrayError::ShapeMismatch { shape, len } => {
                write!(f, "shape {:?} doesn't match {} elements", shape, len)
            }
        }
    }
}

impl std::error::Error for NdarrayError {}

/// Element types that can be stored in a typed array
pub trait ArrayType: Sized + Clone + 'static {
    const KIND: ElementKind;

    fn into_data(values: Vec<Self>) -> ArrayData;

    fn slice(data: &ArrayData) -> Option<&[Self]>;
}

impl ArrayType for i64 {
    const KIND: ElementKind = ElementKind::Int64;

    fn into_data(values: Vec<Self>) -> ArrayData {
        ArrayData::Int64(values)
    }

    fn slice(data: &ArrayData) -> Option<&[Self]> {
        match data {
            ArrayData::Int64(v) => Some(v),
            _ => None,
        }
    }
}

impl ArrayType for f64 {
    const KIND: ElementKind = ElementKind::Float64;

    fn into_data(values: Vec<Self>) -> ArrayData {
        ArrayData::Float64(values)
    }

    fn slice(data: &ArrayData) -> Option<&[Self]> {
        match data {
            ArrayData::Float64(v) => Some(v),
            _ => None,
        }
    }
}

impl ArrayType for bool {
    const KIND: ElementKind = ElementKind::Bool;

    fn into_data(values: Vec<Self>) -> ArrayData {
        ArrayData::Bool(values)
    }

    fn slice(data: &ArrayData) -> Option<&[Self]> {
        match data {
            ArrayData::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl ArrayType for String {
    const KIND: ElementKind = ElementKind::Utf8;

    fn into_data(values: Vec<Self>) -> ArrayData {
        ArrayData::Utf8(values)
    }

    fn slice(data: &ArrayData) -> Option<&[Self]> {
        match data {
            ArrayData::Utf8(v) => Some(v),
            _ => None,
        }
    }
}

// =============================================================================
// From ndarray to TypedArray
// =============================================================================

impl TypedArray {
    /// Create a typed array from an ndarray ArrayD
    ///
    /// Elements are taken in logical row-major order, so any memory layout
    /// is accepted.
    pub fn from_ndarray<T: ArrayType>(arr: ArrayD<T>) -> Result<Self, NdarrayError> {
        let shape = arr.shape().to_vec();
        let values: Vec<T> = arr.iter().cloned().collect();
        let len = values.len();
        TypedArray::new(T::KIND, shape.clone(), T::into_data(values))
            .map_err(|_| NdarrayError::ShapeMismatch { shape, len })
    }
}

// =============================================================================
// From TypedArray to ndarray (owned)
// =============================================================================

impl TypedArray {
    /// Convert to an ndarray ArrayD
    pub fn to_ndarray<T: ArrayType>(&self) -> Result<ArrayD<T>, NdarrayError> {
        let values = T::slice(self.data()).ok_or_else(|| NdarrayError::KindMismatch {
            expected: T::KIND,
            actual: self.kind().clone(),
        })?;

        ArrayD::from_shape_vec(IxDyn(self.shape()), values.to_vec()).map_err(|_| {
            NdarrayError::ShapeMismatch {
                shape: self.shape().to_vec(),
                len: values.len(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn roundtrip_1d_f64() {
        let arr = array![1.0f64, 2.0, 3.0, 4.0].into_dyn();
        let expected = arr.clone();
        let typed = TypedArray::from_ndarray(arr).unwrap();

        assert_eq!(typed.kind(), &ElementKind::Float64);
        assert_eq!(typed.shape(), &[4]);

        let back: ArrayD<f64> = typed.to_ndarray().unwrap();
        assert_eq!(expected, back);
    }

    #[test]
    fn roundtrip_2d_i64() {
        let arr = array![[1i64, 2, 3], [4, 5, 6]].into_dyn();
        let expected = arr.clone();
        let typed = TypedArray::from_ndarray(arr).unwrap();

        assert_eq!(typed.kind(), &ElementKind::Int64);
        assert_eq!(typed.shape(), &[2, 3]);

        let back: ArrayD<i64> = typed.to_ndarray().unwrap();
        assert_eq!(expected, back);
    }

    #[test]
    fn transposed_input_keeps_logical_order() {
        let arr = array![[1i64, 2], [3, 4]].reversed_axes().into_dyn();
        let typed = TypedArray::from_ndarray(arr).unwrap();
        assert_eq!(typed.data(), &ArrayData::Int64(vec![1, 3, 2, 4]));
    }

    #[test]
    fn strings_and_bools() {
        let names = array!["O".to_string(), "H".to_string()].into_dyn();
        let typed = TypedArray::from_ndarray(names.clone()).unwrap();
        assert_eq!(typed.kind(), &ElementKind::Utf8);
        assert_eq!(typed.to_ndarray::<String>().unwrap(), names);

        let mask = array![true, false].into_dyn();
        assert_eq!(TypedArray::from_ndarray(mask).unwrap().kind(), &ElementKind::Bool);
    }

    #[test]
    fn kind_mismatch_error() {
        let typed = TypedArray::vector(vec![1.0, 2.0, 3.0]);
        let result: Result<ArrayD<i64>, _> = typed.to_ndarray();
        assert!(matches!(result, Err(NdarrayError::KindMismatch { .. })));
    }
}
