//! Core types of the value model

mod array;
mod kind;
mod value;

pub use array::{ArrayData, TypedArray, element_count};
pub use kind::{ElementKind, Field, Scalar};
pub use value::{Tree, UNITS_SUFFIX, Value, ValueTag};
