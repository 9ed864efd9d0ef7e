//! treecodec - Format-polymorphic serialization and structural comparison
//!
//! Converts record trees, and the typed arrays inside them, between wire
//! formats and compares trees for equivalence across those formats.
//!
//! # Features
//!
//! - Typed arrays with shape, element kind and record (compound) elements
//! - `json`, `yaml`, `json-ext`, `msgpack-ext` and optional `pickle` codecs
//! - Bit-exact typed arrays on the extended encodings
//! - The grove hierarchical container, with `_units` keys as dataset attributes
//! - Tolerance-aware recursive comparison that sees through encoding drift
//!
//! # Example
//!
//! ```rust
//! use treecodec::compare::{Tolerance, equal};
//! use treecodec::{EncodeOptions, Registry, TypedArray, Value, tree};
//!
//! let data = tree! {
//!     "id" => "x1",
//!     "values" => TypedArray::vector(vec![1.0, 2.0, 3.0]),
//! };
//!
//! let registry = Registry::global();
//! let payload = registry.encode(&data, "msgpack-ext", &EncodeOptions::default())?;
//! assert_eq!(registry.decode(payload.as_bytes(), "msgpack-ext")?, data);
//!
//! // json keeps the values but not the array type
//! let payload = registry.encode(&data, "json", &EncodeOptions::default())?;
//! let back = registry.decode(payload.as_bytes(), "json")?;
//! assert!(back["values"].as_array().is_none());
//! assert!(equal(&Value::Map(back), &Value::Map(data), &Tolerance::default()));
//! # Ok::<(), treecodec::Error>(())
//! ```

pub mod codec;
pub mod coerce;
pub mod compare;
pub mod container;
pub mod error;
pub mod file;
pub mod parser;
pub mod record;
pub mod types;
pub mod writer;

#[cfg(feature = "ndarray")]
pub mod ndarray_ext;

// Re-export common types at crate root
pub use codec::{Capabilities, EncodeOptions, Encoding, Payload, Registry};
pub use coerce::{infer_kind, make_array};
pub use compare::{Tolerance, diff, equal};
pub use container::{ContainerFile, ContainerOptions, Dataset, Group, Node};
pub use error::{Error, Position, Result};
pub use file::{FileFormat, WriteMode, WriteOptions, read_path, write_path};
pub use record::Record;
pub use types::{
    ArrayData, ElementKind, Field, Scalar, Tree, TypedArray, UNITS_SUFFIX, Value, ValueTag,
};

#[cfg(feature = "ndarray")]
pub use ndarray_ext::{ArrayType, NdarrayError};
