//! Generic value tree exchanged with the record layer

use super::{Scalar, TypedArray};
use indexmap::IndexMap;

/// Mapping from string keys to values
///
/// Insertion order is kept for output; equality ignores it.
pub type Tree = IndexMap<String, Value>;

/// Suffix marking a key as units metadata for its sibling
pub const UNITS_SUFFIX: &str = "_units";

/// Value type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueTag {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Map,
    Seq,
    Tuple,
    Array,
}

impl ValueTag {
    pub fn name(self) -> &'static str {
        match self {
            ValueTag::Null => "null",
            ValueTag::Bool => "bool",
            ValueTag::Int => "int",
            ValueTag::Float => "float",
            ValueTag::Str => "str",
            ValueTag::Map => "map",
            ValueTag::Seq => "seq",
            ValueTag::Tuple => "tuple",
            ValueTag::Array => "array",
        }
    }
}

/// Generic tree value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Map(Tree),
    Seq(Vec<Value>),
    /// Fixed-size row of scalars, the building block of record arrays
    Tuple(Vec<Value>),
    Array(TypedArray),
}

impl Value {
    /// Get the tag for this value
    pub fn tag(&self) -> ValueTag {
        match self {
            Value::Null => ValueTag::Null,
            Value::Bool(_) => ValueTag::Bool,
            Value::Int(_) => ValueTag::Int,
            Value::Float(_) => ValueTag::Float,
            Value::Str(_) => ValueTag::Str,
            Value::Map(_) => ValueTag::Map,
            Value::Seq(_) => ValueTag::Seq,
            Value::Tuple(_) => ValueTag::Tuple,
            Value::Array(_) => ValueTag::Array,
        }
    }

    /// Scalar leaves: bool, int, float, str
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_)
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Float view, widening integers
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Tree> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Items of a sequence or tuple
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) | Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&TypedArray> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Get a nested value by slash-separated path (e.g., "model/layers")
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = self;
        for key in path.split('/').filter(|k| !k.is_empty()) {
            match current {
                Value::Map(entries) => current = entries.get(key)?,
                _ => return None,
            }
        }
        Some(current)
    }
}

impl From<Scalar> for Value {
    fn from(v: Scalar) -> Self {
        match v {
            Scalar::Int(i) => Value::Int(i),
            Scalar::Float(f) => Value::Float(f),
            Scalar::Bool(b) => Value::Bool(b),
            Scalar::Str(s) => Value::Str(s),
        }
    }
}

// Convenience From impls for Value
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<TypedArray> for Value {
    fn from(v: TypedArray) -> Self {
        Value::Array(v)
    }
}

impl From<Tree> for Value {
    fn from(v: Tree) -> Self {
        Value::Map(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Seq(v)
    }
}

/// Build a [`Tree`] from `key => value` pairs
///
/// ```
/// use treecodec::{tree, Value};
///
/// let t = tree! { "id" => "x1", "count" => 3i64 };
/// assert_eq!(t["count"], Value::Int(3));
/// ```
#[macro_export]
macro_rules! tree {
    () => { $crate::Tree::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut t = $crate::Tree::new();
        $( t.insert(::std::string::String::from($key), $crate::Value::from($value)); )+
        t
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_accessor() {
        let value = Value::Map(tree! {
            "model" => tree! { "name" => "bert-base", "layers" => 12i64 },
        });
        assert_eq!(value.get("model/name").unwrap().as_str(), Some("bert-base"));
        assert_eq!(value.get("model/layers").unwrap().as_int(), Some(12));
        assert!(value.get("model/missing").is_none());
        assert!(value.get("model/name/deeper").is_none());
        assert_eq!(value.get(""), Some(&value));
    }

    #[test]
    fn tree_equality_ignores_order() {
        let a = tree! { "x" => 1i64, "y" => 2i64 };
        let b = tree! { "y" => 2i64, "x" => 1i64 };
        assert_eq!(a, b);
    }

    #[test]
    fn as_float_widens_ints() {
        assert_eq!(Value::Int(3).as_float(), Some(3.0));
        assert_eq!(Value::Str("3".into()).as_float(), None);
    }
}
