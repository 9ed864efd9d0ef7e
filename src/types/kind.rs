//! Element kinds for typed arrays

use std::fmt;

/// Element kind of a typed array
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Int64,
    Float64,
    Bool,
    Utf8,
    /// Fixed-layout record of named scalar fields
    Record(Vec<Field>),
}

/// Named field of a record kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: ElementKind,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl ElementKind {
    /// Record kind with numpy-style default field names `f0`, `f1`, ...
    pub fn record_of(kinds: impl IntoIterator<Item = ElementKind>) -> Self {
        ElementKind::Record(
            kinds
                .into_iter()
                .enumerate()
                .map(|(i, kind)| Field::new(format!("f{}", i), kind))
                .collect(),
        )
    }

    pub fn is_record(&self) -> bool {
        matches!(self, ElementKind::Record(_))
    }

    /// Short name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Int64 => "int64",
            ElementKind::Float64 => "float64",
            ElementKind::Bool => "bool",
            ElementKind::Utf8 => "utf8",
            ElementKind::Record(_) => "record",
        }
    }

    /// Textual descriptor carried by the extended encodings
    ///
    /// Scalars follow numpy's `dtype.str` spelling (`<i8`, `<f8`, `|b1`);
    /// variable-length UTF-8 is `<U`; records join `name:descr` pairs with commas.
    pub fn descr(&self) -> String {
        match self {
            ElementKind::Int64 => "<i8".to_string(),
            ElementKind::Float64 => "<f8".to_string(),
            ElementKind::Bool => "|b1".to_string(),
            ElementKind::Utf8 => "<U".to_string(),
            ElementKind::Record(fields) => fields
                .iter()
                .map(|f| format!("{}:{}", f.name, f.kind.descr()))
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Parse a descriptor produced by [`ElementKind::descr`]
    pub fn from_descr(descr: &str) -> Option<Self> {
        if descr.contains(':') {
            let mut fields = Vec::new();
            for part in descr.split(',') {
                let (name, scalar) = part.split_once(':')?;
                let kind = Self::scalar_from_descr(scalar)?;
                if name.is_empty() {
                    return None;
                }
                fields.push(Field::new(name, kind));
            }
            return Some(ElementKind::Record(fields));
        }
        Self::scalar_from_descr(descr)
    }

    fn scalar_from_descr(descr: &str) -> Option<Self> {
        match descr {
            "<i8" => Some(ElementKind::Int64),
            "<f8" => Some(ElementKind::Float64),
            "|b1" => Some(ElementKind::Bool),
            "<U" => Some(ElementKind::Utf8),
            _ => None,
        }
    }

    /// Check that a record kind is well formed: at least one field, scalar
    /// field kinds, and names that survive the descriptor syntax.
    pub(crate) fn validate(&self) -> Result<(), String> {
        let ElementKind::Record(fields) = self else {
            return Ok(());
        };
        if fields.is_empty() {
            return Err("record kind needs at least one field".to_string());
        }
        for field in fields {
            if field.kind.is_record() {
                return Err(format!("record field '{}' cannot be a record", field.name));
            }
            if field.name.is_empty() || field.name.contains([',', ':']) {
                return Err(format!("invalid record field name {:?}", field.name));
            }
        }
        Ok(())
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Record(fields) => {
                write!(f, "record(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.kind)?;
                }
                write!(f, ")")
            }
            other => f.write_str(other.name()),
        }
    }
}

/// Single element of a record row
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Scalar {
    pub fn kind(&self) -> ElementKind {
        match self {
            Scalar::Int(_) => ElementKind::Int64,
            Scalar::Float(_) => ElementKind::Float64,
            Scalar::Bool(_) => ElementKind::Bool,
            Scalar::Str(_) => ElementKind::Utf8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descr_roundtrip_scalars() {
        for kind in [
            ElementKind::Int64,
            ElementKind::Float64,
            ElementKind::Bool,
            ElementKind::Utf8,
        ] {
            assert_eq!(ElementKind::from_descr(&kind.descr()), Some(kind));
        }
    }

    #[test]
    fn descr_record() {
        let kind = ElementKind::record_of([ElementKind::Utf8, ElementKind::Float64]);
        assert_eq!(kind.descr(), "f0:<U,f1:<f8");
        assert_eq!(ElementKind::from_descr("f0:<U,f1:<f8"), Some(kind));
    }

    #[test]
    fn descr_rejects_unknown() {
        assert_eq!(ElementKind::from_descr("<f4"), None);
        assert_eq!(ElementKind::from_descr("a:<i8,b"), None);
        assert_eq!(ElementKind::from_descr(":<i8"), None);
    }

    #[test]
    fn validate_record_fields() {
        assert!(ElementKind::Record(vec![]).validate().is_err());
        let nested = ElementKind::Record(vec![Field::new(
            "inner",
            ElementKind::record_of([ElementKind::Int64]),
        )]);
        assert!(nested.validate().is_err());
        let bad_name = ElementKind::Record(vec![Field::new("a,b", ElementKind::Int64)]);
        assert!(bad_name.validate().is_err());
        assert!(ElementKind::record_of([ElementKind::Int64]).validate().is_ok());
    }
}
