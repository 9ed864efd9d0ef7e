//! Recursive structural comparison with numeric tolerance
//!
//! Comparison looks through representation changes that encodings
//! introduce: a typed array equals the nested list it degrades to, tuples
//! equal lists, and mapping key order is ignored.
//!
//! ```
//! use treecodec::compare::{Tolerance, equal};
//! use treecodec::Value;
//!
//! let tol = Tolerance { rtol: 1e-5, ..Tolerance::default() };
//! assert!(equal(&Value::Float(1.0000001), &Value::Float(1.0), &tol));
//! assert!(!equal(&Value::Float(1.0000001), &Value::Float(1.0), &Tolerance::default()));
//! ```

use crate::types::{TypedArray, Value};

/// Numeric tolerance: `|a - b| <= atol + rtol * |b|`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tolerance {
    pub rtol: f64,
    pub atol: f64,
    /// Treat NaN as equal to NaN
    pub equal_nan: bool,
}

impl Tolerance {
    pub fn exact() -> Self {
        Self::default()
    }

    fn is_exact(&self) -> bool {
        self.rtol == 0.0 && self.atol == 0.0
    }

    fn floats_close(&self, a: f64, b: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return self.equal_nan && a.is_nan() && b.is_nan();
        }
        if a == b {
            // covers equal infinities
            return true;
        }
        (a - b).abs() <= self.atol + self.rtol * b.abs()
    }
}

/// Whether `a` and `b` are equal under `tol`
///
/// Kind mismatches are unequal, never an error.
pub fn equal(a: &Value, b: &Value, tol: &Tolerance) -> bool {
    let mut collector = Mismatches::first_only();
    walk(a, b, tol, &mut String::new(), &mut collector);
    collector.found.is_empty()
}

/// All mismatches between `a` and `b`, one `path: reason` message each
///
/// An empty result means [`equal`] holds.
pub fn diff(a: &Value, b: &Value, tol: &Tolerance) -> Vec<String> {
    let mut collector = Mismatches {
        found: Vec::new(),
        stop_at_first: false,
    };
    walk(a, b, tol, &mut String::new(), &mut collector);
    collector.found
}

struct Mismatches {
    found: Vec<String>,
    stop_at_first: bool,
}

impl Mismatches {
    fn first_only() -> Self {
        Self {
            found: Vec::new(),
            stop_at_first: true,
        }
    }

    fn done(&self) -> bool {
        self.stop_at_first && !self.found.is_empty()
    }

    fn push(&mut self, path: &str, reason: String) {
        let path = if path.is_empty() { "<root>" } else { path };
        self.found.push(format!("{}: {}", path, reason));
    }
}

fn walk(a: &Value, b: &Value, tol: &Tolerance, path: &mut String, out: &mut Mismatches) {
    match (a, b) {
        (Value::Null, Value::Null) => {}
        (Value::Bool(x), Value::Bool(y)) if x == y => {}
        (Value::Str(x), Value::Str(y)) if x == y => {}
        (Value::Int(x), Value::Int(y)) if tol.is_exact() => {
            if x != y {
                out.push(path, format!("{} != {}", x, y));
            }
        }
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            let (x, y) = (as_f64(a), as_f64(b));
            if !tol.floats_close(x, y) {
                out.push(path, format!("{} != {}", x, y));
            }
        }
        (Value::Map(x), Value::Map(y)) => {
            for key in x.keys().filter(|k| !y.contains_key(k.as_str())) {
                out.push(path, format!("key '{}' only in left", key));
            }
            for key in y.keys().filter(|k| !x.contains_key(k.as_str())) {
                out.push(path, format!("key '{}' only in right", key));
            }
            for (key, left) in x {
                if out.done() {
                    return;
                }
                if let Some(right) = y.get(key) {
                    let len = path.len();
                    path.push('/');
                    path.push_str(key);
                    walk(left, right, tol, path, out);
                    path.truncate(len);
                }
            }
        }
        (Value::Array(x), Value::Array(y)) => compare_arrays(x, y, tol, path, out),
        (Value::Array(x), Value::Seq(_) | Value::Tuple(_)) => {
            walk(&x.to_nested(), b, tol, path, out)
        }
        (Value::Seq(_) | Value::Tuple(_), Value::Array(y)) => {
            walk(a, &y.to_nested(), tol, path, out)
        }
        (Value::Seq(x) | Value::Tuple(x), Value::Seq(y) | Value::Tuple(y)) => {
            compare_items(x, y, tol, path, out)
        }
        // a 0-d array degrades to its scalar
        (Value::Array(x), _) if x.ndim() == 0 => walk(&x.to_nested(), b, tol, path, out),
        (_, Value::Array(y)) if y.ndim() == 0 => walk(a, &y.to_nested(), tol, path, out),
        _ => {
            if a.tag() == b.tag() {
                out.push(path, format!("{:?} != {:?}", a, b));
            } else {
                out.push(path, format!("{} vs {}", a.tag().name(), b.tag().name()));
            }
        }
    }
}

fn compare_arrays(
    x: &TypedArray,
    y: &TypedArray,
    tol: &Tolerance,
    path: &mut String,
    out: &mut Mismatches,
) {
    if x.shape() != y.shape() {
        out.push(path, format!("shape {:?} vs {:?}", x.shape(), y.shape()));
        return;
    }
    walk(&x.to_nested(), &y.to_nested(), tol, path, out);
}

fn compare_items(
    x: &[Value],
    y: &[Value],
    tol: &Tolerance,
    path: &mut String,
    out: &mut Mismatches,
) {
    if x.len() != y.len() {
        out.push(path, format!("length {} vs {}", x.len(), y.len()));
        return;
    }
    for (i, (left, right)) in x.iter().zip(y).enumerate() {
        if out.done() {
            return;
        }
        let len = path.len();
        path.push_str(&format!("[{}]", i));
        walk(left, right, tol, path, out);
        path.truncate(len);
    }
}

fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Int(i) => *i as f64,
        Value::Float(f) => *f,
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree;

    fn floats(values: &[f64]) -> Value {
        Value::Seq(values.iter().map(|&f| Value::Float(f)).collect())
    }

    #[test]
    fn scalars() {
        let exact = Tolerance::exact();
        assert!(equal(&Value::Null, &Value::Null, &exact));
        assert!(equal(&"a".into(), &"a".into(), &exact));
        assert!(!equal(&"a".into(), &"b".into(), &exact));
        assert!(!equal(&true.into(), &1i64.into(), &exact));
        assert!(equal(&Value::Int(2), &Value::Float(2.0), &exact));
    }

    #[test]
    fn large_ints_compare_exactly_without_tolerance() {
        let a = Value::Int(i64::MAX);
        let b = Value::Int(i64::MAX - 1);
        assert!(!equal(&a, &b, &Tolerance::exact()));
        let loose = Tolerance {
            atol: 1.0,
            ..Tolerance::default()
        };
        assert!(equal(&a, &b, &loose));
    }

    #[test]
    fn relative_tolerance() {
        let tol = Tolerance {
            rtol: 1e-5,
            ..Tolerance::default()
        };
        assert!(equal(&1.0000001.into(), &1.0.into(), &tol));
        assert!(!equal(&1.1.into(), &1.0.into(), &tol));
    }

    #[test]
    fn nan_handling() {
        let nan = Value::Float(f64::NAN);
        assert!(!equal(&nan, &nan, &Tolerance::exact()));
        let tol = Tolerance {
            equal_nan: true,
            ..Tolerance::default()
        };
        assert!(equal(&nan, &nan, &tol));
        assert!(!equal(&nan, &Value::Float(0.0), &tol));
    }

    #[test]
    fn infinities() {
        let inf = Value::Float(f64::INFINITY);
        assert!(equal(&inf, &inf, &Tolerance::exact()));
        let loose = Tolerance {
            atol: 1.0,
            ..Tolerance::default()
        };
        assert!(!equal(&inf, &Value::Float(f64::NEG_INFINITY), &loose));
    }

    #[test]
    fn maps_ignore_order_but_not_keys() {
        let a = tree! { "x" => 1i64, "y" => 2i64 };
        let b = tree! { "y" => 2i64, "x" => 1i64 };
        let c = tree! { "x" => 1i64 };
        assert!(equal(&a.clone().into(), &b.into(), &Tolerance::exact()));
        assert!(!equal(&a.into(), &c.into(), &Tolerance::exact()));
    }

    #[test]
    fn array_equals_nested_list() {
        let arr = TypedArray::from_f64(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let nested = Value::Seq(vec![floats(&[1.0, 2.0]), floats(&[3.0, 4.0])]);
        assert!(equal(&arr.clone().into(), &nested, &Tolerance::exact()));
        assert!(equal(&nested, &arr.into(), &Tolerance::exact()));
    }

    #[test]
    fn array_shapes_must_match() {
        let a = TypedArray::from_f64(vec![4], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = TypedArray::from_f64(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!(!equal(&a.into(), &b.into(), &Tolerance::exact()));
    }

    #[test]
    fn zero_dim_array_equals_scalar() {
        let arr = Value::Array(TypedArray::from_f64(vec![], vec![1.5]).unwrap());
        assert!(equal(&arr, &Value::Float(1.5), &Tolerance::exact()));
        assert!(equal(&Value::Float(1.5), &arr, &Tolerance::exact()));
        assert!(!equal(&arr, &Value::Float(2.5), &Tolerance::exact()));
        assert!(!equal(&arr, &Value::Str("1.5".into()), &Tolerance::exact()));

        let one = Value::Array(TypedArray::from_f64(vec![1], vec![1.5]).unwrap());
        assert!(!equal(&one, &Value::Float(1.5), &Tolerance::exact()));
    }

    #[test]
    fn tuples_equal_lists() {
        let tuple = Value::Tuple(vec!["ALA".into(), 1.0.into()]);
        let list = Value::Seq(vec!["ALA".into(), 1.0.into()]);
        assert!(equal(&tuple, &list, &Tolerance::exact()));
    }

    #[test]
    fn length_mismatch() {
        assert!(!equal(&floats(&[1.0]), &floats(&[1.0, 2.0]), &Tolerance::exact()));
    }

    #[test]
    fn diff_reports_paths() {
        let a = tree! {
            "geometry" => tree! { "coords" => floats(&[0.0, 1.0]) },
            "name" => "water",
            "extra" => 1i64,
        };
        let b = tree! {
            "geometry" => tree! { "coords" => floats(&[0.0, 1.5]) },
            "name" => "ice",
        };
        let report = diff(&a.into(), &b.into(), &Tolerance::exact());
        assert_eq!(report.len(), 3);
        assert!(report.iter().any(|m| m.starts_with("<root>: key 'extra'")));
        assert!(report.iter().any(|m| m.starts_with("/geometry/coords[1]:")));
        assert!(report.iter().any(|m| m.starts_with("/name:")));
    }

    #[test]
    fn diff_empty_when_equal() {
        let a = tree! { "x" => 1.0 };
        assert!(diff(&a.clone().into(), &a.into(), &Tolerance::exact()).is_empty());
    }
}
