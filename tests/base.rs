//! Integration tests for treecodec
//!
//! These tests demonstrate the main use cases: encoding record trees,
//! comparing them across formats and storing them in grove containers.

use proptest::prelude::*;
use treecodec::{
    ArrayData, ElementKind, EncodeOptions, Encoding, Error, Registry, Tolerance, Tree,
    TypedArray, Value, equal, make_array, tree,
};

fn registry() -> &'static Registry {
    Registry::global()
}

fn roundtrip(tree: &Tree, name: &str) -> Tree {
    let payload = registry()
        .encode(tree, name, &EncodeOptions::default())
        .unwrap();
    registry().decode(payload.as_bytes(), name).unwrap()
}

fn sample() -> Tree {
    tree! {
        "id" => "x1",
        "natom" => 3i64,
        "converged" => true,
        "energy" => -76.026_632_734,
        "symbols" => vec![Value::from("O"), Value::from("H"), Value::from("H")],
        "geometry" => TypedArray::from_f64(
            vec![3, 3],
            vec![0.0, 0.0, -0.124, 0.0, -1.431, 0.986, 0.0, 1.431, 0.986],
        ).unwrap(),
        "extras" => tree! { "note" => "", "empty" => Value::Seq(vec![]) },
    }
}

// =============================================================================
// Round-trip law per codec
// =============================================================================

#[test]
fn extended_encodings_are_exact() {
    let data = sample();
    for name in ["json-ext", "msgpack-ext"] {
        assert_eq!(roundtrip(&data, name), data, "{}", name);
    }
}

#[test]
fn text_encodings_compare_equal() {
    let data = sample();
    for name in ["json", "yaml"] {
        let back = roundtrip(&data, name);
        assert!(
            equal(&Value::Map(back), &Value::Map(data.clone()), &Tolerance::default()),
            "{}",
            name
        );
    }
}

#[cfg(feature = "pickle")]
#[test]
fn pickle_is_exact() {
    let data = sample();
    assert_eq!(roundtrip(&data, "pickle"), data);
}

#[cfg(not(feature = "pickle"))]
#[test]
fn pickle_absent_without_feature() {
    let err = registry()
        .encode(&sample(), "pickle", &EncodeOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::UnknownEncoding(_)));
}

// =============================================================================
// JSON degradation
// =============================================================================

#[test]
fn json_degrades_arrays_to_nested_lists() {
    let data = tree! { "m" => TypedArray::from_i64(vec![2, 2], vec![1, 2, 3, 4]).unwrap() };
    let payload = registry()
        .encode(&data, "json", &EncodeOptions::default())
        .unwrap();
    assert_eq!(payload.as_text(), Some("{\"m\":[[1,2],[3,4]]}"));

    let back = registry().decode(payload.as_bytes(), "json").unwrap();
    assert!(matches!(back["m"], Value::Seq(_)));
}

#[test]
fn json_writes_non_finite_floats_as_null() {
    let data = tree! { "x" => f64::NAN, "y" => f64::INFINITY };
    let back = roundtrip(&data, "json");
    assert_eq!(back["x"], Value::Null);
    assert_eq!(back["y"], Value::Null);
}

#[test]
fn json_lowers_tuples_to_lists() {
    let data = tree! { "pair" => Value::Tuple(vec![1i64.into(), "a".into()]) };
    let back = roundtrip(&data, "json");
    assert_eq!(back["pair"], Value::Seq(vec![1i64.into(), "a".into()]));
    assert!(equal(&Value::Map(back), &Value::Map(data), &Tolerance::default()));
}

#[test]
fn json_degrades_zero_dim_arrays_to_scalars() {
    let data = tree! {
        "e" => TypedArray::from_f64(vec![], vec![1.5]).unwrap(),
        "n" => make_array(&Value::Int(3), &ElementKind::Int64).unwrap(),
    };
    let payload = registry()
        .encode(&data, "json", &EncodeOptions::default())
        .unwrap();
    assert_eq!(payload.as_text(), Some("{\"e\":1.5,\"n\":3}"));

    let back = registry().decode(payload.as_bytes(), "json").unwrap();
    assert_eq!(back["e"], Value::Float(1.5));
    assert!(equal(&Value::Map(back), &Value::Map(data), &Tolerance::default()));
}

#[test]
fn yaml_keeps_non_finite_floats() {
    let data = tree! { "y" => f64::NEG_INFINITY };
    assert_eq!(roundtrip(&data, "yml"), data);
}

// =============================================================================
// msgpack-ext bit-identical scenario
// =============================================================================

#[test]
fn msgpack_ext_bit_identical() {
    let data = tree! {
        "id" => "x1",
        "values" => TypedArray::vector(vec![1.0, 2.0, 3.0]),
    };
    let back = roundtrip(&data, "msgpack-ext");

    let arr = back["values"].as_array().unwrap();
    assert_eq!(arr.kind(), &ElementKind::Float64);
    assert_eq!(arr.shape(), &[3]);
    let ArrayData::Float64(values) = arr.data() else {
        panic!("expected float64 data");
    };
    let bits: Vec<u64> = values.iter().map(|v| v.to_bits()).collect();
    assert_eq!(bits, [1.0f64, 2.0, 3.0].map(f64::to_bits));
    assert_eq!(back["id"], Value::Str("x1".into()));
}

#[test]
fn json_ext_carries_hex_buffer() {
    let data = tree! { "v" => TypedArray::from_i64(vec![1], vec![1]).unwrap() };
    let payload = registry()
        .encode(&data, "json-ext", &EncodeOptions::default())
        .unwrap();
    let text = payload.as_text().unwrap();
    assert!(text.contains("\"_nd_\":true"));
    assert!(text.contains("\"dtype\":\"<i8\""));
    assert!(text.contains("\"data\":\"0100000000000000\""));
}

proptest! {
    #[test]
    fn extended_encodings_preserve_float_bits(
        values in prop::collection::vec(any::<f64>(), 0..64)
    ) {
        let n = values.len();
        let data = tree! { "v" => TypedArray::from_f64(vec![n], values.clone()).unwrap() };
        for name in ["json-ext", "msgpack-ext"] {
            let back = roundtrip(&data, name);
            let decoded = back["v"].as_array().map(TypedArray::data);
            let Some(ArrayData::Float64(decoded)) = decoded else {
                panic!("expected float64 array");
            };
            let expected: Vec<u64> = values.iter().map(|v| v.to_bits()).collect();
            let actual: Vec<u64> = decoded.iter().map(|v| v.to_bits()).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}

// =============================================================================
// Dispatch
// =============================================================================

#[test]
fn unknown_encoding_is_rejected() {
    let err = registry()
        .encode(&sample(), "xml", &EncodeOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::UnknownEncoding(name) if name == "xml"));

    assert!(matches!(
        registry().decode(b"{}", "xml"),
        Err(Error::UnknownEncoding(_))
    ));
}

#[test]
fn aliases_normalize() {
    assert_eq!(Encoding::from_name("js").unwrap(), Encoding::Json);
    assert_eq!(Encoding::from_name("yml").unwrap(), Encoding::Yaml);
}

#[test]
fn malformed_input_reports_position() {
    let err = registry().decode(b"{\"a\": }", "json").unwrap_err();
    let Error::Decode { encoding, position, .. } = err else {
        panic!("expected a decode error");
    };
    assert_eq!(encoding, "json");
    assert!(position.is_some());

    assert!(matches!(
        registry().decode(&[0xc1], "msgpack-ext"),
        Err(Error::Decode { .. })
    ));
}

#[test]
fn normalize_matches_text_form() {
    let data = sample();
    let normalized = registry().normalize(&data, "json").unwrap();
    assert!(normalized["geometry"].as_array().is_none());
    assert_eq!(registry().normalize(&normalized, "json").unwrap(), normalized);
}

// =============================================================================
// Comparison
// =============================================================================

#[test]
fn tolerance_semantics() {
    let a = Value::Float(1.0000001);
    let b = Value::Float(1.0);
    assert!(!equal(&a, &b, &Tolerance::default()));
    let tol = Tolerance {
        rtol: 1e-5,
        ..Tolerance::default()
    };
    assert!(equal(&a, &b, &tol));
}

#[test]
fn comparison_across_formats() {
    let data = sample();
    let from_json = roundtrip(&data, "json");
    let from_msgpack = roundtrip(&data, "msgpack-ext");
    assert!(equal(
        &Value::Map(from_json),
        &Value::Map(from_msgpack),
        &Tolerance::default()
    ));
}

#[test]
fn mismatched_kinds_are_unequal() {
    assert!(!equal(&"1".into(), &1i64.into(), &Tolerance::default()));
    assert!(!equal(&Value::Null, &Value::Seq(vec![]), &Tolerance::default()));
}

// =============================================================================
// Array coercion
// =============================================================================

#[test]
fn ragged_sequences_are_rejected() {
    let ragged = Value::Seq(vec![
        Value::Seq(vec![1.0.into(), 2.0.into()]),
        Value::Seq(vec![3.0.into()]),
    ]);
    assert!(matches!(
        make_array(&ragged, &ElementKind::Float64),
        Err(Error::Type(_))
    ));
}

#[test]
fn ints_promote_to_floats() {
    let values = Value::Seq(vec![1i64.into(), 2.5.into()]);
    let arr = make_array(&values, &ElementKind::Float64).unwrap();
    assert_eq!(arr.data(), &ArrayData::Float64(vec![1.0, 2.5]));
}
