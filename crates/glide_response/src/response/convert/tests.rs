use std::collections::BTreeMap;

use super::{Converter, Direct, KeepNil, MappingConverter, Narrow, SequenceConverter, array_of, array_of_arrays, array_of_nil_or, map_of, map_of_maps};
use crate::response::{DecodeError, Segment, Value};

fn text(s: &str) -> Value {
	Value::from(s)
}

fn map(entries: &[(&str, Value)]) -> Value {
	Value::Map(entries.iter().map(|(k, v)| ((*k).to_owned(), v.clone())).collect())
}

#[test]
fn empty_array_converts_to_empty_vec() {
	let out = array_of::<String>(false).convert(Value::Array(Vec::new())).expect("converts");
	assert_eq!(out, Some(Vec::new()));
}

#[test]
fn mapping_of_int_respects_nil_policy() {
	let strict = MappingConverter {
		next: Direct::<i64>::new(),
		can_be_nil: false,
	};
	let err = strict.convert(Value::Nil).expect_err("nil rejected");
	assert!(matches!(err, DecodeError::UnexpectedNil { expected: "Map" }));

	let lenient = MappingConverter {
		next: Direct::<i64>::new(),
		can_be_nil: true,
	};
	assert_eq!(lenient.convert(Value::Nil).expect("nil accepted"), None);

	let out = strict.convert(map(&[("a", Value::Int(1)), ("b", Value::Int(2))])).expect("converts");
	assert_eq!(out, Some(BTreeMap::from([("a".to_owned(), 1), ("b".to_owned(), 2)])));
}

#[test]
fn absent_inner_element_becomes_default() {
	let converter = array_of_arrays::<String>(true);
	let value = Value::Array(vec![Value::Array(vec![text("x"), text("y")]), Value::Nil]);
	let out = converter.convert(value).expect("converts").expect("present");
	assert_eq!(out, vec![vec!["x".to_owned(), "y".to_owned()], Vec::new()]);
}

#[test]
fn nil_leaf_is_rejected_without_option() {
	let err = array_of::<String>(false).convert(Value::Array(vec![text("a"), Value::Nil])).expect_err("nil leaf");
	let DecodeError::Conversion { position, found, expected } = err else {
		panic!("expected conversion error");
	};
	assert_eq!(position.segments(), &[Segment::Index(1)]);
	assert_eq!(found, "Null");
	assert_eq!(expected, "String");
}

#[test]
fn nil_leaf_is_kept_with_option() {
	let out = array_of_nil_or::<i64>(false)
		.convert(Value::Array(vec![Value::Int(3), Value::Nil]))
		.expect("converts");
	assert_eq!(out, Some(vec![Some(3), None]));
}

#[test]
fn nested_failure_reports_full_position() {
	let value = map(&[("node-1", map(&[("field", Value::Int(9))]))]);
	let err = map_of_maps::<String>().convert(value).expect_err("int where string expected");
	assert_eq!(err.to_string(), "unexpected element type at [\"node-1\"][\"field\"]: got Int, expected String");
}

#[test]
fn wrong_container_is_a_type_mismatch() {
	let err = map_of::<i64>(false).convert(Value::Array(Vec::new())).expect_err("array is not map");
	assert_eq!(
		err,
		DecodeError::TypeMismatch {
			expected: "Map",
			actual: "Array"
		}
	);
}

#[test]
fn ok_status_narrows_to_ok_text() {
	assert_eq!(String::narrow(Value::Okay).expect("ok narrows"), "OK");
}

#[test]
fn invalid_utf8_is_not_text_but_is_bytes() {
	let raw = Value::String(vec![0xff, 0xfe]);
	assert!(String::narrow(raw.clone()).is_err());
	assert_eq!(Vec::<u8>::narrow(raw).expect("bytes narrow"), vec![0xff, 0xfe]);
}

#[test]
fn int_is_not_widened_to_float() {
	assert!(f64::narrow(Value::Int(1)).is_err());
}

#[test]
fn borrowed_converter_converts() {
	let inner = SequenceConverter {
		next: Direct::<bool>::new(),
		can_be_nil: false,
	};
	let by_ref = &inner;
	assert_eq!(by_ref.convert(Value::Array(vec![Value::Bool(true)])).expect("converts"), Some(vec![true]));
}

#[test]
fn keep_nil_distinguishes_null_rows_from_empty_ones() {
	let converter = SequenceConverter {
		next: KeepNil(array_of::<i64>(true)),
		can_be_nil: false,
	};
	let value = Value::Array(vec![Value::Nil, Value::Array(Vec::new()), Value::Array(vec![Value::Int(3)])]);
	assert_eq!(converter.convert(value).expect("converts"), Some(vec![None, Some(Vec::new()), Some(vec![3])]));
}
