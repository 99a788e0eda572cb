use super::{LcsMatchedPosition, LcsRange, LcsRequest, LcsResult, shape_lcs};
use crate::response::{DecodeError, Value};

fn pair(a: i64, b: i64) -> Value {
	Value::Array(vec![Value::Int(a), Value::Int(b)])
}

#[test]
fn simple_forms_follow_the_request() {
	assert_eq!(
		shape_lcs(Value::from("mytext"), LcsRequest::Subsequence).expect("shapes"),
		LcsResult::Subsequence("mytext".to_owned())
	);
	assert_eq!(shape_lcs(Value::Int(6), LcsRequest::Length).expect("shapes"), LcsResult::Length(6));
	assert!(matches!(
		shape_lcs(Value::Int(6), LcsRequest::Subsequence),
		Err(DecodeError::TypeMismatch { expected: "String", actual: "Int" })
	));
}

#[test]
fn idx_form_reads_ranges_and_optional_lengths() {
	let value = Value::Map(
		[
			(
				"matches".to_owned(),
				Value::Array(vec![
					Value::Array(vec![pair(4, 7), pair(5, 8), Value::Int(4)]),
					Value::Array(vec![pair(2, 3), pair(0, 1)]),
				]),
			),
			("len".to_owned(), Value::Int(6)),
		]
		.into_iter()
		.collect(),
	);
	let LcsResult::Matches(result) = shape_lcs(value, LcsRequest::Matches).expect("shapes") else {
		panic!("expected matches");
	};
	assert_eq!(result.len, 6);
	assert_eq!(
		result.matches[0],
		LcsMatchedPosition {
			key1: LcsRange { start: 4, end: 7 },
			key2: LcsRange { start: 5, end: 8 },
			match_len: Some(4),
		}
	);
	assert_eq!(result.matches[1].match_len, None);
}

#[test]
fn idx_form_without_len_is_a_shape_error() {
	let value = Value::Map([("matches".to_owned(), Value::Array(Vec::new()))].into_iter().collect());
	assert!(matches!(shape_lcs(value, LcsRequest::Matches), Err(DecodeError::Shape { .. })));
}
