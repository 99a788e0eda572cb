use super::{ConsumerPendingCount, PendingDetail, shape_pending_detail, shape_pending_summary};
use crate::response::{DecodeError, Segment, Value};

fn text(s: &str) -> Value {
	Value::from(s)
}

#[test]
fn summary_parses_decimal_consumer_counts() {
	let value = Value::Array(vec![
		Value::Int(2),
		text("1-0"),
		text("5-0"),
		Value::Array(vec![Value::Array(vec![text("consumerA"), text("2")])]),
	]);
	let summary = shape_pending_summary(value).expect("shapes");
	assert_eq!(summary.count, 2);
	assert_eq!(summary.start_id.as_deref(), Some("1-0"));
	assert_eq!(summary.end_id.as_deref(), Some("5-0"));
	assert_eq!(
		summary.consumers,
		vec![ConsumerPendingCount {
			consumer: "consumerA".to_owned(),
			count: 2
		}]
	);
}

#[test]
fn empty_summary_has_no_consumers() {
	let value = Value::Array(vec![Value::Int(0), Value::Nil, Value::Nil, Value::Nil]);
	let summary = shape_pending_summary(value).expect("shapes");
	assert_eq!(summary.start_id, None);
	assert!(summary.consumers.is_empty());
}

#[test]
fn non_decimal_count_is_rejected() {
	let value = Value::Array(vec![
		Value::Int(1),
		text("1-0"),
		text("1-0"),
		Value::Array(vec![Value::Array(vec![text("c"), text("two")])]),
	]);
	let err = shape_pending_summary(value).expect_err("bad count");
	assert!(matches!(err, DecodeError::NotAnInteger { ref text, .. } if text == "two"));
}

#[test]
fn summary_arity_is_checked() {
	let err = shape_pending_summary(Value::Array(vec![Value::Int(1)])).expect_err("short summary");
	assert!(matches!(err, DecodeError::Shape { .. }));
}

#[test]
fn detail_null_is_empty() {
	assert!(shape_pending_detail(Value::Nil).expect("shapes").is_empty());
}

#[test]
fn detail_rows_are_typed() {
	let value = Value::Array(vec![Value::Array(vec![text("1-0"), text("alice"), Value::Int(120), Value::Int(3)])]);
	assert_eq!(
		shape_pending_detail(value).expect("shapes"),
		vec![PendingDetail {
			id: "1-0".to_owned(),
			consumer: "alice".to_owned(),
			idle_ms: 120,
			delivery_count: 3,
		}]
	);
}

#[test]
fn detail_three_tuple_is_a_shape_error() {
	let full = Value::Array(vec![text("1-0"), text("alice"), Value::Int(120), Value::Int(1)]);
	let short = Value::Array(vec![text("2-0"), text("alice"), Value::Int(120)]);
	let err = shape_pending_detail(Value::Array(vec![full, short])).expect_err("short row");
	let DecodeError::Shape { context, position, .. } = &err else {
		panic!("expected shape error, got {err:?}");
	};
	assert_eq!(*context, "pending detail");
	assert_eq!(position.segments(), &[Segment::Index(1)]);
}
