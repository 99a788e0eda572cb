use rstest::rstest;

use super::{
	MemberAndScore, shape_key_values, shape_key_with_member_and_score, shape_key_with_members_and_scores, shape_member_and_score_pairs, shape_members_and_scores,
	shape_rank_and_score, shape_scan,
};
use crate::response::{DecodeError, Value};

fn scores(entries: &[(&str, f64)]) -> Value {
	Value::Map(entries.iter().map(|(m, s)| ((*m).to_owned(), Value::Float(*s))).collect())
}

fn members(list: &[MemberAndScore]) -> Vec<&str> {
	list.iter().map(|m| m.member.as_str()).collect()
}

#[rstest]
#[case::ascending(false, vec!["b", "a", "c"])]
#[case::descending(true, vec!["c", "a", "b"])]
fn members_sort_by_score_then_member(#[case] reverse: bool, #[case] expected: Vec<&str>) {
	let value = scores(&[("c", 3.0), ("a", 1.0), ("b", 0.5)]);
	let sorted = shape_members_and_scores(value, reverse).expect("shapes");
	assert_eq!(members(&sorted), expected);
}

#[test]
fn equal_scores_fall_back_to_member_order() {
	let sorted = shape_members_and_scores(scores(&[("y", 1.0), ("x", 1.0)]), false).expect("shapes");
	assert_eq!(members(&sorted), vec!["x", "y"]);
}

#[test]
fn pairs_keep_wire_order() {
	let value = Value::Array(vec![
		Value::Array(vec![Value::from("z"), Value::Float(9.0)]),
		Value::Array(vec![Value::from("a"), Value::Float(1.0)]),
	]);
	assert_eq!(members(&shape_member_and_score_pairs(value).expect("shapes")), vec!["z", "a"]);
}

#[test]
fn blocking_pop_reply_and_timeout() {
	let value = Value::Array(vec![Value::from("zset"), Value::from("m"), Value::Float(2.0)]);
	let popped = shape_key_with_member_and_score(value).expect("shapes").expect("present");
	assert_eq!(popped.key, "zset");
	assert_eq!(popped.score, 2.0);
	assert_eq!(shape_key_with_member_and_score(Value::Nil).expect("shapes"), None);
}

#[test]
fn multi_pop_reply_is_sorted() {
	let value = Value::Array(vec![Value::from("zset"), scores(&[("b", 2.0), ("a", 1.0)])]);
	let popped = shape_key_with_members_and_scores(value).expect("shapes").expect("present");
	assert_eq!(members(&popped.members), vec!["a", "b"]);
}

#[test]
fn rank_and_score_requires_int_then_float() {
	let ok = Value::Array(vec![Value::Int(3), Value::Float(1.5)]);
	let parsed = shape_rank_and_score(ok).expect("shapes").expect("present");
	assert_eq!((parsed.rank, parsed.score), (3, 1.5));

	let swapped = Value::Array(vec![Value::Float(1.5), Value::Int(3)]);
	assert!(matches!(shape_rank_and_score(swapped), Err(DecodeError::Conversion { .. })));
}

#[test]
fn scan_page_reads_cursor_and_items() {
	let value = Value::Array(vec![Value::from("0"), Value::Array(vec![Value::from("k1"), Value::from("k2")])]);
	let page = shape_scan(value).expect("shapes");
	assert!(page.is_finished());
	assert_eq!(page.data, vec!["k1".to_owned(), "k2".to_owned()]);
}

#[test]
fn key_values_null_is_absent() {
	assert_eq!(shape_key_values(Value::Nil).expect("shapes"), None);
	let value = Value::Map([("list".to_owned(), Value::Array(vec![Value::from("v")]))].into_iter().collect());
	let popped = shape_key_values(value).expect("shapes").expect("present");
	assert_eq!(popped[0].key, "list");
	assert_eq!(popped[0].values, vec!["v".to_owned()]);
}
