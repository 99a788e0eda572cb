#![allow(missing_docs)]

use glide_response::response::{Decoder, Value};
use glide_response_testkit::{NativeHeap, Node};
use proptest::collection::vec;
use proptest::prelude::*;

fn scalar() -> impl Strategy<Value = Node> {
	prop_oneof![
		Just(Node::Null),
		any::<i64>().prop_map(Node::Int),
		(-1.0e15f64..1.0e15).prop_map(Node::Float),
		Just(Node::Float(f64::INFINITY)),
		any::<bool>().prop_map(Node::Bool),
		"\\PC{0,8}".prop_map(Node::Text),
		vec(any::<u8>(), 0..12).prop_map(Node::Bytes),
		vec(0x80u8..=0xff, 1..6).prop_map(Node::Bytes),
		Just(Node::Okay),
		"[A-Z]{3} [a-z ]{0,10}".prop_map(Node::Error),
	]
}

fn member() -> impl Strategy<Value = Node> {
	prop_oneof!["[a-z]{0,4}".prop_map(Node::Text), vec(any::<u8>(), 0..6).prop_map(Node::Bytes)]
}

/// Trees whose every node is parseable: text map keys, string set members, no raw discriminants.
fn parseable_tree() -> impl Strategy<Value = Node> {
	scalar().prop_recursive(5, 64, 6, |inner| {
		prop_oneof![
			vec(inner.clone(), 0..6).prop_map(Node::Array),
			vec(("\\PC{0,4}".prop_map(Node::Text), inner), 0..6).prop_map(Node::Map),
			vec(member(), 0..6).prop_map(Node::Set),
		]
	})
}

proptest! {
	#![proptest_config(ProptestConfig {
		cases: 10_000,
		max_shrink_iters: 512,
		.. ProptestConfig::default()
	})]

	#[test]
	fn decoded_value_matches_native_tree(node in parseable_tree()) {
		let expected = node.expected_value().expect("generated tree is parseable");
		let heap = NativeHeap::new();
		let decoded = Decoder::default().any(heap.guard(&node));
		match &expected {
			// Only a top-level error node turns into a protocol failure.
			Value::Error(message) => {
				let err = decoded.expect_err("top-level error node");
				prop_assert_eq!(err.to_string(), format!("request error: {message}"));
			}
			_ => prop_assert_eq!(decoded.expect("parseable tree decodes"), expected),
		}
		prop_assert!(heap.stats().is_balanced());
	}
}

#[test]
fn non_utf8_bytes_survive_exactly() {
	let bytes = vec![0xff, 0x00, 0xc3, 0x28, 0x80];
	let node = Node::Array(vec![Node::Bytes(bytes.clone()), Node::Set(vec![Node::Bytes(bytes.clone())])]);
	let heap = NativeHeap::new();
	let value = Decoder::default().any(heap.guard(&node)).expect("decodes");
	assert_eq!(value, node.expected_value().expect("parseable"));
	let Value::Array(items) = value else {
		panic!("expected array");
	};
	assert_eq!(items[0], Value::String(bytes));
}
