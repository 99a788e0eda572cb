#![allow(missing_docs)]

use std::panic::{self, AssertUnwindSafe};
use std::thread;

use glide_response::response::{DecodeError, Decoder, LcsRequest, RequestErrorType, ResponseGuard, Value, array_of, map_of};
use glide_response_testkit::{ErrorRecord, NativeHeap, Node};
use proptest::collection::vec;
use proptest::prelude::*;

const HANDLERS: usize = 16;

fn node_strategy() -> impl Strategy<Value = Node> {
	let leaf = prop_oneof![
		Just(Node::Null),
		any::<i64>().prop_map(Node::Int),
		any::<f64>().prop_map(Node::Float),
		any::<bool>().prop_map(Node::Bool),
		"[a-z0-9-]{0,8}".prop_map(Node::Text),
		vec(any::<u8>(), 0..8).prop_map(Node::Bytes),
		Just(Node::Okay),
		"[A-Z]{3} [a-z ]{0,10}".prop_map(Node::Error),
		(10u32..64).prop_map(Node::Raw),
	];
	leaf.prop_recursive(5, 64, 6, |inner| {
		prop_oneof![
			vec(inner.clone(), 0..6).prop_map(Node::Array),
			vec((inner.clone(), inner.clone()), 0..4).prop_map(Node::Map),
			vec(("[a-z]{0,4}".prop_map(Node::Text), inner.clone()), 0..6).prop_map(Node::Map),
			vec(inner, 0..6).prop_map(Node::Set),
		]
	})
}

/// Run one decoder entry point chosen by `handler`; only success matters.
fn run_handler(decoder: &Decoder, handler: usize, guard: ResponseGuard<&NativeHeap>) -> bool {
	match handler % HANDLERS {
		0 => decoder.any(guard).is_ok(),
		1 => decoder.string(guard).is_ok(),
		2 => decoder.int_or_nil(guard).is_ok(),
		3 => decoder.string_array(guard).is_ok(),
		4 => decoder.string_map(guard).is_ok(),
		5 => decoder.float_or_nil_array(guard).is_ok(),
		6 => decoder.stream_read(guard).is_ok(),
		7 => decoder.pending_summary(guard).is_ok(),
		8 => decoder.pending_detail(guard).is_ok(),
		9 => decoder.group_info(guard).is_ok(),
		10 => decoder.lcs(guard, LcsRequest::Matches).is_ok(),
		11 => decoder.cluster(guard, &map_of::<Value>(true)).is_ok(),
		12 => decoder.members_and_scores(guard, true).is_ok(),
		13 => decoder.function_stats(guard).is_ok(),
		14 => decoder.scan(guard).is_ok(),
		_ => decoder.string_set(guard).is_ok(),
	}
}

proptest! {
	#![proptest_config(ProptestConfig {
		cases: 10_000,
		max_shrink_iters: 512,
		.. ProptestConfig::default()
	})]

	#[test]
	fn every_decode_releases_exactly_once(node in node_strategy(), handler in 0..HANDLERS) {
		let heap = NativeHeap::new();
		let decoder = Decoder::default();
		run_handler(&decoder, handler, heap.guard(&node));

		let stats = heap.stats();
		prop_assert_eq!(stats.allocated, 1);
		prop_assert_eq!(stats.released, 1);
		prop_assert_eq!(stats.double_frees, 0);
		prop_assert_eq!(stats.live, 0);
		prop_assert_eq!(stats.nodes_freed, node.node_count());
	}
}

#[test]
fn null_pointer_reads_as_nil_without_release() {
	let heap = NativeHeap::new();
	let decoder = Decoder::default();

	assert_eq!(decoder.any(heap.null_guard()).expect("null decodes"), Value::Nil);
	assert_eq!(decoder.string_or_nil(heap.null_guard()).expect("nilable"), None);
	let err = decoder.string(heap.null_guard()).expect_err("nil not accepted");
	assert!(matches!(err, DecodeError::TypeMismatch { expected: "String", actual: "Null" }));

	let stats = heap.stats();
	assert_eq!(stats.allocated, 0);
	assert_eq!(stats.released, 0);
	assert_eq!(stats.double_frees, 0);
}

#[test]
fn mismatch_still_releases() {
	let heap = NativeHeap::new();
	let err = Decoder::default().int(heap.guard(&Node::text("7"))).expect_err("mismatch");
	assert!(matches!(err, DecodeError::TypeMismatch { expected: "Int", actual: "String" }));
	assert!(heap.stats().is_balanced());
}

#[test]
fn unknown_discriminant_is_an_error_and_still_releases() {
	let heap = NativeHeap::new();
	let err = Decoder::default().any(heap.guard(&Node::Raw(42))).expect_err("unknown discriminant");
	assert!(matches!(err, DecodeError::UnknownResponseType { raw: 42 }));
	assert!(heap.stats().is_balanced());
}

#[test]
fn guard_releases_during_unwind() {
	let heap = NativeHeap::new();
	let result = panic::catch_unwind(AssertUnwindSafe(|| {
		let _guard = heap.guard(&Node::texts(&["a", "b"]));
		panic!("handler failed");
	}));
	assert!(result.is_err());
	assert!(heap.stats().is_balanced());
}

#[test]
fn success_completion_decodes_and_releases() {
	let heap = NativeHeap::new();
	let decoder = Decoder::default();
	let value = decoder
		.complete(heap.success(&Node::texts(&["x", "y"])), |d, guard| d.string_array(guard))
		.expect("completion decodes");
	assert_eq!(value, ["x", "y"]);
	assert!(heap.stats().is_balanced());
}

#[test]
fn failure_completion_carries_kind_and_message() {
	let heap = NativeHeap::new();
	let decoder = Decoder::default();

	let record = ErrorRecord::new(2, "request timed out after 250ms");
	let err = decoder
		.complete(record.completion::<&NativeHeap>(), |d, guard| d.string(guard))
		.expect_err("failure surfaces");
	let DecodeError::Protocol(protocol) = err else {
		panic!("expected protocol error, got {err:?}");
	};
	assert_eq!(protocol.kind, RequestErrorType::Timeout);
	assert_eq!(protocol.message, "request timed out after 250ms");

	let unknown = ErrorRecord::new(77, "strange");
	let err = decoder
		.complete(unknown.completion::<&NativeHeap>(), |d, guard| d.any(guard))
		.expect_err("failure surfaces");
	assert!(matches!(err, DecodeError::Protocol(ref p) if p.kind == RequestErrorType::Unspecified));

	assert_eq!(heap.stats().allocated, 0);
}

#[test]
fn concurrent_decodes_share_one_heap() {
	const THREADS: usize = 8;
	const PER_THREAD: usize = 250;

	let heap = NativeHeap::new();
	let decoder = Decoder::default();
	let node = Node::map([("a", Node::texts(&["1", "2"])), ("b", Node::texts(&[]))]);

	thread::scope(|scope| {
		for worker in 0..THREADS {
			let heap = &heap;
			let node = &node;
			scope.spawn(move || {
				for i in 0..PER_THREAD {
					if (worker + i) % 2 == 0 {
						let map = decoder.string_array_map(heap.guard(node)).expect("decodes");
						assert_eq!(map.len(), 2);
					} else {
						let per_node = decoder.cluster(heap.guard(node), &array_of::<String>(false)).expect("multi decodes");
						assert!(!per_node.is_single());
						assert_eq!(per_node.multi().map(|m| m["a"].len()), Some(2));
					}
				}
			});
		}
	});

	let stats = heap.stats();
	assert_eq!(stats.allocated, THREADS * PER_THREAD);
	assert!(stats.is_balanced());
}
