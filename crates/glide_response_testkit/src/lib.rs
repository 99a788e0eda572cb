//! Shared test helpers: build native response trees and count how they are released.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::ffi::{CString, c_char, c_long};
use std::ptr::{self, NonNull};
use std::sync::{Mutex, PoisonError};

use glide_response::response::{CommandError, CommandResponse, Completion, Release, ResponseGuard, ResponseType, Value};
use serde::{Deserialize, Serialize};

/// Owned description of a native response tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Node {
	/// `Null` node.
	Null,
	/// `Int` node.
	Int(i64),
	/// `Float` node.
	Float(f64),
	/// `Bool` node.
	Bool(bool),
	/// `String` node holding UTF-8 text.
	Text(String),
	/// `String` node holding arbitrary bytes.
	Bytes(Vec<u8>),
	/// `Array` node.
	Array(Vec<Node>),
	/// `Map` node; keys are not restricted to strings.
	Map(Vec<(Node, Node)>),
	/// `Sets` node.
	Set(Vec<Node>),
	/// `Ok` node.
	Okay,
	/// `Error` node with its message.
	Error(String),
	/// Node carrying a raw discriminant and no payload.
	Raw(u32),
}

impl Node {
	/// Text node.
	pub fn text(text: &str) -> Self {
		Self::Text(text.to_owned())
	}

	/// Array of text nodes.
	pub fn texts(items: &[&str]) -> Self {
		Self::Array(items.iter().map(|s| Self::text(s)).collect())
	}

	/// Map with text keys.
	pub fn map<'a>(pairs: impl IntoIterator<Item = (&'a str, Node)>) -> Self {
		Self::Map(pairs.into_iter().map(|(k, v)| (Self::text(k), v)).collect())
	}

	/// Convert plain JSON: objects become maps, strings become text, integral
	/// numbers become `Int` and the rest `Float`.
	pub fn from_json(value: &serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => Self::Null,
			serde_json::Value::Bool(b) => Self::Bool(*b),
			serde_json::Value::Number(n) => match n.as_i64() {
				Some(i) => Self::Int(i),
				None => n.as_f64().map_or(Self::Null, Self::Float),
			},
			serde_json::Value::String(s) => Self::Text(s.clone()),
			serde_json::Value::Array(items) => Self::Array(items.iter().map(Self::from_json).collect()),
			serde_json::Value::Object(map) => Self::Map(map.iter().map(|(k, v)| (Self::Text(k.clone()), Self::from_json(v))).collect()),
		}
	}

	/// Owned value the parser must produce for this tree.
	///
	/// `None` when parsing has to fail: a raw discriminant, a map key that is
	/// not UTF-8 text, or a set member that is not a string.
	pub fn expected_value(&self) -> Option<Value> {
		let value = match self {
			Self::Null => Value::Nil,
			Self::Int(v) => Value::Int(*v),
			Self::Float(v) => Value::Float(*v),
			Self::Bool(v) => Value::Bool(*v),
			Self::Text(text) => Value::String(text.as_bytes().to_vec()),
			Self::Bytes(bytes) => Value::String(bytes.clone()),
			Self::Okay => Value::Okay,
			Self::Error(message) => Value::Error(message.clone()),
			Self::Raw(_) => return None,
			Self::Array(items) => Value::Array(items.iter().map(Self::expected_value).collect::<Option<Vec<_>>>()?),
			Self::Map(pairs) => {
				let mut map = BTreeMap::new();
				for (key, value) in pairs {
					map.insert(key.map_key()?, value.expected_value()?);
				}
				Value::Map(map)
			}
			Self::Set(members) => Value::Set(members.iter().map(Self::set_member).collect::<Option<BTreeSet<_>>>()?),
		};
		Some(value)
	}

	fn map_key(&self) -> Option<String> {
		match self {
			Self::Text(text) => Some(text.clone()),
			Self::Bytes(bytes) => String::from_utf8(bytes.clone()).ok(),
			_ => None,
		}
	}

	fn set_member(&self) -> Option<Vec<u8>> {
		match self {
			Self::Text(text) => Some(text.as_bytes().to_vec()),
			Self::Bytes(bytes) => Some(bytes.clone()),
			_ => None,
		}
	}

	/// Number of native nodes this tree allocates, map pair nodes included.
	pub fn node_count(&self) -> usize {
		match self {
			Self::Array(items) | Self::Set(items) => 1 + items.iter().map(Self::node_count).sum::<usize>(),
			Self::Map(pairs) => 1 + pairs.iter().map(|(k, v)| 1 + k.node_count() + v.node_count()).sum::<usize>(),
			_ => 1,
		}
	}
}

/// Release counters of a [`NativeHeap`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapStats {
	/// Trees handed out.
	pub allocated: usize,
	/// Trees released once.
	pub released: usize,
	/// Release calls on a tree that was already released or never allocated.
	pub double_frees: usize,
	/// Trees allocated and not yet released.
	pub live: usize,
	/// Native nodes freed so far.
	pub nodes_freed: usize,
}

impl HeapStats {
	/// Every allocated tree was released exactly once.
	pub fn is_balanced(&self) -> bool {
		self.live == 0 && self.double_frees == 0 && self.allocated == self.released
	}
}

#[derive(Debug, Default)]
struct HeapState {
	live: HashSet<usize>,
	stats: HeapStats,
}

/// Instrumented allocator standing in for the native client.
///
/// Every tree comes from [`NativeHeap::alloc`] and goes back through
/// [`Release::release`]. A second release of the same root is counted and
/// otherwise ignored. Trees still live when the heap drops are freed then.
#[derive(Debug, Default)]
pub struct NativeHeap {
	state: Mutex<HeapState>,
}

impl NativeHeap {
	/// Empty heap.
	pub fn new() -> Self {
		Self::default()
	}

	/// Allocate a native tree for `node` and return its root.
	pub fn alloc(&self, node: &Node) -> *mut CommandResponse {
		let root = Box::into_raw(Box::new(build(node)));
		let mut state = self.lock();
		state.live.insert(root.expose_provenance());
		state.stats.allocated += 1;
		root
	}

	/// Allocate `node` and wrap it in a guard releasing back to this heap.
	pub fn guard(&self, node: &Node) -> ResponseGuard<&Self> {
		let ptr = self.alloc(node);
		// SAFETY: `ptr` is a fresh tree from this heap with no other owner.
		unsafe { ResponseGuard::new(ptr, self) }
	}

	/// Guard over a null pointer.
	pub fn null_guard(&self) -> ResponseGuard<&Self> {
		// SAFETY: a null pointer is never released.
		unsafe { ResponseGuard::new(ptr::null_mut(), self) }
	}

	/// Success completion wrapping a fresh tree.
	pub fn success(&self, node: &Node) -> Completion<&Self> {
		let ptr = self.alloc(node);
		// SAFETY: `ptr` is a fresh tree from this heap with no other owner.
		unsafe { Completion::success(ptr, self) }
	}

	/// Snapshot of the counters.
	pub fn stats(&self) -> HeapStats {
		let state = self.lock();
		HeapStats {
			live: state.live.len(),
			..state.stats
		}
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, HeapState> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

impl Release for NativeHeap {
	unsafe fn release(&self, response: NonNull<CommandResponse>) {
		let mut state = self.lock();
		if !state.live.remove(&response.as_ptr().addr()) {
			state.stats.double_frees += 1;
			return;
		}
		// SAFETY: the root was live in this heap, so it came from `alloc` and is freed once.
		let freed = unsafe { free_root(response.as_ptr()) };
		state.stats.released += 1;
		state.stats.nodes_freed += freed;
	}
}

impl Drop for NativeHeap {
	fn drop(&mut self) {
		let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
		for addr in state.live.drain() {
			// SAFETY: live addresses are unreleased roots from `alloc`.
			unsafe { free_root(ptr::with_exposed_provenance_mut(addr)) };
		}
	}
}

/// Owned failure record for [`Completion::failure_from_raw`].
#[derive(Debug)]
pub struct ErrorRecord {
	_message: CString,
	record: CommandError,
}

impl ErrorRecord {
	/// Record with a raw error classification and message. Interior NULs are dropped.
	pub fn new(kind: u32, message: &str) -> Self {
		let message = CString::new(message.replace('\0', "")).unwrap_or_default();
		let record = CommandError {
			command_error_message: message.as_ptr(),
			command_error_type: kind,
		};
		Self { _message: message, record }
	}

	/// Pointer to the record; valid while `self` lives.
	pub fn as_ptr(&self) -> NonNull<CommandError> {
		NonNull::from(&self.record)
	}

	/// Failure completion copied from this record.
	pub fn completion<R: Release>(&self) -> Completion<R> {
		// SAFETY: the record and its NUL-terminated message live as long as `self`.
		unsafe { Completion::failure_from_raw(self.as_ptr()) }
	}
}

fn c_len(len: usize) -> c_long {
	c_long::try_from(len).unwrap_or(c_long::MAX)
}

fn build(node: &Node) -> CommandResponse {
	match node {
		Node::Null => CommandResponse::empty(ResponseType::Null),
		Node::Int(v) => CommandResponse {
			int_value: *v,
			..CommandResponse::empty(ResponseType::Int)
		},
		Node::Float(v) => CommandResponse {
			float_value: *v,
			..CommandResponse::empty(ResponseType::Float)
		},
		Node::Bool(v) => CommandResponse {
			bool_value: *v,
			..CommandResponse::empty(ResponseType::Bool)
		},
		Node::Text(text) => with_string(ResponseType::String, text.as_bytes()),
		Node::Bytes(bytes) => with_string(ResponseType::String, bytes),
		Node::Error(message) => with_string(ResponseType::Error, message.as_bytes()),
		Node::Okay => CommandResponse::empty(ResponseType::Ok),
		Node::Array(items) => {
			let (ptr, len) = leak_nodes(items.iter().map(build).collect());
			CommandResponse {
				array_value: ptr,
				array_value_len: len,
				..CommandResponse::empty(ResponseType::Array)
			}
		}
		Node::Map(pairs) => {
			let pairs = pairs
				.iter()
				.map(|(k, v)| CommandResponse {
					map_key: Box::into_raw(Box::new(build(k))),
					map_value: Box::into_raw(Box::new(build(v))),
					..CommandResponse::default()
				})
				.collect();
			let (ptr, len) = leak_nodes(pairs);
			CommandResponse {
				array_value: ptr,
				array_value_len: len,
				..CommandResponse::empty(ResponseType::Map)
			}
		}
		Node::Set(members) => {
			let (ptr, len) = leak_nodes(members.iter().map(build).collect());
			CommandResponse {
				sets_value: ptr,
				sets_value_len: len,
				..CommandResponse::empty(ResponseType::Sets)
			}
		}
		Node::Raw(raw) => CommandResponse {
			response_type: *raw,
			..CommandResponse::default()
		},
	}
}

fn with_string(kind: ResponseType, bytes: &[u8]) -> CommandResponse {
	let mut node = CommandResponse::empty(kind);
	if !bytes.is_empty() {
		let boxed: Box<[u8]> = bytes.into();
		node.string_value_len = c_len(boxed.len());
		node.string_value = Box::into_raw(boxed).cast::<c_char>();
	}
	node
}

fn leak_nodes(nodes: Vec<CommandResponse>) -> (*mut CommandResponse, c_long) {
	if nodes.is_empty() {
		return (ptr::null_mut(), 0);
	}
	let boxed = nodes.into_boxed_slice();
	let len = c_len(boxed.len());
	(Box::into_raw(boxed).cast::<CommandResponse>(), len)
}

/// Free a root produced by [`NativeHeap::alloc`]; returns the node count.
unsafe fn free_root(root: *mut CommandResponse) -> usize {
	// SAFETY: the root was boxed by `alloc` and is freed once.
	let root = unsafe { Box::from_raw(root) };
	// SAFETY: payload pointers were produced by `build`.
	unsafe { free_payload(&root) }
}

unsafe fn free_payload(node: &CommandResponse) -> usize {
	let mut freed = 1;
	if !node.string_value.is_null() {
		let len = usize::try_from(node.string_value_len).unwrap_or(0);
		// SAFETY: boxed byte slice of `len` bytes from `with_string`.
		drop(unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(node.string_value.cast::<u8>(), len)) });
	}
	// SAFETY (both calls): boxed node slices from `leak_nodes`.
	freed += unsafe { free_nodes(node.array_value, node.array_value_len) };
	freed += unsafe { free_nodes(node.sets_value, node.sets_value_len) };
	for child in [node.map_key, node.map_value] {
		if !child.is_null() {
			// SAFETY: boxed by the map branch of `build`.
			let child = unsafe { Box::from_raw(child) };
			// SAFETY: payload pointers were produced by `build`.
			freed += unsafe { free_payload(&child) };
		}
	}
	freed
}

unsafe fn free_nodes(ptr: *mut CommandResponse, len: c_long) -> usize {
	if ptr.is_null() {
		return 0;
	}
	let len = usize::try_from(len).unwrap_or(0);
	// SAFETY: boxed slice of `len` nodes from `leak_nodes`.
	let nodes = unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(ptr, len)) };
	nodes
		.iter()
		// SAFETY: payload pointers were produced by `build`.
		.map(|child| unsafe { free_payload(child) })
		.sum()
}
