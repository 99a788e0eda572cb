use std::collections::{BTreeMap, BTreeSet};
use std::ffi::c_long;
use std::slice;

use tracing::debug;

use crate::response::{CommandResponse, DECODE_TARGET, DecodeError, DecodeOptions, ResponseType, Result, Value};

/// Copy a native response tree into an owned [`Value`].
///
/// Nothing in the returned value borrows native memory, so the tree may be
/// released as soon as this returns.
///
/// # Safety
///
/// Every pointer reachable from `response` must be null with a zero length, or
/// point to as many initialized elements as its length field declares, and the
/// tree must not be released while this runs.
pub unsafe fn parse_response(response: &CommandResponse, opt: &DecodeOptions) -> Result<Value> {
	// SAFETY: forwarded caller contract.
	unsafe { parse_node(response, opt, 0) }
}

/// Check a native node's discriminant.
///
/// Returns `Ok(false)` for a `Null` node when `nilable` is set, `Ok(true)` when
/// the discriminant matches, and [`DecodeError::TypeMismatch`] otherwise.
pub fn check_response_type(response: &CommandResponse, expected: ResponseType, nilable: bool) -> Result<bool> {
	check_kind(response.kind()?, expected, nilable)
}

/// Same check as [`check_response_type`], applied to an already parsed value.
pub fn check_value_type(value: &Value, expected: ResponseType, nilable: bool) -> Result<bool> {
	check_kind(value.response_type(), expected, nilable)
}

fn check_kind(actual: ResponseType, expected: ResponseType, nilable: bool) -> Result<bool> {
	if actual == expected {
		return Ok(true);
	}
	if nilable && actual == ResponseType::Null {
		return Ok(false);
	}
	debug!(target: DECODE_TARGET, expected = expected.name(), actual = actual.name(), "response type mismatch");
	Err(DecodeError::TypeMismatch {
		expected: expected.name(),
		actual: actual.name(),
	})
}

unsafe fn parse_node(node: &CommandResponse, opt: &DecodeOptions, depth: u32) -> Result<Value> {
	if depth > opt.max_depth {
		return Err(DecodeError::DepthExceeded { max_depth: opt.max_depth });
	}

	// SAFETY (all blocks below): pointer validity is the caller contract of `parse_response`.
	let value = match node.kind()? {
		ResponseType::Null => Value::Nil,
		ResponseType::Int => Value::Int(node.int_value),
		ResponseType::Float => Value::Float(node.float_value),
		ResponseType::Bool => Value::Bool(node.bool_value),
		ResponseType::Ok => Value::Okay,
		ResponseType::String => Value::String(unsafe { string_bytes(node) }?),
		ResponseType::Error => {
			let bytes = unsafe { string_bytes(node) }?;
			Value::Error(String::from_utf8_lossy(&bytes).into_owned())
		}
		ResponseType::Array => {
			let children = unsafe { nodes(node.array_value, node.array_value_len, "array_value", opt) }?;
			let mut items = Vec::with_capacity(children.len());
			for child in children {
				items.push(unsafe { parse_node(child, opt, depth + 1) }?);
			}
			Value::Array(items)
		}
		ResponseType::Map => {
			let pairs = unsafe { nodes(node.array_value, node.array_value_len, "array_value", opt) }?;
			let mut map = BTreeMap::new();
			for pair in pairs {
				let key = unsafe { deref(pair.map_key, "map_key") }?;
				let value = unsafe { deref(pair.map_value, "map_value") }?;
				let key = unsafe { map_key(key) }?;
				map.insert(key, unsafe { parse_node(value, opt, depth + 1) }?);
			}
			Value::Map(map)
		}
		ResponseType::Sets => {
			let members = unsafe { nodes(node.sets_value, node.sets_value_len, "sets_value", opt) }?;
			let mut set = BTreeSet::new();
			for member in members {
				let kind = member.kind()?;
				if kind != ResponseType::String {
					return Err(DecodeError::shape("set", format!("member of type {}, expected String", kind.name())));
				}
				set.insert(unsafe { string_bytes(member) }?);
			}
			Value::Set(set)
		}
	};
	Ok(value)
}

unsafe fn map_key(key: &CommandResponse) -> Result<String> {
	let kind = key.kind()?;
	if kind != ResponseType::String {
		return Err(DecodeError::MapKeyNotText { actual: kind.name() });
	}
	// SAFETY: forwarded caller contract.
	let bytes = unsafe { string_bytes(key) }?;
	String::from_utf8(bytes).map_err(|_| DecodeError::MapKeyNotText { actual: "non-UTF-8 String" })
}

unsafe fn string_bytes(node: &CommandResponse) -> Result<Vec<u8>> {
	let len = checked_len(node.string_value_len, "string_value")?;
	if len == 0 {
		return Ok(Vec::new());
	}
	if node.string_value.is_null() {
		return Err(DecodeError::NullPayload {
			field: "string_value",
			len: i64::from(node.string_value_len),
		});
	}
	// SAFETY: non-null and `len` bytes long per the caller contract.
	let bytes = unsafe { slice::from_raw_parts(node.string_value.cast_const().cast::<u8>(), len) };
	Ok(bytes.to_vec())
}

unsafe fn nodes<'a>(ptr: *const CommandResponse, len: c_long, field: &'static str, opt: &DecodeOptions) -> Result<&'a [CommandResponse]> {
	let count = checked_len(len, field)?;
	if count > opt.max_collection_len {
		return Err(DecodeError::CollectionTooLarge {
			len: count,
			max: opt.max_collection_len,
		});
	}
	if count == 0 {
		return Ok(&[]);
	}
	if ptr.is_null() {
		return Err(DecodeError::NullPayload {
			field,
			len: i64::from(len),
		});
	}
	// SAFETY: non-null and `count` nodes long per the caller contract.
	Ok(unsafe { slice::from_raw_parts(ptr, count) })
}

unsafe fn deref<'a>(ptr: *const CommandResponse, field: &'static str) -> Result<&'a CommandResponse> {
	// SAFETY: non-null pointers reference a live node per the caller contract.
	unsafe { ptr.as_ref() }.ok_or(DecodeError::NullPayload { field, len: 1 })
}

fn checked_len(len: c_long, field: &'static str) -> Result<usize> {
	let len = i64::from(len);
	usize::try_from(len).map_err(|_| DecodeError::NegativeLength { field, len })
}
