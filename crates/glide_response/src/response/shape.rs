//! Helpers shared by the domain shapers.

use std::collections::BTreeMap;

use crate::response::convert::narrow_at;
use crate::response::{DecodeError, Narrow, Result, Segment, Value};

pub(crate) type Record = BTreeMap<String, Value>;

pub(crate) fn array(value: Value, context: &'static str) -> Result<Vec<Value>> {
	match value {
		Value::Array(items) => Ok(items),
		other => Err(DecodeError::shape(context, format!("expected Array, got {}", other.kind()))),
	}
}

pub(crate) fn record(value: Value, context: &'static str) -> Result<Record> {
	match value {
		Value::Map(map) => Ok(map),
		other => Err(DecodeError::shape(context, format!("expected Map, got {}", other.kind()))),
	}
}

pub(crate) fn tuple<const N: usize>(value: Value, context: &'static str) -> Result<[Value; N]> {
	let items = array(value, context)?;
	<[Value; N]>::try_from(items).map_err(|items| DecodeError::shape(context, format!("expected {N} elements, got {}", items.len())))
}

pub(crate) fn element<T: Narrow>(value: Value, idx: usize) -> Result<T> {
	narrow_at(value, Segment::Index(idx))
}

pub(crate) fn field<T: Narrow>(map: &mut Record, context: &'static str, key: &str) -> Result<T> {
	let value = map.remove(key).ok_or_else(|| DecodeError::shape(context, format!("missing field {key:?}")))?;
	narrow_at(value, Segment::Key(key.to_owned()))
}

/// Absent keys and `Null` values both read as `None`.
pub(crate) fn optional_field<T: Narrow>(map: &mut Record, key: &str) -> Result<Option<T>> {
	match map.remove(key) {
		None | Some(Value::Nil) => Ok(None),
		Some(value) => narrow_at(value, Segment::Key(key.to_owned())).map(Some),
	}
}

pub(crate) fn decimal(text: String, context: &'static str) -> Result<i64> {
	text.trim().parse::<i64>().map_err(|_| DecodeError::NotAnInteger { context, text })
}
