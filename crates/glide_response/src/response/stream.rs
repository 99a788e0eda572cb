use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::response::convert::narrow_at;
use crate::response::shape::{array, element, field, optional_field, record, tuple};
use crate::response::{DecodeError, Result, Segment, Value};

/// One stream entry: its id and field/value pairs in wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamEntry {
	/// Entry id, `<ms>-<seq>`.
	pub id: String,
	/// Field/value pairs; empty for entries deleted while pending.
	pub fields: Vec<(String, String)>,
}

/// Entries read from one stream key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamResponse {
	/// Entries in stream order.
	pub entries: Vec<StreamEntry>,
}

/// `XAUTOCLAIM` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AutoClaim {
	/// Cursor for the next call.
	pub next_entry: String,
	/// Claimed entries.
	pub claimed: Vec<StreamEntry>,
	/// Ids deleted from the PEL; `None` before server 7.0.
	pub deleted: Option<Vec<String>>,
}

/// `XAUTOCLAIM ... JUSTID` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AutoClaimJustId {
	/// Cursor for the next call.
	pub next_entry: String,
	/// Claimed ids.
	pub claimed: Vec<String>,
	/// Ids deleted from the PEL; `None` before server 7.0.
	pub deleted: Option<Vec<String>>,
}

/// `XINFO STREAM` summary reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamInfo {
	/// Number of entries.
	pub length: i64,
	/// Radix tree key count.
	pub radix_tree_keys: i64,
	/// Radix tree node count.
	pub radix_tree_nodes: i64,
	/// Number of consumer groups.
	pub groups: i64,
	/// Last generated id.
	pub last_generated_id: String,
	/// Highest deleted id (7.0+).
	pub max_deleted_entry_id: Option<String>,
	/// Entries ever added (7.0+).
	pub entries_added: Option<i64>,
	/// First id recorded (7.0+).
	pub recorded_first_entry_id: Option<String>,
	/// First entry, when the stream is not empty.
	pub first_entry: Option<StreamEntry>,
	/// Last entry, when the stream is not empty.
	pub last_entry: Option<StreamEntry>,
}

/// Shape an `XREAD`/`XREADGROUP` reply: stream key to entries.
///
/// `Null` (nothing arrived before the block timeout) yields `None`.
pub fn shape_stream_read(value: Value) -> Result<Option<BTreeMap<String, StreamResponse>>> {
	let streams = match value {
		Value::Nil => return Ok(None),
		other => record(other, "stream read")?,
	};
	let mut out = BTreeMap::new();
	for (key, entries) in streams {
		let entries = shape_entries(entries, "stream read").map_err(|err| err.located(Segment::Key(key.clone())))?;
		out.insert(key, StreamResponse { entries });
	}
	Ok(Some(out))
}

/// Shape an `XRANGE`/`XREVRANGE` reply; `Null` is an empty range.
pub fn shape_stream_range(value: Value, reverse: bool) -> Result<Vec<StreamEntry>> {
	if value.is_nil() {
		return Ok(Vec::new());
	}
	let mut entries = shape_entries(value, "stream range")?;
	sort_entries(&mut entries);
	if reverse {
		entries.reverse();
	}
	Ok(entries)
}

/// Shape an `XCLAIM` reply.
pub fn shape_stream_claim(value: Value) -> Result<Vec<StreamEntry>> {
	shape_entries(value, "stream claim")
}

/// Shape an `XCLAIM ... JUSTID` reply.
pub fn shape_stream_claim_just_id(value: Value) -> Result<Vec<String>> {
	ids(value, "stream claim")
}

/// Shape an `XAUTOCLAIM` reply: `[next, claimed, deleted?]`.
pub fn shape_auto_claim(value: Value) -> Result<AutoClaim> {
	let (next_entry, claimed, deleted) = auto_claim_parts(value, "auto claim")?;
	Ok(AutoClaim {
		next_entry,
		claimed: shape_entries(claimed, "auto claim")?,
		deleted,
	})
}

/// Shape an `XAUTOCLAIM ... JUSTID` reply.
pub fn shape_auto_claim_just_id(value: Value) -> Result<AutoClaimJustId> {
	let (next_entry, claimed, deleted) = auto_claim_parts(value, "auto claim")?;
	Ok(AutoClaimJustId {
		next_entry,
		claimed: ids(claimed, "auto claim")?,
		deleted,
	})
}

/// Shape an `XINFO STREAM` summary reply.
pub fn shape_stream_info(value: Value) -> Result<StreamInfo> {
	const CONTEXT: &str = "stream info";
	let mut map = record(value, CONTEXT)?;
	let entry = |map: &mut BTreeMap<String, Value>, key: &str| -> Result<Option<StreamEntry>> {
		match map.remove(key) {
			None | Some(Value::Nil) => Ok(None),
			Some(raw) => {
				let [id, fields] = tuple::<2>(raw, CONTEXT).map_err(|err| err.located(Segment::Key(key.to_owned())))?;
				Ok(Some(StreamEntry {
					id: element(id, 0).map_err(|err| err.located(Segment::Key(key.to_owned())))?,
					fields: shape_fields(fields).map_err(|err| err.located(Segment::Index(1)).located(Segment::Key(key.to_owned())))?,
				}))
			}
		}
	};
	let first_entry = entry(&mut map, "first-entry")?;
	let last_entry = entry(&mut map, "last-entry")?;
	Ok(StreamInfo {
		length: field(&mut map, CONTEXT, "length")?,
		radix_tree_keys: field(&mut map, CONTEXT, "radix-tree-keys")?,
		radix_tree_nodes: field(&mut map, CONTEXT, "radix-tree-nodes")?,
		groups: field(&mut map, CONTEXT, "groups")?,
		last_generated_id: field(&mut map, CONTEXT, "last-generated-id")?,
		max_deleted_entry_id: optional_field(&mut map, "max-deleted-entry-id")?,
		entries_added: optional_field(&mut map, "entries-added")?,
		recorded_first_entry_id: optional_field(&mut map, "recorded-first-entry-id")?,
		first_entry,
		last_entry,
	})
}

fn auto_claim_parts(value: Value, context: &'static str) -> Result<(String, Value, Option<Vec<String>>)> {
	let items = array(value, context)?;
	if !(2..=3).contains(&items.len()) {
		return Err(DecodeError::shape(context, format!("expected 2 or 3 elements, got {}", items.len())));
	}
	let mut items = items.into_iter();
	let next = items.next().unwrap_or_default();
	let claimed = items.next().unwrap_or_default();
	let deleted = match items.next() {
		Some(raw) => Some(ids(raw, context).map_err(|err| err.located(Segment::Index(2)))?),
		None => None,
	};
	Ok((element(next, 0)?, claimed, deleted))
}

fn ids(value: Value, context: &'static str) -> Result<Vec<String>> {
	array(value, context)?.into_iter().enumerate().map(|(idx, id)| element(id, idx)).collect()
}

/// Entries as either a `Map` id to fields (ordered by id) or an `Array` of `[id, fields]`.
pub(crate) fn shape_entries(value: Value, context: &'static str) -> Result<Vec<StreamEntry>> {
	match value {
		Value::Map(map) => {
			let mut entries = Vec::with_capacity(map.len());
			for (id, fields) in map {
				let fields = shape_fields(fields).map_err(|err| err.located(Segment::Key(id.clone())))?;
				entries.push(StreamEntry { id, fields });
			}
			sort_entries(&mut entries);
			Ok(entries)
		}
		Value::Array(items) => {
			let mut entries = Vec::with_capacity(items.len());
			for (idx, item) in items.into_iter().enumerate() {
				let [id, fields] = tuple::<2>(item, context).map_err(|err| err.located(Segment::Index(idx)))?;
				entries.push(StreamEntry {
					id: element(id, 0).map_err(|err| err.located(Segment::Index(idx)))?,
					fields: shape_fields(fields).map_err(|err| err.located(Segment::Index(1)).located(Segment::Index(idx)))?,
				});
			}
			Ok(entries)
		}
		other => Err(DecodeError::shape(context, format!("expected Map or Array of entries, got {}", other.kind()))),
	}
}

/// Field list as `[[f, v], ...]`, flat `[f, v, ...]`, or a `Map`; `Null` is empty.
fn shape_fields(value: Value) -> Result<Vec<(String, String)>> {
	const CONTEXT: &str = "stream entry";
	match value {
		Value::Nil => Ok(Vec::new()),
		Value::Map(map) => map
			.into_iter()
			.map(|(name, raw)| -> Result<(String, String)> { Ok((name.clone(), narrow_at(raw, Segment::Key(name))?)) })
			.collect(),
		Value::Array(items) if items.iter().all(|item| matches!(item, Value::Array(_))) => items
			.into_iter()
			.enumerate()
			.map(|(idx, pair)| -> Result<(String, String)> {
				let [name, raw] = tuple::<2>(pair, CONTEXT).map_err(|err| err.located(Segment::Index(idx)))?;
				let name = element(name, 0).map_err(|err| err.located(Segment::Index(idx)))?;
				Ok((name, element(raw, 1).map_err(|err| err.located(Segment::Index(idx)))?))
			})
			.collect(),
		Value::Array(items) => {
			if items.len() % 2 != 0 {
				return Err(DecodeError::shape(CONTEXT, format!("odd field list length {}", items.len())));
			}
			let mut out = Vec::with_capacity(items.len() / 2);
			let mut items = items.into_iter().enumerate();
			while let (Some((ni, name)), Some((vi, raw))) = (items.next(), items.next()) {
				out.push((element(name, ni)?, element(raw, vi)?));
			}
			Ok(out)
		}
		other => Err(DecodeError::shape(CONTEXT, format!("expected field list, got {}", other.kind()))),
	}
}

fn sort_entries(entries: &mut [StreamEntry]) {
	entries.sort_by(|a, b| compare_ids(&a.id, &b.id));
}

/// Numeric `<ms>-<seq>` order; ids that do not parse sort after those that do.
pub(crate) fn compare_ids(a: &str, b: &str) -> Ordering {
	match (parse_id(a), parse_id(b)) {
		(Some(x), Some(y)) => x.cmp(&y),
		(Some(_), None) => Ordering::Less,
		(None, Some(_)) => Ordering::Greater,
		(None, None) => a.cmp(b),
	}
}

fn parse_id(id: &str) -> Option<(u64, u64)> {
	let (ms, seq) = id.split_once('-').unwrap_or((id, "0"));
	Some((ms.parse().ok()?, seq.parse().ok()?))
}
