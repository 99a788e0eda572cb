use serde::Serialize;

use crate::response::shape::{Record, array, element, field, optional_field, record, tuple};
use crate::response::stream::shape_entries;
use crate::response::{DecodeError, Result, Segment, StreamEntry, Value};

/// Pending entry of a group, as listed by `XINFO STREAM ... FULL`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamPendingEntry {
	/// Entry id.
	pub id: String,
	/// Consumer owning the entry.
	pub consumer: String,
	/// Unix time in milliseconds of the last delivery.
	pub delivery_time: i64,
	/// Times the entry was delivered.
	pub delivery_count: i64,
}

/// Pending entry of a single consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamConsumerPendingEntry {
	/// Entry id.
	pub id: String,
	/// Unix time in milliseconds of the last delivery.
	pub delivery_time: i64,
	/// Times the entry was delivered.
	pub delivery_count: i64,
}

/// Consumer section of a full group record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamConsumerFull {
	/// Consumer name.
	pub name: String,
	/// Unix time in milliseconds of the last interaction.
	pub seen_time: i64,
	/// Unix time in milliseconds of the last successful read (7.2+).
	pub active_time: Option<i64>,
	/// Pending entries owned by this consumer.
	pub pel_count: i64,
	/// Pending entries, up to the requested count.
	pub pending: Vec<StreamConsumerPendingEntry>,
}

/// Consumer group section of `XINFO STREAM ... FULL`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamGroupFull {
	/// Group name.
	pub name: String,
	/// Last id delivered to the group.
	pub last_delivered_id: String,
	/// Logical read counter (7.0+).
	pub entries_read: Option<i64>,
	/// Entries not yet delivered (7.0+); `None` when the server cannot tell.
	pub lag: Option<i64>,
	/// Pending entries of the group.
	pub pel_count: i64,
	/// Pending entries, up to the requested count.
	pub pending: Vec<StreamPendingEntry>,
	/// Consumers of the group.
	pub consumers: Vec<StreamConsumerFull>,
}

/// `XINFO STREAM key FULL` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamInfoFull {
	/// Number of entries.
	pub length: i64,
	/// Radix tree key count.
	pub radix_tree_keys: i64,
	/// Radix tree node count.
	pub radix_tree_nodes: i64,
	/// Last generated id.
	pub last_generated_id: String,
	/// Highest deleted id (7.0+).
	pub max_deleted_entry_id: Option<String>,
	/// Entries ever added (7.0+).
	pub entries_added: Option<i64>,
	/// First id recorded (7.0+).
	pub recorded_first_entry_id: Option<String>,
	/// Entries in stream order, up to the requested count.
	pub entries: Vec<StreamEntry>,
	/// Consumer groups; empty when the stream has none.
	pub groups: Vec<StreamGroupFull>,
}

/// Shape an `XINFO STREAM key FULL` reply.
pub fn shape_stream_info_full(value: Value) -> Result<StreamInfoFull> {
	const CONTEXT: &str = "stream info full";
	let mut map = record(value, CONTEXT)?;
	let entries = match map.remove("entries") {
		None | Some(Value::Nil) => Vec::new(),
		Some(raw) => shape_entries(raw, CONTEXT).map_err(|err| err.located(Segment::Key("entries".to_owned())))?,
	};
	let groups = rows(&mut map, "groups", CONTEXT, group)?;
	Ok(StreamInfoFull {
		length: field(&mut map, CONTEXT, "length")?,
		radix_tree_keys: field(&mut map, CONTEXT, "radix-tree-keys")?,
		radix_tree_nodes: field(&mut map, CONTEXT, "radix-tree-nodes")?,
		last_generated_id: field(&mut map, CONTEXT, "last-generated-id")?,
		max_deleted_entry_id: optional_field(&mut map, "max-deleted-entry-id")?,
		entries_added: optional_field(&mut map, "entries-added")?,
		recorded_first_entry_id: optional_field(&mut map, "recorded-first-entry-id")?,
		entries,
		groups,
	})
}

/// Shape each element of the array under `key`; absent or `Null` is empty.
fn rows<T>(map: &mut Record, key: &str, context: &'static str, shape: fn(Value) -> Result<T>) -> Result<Vec<T>> {
	let raw = match map.remove(key) {
		None | Some(Value::Nil) => return Ok(Vec::new()),
		Some(raw) => raw,
	};
	let at = |err: DecodeError| err.located(Segment::Key(key.to_owned()));
	array(raw, context)
		.map_err(at)?
		.into_iter()
		.enumerate()
		.map(|(idx, row)| shape(row).map_err(|err| at(err.located(Segment::Index(idx)))))
		.collect()
}

fn group(value: Value) -> Result<StreamGroupFull> {
	const CONTEXT: &str = "stream info full group";
	let mut map = record(value, CONTEXT)?;
	Ok(StreamGroupFull {
		pending: rows(&mut map, "pel", CONTEXT, group_pending)?,
		consumers: rows(&mut map, "consumers", CONTEXT, consumer)?,
		name: field(&mut map, CONTEXT, "name")?,
		last_delivered_id: field(&mut map, CONTEXT, "last-delivered-id")?,
		entries_read: optional_field(&mut map, "entries-read")?,
		lag: optional_field(&mut map, "lag")?,
		pel_count: field(&mut map, CONTEXT, "pel-count")?,
	})
}

fn consumer(value: Value) -> Result<StreamConsumerFull> {
	const CONTEXT: &str = "stream info full consumer";
	let mut map = record(value, CONTEXT)?;
	Ok(StreamConsumerFull {
		pending: rows(&mut map, "pel", CONTEXT, consumer_pending)?,
		name: field(&mut map, CONTEXT, "name")?,
		seen_time: field(&mut map, CONTEXT, "seen-time")?,
		active_time: optional_field(&mut map, "active-time")?,
		pel_count: field(&mut map, CONTEXT, "pel-count")?,
	})
}

fn group_pending(value: Value) -> Result<StreamPendingEntry> {
	let [id, consumer, delivery_time, delivery_count] = tuple::<4>(value, "stream info full pending entry")?;
	Ok(StreamPendingEntry {
		id: element(id, 0)?,
		consumer: element(consumer, 1)?,
		delivery_time: element(delivery_time, 2)?,
		delivery_count: element(delivery_count, 3)?,
	})
}

fn consumer_pending(value: Value) -> Result<StreamConsumerPendingEntry> {
	let [id, delivery_time, delivery_count] = tuple::<3>(value, "stream info full consumer pending entry")?;
	Ok(StreamConsumerPendingEntry {
		id: element(id, 0)?,
		delivery_time: element(delivery_time, 1)?,
		delivery_count: element(delivery_count, 2)?,
	})
}
