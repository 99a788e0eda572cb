use serde::Serialize;

use crate::response::convert::convert_required;
use crate::response::shape::{field, optional_field, record};
use crate::response::{Result, Segment, Value, array_of};

/// One row of `XINFO CONSUMERS`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsumerInfo {
	/// Consumer name.
	pub name: String,
	/// Pending messages owned by the consumer.
	pub pending: i64,
	/// Milliseconds since last interaction.
	pub idle: i64,
	/// Milliseconds since last successful read (7.2+).
	pub inactive: Option<i64>,
}

/// One row of `XINFO GROUPS`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupInfo {
	/// Group name.
	pub name: String,
	/// Consumer count.
	pub consumers: i64,
	/// Pending entry list length.
	pub pending: i64,
	/// Last id delivered to the group.
	pub last_delivered_id: String,
	/// Logical read counter (7.0+).
	pub entries_read: Option<i64>,
	/// Entries not yet delivered (7.0+); `None` when the server cannot tell.
	pub lag: Option<i64>,
}

/// Shape an `XINFO CONSUMERS` reply.
pub fn shape_consumer_info(value: Value) -> Result<Vec<ConsumerInfo>> {
	rows(value)?
		.into_iter()
		.enumerate()
		.map(|(idx, row)| consumer_row(row).map_err(|err| err.located(Segment::Index(idx))))
		.collect()
}

/// Shape an `XINFO GROUPS` reply.
pub fn shape_group_info(value: Value) -> Result<Vec<GroupInfo>> {
	rows(value)?
		.into_iter()
		.enumerate()
		.map(|(idx, row)| group_row(row).map_err(|err| err.located(Segment::Index(idx))))
		.collect()
}

fn consumer_row(row: Value) -> Result<ConsumerInfo> {
	const CONTEXT: &str = "consumer info";
	let mut row = record(row, CONTEXT)?;
	Ok(ConsumerInfo {
		name: field(&mut row, CONTEXT, "name")?,
		pending: field(&mut row, CONTEXT, "pending")?,
		idle: field(&mut row, CONTEXT, "idle")?,
		inactive: optional_field(&mut row, "inactive")?,
	})
}

fn group_row(row: Value) -> Result<GroupInfo> {
	const CONTEXT: &str = "group info";
	let mut row = record(row, CONTEXT)?;
	Ok(GroupInfo {
		name: field(&mut row, CONTEXT, "name")?,
		consumers: field(&mut row, CONTEXT, "consumers")?,
		pending: field(&mut row, CONTEXT, "pending")?,
		last_delivered_id: field(&mut row, CONTEXT, "last-delivered-id")?,
		entries_read: optional_field(&mut row, "entries-read")?,
		lag: optional_field(&mut row, "lag")?,
	})
}

fn rows(value: Value) -> Result<Vec<Value>> {
	convert_required(&array_of::<Value>(false), value, "Array")
}
