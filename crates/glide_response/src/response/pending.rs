use serde::Serialize;

use crate::response::shape::{array, decimal, element, tuple};
use crate::response::{DecodeError, Result, Segment, Value};

/// Pending-message count for one consumer in an `XPENDING` summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsumerPendingCount {
	/// Consumer name.
	pub consumer: String,
	/// Messages pending for this consumer.
	pub count: i64,
}

/// `XPENDING key group` summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PendingSummary {
	/// Total pending messages.
	pub count: i64,
	/// Smallest pending id.
	pub start_id: Option<String>,
	/// Greatest pending id.
	pub end_id: Option<String>,
	/// Per-consumer counts; empty when nothing is pending.
	pub consumers: Vec<ConsumerPendingCount>,
}

/// One row of `XPENDING key group start end count`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PendingDetail {
	/// Message id.
	pub id: String,
	/// Owning consumer.
	pub consumer: String,
	/// Milliseconds since last delivery.
	pub idle_ms: i64,
	/// Times the message was delivered.
	pub delivery_count: i64,
}

/// Shape `[count, start|nil, end|nil, [[consumer, "n"], ...]|nil]`.
pub fn shape_pending_summary(value: Value) -> Result<PendingSummary> {
	const CONTEXT: &str = "pending summary";
	if value.is_nil() {
		return Ok(PendingSummary::default());
	}
	let [count, start_id, end_id, consumers] = tuple::<4>(value, CONTEXT)?;
	let consumers = match consumers {
		Value::Nil => Vec::new(),
		raw => array(raw, CONTEXT)?
			.into_iter()
			.enumerate()
			.map(|(idx, pair)| consumer_count(pair).map_err(|err| err.located(Segment::Index(idx)).located(Segment::Index(3))))
			.collect::<Result<Vec<_>>>()?,
	};
	Ok(PendingSummary {
		count: element(count, 0)?,
		start_id: element(start_id, 1)?,
		end_id: element(end_id, 2)?,
		consumers,
	})
}

fn consumer_count(pair: Value) -> Result<ConsumerPendingCount> {
	const CONTEXT: &str = "pending summary consumer";
	let [consumer, count] = tuple::<2>(pair, CONTEXT)?;
	let count = match count {
		Value::Int(n) => n,
		raw => decimal(element(raw, 1)?, CONTEXT)?,
	};
	Ok(ConsumerPendingCount {
		consumer: element(consumer, 0)?,
		count,
	})
}

/// Shape `[[id, consumer, idle, deliveries], ...]`; `Null` is an empty list.
pub fn shape_pending_detail(value: Value) -> Result<Vec<PendingDetail>> {
	const CONTEXT: &str = "pending detail";
	if value.is_nil() {
		return Ok(Vec::new());
	}
	array(value, CONTEXT)?
		.into_iter()
		.enumerate()
		.map(|(idx, row)| -> Result<PendingDetail> {
			let at = |err: DecodeError| err.located(Segment::Index(idx));
			let [id, consumer, idle, deliveries] = tuple::<4>(row, CONTEXT).map_err(at)?;
			Ok(PendingDetail {
				id: element(id, 0).map_err(at)?,
				consumer: element(consumer, 1).map_err(at)?,
				idle_ms: element(idle, 2).map_err(at)?,
				delivery_count: element(deliveries, 3).map_err(at)?,
			})
		})
		.collect()
}

#[cfg(test)]
mod tests;
