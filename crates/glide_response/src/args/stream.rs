use std::fmt;
use std::time::Duration;

use crate::args::{ArgError, Result};

/// Range bound for `XRANGE`, `XREVRANGE`, and `XPENDING`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StreamBoundary {
	/// Bound including the given id.
	Inclusive(String),
	/// Bound excluding the given id (6.2+).
	Exclusive(String),
	/// Smallest possible id, `-`.
	Min,
	/// Greatest possible id, `+`.
	Max,
}

impl StreamBoundary {
	/// Wire form of this bound.
	pub fn to_arg(&self) -> String {
		self.to_string()
	}
}

impl fmt::Display for StreamBoundary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Inclusive(id) => f.write_str(id),
			Self::Exclusive(id) => write!(f, "({id}"),
			Self::Min => f.write_str("-"),
			Self::Max => f.write_str("+"),
		}
	}
}

/// Trimming strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrimMethod {
	/// `MAXLEN threshold`.
	MaxLen(u64),
	/// `MINID threshold`.
	MinId(String),
}

/// Options for `XTRIM` and the trim part of `XADD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XTrimOptions {
	/// Strategy and threshold.
	pub method: TrimMethod,
	/// `Some(true)` sends `=`, `Some(false)` sends `~`, `None` sends neither.
	pub exact: Option<bool>,
	/// Maximum entries evicted per call; approximate trimming only.
	pub limit: Option<u64>,
}

impl XTrimOptions {
	/// Trim to at most `threshold` entries.
	pub fn max_len(threshold: u64) -> Self {
		Self {
			method: TrimMethod::MaxLen(threshold),
			exact: None,
			limit: None,
		}
	}

	/// Evict entries with ids below `threshold`.
	pub fn min_id(threshold: impl Into<String>) -> Self {
		Self {
			method: TrimMethod::MinId(threshold.into()),
			exact: None,
			limit: None,
		}
	}

	/// Optional arguments in wire order.
	pub fn to_args(&self) -> Result<Vec<String>> {
		let mut args = Vec::new();
		match &self.method {
			TrimMethod::MaxLen(_) => args.push("MAXLEN".to_owned()),
			TrimMethod::MinId(_) => args.push("MINID".to_owned()),
		}
		match self.exact {
			Some(true) => args.push("=".to_owned()),
			Some(false) => args.push("~".to_owned()),
			None => {}
		}
		match &self.method {
			TrimMethod::MaxLen(n) => args.push(n.to_string()),
			TrimMethod::MinId(id) => args.push(id.clone()),
		}
		if let Some(limit) = self.limit {
			if self.exact != Some(false) {
				return Err(ArgError::LimitRequiresApproximate);
			}
			args.extend(["LIMIT".to_owned(), limit.to_string()]);
		}
		Ok(args)
	}
}

/// Options for `XADD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XAddOptions {
	/// Explicit entry id; `*` is sent when unset.
	pub id: Option<String>,
	/// Create the stream if missing; `false` sends `NOMKSTREAM`.
	pub make_stream: bool,
	/// Trim applied in the same call.
	pub trim: Option<XTrimOptions>,
}

impl Default for XAddOptions {
	fn default() -> Self {
		Self {
			id: None,
			make_stream: true,
			trim: None,
		}
	}
}

impl XAddOptions {
	/// Optional arguments in wire order, ending with the id.
	pub fn to_args(&self) -> Result<Vec<String>> {
		let mut args = Vec::new();
		if !self.make_stream {
			args.push("NOMKSTREAM".to_owned());
		}
		if let Some(trim) = &self.trim {
			args.extend(trim.to_args()?);
		}
		match self.id.as_deref() {
			Some("") => return Err(ArgError::EmptyStreamId),
			Some(id) => args.push(id.to_owned()),
			None => args.push("*".to_owned()),
		}
		Ok(args)
	}
}

/// Full `XADD` argument list after the command name.
pub fn build_xadd_args<K: AsRef<str>, V: AsRef<str>>(key: &str, values: &[(K, V)], opts: &XAddOptions) -> Result<Vec<String>> {
	if values.is_empty() {
		return Err(ArgError::EmptyFields { command: "XADD" });
	}
	let mut args = vec![key.to_owned()];
	args.extend(opts.to_args()?);
	for (field, value) in values {
		args.push(field.as_ref().to_owned());
		args.push(value.as_ref().to_owned());
	}
	Ok(args)
}

/// Options for `XREAD`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct XReadOptions {
	/// `COUNT n`.
	pub count: Option<u64>,
	/// `BLOCK ms`; zero blocks indefinitely.
	pub block: Option<Duration>,
}

impl XReadOptions {
	/// Optional arguments in wire order.
	pub fn to_args(&self) -> Vec<String> {
		let mut args = Vec::new();
		push_count(&mut args, self.count);
		if let Some(block) = self.block {
			args.extend(["BLOCK".to_owned(), block.as_millis().to_string()]);
		}
		args
	}
}

/// Options for `XREADGROUP`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct XReadGroupOptions {
	/// `COUNT n`.
	pub count: Option<u64>,
	/// `BLOCK ms`; zero blocks indefinitely.
	pub block: Option<Duration>,
	/// `NOACK`.
	pub no_ack: bool,
}

impl XReadGroupOptions {
	/// Optional arguments in wire order.
	pub fn to_args(&self) -> Vec<String> {
		let mut args = XReadOptions {
			count: self.count,
			block: self.block,
		}
		.to_args();
		if self.no_ack {
			args.push("NOACK".to_owned());
		}
		args
	}
}

/// Extended form of `XPENDING`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XPendingOptions {
	/// `IDLE ms` filter.
	pub min_idle_ms: Option<u64>,
	/// Lower id bound.
	pub start: StreamBoundary,
	/// Upper id bound.
	pub end: StreamBoundary,
	/// Maximum rows.
	pub count: u64,
	/// Restrict to one consumer.
	pub consumer: Option<String>,
}

impl XPendingOptions {
	/// Rows between `start` and `end`, at most `count`.
	pub fn new(start: StreamBoundary, end: StreamBoundary, count: u64) -> Self {
		Self {
			min_idle_ms: None,
			start,
			end,
			count,
			consumer: None,
		}
	}

	/// Arguments following the group name.
	pub fn to_args(&self) -> Vec<String> {
		let mut args = Vec::new();
		if let Some(idle) = self.min_idle_ms.filter(|idle| *idle > 0) {
			args.extend(["IDLE".to_owned(), idle.to_string()]);
		}
		args.push(self.start.to_arg());
		args.push(self.end.to_arg());
		args.push(self.count.to_string());
		if let Some(consumer) = &self.consumer {
			args.push(consumer.clone());
		}
		args
	}
}

/// Options for `XGROUP CREATE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct XGroupCreateOptions {
	/// `MKSTREAM`.
	pub make_stream: bool,
	/// `ENTRIESREAD n` (7.0+).
	pub entries_read: Option<i64>,
}

impl XGroupCreateOptions {
	/// Optional arguments in wire order.
	pub fn to_args(&self) -> Vec<String> {
		let mut args = Vec::new();
		if self.make_stream {
			args.push("MKSTREAM".to_owned());
		}
		push_entries_read(&mut args, self.entries_read);
		args
	}
}

/// Options for `XGROUP SETID`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct XGroupSetIdOptions {
	/// `ENTRIESREAD n` (7.0+).
	pub entries_read: Option<i64>,
}

impl XGroupSetIdOptions {
	/// Optional arguments in wire order.
	pub fn to_args(&self) -> Vec<String> {
		let mut args = Vec::new();
		push_entries_read(&mut args, self.entries_read);
		args
	}
}

/// Options for `XCLAIM`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct XClaimOptions {
	/// `IDLE ms`.
	pub idle_ms: Option<u64>,
	/// `TIME unix-ms`.
	pub idle_unix_ms: Option<u64>,
	/// `RETRYCOUNT n`.
	pub retry_count: Option<u64>,
	/// `FORCE`.
	pub force: bool,
}

impl XClaimOptions {
	/// Optional arguments in wire order.
	pub fn to_args(&self) -> Vec<String> {
		let mut args = Vec::new();
		for (keyword, value) in [("IDLE", self.idle_ms), ("TIME", self.idle_unix_ms), ("RETRYCOUNT", self.retry_count)] {
			if let Some(value) = value.filter(|v| *v > 0) {
				args.extend([keyword.to_owned(), value.to_string()]);
			}
		}
		if self.force {
			args.push("FORCE".to_owned());
		}
		args
	}
}

/// Options for `XAUTOCLAIM`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct XAutoClaimOptions {
	/// `COUNT n`.
	pub count: Option<u64>,
}

impl XAutoClaimOptions {
	/// Optional arguments in wire order.
	pub fn to_args(&self) -> Vec<String> {
		let mut args = Vec::new();
		push_count(&mut args, self.count);
		args
	}
}

/// Options for `XINFO STREAM key FULL`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct XInfoStreamOptions {
	/// `COUNT n` entries per section.
	pub count: Option<u64>,
}

impl XInfoStreamOptions {
	/// `FULL` followed by optional arguments.
	pub fn to_args(&self) -> Vec<String> {
		let mut args = vec!["FULL".to_owned()];
		push_count(&mut args, self.count);
		args
	}
}

/// Options for `XRANGE`/`XREVRANGE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct XRangeOptions {
	/// `COUNT n`.
	pub count: Option<u64>,
}

impl XRangeOptions {
	/// Optional arguments in wire order.
	pub fn to_args(&self) -> Vec<String> {
		let mut args = Vec::new();
		push_count(&mut args, self.count);
		args
	}
}

fn push_count(args: &mut Vec<String>, count: Option<u64>) {
	if let Some(count) = count {
		args.extend(["COUNT".to_owned(), count.to_string()]);
	}
}

fn push_entries_read(args: &mut Vec<String>, entries_read: Option<i64>) {
	if let Some(n) = entries_read.filter(|n| *n > -1) {
		args.extend(["ENTRIESREAD".to_owned(), n.to_string()]);
	}
}

#[cfg(test)]
mod tests;
