use serde::Serialize;

use crate::response::convert::narrow_at;
use crate::response::shape::{array, field, record, tuple};
use crate::response::{DecodeError, Narrow, Result, Segment, Value};

/// Which `LCS` form was sent; the reply layout depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LcsRequest {
	/// Plain `LCS k1 k2`: the common subsequence text.
	Subsequence,
	/// `LCS k1 k2 LEN`: its length.
	Length,
	/// `LCS k1 k2 IDX ...`: matched ranges.
	Matches,
}

/// Inclusive byte range inside one key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LcsRange {
	/// First matched offset.
	pub start: i64,
	/// Last matched offset.
	pub end: i64,
}

/// One matched block shared by both keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LcsMatchedPosition {
	/// Range in the first key.
	pub key1: LcsRange,
	/// Range in the second key.
	pub key2: LcsRange,
	/// Match length, present with `WITHMATCHLEN`.
	pub match_len: Option<i64>,
}

/// `LCS ... IDX` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LcsMatches {
	/// Matched blocks, as ordered by the server.
	pub matches: Vec<LcsMatchedPosition>,
	/// Total subsequence length.
	pub len: i64,
}

/// Result of any `LCS` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LcsResult {
	/// Common subsequence text.
	Subsequence(String),
	/// Common subsequence length.
	Length(i64),
	/// Matched ranges.
	Matches(LcsMatches),
}

/// Shape an `LCS` reply according to the form that was requested.
pub fn shape_lcs(value: Value, request: LcsRequest) -> Result<LcsResult> {
	const CONTEXT: &str = "lcs";
	match request {
		LcsRequest::Subsequence => Ok(LcsResult::Subsequence(String::narrow(value)?)),
		LcsRequest::Length => Ok(LcsResult::Length(i64::narrow(value)?)),
		LcsRequest::Matches => {
			let mut map = record(value, CONTEXT)?;
			let len = field(&mut map, CONTEXT, "len")?;
			let raw = map.remove("matches").ok_or_else(|| DecodeError::shape(CONTEXT, "missing field \"matches\""))?;
			let matches = array(raw, CONTEXT)?
				.into_iter()
				.enumerate()
				.map(|(idx, item)| {
					matched_position(item)
						.map_err(|err| err.located(Segment::Index(idx)))
						.map_err(|err| err.located(Segment::Key("matches".to_owned())))
				})
				.collect::<Result<Vec<_>>>()?;
			Ok(LcsResult::Matches(LcsMatches { matches, len }))
		}
	}
}

fn matched_position(item: Value) -> Result<LcsMatchedPosition> {
	const CONTEXT: &str = "lcs match";
	let parts = array(item, CONTEXT)?;
	if !(2..=3).contains(&parts.len()) {
		return Err(DecodeError::shape(CONTEXT, format!("expected 2 or 3 elements, got {}", parts.len())));
	}
	let mut parts = parts.into_iter();
	let key1 = range(parts.next().unwrap_or_default()).map_err(|err| err.located(Segment::Index(0)))?;
	let key2 = range(parts.next().unwrap_or_default()).map_err(|err| err.located(Segment::Index(1)))?;
	let match_len = parts.next().map(|len| narrow_at(len, Segment::Index(2))).transpose()?;
	Ok(LcsMatchedPosition { key1, key2, match_len })
}

fn range(value: Value) -> Result<LcsRange> {
	let [start, end] = tuple::<2>(value, "lcs range")?;
	Ok(LcsRange {
		start: narrow_at(start, Segment::Index(0))?,
		end: narrow_at(end, Segment::Index(1))?,
	})
}

#[cfg(test)]
mod tests;
