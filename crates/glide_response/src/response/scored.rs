use std::cmp::Ordering;

use serde::Serialize;

use crate::response::convert::narrow_at;
use crate::response::shape::{array, element, record, tuple};
use crate::response::{DecodeError, Result, Segment, Value};

/// Sorted-set member with its score.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemberAndScore {
	/// Member name.
	pub member: String,
	/// Member score.
	pub score: f64,
}

/// `BZPOPMIN`/`BZPOPMAX` reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeyWithMemberAndScore {
	/// Key the member was popped from.
	pub key: String,
	/// Popped member.
	pub member: String,
	/// Its score.
	pub score: f64,
}

/// `ZMPOP`/`BZMPOP` reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeyWithMembersAndScores {
	/// Key the members were popped from.
	pub key: String,
	/// Popped members, ordered by score.
	pub members: Vec<MemberAndScore>,
}

/// `ZRANK ... WITHSCORE` reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RankAndScore {
	/// Zero-based rank.
	pub rank: i64,
	/// Member score.
	pub score: f64,
}

/// One `SCAN`-family page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanResult {
	/// Cursor for the next call; `"0"` when iteration is complete.
	pub cursor: String,
	/// Items returned in this page.
	pub data: Vec<String>,
}

impl ScanResult {
	/// True when the server signalled the end of the iteration.
	pub fn is_finished(&self) -> bool {
		self.cursor == "0"
	}
}

/// `LMPOP`/`BLMPOP` reply entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeyValues {
	/// Key the values were popped from.
	pub key: String,
	/// Popped values.
	pub values: Vec<String>,
}

/// Shape a member-to-score `Map` ordered by score, then member; `reverse` flips both.
pub fn shape_members_and_scores(value: Value, reverse: bool) -> Result<Vec<MemberAndScore>> {
	let mut members = record(value, "members and scores")?
		.into_iter()
		.map(|(member, score)| -> Result<MemberAndScore> {
			let score = narrow_at(score, Segment::Key(member.clone()))?;
			Ok(MemberAndScore { member, score })
		})
		.collect::<Result<Vec<_>>>()?;
	members.sort_by(by_score);
	if reverse {
		members.reverse();
	}
	Ok(members)
}

/// Shape an `Array` of `[member, score]` pairs, keeping wire order.
pub fn shape_member_and_score_pairs(value: Value) -> Result<Vec<MemberAndScore>> {
	array(value, "member and score pairs")?
		.into_iter()
		.enumerate()
		.map(|(idx, pair)| -> Result<MemberAndScore> {
			let at = |err: DecodeError| err.located(Segment::Index(idx));
			let [member, score] = tuple::<2>(pair, "member and score pair").map_err(at)?;
			Ok(MemberAndScore {
				member: element(member, 0).map_err(at)?,
				score: element(score, 1).map_err(at)?,
			})
		})
		.collect()
}

/// Shape `[key, member, score]`; `Null` means the call timed out.
pub fn shape_key_with_member_and_score(value: Value) -> Result<Option<KeyWithMemberAndScore>> {
	if value.is_nil() {
		return Ok(None);
	}
	let [key, member, score] = tuple::<3>(value, "key with member and score")?;
	Ok(Some(KeyWithMemberAndScore {
		key: element(key, 0)?,
		member: element(member, 1)?,
		score: element(score, 2)?,
	}))
}

/// Shape `[key, {member: score}]`; `Null` means nothing was popped.
pub fn shape_key_with_members_and_scores(value: Value) -> Result<Option<KeyWithMembersAndScores>> {
	if value.is_nil() {
		return Ok(None);
	}
	let [key, members] = tuple::<2>(value, "key with members and scores")?;
	Ok(Some(KeyWithMembersAndScores {
		key: element(key, 0)?,
		members: shape_members_and_scores(members, false).map_err(|err| err.located(Segment::Index(1)))?,
	}))
}

/// Shape `[rank, score]`; `Null` means the member does not exist.
pub fn shape_rank_and_score(value: Value) -> Result<Option<RankAndScore>> {
	if value.is_nil() {
		return Ok(None);
	}
	let [rank, score] = tuple::<2>(value, "rank and score")?;
	Ok(Some(RankAndScore {
		rank: element(rank, 0)?,
		score: element(score, 1)?,
	}))
}

/// Shape `[cursor, [items]]`.
pub fn shape_scan(value: Value) -> Result<ScanResult> {
	let [cursor, items] = tuple::<2>(value, "scan")?;
	let data = array(items, "scan")?
		.into_iter()
		.enumerate()
		.map(|(idx, item)| element(item, idx).map_err(|err| err.located(Segment::Index(1))))
		.collect::<Result<Vec<String>>>()?;
	Ok(ScanResult {
		cursor: element(cursor, 0)?,
		data,
	})
}

/// Shape a key-to-values `Map`; `Null` means nothing was popped.
pub fn shape_key_values(value: Value) -> Result<Option<Vec<KeyValues>>> {
	if value.is_nil() {
		return Ok(None);
	}
	let mut out = Vec::new();
	for (key, values) in record(value, "key values")? {
		let values = array(values, "key values")
			.map_err(|err| err.located(Segment::Key(key.clone())))?
			.into_iter()
			.enumerate()
			.map(|(idx, item)| element(item, idx).map_err(|err| err.located(Segment::Key(key.clone()))))
			.collect::<Result<Vec<String>>>()?;
		out.push(KeyValues { key, values });
	}
	Ok(Some(out))
}

fn by_score(a: &MemberAndScore, b: &MemberAndScore) -> Ordering {
	a.score.total_cmp(&b.score).then_with(|| a.member.cmp(&b.member))
}

#[cfg(test)]
mod tests;
