use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::response::convert::convert_required;
use crate::response::{
	AutoClaim, AutoClaimJustId, ClusterValue, Completion, ConsumerInfo, Converter, DecodeError, Direct, FunctionStats, GroupInfo, KeepNil, KeyValues,
	KeyWithMemberAndScore, KeyWithMembersAndScores, LcsRequest, LcsResult, LibraryInfo, Location, MappingConverter, MemberAndScore, Narrow, PendingDetail,
	PendingSummary, ProtocolError, RankAndScore, Release, RequestErrorType, ResponseGuard, ResponseType, Result, ScanResult, SequenceConverter, StreamEntry,
	StreamInfo, StreamInfoFull, StreamResponse, Value, array_of, array_of_arrays, array_of_nil_or, check_value_type, map_of, map_of_arrays, map_of_maps,
	shape_auto_claim, shape_auto_claim_just_id, shape_cluster, shape_consumer_info, shape_function_list, shape_function_list_multi_node, shape_function_stats,
	shape_group_info, shape_key_values, shape_key_with_member_and_score, shape_key_with_members_and_scores, shape_lcs, shape_locations,
	shape_member_and_score_pairs, shape_members_and_scores, shape_pending_detail, shape_pending_summary, shape_rank_and_score, shape_scan, shape_stream_claim,
	shape_stream_claim_just_id, shape_stream_info, shape_stream_info_full, shape_stream_range, shape_stream_read,
};

/// Tracing target for every event emitted while decoding.
pub const DECODE_TARGET: &str = "glide_response::decode";

/// Limits applied while copying native trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
	/// Maximum nesting depth below the top-level node.
	pub max_depth: u32,
	/// Maximum element count of a single array, map, or set.
	pub max_collection_len: usize,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			max_depth: 128,
			max_collection_len: 1 << 24,
		}
	}
}

/// Stateless decoding entry points, one per reply shape.
///
/// Every method consumes the guard, so the native tree is released exactly
/// once whatever the outcome. A top-level `Error` node surfaces as
/// [`DecodeError::Protocol`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
	/// Limits passed to the parser.
	pub options: DecodeOptions,
}

impl Decoder {
	/// Decoder using `options`.
	pub fn new(options: DecodeOptions) -> Self {
		Self { options }
	}

	/// Thread a completion through `decode`, passing failures along unchanged.
	pub fn complete<R: Release, T>(&self, completion: Completion<R>, decode: impl FnOnce(&Self, ResponseGuard<R>) -> Result<T>) -> Result<T> {
		match completion {
			Completion::Success(guard) => decode(self, guard),
			Completion::Failure(err) => {
				debug!(target: DECODE_TARGET, kind = ?err.kind, message = %err.message, "request failed");
				Err(err.into())
			}
		}
	}

	/// Owned copy of the whole reply.
	pub fn any<R: Release>(&self, response: ResponseGuard<R>) -> Result<Value> {
		match response.into_value(&self.options)? {
			Value::Error(message) => {
				debug!(target: DECODE_TARGET, message = %message, "server returned an error reply");
				Err(ProtocolError::new(RequestErrorType::Unspecified, message).into())
			}
			value => Ok(value),
		}
	}

	fn expect<R: Release>(&self, response: ResponseGuard<R>, expected: ResponseType, nilable: bool) -> Result<Option<Value>> {
		let value = self.any(response)?;
		Ok(check_value_type(&value, expected, nilable)?.then_some(value))
	}

	fn require<R: Release>(&self, response: ResponseGuard<R>, expected: ResponseType) -> Result<Value> {
		self.expect(response, expected, false)?.ok_or(DecodeError::UnexpectedNil { expected: expected.name() })
	}

	fn scalar<R: Release, T: Narrow>(&self, response: ResponseGuard<R>, expected: ResponseType) -> Result<T> {
		T::narrow(self.require(response, expected)?)
	}

	fn scalar_or_nil<R: Release, T: Narrow>(&self, response: ResponseGuard<R>, expected: ResponseType) -> Result<Option<T>> {
		self.expect(response, expected, true)?.map(T::narrow).transpose()
	}

	fn converted<R: Release, C: Converter>(&self, response: ResponseGuard<R>, expected: ResponseType, converter: C) -> Result<C::Output> {
		convert_required(&converter, self.require(response, expected)?, expected.name())
	}

	fn converted_or_nil<R: Release, C: Converter>(&self, response: ResponseGuard<R>, expected: ResponseType, converter: C) -> Result<Option<C::Output>> {
		match self.expect(response, expected, true)? {
			Some(value) => converter.convert(value),
			None => Ok(None),
		}
	}

	// ---- scalars ----

	/// `OK` status, returned as `"OK"`.
	pub fn okay<R: Release>(&self, response: ResponseGuard<R>) -> Result<String> {
		self.scalar(response, ResponseType::Ok)
	}

	/// Text reply.
	pub fn string<R: Release>(&self, response: ResponseGuard<R>) -> Result<String> {
		self.scalar(response, ResponseType::String)
	}

	/// Text reply or `Null`.
	pub fn string_or_nil<R: Release>(&self, response: ResponseGuard<R>) -> Result<Option<String>> {
		self.scalar_or_nil(response, ResponseType::String)
	}

	/// `OK` status or a text reply.
	pub fn ok_or_string<R: Release>(&self, response: ResponseGuard<R>) -> Result<String> {
		self.ok_or_string_or_nil(response)?.ok_or(DecodeError::UnexpectedNil { expected: "String" })
	}

	/// `OK` status, a text reply, or `Null`.
	pub fn ok_or_string_or_nil<R: Release>(&self, response: ResponseGuard<R>) -> Result<Option<String>> {
		match self.any(response)? {
			Value::Okay => Ok(Some("OK".to_owned())),
			value => {
				if !check_value_type(&value, ResponseType::String, true)? {
					return Ok(None);
				}
				String::narrow(value).map(Some)
			}
		}
	}

	/// Raw byte reply.
	pub fn bytes<R: Release>(&self, response: ResponseGuard<R>) -> Result<Vec<u8>> {
		self.scalar(response, ResponseType::String)
	}

	/// Raw byte reply or `Null`.
	pub fn bytes_or_nil<R: Release>(&self, response: ResponseGuard<R>) -> Result<Option<Vec<u8>>> {
		self.scalar_or_nil(response, ResponseType::String)
	}

	/// Integer reply.
	pub fn int<R: Release>(&self, response: ResponseGuard<R>) -> Result<i64> {
		self.scalar(response, ResponseType::Int)
	}

	/// Integer reply or `Null`.
	pub fn int_or_nil<R: Release>(&self, response: ResponseGuard<R>) -> Result<Option<i64>> {
		self.scalar_or_nil(response, ResponseType::Int)
	}

	/// Float reply.
	pub fn float<R: Release>(&self, response: ResponseGuard<R>) -> Result<f64> {
		self.scalar(response, ResponseType::Float)
	}

	/// Float reply or `Null`.
	pub fn float_or_nil<R: Release>(&self, response: ResponseGuard<R>) -> Result<Option<f64>> {
		self.scalar_or_nil(response, ResponseType::Float)
	}

	/// Boolean reply.
	pub fn bool<R: Release>(&self, response: ResponseGuard<R>) -> Result<bool> {
		self.scalar(response, ResponseType::Bool)
	}

	// ---- collections ----

	/// Array of text.
	pub fn string_array<R: Release>(&self, response: ResponseGuard<R>) -> Result<Vec<String>> {
		self.converted(response, ResponseType::Array, array_of::<String>(false))
	}

	/// Array of text, or `Null`.
	pub fn string_array_or_nil<R: Release>(&self, response: ResponseGuard<R>) -> Result<Option<Vec<String>>> {
		self.converted_or_nil(response, ResponseType::Array, array_of::<String>(true))
	}

	/// Array whose elements are text or `Null`.
	pub fn string_or_nil_array<R: Release>(&self, response: ResponseGuard<R>) -> Result<Vec<Option<String>>> {
		self.converted(response, ResponseType::Array, array_of_nil_or::<String>(false))
	}

	/// Array of integers.
	pub fn int_array<R: Release>(&self, response: ResponseGuard<R>) -> Result<Vec<i64>> {
		self.converted(response, ResponseType::Array, array_of::<i64>(false))
	}

	/// Array whose elements are integers or `Null`.
	pub fn int_or_nil_array<R: Release>(&self, response: ResponseGuard<R>) -> Result<Vec<Option<i64>>> {
		self.converted(response, ResponseType::Array, array_of_nil_or::<i64>(false))
	}

	/// Array whose elements are floats or `Null`.
	pub fn float_or_nil_array<R: Release>(&self, response: ResponseGuard<R>) -> Result<Vec<Option<f64>>> {
		self.converted(response, ResponseType::Array, array_of_nil_or::<f64>(false))
	}

	/// Array of booleans.
	pub fn bool_array<R: Release>(&self, response: ResponseGuard<R>) -> Result<Vec<bool>> {
		self.converted(response, ResponseType::Array, array_of::<bool>(false))
	}

	/// Set of text members.
	pub fn string_set<R: Release>(&self, response: ResponseGuard<R>) -> Result<BTreeSet<String>> {
		self.converted(response, ResponseType::Sets, Direct::<BTreeSet<String>>::new())
	}

	/// Text-to-text map.
	pub fn string_map<R: Release>(&self, response: ResponseGuard<R>) -> Result<BTreeMap<String, String>> {
		self.converted(response, ResponseType::Map, map_of::<String>(false))
	}

	/// Map whose values are text or `Null`.
	pub fn string_to_string_or_nil_map<R: Release>(&self, response: ResponseGuard<R>) -> Result<BTreeMap<String, Option<String>>> {
		self.converted(response, ResponseType::Map, map_of::<Option<String>>(false))
	}

	/// Text-to-float map.
	pub fn float_map<R: Release>(&self, response: ResponseGuard<R>) -> Result<BTreeMap<String, f64>> {
		self.converted(response, ResponseType::Map, map_of::<f64>(false))
	}

	/// Text-to-integer map.
	pub fn int_map<R: Release>(&self, response: ResponseGuard<R>) -> Result<BTreeMap<String, i64>> {
		self.converted(response, ResponseType::Map, map_of::<i64>(false))
	}

	/// Map of text arrays.
	pub fn string_array_map<R: Release>(&self, response: ResponseGuard<R>) -> Result<BTreeMap<String, Vec<String>>> {
		self.converted(response, ResponseType::Map, map_of_arrays::<String>())
	}

	/// Map of text-to-text maps.
	pub fn map_of_string_maps<R: Release>(&self, response: ResponseGuard<R>) -> Result<BTreeMap<String, BTreeMap<String, String>>> {
		self.converted(response, ResponseType::Map, map_of_maps::<String>())
	}

	/// Array of text arrays.
	pub fn array_2d_string<R: Release>(&self, response: ResponseGuard<R>) -> Result<Vec<Vec<String>>> {
		self.converted(response, ResponseType::Array, array_of_arrays::<String>(false))
	}

	/// Array of float arrays; `Null` rows (e.g. unknown `GEOPOS` members) become empty.
	pub fn array_2d_float<R: Release>(&self, response: ResponseGuard<R>) -> Result<Vec<Vec<f64>>> {
		self.converted(response, ResponseType::Array, array_of_arrays::<f64>(true))
	}

	/// Array of arbitrary arrays; `Null` rows stay `None`.
	pub fn array_of_arrays_or_nil<R: Release>(&self, response: ResponseGuard<R>) -> Result<Vec<Option<Vec<Value>>>> {
		self.converted(
			response,
			ResponseType::Array,
			SequenceConverter {
				next: KeepNil(array_of::<Value>(true)),
				can_be_nil: false,
			},
		)
	}

	/// Text-keyed map of arbitrary values.
	pub fn any_map<R: Release>(&self, response: ResponseGuard<R>) -> Result<BTreeMap<String, Value>> {
		self.converted(response, ResponseType::Map, map_of::<Value>(false))
	}

	/// Array of text-keyed maps.
	pub fn array_of_maps<R: Release>(&self, response: ResponseGuard<R>) -> Result<Vec<BTreeMap<String, Value>>> {
		self.converted(
			response,
			ResponseType::Array,
			SequenceConverter {
				next: map_of::<Value>(false),
				can_be_nil: false,
			},
		)
	}

	/// Map of arrays of maps.
	/// `Null` values and `Null` array items stay `None`.
	pub fn string_to_array_of_maps_map<R: Release>(&self, response: ResponseGuard<R>) -> Result<BTreeMap<String, Option<Vec<Option<BTreeMap<String, Value>>>>>> {
		self.converted(
			response,
			ResponseType::Map,
			MappingConverter {
				next: KeepNil(array_of_nil_or::<BTreeMap<String, Value>>(true)),
				can_be_nil: false,
			},
		)
	}

	// ---- streams ----

	/// `XREAD`/`XREADGROUP`; `None` when the block timed out.
	pub fn stream_read<R: Release>(&self, response: ResponseGuard<R>) -> Result<Option<BTreeMap<String, StreamResponse>>> {
		match self.expect(response, ResponseType::Map, true)? {
			Some(value) => shape_stream_read(value),
			None => Ok(None),
		}
	}

	/// `XRANGE` (`reverse = false`) or `XREVRANGE` (`reverse = true`).
	pub fn stream_range<R: Release>(&self, response: ResponseGuard<R>, reverse: bool) -> Result<Vec<StreamEntry>> {
		match self.expect(response, ResponseType::Map, true)? {
			Some(value) => shape_stream_range(value, reverse),
			None => Ok(Vec::new()),
		}
	}

	/// `XCLAIM`.
	pub fn stream_claim<R: Release>(&self, response: ResponseGuard<R>) -> Result<Vec<StreamEntry>> {
		shape_stream_claim(self.require(response, ResponseType::Map)?)
	}

	/// `XCLAIM ... JUSTID`.
	pub fn stream_claim_just_id<R: Release>(&self, response: ResponseGuard<R>) -> Result<Vec<String>> {
		shape_stream_claim_just_id(self.require(response, ResponseType::Array)?)
	}

	/// `XAUTOCLAIM`.
	pub fn stream_auto_claim<R: Release>(&self, response: ResponseGuard<R>) -> Result<AutoClaim> {
		shape_auto_claim(self.require(response, ResponseType::Array)?)
	}

	/// `XAUTOCLAIM ... JUSTID`.
	pub fn stream_auto_claim_just_id<R: Release>(&self, response: ResponseGuard<R>) -> Result<AutoClaimJustId> {
		shape_auto_claim_just_id(self.require(response, ResponseType::Array)?)
	}

	/// `XPENDING key group`.
	pub fn pending_summary<R: Release>(&self, response: ResponseGuard<R>) -> Result<PendingSummary> {
		match self.expect(response, ResponseType::Array, true)? {
			Some(value) => shape_pending_summary(value),
			None => Ok(PendingSummary::default()),
		}
	}

	/// `XPENDING key group start end count [consumer]`.
	pub fn pending_detail<R: Release>(&self, response: ResponseGuard<R>) -> Result<Vec<PendingDetail>> {
		match self.expect(response, ResponseType::Array, true)? {
			Some(value) => shape_pending_detail(value),
			None => Ok(Vec::new()),
		}
	}

	/// `XINFO CONSUMERS`.
	pub fn consumer_info<R: Release>(&self, response: ResponseGuard<R>) -> Result<Vec<ConsumerInfo>> {
		shape_consumer_info(self.require(response, ResponseType::Array)?)
	}

	/// `XINFO GROUPS`.
	pub fn group_info<R: Release>(&self, response: ResponseGuard<R>) -> Result<Vec<GroupInfo>> {
		shape_group_info(self.require(response, ResponseType::Array)?)
	}

	/// `XINFO STREAM`.
	pub fn stream_info<R: Release>(&self, response: ResponseGuard<R>) -> Result<StreamInfo> {
		shape_stream_info(self.require(response, ResponseType::Map)?)
	}

	/// `XINFO STREAM key FULL [COUNT n]`.
	pub fn stream_info_full<R: Release>(&self, response: ResponseGuard<R>) -> Result<StreamInfoFull> {
		shape_stream_info_full(self.require(response, ResponseType::Map)?)
	}

	// ---- other domain shapes ----

	/// `LCS` in the form given by `request`.
	pub fn lcs<R: Release>(&self, response: ResponseGuard<R>, request: LcsRequest) -> Result<LcsResult> {
		shape_lcs(self.any(response)?, request)
	}

	/// Single- or multi-node reply, each payload converted with `converter`.
	pub fn cluster<R: Release, C: Converter>(&self, response: ResponseGuard<R>, converter: &C) -> Result<ClusterValue<C::Output>> {
		shape_cluster(self.any(response)?, converter)
	}

	/// Text-array reply routed to one or many nodes, e.g. `TIME`.
	pub fn cluster_strings<R: Release>(&self, response: ResponseGuard<R>) -> Result<ClusterValue<Vec<String>>> {
		self.cluster(response, &array_of::<String>(false))
	}

	/// `FUNCTION LIST`.
	pub fn function_list<R: Release>(&self, response: ResponseGuard<R>) -> Result<Vec<LibraryInfo>> {
		shape_function_list(self.require(response, ResponseType::Array)?)
	}

	/// `FUNCTION LIST` fanned out to several nodes.
	pub fn function_list_multi_node<R: Release>(&self, response: ResponseGuard<R>) -> Result<BTreeMap<String, Vec<LibraryInfo>>> {
		shape_function_list_multi_node(self.require(response, ResponseType::Map)?)
	}

	/// `FUNCTION STATS`, keyed by node address.
	pub fn function_stats<R: Release>(&self, response: ResponseGuard<R>) -> Result<BTreeMap<String, FunctionStats>> {
		shape_function_stats(self.require(response, ResponseType::Map)?)
	}

	/// Member-to-score map ordered by score (`ZRANGE ... WITHSCORES` and friends).
	pub fn members_and_scores<R: Release>(&self, response: ResponseGuard<R>, reverse: bool) -> Result<Vec<MemberAndScore>> {
		shape_members_and_scores(self.require(response, ResponseType::Map)?, reverse)
	}

	/// `[member, score]` pairs in wire order (`ZRANDMEMBER ... WITHSCORES`).
	pub fn member_and_score_pairs<R: Release>(&self, response: ResponseGuard<R>) -> Result<Vec<MemberAndScore>> {
		shape_member_and_score_pairs(self.require(response, ResponseType::Array)?)
	}

	/// `BZPOPMIN`/`BZPOPMAX`.
	pub fn key_with_member_and_score<R: Release>(&self, response: ResponseGuard<R>) -> Result<Option<KeyWithMemberAndScore>> {
		match self.expect(response, ResponseType::Array, true)? {
			Some(value) => shape_key_with_member_and_score(value),
			None => Ok(None),
		}
	}

	/// `ZMPOP`/`BZMPOP`.
	pub fn key_with_members_and_scores<R: Release>(&self, response: ResponseGuard<R>) -> Result<Option<KeyWithMembersAndScores>> {
		match self.expect(response, ResponseType::Array, true)? {
			Some(value) => shape_key_with_members_and_scores(value),
			None => Ok(None),
		}
	}

	/// `ZRANK`/`ZREVRANK ... WITHSCORE`.
	pub fn rank_and_score_or_nil<R: Release>(&self, response: ResponseGuard<R>) -> Result<Option<RankAndScore>> {
		match self.expect(response, ResponseType::Array, true)? {
			Some(value) => shape_rank_and_score(value),
			None => Ok(None),
		}
	}

	/// `GEOSEARCH`/`GEORADIUS` hits, with whichever `WITH*` extras were requested.
	pub fn locations<R: Release>(&self, response: ResponseGuard<R>) -> Result<Vec<Location>> {
		shape_locations(self.require(response, ResponseType::Array)?)
	}

	/// `SCAN`-family page.
	pub fn scan<R: Release>(&self, response: ResponseGuard<R>) -> Result<ScanResult> {
		shape_scan(self.require(response, ResponseType::Array)?)
	}

	/// `LMPOP`/`BLMPOP`.
	pub fn key_values_or_nil<R: Release>(&self, response: ResponseGuard<R>) -> Result<Option<Vec<KeyValues>>> {
		match self.expect(response, ResponseType::Map, true)? {
			Some(value) => shape_key_values(value),
			None => Ok(None),
		}
	}
}
