mod cluster;
mod convert;
mod decoder;
mod error;
mod ffi;
mod function;
mod geo;
mod group;
mod lcs;
mod parse;
mod pending;
mod release;
mod scored;
mod shape;
mod stream;
mod stream_full;
mod value;

/// Single- versus multi-node reply wrapper.
pub use cluster::{ClusterValue, shape_cluster};
/// Generic converters and their convenience constructors.
pub use convert::{Converter, Direct, KeepNil, MappingConverter, Narrow, SequenceConverter, array_of, array_of_arrays, array_of_nil_or, map_of, map_of_arrays, map_of_maps};
/// Decoding entry points, options, and tracing target.
pub use decoder::{DECODE_TARGET, DecodeOptions, Decoder};
/// Error and result aliases.
pub use error::{DecodeError, ErrorCategory, Position, ProtocolError, Result, Segment};
/// Native response layout.
pub use ffi::{CommandError, CommandResponse, FreeCommandResponseFn, RequestErrorType, ResponseType};
/// Function library and stats records.
pub use function::{
	EngineStats, FunctionInfo, FunctionStats, LibraryInfo, RunningScript, shape_function_list, shape_function_list_multi_node, shape_function_stats,
};
/// Geospatial search records.
pub use geo::{GeospatialData, Location, shape_locations};
/// Stream consumer and group records.
pub use group::{ConsumerInfo, GroupInfo, shape_consumer_info, shape_group_info};
/// Longest-common-subsequence records.
pub use lcs::{LcsMatchedPosition, LcsMatches, LcsRange, LcsRequest, LcsResult, shape_lcs};
/// Native tree parsing and type checks.
pub use parse::{check_response_type, check_value_type, parse_response};
/// Pending entry list records.
pub use pending::{ConsumerPendingCount, PendingDetail, PendingSummary, shape_pending_detail, shape_pending_summary};
/// Exactly-once release of native trees.
pub use release::{Completion, Release, ResponseGuard};
/// Sorted-set, scan, and list-pop records.
pub use scored::{
	KeyValues, KeyWithMemberAndScore, KeyWithMembersAndScores, MemberAndScore, RankAndScore, ScanResult, shape_key_values, shape_key_with_member_and_score,
	shape_key_with_members_and_scores, shape_member_and_score_pairs, shape_members_and_scores, shape_rank_and_score, shape_scan,
};
/// Stream entry records.
pub use stream::{
	AutoClaim, AutoClaimJustId, StreamEntry, StreamInfo, StreamResponse, shape_auto_claim, shape_auto_claim_just_id, shape_stream_claim,
	shape_stream_claim_just_id, shape_stream_info, shape_stream_range, shape_stream_read,
};
/// `XINFO STREAM ... FULL` records.
pub use stream_full::{StreamConsumerFull, StreamConsumerPendingEntry, StreamGroupFull, StreamInfoFull, StreamPendingEntry, shape_stream_info_full};
/// Owned response tree.
pub use value::Value;
