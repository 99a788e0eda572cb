mod error;
mod hash;
mod stream;

/// Argument validation errors.
pub use error::{ArgError, Result};
/// Hash field expiration options and builders.
pub use hash::{
	ExpireCondition, FieldConditional, GetExpiry, HExpireOptions, HGetExOptions, HSetExOptions, SetExpiry, build_hexpire_args, build_hfield_args,
	build_hgetex_args, build_hsetex_args,
};
/// Stream command options and builders.
pub use stream::{
	StreamBoundary, TrimMethod, XAddOptions, XAutoClaimOptions, XClaimOptions, XGroupCreateOptions, XGroupSetIdOptions, XInfoStreamOptions, XPendingOptions,
	XRangeOptions, XReadGroupOptions, XReadOptions, XTrimOptions, build_xadd_args,
};
