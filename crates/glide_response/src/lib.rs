//! Typed decoding of tagged command responses produced by the native Valkey client core.

/// Command argument builders for option-bearing stream and hash commands.
pub mod args;
/// Native response layout, value parsing, converters, and domain shapes.
pub mod response;
