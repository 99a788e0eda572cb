use std::fmt;

use thiserror::Error;

use crate::response::ffi::RequestErrorType;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Failure reported by the server or by the native client on behalf of a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ProtocolError {
	/// Classification supplied by the native client.
	pub kind: RequestErrorType,
	/// Message text, copied out of native memory.
	pub message: String,
}

impl ProtocolError {
	/// Build a protocol error from its parts.
	pub fn new(kind: RequestErrorType, message: impl Into<String>) -> Self {
		Self { kind, message: message.into() }
	}
}

/// One step of a location inside a nested response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
	/// Array element index.
	Index(usize),
	/// Map entry key.
	Key(String),
}

/// Path from the top-level value to the element that failed to convert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Position(Vec<Segment>);

impl Position {
	/// Position consisting of one segment.
	pub fn at(segment: Segment) -> Self {
		Self(vec![segment])
	}

	/// Segments ordered from outermost to innermost.
	pub fn segments(&self) -> &[Segment] {
		&self.0
	}

	fn prepend(&mut self, segment: Segment) {
		self.0.insert(0, segment);
	}
}

impl fmt::Display for Position {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.0.is_empty() {
			return f.write_str("<root>");
		}
		for segment in &self.0 {
			match segment {
				Segment::Index(idx) => write!(f, "[{idx}]")?,
				Segment::Key(key) => write!(f, "[{key:?}]")?,
			}
		}
		Ok(())
	}
}

/// Coarse grouping of decode failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
	/// Discriminant did not match what the caller asked for.
	TypeMismatch,
	/// A nested element could not be narrowed.
	Conversion,
	/// The response violated the layout or arity a record requires.
	Shape,
	/// The server or native client reported a failure.
	Protocol,
}

/// Errors produced while decoding native responses into typed values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
	/// Top-level discriminant differs from the expected one.
	#[error("unexpected return type from Valkey: got {actual}, expected {expected}")]
	TypeMismatch {
		/// Symbolic name of the expected type.
		expected: &'static str,
		/// Symbolic name of the received type.
		actual: &'static str,
	},
	/// Nested element had the wrong type.
	#[error("unexpected element type at {position}: got {found}, expected {expected}")]
	Conversion {
		/// Location of the offending element.
		position: Position,
		/// Symbolic name of the received type.
		found: &'static str,
		/// Symbolic name of the expected type.
		expected: &'static str,
	},
	/// Null arrived where the caller did not allow absence.
	#[error("unexpected nil response, expected {expected}")]
	UnexpectedNil {
		/// Symbolic name of the expected type.
		expected: &'static str,
	},
	/// Record arity or required fields did not match.
	#[error("unexpected {context} response shape at {position}: {detail}")]
	Shape {
		/// Record being assembled.
		context: &'static str,
		/// Location of the malformed record below the top-level value.
		position: Position,
		/// Human-readable description of the mismatch.
		detail: String,
	},
	/// Decimal text could not be parsed as an integer.
	#[error("{context}: {text:?} is not a valid integer")]
	NotAnInteger {
		/// Field being parsed.
		context: &'static str,
		/// Offending text.
		text: String,
	},
	/// Failure reported by the server or the native client.
	#[error(transparent)]
	Protocol(#[from] ProtocolError),
	/// Map key was not UTF-8 text.
	#[error("map key is not text (got {actual})")]
	MapKeyNotText {
		/// Symbolic name of the key's type.
		actual: &'static str,
	},
	/// Required pointer was null while its length said otherwise.
	#[error("null {field} pointer with length {len}")]
	NullPayload {
		/// Native field holding the pointer.
		field: &'static str,
		/// Declared length.
		len: i64,
	},
	/// Native length field was negative.
	#[error("negative {field} length {len}")]
	NegativeLength {
		/// Native length field.
		field: &'static str,
		/// Parsed signed length.
		len: i64,
	},
	/// Discriminant outside the known set.
	#[error("unknown response type discriminant {raw}")]
	UnknownResponseType {
		/// Raw discriminant value.
		raw: u32,
	},
	/// Nesting exceeded the configured limit.
	#[error("response depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Collection length exceeded the configured limit.
	#[error("response collection too large: len={len}, max={max}")]
	CollectionTooLarge {
		/// Declared element count.
		len: usize,
		/// Maximum permitted element count.
		max: usize,
	},
	/// Cluster accessor used on the other variant.
	#[error("cluster value holds a {actual} result, not a {expected} result")]
	WrongClusterVariant {
		/// Variant the caller asked for.
		expected: &'static str,
		/// Variant actually held.
		actual: &'static str,
	},
}

impl DecodeError {
	/// Coarse category of this failure.
	pub fn category(&self) -> ErrorCategory {
		match self {
			Self::TypeMismatch { .. } | Self::UnexpectedNil { .. } | Self::WrongClusterVariant { .. } => ErrorCategory::TypeMismatch,
			Self::Conversion { .. } | Self::NotAnInteger { .. } | Self::MapKeyNotText { .. } => ErrorCategory::Conversion,
			Self::Protocol(_) => ErrorCategory::Protocol,
			Self::Shape { .. }
			| Self::NullPayload { .. }
			| Self::NegativeLength { .. }
			| Self::UnknownResponseType { .. }
			| Self::DepthExceeded { .. }
			| Self::CollectionTooLarge { .. } => ErrorCategory::Shape,
		}
	}

	pub(crate) fn shape(context: &'static str, detail: impl Into<String>) -> Self {
		Self::Shape {
			context,
			position: Position::default(),
			detail: detail.into(),
		}
	}

	/// Attach one outer location step to an error raised by a nested element.
	pub(crate) fn located(self, segment: Segment) -> Self {
		match self {
			Self::Conversion {
				mut position,
				found,
				expected,
			} => {
				position.prepend(segment);
				Self::Conversion { position, found, expected }
			}
			Self::TypeMismatch { expected, actual } => Self::Conversion {
				position: Position::at(segment),
				found: actual,
				expected,
			},
			Self::UnexpectedNil { expected } => Self::Conversion {
				position: Position::at(segment),
				found: "Null",
				expected,
			},
			Self::Shape {
				context,
				mut position,
				detail,
			} => {
				position.prepend(segment);
				Self::Shape { context, position, detail }
			}
			other => other,
		}
	}
}
