use thiserror::Error;

/// Crate-local result type for argument builders.
pub type Result<T> = std::result::Result<T, ArgError>;

/// Errors produced while building command arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
	/// Command requires at least one field.
	#[error("{command} requires at least one field")]
	EmptyFields {
		/// Command being built.
		command: &'static str,
	},
	/// `LIMIT` was combined with exact trimming.
	#[error("trim LIMIT requires approximate trimming (~)")]
	LimitRequiresApproximate,
	/// An explicit stream id was empty.
	#[error("stream id must not be empty")]
	EmptyStreamId,
}
