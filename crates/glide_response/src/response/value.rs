use std::collections::{BTreeMap, BTreeSet};

use crate::response::ResponseType;

/// Owned response tree, independent of native memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
	/// Absent value.
	#[default]
	Nil,
	/// Signed integer.
	Int(i64),
	/// Double.
	Float(f64),
	/// Boolean.
	Bool(bool),
	/// Raw bytes, exactly as sent.
	String(Vec<u8>),
	/// Ordered sequence.
	Array(Vec<Value>),
	/// Text-keyed mapping.
	Map(BTreeMap<String, Value>),
	/// Unique byte-string members.
	Set(BTreeSet<Vec<u8>>),
	/// `OK` status.
	Okay,
	/// Server error text nested inside a larger reply.
	Error(String),
}

impl Value {
	/// Wire type this value was decoded from.
	pub fn response_type(&self) -> ResponseType {
		match self {
			Self::Nil => ResponseType::Null,
			Self::Int(_) => ResponseType::Int,
			Self::Float(_) => ResponseType::Float,
			Self::Bool(_) => ResponseType::Bool,
			Self::String(_) => ResponseType::String,
			Self::Array(_) => ResponseType::Array,
			Self::Map(_) => ResponseType::Map,
			Self::Set(_) => ResponseType::Sets,
			Self::Okay => ResponseType::Ok,
			Self::Error(_) => ResponseType::Error,
		}
	}

	/// Symbolic name of the wire type.
	pub fn kind(&self) -> &'static str {
		self.response_type().name()
	}

	/// True for [`Value::Nil`].
	pub fn is_nil(&self) -> bool {
		matches!(self, Self::Nil)
	}

	/// Text view of a string payload, when it is valid UTF-8.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(bytes) => std::str::from_utf8(bytes).ok(),
			Self::Okay => Some("OK"),
			_ => None,
		}
	}
}

impl From<&str> for Value {
	fn from(text: &str) -> Self {
		Self::String(text.as_bytes().to_vec())
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

impl From<Vec<Value>> for Value {
	fn from(items: Vec<Value>) -> Self {
		Self::Array(items)
	}
}
