use std::ffi::{CStr, c_char, c_long};
use std::fmt;
use std::ptr;

use serde::Serialize;

use crate::response::{DecodeError, ProtocolError, Result};

/// Discriminant carried by every native response node.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResponseType {
	/// Absent value.
	Null = 0,
	/// Signed 64-bit integer in `int_value`.
	Int = 1,
	/// Double in `float_value`.
	Float = 2,
	/// Boolean in `bool_value`.
	Bool = 3,
	/// Length-delimited bytes in `string_value`.
	String = 4,
	/// Ordered children in `array_value`.
	Array = 5,
	/// Key/value pair nodes in `array_value`.
	Map = 6,
	/// Unordered unique members in `sets_value`.
	Sets = 7,
	/// Simple `OK` status.
	Ok = 8,
	/// Server error text in `string_value`.
	Error = 9,
}

impl ResponseType {
	/// Every known discriminant in numeric order.
	pub const ALL: [ResponseType; 10] = [
		Self::Null,
		Self::Int,
		Self::Float,
		Self::Bool,
		Self::String,
		Self::Array,
		Self::Map,
		Self::Sets,
		Self::Ok,
		Self::Error,
	];

	/// Map a raw discriminant to a known type.
	pub fn from_raw(raw: u32) -> Result<Self> {
		Self::ALL.get(raw as usize).copied().ok_or(DecodeError::UnknownResponseType { raw })
	}

	/// Raw discriminant value.
	pub const fn raw(self) -> u32 {
		self as u32
	}

	/// Symbolic name used in error messages.
	pub const fn name(self) -> &'static str {
		match self {
			Self::Null => "Null",
			Self::Int => "Int",
			Self::Float => "Float",
			Self::Bool => "Bool",
			Self::String => "String",
			Self::Array => "Array",
			Self::Map => "Map",
			Self::Sets => "Sets",
			Self::Ok => "Ok",
			Self::Error => "Error",
		}
	}
}

impl fmt::Display for ResponseType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Native response node, laid out exactly as the client core allocates it.
///
/// `response_type` is kept as the raw discriminant so that a value written by
/// a newer core never materializes an invalid enum. A `Map` node stores pair
/// nodes in `array_value`; each pair carries `map_key` and `map_value`.
#[repr(C)]
#[derive(Debug)]
pub struct CommandResponse {
	/// Raw [`ResponseType`] discriminant.
	pub response_type: u32,
	/// Integer payload.
	pub int_value: i64,
	/// Float payload.
	pub float_value: f64,
	/// Boolean payload.
	pub bool_value: bool,
	/// String or error bytes, not NUL-terminated.
	pub string_value: *mut c_char,
	/// Byte length of `string_value`.
	pub string_value_len: c_long,
	/// Array children or map pair nodes.
	pub array_value: *mut CommandResponse,
	/// Element count of `array_value`.
	pub array_value_len: c_long,
	/// Key node of a map pair.
	pub map_key: *mut CommandResponse,
	/// Value node of a map pair.
	pub map_value: *mut CommandResponse,
	/// Set members.
	pub sets_value: *mut CommandResponse,
	/// Element count of `sets_value`.
	pub sets_value_len: c_long,
}

impl CommandResponse {
	/// Node of the given type with every payload field zeroed.
	pub const fn empty(kind: ResponseType) -> Self {
		Self {
			response_type: kind.raw(),
			int_value: 0,
			float_value: 0.0,
			bool_value: false,
			string_value: ptr::null_mut(),
			string_value_len: 0,
			array_value: ptr::null_mut(),
			array_value_len: 0,
			map_key: ptr::null_mut(),
			map_value: ptr::null_mut(),
			sets_value: ptr::null_mut(),
			sets_value_len: 0,
		}
	}

	/// Decoded discriminant.
	pub fn kind(&self) -> Result<ResponseType> {
		ResponseType::from_raw(self.response_type)
	}
}

impl Default for CommandResponse {
	fn default() -> Self {
		Self::empty(ResponseType::Null)
	}
}

/// Native release entry point: frees a top-level response tree.
pub type FreeCommandResponseFn = unsafe extern "C" fn(*mut CommandResponse);

/// Classification of a failed request.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum RequestErrorType {
	/// No finer classification.
	#[default]
	Unspecified = 0,
	/// Transaction aborted.
	ExecAbort = 1,
	/// Request timed out.
	Timeout = 2,
	/// Connection lost.
	Disconnect = 3,
}

impl RequestErrorType {
	/// Map a raw classification; unknown values fall back to [`RequestErrorType::Unspecified`].
	pub fn from_raw(raw: u32) -> Self {
		match raw {
			1 => Self::ExecAbort,
			2 => Self::Timeout,
			3 => Self::Disconnect,
			_ => Self::Unspecified,
		}
	}
}

impl fmt::Display for RequestErrorType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Unspecified => "request error",
			Self::ExecAbort => "transaction aborted",
			Self::Timeout => "request timed out",
			Self::Disconnect => "connection lost",
		})
	}
}

/// Native failure record handed to the failure callback.
#[repr(C)]
#[derive(Debug)]
pub struct CommandError {
	/// NUL-terminated message, or null.
	pub command_error_message: *const c_char,
	/// Raw [`RequestErrorType`] value.
	pub command_error_type: u32,
}

impl CommandError {
	/// Copy the failure into an owned [`ProtocolError`].
	///
	/// # Safety
	///
	/// `command_error_message` must be null or point to a NUL-terminated string
	/// that stays valid for the duration of the call.
	pub unsafe fn to_protocol_error(&self) -> ProtocolError {
		let message = if self.command_error_message.is_null() {
			String::new()
		} else {
			// SAFETY: non-null and NUL-terminated per the caller contract.
			unsafe { CStr::from_ptr(self.command_error_message) }.to_string_lossy().into_owned()
		};
		ProtocolError::new(RequestErrorType::from_raw(self.command_error_type), message)
	}
}
