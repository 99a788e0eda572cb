use std::ptr::NonNull;
use std::sync::Arc;

use tracing::trace;

use crate::response::{CommandError, CommandResponse, DECODE_TARGET, DecodeOptions, ProtocolError, ResponseType, Result, Value, parse_response};

/// Hands a top-level response tree back to the allocator that produced it.
pub trait Release {
	/// Release `response` and everything reachable from it.
	///
	/// # Safety
	///
	/// `response` must be a live tree from the matching allocator that has not
	/// been released yet.
	unsafe fn release(&self, response: NonNull<CommandResponse>);
}

impl Release for unsafe extern "C" fn(*mut CommandResponse) {
	unsafe fn release(&self, response: NonNull<CommandResponse>) {
		// SAFETY: forwarded caller contract.
		unsafe { (*self)(response.as_ptr()) }
	}
}

impl<R: Release + ?Sized> Release for &R {
	unsafe fn release(&self, response: NonNull<CommandResponse>) {
		// SAFETY: forwarded caller contract.
		unsafe { (**self).release(response) }
	}
}

impl<R: Release + ?Sized> Release for Arc<R> {
	unsafe fn release(&self, response: NonNull<CommandResponse>) {
		// SAFETY: forwarded caller contract.
		unsafe { (**self).release(response) }
	}
}

/// Sole owner of one native response; releases it exactly once on drop.
///
/// A null pointer is accepted and reads as `Null` without any release call.
#[derive(Debug)]
pub struct ResponseGuard<R: Release> {
	ptr: Option<NonNull<CommandResponse>>,
	releaser: R,
}

impl<R: Release> ResponseGuard<R> {
	/// Take ownership of a response delivered by the native client.
	///
	/// # Safety
	///
	/// `ptr` must be null or a live, unreleased tree that `releaser` can free,
	/// laid out as [`parse_response`] requires. Nothing else may release it.
	pub unsafe fn new(ptr: *mut CommandResponse, releaser: R) -> Self {
		Self {
			ptr: NonNull::new(ptr),
			releaser,
		}
	}

	/// True when the native client delivered no response node at all.
	pub fn is_null(&self) -> bool {
		self.ptr.is_none()
	}

	/// Borrow the top-level node without copying anything.
	pub fn node(&self) -> Option<&CommandResponse> {
		// SAFETY: the pointer stays live until this guard drops.
		self.ptr.map(|ptr| unsafe { ptr.as_ref() })
	}

	/// Discriminant of the top-level node, read without copying; `Null` for a null pointer.
	pub fn peek_type(&self) -> Result<ResponseType> {
		self.node().map_or(Ok(ResponseType::Null), CommandResponse::kind)
	}

	/// Copy the tree into an owned [`Value`], then release it.
	///
	/// Release happens before this returns, on success and on failure.
	pub fn into_value(self, opt: &DecodeOptions) -> Result<Value> {
		let parsed = match self.node() {
			None => Ok(Value::Nil),
			// SAFETY: layout and liveness are the contract of `new`.
			Some(node) => unsafe { parse_response(node, opt) },
		};
		drop(self);
		parsed
	}
}

impl<R: Release> Drop for ResponseGuard<R> {
	fn drop(&mut self) {
		if let Some(ptr) = self.ptr.take() {
			trace!(target: DECODE_TARGET, ptr = ?ptr, "releasing native response");
			// SAFETY: `new` transferred sole ownership and `take` clears it, so this runs once.
			unsafe { self.releaser.release(ptr) };
		}
	}
}

/// Outcome of one request as delivered by the native callbacks.
#[derive(Debug)]
pub enum Completion<R: Release> {
	/// Success callback fired with a response tree.
	Success(ResponseGuard<R>),
	/// Failure callback fired.
	Failure(ProtocolError),
}

impl<R: Release> Completion<R> {
	/// Wrap the pointer delivered to the success callback.
	///
	/// # Safety
	///
	/// Same contract as [`ResponseGuard::new`].
	pub unsafe fn success(ptr: *mut CommandResponse, releaser: R) -> Self {
		// SAFETY: forwarded caller contract.
		Self::Success(unsafe { ResponseGuard::new(ptr, releaser) })
	}

	/// Copy the record delivered to the failure callback.
	///
	/// # Safety
	///
	/// `error` must point to a valid [`CommandError`] whose message satisfies
	/// [`CommandError::to_protocol_error`].
	pub unsafe fn failure_from_raw(error: NonNull<CommandError>) -> Self {
		// SAFETY: forwarded caller contract.
		let error = unsafe { error.as_ref().to_protocol_error() };
		Self::Failure(error)
	}

	/// Turn the completion into a response guard or the reported failure.
	pub fn into_result(self) -> std::result::Result<ResponseGuard<R>, ProtocolError> {
		match self {
			Self::Success(guard) => Ok(guard),
			Self::Failure(err) => Err(err),
		}
	}
}

#[cfg(test)]
mod tests;
