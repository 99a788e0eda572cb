use std::cell::Cell;
use std::ptr::{self, NonNull};

use super::ResponseGuard;
use crate::response::{CommandResponse, DecodeError, DecodeOptions, Release, ResponseType, Value};

#[derive(Default)]
struct CountingRelease {
	calls: Cell<usize>,
}

impl Release for CountingRelease {
	unsafe fn release(&self, _response: NonNull<CommandResponse>) {
		self.calls.set(self.calls.get() + 1);
	}
}

#[test]
fn peek_type_reads_the_discriminant_without_releasing() {
	let releaser = CountingRelease::default();
	let mut node = CommandResponse {
		int_value: 9,
		..CommandResponse::empty(ResponseType::Int)
	};
	// SAFETY: `node` outlives the guard and the releaser never frees it.
	let guard = unsafe { ResponseGuard::new(&mut node, &releaser) };

	assert_eq!(guard.peek_type().expect("known type"), ResponseType::Int);
	assert_eq!(guard.peek_type().expect("known type"), ResponseType::Int);
	assert_eq!(releaser.calls.get(), 0);

	assert_eq!(guard.into_value(&DecodeOptions::default()).expect("parses"), Value::Int(9));
	assert_eq!(releaser.calls.get(), 1);
}

#[test]
fn peek_type_of_null_pointer_is_null() {
	let releaser = CountingRelease::default();
	// SAFETY: a null pointer is never released.
	let guard = unsafe { ResponseGuard::new(ptr::null_mut(), &releaser) };
	assert_eq!(guard.peek_type().expect("null"), ResponseType::Null);
	drop(guard);
	assert_eq!(releaser.calls.get(), 0);
}

#[test]
fn peek_type_reports_unknown_discriminant() {
	let releaser = CountingRelease::default();
	let mut node = CommandResponse {
		response_type: 99,
		..CommandResponse::default()
	};
	// SAFETY: `node` outlives the guard and the releaser never frees it.
	let guard = unsafe { ResponseGuard::new(&mut node, &releaser) };
	assert!(matches!(guard.peek_type(), Err(DecodeError::UnknownResponseType { raw: 99 })));
	drop(guard);
	assert_eq!(releaser.calls.get(), 1);
}
