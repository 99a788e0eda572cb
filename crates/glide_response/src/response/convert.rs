use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::marker::PhantomData;

use crate::response::{DecodeError, Result, Segment, Value};

/// Direct narrowing of one [`Value`] into a concrete Rust type.
pub trait Narrow: Sized + Default {
	/// Symbolic name of the accepted wire type.
	const EXPECTED: &'static str;

	/// Narrow `value`, or fail with [`DecodeError::TypeMismatch`].
	fn narrow(value: Value) -> Result<Self>;
}

fn mismatch<T>(expected: &'static str, value: &Value) -> Result<T> {
	Err(DecodeError::TypeMismatch {
		expected,
		actual: value.kind(),
	})
}

impl Narrow for Value {
	const EXPECTED: &'static str = "any";

	fn narrow(value: Value) -> Result<Self> {
		Ok(value)
	}
}

impl Narrow for i64 {
	const EXPECTED: &'static str = "Int";

	fn narrow(value: Value) -> Result<Self> {
		match value {
			Value::Int(v) => Ok(v),
			other => mismatch(Self::EXPECTED, &other),
		}
	}
}

impl Narrow for f64 {
	const EXPECTED: &'static str = "Float";

	fn narrow(value: Value) -> Result<Self> {
		match value {
			Value::Float(v) => Ok(v),
			other => mismatch(Self::EXPECTED, &other),
		}
	}
}

impl Narrow for bool {
	const EXPECTED: &'static str = "Bool";

	fn narrow(value: Value) -> Result<Self> {
		match value {
			Value::Bool(v) => Ok(v),
			other => mismatch(Self::EXPECTED, &other),
		}
	}
}

impl Narrow for String {
	const EXPECTED: &'static str = "String";

	fn narrow(value: Value) -> Result<Self> {
		match value {
			Value::String(bytes) => String::from_utf8(bytes).map_err(|_| DecodeError::TypeMismatch {
				expected: "UTF-8 String",
				actual: "String",
			}),
			Value::Okay => Ok("OK".to_owned()),
			other => mismatch(Self::EXPECTED, &other),
		}
	}
}

impl Narrow for Vec<u8> {
	const EXPECTED: &'static str = "String";

	fn narrow(value: Value) -> Result<Self> {
		match value {
			Value::String(bytes) => Ok(bytes),
			other => mismatch(Self::EXPECTED, &other),
		}
	}
}

impl Narrow for Vec<Value> {
	const EXPECTED: &'static str = "Array";

	fn narrow(value: Value) -> Result<Self> {
		match value {
			Value::Array(items) => Ok(items),
			other => mismatch(Self::EXPECTED, &other),
		}
	}
}

impl Narrow for BTreeMap<String, Value> {
	const EXPECTED: &'static str = "Map";

	fn narrow(value: Value) -> Result<Self> {
		match value {
			Value::Map(map) => Ok(map),
			other => mismatch(Self::EXPECTED, &other),
		}
	}
}

impl Narrow for BTreeSet<String> {
	const EXPECTED: &'static str = "Sets";

	fn narrow(value: Value) -> Result<Self> {
		match value {
			Value::Set(members) => members.into_iter().map(|m| String::narrow(Value::String(m))).collect(),
			other => mismatch(Self::EXPECTED, &other),
		}
	}
}

impl<T: Narrow> Narrow for Option<T> {
	const EXPECTED: &'static str = T::EXPECTED;

	fn narrow(value: Value) -> Result<Self> {
		match value {
			Value::Nil => Ok(None),
			other => T::narrow(other).map(Some),
		}
	}
}

/// Narrow a nested element, reporting failures at `segment`.
pub(crate) fn narrow_at<T: Narrow>(value: Value, segment: Segment) -> Result<T> {
	T::narrow(value).map_err(|err| err.located(segment))
}

/// Recursive conversion of a [`Value`] into a typed container.
///
/// `Ok(None)` means the input was an accepted absence.
pub trait Converter {
	/// Produced type.
	type Output: Default;

	/// Convert `value`.
	fn convert(&self, value: Value) -> Result<Option<Self::Output>>;
}

impl<C: Converter + ?Sized> Converter for &C {
	type Output = C::Output;

	fn convert(&self, value: Value) -> Result<Option<Self::Output>> {
		(**self).convert(value)
	}
}

/// Leaf converter: narrows with [`Narrow`].
pub struct Direct<T>(PhantomData<fn() -> T>);

impl<T> Direct<T> {
	/// New leaf converter.
	pub const fn new() -> Self {
		Self(PhantomData)
	}
}

impl<T> Default for Direct<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> Clone for Direct<T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> Copy for Direct<T> {}

impl<T> fmt::Debug for Direct<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Direct<{}>", std::any::type_name::<T>())
	}
}

impl<T: Narrow> Converter for Direct<T> {
	type Output = T;

	fn convert(&self, value: Value) -> Result<Option<T>> {
		T::narrow(value).map(Some)
	}
}

/// Converts an `Array` elementwise through `next`.
///
/// An element for which `next` reports absence becomes the output's default
/// value, so positions stay aligned with the wire array.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceConverter<C> {
	/// Element converter.
	pub next: C,
	/// Accept `Null` input as absence.
	pub can_be_nil: bool,
}

impl<C: Converter> Converter for SequenceConverter<C> {
	type Output = Vec<C::Output>;

	fn convert(&self, value: Value) -> Result<Option<Self::Output>> {
		let items = match value {
			Value::Array(items) => items,
			Value::Nil if self.can_be_nil => return Ok(None),
			Value::Nil => return Err(DecodeError::UnexpectedNil { expected: "Array" }),
			other => return mismatch("Array", &other),
		};
		let mut out = Vec::with_capacity(items.len());
		for (idx, item) in items.into_iter().enumerate() {
			let converted = self.next.convert(item).map_err(|err| err.located(Segment::Index(idx)))?;
			out.push(converted.unwrap_or_default());
		}
		Ok(Some(out))
	}
}

/// Converts a `Map` valuewise through `next`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingConverter<C> {
	/// Value converter.
	pub next: C,
	/// Accept `Null` input as absence.
	pub can_be_nil: bool,
}

impl<C: Converter> Converter for MappingConverter<C> {
	type Output = BTreeMap<String, C::Output>;

	fn convert(&self, value: Value) -> Result<Option<Self::Output>> {
		let map = match value {
			Value::Map(map) => map,
			Value::Nil if self.can_be_nil => return Ok(None),
			Value::Nil => return Err(DecodeError::UnexpectedNil { expected: "Map" }),
			other => return mismatch("Map", &other),
		};
		let mut out = BTreeMap::new();
		for (key, item) in map {
			let converted = self.next.convert(item).map_err(|err| err.located(Segment::Key(key.clone())))?;
			out.insert(key, converted.unwrap_or_default());
		}
		Ok(Some(out))
	}
}

/// Keeps the absence reported by `.0` as an explicit `None` instead of a default.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepNil<C>(pub C);

impl<C: Converter> Converter for KeepNil<C> {
	type Output = Option<C::Output>;

	fn convert(&self, value: Value) -> Result<Option<Self::Output>> {
		self.0.convert(value).map(Some)
	}
}

/// Run `converter` where absence is not acceptable.
pub(crate) fn convert_required<C: Converter>(converter: &C, value: Value, expected: &'static str) -> Result<C::Output> {
	converter.convert(value)?.ok_or(DecodeError::UnexpectedNil { expected })
}

/// `Array` of `T`.
pub fn array_of<T: Narrow>(can_be_nil: bool) -> SequenceConverter<Direct<T>> {
	SequenceConverter {
		next: Direct::new(),
		can_be_nil,
	}
}

/// `Array` whose elements are `T` or `Null`.
pub fn array_of_nil_or<T: Narrow>(can_be_nil: bool) -> SequenceConverter<Direct<Option<T>>> {
	array_of::<Option<T>>(can_be_nil)
}

/// `Map` of `T`.
pub fn map_of<T: Narrow>(can_be_nil: bool) -> MappingConverter<Direct<T>> {
	MappingConverter {
		next: Direct::new(),
		can_be_nil,
	}
}

/// `Array` of `Array` of `T`; inner arrays may be `Null` when `inner_nil` is set.
pub fn array_of_arrays<T: Narrow>(inner_nil: bool) -> SequenceConverter<SequenceConverter<Direct<T>>> {
	SequenceConverter {
		next: array_of::<T>(inner_nil),
		can_be_nil: false,
	}
}

/// `Map` of `Array` of `T`.
pub fn map_of_arrays<T: Narrow>() -> MappingConverter<SequenceConverter<Direct<T>>> {
	MappingConverter {
		next: array_of::<T>(false),
		can_be_nil: false,
	}
}

/// `Map` of `Map` of `T`.
pub fn map_of_maps<T: Narrow>() -> MappingConverter<MappingConverter<Direct<T>>> {
	MappingConverter {
		next: map_of::<T>(false),
		can_be_nil: false,
	}
}

#[cfg(test)]
mod tests;
