use std::collections::BTreeMap;

use serde::Serialize;

use crate::response::convert::convert_required;
use crate::response::{Converter, DecodeError, MappingConverter, Result, Value};

/// Reply that came from one node or from several, keyed by node address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ClusterValue<T> {
	/// Reply from a single node.
	Single(T),
	/// Per-node replies.
	Multi(BTreeMap<String, T>),
}

impl<T> ClusterValue<T> {
	/// True for [`ClusterValue::Single`].
	pub fn is_single(&self) -> bool {
		matches!(self, Self::Single(_))
	}

	/// Single-node payload, if that is what this holds.
	pub fn single(&self) -> Option<&T> {
		match self {
			Self::Single(value) => Some(value),
			Self::Multi(_) => None,
		}
	}

	/// Per-node payloads, if that is what this holds.
	pub fn multi(&self) -> Option<&BTreeMap<String, T>> {
		match self {
			Self::Single(_) => None,
			Self::Multi(values) => Some(values),
		}
	}

	/// Take the single-node payload.
	pub fn into_single(self) -> Result<T> {
		match self {
			Self::Single(value) => Ok(value),
			Self::Multi(_) => Err(DecodeError::WrongClusterVariant {
				expected: "single",
				actual: "multi",
			}),
		}
	}

	/// Take the per-node payloads.
	pub fn into_multi(self) -> Result<BTreeMap<String, T>> {
		match self {
			Self::Single(_) => Err(DecodeError::WrongClusterVariant {
				expected: "multi",
				actual: "single",
			}),
			Self::Multi(values) => Ok(values),
		}
	}
}

/// `Map` replies become [`ClusterValue::Multi`] with `converter` applied per
/// node; anything else is converted as a single-node reply.
pub fn shape_cluster<C: Converter>(value: Value, converter: &C) -> Result<ClusterValue<C::Output>> {
	match value {
		Value::Map(_) => {
			let per_node = MappingConverter {
				next: converter,
				can_be_nil: false,
			};
			Ok(ClusterValue::Multi(convert_required(&per_node, value, "Map")?))
		}
		other => Ok(ClusterValue::Single(convert_required(converter, other, "single-node reply")?)),
	}
}
