use serde::Serialize;

use crate::response::shape::{array, element, tuple};
use crate::response::{DecodeError, Narrow, Result, Segment, Value};

const CONTEXT: &str = "location";

/// Longitude/latitude pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GeospatialData {
	/// Degrees east.
	pub longitude: f64,
	/// Degrees north.
	pub latitude: f64,
}

/// One `GEOSEARCH`/`GEORADIUS` hit. The optional parts are present only when the
/// matching `WITHDIST`, `WITHHASH` or `WITHCOORD` flag was sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Location {
	/// Member name.
	pub name: String,
	/// Distance from the search centre, in the requested unit.
	pub dist: Option<f64>,
	/// Raw geohash score.
	pub hash: Option<i64>,
	/// Member position.
	pub coord: Option<GeospatialData>,
}

/// Each element is either a bare member name or `[name, [extras...]]`, where the
/// extras are told apart by their kind: Float is the distance, Int the hash and a
/// two-element Array the coordinates.
pub fn shape_locations(value: Value) -> Result<Vec<Location>> {
	array(value, CONTEXT)?
		.into_iter()
		.enumerate()
		.map(|(idx, item)| location(item).map_err(|err| err.located(Segment::Index(idx))))
		.collect()
}

fn location(value: Value) -> Result<Location> {
	if matches!(value, Value::String(_)) {
		return Ok(Location { name: String::narrow(value)?, ..Location::default() });
	}
	let [name, extras] = tuple::<2>(value, CONTEXT)?;
	let mut location = Location { name: element(name, 0)?, ..Location::default() };
	let at = |err: DecodeError| err.located(Segment::Index(1));
	for (idx, extra) in array(extras, CONTEXT).map_err(at)?.into_iter().enumerate() {
		match extra {
			Value::Float(dist) => location.dist = Some(dist),
			Value::Int(hash) => location.hash = Some(hash),
			coord @ Value::Array(_) => location.coord = Some(coordinates(coord).map_err(|err| at(err.located(Segment::Index(idx))))?),
			other => {
				return Err(at(DecodeError::shape(CONTEXT, format!("unexpected {} extra at {idx}", other.kind()))));
			}
		}
	}
	Ok(location)
}

fn coordinates(value: Value) -> Result<GeospatialData> {
	let [longitude, latitude] = tuple::<2>(value, CONTEXT)?;
	Ok(GeospatialData { longitude: element(longitude, 0)?, latitude: element(latitude, 1)? })
}
