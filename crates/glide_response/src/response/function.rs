use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::response::convert::narrow_at;
use crate::response::shape::{Record, array, field, optional_field, record};
use crate::response::{Result, Segment, Value};

/// One function inside a library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FunctionInfo {
	/// Function name.
	pub name: String,
	/// Optional description.
	pub description: Option<String>,
	/// Flags such as `no-writes`.
	pub flags: BTreeSet<String>,
}

/// One library from `FUNCTION LIST`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LibraryInfo {
	/// Library name.
	pub name: String,
	/// Engine name, e.g. `LUA`.
	pub engine: String,
	/// Registered functions.
	pub functions: Vec<FunctionInfo>,
	/// Source code, present with `WITHCODE`.
	pub code: Option<String>,
}

/// Per-engine counters from `FUNCTION STATS`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
	/// Engine name.
	pub language: String,
	/// Registered functions.
	pub functions_count: i64,
	/// Loaded libraries.
	pub libraries_count: i64,
}

/// Script executing while `FUNCTION STATS` ran.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunningScript {
	/// Function name.
	pub name: String,
	/// Invoking command.
	pub command: String,
	/// Command arguments.
	pub arguments: Vec<String>,
	/// Runtime so far.
	pub duration_ms: i64,
}

/// `FUNCTION STATS` reply for one node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FunctionStats {
	/// Stats per engine name.
	pub engines: BTreeMap<String, EngineStats>,
	/// Currently running script.
	pub running_script: Option<RunningScript>,
}

/// Shape a `FUNCTION LIST` reply.
pub fn shape_function_list(value: Value) -> Result<Vec<LibraryInfo>> {
	array(value, "function list")?
		.into_iter()
		.enumerate()
		.map(|(idx, lib)| library(lib).map_err(|err| err.located(Segment::Index(idx))))
		.collect()
}

/// Shape a `FUNCTION LIST` reply fanned out to several nodes.
pub fn shape_function_list_multi_node(value: Value) -> Result<BTreeMap<String, Vec<LibraryInfo>>> {
	record(value, "function list")?
		.into_iter()
		.map(|(node, libs)| -> Result<(String, Vec<LibraryInfo>)> {
			let libs = shape_function_list(libs).map_err(|err| err.located(Segment::Key(node.clone())))?;
			Ok((node, libs))
		})
		.collect()
}

/// Shape a `FUNCTION STATS` reply keyed by node address.
pub fn shape_function_stats(value: Value) -> Result<BTreeMap<String, FunctionStats>> {
	let mut out = BTreeMap::new();
	for (node, stats) in record(value, "function stats")? {
		let stats = record(stats, "function stats")
			.and_then(node_stats)
			.map_err(|err| err.located(Segment::Key(node.clone())))?;
		out.insert(node, stats);
	}
	Ok(out)
}

fn library(value: Value) -> Result<LibraryInfo> {
	const CONTEXT: &str = "function list library";
	let mut map = record(value, CONTEXT)?;
	let functions = match map.remove("functions") {
		None | Some(Value::Nil) => Vec::new(),
		Some(raw) => array(raw, CONTEXT)?
			.into_iter()
			.enumerate()
			.map(|(idx, f)| function(f).map_err(|err| err.located(Segment::Index(idx))))
			.collect::<Result<Vec<_>>>()
			.map_err(|err| err.located(Segment::Key("functions".to_owned())))?,
	};
	Ok(LibraryInfo {
		name: field(&mut map, CONTEXT, "library_name")?,
		engine: field(&mut map, CONTEXT, "engine")?,
		functions,
		code: optional_field(&mut map, "library_code")?,
	})
}

fn function(value: Value) -> Result<FunctionInfo> {
	const CONTEXT: &str = "function list function";
	let mut map = record(value, CONTEXT)?;
	let flags = match map.remove("flags") {
		None | Some(Value::Nil) => BTreeSet::new(),
		Some(Value::Array(items)) => items
			.into_iter()
			.enumerate()
			.map(|(idx, flag)| narrow_at(flag, Segment::Index(idx)))
			.collect::<Result<BTreeSet<String>>>()
			.map_err(|err| err.located(Segment::Key("flags".to_owned())))?,
		Some(raw) => narrow_at(raw, Segment::Key("flags".to_owned()))?,
	};
	Ok(FunctionInfo {
		name: field(&mut map, CONTEXT, "name")?,
		description: optional_field(&mut map, "description")?,
		flags,
	})
}

fn node_stats(mut map: Record) -> Result<FunctionStats> {
	const CONTEXT: &str = "function stats";
	let mut engines = BTreeMap::new();
	if let Some(raw) = map.remove("engines") {
		for (language, counters) in record(raw, CONTEXT)? {
			let mut counters = record(counters, CONTEXT)?;
			let stats = EngineStats {
				functions_count: field(&mut counters, CONTEXT, "functions_count")?,
				libraries_count: field(&mut counters, CONTEXT, "libraries_count")?,
				language: language.clone(),
			};
			engines.insert(language, stats);
		}
	}
	let running_script = match map.remove("running_script") {
		None | Some(Value::Nil) => None,
		Some(raw) => {
			let mut script = record(raw, CONTEXT)?;
			let arguments = match script.remove("arguments") {
				None | Some(Value::Nil) => Vec::new(),
				Some(args) => array(args, CONTEXT)?
					.into_iter()
					.enumerate()
					.map(|(idx, arg)| narrow_at(arg, Segment::Index(idx)))
					.collect::<Result<Vec<String>>>()?,
			};
			Some(RunningScript {
				name: field(&mut script, CONTEXT, "name")?,
				command: field(&mut script, CONTEXT, "command")?,
				arguments,
				duration_ms: field(&mut script, CONTEXT, "duration_ms")?,
			})
		}
	};
	Ok(FunctionStats { engines, running_script })
}
