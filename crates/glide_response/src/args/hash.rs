//! Hash field expiration arguments (`HSETEX`, `HGETEX`, `HEXPIRE` family).

use std::time::Duration;

use crate::args::{ArgError, Result};

/// Existence condition on the fields of `HSETEX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldConditional {
	/// `FNX`: set only if none of the fields exist.
	OnlyIfNoneExist,
	/// `FXX`: set only if all of the fields exist.
	OnlyIfAllExist,
}

impl FieldConditional {
	fn keyword(self) -> &'static str {
		match self {
			Self::OnlyIfNoneExist => "FNX",
			Self::OnlyIfAllExist => "FXX",
		}
	}
}

/// Expiry applied by `HSETEX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetExpiry {
	/// `EX seconds`.
	Seconds(u64),
	/// `PX milliseconds`.
	Millis(u64),
	/// `EXAT unix-seconds`.
	UnixSeconds(u64),
	/// `PXAT unix-milliseconds`.
	UnixMillis(u64),
	/// `KEEPTTL`.
	KeepTtl,
}

impl SetExpiry {
	fn push(self, args: &mut Vec<String>) {
		match self {
			Self::Seconds(n) => push_pair(args, "EX", n),
			Self::Millis(n) => push_pair(args, "PX", n),
			Self::UnixSeconds(n) => push_pair(args, "EXAT", n),
			Self::UnixMillis(n) => push_pair(args, "PXAT", n),
			Self::KeepTtl => args.push("KEEPTTL".to_owned()),
		}
	}
}

/// Expiry applied by `HGETEX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GetExpiry {
	/// `EX seconds`.
	Seconds(u64),
	/// `PX milliseconds`.
	Millis(u64),
	/// `EXAT unix-seconds`.
	UnixSeconds(u64),
	/// `PXAT unix-milliseconds`.
	UnixMillis(u64),
	/// `PERSIST`: remove the expiry.
	Persist,
}

impl GetExpiry {
	fn push(self, args: &mut Vec<String>) {
		match self {
			Self::Seconds(n) => push_pair(args, "EX", n),
			Self::Millis(n) => push_pair(args, "PX", n),
			Self::UnixSeconds(n) => push_pair(args, "EXAT", n),
			Self::UnixMillis(n) => push_pair(args, "PXAT", n),
			Self::Persist => args.push("PERSIST".to_owned()),
		}
	}
}

/// Condition on the existing expiry for `HEXPIRE` and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpireCondition {
	/// `NX`: field has no expiry.
	HasNoExpiry,
	/// `XX`: field has an expiry.
	HasExistingExpiry,
	/// `GT`: new expiry is later than the current one.
	NewExpiryGreaterThanCurrent,
	/// `LT`: new expiry is earlier than the current one.
	NewExpiryLessThanCurrent,
}

impl ExpireCondition {
	fn keyword(self) -> &'static str {
		match self {
			Self::HasNoExpiry => "NX",
			Self::HasExistingExpiry => "XX",
			Self::NewExpiryGreaterThanCurrent => "GT",
			Self::NewExpiryLessThanCurrent => "LT",
		}
	}
}

/// Options for `HSETEX`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HSetExOptions {
	/// `FNX` / `FXX`.
	pub conditional: Option<FieldConditional>,
	/// Expiry to apply.
	pub expiry: Option<SetExpiry>,
}

impl HSetExOptions {
	/// Optional arguments in wire order.
	pub fn to_args(&self) -> Vec<String> {
		let mut args = Vec::new();
		if let Some(conditional) = self.conditional {
			args.push(conditional.keyword().to_owned());
		}
		if let Some(expiry) = self.expiry {
			expiry.push(&mut args);
		}
		args
	}
}

/// Options for `HGETEX`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HGetExOptions {
	/// Expiry to apply.
	pub expiry: Option<GetExpiry>,
}

impl HGetExOptions {
	/// Optional arguments in wire order.
	pub fn to_args(&self) -> Vec<String> {
		let mut args = Vec::new();
		if let Some(expiry) = self.expiry {
			expiry.push(&mut args);
		}
		args
	}
}

/// Options for `HEXPIRE`, `HPEXPIRE`, `HEXPIREAT`, and `HPEXPIREAT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HExpireOptions {
	/// Condition on the current expiry.
	pub condition: Option<ExpireCondition>,
}

impl HExpireOptions {
	/// Optional arguments in wire order.
	pub fn to_args(&self) -> Vec<String> {
		self.condition.map(|c| vec![c.keyword().to_owned()]).unwrap_or_default()
	}
}

/// `FIELDS n f…`.
pub fn build_hfield_args<S: AsRef<str>>(command: &'static str, fields: &[S]) -> Result<Vec<String>> {
	if fields.is_empty() {
		return Err(ArgError::EmptyFields { command });
	}
	let mut args = Vec::with_capacity(fields.len() + 2);
	args.push("FIELDS".to_owned());
	args.push(fields.len().to_string());
	args.extend(fields.iter().map(|f| f.as_ref().to_owned()));
	Ok(args)
}

/// `key [FNX|FXX] [expiry] FIELDS n f v…`.
pub fn build_hsetex_args<K: AsRef<str>, V: AsRef<str>>(key: &str, fields_and_values: &[(K, V)], opts: &HSetExOptions) -> Result<Vec<String>> {
	if fields_and_values.is_empty() {
		return Err(ArgError::EmptyFields { command: "HSETEX" });
	}
	let mut args = vec![key.to_owned()];
	args.extend(opts.to_args());
	args.push("FIELDS".to_owned());
	args.push(fields_and_values.len().to_string());
	for (field, value) in fields_and_values {
		args.push(field.as_ref().to_owned());
		args.push(value.as_ref().to_owned());
	}
	Ok(args)
}

/// `key [expiry] FIELDS n f…`.
pub fn build_hgetex_args<S: AsRef<str>>(key: &str, fields: &[S], opts: &HGetExOptions) -> Result<Vec<String>> {
	let field_args = build_hfield_args("HGETEX", fields)?;
	let mut args = vec![key.to_owned()];
	args.extend(opts.to_args());
	args.extend(field_args);
	Ok(args)
}

/// `key time [NX|XX|GT|LT] FIELDS n f…`.
///
/// `time` is rendered in milliseconds when `millis` is set (`HPEXPIRE`,
/// `HPEXPIREAT`) and in whole seconds otherwise. For the `*AT` variants pass
/// the duration since the Unix epoch.
pub fn build_hexpire_args<S: AsRef<str>>(key: &str, time: Duration, fields: &[S], opts: &HExpireOptions, millis: bool) -> Result<Vec<String>> {
	let command = if millis { "HPEXPIRE" } else { "HEXPIRE" };
	let field_args = build_hfield_args(command, fields)?;
	let time = if millis { time.as_millis().to_string() } else { time.as_secs().to_string() };
	let mut args = vec![key.to_owned(), time];
	args.extend(opts.to_args());
	args.extend(field_args);
	Ok(args)
}

fn push_pair(args: &mut Vec<String>, keyword: &str, n: u64) {
	args.push(keyword.to_owned());
	args.push(n.to_string());
}

#[cfg(test)]
mod tests;
