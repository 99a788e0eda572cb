use std::time::Duration;

use super::*;

#[test]
fn boundary_wire_forms() {
	assert_eq!(StreamBoundary::Inclusive("1-0".into()).to_arg(), "1-0");
	assert_eq!(StreamBoundary::Exclusive("1-0".into()).to_arg(), "(1-0");
	assert_eq!(StreamBoundary::Min.to_arg(), "-");
	assert_eq!(StreamBoundary::Max.to_arg(), "+");
}

#[test]
fn xadd_defaults_to_auto_id() {
	assert_eq!(XAddOptions::default().to_args().expect("args"), ["*"]);
}

#[test]
fn xadd_orders_nomkstream_trim_then_id() {
	let opts = XAddOptions {
		id: Some("5-1".into()),
		make_stream: false,
		trim: Some(XTrimOptions {
			exact: Some(false),
			limit: Some(10),
			..XTrimOptions::max_len(100)
		}),
	};
	assert_eq!(opts.to_args().expect("args"), ["NOMKSTREAM", "MAXLEN", "~", "100", "LIMIT", "10", "5-1"]);
}

#[test]
fn xadd_rejects_empty_id() {
	let opts = XAddOptions {
		id: Some(String::new()),
		..XAddOptions::default()
	};
	assert_eq!(opts.to_args(), Err(ArgError::EmptyStreamId));
}

#[test]
fn build_xadd_layout_and_empty_fields() {
	let args = build_xadd_args("s", &[("f", "v")], &XAddOptions::default()).expect("build");
	assert_eq!(args, ["s", "*", "f", "v"]);

	let none: [(&str, &str); 0] = [];
	let err = build_xadd_args("s", &none, &XAddOptions::default()).expect_err("empty");
	assert_eq!(err, ArgError::EmptyFields { command: "XADD" });
}

#[test]
fn trim_min_id_exact() {
	let opts = XTrimOptions {
		exact: Some(true),
		..XTrimOptions::min_id("3-0")
	};
	assert_eq!(opts.to_args().expect("args"), ["MINID", "=", "3-0"]);
}

#[test]
fn trim_limit_requires_approximate() {
	let exact = XTrimOptions {
		exact: Some(true),
		limit: Some(5),
		..XTrimOptions::max_len(1)
	};
	assert_eq!(exact.to_args(), Err(ArgError::LimitRequiresApproximate));

	let unspecified = XTrimOptions {
		limit: Some(5),
		..XTrimOptions::max_len(1)
	};
	assert_eq!(unspecified.to_args(), Err(ArgError::LimitRequiresApproximate));
}

#[test]
fn read_options() {
	assert!(XReadOptions::default().to_args().is_empty());
	let opts = XReadOptions {
		count: Some(2),
		block: Some(Duration::from_secs(1)),
	};
	assert_eq!(opts.to_args(), ["COUNT", "2", "BLOCK", "1000"]);

	let group = XReadGroupOptions {
		count: None,
		block: Some(Duration::ZERO),
		no_ack: true,
	};
	assert_eq!(group.to_args(), ["BLOCK", "0", "NOACK"]);
}

#[test]
fn pending_extended_form() {
	let mut opts = XPendingOptions::new(StreamBoundary::Min, StreamBoundary::Max, 10);
	assert_eq!(opts.to_args(), ["-", "+", "10"]);

	opts.min_idle_ms = Some(500);
	opts.start = StreamBoundary::Exclusive("1-0".into());
	opts.consumer = Some("alice".into());
	assert_eq!(opts.to_args(), ["IDLE", "500", "(1-0", "+", "10", "alice"]);
}

#[test]
fn group_options() {
	assert!(XGroupCreateOptions::default().to_args().is_empty());
	let create = XGroupCreateOptions {
		make_stream: true,
		entries_read: Some(7),
	};
	assert_eq!(create.to_args(), ["MKSTREAM", "ENTRIESREAD", "7"]);

	let set_id = XGroupSetIdOptions { entries_read: Some(0) };
	assert_eq!(set_id.to_args(), ["ENTRIESREAD", "0"]);
	assert!(XGroupSetIdOptions { entries_read: Some(-1) }.to_args().is_empty());
}

#[test]
fn claim_options_skip_zero_values() {
	let opts = XClaimOptions {
		idle_ms: Some(100),
		idle_unix_ms: Some(0),
		retry_count: Some(3),
		force: true,
	};
	assert_eq!(opts.to_args(), ["IDLE", "100", "RETRYCOUNT", "3", "FORCE"]);
}

#[test]
fn count_only_options() {
	assert_eq!(XAutoClaimOptions { count: Some(0) }.to_args(), ["COUNT", "0"]);
	assert_eq!(XRangeOptions { count: Some(4) }.to_args(), ["COUNT", "4"]);
	assert_eq!(XInfoStreamOptions::default().to_args(), ["FULL"]);
	assert_eq!(XInfoStreamOptions { count: Some(5) }.to_args(), ["FULL", "COUNT", "5"]);
}
