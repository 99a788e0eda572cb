use std::time::Duration;

use rstest::rstest;

use super::*;

#[test]
fn default_options_emit_nothing() {
	assert!(HSetExOptions::default().to_args().is_empty());
	assert!(HGetExOptions::default().to_args().is_empty());
	assert!(HExpireOptions::default().to_args().is_empty());
}

#[test]
fn conditional_precedes_expiry() {
	let opts = HSetExOptions {
		conditional: Some(FieldConditional::OnlyIfNoneExist),
		expiry: Some(SetExpiry::Seconds(60)),
	};
	assert_eq!(opts.to_args(), ["FNX", "EX", "60"]);

	let only_cond = HSetExOptions {
		conditional: Some(FieldConditional::OnlyIfAllExist),
		expiry: None,
	};
	assert_eq!(only_cond.to_args(), ["FXX"]);
}

#[rstest]
#[case(SetExpiry::Seconds(60), &["EX", "60"])]
#[case(SetExpiry::Millis(5000), &["PX", "5000"])]
#[case(SetExpiry::UnixSeconds(1_640_995_200), &["EXAT", "1640995200"])]
#[case(SetExpiry::UnixMillis(1_640_995_200_000), &["PXAT", "1640995200000"])]
#[case(SetExpiry::KeepTtl, &["KEEPTTL"])]
fn set_expiry_args(#[case] expiry: SetExpiry, #[case] expected: &[&str]) {
	let opts = HSetExOptions {
		conditional: None,
		expiry: Some(expiry),
	};
	assert_eq!(opts.to_args(), expected);
}

#[rstest]
#[case(GetExpiry::Seconds(60), &["EX", "60"])]
#[case(GetExpiry::Millis(5000), &["PX", "5000"])]
#[case(GetExpiry::Persist, &["PERSIST"])]
fn get_expiry_args(#[case] expiry: GetExpiry, #[case] expected: &[&str]) {
	let opts = HGetExOptions { expiry: Some(expiry) };
	assert_eq!(opts.to_args(), expected);
}

#[rstest]
#[case(ExpireCondition::HasNoExpiry, "NX")]
#[case(ExpireCondition::HasExistingExpiry, "XX")]
#[case(ExpireCondition::NewExpiryGreaterThanCurrent, "GT")]
#[case(ExpireCondition::NewExpiryLessThanCurrent, "LT")]
fn expire_condition_args(#[case] condition: ExpireCondition, #[case] expected: &str) {
	let opts = HExpireOptions { condition: Some(condition) };
	assert_eq!(opts.to_args(), [expected]);
}

#[test]
fn hsetex_layout() {
	let opts = HSetExOptions {
		conditional: Some(FieldConditional::OnlyIfNoneExist),
		expiry: Some(SetExpiry::Millis(1500)),
	};
	let args = build_hsetex_args("h", &[("f1", "v1"), ("f2", "v2")], &opts).expect("build");
	assert_eq!(args, ["h", "FNX", "PX", "1500", "FIELDS", "2", "f1", "v1", "f2", "v2"]);
}

#[test]
fn hgetex_layout() {
	let opts = HGetExOptions {
		expiry: Some(GetExpiry::Persist),
	};
	let args = build_hgetex_args("h", &["a", "b"], &opts).expect("build");
	assert_eq!(args, ["h", "PERSIST", "FIELDS", "2", "a", "b"]);
}

#[test]
fn hexpire_renders_seconds_or_millis() {
	let opts = HExpireOptions {
		condition: Some(ExpireCondition::NewExpiryGreaterThanCurrent),
	};
	let secs = build_hexpire_args("h", Duration::from_millis(90_500), &["a"], &opts, false).expect("build");
	assert_eq!(secs, ["h", "90", "GT", "FIELDS", "1", "a"]);

	let millis = build_hexpire_args("h", Duration::from_millis(90_500), &["a"], &HExpireOptions::default(), true).expect("build");
	assert_eq!(millis, ["h", "90500", "FIELDS", "1", "a"]);
}

#[test]
fn empty_fields_are_rejected() {
	let none: [&str; 0] = [];
	let err = build_hgetex_args("h", &none, &HGetExOptions::default()).expect_err("empty");
	assert_eq!(err, ArgError::EmptyFields { command: "HGETEX" });

	let pairs: [(&str, &str); 0] = [];
	let err = build_hsetex_args("h", &pairs, &HSetExOptions::default()).expect_err("empty");
	assert_eq!(err.to_string(), "HSETEX requires at least one field");

	let err = build_hexpire_args("h", Duration::from_secs(1), &none, &HExpireOptions::default(), true).expect_err("empty");
	assert_eq!(err, ArgError::EmptyFields { command: "HPEXPIRE" });
}
