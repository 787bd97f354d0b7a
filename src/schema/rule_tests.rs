//! Tests for the validation rule language.

use serde_json::json;

use super::{FieldKind, Rule};

fn rule(source: &str, kind: FieldKind) -> Rule {
    Rule::parse(source, kind).unwrap()
}

mod parse {
    use super::*;

    #[test]
    fn accepts_combined_constraints() {
        let rule = rule("required,min=1,max=65535", FieldKind::Integer);
        assert!(rule.check(None).is_err());
        assert_eq!(rule.source(), "required,min=1,max=65535");
    }

    #[test]
    fn rejects_unknown_constraint() {
        let err = Rule::parse("required,shiny", FieldKind::String).unwrap_err();
        assert!(err.contains("unknown constraint 'shiny'"));
    }

    #[test]
    fn rejects_non_numeric_bound() {
        let err = Rule::parse("min=abc", FieldKind::Integer).unwrap_err();
        assert!(err.contains("numeric parameter"));
    }

    #[test]
    fn rejects_missing_parameter() {
        assert!(Rule::parse("oneof", FieldKind::String).is_err());
        assert!(Rule::parse("max", FieldKind::String).is_err());
    }

    #[test]
    fn rejects_empty_oneof() {
        assert!(Rule::parse("oneof=  ", FieldKind::String).is_err());
    }

    #[test]
    fn rejects_parameter_on_flag() {
        assert!(Rule::parse("required=true", FieldKind::String).is_err());
    }

    #[test]
    fn rejects_empty_token() {
        assert!(Rule::parse("required,,min=1", FieldKind::String).is_err());
    }

    #[test]
    fn rejects_dive_on_scalar() {
        assert!(Rule::parse("dive,min=1", FieldKind::String).is_err());
    }

    #[test]
    fn rejects_url_on_integer() {
        assert!(Rule::parse("url", FieldKind::Integer).is_err());
    }

    #[test]
    fn rejects_length_on_boolean() {
        assert!(Rule::parse("min=1", FieldKind::Boolean).is_err());
    }

    #[test]
    fn rejects_required_after_dive() {
        assert!(Rule::parse("dive,required", FieldKind::StringList).is_err());
    }
}

mod check {
    use super::*;

    #[test]
    fn required_rejects_absent_and_empty() {
        let rule = rule("required", FieldKind::String);
        assert_eq!(rule.check(None).unwrap_err(), "is required");
        assert_eq!(rule.check(Some(&json!(null))).unwrap_err(), "is required");
        assert_eq!(rule.check(Some(&json!(""))).unwrap_err(), "is required");
        assert!(rule.check(Some(&json!("x"))).is_ok());
    }

    #[test]
    fn required_accepts_false_and_zero() {
        assert!(rule("required", FieldKind::Boolean).check(Some(&json!(false))).is_ok());
        assert!(rule("required", FieldKind::Integer).check(Some(&json!(0))).is_ok());
    }

    #[test]
    fn absent_optional_value_passes() {
        assert!(rule("min=8", FieldKind::String).check(None).is_ok());
    }

    #[test]
    fn min_measures_string_length_in_chars() {
        let rule = rule("min=3", FieldKind::String);
        assert!(rule.check(Some(&json!("日本語"))).is_ok());
        let err = rule.check(Some(&json!("ab"))).unwrap_err();
        assert_eq!(err, "length 2 is less than minimum 3");
    }

    #[test]
    fn max_compares_numeric_value() {
        let rule = rule("min=1,max=65535", FieldKind::Integer);
        assert!(rule.check(Some(&json!(5432))).is_ok());
        let err = rule.check(Some(&json!(70000))).unwrap_err();
        assert_eq!(err, "value 70000 is greater than maximum 65535");
    }

    #[test]
    fn len_requires_exact_length() {
        let rule = rule("len=2", FieldKind::StringList);
        assert!(rule.check(Some(&json!(["a", "b"]))).is_ok());
        assert!(rule.check(Some(&json!(["a"]))).is_err());
    }

    #[test]
    fn oneof_matches_exact_option() {
        let rule = rule("oneof=postgres mysql", FieldKind::String);
        assert!(rule.check(Some(&json!("mysql"))).is_ok());
        let err = rule.check(Some(&json!("sqlite"))).unwrap_err();
        assert!(err.contains("'sqlite' is not one of [postgres, mysql]"));
    }

    #[test]
    fn oneof_compares_numbers_by_text() {
        let rule = rule("oneof=1 2 3", FieldKind::Integer);
        assert!(rule.check(Some(&json!(2))).is_ok());
        assert!(rule.check(Some(&json!(4))).is_err());
    }

    #[test]
    fn url_requires_absolute_url() {
        let rule = rule("url", FieldKind::String);
        assert!(rule.check(Some(&json!("postgres://u:p@localhost:5432/db"))).is_ok());
        assert!(rule.check(Some(&json!("not a url"))).is_err());
    }

    #[test]
    fn omitempty_skips_checks_for_empty_value() {
        let rule = rule("omitempty,url", FieldKind::String);
        assert!(rule.check(Some(&json!(""))).is_ok());
        assert!(rule.check(Some(&json!("nope"))).is_err());
    }

    #[test]
    fn dive_checks_every_element() {
        let rule = rule("min=1,dive,oneof=stdout stderr file", FieldKind::StringList);
        assert!(rule.check(Some(&json!(["stdout", "file"]))).is_ok());

        let err = rule.check(Some(&json!(["stdout", "syslog"]))).unwrap_err();
        assert!(err.starts_with("element 1"));

        let err = rule.check(Some(&json!([]))).unwrap_err();
        assert!(err.contains("less than minimum 1"));
    }

    #[test]
    fn wrong_type_is_reported_not_panicked() {
        let rule = rule("min=1", FieldKind::Integer);
        assert!(rule.check(Some(&json!(true))).is_err());
    }
}
