//! Field-by-field validation that keeps the good parts
//!
//! Extraction hands back a loose JSON object; each declared field is checked
//! in isolation so one bad value never discards the rest. Absent and null
//! fields are skipped, not errors: they simply stay ungathered for a later
//! turn. Cross-field rules run last, over the values that passed, and report
//! without stripping them. Errors come out in schema order, cross-field
//! errors after per-field ones.

use chrono::NaiveDate;
use serde_json::Value;
use std::fmt;

use crate::schema::{CrossRule, FieldKind, RequirementSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// Value was not of the declared type and could not be coerced.
    Type,
    /// Value had the right type but violated a bound.
    Constraint,
    /// A rule spanning several fields failed.
    CrossField,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub kind: FieldErrorKind,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOutcome {
    pub valid: serde_json::Map<String, Value>,
    pub errors: Vec<FieldError>,
}

impl ValidationOutcome {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// One line per error, for feeding back into the gathering prompt.
    pub fn error_lines(&self) -> String {
        self.errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
    }
}

/// Validate a raw mapping against a schema without failing the whole object.
///
/// Only fields declared in the schema are looked at; unknown keys are
/// ignored. The returned `valid` map holds canonicalized values (trimmed
/// text, `YYYY-MM-DD` date strings, proper JSON numbers).
pub fn partial_validate(
    schema: &RequirementSchema,
    raw: &serde_json::Map<String, Value>,
) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();

    for field in &schema.fields {
        let value = match raw.get(field.name) {
            None | Some(Value::Null) => continue,
            Some(v) => v,
        };

        match check_field(&field.kind, value) {
            Ok(canonical) => {
                outcome.valid.insert(field.name.to_string(), canonical);
            }
            Err((kind, message)) => {
                outcome.errors.push(FieldError { field: field.name.to_string(), message, kind });
            }
        }
    }

    for rule in &schema.cross_rules {
        check_cross_rule(rule, &outcome.valid, &mut outcome.errors);
    }

    outcome
}

fn check_field(kind: &FieldKind, value: &Value) -> Result<Value, (FieldErrorKind, String)> {
    match kind {
        FieldKind::Integer { gt, ge } => {
            let n = coerce_integer(value)?;
            if let Some(bound) = gt
                && n <= *bound
            {
                return Err((FieldErrorKind::Constraint, format!("must be greater than {bound}")));
            }
            if let Some(bound) = ge
                && n < *bound
            {
                return Err((FieldErrorKind::Constraint, format!("must be at least {bound}")));
            }
            Ok(Value::from(n))
        }
        FieldKind::Float { gt } => {
            let f = coerce_float(value)?;
            if let Some(bound) = gt
                && !(f > *bound)
            {
                return Err((FieldErrorKind::Constraint, format!("must be greater than {bound}")));
            }
            if f.is_infinite() {
                // JSON numbers cannot carry infinity, keep the canonical string form.
                return Ok(Value::from(if f > 0.0 { "Infinity" } else { "-Infinity" }));
            }
            Ok(Value::from(f))
        }
        FieldKind::Text { min_length } => {
            let Value::String(s) = value else {
                return Err((FieldErrorKind::Type, "expected text".to_string()));
            };
            let trimmed = s.trim();
            if let Some(min) = min_length
                && trimmed.chars().count() < *min
            {
                return Err((
                    FieldErrorKind::Constraint,
                    format!("must have at least {min} character(s)"),
                ));
            }
            Ok(Value::from(trimmed))
        }
        FieldKind::Date => {
            let date = coerce_date(value)?;
            Ok(Value::from(date.to_string()))
        }
    }
}

fn coerce_integer(value: &Value) -> Result<i64, (FieldErrorKind, String)> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            if let Some(f) = n.as_f64()
                && f.fract() == 0.0
                && f >= i64::MIN as f64
                && f <= i64::MAX as f64
            {
                return Ok(f as i64);
            }
            Err((FieldErrorKind::Type, "expected an integer".to_string()))
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| (FieldErrorKind::Type, "expected an integer".to_string())),
        _ => Err((FieldErrorKind::Type, "expected an integer".to_string())),
    }
}

fn coerce_float(value: &Value) -> Result<f64, (FieldErrorKind, String)> {
    let f = match value {
        Value::Number(n) => n.as_f64(),
        // f64 parsing accepts "inf" and "Infinity", which extraction uses
        // for an unconstrained budget.
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match f {
        Some(f) if !f.is_nan() => Ok(f),
        _ => Err((FieldErrorKind::Type, "expected a number".to_string())),
    }
}

fn coerce_date(value: &Value) -> Result<NaiveDate, (FieldErrorKind, String)> {
    let Value::String(s) = value else {
        return Err((FieldErrorKind::Type, "expected a date in YYYY-MM-DD format".to_string()));
    };
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| (FieldErrorKind::Type, "expected a date in YYYY-MM-DD format".to_string()))
}

fn check_cross_rule(
    rule: &CrossRule,
    valid: &serde_json::Map<String, Value>,
    errors: &mut Vec<FieldError>,
) {
    match rule {
        CrossRule::DateOrder { earlier, later } => {
            let Some(earlier_date) = date_in(valid, earlier) else { return };
            let Some(later_date) = date_in(valid, later) else { return };
            if later_date <= earlier_date {
                errors.push(FieldError {
                    field: (*later).to_string(),
                    message: format!("must be after {earlier}"),
                    kind: FieldErrorKind::CrossField,
                });
            }
        }
    }
}

fn date_in(valid: &serde_json::Map<String, Value>, field: &str) -> Option<NaiveDate> {
    let raw = valid.get(field)?.as_str()?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::catalog;
    use proptest::prelude::*;

    fn raw(pairs: &[(&str, Value)]) -> serde_json::Map<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_inverted_dates_keep_independent_fields() {
        let schema = catalog::stay_booking();
        let input = raw(&[
            ("number_of_adults", Value::from(2)),
            ("check_in_date", Value::from("2025-06-01")),
            ("check_out_date", Value::from("2025-05-30")),
        ]);

        let outcome = partial_validate(&schema, &input);

        assert_eq!(outcome.valid.len(), 3);
        assert_eq!(outcome.valid["number_of_adults"], Value::from(2));
        assert_eq!(outcome.valid["check_in_date"], Value::from("2025-06-01"));
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].field, "check_out_date");
        assert_eq!(outcome.errors[0].kind, FieldErrorKind::CrossField);
    }

    #[test]
    fn test_absent_and_null_fields_are_skipped() {
        let schema = catalog::stay_booking();
        let input = raw(&[("location", Value::Null)]);

        let outcome = partial_validate(&schema, &input);

        assert!(outcome.valid.is_empty());
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_bad_field_does_not_block_siblings() {
        let schema = catalog::stay_booking();
        let input = raw(&[
            ("location", Value::from("Goa")),
            ("number_of_adults", Value::from("plenty")),
            ("budget_per_night", Value::from(4500.0)),
        ]);

        let outcome = partial_validate(&schema, &input);

        assert_eq!(outcome.valid.len(), 2);
        assert!(outcome.valid.contains_key("location"));
        assert!(outcome.valid.contains_key("budget_per_night"));
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].field, "number_of_adults");
        assert_eq!(outcome.errors[0].kind, FieldErrorKind::Type);
    }

    #[test]
    fn test_numeric_strings_coerce() {
        let schema = catalog::stay_booking();
        let input = raw(&[
            ("number_of_adults", Value::from("2")),
            ("budget_per_night", Value::from("4500.50")),
        ]);

        let outcome = partial_validate(&schema, &input);

        assert_eq!(outcome.valid["number_of_adults"], Value::from(2));
        assert_eq!(outcome.valid["budget_per_night"], Value::from(4500.50));
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_unconstrained_budget_stays_infinite() {
        let schema = catalog::stay_booking();
        let input = raw(&[("budget_per_night", Value::from("Infinity"))]);

        let outcome = partial_validate(&schema, &input);

        assert_eq!(outcome.valid["budget_per_night"], Value::from("Infinity"));
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_bounds_are_enforced() {
        let schema = catalog::stay_booking();
        let input = raw(&[
            ("number_of_adults", Value::from(0)),
            ("number_of_children", Value::from(0)),
            ("budget_per_night", Value::from(-100.0)),
            ("location", Value::from("   ")),
        ]);

        let outcome = partial_validate(&schema, &input);

        assert!(outcome.valid.is_empty());
        let fields: Vec<&str> = outcome.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["location", "number_of_adults", "number_of_children", "budget_per_night"]
        );
        assert!(outcome.errors.iter().all(|e| e.kind == FieldErrorKind::Constraint));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let schema = catalog::stay_booking();
        let input = raw(&[
            ("location", Value::from("Manali")),
            ("favourite_colour", Value::from("blue")),
        ]);

        let outcome = partial_validate(&schema, &input);

        assert_eq!(outcome.valid.len(), 1);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_dates_canonicalize_and_order() {
        let schema = catalog::destination_recommendation();
        let input = raw(&[
            ("travel_start_date", Value::from(" 2026-01-10 ")),
            ("travel_end_date", Value::from("2026-01-10")),
        ]);

        let outcome = partial_validate(&schema, &input);

        assert_eq!(outcome.valid["travel_start_date"], Value::from("2026-01-10"));
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].field, "travel_end_date");
    }

    #[test]
    fn test_error_lines_format() {
        let outcome = ValidationOutcome {
            valid: serde_json::Map::new(),
            errors: vec![FieldError {
                field: "check_out_date".to_string(),
                message: "must be after check_in_date".to_string(),
                kind: FieldErrorKind::CrossField,
            }],
        };

        assert_eq!(outcome.error_lines(), "check_out_date: must be after check_in_date");
    }

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            (-5i64..5).prop_map(Value::from),
            (-2.0f64..10_000_000.0).prop_map(Value::from),
            "[a-z0-9 .-]{0,12}".prop_map(Value::from),
        ]
    }

    fn raw_mapping() -> impl Strategy<Value = serde_json::Map<String, Value>> {
        let key = prop_oneof![
            Just("location".to_string()),
            Just("check_in_date".to_string()),
            Just("check_out_date".to_string()),
            Just("number_of_adults".to_string()),
            Just("number_of_children".to_string()),
            Just("budget_per_night".to_string()),
            Just("reasoning".to_string()),
            Just("unknown_extra".to_string()),
        ];
        proptest::collection::btree_map(key, scalar(), 0..8)
            .prop_map(|m| m.into_iter().collect())
    }

    proptest! {
        #[test]
        fn prop_outcome_stays_inside_schema(input in raw_mapping()) {
            let schema = catalog::stay_booking();
            let outcome = partial_validate(&schema, &input);

            for key in outcome.valid.keys() {
                prop_assert!(schema.field(key).is_some());
            }
            for err in &outcome.errors {
                prop_assert!(schema.field(&err.field).is_some());
            }
            for err in outcome.errors.iter().filter(|e| e.kind != FieldErrorKind::CrossField) {
                prop_assert!(!outcome.valid.contains_key(&err.field));
            }

            let again = partial_validate(&schema, &input);
            prop_assert_eq!(outcome, again);
        }
    }
}
