//! Best-effort field type discovery.
//!
//! Types are guessed from the field name first (`time` / `date`), then from
//! the first non-null value. Nothing here fails: when nothing can be
//! learned the caller decides the fallback, normally [`FieldType::Other`].

use crate::field::{Field, FieldType};
use crate::frame::DataFrame;
use crate::value::FieldValue;
use crate::vector::Vector;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

// Same dynamic-typing rule CSV importers use: optional minus, digits with an
// optional decimal point, optional exponent, or NaN.
static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(-?(\d*\.?\d+|\d+\.?\d*)(e[-+]?\d+)?|NAN)\s*$")
        .expect("numeric literal pattern is valid")
});

/// Classify a single value.
pub fn guess_field_type_from_value(value: &FieldValue) -> FieldType {
    match value {
        FieldValue::Number(_) => FieldType::Number,
        FieldValue::String(s) => {
            if NUMBER.is_match(s) {
                FieldType::Number
            } else if matches!(s.as_str(), "true" | "TRUE" | "True" | "false" | "FALSE" | "False") {
                FieldType::Boolean
            } else {
                FieldType::String
            }
        }
        FieldValue::Bool(_) => FieldType::Boolean,
        FieldValue::Time(_) => FieldType::Time,
        FieldValue::Null | FieldValue::Other(_) => FieldType::Other,
    }
}

/// Guess from a name and values. `None` when every value is null.
pub fn guess_type_for_values(name: &str, values: &dyn Vector<FieldValue>) -> Option<FieldType> {
    let lower = name.to_lowercase();
    if lower == "date" || lower == "time" {
        return Some(FieldType::Time);
    }

    values
        .iter()
        .find(|v| !v.is_null())
        .map(guess_field_type_from_value)
}

/// Guess the type of a field, ignoring its current type.
pub fn guess_field_type_for_field(field: &Field) -> Option<FieldType> {
    guess_type_for_values(&field.name, field.values.as_ref())
}

/// Fill in every field lacking a firm type.
///
/// Returns the input untouched (borrowed) when every field already has a
/// type other than `Other`; otherwise a copy in which each `Other` field is
/// re-guessed. Applying this twice gives the same result as applying it once.
pub fn guess_field_types(frame: &DataFrame) -> Cow<'_, DataFrame> {
    if frame.fields.iter().all(|f| f.field_type != FieldType::Other) {
        return Cow::Borrowed(frame);
    }

    let fields = frame
        .fields
        .iter()
        .map(|field| {
            if field.field_type != FieldType::Other {
                return field.clone();
            }
            let mut guessed = field.clone();
            guessed.field_type = guess_field_type_for_field(field).unwrap_or(FieldType::Other);
            guessed
        })
        .collect();

    Cow::Owned(frame.with_fields(fields, frame.length))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_guess_from_value() {
        assert_eq!(guess_field_type_from_value(&1.5.into()), FieldType::Number);
        assert_eq!(guess_field_type_from_value(&"1.5".into()), FieldType::Number);
        assert_eq!(guess_field_type_from_value(&"-2e10".into()), FieldType::Number);
        assert_eq!(guess_field_type_from_value(&" 12 ".into()), FieldType::Number);
        assert_eq!(guess_field_type_from_value(&"nan".into()), FieldType::Number);
        assert_eq!(guess_field_type_from_value(&".5".into()), FieldType::Number);
        assert_eq!(guess_field_type_from_value(&"True".into()), FieldType::Boolean);
        assert_eq!(guess_field_type_from_value(&"FALSE".into()), FieldType::Boolean);
        assert_eq!(guess_field_type_from_value(&"tRUE".into()), FieldType::String);
        assert_eq!(guess_field_type_from_value(&"12px".into()), FieldType::String);
        assert_eq!(guess_field_type_from_value(&true.into()), FieldType::Boolean);
        assert_eq!(guess_field_type_from_value(&Utc::now().into()), FieldType::Time);
        assert_eq!(guess_field_type_from_value(&json!({"a": 1}).into()), FieldType::Other);
        assert_eq!(guess_field_type_from_value(&FieldValue::Null), FieldType::Other);
    }

    #[test]
    fn test_name_short_circuit() {
        let field = Field::new("Time", FieldType::Other, vec!["hello".into()]);
        assert_eq!(guess_field_type_for_field(&field), Some(FieldType::Time));

        let field = Field::new("DATE", FieldType::Other, vec![]);
        assert_eq!(guess_field_type_for_field(&field), Some(FieldType::Time));

        let field = Field::new("timestamp", FieldType::Other, vec!["x".into()]);
        assert_eq!(guess_field_type_for_field(&field), Some(FieldType::String));
    }

    #[test]
    fn test_first_non_null_value_decides() {
        let field = Field::new(
            "v",
            FieldType::Other,
            vec![FieldValue::Null, "true".into(), 1.into()],
        );
        assert_eq!(guess_field_type_for_field(&field), Some(FieldType::Boolean));

        let empty = Field::new("v", FieldType::Other, vec![FieldValue::Null, FieldValue::Null]);
        assert_eq!(guess_field_type_for_field(&empty), None);
    }

    #[test]
    fn test_typed_frame_is_returned_as_is() {
        let frame = DataFrame::new(vec![
            Field::numbers("a", vec![1.0]),
            Field::strings("b", vec!["x"]),
        ])
        .unwrap();

        assert!(matches!(guess_field_types(&frame), Cow::Borrowed(_)));
    }

    #[test]
    fn test_untyped_fields_are_guessed() {
        let frame = DataFrame::new(vec![
            Field::strings("b", vec!["x"]),
            Field::new("a", FieldType::Other, vec!["1".into()]),
            Field::new("n", FieldType::Other, vec![FieldValue::Null]),
        ])
        .unwrap();

        let guessed = guess_field_types(&frame);
        assert!(matches!(guessed, Cow::Owned(_)));
        assert_eq!(guessed.fields[0].field_type, FieldType::String);
        assert_eq!(guessed.fields[1].field_type, FieldType::Number);
        assert_eq!(guessed.fields[2].field_type, FieldType::Other);
        assert!(guessed.fields[1].shares_values(&frame.fields[1]));
    }

    fn cell() -> impl Strategy<Value = FieldValue> {
        prop_oneof![
            Just(FieldValue::Null),
            any::<bool>().prop_map(FieldValue::Bool),
            (-1e6f64..1e6).prop_map(FieldValue::Number),
            "[a-z0-9.]{0,6}".prop_map(FieldValue::String),
            prop_oneof![Just("true"), Just("False"), Just("1e3"), Just("NaN")]
                .prop_map(FieldValue::from),
        ]
    }

    proptest! {
        #[test]
        fn prop_guess_field_types_is_idempotent(
            columns in prop::collection::vec(prop::collection::vec(cell(), 4), 1..5),
            names in prop::collection::vec(prop_oneof![Just("time"), Just("value"), Just("host")], 5),
        ) {
            let fields = columns
                .into_iter()
                .zip(names)
                .map(|(values, name)| Field::new(name, FieldType::Other, values))
                .collect();
            let frame = DataFrame::new(fields).unwrap();

            let once = guess_field_types(&frame).into_owned();
            let twice = guess_field_types(&once).into_owned();
            prop_assert_eq!(once.to_dto(), twice.to_dto());
        }
    }
}
