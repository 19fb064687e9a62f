//! Value mappings: replace a raw value, or any value within a range, with
//! custom display text. The first matching mapping wins.

use crate::config::{MappingType, ValueMapping};
use crate::value::{parse_float_prefix, FieldValue};

fn is_null_marker(s: &str) -> bool {
    s.trim().eq_ignore_ascii_case("null")
}

/// Numeric reading used for matching: numbers as-is, strings by their
/// leading numeric prefix. Other values have no numeric reading.
fn match_number(value: &FieldValue) -> f64 {
    match value {
        FieldValue::Number(v) => *v,
        FieldValue::String(s) => parse_float_prefix(s),
        _ => f64::NAN,
    }
}

fn value_matches(mapping: &ValueMapping, value: &FieldValue) -> bool {
    let Some(target) = mapping.value.as_deref() else {
        return false;
    };
    if value.is_null() {
        return is_null_marker(target);
    }

    let actual = match_number(value);
    let expected = parse_float_prefix(target);
    if actual.is_nan() || expected.is_nan() {
        return value.as_str() == Some(target);
    }
    actual == expected
}

fn range_matches(mapping: &ValueMapping, value: &FieldValue) -> bool {
    let (Some(from), Some(to)) = (mapping.from.as_deref(), mapping.to.as_deref()) else {
        return false;
    };
    if value.is_null() {
        return is_null_marker(from) && is_null_marker(to);
    }

    let actual = match_number(value);
    let low = parse_float_prefix(from);
    let high = parse_float_prefix(to);
    if actual.is_nan() || low.is_nan() || high.is_nan() {
        return false;
    }
    actual >= low && actual <= high
}

/// First mapping that matches `value`, if any.
pub fn get_mapped_value<'a>(mappings: &'a [ValueMapping], value: &FieldValue) -> Option<&'a ValueMapping> {
    mappings.iter().find(|mapping| match mapping.mapping_type {
        MappingType::ValueToText => value_matches(mapping, value),
        MappingType::RangeToText => range_matches(mapping, value),
    })
}
