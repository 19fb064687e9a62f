//! Field reducers and the `reduce` transformer.
//!
//! A reducer collapses a field to one number. All standard reducers are
//! computed in a single pass and cached on [`Field::calcs`]; asking again
//! for any of them is then a lookup. Results that do not exist (the max of
//! an all-null field) are `NaN`.
//!
//! Null cells follow the field's [`NullValueMode`]: `Null` keeps them as
//! missing values (they count, but never enter sums or extremes), `Ignore`
//! skips them entirely, and `AsZero` reads them as `0`.

use super::matchers::{FieldMatcher, MatcherConfig};
use super::{parse_options, DataTransformerId, FrameOperator};
use crate::config::NullValueMode;
use crate::error::Result;
use crate::field::{Field, FieldCalcs, FieldType};
use crate::frame::DataFrame;
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReducerId {
    Sum,
    Max,
    Min,
    Mean,
    Last,
    First,
    LastNotNull,
    FirstNotNull,
    Count,
    Range,
    Diff,
}

impl ReducerId {
    pub const ALL: [ReducerId; 11] = [
        ReducerId::Sum,
        ReducerId::Max,
        ReducerId::Min,
        ReducerId::Mean,
        ReducerId::Last,
        ReducerId::First,
        ReducerId::LastNotNull,
        ReducerId::FirstNotNull,
        ReducerId::Count,
        ReducerId::Range,
        ReducerId::Diff,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReducerId::Sum => "sum",
            ReducerId::Max => "max",
            ReducerId::Min => "min",
            ReducerId::Mean => "mean",
            ReducerId::Last => "last",
            ReducerId::First => "first",
            ReducerId::LastNotNull => "lastNotNull",
            ReducerId::FirstNotNull => "firstNotNull",
            ReducerId::Count => "count",
            ReducerId::Range => "range",
            ReducerId::Diff => "diff",
        }
    }

    /// Human readable name, used as the column title in reduced output
    pub fn name(&self) -> &'static str {
        match self {
            ReducerId::Sum => "Total",
            ReducerId::Max => "Max",
            ReducerId::Min => "Min",
            ReducerId::Mean => "Mean",
            ReducerId::Last => "Last",
            ReducerId::First => "First",
            ReducerId::LastNotNull => "Last (not null)",
            ReducerId::FirstNotNull => "First (not null)",
            ReducerId::Count => "Count",
            ReducerId::Range => "Range",
            ReducerId::Diff => "Difference",
        }
    }
}

impl fmt::Display for ReducerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute every standard reducer over `field` in one pass.
pub fn standard_calcs(field: &Field) -> FieldCalcs {
    let mode = field.config.null_value_mode.unwrap_or_default();

    let mut sum = 0.0;
    let mut max = f64::NEG_INFINITY;
    let mut min = f64::INFINITY;
    let mut count = 0usize;
    let mut numeric_count = 0usize;
    let mut first = None;
    let mut last = f64::NAN;
    let mut first_not_null = None;
    let mut last_not_null = f64::NAN;

    for value in field.values.iter() {
        let reading = match value {
            FieldValue::Null => match mode {
                NullValueMode::Ignore => continue,
                NullValueMode::AsZero => 0.0,
                NullValueMode::Null => f64::NAN,
            },
            other => other.to_number(),
        };

        count += 1;
        if first.is_none() {
            first = Some(reading);
        }
        last = reading;

        if reading.is_nan() {
            continue;
        }
        numeric_count += 1;
        sum += reading;
        max = max.max(reading);
        min = min.min(reading);
        if first_not_null.is_none() {
            first_not_null = Some(reading);
        }
        last_not_null = reading;
    }

    let (max, min) = if numeric_count == 0 {
        (f64::NAN, f64::NAN)
    } else {
        (max, min)
    };
    let first_not_null = first_not_null.unwrap_or(f64::NAN);
    let mean = if numeric_count == 0 {
        f64::NAN
    } else {
        sum / numeric_count as f64
    };

    let mut calcs = FieldCalcs::new();
    for (id, value) in [
        (ReducerId::Sum, sum),
        (ReducerId::Max, max),
        (ReducerId::Min, min),
        (ReducerId::Mean, mean),
        (ReducerId::Last, last),
        (ReducerId::First, first.unwrap_or(f64::NAN)),
        (ReducerId::LastNotNull, last_not_null),
        (ReducerId::FirstNotNull, first_not_null),
        (ReducerId::Count, count as f64),
        (ReducerId::Range, max - min),
        (ReducerId::Diff, last_not_null - first_not_null),
    ] {
        calcs.insert(id.as_str().to_string(), value);
    }
    calcs
}

/// Requested reducer results for `field`, filling its calcs cache when any
/// of them is missing.
pub fn reduce_field(field: &mut Field, reducers: &[ReducerId]) -> FieldCalcs {
    let cached = field
        .calcs
        .as_ref()
        .is_some_and(|calcs| reducers.iter().all(|id| calcs.contains_key(id.as_str())));
    if !cached {
        let mut calcs = field.calcs.take().unwrap_or_default();
        calcs.extend(standard_calcs(field));
        field.calcs = Some(calcs);
    }

    let calcs = field.calcs.as_ref();
    reducers
        .iter()
        .filter_map(|id| {
            calcs
                .and_then(|c| c.get(id.as_str()))
                .map(|value| (id.as_str().to_string(), *value))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReduceTransformerOptions {
    pub reducers: Vec<ReducerId>,
    /// Which fields to reduce; numeric fields when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<MatcherConfig>,
}

pub(crate) fn default_options() -> Value {
    json!({ "reducers": ["max"] })
}

pub(crate) fn operator(options: &Value) -> Result<FrameOperator> {
    let options: ReduceTransformerOptions = parse_options(DataTransformerId::Reduce, options)?;
    let matcher = match &options.fields {
        Some(config) => FieldMatcher::from_config(config)?,
        None => FieldMatcher::Numeric,
    };
    let reducers = options.reducers;
    Ok(Box::new(move |frames: Vec<DataFrame>| vec![reduce_frames(&frames, &matcher, &reducers)]))
}

/// One row per matching field across all `frames`: the field's display
/// name followed by one column per reducer.
pub fn reduce_frames(frames: &[DataFrame], matcher: &FieldMatcher, reducers: &[ReducerId]) -> DataFrame {
    let mut names = Vec::new();
    let mut columns: Vec<Vec<FieldValue>> = vec![Vec::new(); reducers.len()];

    for frame in frames {
        for field in frame.fields.iter().filter(|f| matcher.matches(f)) {
            let mut field = field.clone();
            let calcs = reduce_field(&mut field, reducers);
            names.push(FieldValue::from(field.display_name()));
            for (column, id) in columns.iter_mut().zip(reducers) {
                let value = calcs.get(id.as_str()).copied().unwrap_or(f64::NAN);
                column.push(FieldValue::Number(value));
            }
        }
    }

    let length = names.len();
    let mut fields = vec![Field::new("Field", FieldType::String, names)];
    fields.extend(
        reducers
            .iter()
            .zip(columns)
            .map(|(id, values)| Field::new(id.name(), FieldType::Number, values)),
    );

    DataFrame {
        fields,
        length,
        ..DataFrame::default()
    }
}
