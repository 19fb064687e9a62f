/// QueryFrame Field Implementation
///
/// A Field is a named, typed column: a shared `Vector` of cell values plus
/// display configuration. Fields are cheap to clone; clones share the same
/// value storage, which is what lets transformations hand back untouched
/// columns without copying them.

use crate::config::FieldConfig;
use crate::display::{DisplayProcessor, DisplayValue};
use crate::value::{parse_number, FieldValue};
use crate::vector::{ArrayVector, Vector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::rc::Rc;

/// Field data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Time,
    Number,
    String,
    Boolean,
    /// Unknown or opaque (arrays, objects). Type inference may refine it.
    #[default]
    Other,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Time => "time",
            FieldType::Number => "number",
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
            FieldType::Other => "other",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Labels = BTreeMap<String, String>;

/// Cached reducer results keyed by reducer id
pub type FieldCalcs = BTreeMap<String, f64>;

/// Converts raw input into the field's value representation. Set by
/// [`MutableDataFrame`](crate::frame::MutableDataFrame) from the field type
/// and applied to every appended row; callers may install their own.
pub type ParseFn = Rc<dyn Fn(&FieldValue) -> FieldValue>;

/// Standard parser for text arriving in a field of `field_type`.
///
/// Only strings are converted; every other value passes through. Number
/// fields read numeric text, boolean fields read `true` in any casing,
/// and time fields read RFC 3339 or epoch-millisecond text.
pub fn default_parser(field_type: FieldType) -> Option<ParseFn> {
    let parse: ParseFn = match field_type {
        FieldType::Number => Rc::new(|value: &FieldValue| match value {
            FieldValue::String(s) => FieldValue::Number(parse_number(s)),
            other => other.clone(),
        }),
        FieldType::Boolean => Rc::new(|value: &FieldValue| match value {
            FieldValue::String(s) => FieldValue::Bool(s.trim().eq_ignore_ascii_case("true")),
            other => other.clone(),
        }),
        FieldType::Time => Rc::new(|value: &FieldValue| match value {
            FieldValue::String(_) => value
                .to_datetime()
                .map(|t| FieldValue::Number(t.timestamp_millis() as f64))
                .unwrap_or_else(|| value.clone()),
            other => other.clone(),
        }),
        FieldType::String | FieldType::Other => return None,
    };
    Some(parse)
}

pub type FieldValues = Rc<dyn Vector<FieldValue>>;

#[derive(Clone)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    pub config: FieldConfig,
    pub values: FieldValues,
    pub labels: Option<Labels>,
    pub calcs: Option<FieldCalcs>,
    pub parse: Option<ParseFn>,
    /// Derived; not part of the field's identity
    pub display: Option<DisplayProcessor>,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType, values: Vec<FieldValue>) -> Self {
        Self::with_storage(name, field_type, Rc::new(ArrayVector::from(values)))
    }

    pub fn with_storage(name: impl Into<String>, field_type: FieldType, values: FieldValues) -> Self {
        Field {
            name: name.into(),
            field_type,
            config: FieldConfig::default(),
            values,
            labels: None,
            calcs: None,
            parse: None,
            display: None,
        }
    }

    /// Convenience constructor for numeric columns
    pub fn numbers(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(
            name,
            FieldType::Number,
            values.into_iter().map(FieldValue::Number).collect(),
        )
    }

    /// Convenience constructor for string columns
    pub fn strings<S: Into<String>>(name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Self::new(
            name,
            FieldType::String,
            values.into_iter().map(|s| FieldValue::String(s.into())).collect(),
        )
    }

    /// Convenience constructor for time columns holding epoch milliseconds
    pub fn times(name: impl Into<String>, millis: impl IntoIterator<Item = f64>) -> Self {
        Self::new(
            name,
            FieldType::Time,
            millis.into_iter().map(FieldValue::Number).collect(),
        )
    }

    pub fn with_config(mut self, config: FieldConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FieldValue> {
        self.values.get(index)
    }

    /// Copy of this field over different storage. Cached calcs describe the
    /// old values and are dropped.
    pub fn replace_values(&self, values: FieldValues) -> Field {
        Field {
            values,
            calcs: None,
            ..self.clone()
        }
    }

    /// Display title: configured title, else the field name
    pub fn display_name(&self) -> &str {
        match self.config.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => &self.name,
        }
    }

    /// Apply the attached display processor, falling back to plain text.
    pub fn display_value(&self, index: usize) -> Option<DisplayValue> {
        let value = self.values.get(index)?;
        Some(match &self.display {
            Some(display) => display(value),
            None => DisplayValue::plain(value),
        })
    }

    /// True when both fields read from the very same storage
    pub fn shares_values(&self, other: &Field) -> bool {
        Rc::ptr_eq(&self.values, &other.values)
    }
}

impl Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Field {{ name: '{}', type: {}, len: {}, display: {} }}",
            self.name,
            self.field_type,
            self.len(),
            self.display.is_some()
        )
    }
}
