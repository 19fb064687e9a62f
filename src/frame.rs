/// QueryFrame DataFrame Implementation
///
/// A DataFrame is an ordered collection of equal-length fields plus a row
/// count. Frames are value-like: operations return new frames that share
/// unchanged field storage with their input. The only mutable form is the
/// `MutableDataFrame` builder used while a frame is being assembled.
///
/// # Examples
///
/// ```
/// use queryframe::{DataFrame, Field};
///
/// let frame = DataFrame::new(vec![
///     Field::times("Time", vec![1000.0, 2000.0]),
///     Field::numbers("Value", vec![1.0, 2.0]),
/// ])
/// .unwrap();
///
/// assert_eq!(frame.length, 2);
/// assert_eq!(frame.time_field().map(|(index, _)| index), Some(0));
/// ```

use crate::config::FieldConfig;
use crate::error::{FrameError, Result};
use crate::field::{default_parser, Field, FieldType, Labels, ParseFn};
use crate::inference::guess_type_for_values;
use crate::value::FieldValue;
use crate::vector::{ArrayVector, Vector};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::rc::Rc;

/// Opaque metadata bag carried alongside a query result
pub type QueryResultMeta = Map<String, Value>;

#[derive(Debug, Clone, Default)]
pub struct DataFrame {
    pub name: Option<String>,
    pub ref_id: Option<String>,
    pub meta: Option<QueryResultMeta>,
    pub fields: Vec<Field>,
    pub length: usize,
}

impl DataFrame {
    /// Build a frame from fields, checking they all have the same length.
    pub fn new(fields: Vec<Field>) -> Result<Self> {
        let length = fields.first().map(Field::len).unwrap_or(0);
        for field in &fields {
            if field.len() != length {
                return Err(FrameError::LengthMismatch {
                    field: field.name.clone(),
                    expected: length,
                    actual: field.len(),
                });
            }
        }
        Ok(DataFrame {
            fields,
            length,
            ..DataFrame::default()
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_ref_id(mut self, ref_id: impl Into<String>) -> Self {
        self.ref_id = Some(ref_id.into());
        self
    }

    pub fn with_meta(mut self, meta: QueryResultMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// First field with the given name
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The time axis: the first time-typed field
    pub fn time_field(&self) -> Option<(usize, &Field)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, f)| f.field_type == FieldType::Time)
    }

    /// Values of row `index` across all fields, in field order
    pub fn row(&self, index: usize) -> Vec<FieldValue> {
        self.fields
            .iter()
            .map(|f| f.get(index).cloned().unwrap_or_default())
            .collect()
    }

    /// True when the metadata marks this frame as a JSON-document frame
    pub fn is_json_docs(&self) -> bool {
        self.meta
            .as_ref()
            .and_then(|m| m.get("json"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Same shape and metadata, different fields
    pub fn with_fields(&self, fields: Vec<Field>, length: usize) -> DataFrame {
        DataFrame {
            name: self.name.clone(),
            ref_id: self.ref_id.clone(),
            meta: self.meta.clone(),
            fields,
            length,
        }
    }

    /// JSON-friendly copy with values materialized as plain arrays.
    pub fn to_dto(&self) -> DataFrameDto {
        DataFrameDto {
            name: self.name.clone(),
            ref_id: self.ref_id.clone(),
            meta: self.meta.clone(),
            fields: self
                .fields
                .iter()
                .map(|f| FieldDto {
                    name: f.name.clone(),
                    field_type: Some(f.field_type),
                    config: f.config.clone(),
                    values: f.values.to_vec(),
                    labels: f.labels.clone(),
                })
                .collect(),
            rows: None,
        }
    }

    pub fn from_dto(dto: DataFrameDto) -> DataFrame {
        MutableDataFrame::from_dto(dto).into_frame()
    }
}

/// A field as it travels on the wire: type optional, values a plain array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDto {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default)]
    pub config: FieldConfig,
    #[serde(default)]
    pub values: Vec<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,
}

/// A frame as it travels on the wire. `rows` is the deprecated row-major
/// form still accepted on input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFrameDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<QueryResultMeta>,
    pub fields: Vec<FieldDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Vec<FieldValue>>>,
}

#[derive(Clone)]
struct MutableField {
    name: String,
    field_type: FieldType,
    config: FieldConfig,
    labels: Option<Labels>,
    parse: Option<ParseFn>,
    values: ArrayVector<FieldValue>,
}

impl fmt::Debug for MutableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MutableField {{ name: '{}', type: {}, len: {}, parse: {} }}",
            self.name,
            self.field_type,
            self.values.len(),
            self.parse.is_some()
        )
    }
}

impl MutableField {
    fn append(&mut self, value: FieldValue) {
        let value = match &self.parse {
            Some(parse) => parse(&value),
            None => value,
        };
        self.values.append(value);
    }
}

/// Builder used while a frame is assembled: fields can be added and rows
/// appended. Freeze it with [`MutableDataFrame::into_frame`].
#[derive(Debug, Clone, Default)]
pub struct MutableDataFrame {
    pub name: Option<String>,
    pub ref_id: Option<String>,
    pub meta: Option<QueryResultMeta>,
    fields: Vec<MutableField>,
    length: usize,
}

impl MutableDataFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a DTO. Row-major `rows` are not applied here; see
    /// [`MutableDataFrame::append_row`].
    pub fn from_dto(dto: DataFrameDto) -> Self {
        let mut frame = MutableDataFrame {
            name: dto.name,
            ref_id: dto.ref_id,
            meta: dto.meta,
            fields: Vec::with_capacity(dto.fields.len()),
            length: 0,
        };
        for field in dto.fields {
            frame.add_field(field);
        }
        frame
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Add a column. A missing type is guessed from the values; a blank name
    /// becomes `Field N`. Columns shorter than the frame are padded with
    /// nulls, and a longer column grows every other column to match.
    pub fn add_field(&mut self, dto: FieldDto) {
        let name = if dto.name.is_empty() {
            format!("Field {}", self.fields.len() + 1)
        } else {
            dto.name
        };

        let mut values = ArrayVector::from(dto.values);
        let field_type = match dto.field_type {
            Some(t) => t,
            None => guess_type_for_values(&name, &values).unwrap_or(FieldType::Other),
        };

        let added = values.len();
        while values.len() < self.length {
            values.append(FieldValue::Null);
        }
        if added > self.length {
            for field in &mut self.fields {
                while field.values.len() < added {
                    field.values.append(FieldValue::Null);
                }
            }
            self.length = added;
        }

        self.fields.push(MutableField {
            name,
            field_type,
            config: dto.config,
            labels: dto.labels,
            parse: default_parser(field_type),
            values,
        });
    }

    /// Replace the parser applied to values appended to the named field.
    /// Returns false when no field has that name.
    pub fn set_parser(&mut self, name: &str, parse: Option<ParseFn>) -> bool {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => {
                field.parse = parse;
                true
            }
            None => false,
        }
    }

    /// Append one row-major record. Each value goes through its field's
    /// parser. Missing trailing values are null; extra values create new
    /// unnamed fields.
    pub fn append_row(&mut self, row: Vec<FieldValue>) {
        while self.fields.len() < row.len() {
            let mut values = ArrayVector::with_capacity(self.length + 1);
            for _ in 0..self.length {
                values.append(FieldValue::Null);
            }
            let name = format!("Field {}", self.fields.len() + 1);
            let field_type = row
                .get(self.fields.len())
                .map(crate::inference::guess_field_type_from_value)
                .unwrap_or(FieldType::Other);
            self.fields.push(MutableField {
                name,
                field_type,
                config: FieldConfig::default(),
                labels: None,
                parse: default_parser(field_type),
                values,
            });
        }

        let mut row = row.into_iter();
        for field in &mut self.fields {
            field.append(row.next().unwrap_or_default());
        }
        self.length += 1;
    }

    /// Freeze into an immutable frame
    pub fn into_frame(self) -> DataFrame {
        let fields = self
            .fields
            .into_iter()
            .map(|f| {
                let mut field = Field::with_storage(f.name, f.field_type, Rc::new(f.values));
                field.config = f.config;
                field.labels = f.labels;
                field.parse = f.parse;
                field
            })
            .collect();

        DataFrame {
            name: self.name,
            ref_id: self.ref_id,
            meta: self.meta,
            fields,
            length: self.length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_frame_rejects_ragged_fields() {
        let result = DataFrame::new(vec![
            Field::numbers("a", vec![1.0, 2.0]),
            Field::numbers("b", vec![1.0]),
        ]);
        match result {
            Err(FrameError::LengthMismatch { field, expected, actual }) => {
                assert_eq!(field, "b");
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("expected length mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_time_field_first_match_wins() {
        let frame = DataFrame::new(vec![
            Field::numbers("value", vec![1.0]),
            Field::times("t1", vec![1.0]),
            Field::times("t2", vec![2.0]),
        ])
        .unwrap();

        let (index, field) = frame.time_field().unwrap();
        assert_eq!(index, 1);
        assert_eq!(field.name, "t1");
    }

    #[test]
    fn test_row_values() {
        let frame = DataFrame::new(vec![
            Field::strings("host", vec!["a", "b"]),
            Field::numbers("cpu", vec![0.5, 0.7]),
        ])
        .unwrap();

        assert_eq!(frame.row(1), vec![FieldValue::from("b"), FieldValue::Number(0.7)]);
    }

    #[test]
    fn test_dto_round_trip() {
        let dto: DataFrameDto = serde_json::from_value(json!({
            "name": "cpu",
            "refId": "A",
            "fields": [
                {"name": "time", "values": [1000, 2000]},
                {"name": "value", "values": [1.5, null], "config": {"unit": "percent"}},
                {"name": "host", "values": ["a", "b"], "labels": {"dc": "east"}}
            ]
        }))
        .unwrap();

        let frame = DataFrame::from_dto(dto);
        assert_eq!(frame.length, 2);
        assert_eq!(frame.ref_id.as_deref(), Some("A"));
        assert_eq!(frame.fields[0].field_type, FieldType::Time);
        assert_eq!(frame.fields[1].field_type, FieldType::Number);
        assert_eq!(frame.fields[2].field_type, FieldType::String);

        let out = serde_json::to_value(frame.to_dto()).unwrap();
        assert_eq!(out["fields"][0]["values"], json!([1000, 2000]));
        assert_eq!(out["fields"][1]["values"], json!([1.5, null]));
        assert_eq!(out["fields"][1]["config"]["unit"], json!("percent"));
        assert_eq!(out["fields"][2]["labels"]["dc"], json!("east"));
        assert_eq!(out["fields"][0]["type"], json!("time"));
    }

    #[test]
    fn test_mutable_frame_pads_and_grows() {
        let mut frame = MutableDataFrame::new();
        frame.add_field(FieldDto {
            name: "a".to_string(),
            values: vec![1.into(), 2.into()],
            ..FieldDto::default()
        });
        frame.add_field(FieldDto {
            name: "b".to_string(),
            values: vec![1.into(), 2.into(), 3.into()],
            ..FieldDto::default()
        });
        frame.add_field(FieldDto::default());

        let frame = frame.into_frame();
        assert_eq!(frame.length, 3);
        assert_eq!(frame.fields[0].get(2), Some(&FieldValue::Null));
        assert_eq!(frame.fields[2].name, "Field 3");
        assert_eq!(frame.fields[2].field_type, FieldType::Other);
        for field in &frame.fields {
            assert_eq!(field.len(), 3);
        }
    }

    #[test]
    fn test_append_row() {
        let mut frame = MutableDataFrame::new();
        frame.add_field(FieldDto {
            name: "a".to_string(),
            field_type: Some(FieldType::Number),
            ..FieldDto::default()
        });

        frame.append_row(vec![1.into()]);
        frame.append_row(vec![2.into(), "x".into()]);
        frame.append_row(vec![]);

        let frame = frame.into_frame();
        assert_eq!(frame.length, 3);
        assert_eq!(frame.fields.len(), 2);
        assert_eq!(frame.fields[1].name, "Field 2");
        assert_eq!(frame.fields[1].field_type, FieldType::String);
        assert_eq!(frame.fields[1].values.to_vec(), vec![FieldValue::Null, "x".into(), FieldValue::Null]);
        assert_eq!(frame.fields[0].get(2), Some(&FieldValue::Null));
    }

    #[test]
    fn test_append_row_parses_text() {
        let mut frame = MutableDataFrame::new();
        for (name, field_type) in [("time", FieldType::Time), ("value", FieldType::Number), ("up", FieldType::Boolean)] {
            frame.add_field(FieldDto {
                name: name.to_string(),
                field_type: Some(field_type),
                ..FieldDto::default()
            });
        }
        frame.add_field(FieldDto {
            name: "host".to_string(),
            field_type: Some(FieldType::String),
            ..FieldDto::default()
        });

        frame.append_row(vec!["1000".into(), "1.5".into(), "true".into(), "42".into()]);
        frame.append_row(vec![2000.into(), 2.into(), false.into(), "web".into()]);

        assert!(frame.set_parser("host", Some(Rc::new(|v: &FieldValue| FieldValue::from(v.to_text().to_uppercase())))));
        assert!(!frame.set_parser("missing", None));
        frame.append_row(vec![FieldValue::Null, FieldValue::Null, FieldValue::Null, "db".into()]);

        let frame = frame.into_frame();
        assert_eq!(frame.row(0), vec![FieldValue::from(1000), 1.5.into(), true.into(), "42".into()]);
        assert_eq!(frame.row(1), vec![FieldValue::from(2000), 2.into(), false.into(), "web".into()]);
        assert_eq!(frame.fields[3].get(2), Some(&FieldValue::from("DB")));
        assert!(frame.fields[1].parse.is_some());
        assert!(frame.fields[3].parse.is_some());
    }

    #[test]
    fn test_json_docs_flag() {
        let mut meta = QueryResultMeta::new();
        meta.insert("json".to_string(), json!(true));
        let frame = DataFrame::default().with_meta(meta);
        assert!(frame.is_json_docs());
        assert!(!DataFrame::default().is_json_docs());
    }
}
