/// QueryFrame Format Adapters
///
/// Query responses still arrive in several legacy shapes besides the
/// canonical frame DTO: row-major tables, `[value, time]` point lists,
/// graph series and JSON document series. Each shape has its own typed
/// payload struct; [`ResponsePayload::from_json`] picks the shape by
/// looking for its marker key, validates it, and the payload then converts
/// into a [`DataFrame`].
///
/// Dispatch order (first match wins): `fields`, `type == "docs"`,
/// `datapoints`, `data`, `columns`.
///
/// # Examples
///
/// ```
/// use queryframe::convert::to_data_frame;
/// use serde_json::json;
///
/// let frame = to_data_frame(json!({
///     "target": "cpu",
///     "datapoints": [[0.5, 1000], [0.7, 2000]]
/// }))
/// .unwrap();
///
/// assert_eq!(frame.length, 2);
/// assert_eq!(frame.fields[0].name, "cpu");
/// assert_eq!(frame.fields[1].name, "Time");
/// ```

use crate::config::FieldConfig;
use crate::error::{FrameError, Result};
use crate::field::{Field, FieldType, Labels};
use crate::frame::{DataFrame, DataFrameDto, MutableDataFrame, QueryResultMeta};
use crate::inference::{guess_field_type_for_field, guess_field_types, guess_type_for_values};
use crate::value::FieldValue;
use crate::vector::ArrayVector;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::rc::Rc;

/// One `[value, time]` point of a legacy time series
pub type TimeSeriesPoint = (FieldValue, FieldValue);

/// Legacy table column: a field config plus the column title in `text`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Column {
    #[serde(default)]
    pub text: String,
    #[serde(flatten)]
    pub config: FieldConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<FieldValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<QueryResultMeta>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    #[serde(default)]
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Labels>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<QueryResultMeta>,
    pub datapoints: Vec<TimeSeriesPoint>,
}

/// Graph series; each point is `[time, value]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSeries {
    #[serde(default)]
    pub label: String,
    pub data: Vec<TimeSeriesPoint>,
}

/// Series whose points are opaque JSON documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocsSeries {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Labels>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filterable: Option<bool>,
    pub datapoints: Vec<Value>,
}

/// A validated inbound payload, one variant per supported shape
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    Frame(DataFrameDto),
    Docs(DocsSeries),
    TimeSeries(TimeSeries),
    Graph(GraphSeries),
    Table(TableData),
}

/// Raised when a payload uses a shape that still converts but is on its
/// way out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationNotice {
    pub source: String,
    pub deprecated: String,
    pub replacement: String,
}

impl fmt::Display for DeprecationNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Deprecation warning] {}: {} is deprecated. Use {} instead",
            self.source, self.deprecated, self.replacement
        )
    }
}

/// A converted frame plus any non-fatal diagnostics from the conversion
#[derive(Debug, Clone)]
pub struct Conversion {
    pub frame: DataFrame,
    pub notices: Vec<DeprecationNotice>,
}

/// Output of [`to_legacy_response_data`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LegacyResponse {
    TimeSeries(TimeSeries),
    Docs(DocsSeries),
    Table(TableData),
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_shape<T: for<'de> Deserialize<'de>>(shape: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| FrameError::Format(format!("invalid {} payload: {}", shape, e)))
}

fn check_table_rows(map: &Map<String, Value>) -> Result<()> {
    let rows = match map.get("rows") {
        Some(Value::Array(rows)) => rows,
        Some(other) => {
            return Err(FrameError::Format(format!(
                "expected table rows to be array, got {}",
                json_kind(other)
            )))
        }
        None => return Err(FrameError::Format("expected table rows to be array, got undefined".to_string())),
    };

    match rows.iter().position(|row| !row.is_array()) {
        Some(index) => Err(FrameError::Format(format!(
            "expected table row {} to be array, got {}",
            index,
            json_kind(&rows[index])
        ))),
        None => Ok(()),
    }
}

impl ResponsePayload {
    /// Identify and validate the shape of a raw payload.
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Object(map) = &value else {
            log::warn!("can not convert {} payload to a data frame", json_kind(&value));
            return Err(FrameError::UnsupportedFormat);
        };

        if map.contains_key("fields") {
            return Ok(ResponsePayload::Frame(parse_shape("data frame", value)?));
        }
        if map.get("type").and_then(Value::as_str) == Some("docs") {
            return Ok(ResponsePayload::Docs(parse_shape("docs", value)?));
        }
        if map.contains_key("datapoints") {
            return Ok(ResponsePayload::TimeSeries(parse_shape("time series", value)?));
        }
        if map.contains_key("data") {
            return Ok(ResponsePayload::Graph(parse_shape("graph series", value)?));
        }
        if map.contains_key("columns") {
            check_table_rows(map)?;
            return Ok(ResponsePayload::Table(parse_shape("table", value)?));
        }

        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        log::warn!("can not convert payload with keys {:?} to a data frame", keys);
        Err(FrameError::UnsupportedFormat)
    }

    pub fn into_conversion(self) -> Conversion {
        let mut notices = Vec::new();
        let frame = match self {
            ResponsePayload::Frame(mut dto) => {
                let rows = dto.rows.take();
                let mut builder = MutableDataFrame::from_dto(dto);
                match rows {
                    Some(rows) => {
                        for row in rows {
                            builder.append_row(row);
                        }
                        notices.push(DeprecationNotice {
                            source: "DataFrame".to_string(),
                            deprecated: ".rows".to_string(),
                            replacement: "columnar format".to_string(),
                        });
                        guess_field_types(&builder.into_frame()).into_owned()
                    }
                    None => builder.into_frame(),
                }
            }
            ResponsePayload::Docs(docs) => docs_to_frame(docs),
            ResponsePayload::TimeSeries(series) => time_series_to_frame(series),
            ResponsePayload::Graph(series) => graph_series_to_frame(series),
            ResponsePayload::Table(table) => table_to_frame(table),
        };
        Conversion { frame, notices }
    }

    pub fn into_frame(self) -> DataFrame {
        self.into_conversion().frame
    }
}

fn non_empty(name: &str) -> Option<String> {
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn table_to_frame(table: TableData) -> DataFrame {
    let length = table.rows.len();
    let mut columns: Vec<ArrayVector<FieldValue>> =
        table.columns.iter().map(|_| ArrayVector::with_capacity(length)).collect();

    for row in table.rows {
        let mut cells = row.into_iter();
        for column in columns.iter_mut() {
            column.append(cells.next().unwrap_or_default());
        }
    }

    let fields = table
        .columns
        .into_iter()
        .zip(columns)
        .map(|(column, values)| {
            let field_type = guess_type_for_values(&column.text, &values).unwrap_or(FieldType::Other);
            Field::with_storage(column.text, field_type, Rc::new(values)).with_config(column.config)
        })
        .collect();

    DataFrame {
        name: table.name,
        ref_id: table.ref_id,
        meta: table.meta,
        fields,
        length,
    }
}

fn time_series_to_frame(series: TimeSeries) -> DataFrame {
    let length = series.datapoints.len();
    let (values, times): (Vec<FieldValue>, Vec<FieldValue>) = series.datapoints.into_iter().unzip();

    let config = FieldConfig {
        unit: series.unit,
        ..FieldConfig::default()
    };
    let mut value_field = Field::new(
        non_empty(&series.target).unwrap_or_else(|| "Value".to_string()),
        FieldType::Number,
        values,
    )
    .with_config(config);
    value_field.labels = series.tags;

    DataFrame {
        name: non_empty(&series.target),
        ref_id: series.ref_id,
        meta: series.meta,
        fields: vec![value_field, Field::new("Time", FieldType::Time, times)],
        length,
    }
}

fn graph_series_to_frame(series: GraphSeries) -> DataFrame {
    let length = series.data.len();
    let (times, values): (Vec<FieldValue>, Vec<FieldValue>) = series.data.into_iter().unzip();

    let value_field = Field::new(
        non_empty(&series.label).unwrap_or_else(|| "Value".to_string()),
        FieldType::Number,
        values,
    );
    let time_field = Field::new("Time", FieldType::Time, times)
        .with_config(FieldConfig::default().with_unit("dateTimeAsIso"));

    DataFrame {
        name: non_empty(&series.label),
        fields: vec![value_field, time_field],
        length,
        ..DataFrame::default()
    }
}

fn docs_to_frame(docs: DocsSeries) -> DataFrame {
    let length = docs.datapoints.len();
    let config = FieldConfig {
        unit: docs.unit,
        filterable: docs.filterable,
        ..FieldConfig::default()
    };
    let mut field = Field::new(
        docs.target.clone(),
        FieldType::Other,
        docs.datapoints.into_iter().map(FieldValue::from).collect(),
    )
    .with_config(config);
    field.labels = docs.tags;

    let mut meta = QueryResultMeta::new();
    meta.insert("json".to_string(), Value::Bool(true));

    DataFrame {
        name: non_empty(&docs.target),
        ref_id: non_empty(&docs.target),
        meta: Some(meta),
        fields: vec![field],
        length,
    }
}

/// Identify, validate and convert a payload, returning diagnostics rather
/// than logging them.
pub fn convert_payload(value: Value) -> Result<Conversion> {
    Ok(ResponsePayload::from_json(value)?.into_conversion())
}

/// Convert any supported payload into a frame. Deprecation notices are
/// logged as warnings.
pub fn to_data_frame(value: Value) -> Result<DataFrame> {
    let conversion = convert_payload(value)?;
    for notice in &conversion.notices {
        log::warn!("{}", notice);
    }
    Ok(conversion.frame)
}

pub fn is_data_frame(value: &Value) -> bool {
    value.get("fields").is_some()
}

pub fn is_table_data(value: &Value) -> bool {
    value.get("columns").is_some()
}

/// Convert a frame back into the legacy shape it most resembles.
///
/// Two fields whose second is time become a time series; frames flagged
/// as JSON documents become a docs series; anything else is a table.
pub fn to_legacy_response_data(frame: &DataFrame) -> LegacyResponse {
    let fields = &frame.fields;
    let target = fields
        .first()
        .and_then(|f| non_empty(&f.name))
        .or_else(|| frame.name.clone())
        .unwrap_or_default();

    if fields.len() == 2 {
        let second = match fields[1].field_type {
            FieldType::Other => guess_field_type_for_field(&fields[1]).unwrap_or(FieldType::Other),
            known => known,
        };
        if second == FieldType::Time {
            let datapoints = (0..frame.length)
                .map(|i| {
                    (
                        fields[0].get(i).cloned().unwrap_or_default(),
                        fields[1].get(i).cloned().unwrap_or_default(),
                    )
                })
                .collect();
            return LegacyResponse::TimeSeries(TimeSeries {
                alias: Some(target.clone()),
                target,
                tags: fields[0].labels.clone(),
                unit: fields[0].config.unit.clone(),
                ref_id: frame.ref_id.clone(),
                meta: frame.meta.clone(),
                datapoints,
            });
        }
    }

    if frame.is_json_docs() {
        if let Some(docs) = fields.first() {
            return LegacyResponse::Docs(DocsSeries {
                kind: "docs".to_string(),
                alias: Some(target.clone()),
                target,
                tags: None,
                unit: None,
                filterable: docs.config.filterable,
                datapoints: docs.values.iter().map(FieldValue::to_json).collect(),
            });
        }
    }

    LegacyResponse::Table(TableData {
        name: frame.name.clone(),
        columns: fields
            .iter()
            .map(|f| Column {
                text: f.name.clone(),
                config: f.config.clone(),
            })
            .collect(),
        rows: (0..frame.length).map(|i| frame.row(i)).collect(),
        ref_id: frame.ref_id.clone(),
        meta: frame.meta.clone(),
        kind: Some("table".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_time_series() {
        let frame = to_data_frame(json!({
            "target": "cpu",
            "tags": {"host": "a"},
            "unit": "percent",
            "refId": "A",
            "datapoints": [[100, 1], [200, 2]]
        }))
        .unwrap();

        assert_eq!(frame.name.as_deref(), Some("cpu"));
        assert_eq!(frame.ref_id.as_deref(), Some("A"));
        assert_eq!(frame.length, 2);

        let value = &frame.fields[0];
        assert_eq!(value.name, "cpu");
        assert_eq!(value.field_type, FieldType::Number);
        assert_eq!(value.config.unit.as_deref(), Some("percent"));
        assert_eq!(value.labels.as_ref().unwrap()["host"], "a");
        assert_eq!(value.get(1), Some(&FieldValue::Number(200.0)));

        let time = &frame.fields[1];
        assert_eq!(time.name, "Time");
        assert_eq!(time.field_type, FieldType::Time);
        assert_eq!(time.get(0), Some(&FieldValue::Number(1.0)));
    }

    #[test]
    fn test_time_series_without_target() {
        let frame = to_data_frame(json!({"datapoints": []})).unwrap();
        assert_eq!(frame.fields[0].name, "Value");
        assert_eq!(frame.length, 0);
        assert!(frame.name.is_none());
    }

    #[test]
    fn test_graph_series() {
        let frame = to_data_frame(json!({"label": "load", "data": [[1000, 5], [2000, 6]]})).unwrap();

        assert_eq!(frame.fields[0].name, "load");
        assert_eq!(frame.fields[0].get(0), Some(&FieldValue::Number(5.0)));
        assert_eq!(frame.fields[1].get(0), Some(&FieldValue::Number(1000.0)));
        assert_eq!(frame.fields[1].config.unit.as_deref(), Some("dateTimeAsIso"));
    }

    #[test]
    fn test_table() {
        let frame = to_data_frame(json!({
            "columns": [{"text": "Time"}, {"text": "Value", "unit": "ms", "sort": true}, {"text": "Host"}],
            "rows": [[1000, "1.5", "a"], [2000, "2.5"]],
            "refId": "B"
        }))
        .unwrap();

        assert_eq!(frame.length, 2);
        assert_eq!(frame.ref_id.as_deref(), Some("B"));
        assert_eq!(frame.fields[0].field_type, FieldType::Time);
        assert_eq!(frame.fields[1].field_type, FieldType::Number);
        assert_eq!(frame.fields[1].config.unit.as_deref(), Some("ms"));
        assert_eq!(frame.fields[1].config.custom.get("sort"), Some(&json!(true)));
        assert_eq!(frame.fields[2].field_type, FieldType::String);
        assert_eq!(frame.fields[2].get(1), Some(&FieldValue::Null));
    }

    #[test]
    fn test_table_rows_must_be_arrays() {
        let err = to_data_frame(json!({"columns": [{"text": "a"}], "rows": {"a": 1}})).unwrap_err();
        assert!(matches!(err, FrameError::Format(_)));

        let err = to_data_frame(json!({"columns": [{"text": "a"}]})).unwrap_err();
        assert!(matches!(err, FrameError::Format(_)));

        let err = to_data_frame(json!({"columns": [{"text": "a"}], "rows": [[1], 2]})).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_docs() {
        let frame = to_data_frame(json!({
            "type": "docs",
            "target": "logs",
            "filterable": true,
            "datapoints": [{"msg": "a"}, {"msg": "b"}]
        }))
        .unwrap();

        assert!(frame.is_json_docs());
        assert_eq!(frame.ref_id.as_deref(), Some("logs"));
        assert_eq!(frame.fields.len(), 1);
        assert_eq!(frame.fields[0].field_type, FieldType::Other);
        assert_eq!(frame.fields[0].config.filterable, Some(true));

        match to_legacy_response_data(&frame) {
            LegacyResponse::Docs(docs) => {
                assert_eq!(docs.kind, "docs");
                assert_eq!(docs.target, "logs");
                assert_eq!(docs.datapoints, vec![json!({"msg": "a"}), json!({"msg": "b"})]);
                assert_eq!(docs.filterable, Some(true));
            }
            other => panic!("expected docs, got {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_order() {
        // `fields` wins over every other marker
        let payload = ResponsePayload::from_json(json!({"fields": [], "datapoints": [], "columns": []})).unwrap();
        assert!(matches!(payload, ResponsePayload::Frame(_)));

        let payload = ResponsePayload::from_json(json!({"type": "docs", "datapoints": [1]})).unwrap();
        assert!(matches!(payload, ResponsePayload::Docs(_)));

        let payload = ResponsePayload::from_json(json!({"datapoints": [], "data": []})).unwrap();
        assert!(matches!(payload, ResponsePayload::TimeSeries(_)));

        let payload = ResponsePayload::from_json(json!({"data": [], "columns": []})).unwrap();
        assert!(matches!(payload, ResponsePayload::Graph(_)));
    }

    #[test]
    fn test_unsupported_payload() {
        assert!(matches!(
            to_data_frame(json!({"series": []})),
            Err(FrameError::UnsupportedFormat)
        ));
        assert!(matches!(to_data_frame(json!([1, 2])), Err(FrameError::UnsupportedFormat)));
        assert!(matches!(to_data_frame(json!(null)), Err(FrameError::UnsupportedFormat)));
    }

    #[test]
    fn test_malformed_shape_is_format_error() {
        let err = to_data_frame(json!({"datapoints": "nope"})).unwrap_err();
        assert!(matches!(err, FrameError::Format(_)));
    }

    #[test]
    fn test_frame_dto() {
        let conversion = convert_payload(json!({
            "name": "frame",
            "fields": [
                {"name": "time", "values": [1, 2]},
                {"name": "value", "type": "number", "values": [3, 4], "config": {"unit": "ms"}}
            ]
        }))
        .unwrap();

        assert!(conversion.notices.is_empty());
        let frame = conversion.frame;
        assert_eq!(frame.name.as_deref(), Some("frame"));
        assert_eq!(frame.length, 2);
        assert_eq!(frame.fields[0].field_type, FieldType::Time);
        assert_eq!(frame.fields[1].config.unit.as_deref(), Some("ms"));
    }

    #[test]
    fn test_deprecated_rows_are_expanded() {
        let conversion = convert_payload(json!({
            "fields": [{"name": "a"}, {"name": "b"}],
            "rows": [[1, "x"], [2, "y"]]
        }))
        .unwrap();

        assert_eq!(conversion.notices.len(), 1);
        assert!(conversion.notices[0].to_string().contains(".rows is deprecated"));

        let frame = conversion.frame;
        assert_eq!(frame.length, 2);
        assert_eq!(frame.fields[0].get(1), Some(&FieldValue::Number(2.0)));
        assert_eq!(frame.fields[1].get(0), Some(&FieldValue::from("x")));
        assert_eq!(frame.fields[0].field_type, FieldType::Number);
        assert_eq!(frame.fields[1].field_type, FieldType::String);
    }

    #[test]
    fn test_predicates() {
        assert!(is_data_frame(&json!({"fields": []})));
        assert!(!is_data_frame(&json!({"columns": []})));
        assert!(is_table_data(&json!({"columns": []})));
        assert!(!is_table_data(&json!(null)));
    }

    #[test]
    fn test_legacy_table_round_trip() {
        let table = json!({
            "columns": [{"text": "Host"}, {"text": "Value", "unit": "ms"}, {"text": "Up"}],
            "rows": [["a", 1, true], ["b", 2, false]]
        });
        let frame = to_data_frame(table).unwrap();

        match to_legacy_response_data(&frame) {
            LegacyResponse::Table(out) => {
                assert_eq!(out.kind.as_deref(), Some("table"));
                assert_eq!(out.columns[0].text, "Host");
                assert_eq!(out.columns[1].config.unit.as_deref(), Some("ms"));
                assert_eq!(out.rows[1], vec![FieldValue::from("b"), 2.into(), false.into()]);

                let json = serde_json::to_value(&out).unwrap();
                assert_eq!(json["columns"][1], json!({"text": "Value", "unit": "ms"}));
                assert_eq!(json["type"], json!("table"));
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_two_fields_with_inferred_time() {
        let frame = DataFrame::new(vec![
            Field::numbers("v", vec![1.0]),
            Field::new("time", FieldType::Other, vec![FieldValue::Number(10.0)]),
        ])
        .unwrap();
        assert!(matches!(to_legacy_response_data(&frame), LegacyResponse::TimeSeries(_)));

        let frame = DataFrame::new(vec![Field::numbers("v", vec![1.0]), Field::numbers("w", vec![2.0])]).unwrap();
        assert!(matches!(to_legacy_response_data(&frame), LegacyResponse::Table(_)));
    }

    #[test]
    fn test_time_series_wire_round_trip() {
        let payload = json!({"target": "cpu", "datapoints": [[1, 1000], [2.5, 2000], [null, 3000]]});
        let frame = to_data_frame(payload.clone()).unwrap();

        let out = serde_json::to_value(to_legacy_response_data(&frame)).unwrap();
        assert_eq!(out["datapoints"], payload["datapoints"]);

        // Epoch millis stay integers on the wire
        let millis: Vec<i64> = out["datapoints"]
            .as_array()
            .unwrap()
            .iter()
            .map(|point| point[1].as_i64().unwrap())
            .collect();
        assert_eq!(millis, vec![1000, 2000, 3000]);
    }

    fn point() -> impl Strategy<Value = TimeSeriesPoint> {
        let value = prop_oneof![
            Just(FieldValue::Null),
            (-1e9f64..1e9).prop_map(FieldValue::Number),
        ];
        (value, (0i64..4_102_444_800_000).prop_map(|ms| FieldValue::Number(ms as f64)))
    }

    proptest! {
        #[test]
        fn prop_time_series_round_trip(datapoints in prop::collection::vec(point(), 0..20)) {
            let series = TimeSeries {
                target: "series".to_string(),
                datapoints: datapoints.clone(),
                ..TimeSeries::default()
            };
            let frame = to_data_frame(serde_json::to_value(&series).unwrap()).unwrap();

            match to_legacy_response_data(&frame) {
                LegacyResponse::TimeSeries(out) => {
                    prop_assert_eq!(out.target, "series");
                    prop_assert_eq!(out.datapoints, datapoints);
                }
                other => prop_assert!(false, "expected time series, got {:?}", other),
            }
        }
    }
}
