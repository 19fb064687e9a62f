//! Per-field display and semantic configuration.
//!
//! Everything here is authored outside the crate and travels as JSON, so
//! the types mirror the wire shape (camelCase keys, optional everything).
//! Unknown keys on a field config are kept in [`FieldConfig::custom`] so a
//! legacy table column survives a round trip without losing attributes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Number of decimals to display, `None` meaning "auto".
pub type DecimalCount = Option<i32>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    /// Display title. Blank means derive from the field name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filterable: Option<bool>,

    /// Key into the unit-formatting registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: DecimalCount,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mappings: Vec<ValueMapping>,

    /// Must be sorted ascending by value; the first is the base color.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thresholds: Vec<Threshold>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_value_mode: Option<NullValueMode>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<DataLink>,

    /// Shown instead of an empty string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// strftime-style pattern for time fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_display_format: Option<String>,

    #[serde(flatten)]
    pub custom: Map<String, Value>,
}

impl FieldConfig {
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_decimals(mut self, decimals: i32) -> Self {
        self.decimals = Some(decimals);
        self
    }

    pub fn with_thresholds(mut self, thresholds: Vec<Threshold>) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_mappings(mut self, mappings: Vec<ValueMapping>) -> Self {
        self.mappings = mappings;
        self
    }

    pub fn with_no_value(mut self, text: impl Into<String>) -> Self {
        self.no_value = Some(text.into());
        self
    }

    /// Thresholds in ascending order of value, the order color lookup needs.
    pub fn sorted_thresholds(&self) -> Vec<Threshold> {
        let mut steps = self.thresholds.clone();
        steps.sort_by(|a, b| a.value.total_cmp(&b.value));
        steps
    }
}

/// A (value, color) step. The base step carries `-Infinity`, which the wire
/// format writes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    #[serde(with = "threshold_value")]
    pub value: f64,
    pub color: String,
}

impl Threshold {
    pub fn new(value: f64, color: impl Into<String>) -> Self {
        Threshold {
            value,
            color: color.into(),
        }
    }

    /// The base step every threshold list starts with.
    pub fn base(color: impl Into<String>) -> Self {
        Threshold::new(f64::NEG_INFINITY, color)
    }
}

mod threshold_value {
    use super::*;

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if *value == f64::NEG_INFINITY {
            serializer.serialize_none()
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NEG_INFINITY))
    }
}

/// How a mapping matches: a single value or an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MappingType {
    ValueToText,
    RangeToText,
}

impl TryFrom<u8> for MappingType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(MappingType::ValueToText),
            2 => Ok(MappingType::RangeToText),
            other => Err(format!("unknown mapping type {}", other)),
        }
    }
}

impl From<MappingType> for u8 {
    fn from(value: MappingType) -> Self {
        match value {
            MappingType::ValueToText => 1,
            MappingType::RangeToText => 2,
        }
    }
}

/// Replace a raw value (or range of values) with custom display text.
/// Bounds and values are strings on the wire; `"null"` targets null cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueMapping {
    #[serde(default)]
    pub id: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub operator: String,
    #[serde(rename = "type")]
    pub mapping_type: MappingType,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl ValueMapping {
    pub fn value_to_text(value: impl Into<String>, text: impl Into<String>) -> Self {
        ValueMapping {
            id: 0,
            operator: String::new(),
            mapping_type: MappingType::ValueToText,
            text: text.into(),
            value: Some(value.into()),
            from: None,
            to: None,
        }
    }

    pub fn range_to_text(
        from: impl Into<String>,
        to: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        ValueMapping {
            id: 0,
            operator: String::new(),
            mapping_type: MappingType::RangeToText,
            text: text.into(),
            value: None,
            from: Some(from.into()),
            to: Some(to.into()),
        }
    }
}

/// Treatment of null cells when reducing a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NullValueMode {
    #[default]
    #[serde(rename = "null")]
    Null,
    /// Skip nulls entirely
    #[serde(rename = "connected")]
    Ignore,
    #[serde(rename = "null as zero")]
    AsZero,
}

/// Outbound link attached to a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataLink {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_blank: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base_threshold_loads_from_null() {
        let config: FieldConfig = serde_json::from_value(json!({
            "thresholds": [
                {"value": null, "color": "green"},
                {"value": 80, "color": "red"}
            ]
        }))
        .unwrap();

        assert_eq!(config.thresholds.len(), 2);
        assert_eq!(config.thresholds[0].value, f64::NEG_INFINITY);
        assert_eq!(config.thresholds[1].value, 80.0);
    }

    #[test]
    fn test_base_threshold_saves_as_null() {
        let config = FieldConfig::default()
            .with_thresholds(vec![Threshold::base("green"), Threshold::new(0.0, "red")]);
        let json = serde_json::to_value(&config).unwrap();

        assert_eq!(json["thresholds"][0]["value"], Value::Null);
        // Zero is a real step, not the base
        assert_eq!(json["thresholds"][1]["value"], json!(0.0));
    }

    #[test]
    fn test_non_finite_thresholds_reload_as_base() {
        let config = FieldConfig::default().with_thresholds(vec![
            Threshold::new(f64::INFINITY, "red"),
            Threshold::new(f64::NAN, "blue"),
        ]);
        let text = serde_json::to_string(&config).unwrap();
        let json: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["thresholds"][0]["value"], Value::Null);
        assert_eq!(json["thresholds"][1]["value"], Value::Null);

        let reloaded: FieldConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(reloaded.thresholds[0].value, f64::NEG_INFINITY);
        assert_eq!(reloaded.thresholds[0].color, "red");
        assert_eq!(reloaded.thresholds[1].value, f64::NEG_INFINITY);
    }

    #[test]
    fn test_no_thresholds_is_not_a_base_threshold() {
        let config: FieldConfig = serde_json::from_value(json!({"unit": "ms"})).unwrap();
        assert!(config.thresholds.is_empty());

        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("thresholds").is_none());
    }

    #[test]
    fn test_unknown_keys_survive() {
        let raw = json!({"unit": "short", "sort": true, "decimals": 2});
        let config: FieldConfig = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(config.unit.as_deref(), Some("short"));
        assert_eq!(config.decimals, Some(2));
        assert_eq!(config.custom.get("sort"), Some(&json!(true)));
        assert_eq!(serde_json::to_value(&config).unwrap(), raw);
    }

    #[test]
    fn test_mapping_wire_shape() {
        let mapping: ValueMapping = serde_json::from_value(json!({
            "id": 1, "operator": "", "type": 2, "text": "low", "from": "0", "to": "10"
        }))
        .unwrap();
        assert_eq!(mapping.mapping_type, MappingType::RangeToText);
        assert_eq!(mapping.from.as_deref(), Some("0"));

        let bad = serde_json::from_value::<ValueMapping>(json!({"type": 7, "text": "x"}));
        assert!(bad.is_err());
    }

    #[test]
    fn test_null_value_mode_names() {
        let mode: NullValueMode = serde_json::from_value(json!("null as zero")).unwrap();
        assert_eq!(mode, NullValueMode::AsZero);
        assert_eq!(serde_json::to_value(NullValueMode::Ignore).unwrap(), json!("connected"));
    }

    #[test]
    fn test_sorted_thresholds() {
        let config = FieldConfig::default().with_thresholds(vec![
            Threshold::new(50.0, "red"),
            Threshold::base("green"),
            Threshold::new(10.0, "yellow"),
        ]);
        let colors: Vec<_> = config.sorted_thresholds().into_iter().map(|t| t.color).collect();
        assert_eq!(colors, vec!["green", "yellow", "red"]);
    }
}
