/// QueryFrame Display Processor
///
/// Turns one raw cell value into its final presentation: display text, the
/// numeric reading of the value, and an optional threshold color. A
/// processor is built once per field from the field's type and config and
/// then applied to every cell, so all per-field lookups (unit formatter,
/// sorted thresholds) happen at build time.
///
/// Processing order for non-time fields:
///
/// 1. value mappings are checked against the raw value; a match supplies the
///    text verbatim and turns off unit formatting
/// 2. otherwise numeric values are formatted by the unit formatter, and the
///    formatted text gets a second chance to match a mapping
/// 3. finite numeric values pick a color from the thresholds
/// 4. empty text falls back to the configured no-value text
///
/// Display processing never fails: bad input degrades to `NaN` and
/// best-effort text.
use crate::config::{DecimalCount, FieldConfig, Threshold};
use crate::field::FieldType;
use crate::frame::DataFrame;
use crate::mapping::get_mapped_value;
use crate::units::{format_datetime, get_value_format, INVALID_DATE, ISO_FORMAT};
use crate::value::{parse_number, FieldValue};
use serde::Serialize;
use std::fmt::Debug;
use std::rc::Rc;

/// Fully resolved presentation of one cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayValue {
    pub text: String,
    pub numeric: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl DisplayValue {
    /// Default text and number conversion, no formatting or color.
    pub fn plain(value: &FieldValue) -> Self {
        DisplayValue {
            text: value.to_text(),
            numeric: value.to_number(),
            color: None,
        }
    }
}

pub type DisplayProcessor = Rc<dyn Fn(&FieldValue) -> DisplayValue>;

/// Decimal policy for a value: places at its own scale, and places used
/// once a unit formatter rescales it. `scaled_decimals` is `None` when the
/// count was given explicitly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecimalInfo {
    pub decimals: DecimalCount,
    pub scaled_decimals: DecimalCount,
}

/// Resolves configured color names into concrete colors.
pub trait Theme: Debug {
    fn resolve_color(&self, color: &str) -> String;
}

/// Returns colors exactly as configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTheme;

impl Theme for PassthroughTheme {
    fn resolve_color(&self, color: &str) -> String {
        color.to_string()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DisplayProcessorOptions {
    pub field_type: Option<FieldType>,
    pub config: Option<FieldConfig>,
    /// Format dates in UTC rather than the local zone
    pub is_utc: bool,
    pub theme: Option<Rc<dyn Theme>>,
}

impl DisplayProcessorOptions {
    pub fn for_field(field_type: FieldType, config: FieldConfig) -> Self {
        DisplayProcessorOptions {
            field_type: Some(field_type),
            config: Some(config),
            ..Self::default()
        }
    }

    pub fn with_utc(mut self, is_utc: bool) -> Self {
        self.is_utc = is_utc;
        self
    }

    pub fn with_theme(mut self, theme: Rc<dyn Theme>) -> Self {
        self.theme = Some(theme);
        self
    }
}

/// Build the display function for a field.
///
/// With no options at all the processor only converts values to text and
/// numbers.
pub fn get_display_processor(options: Option<&DisplayProcessorOptions>) -> DisplayProcessor {
    let Some(options) = options else {
        return Rc::new(|value: &FieldValue| DisplayValue::plain(value));
    };
    let config = options.config.clone().unwrap_or_default();
    let unit = config.unit.clone().unwrap_or_default();
    let format = get_value_format(if unit.is_empty() { "none" } else { &unit });

    if options.field_type == Some(FieldType::Time) && !format.is_time_display() {
        return time_processor(&config, options.is_utc);
    }

    let theme = options.theme.clone();
    let is_utc = options.is_utc;
    let thresholds = config.sorted_thresholds();
    let FieldConfig {
        mappings,
        decimals: decimal_override,
        no_value,
        ..
    } = config;

    Rc::new(move |value: &FieldValue| {
        let mut text = value.to_text();
        let mut numeric = value.to_number();
        let mut color = None;

        let mut should_format = true;
        if let Some(mapped) = get_mapped_value(&mappings, value) {
            text = mapped.text.clone();
            let reparsed = parse_number(&text);
            if !reparsed.is_nan() {
                numeric = reparsed;
            }
            should_format = false;
        }

        if !numeric.is_nan() {
            if should_format && !matches!(value, FieldValue::Bool(_)) {
                let info = get_decimals_for_value(numeric, decimal_override);
                text = format.format(numeric, info.decimals, info.scaled_decimals, is_utc);

                let formatted = FieldValue::String(text.clone());
                if let Some(mapped) = get_mapped_value(&mappings, &formatted) {
                    text = mapped.text.clone();
                }
            }
            if numeric.is_finite() && !thresholds.is_empty() {
                color = Some(get_color_from_threshold(numeric, &thresholds, theme.as_deref()));
            }
        }

        if text.is_empty() {
            text = no_value.clone().unwrap_or_default();
        }

        DisplayValue {
            text,
            numeric,
            color,
        }
    })
}

fn time_processor(config: &FieldConfig, is_utc: bool) -> DisplayProcessor {
    let pattern = config
        .date_display_format
        .clone()
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| ISO_FORMAT.to_string());

    Rc::new(move |value: &FieldValue| {
        let date = value.to_datetime();
        let numeric = match value {
            FieldValue::Number(v) if !v.is_nan() => *v,
            _ => date.map_or(f64::NAN, |d| d.timestamp_millis() as f64),
        };

        let text = match date {
            None => INVALID_DATE.to_string(),
            Some(date) => format_datetime(&date, is_utc, &pattern)
                .or_else(|| {
                    log::debug!("malformed date pattern '{}', using default", pattern);
                    format_datetime(&date, is_utc, ISO_FORMAT)
                })
                .unwrap_or_else(|| INVALID_DATE.to_string()),
        };

        DisplayValue {
            text,
            numeric,
            color: None,
        }
    })
}

/// Color of the highest threshold at or below `value`, or the base color
/// when the value is below every step. `thresholds` must be sorted
/// ascending and non-empty.
pub fn get_color_from_threshold(value: f64, thresholds: &[Threshold], theme: Option<&dyn Theme>) -> String {
    let step = thresholds
        .iter()
        .rev()
        .find(|t| t.value <= value)
        .or_else(|| thresholds.first());

    let color = step.map(|t| t.color.as_str()).unwrap_or_default();
    theme.unwrap_or(&PassthroughTheme).resolve_color(color)
}

/// Pick a display precision for `value`.
///
/// An explicit override is used verbatim. Otherwise the value is
/// normalized into `[1, 10)` and snapped to a step of 1, 2, 2.5, 5 or 10;
/// the 2.5 step (normalized values from 2.5 up to 3) needs one extra
/// decimal. Whole numbers get no decimals.
pub fn get_decimals_for_value(value: f64, decimal_override: DecimalCount) -> DecimalInfo {
    if decimal_override.is_some() {
        return DecimalInfo {
            decimals: decimal_override,
            scaled_decimals: None,
        };
    }
    if !value.is_finite() {
        return DecimalInfo {
            decimals: None,
            scaled_decimals: None,
        };
    }
    if value == 0.0 {
        return DecimalInfo {
            decimals: Some(0),
            scaled_decimals: None,
        };
    }

    let abs = value.abs();
    let exponent = abs.log10().floor() as i32;
    let magn = 10f64.powi(exponent);
    let norm = abs / magn;
    // Subnormal magnitudes underflow to zero
    if magn == 0.0 || !norm.is_finite() {
        return DecimalInfo {
            decimals: None,
            scaled_decimals: None,
        };
    }
    let mut dec = 1i32.saturating_sub(exponent);

    let mut size = if norm < 1.5 {
        1.0
    } else if norm < 3.0 {
        if norm >= 2.5 {
            dec = dec.saturating_add(1);
            2.5
        } else {
            2.0
        }
    } else if norm < 7.5 {
        5.0
    } else {
        10.0
    };
    size *= magn;

    if value.fract() == 0.0 {
        dec = 0;
    }

    let decimals = dec.max(0);
    let scaled_decimals = decimals
        .saturating_sub(size.log10().floor() as i32)
        .saturating_add(2);

    DecimalInfo {
        decimals: Some(decimals),
        scaled_decimals: Some(scaled_decimals),
    }
}

/// Copy of `frame` with a display processor attached to every field.
///
/// Type and config come from each field; only `is_utc` and `theme` are
/// read from `options`.
pub fn with_display_processors(frame: &DataFrame, options: &DisplayProcessorOptions) -> DataFrame {
    let fields = frame
        .fields
        .iter()
        .map(|field| {
            let field_options = DisplayProcessorOptions {
                field_type: Some(field.field_type),
                config: Some(field.config.clone()),
                is_utc: options.is_utc,
                theme: options.theme.clone(),
            };
            let mut field = field.clone();
            field.display = Some(get_display_processor(Some(&field_options)));
            field
        })
        .collect();

    frame.with_fields(fields, frame.length)
}
