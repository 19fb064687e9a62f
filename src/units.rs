//! Unit formatting registry.
//!
//! A unit id from field config selects a [`ValueFormat`], which turns a
//! number plus a decimals policy into display text. Unknown ids are not an
//! error: the value is printed followed by the id as a suffix.
//!
//! Two decimal counts flow through every formatter: `decimals`, used when
//! the value is printed at its own scale, and `scaled_decimals`, used when
//! a formatter rescales the value (seconds to minutes, bytes to KiB). A
//! `None` scaled count means the decimals were given explicitly and no
//! additional scaling adjustment applies.

use crate::config::DecimalCount;
use crate::value::{format_number, millis_to_datetime};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Utc};
use std::fmt::Write;

const MAX_DECIMALS: i32 = 20;

pub(crate) const INVALID_DATE: &str = "Invalid date";
pub(crate) const ISO_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const US_FORMAT: &str = "%m/%d/%Y %-I:%M:%S %P";

const SHORT_UNITS: &[&str] = &["", " K", " Mil", " Bil", " Tri", " Quadr", " Quint", " Sext", " Sept"];
const BINARY_BYTES: &[&str] = &[" B", " KiB", " MiB", " GiB", " TiB", " PiB", " EiB", " ZiB", " YiB"];
const DECIMAL_BYTES: &[&str] = &[" B", " kB", " MB", " GB", " TB", " PB", " EB", " ZB", " YB"];
const CURRENCY_UNITS: &[&str] = &["", "K", "M", "B", "T"];

#[derive(Debug, Clone, PartialEq)]
pub enum ValueFormat {
    None,
    Short,
    Percent,
    /// Ratio in `[0, 1]` shown as a percentage
    PercentUnit,
    Bytes,
    DecBytes,
    Milliseconds,
    Seconds,
    Currency(&'static str),
    DateTimeAsIso,
    DateTimeAsUs,
    DateTimeFromNow,
    /// Unregistered unit id printed after the value
    Suffix(String),
}

impl ValueFormat {
    pub fn from_unit(unit: &str) -> ValueFormat {
        match unit {
            "" | "none" => ValueFormat::None,
            "short" => ValueFormat::Short,
            "percent" => ValueFormat::Percent,
            "percentunit" => ValueFormat::PercentUnit,
            "bytes" => ValueFormat::Bytes,
            "decbytes" => ValueFormat::DecBytes,
            "ms" => ValueFormat::Milliseconds,
            "s" => ValueFormat::Seconds,
            "currencyUSD" => ValueFormat::Currency("$"),
            "currencyEUR" => ValueFormat::Currency("€"),
            "dateTimeAsIso" => ValueFormat::DateTimeAsIso,
            "dateTimeAsUS" => ValueFormat::DateTimeAsUs,
            "dateTimeFromNow" => ValueFormat::DateTimeFromNow,
            other => ValueFormat::Suffix(other.to_string()),
        }
    }

    /// Units that already render timestamps, so time fields can use them
    /// directly.
    pub fn is_time_display(&self) -> bool {
        matches!(
            self,
            ValueFormat::DateTimeAsIso | ValueFormat::DateTimeAsUs | ValueFormat::DateTimeFromNow
        )
    }

    pub fn format(
        &self,
        value: f64,
        decimals: DecimalCount,
        scaled_decimals: DecimalCount,
        is_utc: bool,
    ) -> String {
        match self {
            ValueFormat::None => to_fixed(value, decimals),
            ValueFormat::Short => scaled_units(value, decimals, scaled_decimals, 1000.0, SHORT_UNITS),
            ValueFormat::Percent => format!("{}%", to_fixed(value, decimals)),
            ValueFormat::PercentUnit => format!("{}%", to_fixed(value * 100.0, decimals)),
            ValueFormat::Bytes => scaled_units(value, decimals, scaled_decimals, 1024.0, BINARY_BYTES),
            ValueFormat::DecBytes => scaled_units(value, decimals, scaled_decimals, 1000.0, DECIMAL_BYTES),
            ValueFormat::Milliseconds => to_milliseconds(value, decimals, scaled_decimals),
            ValueFormat::Seconds => to_seconds(value, decimals, scaled_decimals),
            ValueFormat::Currency(symbol) => format!(
                "{}{}",
                symbol,
                scaled_units(value, decimals, scaled_decimals, 1000.0, CURRENCY_UNITS)
            ),
            ValueFormat::DateTimeAsIso => format_epoch(value, is_utc, ISO_FORMAT),
            ValueFormat::DateTimeAsUs => format_epoch(value, is_utc, US_FORMAT),
            ValueFormat::DateTimeFromNow => from_now(value, Utc::now()),
            ValueFormat::Suffix(unit) => format!("{} {}", to_fixed(value, decimals), unit),
        }
    }
}

/// Look up the formatter for a unit id
pub fn get_value_format(unit: &str) -> ValueFormat {
    ValueFormat::from_unit(unit)
}

/// Round to `decimals` places and pad with zeros to exactly that many.
/// `None` prints the value at its own precision.
pub fn to_fixed(value: f64, decimals: DecimalCount) -> String {
    let Some(decimals) = decimals else {
        return format_number(value);
    };
    if !value.is_finite() {
        return format_number(value);
    }

    let places = decimals.clamp(0, MAX_DECIMALS);
    let factor = 10f64.powi(places);
    let rounded = ((value * factor) + 0.5).floor() / factor;
    if !rounded.is_finite() {
        return format_number(value);
    }

    let formatted = format_number(rounded);
    if formatted.contains('e') || value == 0.0 {
        return formatted;
    }

    let precision = formatted
        .find('.')
        .map(|pos| formatted.len() - pos - 1)
        .unwrap_or(0) as i32;
    if precision < places {
        let mut padded = formatted;
        if precision == 0 {
            padded.push('.');
        }
        padded.extend(std::iter::repeat('0').take((places - precision) as usize));
        return padded;
    }
    formatted
}

/// Fixed formatting for a rescaled value: `scaled_decimals` plus
/// `additional` places when scaling applies, plain `decimals` otherwise.
pub fn to_fixed_scaled(
    value: f64,
    decimals: DecimalCount,
    scaled_decimals: DecimalCount,
    additional: i32,
    ext: &str,
) -> String {
    match scaled_decimals {
        None => format!("{}{}", to_fixed(value, decimals), ext),
        Some(scaled) => format!("{}{}", to_fixed(value, Some(scaled.saturating_add(additional))), ext),
    }
}

fn scaled_units(
    value: f64,
    decimals: DecimalCount,
    scaled_decimals: DecimalCount,
    factor: f64,
    ext: &[&str],
) -> String {
    let mut size = value;
    let mut steps = 0;
    while size.abs() >= factor {
        steps += 1;
        size /= factor;
        if steps >= ext.len() {
            return "NA".to_string();
        }
    }

    let decimals = match scaled_decimals {
        Some(scaled) if steps > 0 => Some(scaled.saturating_add(3 * steps as i32)),
        _ => decimals,
    };
    format!("{}{}", to_fixed(size, decimals), ext[steps])
}

fn to_milliseconds(size: f64, decimals: DecimalCount, scaled: DecimalCount) -> String {
    let abs = size.abs();
    if abs < 1000.0 {
        format!("{} ms", to_fixed(size, decimals))
    } else if abs < 60_000.0 {
        to_fixed_scaled(size / 1000.0, decimals, scaled, 3, " s")
    } else if abs < 3_600_000.0 {
        to_fixed_scaled(size / 60_000.0, decimals, scaled, 5, " min")
    } else if abs < 86_400_000.0 {
        to_fixed_scaled(size / 3_600_000.0, decimals, scaled, 7, " hour")
    } else if abs < 31_536_000_000.0 {
        to_fixed_scaled(size / 86_400_000.0, decimals, scaled, 8, " day")
    } else {
        to_fixed_scaled(size / 31_536_000_000.0, decimals, scaled, 10, " year")
    }
}

fn to_seconds(size: f64, decimals: DecimalCount, scaled: DecimalCount) -> String {
    let abs = size.abs();
    if abs < 1.0 && abs > 0.0 {
        to_milliseconds(size * 1000.0, decimals, scaled)
    } else if abs < 60.0 {
        format!("{} s", to_fixed(size, decimals))
    } else if abs < 3600.0 {
        to_fixed_scaled(size / 60.0, decimals, scaled, 1, " min")
    } else if abs < 86_400.0 {
        to_fixed_scaled(size / 3600.0, decimals, scaled, 4, " hour")
    } else if abs < 604_800.0 {
        to_fixed_scaled(size / 86_400.0, decimals, scaled, 5, " day")
    } else if abs < 31_536_000.0 {
        to_fixed_scaled(size / 604_800.0, decimals, scaled, 6, " week")
    } else {
        to_fixed_scaled(size / 3.15569e7, decimals, scaled, 7, " year")
    }
}

/// Format a timestamp with a strftime pattern in UTC or the local zone.
/// `None` when the pattern is malformed.
pub(crate) fn format_datetime(date: &DateTime<Utc>, is_utc: bool, pattern: &str) -> Option<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }

    let mut out = String::new();
    let written = if is_utc {
        write!(out, "{}", date.format_with_items(items.iter()))
    } else {
        write!(out, "{}", date.with_timezone(&Local).format_with_items(items.iter()))
    };
    written.ok().map(|_| out)
}

fn format_epoch(millis: f64, is_utc: bool, pattern: &str) -> String {
    millis_to_datetime(millis)
        .and_then(|date| format_datetime(&date, is_utc, pattern))
        .unwrap_or_else(|| INVALID_DATE.to_string())
}

fn from_now(millis: f64, now: DateTime<Utc>) -> String {
    let Some(date) = millis_to_datetime(millis) else {
        return INVALID_DATE.to_string();
    };
    let delta = (now - date).num_seconds();
    let phrase = humanize_seconds(delta.unsigned_abs());
    if delta >= 0 {
        format!("{} ago", phrase)
    } else {
        format!("in {}", phrase)
    }
}

fn humanize_seconds(seconds: u64) -> String {
    let s = seconds as f64;
    let minutes = (s / 60.0).round();
    let hours = (s / 3600.0).round();
    let days = (s / 86_400.0).round();

    if s < 45.0 {
        "a few seconds".to_string()
    } else if s < 90.0 {
        "a minute".to_string()
    } else if minutes < 45.0 {
        format!("{} minutes", minutes)
    } else if minutes < 90.0 {
        "an hour".to_string()
    } else if hours < 22.0 {
        format!("{} hours", hours)
    } else if hours < 36.0 {
        "a day".to_string()
    } else if days < 26.0 {
        format!("{} days", days)
    } else if days < 45.0 {
        "a month".to_string()
    } else if days < 320.0 {
        format!("{} months", (days / 30.4).round())
    } else if days < 548.0 {
        "a year".to_string()
    } else {
        format!("{} years", (days / 365.0).round())
    }
}
