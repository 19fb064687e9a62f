//! Field and frame matchers.
//!
//! Matchers are pure predicates used to scope transformers. They are
//! authored as `{id, options}` and parsed once into a typed tree, so an
//! unknown id or malformed argument is reported before any data flows.
//!
//! Builtin combinators work for both kinds: `anyMatch` and `allMatch` take
//! a list of child configs, `invertMatch` takes one, and `alwaysMatch` /
//! `neverMatch` take nothing.

use crate::error::{FrameError, Result};
use crate::field::{Field, FieldType};
use crate::frame::DataFrame;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    pub id: String,
    #[serde(default)]
    pub options: Value,
}

impl MatcherConfig {
    pub fn new(id: impl Into<String>, options: Value) -> Self {
        MatcherConfig {
            id: id.into(),
            options,
        }
    }
}

fn parse_arg<T: DeserializeOwned>(config: &MatcherConfig) -> Result<T> {
    serde_json::from_value(config.options.clone()).map_err(|e| FrameError::invalid_options(config.id.as_str(), e))
}

/// Name pattern. A plain string must match the whole name as a regular
/// expression; `/body/flags` gives the expression and its flags
/// explicitly (`i` and `m` are honoured). A pattern that does not compile
/// falls back to exact comparison.
#[derive(Debug, Clone)]
pub struct NamePattern {
    source: String,
    regex: Option<Regex>,
}

impl NamePattern {
    pub fn new(pattern: &str) -> Self {
        let expression = match parse_slashed(pattern) {
            Some((body, flags)) => {
                let mut prefix = String::new();
                if flags.contains('i') {
                    prefix.push('i');
                }
                if flags.contains('m') {
                    prefix.push('m');
                }
                if prefix.is_empty() {
                    body.to_string()
                } else {
                    format!("(?{}){}", prefix, body)
                }
            }
            None => format!("^(?:{})$", pattern),
        };

        let regex = match Regex::new(&expression) {
            Ok(regex) => Some(regex),
            Err(err) => {
                log::warn!("invalid name pattern '{}', matching exactly: {}", pattern, err);
                None
            }
        };
        NamePattern {
            source: pattern.to_string(),
            regex,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, name: &str) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(name),
            None => self.source == name,
        }
    }
}

impl PartialEq for NamePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

fn parse_slashed(pattern: &str) -> Option<(&str, &str)> {
    let rest = pattern.strip_prefix('/')?;
    let end = rest.rfind('/')?;
    let (body, flags) = (&rest[..end], &rest[end + 1..]);
    if flags.chars().all(|c| matches!(c, 'g' | 'i' | 'm' | 'y')) {
        Some((body, flags))
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldMatcher {
    Any(Vec<FieldMatcher>),
    All(Vec<FieldMatcher>),
    Invert(Box<FieldMatcher>),
    Always,
    Never,
    Numeric,
    Time,
    ByType(FieldType),
    ByName(NamePattern),
}

impl FieldMatcher {
    pub fn from_config(config: &MatcherConfig) -> Result<Self> {
        Ok(match config.id.as_str() {
            "anyMatch" => FieldMatcher::Any(Self::children(config)?),
            "allMatch" => FieldMatcher::All(Self::children(config)?),
            "invertMatch" => FieldMatcher::Invert(Box::new(Self::from_config(&parse_arg(config)?)?)),
            "alwaysMatch" => FieldMatcher::Always,
            "neverMatch" => FieldMatcher::Never,
            "numeric" => FieldMatcher::Numeric,
            "time" => FieldMatcher::Time,
            "byType" => FieldMatcher::ByType(parse_arg(config)?),
            "byName" => FieldMatcher::ByName(NamePattern::new(&parse_arg::<String>(config)?)),
            other => return Err(FrameError::UnknownMatcher(other.to_string())),
        })
    }

    fn children(config: &MatcherConfig) -> Result<Vec<FieldMatcher>> {
        parse_arg::<Vec<MatcherConfig>>(config)?
            .iter()
            .map(Self::from_config)
            .collect()
    }

    pub fn by_name(pattern: &str) -> Self {
        FieldMatcher::ByName(NamePattern::new(pattern))
    }

    pub fn matches(&self, field: &Field) -> bool {
        match self {
            FieldMatcher::Any(children) => children.iter().any(|m| m.matches(field)),
            FieldMatcher::All(children) => children.iter().all(|m| m.matches(field)),
            FieldMatcher::Invert(child) => !child.matches(field),
            FieldMatcher::Always => true,
            FieldMatcher::Never => false,
            FieldMatcher::Numeric => field.field_type == FieldType::Number,
            FieldMatcher::Time => field.field_type == FieldType::Time,
            FieldMatcher::ByType(field_type) => field.field_type == *field_type,
            FieldMatcher::ByName(pattern) => pattern.matches(&field.name),
        }
    }
}

/// Label equality argument for `byLabel`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelMatch {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameMatcher {
    Any(Vec<FrameMatcher>),
    All(Vec<FrameMatcher>),
    Invert(Box<FrameMatcher>),
    Always,
    Never,
    ByName(NamePattern),
    ByRefId(String),
    ByIndex(usize),
    /// Any field of the frame carries the label
    ByLabel(LabelMatch),
}

impl FrameMatcher {
    pub fn from_config(config: &MatcherConfig) -> Result<Self> {
        Ok(match config.id.as_str() {
            "anyMatch" => FrameMatcher::Any(Self::children(config)?),
            "allMatch" => FrameMatcher::All(Self::children(config)?),
            "invertMatch" => FrameMatcher::Invert(Box::new(Self::from_config(&parse_arg(config)?)?)),
            "alwaysMatch" => FrameMatcher::Always,
            "neverMatch" => FrameMatcher::Never,
            "byName" => FrameMatcher::ByName(NamePattern::new(&parse_arg::<String>(config)?)),
            "byRefId" => FrameMatcher::ByRefId(parse_arg(config)?),
            "byIndex" => FrameMatcher::ByIndex(parse_arg(config)?),
            "byLabel" => FrameMatcher::ByLabel(parse_arg(config)?),
            other => return Err(FrameError::UnknownMatcher(other.to_string())),
        })
    }

    fn children(config: &MatcherConfig) -> Result<Vec<FrameMatcher>> {
        parse_arg::<Vec<MatcherConfig>>(config)?
            .iter()
            .map(Self::from_config)
            .collect()
    }

    /// `index` is the frame's position in the emission.
    pub fn matches(&self, frame: &DataFrame, index: usize) -> bool {
        match self {
            FrameMatcher::Any(children) => children.iter().any(|m| m.matches(frame, index)),
            FrameMatcher::All(children) => children.iter().all(|m| m.matches(frame, index)),
            FrameMatcher::Invert(child) => !child.matches(frame, index),
            FrameMatcher::Always => true,
            FrameMatcher::Never => false,
            FrameMatcher::ByName(pattern) => frame.name.as_deref().is_some_and(|name| pattern.matches(name)),
            FrameMatcher::ByRefId(ref_id) => frame.ref_id.as_deref() == Some(ref_id.as_str()),
            FrameMatcher::ByIndex(i) => *i == index,
            FrameMatcher::ByLabel(label) => frame.fields.iter().any(|field| {
                field
                    .labels
                    .as_ref()
                    .and_then(|labels| labels.get(&label.key))
                    .is_some_and(|value| *value == label.value)
            }),
        }
    }
}
