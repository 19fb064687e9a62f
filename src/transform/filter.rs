//! Selection transformers: `noop`, `filterFields`, `filterFieldsByName`,
//! `filterFrames` and `filterByRefId`.
//!
//! Each takes an optional `include` and `exclude`. A value is kept when it
//! matches `include` (or there is none) and does not match `exclude`.
//! With neither set the emission passes through untouched. Frames left
//! without any fields are dropped.

use super::matchers::{FieldMatcher, FrameMatcher, MatcherConfig};
use super::{parse_options, DataTransformerId, FrameOperator};
use crate::error::Result;
use crate::field::Field;
use crate::frame::DataFrame;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub(crate) fn empty_options() -> Value {
    json!({})
}

pub(crate) fn noop_operator(_options: &Value) -> Result<FrameOperator> {
    Ok(Box::new(|frames: Vec<DataFrame>| frames))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<MatcherConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<MatcherConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterFieldsByNameOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterByRefIdOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
}

/// Keep the fields of each frame selected by `include` / `exclude`.
pub fn filter_fields(
    frames: Vec<DataFrame>,
    include: Option<&FieldMatcher>,
    exclude: Option<&FieldMatcher>,
) -> Vec<DataFrame> {
    if include.is_none() && exclude.is_none() {
        return frames;
    }

    frames
        .into_iter()
        .filter_map(|frame| {
            let keep = |field: &&Field| {
                include.map_or(true, |m| m.matches(field)) && !exclude.is_some_and(|m| m.matches(field))
            };
            if frame.fields.iter().all(|f| keep(&f)) {
                return Some(frame);
            }
            let fields: Vec<_> = frame.fields.iter().filter(keep).cloned().collect();
            if fields.is_empty() {
                None
            } else {
                Some(frame.with_fields(fields, frame.length))
            }
        })
        .collect()
}

/// Keep the frames selected by `include` / `exclude`.
pub fn filter_frames(
    frames: Vec<DataFrame>,
    include: Option<&FrameMatcher>,
    exclude: Option<&FrameMatcher>,
) -> Vec<DataFrame> {
    if include.is_none() && exclude.is_none() {
        return frames;
    }

    frames
        .into_iter()
        .enumerate()
        .filter(|(index, frame)| {
            include.map_or(true, |m| m.matches(frame, *index)) && !exclude.is_some_and(|m| m.matches(frame, *index))
        })
        .map(|(_, frame)| frame)
        .collect()
}

fn field_matchers(
    id: DataTransformerId,
    options: &Value,
) -> Result<(Option<FieldMatcher>, Option<FieldMatcher>)> {
    let options: FilterOptions = parse_options(id, options)?;
    let include = options.include.as_ref().map(FieldMatcher::from_config).transpose()?;
    let exclude = options.exclude.as_ref().map(FieldMatcher::from_config).transpose()?;
    Ok((include, exclude))
}

pub(crate) fn filter_fields_operator(options: &Value) -> Result<FrameOperator> {
    let (include, exclude) = field_matchers(DataTransformerId::FilterFields, options)?;
    Ok(Box::new(move |frames: Vec<DataFrame>| {
        filter_fields(frames, include.as_ref(), exclude.as_ref())
    }))
}

fn any_name(names: &[String]) -> FieldMatcher {
    FieldMatcher::Any(names.iter().map(|name| FieldMatcher::by_name(name)).collect())
}

pub(crate) fn filter_fields_by_name_operator(options: &Value) -> Result<FrameOperator> {
    let options: FilterFieldsByNameOptions = parse_options(DataTransformerId::FilterFieldsByName, options)?;
    let include = options.include.as_deref().map(any_name);
    let exclude = options.exclude.as_deref().map(any_name);
    Ok(Box::new(move |frames: Vec<DataFrame>| {
        filter_fields(frames, include.as_ref(), exclude.as_ref())
    }))
}

pub(crate) fn filter_frames_operator(options: &Value) -> Result<FrameOperator> {
    let options: FilterOptions = parse_options(DataTransformerId::FilterFrames, options)?;
    let include = options.include.as_ref().map(FrameMatcher::from_config).transpose()?;
    let exclude = options.exclude.as_ref().map(FrameMatcher::from_config).transpose()?;
    Ok(Box::new(move |frames: Vec<DataFrame>| {
        filter_frames(frames, include.as_ref(), exclude.as_ref())
    }))
}

pub(crate) fn filter_by_ref_id_operator(options: &Value) -> Result<FrameOperator> {
    let options: FilterByRefIdOptions = parse_options(DataTransformerId::FilterByRefId, options)?;
    let include = options.include.map(FrameMatcher::ByRefId);
    let exclude = options.exclude.map(FrameMatcher::ByRefId);
    Ok(Box::new(move |frames: Vec<DataFrame>| {
        filter_frames(frames, include.as_ref(), exclude.as_ref())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;

    fn frames() -> Vec<DataFrame> {
        vec![
            DataFrame::new(vec![
                Field::times("Time", vec![1.0, 2.0]),
                Field::numbers("cpu", vec![0.5, 0.7]),
                Field::strings("host", vec!["a", "b"]),
            ])
            .unwrap()
            .with_ref_id("A"),
            DataFrame::new(vec![Field::strings("message", vec!["hello"])])
                .unwrap()
                .with_ref_id("B"),
        ]
    }

    fn names(frame: &DataFrame) -> Vec<&str> {
        frame.fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_noop() {
        let input = frames();
        let out = noop_operator(&Value::Null).unwrap()(input.clone());
        assert_eq!(out.len(), 2);
        assert!(out[0].fields[1].shares_values(&input[0].fields[1]));
    }

    #[test]
    fn test_filter_fields_include() {
        let filter = filter_fields_operator(&json!({"include": {"id": "numeric"}})).unwrap();
        let out = filter(frames());

        // The second frame has no numeric field left and is dropped
        assert_eq!(out.len(), 1);
        assert_eq!(names(&out[0]), vec!["cpu"]);
        assert_eq!(out[0].length, 2);
        assert_eq!(out[0].ref_id.as_deref(), Some("A"));
    }

    #[test]
    fn test_filter_fields_exclude() {
        let filter = filter_fields_operator(&json!({"exclude": {"id": "time"}})).unwrap();
        let out = filter(frames());
        assert_eq!(out.len(), 2);
        assert_eq!(names(&out[0]), vec!["cpu", "host"]);
        assert_eq!(names(&out[1]), vec!["message"]);
    }

    #[test]
    fn test_filter_fields_without_options() {
        let input = frames();
        let out = filter_fields_operator(&json!({})).unwrap()(input.clone());
        assert_eq!(out.len(), 2);
        assert_eq!(names(&out[0]), names(&input[0]));
    }

    #[test]
    fn test_filter_fields_by_name() {
        let filter = filter_fields_by_name_operator(&json!({"include": ["Time", "host"]})).unwrap();
        let out = filter(frames());
        assert_eq!(out.len(), 1);
        assert_eq!(names(&out[0]), vec!["Time", "host"]);

        let filter = filter_fields_by_name_operator(&json!({"exclude": ["/^h/"]})).unwrap();
        let out = filter(frames());
        assert_eq!(names(&out[0]), vec!["Time", "cpu"]);
    }

    #[test]
    fn test_filter_frames() {
        let filter = filter_frames_operator(&json!({"include": {"id": "byIndex", "options": 1}})).unwrap();
        let out = filter(frames());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].ref_id.as_deref(), Some("B"));
    }

    #[test]
    fn test_filter_by_ref_id() {
        let out = filter_by_ref_id_operator(&json!({"include": "A"})).unwrap()(frames());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].ref_id.as_deref(), Some("A"));

        let out = filter_by_ref_id_operator(&json!({"exclude": "A"})).unwrap()(frames());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].ref_id.as_deref(), Some("B"));
    }

    #[test]
    fn test_bad_matcher_fails_at_build_time() {
        assert!(filter_fields_operator(&json!({"include": {"id": "nope"}})).is_err());
    }
}
