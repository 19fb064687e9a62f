/// QueryFrame Transformation Pipeline
///
/// A transformer maps one emission (a `Vec<DataFrame>`) to the next. It is
/// registered under a wire id with default options; a pipeline is built
/// from declarative `{id, options}` entries and runs its stages in order,
/// either directly or over a stream of emissions.
///
/// Transformers never mutate their input. Untouched frames are passed on
/// as-is so their field storage stays shared with the input.
///
/// # Examples
///
/// ```
/// use queryframe::transform::{DataTransformerConfig, TransformPipeline};
/// use queryframe::{DataFrame, Field};
/// use serde_json::json;
///
/// let frame = DataFrame::new(vec![Field::numbers("value", (0..20).map(f64::from))]).unwrap();
/// let pipeline = TransformPipeline::new(&[DataTransformerConfig::new("limit", json!({"limitField": 5}))]).unwrap();
///
/// let out = pipeline.apply(vec![frame]);
/// assert_eq!(out[0].length, 5);
/// ```

pub mod filter;
pub mod limit;
pub mod matchers;
pub mod reduce;

use crate::error::{FrameError, Result};
use crate::frame::DataFrame;
use futures::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub use matchers::{FieldMatcher, FrameMatcher, MatcherConfig};
pub use reduce::ReducerId;

/// Wire ids of the registered transformers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataTransformerId {
    Noop,
    Limit,
    Reduce,
    FilterFields,
    FilterFieldsByName,
    FilterFrames,
    FilterByRefId,
}

impl DataTransformerId {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataTransformerId::Noop => "noop",
            DataTransformerId::Limit => "limit",
            DataTransformerId::Reduce => "reduce",
            DataTransformerId::FilterFields => "filterFields",
            DataTransformerId::FilterFieldsByName => "filterFieldsByName",
            DataTransformerId::FilterFrames => "filterFrames",
            DataTransformerId::FilterByRefId => "filterByRefId",
        }
    }
}

impl fmt::Display for DataTransformerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pipeline stage over a whole emission
pub type FrameOperator = Box<dyn Fn(Vec<DataFrame>) -> Vec<DataFrame>>;

/// A registered transformer
pub struct DataTransformerInfo {
    pub id: DataTransformerId,
    pub name: &'static str,
    pub description: &'static str,
    pub default_options: fn() -> Value,
    build: fn(&Value) -> Result<FrameOperator>,
}

impl DataTransformerInfo {
    /// Build the operator for `options` laid over the default options.
    pub fn operator(&self, options: &Value) -> Result<FrameOperator> {
        let merged = merge_options((self.default_options)(), options);
        (self.build)(&merged)
    }
}

impl fmt::Debug for DataTransformerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataTransformerInfo")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

/// Shallow merge: keys present in `options` replace the defaults.
fn merge_options(defaults: Value, options: &Value) -> Value {
    match (defaults, options) {
        (defaults, Value::Null) => defaults,
        (Value::Object(mut merged), Value::Object(overrides)) => {
            for (key, value) in overrides {
                merged.insert(key.clone(), value.clone());
            }
            Value::Object(merged)
        }
        (_, other) => other.clone(),
    }
}

/// Parse merged options, reporting failures against the transformer id.
pub(crate) fn parse_options<T: for<'de> Deserialize<'de>>(id: DataTransformerId, options: &Value) -> Result<T> {
    serde_json::from_value(options.clone()).map_err(|e| FrameError::invalid_options(id.as_str(), e))
}

static TRANSFORMERS: [DataTransformerInfo; 7] = [
    DataTransformerInfo {
        id: DataTransformerId::Noop,
        name: "noop",
        description: "No-operation transformer",
        default_options: filter::empty_options,
        build: filter::noop_operator,
    },
    DataTransformerInfo {
        id: DataTransformerId::Limit,
        name: "Limit",
        description: "Limit the number of items to the top N",
        default_options: limit::default_options,
        build: limit::operator,
    },
    DataTransformerInfo {
        id: DataTransformerId::Reduce,
        name: "Reduce",
        description: "Reduce each field to a single value",
        default_options: reduce::default_options,
        build: reduce::operator,
    },
    DataTransformerInfo {
        id: DataTransformerId::FilterFields,
        name: "Filter Fields",
        description: "Select a subset of fields",
        default_options: filter::empty_options,
        build: filter::filter_fields_operator,
    },
    DataTransformerInfo {
        id: DataTransformerId::FilterFieldsByName,
        name: "Filter by name",
        description: "Select a subset of fields by name",
        default_options: filter::empty_options,
        build: filter::filter_fields_by_name_operator,
    },
    DataTransformerInfo {
        id: DataTransformerId::FilterFrames,
        name: "Filter Frames",
        description: "Select a subset of frames",
        default_options: filter::empty_options,
        build: filter::filter_frames_operator,
    },
    DataTransformerInfo {
        id: DataTransformerId::FilterByRefId,
        name: "Filter by refId",
        description: "Select a subset of results by query id",
        default_options: filter::empty_options,
        build: filter::filter_by_ref_id_operator,
    },
];

/// Every registered transformer
pub fn standard_transformers() -> &'static [DataTransformerInfo] {
    &TRANSFORMERS
}

pub fn get_transformer_info(id: &str) -> Result<&'static DataTransformerInfo> {
    TRANSFORMERS
        .iter()
        .find(|info| info.id.as_str() == id)
        .ok_or_else(|| FrameError::UnknownTransformer(id.to_string()))
}

/// A pipeline entry as authored in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTransformerConfig {
    pub id: String,
    #[serde(default)]
    pub options: Value,
}

impl DataTransformerConfig {
    pub fn new(id: impl Into<String>, options: Value) -> Self {
        DataTransformerConfig {
            id: id.into(),
            options,
        }
    }
}

pub fn transformer_operator(config: &DataTransformerConfig) -> Result<FrameOperator> {
    get_transformer_info(&config.id)?.operator(&config.options)
}

/// Ordered chain of transformer stages
pub struct TransformPipeline {
    stages: Vec<(String, FrameOperator)>,
}

impl TransformPipeline {
    /// Resolve every entry up front; an unknown id or bad options fails the
    /// whole pipeline.
    pub fn new(configs: &[DataTransformerConfig]) -> Result<Self> {
        let stages = configs
            .iter()
            .map(|config| Ok((config.id.clone(), transformer_operator(config)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(TransformPipeline { stages })
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage over one emission
    pub fn apply(&self, frames: Vec<DataFrame>) -> Vec<DataFrame> {
        self.stages.iter().fold(frames, |frames, (id, operator)| {
            log::debug!("applying transformer '{}' to {} frames", id, frames.len());
            let out = operator(frames);
            log::trace!("transformer '{}' produced {} frames", id, out.len());
            out
        })
    }

    /// Run the pipeline over each emission of `source`. Each emission goes
    /// through the full chain before the next one is pulled.
    pub fn apply_stream<S>(self, source: S) -> impl Stream<Item = Vec<DataFrame>>
    where
        S: Stream<Item = Vec<DataFrame>>,
    {
        source.map(move |frames| self.apply(frames))
    }
}

impl fmt::Debug for TransformPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<&str> = self.stages.iter().map(|(id, _)| id.as_str()).collect();
        f.debug_struct("TransformPipeline").field("stages", &ids).finish()
    }
}

/// One-shot helper: build a pipeline and apply it to `frames`.
pub fn transform_data_frame(configs: &[DataTransformerConfig], frames: Vec<DataFrame>) -> Result<Vec<DataFrame>> {
    if configs.is_empty() {
        return Ok(frames);
    }
    Ok(TransformPipeline::new(configs)?.apply(frames))
}
