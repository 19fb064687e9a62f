//! `limit`: keep only the first N rows of every frame.

use super::{parse_options, DataTransformerId, FrameOperator};
use crate::error::Result;
use crate::frame::DataFrame;
use crate::value::FieldValue;
use crate::vector::ArrayVector;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::rc::Rc;

pub const DEFAULT_LIMIT_FIELD: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitTransformerOptions {
    #[serde(default)]
    pub limit_field: Option<usize>,
}

pub(crate) fn default_options() -> Value {
    json!({ "limitField": DEFAULT_LIMIT_FIELD })
}

pub(crate) fn operator(options: &Value) -> Result<FrameOperator> {
    let options: LimitTransformerOptions = parse_options(DataTransformerId::Limit, options)?;
    let limit = match options.limit_field {
        Some(0) | None => DEFAULT_LIMIT_FIELD,
        Some(limit) => limit,
    };
    Ok(Box::new(move |frames: Vec<DataFrame>| -> Vec<DataFrame> {
        frames.into_iter().map(|frame| limit_frame(frame, limit)).collect()
    }))
}

/// Truncate `frame` to `limit` rows. Frames already within the limit are
/// returned as they are.
pub fn limit_frame(frame: DataFrame, limit: usize) -> DataFrame {
    if frame.length <= limit {
        return frame;
    }

    let fields = frame
        .fields
        .iter()
        .map(|field| {
            let prefix: ArrayVector<FieldValue> = field.values.iter().take(limit).cloned().collect();
            field.replace_values(Rc::new(prefix))
        })
        .collect();
    frame.with_fields(fields, limit)
}
