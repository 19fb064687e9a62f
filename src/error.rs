/// Error taxonomy for frame construction, payload conversion and
/// declarative pipeline configuration.
///
/// Display processing and type inference are infallible and never produce
/// one of these.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FrameError>;

#[derive(Debug, Error)]
pub enum FrameError {
    /// Row data was not array-shaped where an array is required.
    #[error("format error: {0}")]
    Format(String),

    /// The payload matched none of the known adapter shapes.
    #[error("unsupported data format")]
    UnsupportedFormat,

    /// A field index that does not exist in the frame.
    #[error("field index {index} out of range for frame with {count} fields")]
    MissingField { index: usize, count: usize },

    #[error("field '{field}' has {actual} values, frame length is {expected}")]
    LengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid permutation: {0}")]
    InvalidPermutation(String),

    #[error("unknown transformer '{0}'")]
    UnknownTransformer(String),

    #[error("unknown matcher '{0}'")]
    UnknownMatcher(String),

    #[error("invalid options for '{id}': {source}")]
    InvalidOptions {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FrameError {
    pub(crate) fn invalid_options(id: impl Into<String>, source: serde_json::Error) -> Self {
        FrameError::InvalidOptions {
            id: id.into(),
            source,
        }
    }
}
