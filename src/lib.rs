/// QueryFrame - Columnar Query Result Model
///
/// A columnar data model for query results: typed fields over shared
/// vector storage, adapters from the legacy response shapes, display
/// formatting with units, thresholds and value mappings, row views with
/// zero-copy sorting, and a declarative transformation pipeline.

pub mod config;
pub mod convert;
pub mod display;
pub mod error;
pub mod field;
pub mod frame;
pub mod inference;
pub mod mapping;
pub mod transform;
pub mod units;
pub mod value;
pub mod vector;
pub mod view;

pub use config::{DataLink, DecimalCount, FieldConfig, MappingType, NullValueMode, Threshold, ValueMapping};
pub use convert::{
    convert_payload, is_data_frame, is_table_data, to_data_frame, to_legacy_response_data, Conversion,
    DeprecationNotice, LegacyResponse, ResponsePayload,
};
pub use display::{
    get_color_from_threshold, get_decimals_for_value, get_display_processor, with_display_processors,
    DisplayProcessor, DisplayProcessorOptions, DisplayValue, Theme,
};
pub use error::{FrameError, Result};
pub use field::{default_parser, Field, FieldType, Labels, ParseFn};
pub use frame::{DataFrame, DataFrameDto, FieldDto, MutableDataFrame};
pub use inference::{guess_field_type_for_field, guess_field_type_from_value, guess_field_types};
pub use mapping::get_mapped_value;
pub use transform::{transform_data_frame, DataTransformerConfig, DataTransformerId, TransformPipeline};
pub use units::{get_value_format, to_fixed, ValueFormat};
pub use value::FieldValue;
pub use vector::{ArrayVector, SortedVector, Vector};
pub use view::{reverse_data_frame, sort_data_frame, try_sort_data_frame, DataFrameView, RowCursor, RowSnapshot};
