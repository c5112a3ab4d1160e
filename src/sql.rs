pub mod ast;
pub mod comparator;
mod query_builder;
pub mod schema;

pub use query_builder::{
    aliasing::output_name,
    validation::{
        validate_fetch_request, validate_filters, validate_video_edit, ValidationError,
        ValidationIssue, EDITABLE_COLUMNS,
    },
    BoundParam, BoundStatement, FetchRequest, Filter, QueryBuilder, QueryBuilderError, Sort,
    VideoEdit, DEFAULT_LIMIT, MAX_LIMIT,
};
