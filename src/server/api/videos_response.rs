use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A result row keyed by output column name, in selection order.
pub type Row = IndexMap<String, Value>;

#[derive(Debug, Serialize, Deserialize)]
pub struct VideosResponse {
    pub rows: Vec<Row>,
    /// Rows matching the filters, ignoring limit and offset
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: i64,
}
