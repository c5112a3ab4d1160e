use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;

/// Columns to return, keyed by table. A `null` list is the same as leaving the table out.
pub type Select = IndexMap<String, Option<Vec<String>>>;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VideosRequest {
    pub select: Select,
    #[serde(default)]
    pub sort: Vec<SortItem>,
    #[serde(default, rename = "where")]
    pub filters: Vec<WhereItem>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CountRequest {
    #[serde(default, rename = "where")]
    pub filters: Vec<WhereItem>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WhereItem {
    pub table: String,
    pub col: String,
    pub comp: String,
    /// string, number, or a list of these depending on the comparator. Ignored by `true`/`false`
    #[serde(default)]
    pub value: Value,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SortItem {
    pub table: String,
    pub col: String,
    #[serde(default = "default_asc")]
    pub asc: bool,
}

fn default_asc() -> bool {
    true
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Body of a video edit: column name to new value, `null` clears the column.
pub type VideoEditRequest = IndexMap<String, Value>;
