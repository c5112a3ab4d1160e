use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::sql::{comparator::Comparator, schema::ColumnKind};

#[derive(Debug, Serialize, Deserialize)]
pub struct SchemaResponse {
    /// Tables a request may reference
    pub tables: Vec<TableInfo>,
    /// Columns accepted by video edits
    pub editable_columns: Vec<String>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    /// Link table the relation is reached through, if any
    pub junction: Option<String>,
    pub columns: Vec<ColumnInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ColumnKind,
    /// Whether values are returned as arrays, one element per related row
    pub array_aggregated: bool,
    /// Name of the column in fetch results
    pub output_name: String,
    /// Comparators accepted in filters on this column
    pub comparators: Vec<Comparator>,
}
