use axum::Json;
use strum::IntoEnumIterator;

use crate::{
    server::api::schema_response::{ColumnInfo, SchemaResponse, TableInfo},
    sql::{comparator::Comparator, output_name, schema::Table, EDITABLE_COLUMNS},
};

#[axum_macros::debug_handler]
pub async fn get_schema() -> Json<SchemaResponse> {
    Json(schema_response())
}

pub fn schema_response() -> SchemaResponse {
    let tables = Table::iter()
        .map(|table| TableInfo {
            name: table.to_string(),
            junction: table.junction().map(|junction| junction.table.to_owned()),
            columns: table
                .columns()
                .iter()
                .filter_map(|column| table.column(column.name))
                .map(|column| ColumnInfo {
                    name: column.column.to_owned(),
                    kind: column.kind,
                    array_aggregated: column.is_array_aggregated(),
                    output_name: output_name(&column),
                    comparators: Comparator::iter()
                        .filter(|comparator| column.allows(*comparator))
                        .collect(),
                })
                .collect(),
        })
        .collect();

    SchemaResponse {
        tables,
        editable_columns: EDITABLE_COLUMNS.iter().map(|column| column.to_string()).collect(),
    }
}
