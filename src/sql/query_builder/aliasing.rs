use crate::sql::{
    ast::{Ident, SelectItem},
    schema::{ColumnRef, Table},
};

use super::TableContext;

/// Output name of a selected column. Video columns keep their name, relation columns are
/// prefixed with the relation so that e.g. `channel.thumbnail` and `video.thumbnail` don't clash.
pub fn output_name(column: &ColumnRef) -> String {
    match column.table {
        Table::Video => column.column.to_owned(),
        table => format!("{}_{}", table.name(), column.column),
    }
}

pub fn select_item(column: &ColumnRef) -> SelectItem {
    let expr = TableContext::new(column.table).column(column.column);

    match column.table {
        Table::Video => SelectItem::UnnamedExpr(expr),
        _ => SelectItem::ExprWithAlias {
            expr,
            alias: Ident::quoted(output_name(column)),
        },
    }
}
