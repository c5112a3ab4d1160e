use std::collections::BTreeSet;

use crate::sql::{
    ast::{BinaryOperator, Expr, Query, SelectItem},
    comparator::ComparatorFamily,
    schema::{ColumnRef, Table},
};

use super::{
    and_reducer,
    joins::{junction_column, through_junction},
    Filter, Parameters, QueryBuilderError, TableContext,
};

/// A WHERE expression along with the relations it needs joined in the outer query.
#[derive(Debug)]
pub struct CompiledPredicate {
    pub expr: Option<Expr>,
    pub tables: BTreeSet<Table>,
}

/// Filters are expected to be validated already.
pub fn compile_predicate(
    filters: &[Filter],
    parameters: &mut Parameters,
) -> Result<CompiledPredicate, QueryBuilderError> {
    let mut tables = BTreeSet::new();

    let expr = filters
        .iter()
        .map(|filter| {
            let comparison = compile_comparison(filter, parameters)?;

            if filter.comparator.family() == ComparatorFamily::Array
                && filter.column.is_array_aggregated()
            {
                membership_subquery(&filter.column, comparison)
            } else {
                tables.insert(filter.column.table);
                Ok(comparison)
            }
        })
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .reduce(and_reducer);

    Ok(CompiledPredicate { expr, tables })
}

fn compile_comparison(
    filter: &Filter,
    parameters: &mut Parameters,
) -> Result<Expr, QueryBuilderError> {
    let comparator = filter.comparator;
    let column = TableContext::new(filter.column.table).column(filter.column.column);

    let right = comparator.preprocess_value(&filter.value, filter.column.kind, parameters)?;
    let left = comparator.preprocess_column(column);

    Ok(Expr::BinaryOp {
        left: Box::new(left),
        op: comparator.sql_operator(),
        right: Box::new(right),
    })
}

/// `"video"."id" = ANY(SELECT <junction>.video_id FROM <junction> INNER JOIN <relation> ... WHERE <comparison>)`
///
/// Matches against the individual related rows, so the outer query needs neither the
/// aggregated join nor a GROUP BY.
fn membership_subquery(column: &ColumnRef, comparison: Expr) -> Result<Expr, QueryBuilderError> {
    let junction = column.table.junction().ok_or_else(|| {
        QueryBuilderError::Internal(format!(
            "array aggregated table {} has no junction",
            column.table
        ))
    })?;

    let subquery = Query::new(vec![SelectItem::UnnamedExpr(junction_column(
        &junction,
        junction.video_column,
    ))])
    .from(vec![through_junction(column.table, &junction)])
    .predicate(Some(comparison));

    let video_id = ColumnRef::video_id();

    Ok(Expr::BinaryOp {
        left: Box::new(TableContext::new(video_id.table).column(video_id.column)),
        op: BinaryOperator::Eq,
        right: Box::new(Expr::AnySubquery(subquery.boxed())),
    })
}
