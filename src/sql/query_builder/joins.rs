use std::collections::BTreeSet;

use crate::sql::{
    ast::{
        BinaryOperator, Expr, Ident, Join, JoinConstraint, JoinOperator, ObjectName, Query,
        SelectItem, TableFactor, TableWithJoins,
    },
    schema::{Junction, Table},
};

use super::{sql_function, TableContext};

/// How a relation is attached to the `video` anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStrategy {
    /// one row per video, joined on the video id
    Direct,
    /// joined through its link table; at most one related row per video is assumed.
    /// A video with several links repeats in fetched rows when the relation is selected
    /// or sorted on, while the count still sees it once; fetch and count only agree
    /// under that assumption.
    Junction(Junction),
    /// link table and relation grouped by video id into a derived table of arrays
    PreAggregated(Junction),
}

impl JoinStrategy {
    pub fn for_table(table: Table) -> Option<Self> {
        match (table, table.junction()) {
            (Table::Video, _) => None,
            (Table::Files, _) => Some(JoinStrategy::Direct),
            (table, Some(junction)) if table.is_array_aggregated() => {
                Some(JoinStrategy::PreAggregated(junction))
            }
            (_, Some(junction)) => Some(JoinStrategy::Junction(junction)),
            (_, None) => Some(JoinStrategy::Direct),
        }
    }
    fn joins(self, table: Table) -> Vec<Join> {
        let video_id = TableContext::new(Table::Video).column("id");
        let relation = TableContext::new(table);

        match self {
            JoinStrategy::Direct => vec![left_join(
                relation.table_factor(),
                eq(relation.column("video_id"), video_id),
            )],
            JoinStrategy::Junction(junction) => vec![
                left_join(
                    junction_factor(&junction),
                    eq(junction_column(&junction, junction.video_column), video_id),
                ),
                left_join(
                    relation.table_factor(),
                    eq(
                        relation.column("id"),
                        junction_column(&junction, junction.relation_column),
                    ),
                ),
            ],
            JoinStrategy::PreAggregated(junction) => {
                let video_column = junction_column(&junction, junction.video_column);

                let mut projection = vec![SelectItem::UnnamedExpr(video_column.clone())];
                projection.extend(table.columns().iter().map(|column| {
                    SelectItem::ExprWithAlias {
                        expr: sql_function("array_agg", vec![relation.column(column.name)]),
                        alias: Ident::quoted(column.name),
                    }
                }));

                let aggregated = Query::new(projection)
                    .from(vec![through_junction(table, &junction)])
                    .group_by(vec![video_column]);

                vec![left_join(
                    TableFactor::Derived {
                        subquery: aggregated.boxed(),
                        alias: Some(relation.alias()),
                    },
                    eq(relation.column(junction.video_column), video_id),
                )]
            }
        }
    }
}

/// Joins needed to reference every table in `tables`, in a stable order.
/// Each relation is joined at most once.
pub fn plan_joins(tables: &BTreeSet<Table>) -> Vec<Join> {
    tables
        .iter()
        .filter_map(|table| JoinStrategy::for_table(*table).map(|strategy| (*table, strategy)))
        .flat_map(|(table, strategy)| strategy.joins(table))
        .collect()
}

/// `"<junction>" INNER JOIN "<source>" AS "<alias>" ON "<alias>"."id" = "<junction>"."<relation column>"`
pub(super) fn through_junction(table: Table, junction: &Junction) -> TableWithJoins {
    let relation = TableContext::new(table);
    TableWithJoins {
        relation: junction_factor(junction),
        joins: vec![Join {
            relation: relation.table_factor(),
            join_operator: JoinOperator::Inner(JoinConstraint::On(eq(
                relation.column("id"),
                junction_column(junction, junction.relation_column),
            ))),
        }],
    }
}

pub(super) fn junction_column(junction: &Junction, column: &str) -> Expr {
    Expr::CompoundIdentifier(vec![Ident::quoted(junction.table), Ident::quoted(column)])
}

fn junction_factor(junction: &Junction) -> TableFactor {
    TableFactor::Table {
        name: ObjectName(vec![Ident::quoted(junction.table)]),
        alias: None,
    }
}

fn left_join(relation: TableFactor, on: Expr) -> Join {
    Join {
        relation,
        join_operator: JoinOperator::LeftOuter(JoinConstraint::On(on)),
    }
}

fn eq(left: Expr, right: Expr) -> Expr {
    Expr::BinaryOp {
        left: Box::new(left),
        op: BinaryOperator::Eq,
        right: Box::new(right),
    }
}
