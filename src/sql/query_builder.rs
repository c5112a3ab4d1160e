use std::collections::BTreeSet;

use super::{
    ast::{
        Assignment, BinaryOperator, Expr, Function, FunctionArgExpr, Ident, ObjectName,
        OrderByExpr, Query, SelectItem, Statement, TableWithJoins, Update, Value,
    },
    schema::{ColumnRef, Table},
};

pub mod aliasing;
pub mod casting;
mod error;
mod joins;
mod predicate;
mod table_context;
pub mod validation;

pub use error::QueryBuilderError;
use joins::plan_joins;
use predicate::compile_predicate;
pub use table_context::TableContext;
pub use validation::{FetchRequest, Filter, Sort, VideoEdit};

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 300;

/// A value sent alongside the statement. Everything is bound as text and cast in sql,
/// so the column type decides how a value is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundParam {
    Text(String),
    TextArray(Vec<String>),
    Null,
}

#[derive(Debug, Default)]
pub struct Parameters {
    values: Vec<BoundParam>,
}

impl Parameters {
    pub fn bind(&mut self, param: BoundParam) -> Expr {
        self.values.push(param);
        Expr::Value(Value::Placeholder(self.values.len()))
    }
    pub fn into_inner(self) -> Vec<BoundParam> {
        self.values
    }
}

#[derive(Debug)]
pub struct BoundStatement {
    pub statement: Statement,
    pub parameters: Vec<BoundParam>,
}

impl BoundStatement {
    pub fn sql(&self) -> String {
        self.statement.to_string()
    }
}

pub(crate) fn sql_function(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Function(Function {
        name: ObjectName(vec![Ident::unquoted(name)]),
        args: args.into_iter().map(FunctionArgExpr::Expr).collect(),
    })
}

fn and_reducer(left: Expr, right: Expr) -> Expr {
    Expr::BinaryOp {
        left: Box::new(left),
        op: BinaryOperator::And,
        right: Box::new(right),
    }
}

fn eq(left: Expr, right: Expr) -> Expr {
    Expr::BinaryOp {
        left: Box::new(left),
        op: BinaryOperator::Eq,
        right: Box::new(right),
    }
}

fn video_from(tables: &BTreeSet<Table>) -> Vec<TableWithJoins> {
    vec![TableWithJoins {
        relation: TableContext::new(Table::Video).table_factor(),
        joins: plan_joins(tables),
    }]
}

pub struct QueryBuilder {
    parameters: Parameters,
}

impl QueryBuilder {
    fn new() -> Self {
        Self {
            parameters: Parameters::default(),
        }
    }
    fn finish(self, statement: Statement) -> BoundStatement {
        BoundStatement {
            statement,
            parameters: self.parameters.into_inner(),
        }
    }
    /// The page of rows a request asks for.
    pub fn build_fetch_statement(
        request: &FetchRequest,
    ) -> Result<BoundStatement, QueryBuilderError> {
        let mut builder = Self::new();
        let query = builder.fetch_query(request)?;
        Ok(builder.finish(Statement::Select(query)))
    }
    /// Number of rows the same filters match, ignoring selection, sorting and paging.
    pub fn build_count_statement(filters: &[Filter]) -> Result<BoundStatement, QueryBuilderError> {
        let mut builder = Self::new();
        let query = builder.count_query(filters)?;
        Ok(builder.finish(Statement::Select(query)))
    }
    pub fn build_playlists_statement() -> BoundStatement {
        let playlist = TableContext::new(Table::Playlist);
        let query = Query::new(vec![
            SelectItem::UnnamedExpr(playlist.column("name")),
            SelectItem::UnnamedExpr(playlist.column("id")),
        ])
        .from(vec![TableWithJoins {
            relation: playlist.table_factor(),
            joins: vec![],
        }])
        .order_by(vec![
            OrderByExpr {
                expr: playlist.column("name"),
                asc: Some(true),
                nulls_first: None,
            },
            OrderByExpr {
                expr: playlist.column("id"),
                asc: Some(true),
                nulls_first: None,
            },
        ]);

        Self::new().finish(Statement::Select(query))
    }
    pub fn build_edit_statement(edit: &VideoEdit) -> Result<BoundStatement, QueryBuilderError> {
        if edit.assignments.is_empty() {
            return Err(QueryBuilderError::NoEditedColumns);
        }

        let mut builder = Self::new();
        let video = TableContext::new(Table::Video);

        let assignments = edit
            .assignments
            .iter()
            .map(|(column, value)| {
                let param = match value {
                    Some(value) => BoundParam::Text(value.to_owned()),
                    None => BoundParam::Null,
                };
                Assignment {
                    column: Ident::quoted(column.column),
                    value: casting::cast_parameter(builder.parameters.bind(param), column.kind),
                }
            })
            .collect();

        let id = ColumnRef::video_id();
        let id_param = builder
            .parameters
            .bind(BoundParam::Text(edit.video_id.to_string()));
        let predicate = eq(
            Expr::Identifier(Ident::quoted(id.column)),
            casting::cast_parameter(id_param, id.kind),
        );

        let update = Update {
            table: video.source_factor(),
            assignments,
            predicate: Some(predicate),
        };

        Ok(builder.finish(Statement::Update(update)))
    }
    fn fetch_query(&mut self, request: &FetchRequest) -> Result<Query, QueryBuilderError> {
        let video_id = ColumnRef::video_id();
        let mut tables = BTreeSet::new();

        let mut projection: Vec<SelectItem> = request
            .selection
            .iter()
            .map(|column| {
                tables.insert(column.table);
                aliasing::select_item(column)
            })
            .collect();

        let predicate = compile_predicate(&request.filters, &mut self.parameters)?;
        tables.extend(predicate.tables.iter().copied());

        let mut order_by: Vec<OrderByExpr> = request
            .sort
            .iter()
            .map(|sort| {
                tables.insert(sort.column.table);
                OrderByExpr {
                    expr: TableContext::new(sort.column.table).column(sort.column.column),
                    asc: Some(sort.asc),
                    nulls_first: Some(false),
                }
            })
            .collect();

        if order_by.is_empty() && !request.selection.contains(&video_id) {
            // the id becomes the only ordering, and callers page by it
            projection.push(aliasing::select_item(&video_id));
        }

        // explicit sorts may tie, the primary key never does
        if !request.sort.iter().any(|sort| sort.column == video_id) {
            order_by.push(OrderByExpr {
                expr: TableContext::new(Table::Video).column(video_id.column),
                asc: Some(true),
                nulls_first: None,
            });
        }

        if projection.is_empty() {
            return Err(QueryBuilderError::NoSelectedColumns);
        }

        let limit = match request.limit {
            Some(0) | None => DEFAULT_LIMIT,
            Some(limit) => limit.min(MAX_LIMIT),
        };
        let offset = request.offset.filter(|offset| *offset > 0);

        Ok(Query::new(projection)
            .from(video_from(&tables))
            .predicate(predicate.expr)
            .order_by(order_by)
            .limit(Some(limit))
            .offset(offset))
    }
    fn count_query(&mut self, filters: &[Filter]) -> Result<Query, QueryBuilderError> {
        let predicate = compile_predicate(filters, &mut self.parameters)?;

        let count = Expr::Function(Function {
            name: ObjectName(vec![Ident::unquoted("COUNT")]),
            args: vec![FunctionArgExpr::Wildcard],
        });

        Ok(Query::new(vec![SelectItem::ExprWithAlias {
            expr: count,
            alias: Ident::quoted("count"),
        }])
        .from(video_from(&predicate.tables))
        .predicate(predicate.expr))
    }
}
