use std::fmt;

#[derive(Debug)]
pub enum Statement {
    Select(Query),
    Update(Update),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Select(query) => write!(f, "{}", query),
            Statement::Update(update) => write!(f, "{}", update),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Query {
    projection: Vec<SelectItem>,
    from: Vec<TableWithJoins>,
    predicate: Option<Expr>,
    group_by: Vec<Expr>,
    order_by: Vec<OrderByExpr>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Query {
    pub fn new(projection: Vec<SelectItem>) -> Self {
        Self {
            projection,
            from: vec![],
            predicate: None,
            group_by: vec![],
            order_by: vec![],
            limit: None,
            offset: None,
        }
    }
    pub fn from(self, from: Vec<TableWithJoins>) -> Self {
        Self { from, ..self }
    }
    pub fn predicate(self, predicate: Option<Expr>) -> Self {
        Self { predicate, ..self }
    }
    pub fn group_by(self, group_by: Vec<Expr>) -> Self {
        Self { group_by, ..self }
    }
    pub fn order_by(self, order_by: Vec<OrderByExpr>) -> Self {
        Self { order_by, ..self }
    }
    pub fn limit(self, limit: Option<u64>) -> Self {
        Self { limit, ..self }
    }
    pub fn offset(self, offset: Option<u64>) -> Self {
        Self { offset, ..self }
    }
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT {}", display_separated(&self.projection, ", "))?;
        if !self.from.is_empty() {
            write!(f, " FROM {}", display_separated(&self.from, ", "))?;
        }
        if let Some(predicate) = &self.predicate {
            write!(f, " WHERE {}", predicate)?;
        }
        if !self.group_by.is_empty() {
            write!(f, " GROUP BY {}", display_separated(&self.group_by, ", "))?;
        }
        if !self.order_by.is_empty() {
            write!(f, " ORDER BY {}", display_separated(&self.order_by, ", "))?;
        }
        if let Some(limit) = &self.limit {
            write!(f, " LIMIT {}", limit)?;
        }
        if let Some(offset) = &self.offset {
            write!(f, " OFFSET {}", offset)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct Update {
    pub table: TableFactor,
    pub assignments: Vec<Assignment>,
    pub predicate: Option<Expr>,
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UPDATE {} SET {}",
            self.table,
            display_separated(&self.assignments, ", ")
        )?;
        if let Some(predicate) = &self.predicate {
            write!(f, " WHERE {}", predicate)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct Assignment {
    pub column: Ident,
    pub value: Expr,
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.column, self.value)
    }
}

#[derive(Debug, Clone)]
pub struct OrderByExpr {
    pub expr: Expr,
    pub asc: Option<bool>,
    pub nulls_first: Option<bool>,
}

impl fmt::Display for OrderByExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        match self.asc {
            Some(true) => write!(f, " ASC")?,
            Some(false) => write!(f, " DESC")?,
            None => (),
        }
        match self.nulls_first {
            Some(true) => write!(f, " NULLS FIRST")?,
            Some(false) => write!(f, " NULLS LAST")?,
            None => (),
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum SelectItem {
    UnnamedExpr(Expr),
    ExprWithAlias { expr: Expr, alias: Ident },
}

impl fmt::Display for SelectItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectItem::UnnamedExpr(expr) => write!(f, "{}", expr),
            SelectItem::ExprWithAlias { expr, alias } => write!(f, "{} AS {}", expr, alias),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableWithJoins {
    pub relation: TableFactor,
    pub joins: Vec<Join>,
}

impl fmt::Display for TableWithJoins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.relation)?;
        for join in &self.joins {
            write!(f, "{}", join)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Join {
    pub relation: TableFactor,
    pub join_operator: JoinOperator,
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.join_operator {
            JoinOperator::Inner(JoinConstraint::On(expr)) => {
                write!(f, " INNER JOIN {} ON {}", self.relation, expr)
            }
            JoinOperator::LeftOuter(JoinConstraint::On(expr)) => {
                write!(f, " LEFT JOIN {} ON {}", self.relation, expr)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum JoinOperator {
    Inner(JoinConstraint),
    LeftOuter(JoinConstraint),
}

#[derive(Debug, Clone)]
pub enum JoinConstraint {
    On(Expr),
}

#[derive(Debug, Clone)]
pub enum TableFactor {
    Table {
        name: ObjectName,
        alias: Option<Ident>,
    },
    Derived {
        subquery: Box<Query>,
        alias: Option<Ident>,
    },
}

impl fmt::Display for TableFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableFactor::Table { name, alias } => {
                write!(f, "{}", name)?;
                if let Some(alias) = alias {
                    write!(f, " AS {}", alias)?;
                }
            }
            TableFactor::Derived { subquery, alias } => {
                write!(f, "({})", subquery)?;
                if let Some(alias) = alias {
                    write!(f, " AS {}", alias)?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ObjectName(pub Vec<Ident>);

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", display_separated(&self.0, "."))
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Identifier(Ident),
    CompoundIdentifier(Vec<Ident>),
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },
    Value(Value),
    Function(Function),
    Cast {
        expr: Box<Expr>,
        data_type: DataType,
    },
    /// `ANY(<array expression>)`, only valid as the right hand side of a comparison
    Any(Box<Expr>),
    /// `ANY(<subquery>)`, only valid as the right hand side of a comparison
    AnySubquery(Box<Query>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Identifier(ident) => write!(f, "{}", ident),
            Expr::CompoundIdentifier(idents) => write!(f, "{}", display_separated(idents, ".")),
            Expr::BinaryOp { left, op, right } => write!(f, "{} {} {}", left, op, right),
            Expr::Value(value) => write!(f, "{}", value),
            Expr::Function(function) => write!(f, "{}", function),
            Expr::Cast { expr, data_type } => write!(f, "CAST({} AS {})", expr, data_type),
            Expr::Any(expr) => write!(f, "ANY({})", expr),
            Expr::AnySubquery(query) => write!(f, "ANY({})", query),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: ObjectName,
    pub args: Vec<FunctionArgExpr>,
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, display_separated(&self.args, ", "))
    }
}

#[derive(Debug, Clone)]
pub enum FunctionArgExpr {
    Expr(Expr),
    /// An unqualified `*`
    Wildcard,
}

impl fmt::Display for FunctionArgExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionArgExpr::Expr(expr) => write!(f, "{}", expr),
            FunctionArgExpr::Wildcard => write!(f, "*"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Gt,
    Lt,
    GtEq,
    LtEq,
    Eq,
    NotEq,
    ILike,
    NotILike,
    And,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOperator::Gt => write!(f, ">"),
            BinaryOperator::Lt => write!(f, "<"),
            BinaryOperator::GtEq => write!(f, ">="),
            BinaryOperator::LtEq => write!(f, "<="),
            BinaryOperator::Eq => write!(f, "="),
            BinaryOperator::NotEq => write!(f, "<>"),
            BinaryOperator::ILike => write!(f, "ILIKE"),
            BinaryOperator::NotILike => write!(f, "NOT ILIKE"),
            BinaryOperator::And => write!(f, "AND"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Text,
    BigInt,
    Boolean,
    Timestamptz,
    Date,
    Array(Box<DataType>),
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Text => write!(f, "text"),
            DataType::BigInt => write!(f, "bigint"),
            DataType::Boolean => write!(f, "boolean"),
            DataType::Timestamptz => write!(f, "timestamptz"),
            DataType::Date => write!(f, "date"),
            DataType::Array(inner) => write!(f, "{}[]", inner),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    SingleQuotedString(String),
    Boolean(bool),
    /// A positional parameter, rendered as `$n`. Numbering starts at 1.
    Placeholder(usize),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::SingleQuotedString(s) => {
                // standard_conforming_strings: only the quote itself needs doubling
                write!(f, "'{}'", s.replace('\'', "''"))
            }
            Value::Boolean(b) => {
                if *b {
                    write!(f, "TRUE")
                } else {
                    write!(f, "FALSE")
                }
            }
            Value::Placeholder(index) => write!(f, "${}", index),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ident {
    value: String,
    quoted: bool,
}

impl Ident {
    pub fn quoted<S: Into<String>>(value: S) -> Self {
        Self {
            value: value.into(),
            quoted: true,
        }
    }
    pub fn unquoted<S: Into<String>>(value: S) -> Self {
        Self {
            value: value.into(),
            quoted: false,
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.quoted {
            write!(f, "\"{}\"", self.value.replace('"', "\"\""))
        } else {
            write!(f, "{}", self.value)
        }
    }
}

pub struct DisplaySeparated<'a, T>
where
    T: fmt::Display,
{
    slice: &'a [T],
    separator: &'static str,
}

fn display_separated<'a, T>(slice: &'a [T], separator: &'static str) -> DisplaySeparated<'a, T>
where
    T: fmt::Display,
{
    DisplaySeparated { slice, separator }
}

impl<'a, T> fmt::Display for DisplaySeparated<'a, T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for t in self.slice {
            if first {
                first = false;
            } else {
                write!(f, "{}", self.separator)?;
            }
            write!(f, "{}", t)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_identifiers_escape_embedded_quotes() {
        let ident = Ident::quoted(r#"evil"; DROP TABLE videos; --"#);
        assert_eq!(ident.to_string(), r#""evil""; DROP TABLE videos; --""#);
    }

    #[test]
    fn string_literals_double_single_quotes() {
        let value = Value::SingleQuotedString("it's".to_owned());
        assert_eq!(value.to_string(), "'it''s'");
    }

    #[test]
    fn casts_and_any_render_postgres_syntax() {
        let expr = Expr::Any(Box::new(Expr::Cast {
            expr: Box::new(Expr::Value(Value::Placeholder(3))),
            data_type: DataType::Array(Box::new(DataType::BigInt)),
        }));
        assert_eq!(expr.to_string(), "ANY(CAST($3 AS bigint[]))");
    }

    #[test]
    fn joins_are_separated_by_a_single_space() {
        let from = TableWithJoins {
            relation: TableFactor::Table {
                name: ObjectName(vec![Ident::quoted("videos")]),
                alias: Some(Ident::quoted("video")),
            },
            joins: vec![Join {
                relation: TableFactor::Table {
                    name: ObjectName(vec![Ident::quoted("extra_video_files")]),
                    alias: Some(Ident::quoted("files")),
                },
                join_operator: JoinOperator::LeftOuter(JoinConstraint::On(Expr::BinaryOp {
                    left: Box::new(Expr::CompoundIdentifier(vec![
                        Ident::quoted("files"),
                        Ident::quoted("video_id"),
                    ])),
                    op: BinaryOperator::Eq,
                    right: Box::new(Expr::CompoundIdentifier(vec![
                        Ident::quoted("video"),
                        Ident::quoted("id"),
                    ])),
                })),
            }],
        };
        assert_eq!(
            from.to_string(),
            r#""videos" AS "video" LEFT JOIN "extra_video_files" AS "files" ON "files"."video_id" = "video"."id""#
        );
    }

    #[test]
    fn update_renders_assignments_and_predicate() {
        let update = Update {
            table: TableFactor::Table {
                name: ObjectName(vec![Ident::quoted("videos")]),
                alias: None,
            },
            assignments: vec![Assignment {
                column: Ident::quoted("alternative"),
                value: Expr::Value(Value::Placeholder(1)),
            }],
            predicate: Some(Expr::BinaryOp {
                left: Box::new(Expr::Identifier(Ident::quoted("id"))),
                op: BinaryOperator::Eq,
                right: Box::new(Expr::Value(Value::Placeholder(2))),
            }),
        };
        assert_eq!(
            Statement::Update(update).to_string(),
            r#"UPDATE "videos" SET "alternative" = $1 WHERE "id" = $2"#
        );
    }
}
