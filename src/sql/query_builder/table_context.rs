use crate::sql::{
    ast::{Expr, Ident, ObjectName, TableFactor},
    schema::Table,
};

/// How a table is named inside a query: the physical table, aliased to its logical name.
#[derive(Debug, Clone, Copy)]
pub struct TableContext {
    table: Table,
}

impl TableContext {
    pub fn new(table: Table) -> Self {
        Self { table }
    }
    pub fn table_ident(&self) -> ObjectName {
        ObjectName(vec![Ident::quoted(self.table.source_table())])
    }
    pub fn alias(&self) -> Ident {
        Ident::quoted(self.table.name())
    }
    /// `"<source>" AS "<alias>"`
    pub fn table_factor(&self) -> TableFactor {
        TableFactor::Table {
            name: self.table_ident(),
            alias: Some(self.alias()),
        }
    }
    /// The physical table without an alias, used as an `UPDATE` target.
    pub fn source_factor(&self) -> TableFactor {
        TableFactor::Table {
            name: self.table_ident(),
            alias: None,
        }
    }
    pub fn column(&self, column: &str) -> Expr {
        Expr::CompoundIdentifier(vec![self.alias(), Ident::quoted(column)])
    }
}
