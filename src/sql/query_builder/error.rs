use std::{
    error::Error,
    fmt::{Display, Formatter},
};

#[derive(Debug)]
pub enum QueryBuilderError {
    Internal(String),
    NoSelectedColumns,
    NoEditedColumns,
}

impl Display for QueryBuilderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryBuilderError::Internal(message) => write!(f, "Internal error: {}", message),
            QueryBuilderError::NoSelectedColumns => {
                write!(f, "Query must select at least one column")
            }
            QueryBuilderError::NoEditedColumns => {
                write!(f, "Edit must change at least one column")
            }
        }
    }
}
impl Error for QueryBuilderError {}
