use crate::sql::{
    ast::{DataType, Expr},
    schema::ColumnKind,
};

/// The sql type values of a column are compared as.
pub fn data_type(kind: ColumnKind) -> DataType {
    match kind {
        ColumnKind::Text => DataType::Text,
        ColumnKind::Integer => DataType::BigInt,
        ColumnKind::Boolean => DataType::Boolean,
        ColumnKind::Timestamp => DataType::Timestamptz,
        ColumnKind::TextArray => DataType::Array(Box::new(DataType::Text)),
    }
}

/// Parameters are always bound as text, so anything else gets an explicit cast.
pub fn cast_parameter(parameter: Expr, kind: ColumnKind) -> Expr {
    match data_type(kind) {
        DataType::Text => parameter,
        data_type => Expr::Cast {
            expr: Box::new(parameter),
            data_type,
        },
    }
}

/// Same as `cast_parameter` for a `text[]` parameter holding one element per value.
pub fn cast_array_parameter(parameter: Expr, kind: ColumnKind) -> Expr {
    match data_type(kind) {
        DataType::Text | DataType::Array(_) => parameter,
        element => Expr::Cast {
            expr: Box::new(parameter),
            data_type: DataType::Array(Box::new(element)),
        },
    }
}
