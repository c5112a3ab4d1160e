use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::{
    ast::{BinaryOperator, DataType, Expr, Value},
    query_builder::{
        casting::{cast_array_parameter, cast_parameter},
        sql_function, BoundParam, Parameters, QueryBuilderError,
    },
    schema::ColumnKind,
};

/// Every comparison a filter may ask for, named by its wire token.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
pub enum Comparator {
    #[strum(serialize = "=")]
    #[serde(rename = "=")]
    Eq,
    #[strum(serialize = "<>")]
    #[serde(rename = "<>")]
    NotEq,
    #[strum(serialize = "<")]
    #[serde(rename = "<")]
    Lt,
    #[strum(serialize = "<=")]
    #[serde(rename = "<=")]
    LtEq,
    #[strum(serialize = ">")]
    #[serde(rename = ">")]
    Gt,
    #[strum(serialize = ">=")]
    #[serde(rename = ">=")]
    GtEq,
    #[strum(serialize = "ILIKE")]
    #[serde(rename = "ILIKE")]
    ILike,
    #[strum(serialize = "NOT ILIKE")]
    #[serde(rename = "NOT ILIKE")]
    NotILike,
    #[strum(serialize = "true")]
    #[serde(rename = "true")]
    True,
    #[strum(serialize = "false")]
    #[serde(rename = "false")]
    False,
    #[strum(serialize = "at")]
    #[serde(rename = "at")]
    At,
    #[strum(serialize = "before")]
    #[serde(rename = "before")]
    Before,
    #[strum(serialize = "after")]
    #[serde(rename = "after")]
    After,
    #[strum(serialize = "array=")]
    #[serde(rename = "array=")]
    ArrayEq,
    #[strum(serialize = "arrayLike")]
    #[serde(rename = "arrayLike")]
    ArrayLike,
    #[strum(serialize = "arrayAny")]
    #[serde(rename = "arrayAny")]
    ArrayAny,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparatorFamily {
    /// a single column compared to a single value
    Scalar,
    /// the value is ignored, the column is compared to a literal
    BooleanLiteral,
    /// both sides are compared at day granularity
    DateBucket,
    /// the value is a list; aggregated relations are matched through a sub-select
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueTransform {
    /// bind the value, cast to the column type
    Bind,
    /// bind the value, cast to `date`
    CastToDate,
    Literal(bool),
    /// bind the list as an array of the column type, wrapped in `ANY(...)`
    AnyOf,
    /// like `AnyOf`, with every member lower-cased before binding
    LowercaseAnyOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnTransform {
    Identity,
    /// `date_trunc('day', column)`
    TruncateToDay,
    /// `lower(column)`
    Lowercase,
}

/// The three coordinated behaviours of a comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparatorSpec {
    pub family: ComparatorFamily,
    pub operator: BinaryOperator,
    pub value: ValueTransform,
    pub column: ColumnTransform,
}

/// The value side of a validated filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Ignored,
    Scalar(String),
    List(Vec<String>),
}

impl Comparator {
    pub fn spec(self) -> ComparatorSpec {
        use BinaryOperator as Op;
        use ColumnTransform as CT;
        use ComparatorFamily as F;
        use ValueTransform as VT;

        let (family, operator, value, column) = match self {
            Comparator::Eq => (F::Scalar, Op::Eq, VT::Bind, CT::Identity),
            Comparator::NotEq => (F::Scalar, Op::NotEq, VT::Bind, CT::Identity),
            Comparator::Lt => (F::Scalar, Op::Lt, VT::Bind, CT::Identity),
            Comparator::LtEq => (F::Scalar, Op::LtEq, VT::Bind, CT::Identity),
            Comparator::Gt => (F::Scalar, Op::Gt, VT::Bind, CT::Identity),
            Comparator::GtEq => (F::Scalar, Op::GtEq, VT::Bind, CT::Identity),
            Comparator::ILike => (F::Scalar, Op::ILike, VT::Bind, CT::Identity),
            Comparator::NotILike => (F::Scalar, Op::NotILike, VT::Bind, CT::Identity),
            Comparator::True => (F::BooleanLiteral, Op::Eq, VT::Literal(true), CT::Identity),
            Comparator::False => (F::BooleanLiteral, Op::Eq, VT::Literal(false), CT::Identity),
            Comparator::At => (F::DateBucket, Op::Eq, VT::CastToDate, CT::TruncateToDay),
            Comparator::Before => (F::DateBucket, Op::Lt, VT::CastToDate, CT::TruncateToDay),
            Comparator::After => (F::DateBucket, Op::Gt, VT::CastToDate, CT::TruncateToDay),
            Comparator::ArrayEq => (F::Array, Op::Eq, VT::LowercaseAnyOf, CT::Lowercase),
            Comparator::ArrayLike => (F::Array, Op::ILike, VT::AnyOf, CT::Identity),
            Comparator::ArrayAny => (F::Array, Op::Eq, VT::AnyOf, CT::Identity),
        };

        ComparatorSpec {
            family,
            operator,
            value,
            column,
        }
    }
    pub fn family(self) -> ComparatorFamily {
        self.spec().family
    }
    pub fn sql_operator(self) -> BinaryOperator {
        self.spec().operator
    }
    /// Turns a filter value into the right hand side of the comparison, binding any user
    /// supplied data through `parameters`.
    pub fn preprocess_value(
        self,
        value: &FilterValue,
        kind: ColumnKind,
        parameters: &mut Parameters,
    ) -> Result<Expr, QueryBuilderError> {
        match (self.spec().value, value) {
            (ValueTransform::Literal(literal), _) => Ok(Expr::Value(Value::Boolean(literal))),
            (ValueTransform::Bind, FilterValue::Scalar(value)) => {
                let parameter = parameters.bind(BoundParam::Text(value.to_owned()));
                Ok(cast_parameter(parameter, kind))
            }
            (ValueTransform::CastToDate, FilterValue::Scalar(value)) => {
                let parameter = parameters.bind(BoundParam::Text(value.to_owned()));
                Ok(Expr::Cast {
                    expr: Box::new(parameter),
                    data_type: DataType::Date,
                })
            }
            (ValueTransform::AnyOf, FilterValue::List(values)) => {
                let parameter = parameters.bind(BoundParam::TextArray(values.to_owned()));
                Ok(Expr::Any(Box::new(cast_array_parameter(parameter, kind))))
            }
            (ValueTransform::LowercaseAnyOf, FilterValue::List(values)) => {
                let values = values.iter().map(|value| value.to_lowercase()).collect();
                Ok(Expr::Any(Box::new(
                    parameters.bind(BoundParam::TextArray(values)),
                )))
            }
            (transform, value) => Err(QueryBuilderError::Internal(format!(
                "comparator {} ({:?}) cannot take a value shaped like {:?}",
                self, transform, value
            ))),
        }
    }
    pub fn preprocess_column(self, column: Expr) -> Expr {
        match self.spec().column {
            ColumnTransform::Identity => column,
            ColumnTransform::TruncateToDay => sql_function(
                "date_trunc",
                vec![Expr::Value(Value::SingleQuotedString("day".to_owned())), column],
            ),
            ColumnTransform::Lowercase => sql_function("lower", vec![column]),
        }
    }
}
