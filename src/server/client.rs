use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{json, Value};
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::Query,
    Column, PgPool, Postgres, Row as _, TypeInfo,
};
use tracing::{debug, info_span, Instrument};

use crate::sql::{BoundParam, BoundStatement};

use super::api::videos_response::Row;

fn bind_parameters<'q>(
    sql: &'q str,
    parameters: &[BoundParam],
) -> Query<'q, Postgres, PgArguments> {
    parameters
        .iter()
        .fold(sqlx::query(sql), |query, parameter| match parameter {
            BoundParam::Text(value) => query.bind(value.to_owned()),
            BoundParam::TextArray(values) => query.bind(values.to_owned()),
            BoundParam::Null => query.bind(Option::<String>::None),
        })
}

pub async fn fetch_rows(pool: &PgPool, statement: &BoundStatement) -> Result<Vec<Row>, sqlx::Error> {
    let sql = statement.sql();
    debug!(sql = %sql, parameters = ?statement.parameters, "fetching rows");

    let rows = bind_parameters(&sql, &statement.parameters)
        .fetch_all(pool)
        .instrument(info_span!("fetch_rows"))
        .await?;

    rows.iter().map(convert_row).collect()
}

/// Runs a `COUNT(*) AS "count"` statement.
pub async fn fetch_count(pool: &PgPool, statement: &BoundStatement) -> Result<i64, sqlx::Error> {
    let sql = statement.sql();
    debug!(sql = %sql, parameters = ?statement.parameters, "fetching count");

    let row = bind_parameters(&sql, &statement.parameters)
        .fetch_one(pool)
        .instrument(info_span!("fetch_count"))
        .await?;

    row.try_get::<i64, _>("count")
}

/// Returns the number of affected rows.
pub async fn execute(pool: &PgPool, statement: &BoundStatement) -> Result<u64, sqlx::Error> {
    let sql = statement.sql();
    debug!(sql = %sql, parameters = ?statement.parameters, "executing statement");

    let result = bind_parameters(&sql, &statement.parameters)
        .execute(pool)
        .instrument(info_span!("execute"))
        .await?;

    Ok(result.rows_affected())
}

pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

fn convert_row(row: &PgRow) -> Result<Row, sqlx::Error> {
    row.columns()
        .iter()
        .map(|column| {
            let value = decode_column(row, column.ordinal(), column.type_info().name())?;
            Ok((column.name().to_owned(), value))
        })
        .collect()
}

/// Decodes a column by its postgres type name. Unknown types are read as text when possible.
fn decode_column(row: &PgRow, index: usize, type_name: &str) -> Result<Value, sqlx::Error> {
    Ok(match type_name {
        "BOOL" => json!(row.try_get::<Option<bool>, _>(index)?),
        "INT2" => json!(row.try_get::<Option<i16>, _>(index)?),
        "INT4" => json!(row.try_get::<Option<i32>, _>(index)?),
        "INT8" => json!(row.try_get::<Option<i64>, _>(index)?),
        "FLOAT4" => json!(row.try_get::<Option<f32>, _>(index)?),
        "FLOAT8" => json!(row.try_get::<Option<f64>, _>(index)?),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
            json!(row.try_get::<Option<String>, _>(index)?)
        }
        "TIMESTAMPTZ" => json!(row
            .try_get::<Option<DateTime<Utc>>, _>(index)?
            .map(|value| value.to_rfc3339())),
        "TIMESTAMP" => json!(row
            .try_get::<Option<NaiveDateTime>, _>(index)?
            .map(|value| value.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
        "DATE" => json!(row
            .try_get::<Option<NaiveDate>, _>(index)?
            .map(|value| value.to_string())),
        "JSON" | "JSONB" => row.try_get::<Option<Value>, _>(index)?.unwrap_or(Value::Null),
        "TEXT[]" | "VARCHAR[]" | "BPCHAR[]" | "NAME[]" => {
            json!(row.try_get::<Option<Vec<Option<String>>>, _>(index)?)
        }
        "INT2[]" => json!(row.try_get::<Option<Vec<Option<i16>>>, _>(index)?),
        "INT4[]" => json!(row.try_get::<Option<Vec<Option<i32>>>, _>(index)?),
        "INT8[]" => json!(row.try_get::<Option<Vec<Option<i64>>>, _>(index)?),
        "BOOL[]" => json!(row.try_get::<Option<Vec<Option<bool>>>, _>(index)?),
        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
    })
}
