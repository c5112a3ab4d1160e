use std::{
    error::Error,
    fmt::{Display, Formatter},
    str::FromStr,
};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;

use crate::{
    server::api::videos_request::{
        Pagination, Select, SortItem, VideoEditRequest, VideosRequest, WhereItem,
    },
    sql::{
        comparator::{Comparator, ComparatorFamily, FilterValue},
        schema::{ColumnKind, ColumnRef, Table},
    },
};

use super::MAX_LIMIT;

/// Columns a client may change through an edit.
pub const EDITABLE_COLUMNS: &[&str] = &["alternative", "download_format"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.issues.as_slice() {
            [issue] => write!(f, "Invalid request: {}: {}", issue.field, issue.message),
            issues => write!(f, "Invalid request: {} problems found", issues.len()),
        }
    }
}
impl Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: ColumnRef,
    pub comparator: Comparator,
    pub value: FilterValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub column: ColumnRef,
    pub asc: bool,
}

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub selection: Vec<ColumnRef>,
    pub filters: Vec<Filter>,
    pub sort: Vec<Sort>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct VideoEdit {
    pub video_id: i64,
    pub assignments: Vec<(ColumnRef, Option<String>)>,
}

#[derive(Default)]
struct Issues(Vec<ValidationIssue>);

impl Issues {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
        });
    }
    fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError { issues: self.0 })
        }
    }
    fn resolve_column(&mut self, field: &str, table: &str, column: &str) -> Option<ColumnRef> {
        let Ok(table_ref) = Table::from_str(table) else {
            self.push(format!("{field}.table"), format!("unknown table \"{table}\""));
            return None;
        };
        let column_ref = table_ref.column(column);
        if column_ref.is_none() {
            self.push(
                format!("{field}.col"),
                format!("unknown column \"{column}\" for table {table_ref}"),
            );
        }
        column_ref
    }
}

/// Checks a fetch request and resolves every name in it. All problems are reported at once.
pub fn validate_fetch_request(
    request: &VideosRequest,
    pagination: &Pagination,
) -> Result<FetchRequest, ValidationError> {
    let mut issues = Issues::default();

    let selection = validate_select(&request.select, &mut issues);
    let filters = collect_filters(&request.filters, &mut issues);
    let sort = validate_sort(&request.sort, &mut issues);

    if pagination.limit.is_some_and(|limit| limit > MAX_LIMIT) {
        issues.push("limit", format!("must be at most {MAX_LIMIT}"));
    }
    if pagination
        .offset
        .is_some_and(|offset| i64::try_from(offset).is_err())
    {
        issues.push("offset", format!("must be at most {}", i64::MAX));
    }

    issues.finish(FetchRequest {
        selection,
        filters,
        sort,
        limit: pagination.limit,
        offset: pagination.offset,
    })
}

pub fn validate_filters(items: &[WhereItem]) -> Result<Vec<Filter>, ValidationError> {
    let mut issues = Issues::default();
    let filters = collect_filters(items, &mut issues);
    issues.finish(filters)
}

pub fn validate_video_edit(
    video_id: i64,
    request: &VideoEditRequest,
) -> Result<VideoEdit, ValidationError> {
    let mut issues = Issues::default();

    if request.is_empty() {
        issues.push(
            "body",
            format!("expected at least one of {}", EDITABLE_COLUMNS.join(", ")),
        );
    }

    let assignments = request
        .iter()
        .filter_map(|(column, value)| {
            let editable = EDITABLE_COLUMNS
                .contains(&column.as_str())
                .then(|| Table::Video.column(column))
                .flatten();
            let Some(column_ref) = editable else {
                issues.push(column.to_owned(), "column cannot be edited");
                return None;
            };
            match value {
                Value::Null => Some((column_ref, None)),
                Value::String(value) => Some((column_ref, Some(value.to_owned()))),
                _ => {
                    issues.push(column.to_owned(), "expected a string or null");
                    None
                }
            }
        })
        .collect();

    issues.finish(VideoEdit {
        video_id,
        assignments,
    })
}

fn validate_select(select: &Select, issues: &mut Issues) -> Vec<ColumnRef> {
    let mut selection: Vec<ColumnRef> = vec![];

    for (table, columns) in select {
        let Some(columns) = columns else {
            continue;
        };
        let Ok(table_ref) = Table::from_str(table) else {
            issues.push(format!("select.{table}"), format!("unknown table \"{table}\""));
            continue;
        };
        for (index, column) in columns.iter().enumerate() {
            match table_ref.column(column) {
                Some(column_ref) if !selection.contains(&column_ref) => {
                    selection.push(column_ref)
                }
                Some(_) => (),
                None => issues.push(
                    format!("select.{table}[{index}]"),
                    format!("unknown column \"{column}\" for table {table_ref}"),
                ),
            }
        }
    }

    selection
}

fn validate_sort(items: &[SortItem], issues: &mut Issues) -> Vec<Sort> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            issues
                .resolve_column(&format!("sort[{index}]"), &item.table, &item.col)
                .map(|column| Sort {
                    column,
                    asc: item.asc,
                })
        })
        .collect()
}

fn collect_filters(items: &[WhereItem], issues: &mut Issues) -> Vec<Filter> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| validate_filter(&format!("where[{index}]"), item, issues))
        .collect()
}

fn validate_filter(field: &str, item: &WhereItem, issues: &mut Issues) -> Option<Filter> {
    let column = issues.resolve_column(field, &item.table, &item.col);

    let Ok(comparator) = Comparator::from_str(&item.comp) else {
        issues.push(
            format!("{field}.comp"),
            format!("unknown comparator \"{}\"", item.comp),
        );
        return None;
    };
    let column = column?;

    if !column.allows(comparator) {
        issues.push(
            format!("{field}.comp"),
            format!(
                "comparator \"{}\" cannot be used on {}.{}",
                comparator, column.table, column.column
            ),
        );
        return None;
    }

    match validate_value(comparator, column.kind, &item.value) {
        Ok(value) => Some(Filter {
            column,
            comparator,
            value,
        }),
        Err(message) => {
            issues.push(format!("{field}.value"), message);
            None
        }
    }
}

fn validate_value(
    comparator: Comparator,
    kind: ColumnKind,
    value: &Value,
) -> Result<FilterValue, String> {
    match comparator.family() {
        ComparatorFamily::BooleanLiteral => Ok(FilterValue::Ignored),
        ComparatorFamily::Scalar => {
            let value = scalar_text(value).ok_or("expected a string or a number")?;
            match kind {
                ColumnKind::Integer if value.parse::<i64>().is_err() => {
                    Err("expected an integer".to_owned())
                }
                ColumnKind::Timestamp if parse_date(&value).is_none() => {
                    Err("expected a date or date-time".to_owned())
                }
                _ => Ok(FilterValue::Scalar(value)),
            }
        }
        ComparatorFamily::DateBucket => value
            .as_str()
            .and_then(parse_date)
            .map(|date| FilterValue::Scalar(date.format("%Y-%m-%d").to_string()))
            .ok_or_else(|| "expected a date such as 2024-01-15".to_owned()),
        ComparatorFamily::Array => {
            let members = match value {
                Value::Array(members) => members.as_slice(),
                // a lone value is a one element list
                single => std::slice::from_ref(single),
            };

            let all_strings = members.iter().all(Value::is_string);
            let all_numbers = members.iter().all(Value::is_number);
            if !all_strings && !all_numbers {
                return Err("expected a list of strings or a list of numbers".to_owned());
            }

            let members = members.iter().filter_map(scalar_text).collect::<Vec<_>>();
            if kind == ColumnKind::Integer
                && members.iter().any(|member| member.parse::<i64>().is_err())
            {
                return Err("expected a list of integers".to_owned());
            }

            Ok(FilterValue::List(members))
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(value) => Some(value.to_owned()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

/// Accepts `YYYY-MM-DD`, RFC 3339, or a date-time without an offset.
fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|date_time| date_time.date_naive())
        })
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|date_time| date_time.date())
        })
}
