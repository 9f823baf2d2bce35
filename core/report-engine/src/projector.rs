//! FILENAME: core/report-engine/src/projector.rs
//! Row Projector - Maps raw records onto built columns.
//!
//! Projection only reads records. Missing fields, links and statistic
//! histories produce `CellValue::Empty` (or an empty series for trend
//! columns), never an error and never zero.

use chrono::{DateTime, NaiveDate, Utc};
use engine::{CellValue, EntityRecord, MetricOutput, MetricSettings};
use serde_json::Value;

use crate::view::{ColumnDefinition, ColumnKind, Row, ValueGetter};

/// Projects every record into a row holding one value per column.
pub fn project_rows(
    columns: &[ColumnDefinition],
    records: &[EntityRecord],
    settings: &MetricSettings,
) -> Vec<Row> {
    records
        .iter()
        .map(|record| project_row(columns, record, settings))
        .collect()
}

/// Projects a single record.
pub fn project_row(columns: &[ColumnDefinition], record: &EntityRecord, settings: &MetricSettings) -> Row {
    let mut row = Row::new(record.id.clone());
    for column in columns {
        row.cells
            .insert(column.key.clone(), project_value(column, record, settings));
    }
    row
}

/// Computes the value of one column for one record.
pub fn project_value(column: &ColumnDefinition, record: &EntityRecord, settings: &MetricSettings) -> CellValue {
    match &column.kind {
        ColumnKind::Static => read_field(&column.value_getter, record.field(&column.key)),
        ColumnKind::Link { source } => record
            .link(source)
            .filter(|url| !url.is_empty())
            .map(CellValue::text)
            .unwrap_or(CellValue::Empty),
        ColumnKind::Metric {
            statistic_id,
            function: Some(function),
        } => {
            let output = match record.statistic(statistic_id) {
                Some(entry) => function.apply(&entry.values, settings),
                None => function.missing_output(),
            };
            metric_cell(output)
        }
        // Catalog entries have no single function to evaluate.
        ColumnKind::Metric { function: None, .. } => CellValue::Empty,
    }
}

fn metric_cell(output: MetricOutput) -> CellValue {
    match output {
        MetricOutput::Scalar(value) => CellValue::from(value),
        MetricOutput::Series(points) => CellValue::Series(points),
    }
}

// ============================================================================
// VALUE GETTERS
// ============================================================================

/// Applies a value getter to a raw document field.
pub fn read_field(getter: &ValueGetter, raw: Option<&Value>) -> CellValue {
    let Some(raw) = raw else {
        return CellValue::Empty;
    };

    match getter {
        ValueGetter::Raw => CellValue::from(raw),
        ValueGetter::Count => match raw {
            Value::Array(items) => CellValue::Number(items.len() as f64),
            Value::Object(map) => CellValue::Number(map.len() as f64),
            Value::Null => CellValue::Empty,
            _ => CellValue::Number(1.0),
        },
        ValueGetter::Join { separator } => match raw {
            Value::Array(items) => CellValue::Text(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => CellValue::from(other).display_value(),
                    })
                    .collect::<Vec<_>>()
                    .join(separator),
            ),
            other => CellValue::from(other),
        },
        ValueGetter::Timestamp => parse_timestamp(raw)
            .map(|ts| CellValue::Text(ts.format("%Y-%m-%d").to_string()))
            .unwrap_or(CellValue::Empty),
        ValueGetter::Path(path) => path
            .split('.')
            .try_fold(raw, |value, segment| value.get(segment))
            .map(CellValue::from)
            .unwrap_or(CellValue::Empty),
    }
}

/// Accepts document-store timestamps (`{seconds, nanoseconds}`), epoch
/// milliseconds and RFC 3339 / plain date strings.
fn parse_timestamp(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::Object(map) => {
            let seconds = map.get("seconds").or_else(|| map.get("_seconds"))?.as_i64()?;
            let nanos = map
                .get("nanoseconds")
                .or_else(|| map.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            DateTime::from_timestamp(seconds, u32::try_from(nanos).ok()?)
        }
        Value::Number(n) => DateTime::from_timestamp_millis(n.as_i64()?),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|ts| ts.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()?
                    .and_hms_opt(0, 0, 0)
                    .map(|dt| dt.and_utc())
            }),
        _ => None,
    }
}
