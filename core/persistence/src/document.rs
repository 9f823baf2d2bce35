//! FILENAME: core/persistence/src/document.rs
//! Report documents as stored in the document store.
//!
//! The stored shape has no `id`: the id is the document key. Reading is
//! tolerant. Missing or malformed `name`, `columnOrder` and `filterValue`
//! fall back to the defaults of a new report instead of failing the load.

use chrono::{DateTime, Utc};
use report_engine::{
    log_warn, ColumnOrder, FilterItem, FilterModel, LogicOperator, Report, ReportType,
    DEFAULT_REPORT_NAME,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::PersistenceError;

/// Raw persisted report. Every field is optional on the way in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportDocument {
    #[serde(default)]
    pub organization: String,

    #[serde(default)]
    pub name: Value,

    #[serde(rename = "columnOrder", default)]
    pub column_order: Value,

    #[serde(rename = "filterValue", default)]
    pub filter_value: Value,

    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub created_on: Value,
    #[serde(default)]
    pub last_modified_by: String,
    #[serde(default)]
    pub last_modified_on: Value,

    #[serde(rename = "type", default)]
    pub report_type: Value,
}

impl ReportDocument {
    pub fn from_report(report: &Report) -> Self {
        ReportDocument {
            organization: report.organization.clone(),
            name: Value::String(report.name.clone()),
            column_order: Value::from(Vec::<String>::from(report.column_order.clone())),
            filter_value: serde_json::to_value(&report.filter_value).unwrap_or(Value::Null),
            created_by: report.created_by.clone(),
            created_on: Value::String(report.created_on.to_rfc3339()),
            last_modified_by: report.last_modified_by.clone(),
            last_modified_on: Value::String(report.last_modified_on.to_rfc3339()),
            report_type: serde_json::to_value(report.report_type).unwrap_or(Value::Null),
        }
    }

    /// Converts into a report, substituting defaults for malformed facets.
    pub fn into_report(self, id: &str) -> Report {
        let name = match self.name {
            Value::String(name) if !name.trim().is_empty() => name,
            _ => DEFAULT_REPORT_NAME.to_string(),
        };

        let column_order = match self.column_order {
            Value::Array(keys) => ColumnOrder::new(
                keys.into_iter()
                    .filter_map(|key| key.as_str().map(str::to_string)),
            ),
            other => {
                if !other.is_null() {
                    log_warn!("DOCUMENT", "report {}: malformed columnOrder, using default", id);
                }
                ColumnOrder::default()
            }
        };

        let filter_value = parse_filter_model(id, self.filter_value);

        let created_on = parse_time(&self.created_on);
        let last_modified_on = match parse_time(&self.last_modified_on) {
            t if t == DateTime::<Utc>::default() => created_on,
            t => t,
        };

        Report {
            id: id.to_string(),
            organization: self.organization,
            name,
            column_order,
            filter_value,
            created_by: self.created_by,
            created_on,
            last_modified_by: self.last_modified_by,
            last_modified_on,
            report_type: serde_json::from_value(self.report_type).unwrap_or(ReportType::Artist),
        }
    }
}

/// Reads a stored filter model item by item. Items the grid cannot use are
/// dropped on their own; the rest of the filter survives.
fn parse_filter_model(id: &str, value: Value) -> FilterModel {
    let mut map = match value {
        Value::Object(map) => map,
        Value::Null => return FilterModel::default(),
        _ => {
            log_warn!("DOCUMENT", "report {}: malformed filterValue, using default", id);
            return FilterModel::default();
        }
    };

    let items = match map.remove("items") {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<FilterItem>(item) {
                Ok(item) => Some(item),
                Err(e) => {
                    log_warn!("DOCUMENT", "report {}: dropping filter item ({})", id, e);
                    None
                }
            })
            .collect(),
        None | Some(Value::Null) => Vec::new(),
        Some(_) => {
            log_warn!("DOCUMENT", "report {}: malformed filter items, using none", id);
            Vec::new()
        }
    };

    let logic_operator = map
        .remove("logicOperator")
        .and_then(|op| serde_json::from_value::<LogicOperator>(op).ok());

    let quick_filter_values = match map.remove("quickFilterValues") {
        Some(Value::Array(values)) => values,
        _ => Vec::new(),
    };

    FilterModel {
        items,
        logic_operator,
        quick_filter_values,
    }
}

/// Parses a stored report document.
pub fn parse_report(id: &str, json: &str) -> Result<Report, PersistenceError> {
    let value: Value = serde_json::from_str(json)?;
    if !value.is_object() {
        return Err(PersistenceError::InvalidFormat(format!(
            "report {} is not a JSON object",
            id
        )));
    }
    let document: ReportDocument = serde_json::from_value(value)?;
    Ok(document.into_report(id))
}

/// Serializes a report into its stored document form.
pub fn render_report(report: &Report) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string_pretty(&ReportDocument::from_report(report))?)
}

/// Document-store timestamps, epoch millis or RFC 3339. Unknown shapes
/// map to the Unix epoch.
fn parse_time(value: &Value) -> DateTime<Utc> {
    let parsed = match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::Object(map) => map
            .get("seconds")
            .or_else(|| map.get("_seconds"))
            .and_then(Value::as_i64)
            .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    };
    parsed.unwrap_or_default()
}
