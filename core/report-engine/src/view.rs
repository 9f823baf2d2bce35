//! FILENAME: core/report-engine/src/view.rs
//! Report View - Renderable output for the grid widget.
//!
//! The builder produces `ColumnDefinition`s and the projector produces
//! `Row`s. Both are hand-off artifacts: the grid renders them and hands
//! back nothing but a new column order or filter model.

use std::collections::BTreeMap;

use engine::{CellValue, MetricFunction};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ============================================================================
// COLUMN DEFINITION
// ============================================================================

/// What a column reads from a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ColumnKind {
    /// A field copied from the record.
    Static,
    /// An external profile link.
    Link { source: String },
    /// A metric derived from a statistic history. Catalog entries (the
    /// picker's parent rows) carry no function; built columns carry one.
    #[serde(rename_all = "camelCase")]
    Metric {
        statistic_id: String,
        function: Option<MetricFunction>,
    },
}

/// How a static column turns the raw field into a cell value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ValueGetter {
    /// Copy the field as-is.
    #[default]
    Raw,
    /// Number of items in a list field.
    Count,
    /// List items joined into one text.
    Join { separator: String },
    /// Document timestamp rendered as a `YYYY-MM-DD` date.
    Timestamp,
    /// Dot path into an object field, e.g. `url` inside `avatar`.
    Path(String),
}

/// A single grid column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    /// Unique key, identical to the column order entry.
    pub key: String,

    /// Header label.
    pub label: String,

    pub kind: ColumnKind,

    /// Metric functions: all available ones for catalog entries, the
    /// applied one for built columns, empty for static and link columns.
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub functions: SmallVec<[MetricFunction; 5]>,

    /// Opaque rendering hint for the grid ("link", "sparkline", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_hint: Option<String>,

    #[serde(default, skip_serializing)]
    pub value_getter: ValueGetter,
}

impl ColumnDefinition {
    /// A static field column.
    pub fn field(key: impl Into<String>, label: impl Into<String>) -> Self {
        ColumnDefinition {
            key: key.into(),
            label: label.into(),
            kind: ColumnKind::Static,
            functions: SmallVec::new(),
            render_hint: None,
            value_getter: ValueGetter::Raw,
        }
    }

    pub fn with_getter(mut self, getter: ValueGetter) -> Self {
        self.value_getter = getter;
        self
    }

    pub fn with_render_hint(mut self, hint: impl Into<String>) -> Self {
        self.render_hint = Some(hint.into());
        self
    }

    /// Returns true for numeric, time-series-derived columns.
    pub fn is_metric(&self) -> bool {
        matches!(self.kind, ColumnKind::Metric { .. })
    }

    /// The applied metric function of a built metric column.
    pub fn metric_function(&self) -> Option<MetricFunction> {
        match &self.kind {
            ColumnKind::Metric { function, .. } => *function,
            _ => None,
        }
    }
}

// ============================================================================
// ROWS
// ============================================================================

/// One projected grid row: record id plus one value per built column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: String,

    #[serde(flatten)]
    pub cells: BTreeMap<String, CellValue>,
}

impl Row {
    pub fn new(id: impl Into<String>) -> Self {
        Row {
            id: id.into(),
            cells: BTreeMap::new(),
        }
    }

    /// Value of a column, `Empty` when the column is not part of the row.
    pub fn get(&self, key: &str) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.cells.get(key).unwrap_or(&EMPTY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_serializes_flat() {
        let mut row = Row::new("a1");
        row.cells.insert("name".to_string(), CellValue::text("Nova Lane"));
        row.cells.insert("statistic.sp-latest".to_string(), CellValue::Empty);

        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            json!({ "id": "a1", "name": "Nova Lane", "statistic.sp-latest": null })
        );
        assert_eq!(row.get("missing"), &CellValue::Empty);
    }

    #[test]
    fn test_column_definition_for_grid() {
        let column = ColumnDefinition::field("created_on", "Added")
            .with_getter(ValueGetter::Timestamp)
            .with_render_hint("date");

        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(json["key"], json!("created_on"));
        assert_eq!(json["renderHint"], json!("date"));
        assert_eq!(json["kind"], json!({ "type": "static" }));
        assert!(json.get("valueGetter").is_none());
        assert!(json.get("functions").is_none());
        assert!(!column.is_metric());
    }
}
