//! FILENAME: core/engine/src/cell.rs
//! PURPOSE: Defines the value held by a single projected grid cell.
//! CONTEXT: Rows handed to the grid widget are maps from column key to
//! `CellValue`. Raw document fields (JSON) are converted into this shape
//! so the projector never has to reason about arbitrary JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The value rendered in one grid cell.
///
/// `Empty` is the "no data" sentinel: the grid shows it as N/A. It is never
/// the same thing as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Boolean(bool),
    Text(String),
    /// Chronological series for sparkline rendering.
    Series(Vec<f64>),
    List(Vec<CellValue>),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// Builds a number cell, mapping NaN and infinities to `Empty`.
    pub fn number(n: f64) -> Self {
        if n.is_finite() {
            CellValue::Number(n)
        } else {
            CellValue::Empty
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the display value of the cell as a String.
    pub fn display_value(&self) -> String {
        match self {
            CellValue::Empty => "N/A".to_string(),
            CellValue::Number(n) => {
                // Format without unnecessary decimal places
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Boolean(b) => b.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Series(points) => format!("{} points", points.len()),
            CellValue::List(items) => items
                .iter()
                .map(CellValue::display_value)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::number(value)
    }
}

impl From<Option<f64>> for CellValue {
    fn from(value: Option<f64>) -> Self {
        value.map(CellValue::number).unwrap_or(CellValue::Empty)
    }
}

impl From<&Value> for CellValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => CellValue::Empty,
            Value::Bool(b) => CellValue::Boolean(*b),
            Value::Number(n) => n.as_f64().map(CellValue::number).unwrap_or(CellValue::Empty),
            Value::String(s) => CellValue::Text(s.clone()),
            Value::Array(items) => CellValue::List(items.iter().map(CellValue::from).collect()),
            // Nested objects have no cell representation of their own; a
            // value getter must pick a path out of them.
            Value::Object(_) => CellValue::Text(value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_finite_numbers_become_empty() {
        assert_eq!(CellValue::number(f64::NAN), CellValue::Empty);
        assert_eq!(CellValue::number(f64::INFINITY), CellValue::Empty);
        assert_eq!(CellValue::number(2.5), CellValue::Number(2.5));
    }

    #[test]
    fn test_from_json_value() {
        assert_eq!(CellValue::from(&json!(null)), CellValue::Empty);
        assert_eq!(CellValue::from(&json!(3)), CellValue::Number(3.0));
        assert_eq!(CellValue::from(&json!("Signed")), CellValue::text("Signed"));
        assert_eq!(
            CellValue::from(&json!(["pop", "rock"])),
            CellValue::List(vec![CellValue::text("pop"), CellValue::text("rock")])
        );
    }

    #[test]
    fn test_empty_serializes_as_null() {
        let json = serde_json::to_value(CellValue::Empty).unwrap();
        assert!(json.is_null());
        let json = serde_json::to_value(CellValue::Series(vec![1.0, 2.0])).unwrap();
        assert_eq!(json, json!([1.0, 2.0]));
    }

    #[test]
    fn test_display_value() {
        assert_eq!(CellValue::Empty.display_value(), "N/A");
        assert_eq!(CellValue::Number(42.0).display_value(), "42");
        assert_eq!(CellValue::Number(0.25).display_value(), "0.25");
    }
}
