//! FILENAME: core/report-engine/src/definition.rs
//! Report Definition - The serializable configuration.
//!
//! This module contains all the types needed to DESCRIBE a report.
//! These structures are designed to be:
//! - Serializable (for saving/loading report documents)
//! - Handed to the grid widget as-is (camelCase field names)
//! - Immutable snapshots of user intent: every edit produces a new value

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use engine::MetricFunction;
use parser::{parse_column_key, ColumnKey, FUNCTION_SEPARATOR};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Key of the column every report starts with.
pub const LEAD_COLUMN: &str = "name";

/// Name given to freshly created reports.
pub const DEFAULT_REPORT_NAME: &str = "Untitled Report";

// ============================================================================
// COLUMN ORDER
// ============================================================================

/// Ordered, duplicate-free list of column keys, always led by `name`.
///
/// The order is the single source of truth for the grid's left-to-right
/// layout. Construction normalizes: keys are trimmed, duplicates are
/// dropped (first wins), blank keys are dropped and the lead column is
/// moved or added to the front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ColumnOrder {
    keys: Vec<String>,
}

impl ColumnOrder {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut normalized: Vec<String> = vec![LEAD_COLUMN.to_string()];
        for key in keys {
            let key = key.into().trim().to_string();
            if key.is_empty() || normalized.contains(&key) {
                continue;
            }
            normalized.push(key);
        }
        ColumnOrder { keys: normalized }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Never true: the lead column is always present.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Returns a new order with `key` appended, unless already present.
    pub fn with_key(&self, key: impl Into<String>) -> Self {
        ColumnOrder::new(self.keys.iter().cloned().chain(std::iter::once(key.into())))
    }

    /// Returns a new order without `key`. The lead column cannot be removed.
    pub fn without_key(&self, key: &str) -> Self {
        ColumnOrder::new(self.keys.iter().filter(|k| k.as_str() != key).cloned())
    }
}

impl Default for ColumnOrder {
    fn default() -> Self {
        ColumnOrder::new(Vec::<String>::new())
    }
}

impl From<Vec<String>> for ColumnOrder {
    fn from(keys: Vec<String>) -> Self {
        ColumnOrder::new(keys)
    }
}

impl From<ColumnOrder> for Vec<String> {
    fn from(order: ColumnOrder) -> Self {
        order.keys
    }
}

// ============================================================================
// COLUMN SELECTION
// ============================================================================

/// One entry of the column picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectionEntry {
    /// A static or link column switched on or off.
    Enabled(bool),
    /// A metric column: function key -> enabled.
    Functions(BTreeMap<String, bool>),
}

/// What the column picker has switched on.
///
/// Metric columns are grouped under `statistic.<id>`; the order key of each
/// enabled function is `statistic.<id>-<function>`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSelection {
    entries: BTreeMap<String, SelectionEntry>,
}

impl ColumnSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, key: &str) -> Option<&SelectionEntry> {
        self.entries.get(key)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &SelectionEntry)> {
        self.entries.iter()
    }

    /// Returns a copy with a static/link column switched.
    pub fn with_column(&self, key: impl Into<String>, enabled: bool) -> Self {
        let mut next = self.clone();
        next.entries.insert(key.into(), SelectionEntry::Enabled(enabled));
        next
    }

    /// Returns a copy with one metric function of a metric column switched.
    pub fn with_function(
        &self,
        selection_key: impl Into<String>,
        function_key: impl Into<String>,
        enabled: bool,
    ) -> Self {
        let mut next = self.clone();
        let entry = next
            .entries
            .entry(selection_key.into())
            .or_insert_with(|| SelectionEntry::Functions(BTreeMap::new()));
        if let SelectionEntry::Enabled(_) = entry {
            *entry = SelectionEntry::Functions(BTreeMap::new());
        }
        if let SelectionEntry::Functions(functions) = entry {
            functions.insert(function_key.into(), enabled);
        }
        next
    }

    /// Whether the selection explicitly switches `order_key` off.
    /// Keys the selection does not mention are not disabled.
    pub fn is_disabled(&self, order_key: &str) -> bool {
        let Ok(key) = parse_column_key(order_key) else {
            return matches!(self.entries.get(order_key), Some(SelectionEntry::Enabled(false)));
        };

        match (self.entries.get(&key.selection_key()), key.function_key()) {
            (Some(SelectionEntry::Enabled(enabled)), _) => !enabled,
            (Some(SelectionEntry::Functions(functions)), Some(function)) => {
                functions.get(function) == Some(&false)
            }
            _ => false,
        }
    }

    /// Order keys of every enabled column, in selection order.
    /// Metric functions follow the picker order of `MetricFunction::ALL`.
    pub fn enabled_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        for (selection_key, entry) in &self.entries {
            match entry {
                SelectionEntry::Enabled(true) => {
                    if parser::statistic_selection_id(selection_key).is_none() {
                        keys.push(selection_key.clone());
                    }
                }
                SelectionEntry::Enabled(false) => {}
                SelectionEntry::Functions(functions) => {
                    let mut enabled: Vec<&String> = functions
                        .iter()
                        .filter(|(_, on)| **on)
                        .map(|(function, _)| function)
                        .collect();
                    enabled.sort_by_key(|function| function_rank(function));
                    keys.extend(enabled.into_iter().map(|function| {
                        format!("{}{}{}", selection_key, FUNCTION_SEPARATOR, function)
                    }));
                }
            }
        }
        keys
    }
}

fn function_rank(function: &str) -> (usize, String) {
    let position = MetricFunction::ALL
        .iter()
        .position(|f| f.key() == function)
        .unwrap_or(MetricFunction::ALL.len());
    (position, function.to_string())
}

impl FromIterator<(String, SelectionEntry)> for ColumnSelection {
    fn from_iter<T: IntoIterator<Item = (String, SelectionEntry)>>(iter: T) -> Self {
        ColumnSelection {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Builds the selection that corresponds to an existing column order.
pub fn selection_from_order(order: &ColumnOrder) -> ColumnSelection {
    let mut selection = ColumnSelection::new();
    for key in order.iter() {
        selection = match parse_column_key(key) {
            Ok(parsed @ ColumnKey::Statistic { .. }) => {
                let function = parsed.function_key().unwrap_or_default().to_string();
                selection.with_function(parsed.selection_key(), function, true)
            }
            Ok(parsed) => selection.with_column(parsed.to_string(), true),
            Err(_) => selection,
        };
    }
    selection
}

// ============================================================================
// FILTER DEFINITIONS
// ============================================================================

/// Filter operator. Interpreted by the grid only; the engine just stores it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOperator {
    Contains,
    Equals,
    StartsWith,
    EndsWith,
    IsEmpty,
    IsNotEmpty,
    Is,
    Not,
    IsAnyOf,
    After,
    OnOrAfter,
    Before,
    OnOrBefore,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Any operator the grid knows that this list does not.
    Custom(String),
}

impl FilterOperator {
    pub fn as_str(&self) -> &str {
        match self {
            FilterOperator::Contains => "contains",
            FilterOperator::Equals => "equals",
            FilterOperator::StartsWith => "startsWith",
            FilterOperator::EndsWith => "endsWith",
            FilterOperator::IsEmpty => "isEmpty",
            FilterOperator::IsNotEmpty => "isNotEmpty",
            FilterOperator::Is => "is",
            FilterOperator::Not => "not",
            FilterOperator::IsAnyOf => "isAnyOf",
            FilterOperator::After => "after",
            FilterOperator::OnOrAfter => "onOrAfter",
            FilterOperator::Before => "before",
            FilterOperator::OnOrBefore => "onOrBefore",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Custom(op) => op,
        }
    }

    /// Operators whose value is a list of accepted values.
    pub fn is_multi_value(&self) -> bool {
        matches!(self, FilterOperator::IsAnyOf)
    }
}

impl From<&str> for FilterOperator {
    fn from(value: &str) -> Self {
        match value {
            "contains" => FilterOperator::Contains,
            "equals" => FilterOperator::Equals,
            "startsWith" => FilterOperator::StartsWith,
            "endsWith" => FilterOperator::EndsWith,
            "isEmpty" => FilterOperator::IsEmpty,
            "isNotEmpty" => FilterOperator::IsNotEmpty,
            "is" => FilterOperator::Is,
            "not" => FilterOperator::Not,
            "isAnyOf" => FilterOperator::IsAnyOf,
            "after" => FilterOperator::After,
            "onOrAfter" => FilterOperator::OnOrAfter,
            "before" => FilterOperator::Before,
            "onOrBefore" => FilterOperator::OnOrBefore,
            "gt" => FilterOperator::Gt,
            "gte" => FilterOperator::Gte,
            "lt" => FilterOperator::Lt,
            "lte" => FilterOperator::Lte,
            other => FilterOperator::Custom(other.to_string()),
        }
    }
}

impl From<String> for FilterOperator {
    fn from(value: String) -> Self {
        FilterOperator::from(value.as_str())
    }
}

impl From<FilterOperator> for String {
    fn from(op: FilterOperator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How filter items combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicOperator {
    And,
    Or,
}

/// A single filter item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterItem {
    pub field: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: Value,
    /// Uniqueness token, a millisecond timestamp when generated here.
    #[serde(default)]
    pub id: u64,
}

impl FilterItem {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: Value, id: u64) -> Self {
        FilterItem {
            field: field.into(),
            operator,
            value,
            id,
        }
    }
}

/// The grid filter model persisted as a report's `filterValue`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterModel {
    #[serde(default)]
    pub items: Vec<FilterItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic_operator: Option<LogicOperator>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quick_filter_values: Vec<Value>,
}

impl FilterModel {
    pub fn new(items: Vec<FilterItem>) -> Self {
        FilterModel {
            items,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.quick_filter_values.is_empty()
    }

    /// The active item for a field, if any.
    pub fn item_for(&self, field: &str) -> Option<&FilterItem> {
        self.items.iter().find(|item| item.field == field)
    }
}

// ============================================================================
// REPORT CONFIGURATION
// ============================================================================

/// The three facets a user edits and saves.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfig {
    pub name: String,
    pub column_order: ColumnOrder,
    pub filter_value: FilterModel,
}

impl ReportConfig {
    pub fn new(name: impl Into<String>, column_order: ColumnOrder, filter_value: FilterModel) -> Self {
        ReportConfig {
            name: name.into(),
            column_order,
            filter_value,
        }
    }
}

/// Entity collection a report is built over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    #[default]
    Artist,
}

// ============================================================================
// MAIN REPORT STRUCT
// ============================================================================

/// A persisted report.
/// This is the "source of truth" that gets saved to the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Document id.
    pub id: String,

    /// Owning organization.
    pub organization: String,

    pub name: String,

    #[serde(rename = "columnOrder")]
    pub column_order: ColumnOrder,

    #[serde(rename = "filterValue")]
    pub filter_value: FilterModel,

    pub created_by: String,
    pub created_on: DateTime<Utc>,
    pub last_modified_by: String,
    pub last_modified_on: DateTime<Utc>,

    #[serde(rename = "type")]
    pub report_type: ReportType,
}

impl Report {
    /// Creates a new report with the default name, column order and filter.
    pub fn new_default(organization: impl Into<String>, user: impl Into<String>, now: DateTime<Utc>) -> Self {
        Report::from_config(organization, user, now, ReportConfig::new(
            DEFAULT_REPORT_NAME,
            ColumnOrder::default(),
            FilterModel::default(),
        ))
    }

    /// Creates a new report (fresh id) holding the given configuration.
    pub fn from_config(
        organization: impl Into<String>,
        user: impl Into<String>,
        now: DateTime<Utc>,
        config: ReportConfig,
    ) -> Self {
        let user = user.into();
        Report {
            id: Uuid::new_v4().to_string(),
            organization: organization.into(),
            name: config.name,
            column_order: config.column_order,
            filter_value: config.filter_value,
            created_by: user.clone(),
            created_on: now,
            last_modified_by: user,
            last_modified_on: now,
            report_type: ReportType::Artist,
        }
    }

    /// The editable facets of this report.
    pub fn config(&self) -> ReportConfig {
        ReportConfig::new(self.name.clone(), self.column_order.clone(), self.filter_value.clone())
    }

    /// Overwrites the editable facets (explicit Save).
    pub fn apply_config(&mut self, config: ReportConfig, user: impl Into<String>, now: DateTime<Utc>) {
        self.name = config.name;
        self.column_order = config.column_order;
        self.filter_value = config.filter_value;
        self.last_modified_by = user.into();
        self.last_modified_on = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_order_normalization() {
        let order = ColumnOrder::new(["status", "name", "status", "", "tags"]);
        assert_eq!(order.keys(), ["name", "status", "tags"]);

        let order = ColumnOrder::new(Vec::<String>::new());
        assert_eq!(order.keys(), ["name"]);
    }

    #[test]
    fn test_column_order_trims_before_dedup() {
        let order = ColumnOrder::new(["status", " status", "tags\t", " name "]);
        assert_eq!(order.keys(), ["name", "status", "tags"]);
    }

    #[test]
    fn test_column_order_edits() {
        let order = ColumnOrder::new(["status"]);
        assert_eq!(order.with_key("tags").keys(), ["name", "status", "tags"]);
        assert_eq!(order.with_key("status"), order);
        assert_eq!(order.without_key("name").keys(), ["name", "status"]);
    }

    #[test]
    fn test_column_order_deserializes_normalized() {
        let order: ColumnOrder = serde_json::from_value(json!(["status", "status"])).unwrap();
        assert_eq!(order.keys(), ["name", "status"]);
        assert_eq!(serde_json::to_value(&order).unwrap(), json!(["name", "status"]));
    }

    #[test]
    fn test_selection_deserializes_mixed_entries() {
        let selection: ColumnSelection = serde_json::from_value(json!({
            "status": true,
            "statistic.sp": { "latest": true, "trend_series": false }
        }))
        .unwrap();

        assert_eq!(selection.entry("status"), Some(&SelectionEntry::Enabled(true)));
        assert!(selection.is_disabled("statistic.sp-trend_series"));
        assert!(!selection.is_disabled("statistic.sp-latest"));
        assert!(!selection.is_disabled("tags"));
    }

    #[test]
    fn test_enabled_keys_follow_function_order() {
        let selection = ColumnSelection::new()
            .with_function("statistic.sp", "week_over_week", true)
            .with_function("statistic.sp", "latest", true)
            .with_function("statistic.sp", "previous", false)
            .with_column("status", true)
            .with_column("tags", false);

        assert_eq!(
            selection.enabled_keys(),
            vec!["statistic.sp-latest", "statistic.sp-week_over_week", "status"]
        );
    }

    #[test]
    fn test_selection_from_order() {
        let order = ColumnOrder::new(["statistic.sp-latest", "link_spotify", "statistic.sp-trend_series"]);
        let selection = selection_from_order(&order);

        assert_eq!(selection.entry("name"), Some(&SelectionEntry::Enabled(true)));
        assert_eq!(selection.entry("link_spotify"), Some(&SelectionEntry::Enabled(true)));
        match selection.entry("statistic.sp") {
            Some(SelectionEntry::Functions(functions)) => {
                assert_eq!(functions.get("latest"), Some(&true));
                assert_eq!(functions.get("trend_series"), Some(&true));
            }
            other => panic!("Expected function entry, got {:?}", other),
        }
    }

    #[test]
    fn test_filter_operator_strings() {
        assert_eq!(FilterOperator::from("isAnyOf"), FilterOperator::IsAnyOf);
        assert_eq!(FilterOperator::from(">="), FilterOperator::Custom(">=".to_string()));
        let item: FilterItem = serde_json::from_value(json!({
            "field": "status", "operator": "gte", "value": 2, "id": 17
        }))
        .unwrap();
        assert_eq!(item.operator, FilterOperator::Gte);
        assert_eq!(serde_json::to_value(&item).unwrap()["operator"], json!("gte"));
    }

    #[test]
    fn test_filter_model_defaults() {
        let model: FilterModel = serde_json::from_value(json!({})).unwrap();
        assert!(model.is_empty());
        assert_eq!(serde_json::to_value(&model).unwrap(), json!({ "items": [] }));
    }

    #[test]
    fn test_new_default_report() {
        let now = Utc::now();
        let report = Report::new_default("org-1", "user-1", now);
        assert_eq!(report.name, DEFAULT_REPORT_NAME);
        assert_eq!(report.column_order.keys(), ["name"]);
        assert!(report.filter_value.is_empty());
        assert_eq!(report.created_by, "user-1");
        assert_eq!(report.last_modified_on, now);
        assert_eq!(report.report_type, ReportType::Artist);
        assert!(!report.id.is_empty());
    }

    #[test]
    fn test_report_document_field_names() {
        let report = Report::new_default("org-1", "user-1", Utc::now());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("columnOrder").is_some());
        assert!(json.get("filterValue").is_some());
        assert!(json.get("created_by").is_some());
        assert_eq!(json["type"], json!("artist"));
    }
}
