//! FILENAME: core/report-engine/src/builder.rs
//! Column Builder - Turns a column order into grid column definitions.
//!
//! Every key is parsed into a `ColumnKey` and dispatched to the matching
//! resolver. Keys that fail to parse or resolve are skipped, so a stale
//! report never breaks the grid. Output order equals input order.

use parser::{parse_column_key, ColumnKey};
use smallvec::smallvec;

use crate::definition::{ColumnOrder, ColumnSelection, LEAD_COLUMN};
use crate::error::ColumnError;
use crate::logging::log_debug;
use crate::registry::ColumnRegistry;
use crate::view::{ColumnDefinition, ColumnKind, ValueGetter};

/// Builds the grid columns for a column order.
pub fn build_columns(order: &ColumnOrder, registry: &ColumnRegistry) -> Vec<ColumnDefinition> {
    let mut columns = Vec::with_capacity(order.len());
    for key in order.iter() {
        match resolve_column(key, registry) {
            Ok(column) => columns.push(column),
            Err(e) => log_debug!("BUILD", "skipping column '{}': {}", key, e),
        }
    }
    columns
}

/// Resolves a single column key against the registry.
pub fn resolve_column(key: &str, registry: &ColumnRegistry) -> Result<ColumnDefinition, ColumnError> {
    match parse_column_key(key)? {
        ColumnKey::Static(field) => Ok(registry.lookup_static(&field)?.clone()),
        ColumnKey::Link { source } => build_link_column(key, &source, registry),
        ColumnKey::Statistic { statistic_id, function } => {
            build_metric_column(key, &statistic_id, &function, registry)
        }
    }
}

fn build_link_column(
    key: &str,
    source: &str,
    registry: &ColumnRegistry,
) -> Result<ColumnDefinition, ColumnError> {
    let link = registry.lookup_link(source)?;
    Ok(ColumnDefinition {
        key: key.to_string(),
        label: format!("{} Link", link.display_name),
        kind: ColumnKind::Link {
            source: link.key.clone(),
        },
        functions: smallvec![],
        render_hint: Some("link".to_string()),
        value_getter: ValueGetter::Raw,
    })
}

fn build_metric_column(
    key: &str,
    statistic_id: &str,
    function_key: &str,
    registry: &ColumnRegistry,
) -> Result<ColumnDefinition, ColumnError> {
    let statistic = registry.lookup_statistic_type(statistic_id)?;
    let function = registry.lookup_metric(function_key)?;
    Ok(ColumnDefinition {
        key: key.to_string(),
        label: format!("{} {}", statistic.source, function.display_label()),
        kind: ColumnKind::Metric {
            statistic_id: statistic.id.clone(),
            function: Some(function),
        },
        functions: smallvec![function],
        render_hint: Some(function.render_hint().to_string()),
        value_getter: ValueGetter::Raw,
    })
}

// ============================================================================
// ORDER / SELECTION SYNC
// ============================================================================

/// Reconciles a column order with a new selection.
///
/// Keys that stay enabled keep their relative order, explicitly disabled
/// keys are removed and newly enabled keys are appended. The lead column is
/// never removed. Applying the same selection twice is a no-op.
pub fn apply_order(current: &ColumnOrder, selection: &ColumnSelection) -> ColumnOrder {
    let mut keys: Vec<String> = current
        .iter()
        .filter(|key| key.as_str() == LEAD_COLUMN || !selection.is_disabled(key))
        .cloned()
        .collect();

    for key in selection.enabled_keys() {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    ColumnOrder::new(keys)
}

/// Switches a static or link column on or off and returns the new
/// selection together with the reconciled order.
pub fn toggle_column(
    order: &ColumnOrder,
    selection: &ColumnSelection,
    key: &str,
    enabled: bool,
) -> (ColumnSelection, ColumnOrder) {
    let selection = selection.with_column(key, enabled);
    let order = apply_order(order, &selection);
    (selection, order)
}

/// Switches one metric function of a metric column on or off and returns
/// the new selection together with the reconciled order.
pub fn toggle_metric(
    order: &ColumnOrder,
    selection: &ColumnSelection,
    selection_key: &str,
    function_key: &str,
    enabled: bool,
) -> (ColumnSelection, ColumnOrder) {
    let selection = selection.with_function(selection_key, function_key, enabled);
    let order = apply_order(order, &selection);
    (selection, order)
}
