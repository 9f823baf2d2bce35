//! FILENAME: core/report-engine/src/reconcile.rs
//! Report State Reconciler - Unsaved-change detection and revert.
//!
//! Comparison is structural over the three editable facets: name, column
//! order (order-sensitive) and filter model (recursive, ids included).
//!
//! Revert is the one operation with a side effect. The grid keeps its own
//! filter UI state and will not pick up a reverted filter from the data
//! model, so revert emits a `FilterReset` event that the grid host must
//! forward to the widget.

use serde::Serialize;

use crate::definition::{FilterModel, ReportConfig};

/// Notifications for whoever hosts the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ReportEvent {
    /// The grid filter control must be reset to this model.
    FilterReset { filter: FilterModel },
    /// The baseline was overwritten in place.
    #[serde(rename_all = "camelCase")]
    Saved { report_id: String },
    /// A new report was created; the host should redirect to it.
    #[serde(rename_all = "camelCase")]
    SavedAsNew { report_id: String },
}

/// Receives report events.
pub trait ReportEventSink {
    fn emit(&mut self, event: ReportEvent);
}

impl ReportEventSink for Vec<ReportEvent> {
    fn emit(&mut self, event: ReportEvent) {
        self.push(event);
    }
}

/// One of the editable facets of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Facet {
    Name,
    ColumnOrder,
    FilterValue,
}

/// True when `current` differs from `baseline` in any facet.
pub fn has_unsaved_changes(baseline: &ReportConfig, current: &ReportConfig) -> bool {
    baseline != current
}

/// The facets in which `current` differs from `baseline`.
pub fn changed_facets(baseline: &ReportConfig, current: &ReportConfig) -> Vec<Facet> {
    let mut facets = Vec::new();
    if baseline.name != current.name {
        facets.push(Facet::Name);
    }
    if baseline.column_order != current.column_order {
        facets.push(Facet::ColumnOrder);
    }
    if baseline.filter_value != current.filter_value {
        facets.push(Facet::FilterValue);
    }
    facets
}

/// Returns a fresh copy of the baseline and tells the grid to reset its
/// filter control.
pub fn revert(baseline: &ReportConfig, sink: &mut dyn ReportEventSink) -> ReportConfig {
    let reverted = baseline.clone();
    sink.emit(ReportEvent::FilterReset {
        filter: reverted.filter_value.clone(),
    });
    reverted
}
