//! FILENAME: core/report-engine/src/session.rs
//! Report Session - One user's editing session of one report.
//!
//! The session owns a deep copy of the persisted baseline and the working
//! configuration. Every edit replaces the working configuration with a new
//! value; the baseline only changes on an explicit save.

use chrono::{DateTime, Utc};
use engine::{EntityRecord, MetricSettings};
use serde_json::Value;

use crate::builder::{apply_order, build_columns, toggle_column, toggle_metric};
use crate::definition::{
    selection_from_order, ColumnOrder, ColumnSelection, FilterModel, FilterOperator, Report,
    ReportConfig,
};
use crate::logging::{log_debug, log_info};
use crate::projector::project_rows;
use crate::quick_filter;
use crate::reconcile::{self, Facet, ReportEvent, ReportEventSink};
use crate::registry::ColumnRegistry;
use crate::view::{ColumnDefinition, Row};

type Subscriber = Box<dyn FnMut(&ReportEvent)>;

/// Fans events out to every subscriber.
#[derive(Default)]
struct Subscribers(Vec<Subscriber>);

impl ReportEventSink for Subscribers {
    fn emit(&mut self, event: ReportEvent) {
        for subscriber in self.0.iter_mut() {
            subscriber(&event);
        }
    }
}

pub struct ReportSession {
    baseline: Report,
    current: ReportConfig,
    subscribers: Subscribers,
}

impl ReportSession {
    pub fn new(baseline: Report) -> Self {
        let current = baseline.config();
        ReportSession {
            baseline,
            current,
            subscribers: Subscribers::default(),
        }
    }

    /// Registers a listener for filter resets and save notifications.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&ReportEvent) + 'static) {
        self.subscribers.0.push(Box::new(subscriber));
    }

    pub fn baseline(&self) -> &Report {
        &self.baseline
    }

    pub fn config(&self) -> &ReportConfig {
        &self.current
    }

    // ========================================================================
    // EDITS
    // ========================================================================

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.current.name = name.into();
    }

    /// Accepts a column order coming back from the grid (e.g. after a drag).
    pub fn set_column_order(&mut self, order: ColumnOrder) {
        self.current.column_order = order;
    }

    /// The selection matching the working column order.
    pub fn selection(&self) -> ColumnSelection {
        selection_from_order(&self.current.column_order)
    }

    pub fn apply_selection(&mut self, selection: &ColumnSelection) {
        self.current.column_order = apply_order(&self.current.column_order, selection);
    }

    pub fn toggle_column(&mut self, key: &str, enabled: bool) {
        let (_, order) = toggle_column(&self.current.column_order, &self.selection(), key, enabled);
        self.current.column_order = order;
    }

    pub fn toggle_metric(&mut self, selection_key: &str, function_key: &str, enabled: bool) {
        let (_, order) = toggle_metric(
            &self.current.column_order,
            &self.selection(),
            selection_key,
            function_key,
            enabled,
        );
        self.current.column_order = order;
    }

    pub fn set_filter_model(&mut self, model: FilterModel) {
        self.current.filter_value = model;
    }

    pub fn apply_quick_filter(&mut self, field: &str, operator: FilterOperator, value: Value) {
        self.current.filter_value =
            quick_filter::apply_quick_filter(&self.current.filter_value, field, operator, value);
    }

    pub fn remove_quick_filter(&mut self, field: &str) {
        self.current.filter_value = quick_filter::remove_quick_filter(&self.current.filter_value, field);
    }

    // ========================================================================
    // RECONCILIATION
    // ========================================================================

    pub fn has_unsaved_changes(&self) -> bool {
        reconcile::has_unsaved_changes(&self.baseline.config(), &self.current)
    }

    pub fn changed_facets(&self) -> Vec<Facet> {
        reconcile::changed_facets(&self.baseline.config(), &self.current)
    }

    /// Discards all edits and resets the grid filter control.
    pub fn revert(&mut self) {
        log_debug!("SESSION", "revert report {}", self.baseline.id);
        self.current = reconcile::revert(&self.baseline.config(), &mut self.subscribers);
    }

    /// Overwrites the baseline with the working configuration.
    pub fn save(&mut self, user: &str, now: DateTime<Utc>) -> &Report {
        self.baseline.apply_config(self.current.clone(), user, now);
        log_info!("SESSION", "saved report {} by {}", self.baseline.id, user);
        self.subscribers.emit(ReportEvent::Saved {
            report_id: self.baseline.id.clone(),
        });
        &self.baseline
    }

    /// Stores the working configuration as a new report owned by the same
    /// organization. The session continues on the new report.
    pub fn save_as_new(&mut self, user: &str, now: DateTime<Utc>) -> &Report {
        let report = Report::from_config(self.baseline.organization.clone(), user, now, self.current.clone());
        log_info!(
            "SESSION",
            "saved report {} as new report {} by {}",
            self.baseline.id,
            report.id,
            user
        );
        self.baseline = report;
        self.subscribers.emit(ReportEvent::SavedAsNew {
            report_id: self.baseline.id.clone(),
        });
        &self.baseline
    }

    // ========================================================================
    // VIEW
    // ========================================================================

    pub fn columns(&self, registry: &ColumnRegistry) -> Vec<ColumnDefinition> {
        build_columns(&self.current.column_order, registry)
    }

    pub fn rows(&self, registry: &ColumnRegistry, records: &[EntityRecord], settings: &MetricSettings) -> Vec<Row> {
        project_rows(&self.columns(registry), records, settings)
    }
}
