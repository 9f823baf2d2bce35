//! FILENAME: core/report-engine/src/registry.rs
//! Column Registry - Catalog of everything a report column can refer to.
//!
//! Static columns are fixed when the registry is built. Link sources and
//! statistic types are reference data fetched once by the page and injected
//! here; the registry never mutates them, it only swaps in a new snapshot.

use engine::MetricFunction;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::definition::LEAD_COLUMN;
use crate::error::LookupError;
use crate::view::{ColumnDefinition, ColumnKind, ValueGetter};

// ============================================================================
// REFERENCE DATA
// ============================================================================

/// A statistic type tracked for artists (e.g. Spotify followers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticTypeDefinition {
    pub id: String,
    pub name: String,
    /// Platform the statistic comes from, used in column labels.
    pub source: String,
}

/// An external platform an artist can link to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSourceDefinition {
    pub key: String,
    pub display_name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub social: bool,
}

/// Reference data as returned by the remote call layer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceData {
    #[serde(default)]
    pub statistic_types: Vec<StatisticTypeDefinition>,
    #[serde(default)]
    pub link_sources: Vec<LinkSourceDefinition>,
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Read-only lookup tables for the column builder and row projector.
#[derive(Debug, Clone, Default)]
pub struct ColumnRegistry {
    /// Static columns in picker order.
    statics: Vec<ColumnDefinition>,
    static_index: FxHashMap<String, usize>,

    reference: ReferenceData,
    link_index: FxHashMap<String, usize>,
    statistic_index: FxHashMap<String, usize>,
}

impl ColumnRegistry {
    /// Creates a registry from static column definitions.
    /// Later duplicates of a key are ignored.
    pub fn new(statics: Vec<ColumnDefinition>) -> Self {
        let mut registry = ColumnRegistry::default();
        for column in statics {
            if registry.static_index.contains_key(&column.key) {
                continue;
            }
            registry.static_index.insert(column.key.clone(), registry.statics.len());
            registry.statics.push(column);
        }
        registry
    }

    /// The static catalog of artist reports.
    pub fn artist() -> Self {
        ColumnRegistry::new(vec![
            ColumnDefinition::field(LEAD_COLUMN, "Name").with_render_hint("artist"),
            ColumnDefinition::field("status", "Status").with_render_hint("status"),
            ColumnDefinition::field("tags", "Tags").with_render_hint("tags"),
            ColumnDefinition::field("genres", "Genres").with_getter(ValueGetter::Join {
                separator: ", ".to_string(),
            }),
            ColumnDefinition::field("country", "Country"),
            ColumnDefinition::field("record_label", "Label"),
            ColumnDefinition::field("avatar", "Avatar")
                .with_getter(ValueGetter::Path("url".to_string()))
                .with_render_hint("image"),
            ColumnDefinition::field("notes", "Notes").with_getter(ValueGetter::Count),
            ColumnDefinition::field("created_on", "Added")
                .with_getter(ValueGetter::Timestamp)
                .with_render_hint("date"),
            ColumnDefinition::field("last_modified_on", "Updated")
                .with_getter(ValueGetter::Timestamp)
                .with_render_hint("date"),
        ])
    }

    /// Returns this registry with a new reference data snapshot.
    pub fn with_reference_data(mut self, reference: ReferenceData) -> Self {
        self.set_reference_data(reference);
        self
    }

    /// Replaces the reference data snapshot.
    pub fn set_reference_data(&mut self, reference: ReferenceData) {
        self.link_index = index_by(&reference.link_sources, |l| &l.key);
        self.statistic_index = index_by(&reference.statistic_types, |s| &s.id);
        self.reference = reference;
    }

    pub fn reference_data(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn static_columns(&self) -> &[ColumnDefinition] {
        &self.statics
    }

    pub fn lookup_static(&self, key: &str) -> Result<&ColumnDefinition, LookupError> {
        self.static_index
            .get(key)
            .map(|&i| &self.statics[i])
            .ok_or_else(|| LookupError::UnknownStatic(key.to_string()))
    }

    pub fn lookup_metric(&self, function_key: &str) -> Result<MetricFunction, LookupError> {
        MetricFunction::from_key(function_key)
            .ok_or_else(|| LookupError::UnknownMetric(function_key.to_string()))
    }

    pub fn lookup_link(&self, source: &str) -> Result<&LinkSourceDefinition, LookupError> {
        self.link_index
            .get(source)
            .map(|&i| &self.reference.link_sources[i])
            .ok_or_else(|| LookupError::UnknownLink(source.to_string()))
    }

    pub fn lookup_statistic_type(&self, id: &str) -> Result<&StatisticTypeDefinition, LookupError> {
        self.statistic_index
            .get(id)
            .map(|&i| &self.reference.statistic_types[i])
            .ok_or_else(|| LookupError::UnknownStatisticType(id.to_string()))
    }

    /// One picker entry per statistic type, offering every metric function.
    pub fn metric_catalog(&self) -> Vec<ColumnDefinition> {
        self.reference
            .statistic_types
            .iter()
            .map(|stat| ColumnDefinition {
                key: format!("{}{}", parser::STATISTIC_PREFIX, stat.id),
                label: format!("{} {}", stat.source, stat.name),
                kind: ColumnKind::Metric {
                    statistic_id: stat.id.clone(),
                    function: None,
                },
                functions: SmallVec::from_slice(&MetricFunction::ALL),
                render_hint: Some("metric".to_string()),
                value_getter: ValueGetter::Raw,
            })
            .collect()
    }
}

/// Maps each key to its first position; later duplicates are ignored.
fn index_by<T>(items: &[T], key: impl Fn(&T) -> &String) -> FxHashMap<String, usize> {
    let mut index = FxHashMap::default();
    for (i, item) in items.iter().enumerate() {
        index.entry(key(item).clone()).or_insert(i);
    }
    index
}
