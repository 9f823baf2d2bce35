//! FILENAME: core/engine/src/record.rs
//! PURPOSE: Raw artist/entity documents as delivered by the document store.
//! CONTEXT: Records are read-only inputs to row projection. Statistic
//! histories are stored most-recent-first, one entry per statistic type.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One statistic history attached to a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticEntry {
    /// Id of the statistic type this history belongs to.
    #[serde(rename = "statistic_type")]
    pub statistic_type_id: String,

    /// Sampled values, index 0 is the latest sample. Gaps (`null` in the
    /// document) are kept as NaN so positions stay aligned.
    #[serde(default, deserialize_with = "deserialize_samples")]
    pub values: Vec<f64>,
}

fn deserialize_samples<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let samples = Option::<Vec<Option<f64>>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(samples
        .into_iter()
        .map(|sample| sample.unwrap_or(f64::NAN))
        .collect())
}

impl StatisticEntry {
    pub fn new(statistic_type_id: impl Into<String>, values: Vec<f64>) -> Self {
        StatisticEntry {
            statistic_type_id: statistic_type_id.into(),
            values,
        }
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.first().copied().filter(|v| v.is_finite())
    }
}

/// A raw artist document.
///
/// Everything besides `id`, `links` and `statistics` is kept as untyped JSON
/// and addressed by the static column keys of the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: String,

    /// Link source key -> external URL (e.g. "spotify" -> profile URL).
    #[serde(default)]
    pub links: BTreeMap<String, String>,

    #[serde(default)]
    pub statistics: Vec<StatisticEntry>,

    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl EntityRecord {
    pub fn new(id: impl Into<String>) -> Self {
        EntityRecord {
            id: id.into(),
            links: BTreeMap::new(),
            statistics: Vec::new(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn with_link(mut self, source: impl Into<String>, url: impl Into<String>) -> Self {
        self.links.insert(source.into(), url.into());
        self
    }

    pub fn with_statistic(mut self, entry: StatisticEntry) -> Self {
        self.statistics.push(entry);
        self
    }

    /// Returns the raw field value for a static column key.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns the statistic history for a statistic type id.
    /// When a record carries duplicate entries the first one wins.
    pub fn statistic(&self, statistic_type_id: &str) -> Option<&StatisticEntry> {
        self.statistics
            .iter()
            .find(|s| s.statistic_type_id == statistic_type_id)
    }

    pub fn link(&self, source: &str) -> Option<&str> {
        self.links.get(source).map(String::as_str)
    }
}
