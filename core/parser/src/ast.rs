//! FILENAME: core/parser/src/ast.rs
//! PURPOSE: Defines the parsed form of a grid column key.
//! CONTEXT: Column orders are persisted as plain strings. The Parser turns
//! each string into a `ColumnKey` so the column builder can dispatch on a
//! closed set of variants instead of sniffing string prefixes.
//!
//! KEY SHAPES:
//! - Static:    `name`, `status`, `tags`
//! - Link:      `link_<source>`           e.g. `link_spotify`
//! - Statistic: `statistic.<id>-<func>`   e.g. `statistic.sp_followers-latest`

use std::fmt;

/// Prefix of link column keys.
pub const LINK_PREFIX: &str = "link_";

/// Prefix of statistic column keys.
pub const STATISTIC_PREFIX: &str = "statistic.";

/// Separator between the statistic id and the function key.
/// The LAST occurrence is the separator, so statistic ids may contain dashes.
pub const FUNCTION_SEPARATOR: char = '-';

/// A parsed column key.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum ColumnKey {
    /// A field read directly from the record, e.g. `status`.
    Static(String),

    /// An external link column for a link source, e.g. `link_spotify`.
    Link { source: String },

    /// A metric column: one function applied to one statistic type.
    Statistic { statistic_id: String, function: String },
}

impl ColumnKey {
    pub fn statistic(statistic_id: impl Into<String>, function: impl Into<String>) -> Self {
        ColumnKey::Statistic {
            statistic_id: statistic_id.into(),
            function: function.into(),
        }
    }

    pub fn link(source: impl Into<String>) -> Self {
        ColumnKey::Link { source: source.into() }
    }

    /// Key of the entry that owns this column in a column selection.
    /// Statistic columns are grouped under `statistic.<id>`; every other
    /// column is its own selection entry.
    pub fn selection_key(&self) -> String {
        match self {
            ColumnKey::Statistic { statistic_id, .. } => {
                format!("{}{}", STATISTIC_PREFIX, statistic_id)
            }
            other => other.to_string(),
        }
    }

    /// Function key of a statistic column, `None` for everything else.
    pub fn function_key(&self) -> Option<&str> {
        match self {
            ColumnKey::Statistic { function, .. } => Some(function),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKey::Static(key) => write!(f, "{}", key),
            ColumnKey::Link { source } => write!(f, "{}{}", LINK_PREFIX, source),
            ColumnKey::Statistic { statistic_id, function } => write!(
                f,
                "{}{}{}{}",
                STATISTIC_PREFIX, statistic_id, FUNCTION_SEPARATOR, function
            ),
        }
    }
}
