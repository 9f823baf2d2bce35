//! FILENAME: core/report-engine/src/error.rs

use parser::ParseError;
use thiserror::Error;

/// A registry lookup that found nothing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("Unknown static column: {0}")]
    UnknownStatic(String),

    #[error("Unknown metric function: {0}")]
    UnknownMetric(String),

    #[error("Unknown link source: {0}")]
    UnknownLink(String),

    #[error("Unknown statistic type: {0}")]
    UnknownStatisticType(String),
}

/// Why a column key could not be turned into a column.
/// The builder skips such columns; it never surfaces this to the grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColumnError {
    #[error("Malformed column key: {0}")]
    Malformed(#[from] ParseError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}
