//! FILENAME: core/parser/src/parser.rs
//! PURPOSE: Converts column key strings into `ColumnKey` values.
//! CONTEXT: Keys come from persisted reports and from the grid widget, so
//! malformed input is expected. Errors are values; the caller decides
//! whether to skip the column.
//!
//! GRAMMAR:
//!   key        --> link | statistic | static
//!   link       --> "link_" SOURCE
//!   statistic  --> "statistic." ID "-" FUNCTION     // split at the last "-"
//!   static     --> any non-empty string without the prefixes above

use crate::ast::{ColumnKey, FUNCTION_SEPARATOR, LINK_PREFIX, STATISTIC_PREFIX};

/// Parser errors with descriptive messages.
#[derive(Debug, PartialEq, Clone)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parses a column key.
pub fn parse_column_key(input: &str) -> ParseResult<ColumnKey> {
    let key = input.trim();
    if key.is_empty() {
        return Err(ParseError::new("empty column key"));
    }

    if let Some(source) = key.strip_prefix(LINK_PREFIX) {
        return parse_link(key, source);
    }

    if let Some(rest) = key.strip_prefix(STATISTIC_PREFIX) {
        return parse_statistic(key, rest);
    }

    if key.contains(char::is_whitespace) {
        return Err(ParseError::new(format!("column key '{}' contains whitespace", key)));
    }

    Ok(ColumnKey::Static(key.to_string()))
}

fn parse_link(key: &str, source: &str) -> ParseResult<ColumnKey> {
    if source.is_empty() {
        return Err(ParseError::new(format!("link key '{}' has no source", key)));
    }
    Ok(ColumnKey::link(source))
}

fn parse_statistic(key: &str, rest: &str) -> ParseResult<ColumnKey> {
    let (statistic_id, function) = rest.rsplit_once(FUNCTION_SEPARATOR).ok_or_else(|| {
        ParseError::new(format!("statistic key '{}' has no function suffix", key))
    })?;

    if statistic_id.is_empty() {
        return Err(ParseError::new(format!("statistic key '{}' has no statistic id", key)));
    }
    if function.is_empty() {
        return Err(ParseError::new(format!("statistic key '{}' has an empty function", key)));
    }

    Ok(ColumnKey::statistic(statistic_id, function))
}

/// Splits a selection entry key (`statistic.<id>`) into its statistic id.
/// Returns `None` for keys that do not group metric sub-columns.
pub fn statistic_selection_id(selection_key: &str) -> Option<&str> {
    selection_key
        .strip_prefix(STATISTIC_PREFIX)
        .filter(|id| !id.is_empty())
}
