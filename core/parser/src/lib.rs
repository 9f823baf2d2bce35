//! FILENAME: core/parser/src/lib.rs
//! PURPOSE: Library root for the column key parser.
//! CONTEXT: This module exposes the parser and the parsed key type needed
//! to turn persisted column keys into something the builder can dispatch on.
//!
//! PIPELINE: Key String --> Parser --> ColumnKey --> Column Builder
//!
//! SUPPORTED KEYS:
//! - Static fields: name, status, tags
//! - Link columns: link_spotify
//! - Statistic metric columns: statistic.sp_followers-week_over_week

pub mod ast;
pub mod parser;


// Re-export commonly used types for convenience
pub use ast::{ColumnKey, FUNCTION_SEPARATOR, LINK_PREFIX, STATISTIC_PREFIX};
pub use parser::{parse_column_key, statistic_selection_id, ParseError, ParseResult};
