//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Main library entry point for the shared report engine types.
//! CONTEXT: Re-exports the cell value, raw record and metric types used by
//! the report engine and the persistence layer.

pub mod cell;
pub mod metric;
pub mod record;

// Re-export commonly used types at the crate root
pub use cell::CellValue;
pub use metric::{percent_change, MetricFunction, MetricOutput, MetricSettings};
pub use record::{EntityRecord, StatisticEntry};
