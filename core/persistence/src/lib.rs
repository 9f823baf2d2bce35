//! FILENAME: core/persistence/src/lib.rs
//! Report Persistence Module
//!
//! Handles loading and saving report documents, the metric settings file
//! and statistic histories imported from CSV.

mod document;
mod error;
mod settings;
mod statistics_csv;
mod store;

pub use document::{parse_report, render_report, ReportDocument};
pub use error::PersistenceError;
pub use settings::{load_settings, save_settings};
pub use statistics_csv::{parse_statistic_csv, read_statistic_csv};
pub use store::{JsonDirReportStore, MemoryReportStore, ReportStore};
