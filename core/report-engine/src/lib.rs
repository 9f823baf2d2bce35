//! FILENAME: core/report-engine/src/lib.rs
//! Configurable report grid subsystem.
//!
//! This crate turns a saved report (column order + filter model + name) and
//! a set of raw entity records into grid columns and rows. It depends on
//! `engine` for cell values and metric math and on `parser` for column keys.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the report IS)
//! - `registry`: Reference data and the static column catalog
//! - `view`: Renderable output for the grid (WHAT we display)
//! - `builder`: Column order to column definitions, selection sync
//! - `projector`: Records to rows (HOW we calculate)
//! - `reconcile` / `quick_filter`: Edits against the saved baseline
//! - `session`: One editing session tying the layers together

pub mod builder;
pub mod definition;
pub mod error;
pub mod logging;
pub mod projector;
pub mod quick_filter;
pub mod reconcile;
pub mod registry;
pub mod session;
pub mod view;

pub use builder::{apply_order, build_columns, resolve_column, toggle_column, toggle_metric};
pub use definition::*;
pub use error::{ColumnError, LookupError};
pub use projector::{project_row, project_rows, project_value};
pub use quick_filter::{apply_quick_filter, apply_quick_filter_at, next_filter_id, remove_quick_filter};
pub use reconcile::{changed_facets, has_unsaved_changes, revert, Facet, ReportEvent, ReportEventSink};
pub use registry::{ColumnRegistry, LinkSourceDefinition, ReferenceData, StatisticTypeDefinition};
pub use session::ReportSession;
pub use view::*;
