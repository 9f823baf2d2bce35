//! FILENAME: core/persistence/src/statistics_csv.rs
//! Imports a statistic history from `date,value` CSV rows.
//!
//! Rows may come in any order; the result is most-recent-first, as every
//! metric transform expects. A later row for the same date replaces an
//! earlier one. `stride` keeps every n-th sample starting from the latest.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate};
use engine::StatisticEntry;
use report_engine::log_debug;

use crate::PersistenceError;

pub fn parse_statistic_csv(
    statistic_type_id: &str,
    content: &str,
    stride: usize,
) -> Result<StatisticEntry, PersistenceError> {
    let mut samples: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line_no = index + 1;

        let Some((date, value)) = line.split_once(',') else {
            return Err(row_error(line_no, "expected 'date,value'"));
        };
        let (date, value) = (date.trim(), value.trim().trim_matches('"'));

        if samples.is_empty() && date.eq_ignore_ascii_case("date") {
            continue;
        }

        let date = parse_date(date.trim_matches('"'))
            .ok_or_else(|| row_error(line_no, &format!("invalid date '{}'", date)))?;
        let value: f64 = value
            .parse()
            .ok()
            .filter(|v: &f64| v.is_finite())
            .ok_or_else(|| row_error(line_no, &format!("invalid value '{}'", value)))?;

        samples.insert(date, value);
    }

    let values: Vec<f64> = samples
        .into_values()
        .rev()
        .step_by(stride.max(1))
        .collect();

    log_debug!("CSV", "imported {} samples for {}", values.len(), statistic_type_id);
    Ok(StatisticEntry::new(statistic_type_id, values))
}

pub fn read_statistic_csv(
    statistic_type_id: &str,
    path: impl AsRef<Path>,
    stride: usize,
) -> Result<StatisticEntry, PersistenceError> {
    parse_statistic_csv(statistic_type_id, &fs::read_to_string(path)?, stride)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|t| t.date_naive()))
}

fn row_error(line: usize, message: &str) -> PersistenceError {
    PersistenceError::InvalidFormat(format!("line {}: {}", line, message))
}
