//! FILENAME: core/engine/src/metric.rs
//! PURPOSE: Metric functions derived from statistic time series.
//! CONTEXT: Every metric column applies exactly one of these transforms to
//! a most-recent-first series. The transforms are pure and never produce
//! NaN or infinities: a missing or zero denominator yields `None`.

use serde::{Deserialize, Serialize};

// ============================================================================
// SETTINGS
// ============================================================================

fn default_month_offset() -> usize {
    4
}

fn default_trend_stride() -> usize {
    1
}

/// Tunables for the metric transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSettings {
    /// Index of the sample compared against for month-over-month.
    /// Weekly samples make 4 the natural value.
    #[serde(default = "default_month_offset")]
    pub month_offset: usize,

    /// Keep every n-th sample of a trend series (1 keeps all of them).
    #[serde(default = "default_trend_stride")]
    pub trend_stride: usize,

    /// Maximum number of trend points after decimation, most recent kept.
    #[serde(default)]
    pub trend_limit: Option<usize>,
}

impl Default for MetricSettings {
    fn default() -> Self {
        MetricSettings {
            month_offset: default_month_offset(),
            trend_stride: default_trend_stride(),
            trend_limit: None,
        }
    }
}

// ============================================================================
// METRIC FUNCTION
// ============================================================================

/// The fixed set of transforms a metric column can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricFunction {
    Latest,
    Previous,
    WeekOverWeek,
    MonthOverMonth,
    TrendSeries,
}

impl MetricFunction {
    /// All functions, in the order the column picker lists them.
    pub const ALL: [MetricFunction; 5] = [
        MetricFunction::Latest,
        MetricFunction::Previous,
        MetricFunction::WeekOverWeek,
        MetricFunction::MonthOverMonth,
        MetricFunction::TrendSeries,
    ];

    /// Key used inside column keys (`statistic.<id>-<key>`).
    pub fn key(self) -> &'static str {
        match self {
            MetricFunction::Latest => "latest",
            MetricFunction::Previous => "previous",
            MetricFunction::WeekOverWeek => "week_over_week",
            MetricFunction::MonthOverMonth => "month_over_month",
            MetricFunction::TrendSeries => "trend_series",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        MetricFunction::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn display_label(self) -> &'static str {
        match self {
            MetricFunction::Latest => "Latest",
            MetricFunction::Previous => "Previous",
            MetricFunction::WeekOverWeek => "Week over Week",
            MetricFunction::MonthOverMonth => "Month over Month",
            MetricFunction::TrendSeries => "Trend",
        }
    }

    /// Opaque hint telling the grid how to render the output.
    pub fn render_hint(self) -> &'static str {
        match self {
            MetricFunction::Latest | MetricFunction::Previous => "number",
            MetricFunction::WeekOverWeek | MetricFunction::MonthOverMonth => "percent_change",
            MetricFunction::TrendSeries => "sparkline",
        }
    }

    pub fn is_series(self) -> bool {
        matches!(self, MetricFunction::TrendSeries)
    }

    /// Applies the transform to a most-recent-first series.
    pub fn apply(self, series: &[f64], settings: &MetricSettings) -> MetricOutput {
        match self {
            MetricFunction::Latest => MetricOutput::Scalar(sample(series, 0)),
            MetricFunction::Previous => MetricOutput::Scalar(sample(series, 1)),
            MetricFunction::WeekOverWeek => MetricOutput::Scalar(change_against(series, 1)),
            MetricFunction::MonthOverMonth => {
                MetricOutput::Scalar(change_against(series, settings.month_offset))
            }
            MetricFunction::TrendSeries => MetricOutput::Series(trend(series, settings)),
        }
    }

    /// The output used when a record has no history for the statistic.
    pub fn missing_output(self) -> MetricOutput {
        if self.is_series() {
            MetricOutput::Series(Vec::new())
        } else {
            MetricOutput::Scalar(None)
        }
    }
}

/// Result of a metric transform.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricOutput {
    Scalar(Option<f64>),
    /// Chronological (oldest first) series.
    Series(Vec<f64>),
}

// ============================================================================
// TRANSFORMS
// ============================================================================

fn sample(series: &[f64], index: usize) -> Option<f64> {
    series.get(index).copied().filter(|v| v.is_finite())
}

/// Relative change of the latest sample against `series[offset]`.
fn change_against(series: &[f64], offset: usize) -> Option<f64> {
    if offset == 0 {
        return None;
    }
    let current = sample(series, 0)?;
    let base = sample(series, offset)?;
    percent_change(current, base)
}

/// `(current - base) / base`, or `None` when the result is not a finite number.
pub fn percent_change(current: f64, base: f64) -> Option<f64> {
    if base == 0.0 {
        return None;
    }
    let change = (current - base) / base;
    change.is_finite().then_some(change)
}

/// Decimates, truncates and reverses a most-recent-first series.
fn trend(series: &[f64], settings: &MetricSettings) -> Vec<f64> {
    let stride = settings.trend_stride.max(1);
    let limit = settings.trend_limit.unwrap_or(usize::MAX);

    let mut points: Vec<f64> = series
        .iter()
        .step_by(stride)
        .copied()
        .filter(|v| v.is_finite())
        .take(limit)
        .collect();
    points.reverse();
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERIES: [f64; 5] = [100.0, 80.0, 60.0, 50.0, 40.0];

    fn scalar(f: MetricFunction, series: &[f64]) -> Option<f64> {
        match f.apply(series, &MetricSettings::default()) {
            MetricOutput::Scalar(v) => v,
            MetricOutput::Series(_) => panic!("expected scalar output"),
        }
    }

    #[test]
    fn test_worked_example() {
        assert_eq!(scalar(MetricFunction::Latest, &SERIES), Some(100.0));
        assert_eq!(scalar(MetricFunction::Previous, &SERIES), Some(80.0));
        assert_eq!(scalar(MetricFunction::WeekOverWeek, &SERIES), Some(0.25));
        assert_eq!(scalar(MetricFunction::MonthOverMonth, &SERIES), Some(1.5));
        assert_eq!(
            MetricFunction::TrendSeries.apply(&SERIES, &MetricSettings::default()),
            MetricOutput::Series(vec![40.0, 50.0, 60.0, 80.0, 100.0])
        );
    }

    #[test]
    fn test_zero_denominator_is_none() {
        assert_eq!(scalar(MetricFunction::WeekOverWeek, &[100.0, 0.0]), None);
    }

    #[test]
    fn test_short_series() {
        assert_eq!(scalar(MetricFunction::Latest, &[]), None);
        assert_eq!(scalar(MetricFunction::Previous, &[5.0]), None);
        assert_eq!(scalar(MetricFunction::WeekOverWeek, &[5.0]), None);
        assert_eq!(scalar(MetricFunction::MonthOverMonth, &[5.0, 4.0, 3.0]), None);
    }

    #[test]
    fn test_month_offset_is_configurable() {
        let settings = MetricSettings { month_offset: 3, ..MetricSettings::default() };
        assert_eq!(
            MetricFunction::MonthOverMonth.apply(&SERIES, &settings),
            MetricOutput::Scalar(Some(1.0))
        );
    }

    #[test]
    fn test_trend_stride_and_limit() {
        let series: Vec<f64> = (0..20).rev().map(f64::from).collect();
        let settings = MetricSettings {
            trend_stride: 8,
            trend_limit: None,
            ..MetricSettings::default()
        };
        assert_eq!(
            MetricFunction::TrendSeries.apply(&series, &settings),
            MetricOutput::Series(vec![3.0, 11.0, 19.0])
        );

        let settings = MetricSettings { trend_limit: Some(2), ..settings };
        assert_eq!(
            MetricFunction::TrendSeries.apply(&series, &settings),
            MetricOutput::Series(vec![11.0, 19.0])
        );
    }

    #[test]
    fn test_trend_limit_counts_only_real_samples() {
        let series = [4.0, f64::NAN, 3.0, f64::INFINITY, 2.0, 1.0];
        let settings = MetricSettings {
            trend_limit: Some(3),
            ..MetricSettings::default()
        };
        assert_eq!(
            MetricFunction::TrendSeries.apply(&series, &settings),
            MetricOutput::Series(vec![2.0, 3.0, 4.0])
        );
    }

    #[test]
    fn test_key_round_trip() {
        for f in MetricFunction::ALL {
            assert_eq!(MetricFunction::from_key(f.key()), Some(f));
        }
        assert_eq!(MetricFunction::from_key("median"), None);
    }

    #[test]
    fn test_settings_defaults_from_partial_json() {
        let settings: MetricSettings = serde_json::from_str(r#"{"monthOffset": 3}"#).unwrap();
        assert_eq!(settings.month_offset, 3);
        assert_eq!(settings.trend_stride, 1);
        assert_eq!(settings.trend_limit, None);
    }
}
