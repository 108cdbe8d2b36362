//! Summary statistics, filter options and table rows
//!
//! Everything here reads a record set and never changes it. An empty set
//! yields empty values, which the views render as "no data".

use crate::record::{extract_provider, Record};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

/// Headline numbers for the selected records
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    /// Most recent `mean` by run timestamp
    pub latest: Option<f64>,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Latest value compared with the earliest
    pub trend: Option<Trend>,
    /// Records in the selection
    pub count: usize,
    /// Records with a numeric `mean`
    pub values: usize,
    /// Distinct run ids
    pub unique_runs: usize,
    pub first_run: Option<NaiveDateTime>,
    pub last_run: Option<NaiveDateTime>,
    /// Whole days between first and last run, rounded up
    pub days_tracked: Option<i64>,
    /// Set when the selection is scenario-averaged
    pub scenarios_averaged: Option<usize>,
}

impl Summary {
    pub fn from_records(records: &[Record]) -> Self {
        let mut summary = Self {
            count: records.len(),
            ..Self::default()
        };
        if records.is_empty() {
            return summary;
        }

        // Stable sort keeps CSV order among equal or missing timestamps
        let mut ordered: Vec<&Record> = records.iter().collect();
        ordered.sort_by_key(|r| r.run_timestamp);
        let values: Vec<f64> = ordered.iter().filter_map(|r| r.mean()).collect();

        if let (Some(first), Some(last)) = (values.first(), values.last()) {
            summary.latest = Some(*last);
            summary.mean = Some(values.iter().sum::<f64>() / values.len() as f64);
            summary.min = values.iter().copied().reduce(f64::min);
            summary.max = values.iter().copied().reduce(f64::max);
            summary.trend = Some(if values.len() < 2 || last == first {
                Trend::Stable
            } else if last > first {
                Trend::Up
            } else {
                Trend::Down
            });
        }
        summary.values = values.len();

        summary.unique_runs = records
            .iter()
            .filter_map(|r| r.run_id.as_deref())
            .collect::<HashSet<_>>()
            .len();

        summary.first_run = records.iter().filter_map(|r| r.run_timestamp).min();
        summary.last_run = records.iter().filter_map(|r| r.run_timestamp).max();
        if let (Some(first), Some(last)) = (summary.first_run, summary.last_run) {
            let secs = (last - first).num_seconds();
            summary.days_tracked = Some((secs + 86_399) / 86_400);
        }

        summary.scenarios_averaged = records[0].average.as_ref().map(|a| a.scenario_count);
        summary
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Values offered by the filter dropdowns, sorted, empties removed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub models: Vec<String>,
    pub scenarios: Vec<String>,
    pub metrics: Vec<String>,
    pub splits: Vec<String>,
    pub providers: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[Record]) -> Self {
        fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
            values
                .filter(|v| !v.is_empty())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(str::to_string)
                .collect()
        }

        Self {
            models: distinct(records.iter().map(|r| r.model.as_str())),
            scenarios: distinct(records.iter().map(|r| r.scenario_class.as_str())),
            metrics: distinct(records.iter().map(|r| r.metric_name.as_str())),
            splits: distinct(records.iter().map(|r| r.split.as_str())),
            providers: distinct(records.iter().filter(|r| !r.model.is_empty()).map(|r| extract_provider(&r.model))),
        }
    }

    /// Metric preselected when none is chosen: the first in sort order
    pub fn default_metric(&self) -> Option<&str> {
        self.metrics.first().map(String::as_str)
    }
}

/// Newest first, at most `limit` records (all when `None`)
pub fn table_rows(records: &[Record], limit: Option<usize>) -> Vec<Record> {
    let mut rows: Vec<Record> = records.to_vec();
    rows.sort_by(|a, b| b.run_timestamp.cmp(&a.run_timestamp));
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    rows
}
