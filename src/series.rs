//! Chart-ready series
//!
//! Everything the browser plots is a list of named series of `{x, y, label}`
//! points. The label is hover text using the plotting library's `<br>` line
//! break.

use crate::buckets::{bucket_records, day_bucket, ScatterBucket};
use crate::filter::Criteria;
use crate::record::Record;
use crate::variance::{sample_variance, VarianceResult};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Days shown in the daily comparison chart
pub const COMPARISON_DAYS: usize = 7;

const TIMESTAMP_LABEL: &str = "%Y-%m-%d %H:%M";

/// X coordinate of a point
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum X {
    Time(NaiveDateTime),
    Date(NaiveDate),
    Position(f64),
    Category(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub x: X,
    pub y: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Mean of `mean` per timestamp, ascending; records without either are skipped
fn per_timestamp<'a>(records: &[&'a Record]) -> BTreeMap<NaiveDateTime, Vec<&'a Record>> {
    let mut by_time: BTreeMap<NaiveDateTime, Vec<&'a Record>> = BTreeMap::new();
    for r in records {
        if let (Some(ts), Some(_)) = (r.run_timestamp, r.mean()) {
            by_time.entry(ts).or_default().push(*r);
        }
    }
    by_time
}

fn group_by_model<'a>(records: &[&'a Record]) -> BTreeMap<&'a str, Vec<&'a Record>> {
    let mut by_model: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
    for r in records {
        by_model.entry(r.model.as_str()).or_default().push(*r);
    }
    by_model
}

/// Performance over time for the selected records
///
/// One point per run timestamp, y = mean of the `mean` values at that time.
pub fn time_series(records: &[Record], name: &str) -> Series {
    let refs: Vec<&Record> = records.iter().collect();
    let points = per_timestamp(&refs)
        .into_iter()
        .filter_map(|(ts, group)| {
            let values: Vec<f64> = group.iter().filter_map(|r| r.mean()).collect();
            let y = mean(&values)?;
            let first = group[0];
            let label = match &first.average {
                Some(info) => format!(
                    "{} data points<br>Avg across {} scenarios<br>Mean: {:.4}",
                    group.len(),
                    info.scenario_count,
                    y
                ),
                None => {
                    let scenario = if first.scenario_class.is_empty() {
                        "Unknown"
                    } else {
                        first.scenario_class.as_str()
                    };
                    format!("Scenario: {}<br>{} data points<br>Mean: {:.4}", scenario, group.len(), y)
                }
            };
            Some(SeriesPoint { x: X::Time(ts), y, label })
        })
        .collect();

    Series {
        name: name.to_string(),
        points,
    }
}

/// All models side by side, averaged across scenarios
///
/// Only the metric and split selections apply; model and scenario
/// selections are ignored so every model stays visible. Each point averages
/// whatever scenarios that model ran at that time, with no coverage
/// requirement, and its label carries that point's own scenario count.
pub fn overview(records: &[Record], criteria: &Criteria) -> Vec<Series> {
    let narrowed: Vec<&Record> = records
        .iter()
        .filter(|r| criteria.metric.matches(&r.metric_name) && criteria.split.matches(&r.split))
        .collect();

    group_by_model(&narrowed)
        .into_iter()
        .map(|(model, group)| {
            let points = per_timestamp(&group)
                .into_iter()
                .filter_map(|(ts, at)| {
                    let values: Vec<f64> = at.iter().filter_map(|r| r.mean()).collect();
                    let y = mean(&values)?;
                    let scenarios = at
                        .iter()
                        .map(|r| r.scenario_class.as_str())
                        .filter(|s| !s.is_empty())
                        .collect::<HashSet<_>>()
                        .len();
                    Some(SeriesPoint {
                        x: X::Time(ts),
                        y,
                        label: format!("{}<br>Avg across {} scenarios<br>Score: {:.4}", model, scenarios, y),
                    })
                })
                .collect();
            Series {
                name: model.to_string(),
                points,
            }
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// Scatter of every run by time of day or time of week, one series per model
pub fn scatter(records: &[Record], bucket: ScatterBucket) -> Vec<Series> {
    let mut by_model: BTreeMap<&str, Vec<SeriesPoint>> = BTreeMap::new();

    for b in bucket_records(records, bucket) {
        let r = b.record;
        let when = r
            .run_timestamp
            .map(|ts| ts.format(TIMESTAMP_LABEL).to_string())
            .unwrap_or_default();
        by_model.entry(r.model.as_str()).or_default().push(SeriesPoint {
            x: X::Position(b.position),
            y: b.value,
            label: format!(
                "{}<br>{}<br>{}<br>{}: {:.4}",
                r.model, r.scenario_class, when, r.metric_name, b.value
            ),
        });
    }

    by_model
        .into_iter()
        .map(|(model, points)| Series {
            name: model.to_string(),
            points,
        })
        .collect()
}

/// Variance results as series: dated points, or one bar per model overall
pub fn variance_series(result: &VarianceResult) -> Vec<Series> {
    result
        .models
        .iter()
        .map(|m| Series {
            name: m.model.clone(),
            points: m
                .values
                .iter()
                .map(|v| {
                    let x = match v.bucket {
                        Some(day) => X::Date(day),
                        None => X::Category(m.model.clone()),
                    };
                    let when = v
                        .bucket
                        .map(|d| format!("{}<br>", d))
                        .unwrap_or_default();
                    SeriesPoint {
                        x,
                        y: v.value,
                        label: format!(
                            "{}<br>{}{}: {:.4}<br>Points: {}",
                            m.model,
                            when,
                            result.metric.label(),
                            v.value,
                            v.points
                        ),
                    }
                })
                .collect(),
        })
        .collect()
}

/// One day of the daily comparison chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyComparison {
    pub date: NaiveDate,
    pub mean: f64,
    /// Sample std dev of the day's values, 0 for a single value
    pub std_dev: f64,
    /// Records on that day
    pub runs: usize,
    /// Records with a numeric mean
    pub points: usize,
}

/// Mean and ±1 std dev per day for the most recent `days` dated days
pub fn daily_comparison(records: &[Record], days: usize) -> Vec<DailyComparison> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&Record>> = BTreeMap::new();
    for r in records {
        if let Some(day) = day_bucket(r) {
            by_day.entry(day).or_default().push(r);
        }
    }

    let skip = by_day.len().saturating_sub(days);
    by_day
        .into_iter()
        .skip(skip)
        .filter_map(|(date, group)| {
            let values: Vec<f64> = group.iter().filter_map(|r| r.mean()).collect();
            let m = mean(&values)?;
            Some(DailyComparison {
                date,
                mean: m,
                std_dev: sample_variance(&values).map(f64::sqrt).unwrap_or(0.0),
                runs: group.len(),
                points: values.len(),
            })
        })
        .collect()
}
