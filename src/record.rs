//! Benchmark records
//!
//! A [`Record`] is one normalized CSV row: which model ran which scenario,
//! what metric was measured on which split, when, and the summary statistics
//! of that measurement. Every statistic is optional. A missing value is
//! never treated as zero anywhere in the crate.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Provider label used when a model id has no `provider/` prefix
pub const UNKNOWN_PROVIDER: &str = "Unknown";

/// The numeric statistic columns, in CSV order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatField {
    Count,
    Sum,
    Mean,
    Min,
    Max,
    Std,
    Variance,
    P25,
    P50,
    P75,
    P90,
    P95,
    P99,
}

impl StatField {
    pub const ALL: [StatField; 13] = [
        StatField::Count,
        StatField::Sum,
        StatField::Mean,
        StatField::Min,
        StatField::Max,
        StatField::Std,
        StatField::Variance,
        StatField::P25,
        StatField::P50,
        StatField::P75,
        StatField::P90,
        StatField::P95,
        StatField::P99,
    ];

    /// Column name in the CSV header
    pub fn column(&self) -> &'static str {
        match self {
            StatField::Count => "count",
            StatField::Sum => "sum",
            StatField::Mean => "mean",
            StatField::Min => "min",
            StatField::Max => "max",
            StatField::Std => "std",
            StatField::Variance => "variance",
            StatField::P25 => "p25",
            StatField::P50 => "p50",
            StatField::P75 => "p75",
            StatField::P90 => "p90",
            StatField::P95 => "p95",
            StatField::P99 => "p99",
        }
    }
}

impl std::fmt::Display for StatField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// Summary statistics of one measurement
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Stats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p25: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p50: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p75: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p90: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p95: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p99: Option<f64>,
}

impl Stats {
    pub fn get(&self, field: StatField) -> Option<f64> {
        match field {
            StatField::Count => self.count,
            StatField::Sum => self.sum,
            StatField::Mean => self.mean,
            StatField::Min => self.min,
            StatField::Max => self.max,
            StatField::Std => self.std,
            StatField::Variance => self.variance,
            StatField::P25 => self.p25,
            StatField::P50 => self.p50,
            StatField::P75 => self.p75,
            StatField::P90 => self.p90,
            StatField::P95 => self.p95,
            StatField::P99 => self.p99,
        }
    }

    pub fn set(&mut self, field: StatField, value: Option<f64>) {
        let slot = match field {
            StatField::Count => &mut self.count,
            StatField::Sum => &mut self.sum,
            StatField::Mean => &mut self.mean,
            StatField::Min => &mut self.min,
            StatField::Max => &mut self.max,
            StatField::Std => &mut self.std,
            StatField::Variance => &mut self.variance,
            StatField::P25 => &mut self.p25,
            StatField::P50 => &mut self.p50,
            StatField::P75 => &mut self.p75,
            StatField::P90 => &mut self.p90,
            StatField::P95 => &mut self.p95,
            StatField::P99 => &mut self.p99,
        };
        *slot = value;
    }
}

/// Present only on records produced by the scenario averager
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageInfo {
    /// Number of distinct scenarios every retained group covers
    pub scenario_count: usize,
    /// Every scenario label seen in the averaged input, comma-joined
    pub scenarios: String,
}

/// One row of benchmark data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub model: String,
    pub scenario_class: String,
    pub metric_name: String,
    pub split: String,
    pub run_timestamp: Option<NaiveDateTime>,
    pub run_date: Option<NaiveDate>,
    pub run_id: Option<String>,
    #[serde(flatten)]
    pub stats: Stats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average: Option<AverageInfo>,
}

impl Record {
    /// A record with identity fields set and no statistics
    pub fn new(model: &str, scenario_class: &str, metric_name: &str) -> Self {
        Self {
            model: model.to_string(),
            scenario_class: scenario_class.to_string(),
            metric_name: metric_name.to_string(),
            split: String::new(),
            run_timestamp: None,
            run_date: None,
            run_id: None,
            stats: Stats::default(),
            average: None,
        }
    }

    pub fn stat(&self, field: StatField) -> Option<f64> {
        self.stats.get(field)
    }

    /// The primary metric value every chart plots
    pub fn mean(&self) -> Option<f64> {
        self.stats.mean
    }

    pub fn is_average(&self) -> bool {
        self.average.is_some()
    }

    pub fn provider(&self) -> &str {
        extract_provider(&self.model)
    }
}

/// Vendor prefix of a model id: the part before the first `/`
///
/// `"openai/gpt-4"` is `"openai"`; ids without a prefix are [`UNKNOWN_PROVIDER`].
pub fn extract_provider(model: &str) -> &str {
    match model.split_once('/') {
        Some((provider, _)) if !provider.is_empty() => provider,
        _ => UNKNOWN_PROVIDER,
    }
}
