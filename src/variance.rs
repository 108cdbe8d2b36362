//! Run-to-run consistency of each model
//!
//! Measures how much a model's `mean` moves between runs: sample standard
//! deviation, sample variance, or range. A single point says nothing about
//! consistency, so every statistic needs at least two values; buckets with
//! fewer are skipped and models left with no bucket are omitted.

use crate::buckets::{day_bucket, week_start};
use crate::record::Record;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Minimum number of values a statistic is computed from
pub const MIN_POINTS: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarianceMetric {
    /// Sample standard deviation (n - 1)
    #[default]
    Std,
    /// Sample variance (n - 1)
    Variance,
    /// max - min
    Range,
}

impl VarianceMetric {
    /// Apply the statistic; `None` below [`MIN_POINTS`]
    pub fn compute(&self, values: &[f64]) -> Option<f64> {
        if values.len() < MIN_POINTS {
            return None;
        }
        match self {
            VarianceMetric::Std => sample_variance(values).map(f64::sqrt),
            VarianceMetric::Variance => sample_variance(values),
            VarianceMetric::Range => {
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                Some(max - min)
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VarianceMetric::Std => "Std Dev",
            VarianceMetric::Variance => "Variance",
            VarianceMetric::Range => "Range",
        }
    }
}

impl std::str::FromStr for VarianceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "std" | "stddev" => Ok(VarianceMetric::Std),
            "variance" | "var" => Ok(VarianceMetric::Variance),
            "range" => Ok(VarianceMetric::Range),
            other => Err(format!("unknown variance metric '{}' (std, variance, range)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grouping {
    /// One value per model
    #[default]
    Overall,
    /// One value per model per calendar day
    Daily,
    /// One value per model per Monday-started week
    Weekly,
}

impl std::str::FromStr for Grouping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overall" | "all" => Ok(Grouping::Overall),
            "daily" | "day" => Ok(Grouping::Daily),
            "weekly" | "week" => Ok(Grouping::Weekly),
            other => Err(format!("unknown grouping '{}' (overall, daily, weekly)", other)),
        }
    }
}

/// Sample variance with the n - 1 denominator
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some(ss / (n - 1) as f64)
}

/// A statistic and how many values it came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VariancePoint {
    /// Day or week start; absent for the overall grouping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<NaiveDate>,
    pub value: f64,
    pub points: usize,
}

/// Result for one model, buckets ascending
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelVariance {
    pub model: String,
    pub values: Vec<VariancePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarianceResult {
    pub metric: VarianceMetric,
    pub grouping: Grouping,
    /// Models in ascending name order
    pub models: Vec<ModelVariance>,
}

impl VarianceResult {
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn get(&self, model: &str) -> Option<&ModelVariance> {
        self.models.iter().find(|m| m.model == model)
    }
}

fn bucket_of(record: &Record, grouping: Grouping) -> Option<Option<NaiveDate>> {
    match grouping {
        Grouping::Overall => Some(None),
        Grouping::Daily => day_bucket(record).map(Some),
        Grouping::Weekly => day_bucket(record).map(|d| Some(week_start(d))),
    }
}

/// Spread of `mean` per model, overall or as a daily / weekly series
///
/// Records without a numeric mean are ignored, as are records without a
/// date when a time grouping is requested.
pub fn compute_variance(records: &[Record], metric: VarianceMetric, grouping: Grouping) -> VarianceResult {
    let mut by_model: BTreeMap<&str, BTreeMap<Option<NaiveDate>, Vec<f64>>> = BTreeMap::new();

    for r in records {
        let Some(value) = r.mean() else { continue };
        let Some(bucket) = bucket_of(r, grouping) else { continue };
        by_model
            .entry(r.model.as_str())
            .or_default()
            .entry(bucket)
            .or_default()
            .push(value);
    }

    let models = by_model
        .into_iter()
        .filter_map(|(model, buckets)| {
            let values: Vec<VariancePoint> = buckets
                .into_iter()
                .filter_map(|(bucket, vals)| {
                    metric.compute(&vals).map(|value| VariancePoint {
                        bucket,
                        value,
                        points: vals.len(),
                    })
                })
                .collect();
            if values.is_empty() {
                None
            } else {
                Some(ModelVariance {
                    model: model.to_string(),
                    values,
                })
            }
        })
        .collect();

    VarianceResult {
        metric,
        grouping,
        models,
    }
}
