//! Everything the dashboard shows for one filter state
//!
//! [`build`] is the single entry point the presentation layer calls after
//! every selection change. It holds no state: same records and criteria in,
//! same view out.

use crate::buckets::ScatterBucket;
use crate::filter::{filter, Criteria};
use crate::record::Record;
use crate::series::{self, DailyComparison, Series};
use crate::summary::{table_rows, FilterOptions, Summary};
use crate::variance::{compute_variance, Grouping, VarianceMetric, VarianceResult};
use serde::Serialize;

/// Rows shown in the data table unless asked otherwise
pub const DEFAULT_ROW_LIMIT: usize = 50;

/// Time series name when no model is selected
pub const ALL_MODELS: &str = "All models";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub criteria: Criteria,
    pub averaging: bool,
    /// The filtered or averaged records
    pub records: Vec<Record>,
    pub summary: Summary,
    /// Every model, averaged across scenarios
    pub overview: Vec<Series>,
    /// The selected model over time; empty until a model is selected
    pub time_series: Series,
    pub daily_comparison: Vec<DailyComparison>,
    /// Newest first, limited
    pub table: Vec<Record>,
}

impl DashboardView {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Build the full view for a selection
pub fn build(records: &[Record], criteria: &Criteria, row_limit: Option<usize>) -> DashboardView {
    let selected = filter(records, criteria);
    // Per-model detail only once a model is chosen
    let time_series = match criteria.model.value() {
        Some(model) => series::time_series(&selected, model),
        None => Series {
            name: ALL_MODELS.to_string(),
            points: Vec::new(),
        },
    };

    DashboardView {
        criteria: criteria.clone(),
        averaging: criteria.scenario.is_average(),
        summary: Summary::from_records(&selected),
        overview: series::overview(records, criteria),
        time_series,
        daily_comparison: series::daily_comparison(&selected, series::COMPARISON_DAYS),
        table: table_rows(&selected, row_limit),
        records: selected,
    }
}

/// Dropdown contents for the loaded records
pub fn options(records: &[Record]) -> FilterOptions {
    FilterOptions::from_records(records)
}

/// Scatter series for the selected records
pub fn scatter_view(records: &[Record], criteria: &Criteria, bucket: ScatterBucket) -> Vec<Series> {
    series::scatter(&filter(records, criteria), bucket)
}

/// Variance of the selected records, raw and as series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarianceView {
    pub result: VarianceResult,
    pub series: Vec<Series>,
}

pub fn variance_view(
    records: &[Record],
    criteria: &Criteria,
    metric: VarianceMetric,
    grouping: Grouping,
) -> VarianceView {
    let result = compute_variance(&filter(records, criteria), metric, grouping);
    let series = series::variance_series(&result);
    VarianceView { result, series }
}
