//! Scenario averaging
//!
//! Collapses every scenario variant of a (model, metric, timestamp) run into
//! one synthetic record whose statistics are the per-field means.
//!
//! # Coverage policy
//!
//! Only groups that cover the maximum number of distinct scenarios seen in
//! any group are reported. A run that is missing scenarios would otherwise
//! average over an easier or harder subset and show up as a jump in the
//! chart. The cost is that incomplete runs are dropped silently; they are
//! logged at debug level.

use crate::record::{AverageInfo, Record, StatField, Stats};
use chrono::NaiveDateTime;
use std::collections::{HashMap, HashSet};

/// Split label given to averaged records, which merge across splits
pub const COMBINED_SPLIT: &str = "combined";

type GroupKey<'a> = (&'a str, &'a str, Option<NaiveDateTime>);

/// Label shown in place of the scenario for averaged records
pub fn average_label(scenario_count: usize) -> String {
    format!("Average ({} scenarios)", scenario_count)
}

/// Distinct non-empty values in first-appearance order
fn distinct_scenarios<'a, I: IntoIterator<Item = &'a Record>>(records: I) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .map(|r| r.scenario_class.as_str())
        .filter(|s| !s.is_empty() && seen.insert(*s))
        .collect()
}

/// Mean of the present values of one field, missing when none are present
fn mean_of(group: &[&Record], field: StatField) -> Option<f64> {
    let values: Vec<f64> = group.iter().filter_map(|r| r.stat(field)).collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Average records across scenarios, one output per fully-covered group
pub fn average(records: &[Record]) -> Vec<Record> {
    let mut index: HashMap<GroupKey<'_>, usize> = HashMap::new();
    let mut groups: Vec<Vec<&Record>> = Vec::new();

    for r in records {
        let key = (r.model.as_str(), r.metric_name.as_str(), r.run_timestamp);
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(r);
    }

    let coverage: Vec<usize> = groups
        .iter()
        .map(|g| distinct_scenarios(g.iter().copied()).len())
        .collect();
    let max_scenarios = coverage.iter().copied().max().unwrap_or(0);
    let scenarios = distinct_scenarios(records).join(", ");

    let mut out = Vec::new();
    for (group, covered) in groups.iter().zip(&coverage) {
        let first = group[0];
        if *covered < max_scenarios {
            tracing::debug!(
                model = %first.model,
                metric = %first.metric_name,
                timestamp = ?first.run_timestamp,
                covered,
                required = max_scenarios,
                "dropping partially covered run from average"
            );
            continue;
        }

        let mut stats = Stats::default();
        for field in StatField::ALL {
            stats.set(field, mean_of(group, field));
        }

        out.push(Record {
            model: first.model.clone(),
            scenario_class: average_label(max_scenarios),
            metric_name: first.metric_name.clone(),
            split: COMBINED_SPLIT.to_string(),
            run_timestamp: first.run_timestamp,
            run_date: first.run_timestamp.map(|ts| ts.date()),
            run_id: first.run_id.clone(),
            stats,
            average: Some(AverageInfo {
                scenario_count: max_scenarios,
                scenarios: scenarios.clone(),
            }),
        });
    }

    out
}
