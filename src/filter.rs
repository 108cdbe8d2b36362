//! Narrowing a record set by model / scenario / metric / split
//!
//! Every field has an explicit selection. "All" is a pass-through, never a
//! match against the empty string. The scenario field additionally has an
//! averaging mode that hands the narrowed set to the scenario averager.

use crate::average;
use crate::record::Record;
use serde::{Deserialize, Serialize};

/// Value the browser sends for the "Average across all scenarios" option
pub const AVERAGE_PARAM: &str = "__AVERAGE__";

/// Selection for a plain field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Selection {
    #[default]
    All,
    Exact(String),
}

impl Selection {
    /// Wire form: empty means "All"
    pub fn from_param(raw: &str) -> Self {
        if raw.is_empty() {
            Selection::All
        } else {
            Selection::Exact(raw.to_string())
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Exact(want) => want == value,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Selection::All => None,
            Selection::Exact(v) => Some(v),
        }
    }
}

/// Selection for the scenario field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ScenarioSelection {
    #[default]
    All,
    Exact(String),
    Average,
}

impl ScenarioSelection {
    pub fn from_param(raw: &str) -> Self {
        match raw {
            "" => ScenarioSelection::All,
            AVERAGE_PARAM => ScenarioSelection::Average,
            other => ScenarioSelection::Exact(other.to_string()),
        }
    }

    pub fn is_average(&self) -> bool {
        matches!(self, ScenarioSelection::Average)
    }
}

/// One selection per filterable field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Criteria {
    pub model: Selection,
    pub scenario: ScenarioSelection,
    pub metric: Selection,
    pub split: Selection,
}

/// String parameters as they arrive from a query string or the CLI
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CriteriaParams {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub scenario: String,
    #[serde(default)]
    pub metric: String,
    #[serde(default)]
    pub split: String,
}

impl Criteria {
    /// Criteria that let everything through
    pub fn all() -> Self {
        Self::default()
    }

    pub fn from_params(params: &CriteriaParams) -> Self {
        Self {
            model: Selection::from_param(&params.model),
            scenario: ScenarioSelection::from_param(&params.scenario),
            metric: Selection::from_param(&params.metric),
            split: Selection::from_param(&params.split),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Selection::Exact(model.to_string());
        self
    }

    pub fn with_metric(mut self, metric: &str) -> Self {
        self.metric = Selection::Exact(metric.to_string());
        self
    }

    pub fn with_split(mut self, split: &str) -> Self {
        self.split = Selection::from_param(split);
        self
    }

    pub fn with_scenario(mut self, scenario: ScenarioSelection) -> Self {
        self.scenario = scenario;
        self
    }

    /// Does a record pass the model / metric / split selections
    fn matches_base(&self, r: &Record) -> bool {
        self.model.matches(&r.model) && self.metric.matches(&r.metric_name) && self.split.matches(&r.split)
    }
}

/// Apply criteria, producing a new record set
///
/// In averaging mode the other selections narrow the input first and the
/// averager's output is returned.
pub fn filter(records: &[Record], criteria: &Criteria) -> Vec<Record> {
    match &criteria.scenario {
        ScenarioSelection::Average => {
            let base: Vec<Record> = records
                .iter()
                .filter(|r| criteria.matches_base(r))
                .cloned()
                .collect();
            average::average(&base)
        }
        ScenarioSelection::All => records
            .iter()
            .filter(|r| criteria.matches_base(r))
            .cloned()
            .collect(),
        ScenarioSelection::Exact(scenario) => records
            .iter()
            .filter(|r| criteria.matches_base(r) && &r.scenario_class == scenario)
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(model: &str, scenario: &str, metric: &str, split: &str, mean: f64) -> Record {
        let mut r = Record::new(model, scenario, metric);
        r.split = split.to_string();
        r.stats.mean = Some(mean);
        r.run_timestamp = NaiveDate::from_ymd_opt(2025, 6, 8)
            .and_then(|d| d.and_hms_opt(12, 0, 0));
        r
    }

    fn sample() -> Vec<Record> {
        vec![
            rec("openai/gpt-4", "mmlu", "acc", "test", 0.8),
            rec("openai/gpt-4", "gsm", "acc", "valid", 0.6),
            rec("meta/llama", "mmlu", "acc", "test", 0.5),
            rec("meta/llama", "mmlu", "f1", "", 0.4),
        ]
    }

    // ==========================================================================
    // PASS-THROUGH TESTS
    // ==========================================================================

    #[test]
    fn test_empty_criteria_returns_everything_in_order() {
        let records = sample();
        let out = filter(&records, &Criteria::all());
        assert_eq!(out, records);
    }

    #[test]
    fn test_empty_params_mean_all() {
        let criteria = Criteria::from_params(&CriteriaParams::default());
        assert_eq!(criteria, Criteria::all());
        assert_eq!(filter(&sample(), &criteria).len(), 4);
    }

    #[test]
    fn test_empty_split_is_pass_through_not_match_empty() {
        // The "All splits" option sends ""; it must not select only the
        // record whose split happens to be empty.
        let criteria = Criteria::all().with_split("");
        assert_eq!(filter(&sample(), &criteria).len(), 4);
    }

    // ==========================================================================
    // EXACT MATCH TESTS
    // ==========================================================================

    #[test]
    fn test_filter_by_model_and_metric() {
        let criteria = Criteria::all().with_model("meta/llama").with_metric("acc");
        let out = filter(&sample(), &criteria);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].stats.mean, Some(0.5));
    }

    #[test]
    fn test_filter_by_scenario() {
        let criteria = Criteria::all().with_scenario(ScenarioSelection::Exact("mmlu".into()));
        let out = filter(&sample(), &criteria);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|r| r.scenario_class == "mmlu"));
    }

    #[test]
    fn test_filter_by_split() {
        let criteria = Criteria::all().with_split("valid");
        let out = filter(&sample(), &criteria);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].scenario_class, "gsm");
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let criteria = Criteria::all().with_model("nobody");
        assert!(filter(&sample(), &criteria).is_empty());
    }

    // ==========================================================================
    // AVERAGING MODE
    // ==========================================================================

    #[test]
    fn test_average_param_selects_averaging() {
        assert_eq!(ScenarioSelection::from_param(AVERAGE_PARAM), ScenarioSelection::Average);
        assert_eq!(ScenarioSelection::from_param(""), ScenarioSelection::All);
        assert_eq!(
            ScenarioSelection::from_param("mmlu"),
            ScenarioSelection::Exact("mmlu".into())
        );
    }

    #[test]
    fn test_averaging_mode_redirects_to_averager() {
        let criteria = Criteria::all()
            .with_model("openai/gpt-4")
            .with_metric("acc")
            .with_scenario(ScenarioSelection::Average);
        let out = filter(&sample(), &criteria);

        assert_eq!(out.len(), 1);
        assert!(out[0].is_average());
        assert_eq!(out[0].scenario_class, "Average (2 scenarios)");
        assert!((out[0].stats.mean.unwrap() - 0.7).abs() < 1e-12);
    }
}
