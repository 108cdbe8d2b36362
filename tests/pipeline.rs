//! End-to-end tests: CSV on disk through to dashboard views

use benchdash::buckets::ScatterBucket;
use benchdash::dashboard;
use benchdash::loader::{CSV_FILE_NAME, RESULTS_DIR};
use benchdash::series::X;
use benchdash::{
    average, filter, Criteria, Error, Grouping, Loader, ScenarioSelection, Selection, VarianceMetric,
};
use chrono::NaiveDate;

const CSV: &str = "\
model,scenario_class,metric_name,split,run_id,run_timestamp,run_date,count,mean,std,min,max
openai/gpt-4,mmlu,accuracy,test,r1,2025-06-09 06:00:00,2025-06-09,10,0.80,0.10,0.5,1.0
openai/gpt-4,gsm8k,accuracy,test,r1,2025-06-09 06:00:00,2025-06-09,10,0.60,0.20,0.2,0.9
openai/gpt-4,mmlu,accuracy,test,r2,2025-06-10 18:30:00,2025-06-10,10,0.90,,0.6,1.0
openai/gpt-4,gsm8k,accuracy,test,r2,2025-06-10 18:30:00,2025-06-10,10,0.70,0.30,0.3,1.0
openai/gpt-4,mmlu,accuracy,test,r3,2025-06-11 06:00:00,2025-06-11,10,0.85,0.10,0.5,1.0
anthropic/claude,mmlu,accuracy,test,r1,2025-06-09 07:00:00,2025-06-09,10,0.70,0.10,0.4,0.9
anthropic/claude,gsm8k,accuracy,test,r1,2025-06-09 07:00:00,2025-06-09,10,0.50,0.10,0.2,0.8
anthropic/claude,mmlu,latency,test,r1,2025-06-09 07:00:00,2025-06-09,10,1.50,not-a-number,1.0,2.0
";

fn write_dataset(dir: &std::path::Path) {
    std::fs::create_dir_all(dir.join(RESULTS_DIR)).unwrap();
    std::fs::write(dir.join(RESULTS_DIR).join(CSV_FILE_NAME), CSV).unwrap();
}

fn load() -> Vec<benchdash::Record> {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());
    Loader::for_root(dir.path()).load().unwrap().records
}

// ==========================================================================
// LOADING
// ==========================================================================

#[test]
fn test_loads_from_results_fallback() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());

    let dataset = Loader::for_root(dir.path()).load().unwrap();
    assert_eq!(dataset.records.len(), 8);
    assert_eq!(dataset.source, dir.path().join(RESULTS_DIR).join(CSV_FILE_NAME));
}

#[test]
fn test_missing_everywhere_reports_both_locations() {
    let dir = tempfile::tempdir().unwrap();
    let err = Loader::for_root(dir.path()).load().unwrap_err();

    match &err {
        Error::NotFound { tried } => assert_eq!(tried.len(), 2),
        other => panic!("expected NotFound, got {:?}", other),
    }
    assert!(err.to_string().contains(CSV_FILE_NAME));
}

#[test]
fn test_unparseable_cells_are_missing_not_dropped() {
    let records = load();
    let latency = records.iter().find(|r| r.metric_name == "latency").unwrap();
    assert_eq!(latency.stats.std, None);
    assert_eq!(latency.stats.mean, Some(1.5));

    let no_std = records
        .iter()
        .find(|r| r.run_id.as_deref() == Some("r2") && r.scenario_class == "mmlu")
        .unwrap();
    assert_eq!(no_std.stats.std, None);
}

// ==========================================================================
// FILTERING AND AVERAGING
// ==========================================================================

#[test]
fn test_all_criteria_is_identity() {
    let records = load();
    assert_eq!(filter(&records, &Criteria::all()), records);
}

#[test]
fn test_exact_filters_combine() {
    let records = load();
    let criteria = Criteria::all()
        .with_model("openai/gpt-4")
        .with_scenario(ScenarioSelection::Exact("mmlu".to_string()));

    let out = filter(&records, &criteria);
    assert_eq!(out.len(), 3);
    assert!(out.iter().all(|r| r.model == "openai/gpt-4" && r.scenario_class == "mmlu"));
}

#[test]
fn test_filter_is_repeatable() {
    let records = load();
    let criteria = Criteria::all().with_metric("accuracy");
    let once = filter(&records, &criteria);
    assert_eq!(filter(&once, &criteria), once);
}

#[test]
fn test_average_drops_partial_runs() {
    let records = load();
    let accuracy = filter(&records, &Criteria::all().with_metric("accuracy"));
    let averaged = average(&accuracy);

    // r3 for gpt-4 only has mmlu
    assert_eq!(averaged.len(), 3);
    assert!(averaged.iter().all(|r| r.scenario_class == "Average (2 scenarios)"));
    assert!(averaged.iter().all(|r| r.split == "combined"));

    let first = &averaged[0];
    assert_eq!(first.model, "openai/gpt-4");
    assert!((first.stats.mean.unwrap() - 0.70).abs() < 1e-9);
    assert!((first.stats.std.unwrap() - 0.15).abs() < 1e-9);
    assert_eq!(first.average.as_ref().unwrap().scenarios, "mmlu, gsm8k");

    // std present in only one member of the r2 group
    let second = &averaged[1];
    assert!((second.stats.std.unwrap() - 0.30).abs() < 1e-9);
}

#[test]
fn test_averaging_mode_uses_other_selections() {
    let records = load();
    let criteria = Criteria::all()
        .with_model("anthropic/claude")
        .with_metric("accuracy")
        .with_scenario(ScenarioSelection::Average);

    let out = filter(&records, &criteria);
    assert_eq!(out.len(), 1);
    assert!((out[0].stats.mean.unwrap() - 0.60).abs() < 1e-9);
}

// ==========================================================================
// VIEWS
// ==========================================================================

#[test]
fn test_dashboard_view_in_averaging_mode() {
    let records = load();
    let criteria = Criteria {
        model: Selection::Exact("openai/gpt-4".to_string()),
        scenario: ScenarioSelection::Average,
        metric: Selection::Exact("accuracy".to_string()),
        split: Selection::All,
    };

    let view = dashboard::build(&records, &criteria, Some(1));
    assert!(view.averaging);
    assert_eq!(view.records.len(), 2);
    assert_eq!(view.table.len(), 1);
    assert_eq!(view.summary.scenarios_averaged, Some(2));
    assert_eq!(view.time_series.points.len(), 2);
    // Newest first
    assert_eq!(view.table[0].run_id.as_deref(), Some("r2"));
}

#[test]
fn test_overview_ignores_model_and_scenario() {
    let records = load();
    let criteria = Criteria::all()
        .with_model("openai/gpt-4")
        .with_metric("accuracy")
        .with_scenario(ScenarioSelection::Exact("mmlu".to_string()));

    let view = dashboard::build(&records, &criteria, None);
    let names: Vec<&str> = view.overview.iter().map(|s| s.name.as_str()).collect();
    assert!(names.contains(&"openai/gpt-4"));
    assert!(names.contains(&"anthropic/claude"));
}

#[test]
fn test_scatter_daily_positions() {
    let records = load();
    let criteria = Criteria::all().with_model("openai/gpt-4").with_metric("accuracy");

    let series = dashboard::scatter_view(&records, &criteria, ScatterBucket::Daily);
    assert_eq!(series.len(), 1);
    let xs: Vec<f64> = series[0]
        .points
        .iter()
        .filter_map(|p| match p.x {
            X::Position(x) => Some(x),
            _ => None,
        })
        .collect();
    assert_eq!(xs.len(), 5);
    assert!(xs.iter().all(|x| (0.0..24.0).contains(x)));
    assert!(xs.contains(&18.5));
}

#[test]
fn test_scatter_weekly_positions() {
    let records = load();
    let criteria = Criteria::all().with_model("anthropic/claude").with_metric("latency");

    let series = dashboard::scatter_view(&records, &criteria, ScatterBucket::Weekly);
    // 2025-06-09 is a Monday
    match series[0].points[0].x {
        X::Position(x) => assert!((x - (1.0 + 7.0 / 24.0)).abs() < 1e-9),
        ref other => panic!("unexpected x {:?}", other),
    }
}

#[test]
fn test_variance_overall_skips_single_point_models() {
    let records = load();
    let criteria = Criteria::all().with_metric("latency");

    let view = dashboard::variance_view(&records, &criteria, VarianceMetric::Std, Grouping::Overall);
    assert!(view.result.is_empty());
    assert!(view.series.is_empty());
}

#[test]
fn test_variance_daily_buckets() {
    let records = load();
    let criteria = Criteria::all()
        .with_model("openai/gpt-4")
        .with_metric("accuracy");

    let view = dashboard::variance_view(&records, &criteria, VarianceMetric::Range, Grouping::Daily);
    let gpt = view.result.get("openai/gpt-4").unwrap();

    // 2025-06-11 has a single point
    assert_eq!(gpt.values.len(), 2);
    assert_eq!(gpt.values[0].bucket, NaiveDate::from_ymd_opt(2025, 6, 9));
    assert!((gpt.values[0].value - 0.20).abs() < 1e-9);
    assert!(gpt.values.iter().all(|v| v.value >= 0.0));
}

#[test]
fn test_options_are_sorted_and_distinct() {
    let records = load();
    let options = dashboard::options(&records);
    assert_eq!(options.models, vec!["anthropic/claude", "openai/gpt-4"]);
    assert_eq!(options.scenarios, vec!["gsm8k", "mmlu"]);
    assert_eq!(options.metrics, vec!["accuracy", "latency"]);
    assert_eq!(options.providers, vec!["anthropic", "openai"]);
}

// ==========================================================================
// REPORTS
// ==========================================================================

#[test]
fn test_report_formats_from_extension() {
    let records = load();
    let view = dashboard::build(&records, &Criteria::all().with_metric("accuracy"), None);
    let dir = tempfile::tempdir().unwrap();

    for name in ["view.html", "view.json", "view.csv"] {
        let path = dir.path().join(name);
        benchdash::report::generate(&path, &view).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("openai/gpt-4"), "{} missing model", name);
    }

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("view.json")).unwrap()).unwrap();
    assert_eq!(json["records"].as_array().unwrap().len(), 7);
}
