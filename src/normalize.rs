//! CSV text to typed records
//!
//! The normalizer is deliberately forgiving: a cell that cannot be parsed
//! becomes a missing value and the row is kept. Only input that cannot be
//! read as CSV at all (no header, invalid UTF-8) is an error.

use crate::error::Result;
use crate::record::{Record, StatField, Stats};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use csv::StringRecord;

const MODEL: &[&str] = &["model"];
const SCENARIO: &[&str] = &["scenario_class", "scenarioClass", "scenario"];
const METRIC: &[&str] = &["metric_name", "metricName"];
const METRIC_ALIAS: &[&str] = &["name"];
const SPLIT: &[&str] = &["split"];
const TIMESTAMP: &[&str] = &["run_timestamp", "runTimestamp", "timestamp"];
const DATE: &[&str] = &["run_date", "runDate"];
const RUN_ID: &[&str] = &["run_id", "runId"];
const RUN_ALIAS: &[&str] = &["run"];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Column positions resolved once from the header row
struct Columns {
    model: Option<usize>,
    scenario: Option<usize>,
    metric: Option<usize>,
    metric_alias: Option<usize>,
    split: Option<usize>,
    timestamp: Option<usize>,
    date: Option<usize>,
    run_id: Option<usize>,
    run_alias: Option<usize>,
    stats: Vec<(StatField, usize)>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Self {
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim())
            .collect();
        let find = |aliases: &[&str]| aliases.iter().find_map(|a| names.iter().position(|n| n == a));

        Self {
            model: find(MODEL),
            scenario: find(SCENARIO),
            metric: find(METRIC),
            metric_alias: find(METRIC_ALIAS),
            split: find(SPLIT),
            timestamp: find(TIMESTAMP),
            date: find(DATE),
            run_id: find(RUN_ID),
            run_alias: find(RUN_ALIAS),
            stats: StatField::ALL
                .iter()
                .filter_map(|f| find(&[f.column()]).map(|i| (*f, i)))
                .collect(),
        }
    }
}

fn cell<'a>(row: &'a StringRecord, index: Option<usize>) -> &'a str {
    index.and_then(|i| row.get(i)).unwrap_or("")
}

/// First non-empty cell among the given columns
fn first_present<'a>(row: &'a StringRecord, indices: &[Option<usize>]) -> Option<&'a str> {
    indices.iter().map(|i| cell(row, *i)).find(|v| !v.is_empty())
}

/// Parse CSV text into records, one per data row, in row order
pub fn parse(text: &str) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns = Columns::resolve(reader.headers()?);
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        records.push(normalize_row(&row, &columns));
    }

    tracing::debug!(rows = records.len(), "parsed benchmark CSV");
    Ok(records)
}

fn normalize_row(row: &StringRecord, columns: &Columns) -> Record {
    let mut stats = Stats::default();
    for (field, index) in &columns.stats {
        stats.set(*field, parse_number(cell(row, Some(*index))));
    }

    Record {
        model: cell(row, columns.model).to_string(),
        scenario_class: cell(row, columns.scenario).to_string(),
        metric_name: first_present(row, &[columns.metric, columns.metric_alias])
            .unwrap_or("")
            .to_string(),
        split: cell(row, columns.split).to_string(),
        run_timestamp: parse_timestamp(cell(row, columns.timestamp)),
        run_date: parse_date(cell(row, columns.date)),
        run_id: first_present(row, &[columns.run_id, columns.run_alias]).map(str::to_string),
        stats,
        average: None,
    }
}

/// Numeric coercion: empty, unparseable, NaN and infinite cells are all missing
pub fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a run timestamp; a bare date means midnight
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Parse a run date, accepting any timestamp form and keeping its date
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(raw).map(|ts| ts.date()))
}

/// Re-apply numeric coercion to already-normalized records
///
/// Normalized values are finite numbers or missing, so this is the identity
/// on parser output.
pub fn renormalize(records: &[Record]) -> Vec<Record> {
    records
        .iter()
        .map(|r| {
            let mut out = r.clone();
            for field in StatField::ALL {
                out.stats.set(field, r.stat(field).filter(|v| v.is_finite()));
            }
            out
        })
        .collect()
}
