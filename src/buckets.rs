//! Time bucketing
//!
//! Pure functions of a timestamp or date. Day-of-week numbering starts at
//! Sunday = 0 everywhere in the crate; week buckets for variance start on
//! Monday.

use crate::record::Record;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Fractional hour of the day, in [0, 24)
pub fn hour_of_day(ts: &NaiveDateTime) -> f64 {
    ts.hour() as f64 + ts.minute() as f64 / 60.0 + ts.second() as f64 / 3600.0
}

/// Day of week (Sunday = 0) plus the fraction of the day, in [0, 7)
pub fn week_position(ts: &NaiveDateTime) -> f64 {
    ts.weekday().num_days_from_sunday() as f64 + hour_of_day(ts) / 24.0
}

/// Monday on or before the given date
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Calendar day a record belongs to: its run date, else its timestamp's date
pub fn day_bucket(record: &Record) -> Option<NaiveDate> {
    record.run_date.or_else(|| record.run_timestamp.map(|ts| ts.date()))
}

/// Which scatter projection to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScatterBucket {
    /// x = hour of day
    #[default]
    Daily,
    /// x = day of week + hour fraction
    Weekly,
}

impl ScatterBucket {
    pub fn position(&self, ts: &NaiveDateTime) -> f64 {
        match self {
            ScatterBucket::Daily => hour_of_day(ts),
            ScatterBucket::Weekly => week_position(ts),
        }
    }
}

impl std::str::FromStr for ScatterBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(ScatterBucket::Daily),
            "weekly" | "week" => Ok(ScatterBucket::Weekly),
            other => Err(format!("unknown scatter bucket '{}' (daily, weekly)", other)),
        }
    }
}

/// A record placed on the scatter axis
#[derive(Debug, Clone, Copy)]
pub struct Bucketed<'a> {
    pub record: &'a Record,
    pub position: f64,
    pub value: f64,
}

/// Records with a timestamp and a numeric mean, placed by the bucket
///
/// Records missing either are skipped.
pub fn bucket_records(records: &[Record], bucket: ScatterBucket) -> Vec<Bucketed<'_>> {
    records
        .iter()
        .filter_map(|r| {
            let ts = r.run_timestamp?;
            let value = r.mean()?;
            Some(Bucketed {
                record: r,
                position: bucket.position(&ts),
                value,
            })
        })
        .collect()
}
