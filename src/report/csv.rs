//! CSV output in the same column layout the normalizer reads

use crate::error::Result;
use crate::record::{Record, StatField};
use std::io::Write;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const IDENTITY_COLUMNS: [&str; 7] = [
    "model",
    "scenario_class",
    "metric_name",
    "split",
    "run_id",
    "run_timestamp",
    "run_date",
];

const AVERAGE_COLUMNS: [&str; 2] = ["scenario_count", "scenarios"];

fn number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn write<W: Write>(writer: &mut W, records: &[Record]) -> Result<()> {
    let mut out = ::csv::Writer::from_writer(writer);

    let header: Vec<&str> = IDENTITY_COLUMNS
        .iter()
        .copied()
        .chain(StatField::ALL.iter().map(|f| f.column()))
        .chain(AVERAGE_COLUMNS.iter().copied())
        .collect();
    out.write_record(&header)?;

    for r in records {
        let mut row: Vec<String> = vec![
            r.model.clone(),
            r.scenario_class.clone(),
            r.metric_name.clone(),
            r.split.clone(),
            r.run_id.clone().unwrap_or_default(),
            r.run_timestamp
                .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
                .unwrap_or_default(),
            r.run_date.map(|d| d.to_string()).unwrap_or_default(),
        ];
        row.extend(StatField::ALL.iter().map(|f| number(r.stat(*f))));
        match &r.average {
            Some(info) => {
                row.push(info.scenario_count.to_string());
                row.push(info.scenarios.clone());
            }
            None => {
                row.push(String::new());
                row.push(String::new());
            }
        }
        out.write_record(&row)?;
    }

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::average::average;
    use crate::normalize;

    const INPUT: &str = "\
model,scenario_class,name,split,run,run_timestamp,run_date,count,mean,std,p99
openai/gpt-4,mmlu,acc,test,r1,2025-06-08 11:22:20,2025-06-08,10,0.7,0.458257569495584,1
openai/gpt-4,gsm,acc,test,r1,2025-06-08 11:22:20,2025-06-08,,0.1234567890123,,
local,\"with, comma\",acc,,r2,,,3,,,
";

    // ==========================================================================
    // ROUND TRIP THROUGH THE NORMALIZER
    // ==========================================================================
    //
    // A CSV report is valid benchmark input: parsing what we wrote gives back
    // the same records, bit for bit on every statistic.
    // ==========================================================================

    #[test]
    fn test_report_reparses_to_same_records() {
        let records = normalize::parse(INPUT).unwrap();
        let mut buf = Vec::new();
        write(&mut buf, &records).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let again = normalize::parse(&text).unwrap();
        assert_eq!(records, again);
        for (a, b) in records.iter().zip(&again) {
            for field in StatField::ALL {
                assert_eq!(a.stat(field).map(f64::to_bits), b.stat(field).map(f64::to_bits));
            }
        }
    }

    #[test]
    fn test_average_columns_written() {
        let records = normalize::parse(INPUT).unwrap();
        let averaged = average(&records[..2]);
        let mut buf = Vec::new();
        write(&mut buf, &averaged).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Average (2 scenarios)"));
        assert!(text.contains("combined"));
        assert!(text.contains("\"mmlu, gsm\""));
    }

    #[test]
    fn test_header_only_for_empty() {
        let mut buf = Vec::new();
        write(&mut buf, &[]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("model,scenario_class,metric_name"));
    }
}
