//! Locating and reading the benchmark CSV
//!
//! The dashboard can be deployed two ways: with the CSV copied next to it,
//! or run from a checkout where the extractor writes into `results/`. The
//! loader tries each candidate in order and the first readable file wins.
//! There is no retry.

use crate::error::{Error, Result};
use crate::normalize;
use crate::record::Record;
use std::path::{Path, PathBuf};

/// File name the extractor writes
pub const CSV_FILE_NAME: &str = "benchmark_summary.csv";

/// Subdirectory used when running from a checkout
pub const RESULTS_DIR: &str = "results";

/// Raw CSV text and where it came from
#[derive(Debug, Clone)]
pub struct Loaded {
    pub text: String,
    pub source: PathBuf,
}

/// Parsed records, the text they were parsed from, and where it came from
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<Record>,
    /// The CSV exactly as read, so raw and parsed views stay in step
    pub text: String,
    pub source: PathBuf,
    pub loaded_at: chrono::DateTime<chrono::Local>,
}

#[derive(Debug, Clone)]
pub struct Loader {
    candidates: Vec<PathBuf>,
}

impl Loader {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    /// `<root>/benchmark_summary.csv`, then `<root>/results/benchmark_summary.csv`
    pub fn for_root<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        Self::new(vec![
            root.join(CSV_FILE_NAME),
            root.join(RESULTS_DIR).join(CSV_FILE_NAME),
        ])
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Read the first candidate that can be read
    pub fn load_text(&self) -> Result<Loaded> {
        for path in &self.candidates {
            match std::fs::read_to_string(path) {
                Ok(text) => {
                    tracing::info!(source = %path.display(), bytes = text.len(), "loaded benchmark CSV");
                    return Ok(Loaded {
                        text,
                        source: path.clone(),
                    });
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "CSV candidate unavailable");
                }
            }
        }

        Err(Error::NotFound {
            tried: self.candidates.clone(),
        })
    }

    /// Read and normalize in one step
    pub fn load(&self) -> Result<Dataset> {
        let loaded = self.load_text()?;
        let records = normalize::parse(&loaded.text)?;
        Ok(Dataset {
            records,
            text: loaded.text,
            source: loaded.source,
            loaded_at: chrono::Local::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_root_order() {
        let loader = Loader::for_root("/srv/dash");
        assert_eq!(
            loader.candidates(),
            &[
                PathBuf::from("/srv/dash/benchmark_summary.csv"),
                PathBuf::from("/srv/dash/results/benchmark_summary.csv"),
            ]
        );
    }

    #[test]
    fn test_primary_location_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(RESULTS_DIR)).unwrap();
        std::fs::write(dir.path().join(CSV_FILE_NAME), "model\nprimary\n").unwrap();
        std::fs::write(
            dir.path().join(RESULTS_DIR).join(CSV_FILE_NAME),
            "model\nfallback\n",
        )
        .unwrap();

        let loaded = Loader::for_root(dir.path()).load_text().unwrap();
        assert!(loaded.text.contains("primary"));
        assert_eq!(loaded.source, dir.path().join(CSV_FILE_NAME));
    }

    #[test]
    fn test_falls_back_to_results() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(RESULTS_DIR)).unwrap();
        std::fs::write(
            dir.path().join(RESULTS_DIR).join(CSV_FILE_NAME),
            "model,mean\nfallback,0.5\n",
        )
        .unwrap();

        let dataset = Loader::for_root(dir.path()).load().unwrap();
        assert_eq!(dataset.records.len(), 1);
        assert_eq!(dataset.records[0].model, "fallback");
        assert_eq!(dataset.text, "model,mean\nfallback,0.5\n");
        assert_eq!(dataset.source, dir.path().join(RESULTS_DIR).join(CSV_FILE_NAME));
    }

    #[test]
    fn test_both_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = Loader::for_root(dir.path()).load().unwrap_err();
        match err {
            Error::NotFound { tried } => assert_eq!(tried.len(), 2),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }
}
