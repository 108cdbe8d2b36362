//! Report generation for dashboard views
//!
//! This module writes a [`DashboardView`] in one of three formats:
//!
//! - **HTML**: Self-contained page with Plotly charts, summary cards and the data table
//! - **JSON**: The full view, machine-readable
//! - **CSV**: The selected records in the input column layout, so a report
//!   can be loaded back as benchmark data
//!
//! # Usage
//!
//! ```ignore
//! use benchdash::{dashboard, report, Criteria};
//!
//! let view = dashboard::build(&records, &Criteria::all(), None);
//!
//! // Automatically picks format based on extension
//! report::generate("report.html", &view)?;  // HTML
//! report::generate("report.json", &view)?;  // JSON
//! report::generate("report.csv", &view)?;   // CSV
//! ```

pub mod csv;
pub mod html;
pub mod json;

use crate::dashboard::DashboardView;
use crate::error::Result;
use std::path::Path;

/// Output formats, picked from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Html,
    Json,
    Csv,
}

impl Format {
    /// Anything that is not HTML or JSON is written as CSV
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "html" | "htm" => Format::Html,
            "json" => Format::Json,
            _ => Format::Csv,
        }
    }
}

/// Generate a report in the appropriate format based on file extension
pub fn generate<P: AsRef<Path>>(path: P, view: &DashboardView) -> Result<()> {
    let path = path.as_ref();
    let mut file = std::fs::File::create(path)?;

    match Format::from_path(path) {
        Format::Html => html::write(&mut file, view),
        Format::Json => json::write(&mut file, view),
        Format::Csv => csv::write(&mut file, &view.records),
    }?;

    tracing::info!(path = %path.display(), records = view.records.len(), "report written");
    Ok(())
}
