//! JSON report: the whole view plus when it was generated

use crate::dashboard::DashboardView;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct JsonReport<'a> {
    generated: String,
    #[serde(flatten)]
    view: &'a DashboardView,
}

pub fn write<W: Write>(writer: &mut W, view: &DashboardView) -> Result<()> {
    let report = JsonReport {
        generated: chrono::Local::now().to_rfc3339(),
        view,
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}
