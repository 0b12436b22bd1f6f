//! CSV export of the per-period rows of a [PlanReport].

use std::fs::File;
use std::io::Write;
use std::path::Path;

use thiserror::Error;

use crate::report::PlanReport;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes a header plus one record per period.
pub fn write_report_csv<W: Write>(report: &PlanReport, writer: W) -> Result<(), ExportError> {
    let mut out = csv::Writer::from_writer(writer);
    for row in &report.periods {
        out.serialize(row)?;
    }
    out.flush()?;
    Ok(())
}

pub fn export_report_csv(report: &PlanReport, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_report_csv(report, file)
}
