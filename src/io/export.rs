//! Export assembled chart data to JSON or CSV.
//!
//! The export is meant to be easy to consume in spreadsheets, notebooks, or a
//! browser chart: labels plus one value column and one provenance column per
//! series.

use std::fs::File;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::domain::{ChartData, DateRange, ExportFormat};
use crate::error::AppError;

/// JSON document written by `sbs export --format json`.
#[derive(Debug, Serialize)]
pub struct ChartExport<'a> {
    pub tool: &'static str,
    pub source: &'a str,
    pub range: &'a DateRange,
    #[serde(flatten)]
    pub chart: &'a ChartData,
}

/// Write chart data in the requested format.
pub fn write_chart(
    path: &Path,
    format: ExportFormat,
    chart: &ChartData,
    range: &DateRange,
    source: &str,
) -> Result<(), AppError> {
    match format {
        ExportFormat::Json => write_chart_json(path, chart, range, source)?,
        ExportFormat::Csv => write_chart_csv(path, chart)?,
    }
    info!(path = %path.display(), ?format, rows = chart.len(), "exported chart data");
    Ok(())
}

/// Write a chart JSON file.
pub fn write_chart_json(path: &Path, chart: &ChartData, range: &DateRange, source: &str) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create export JSON '{}': {e}", path.display())))?;

    let doc = ChartExport {
        tool: "sbs",
        source,
        range,
        chart,
    };

    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::input(format!("Failed to write export JSON: {e}")))?;

    Ok(())
}

/// Write a chart CSV file: `fecha_iso`, then `<name>,<name>_original` per series.
///
/// Absent values are written as empty cells.
pub fn write_chart_csv(path: &Path, chart: &ChartData) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::input(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    let mut header = vec!["fecha_iso".to_string()];
    for s in &chart.series {
        header.push(s.name.display_name().to_string());
        header.push(format!("{}_original", s.name.display_name()));
    }
    writer
        .write_record(&header)
        .map_err(|e| AppError::input(format!("Failed to write export CSV header: {e}")))?;

    for (idx, label) in chart.labels.iter().enumerate() {
        let mut record = vec![label.clone()];
        for s in &chart.series {
            record.push(s.filled[idx].map(|v| v.to_string()).unwrap_or_default());
            record.push(s.is_original[idx].to_string());
        }
        writer
            .write_record(&record)
            .map_err(|e| AppError::input(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
