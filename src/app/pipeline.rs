//! The CSV-to-series pipeline shared by every front end.
//!
//! text -> parse -> typed rows (dates normalized) -> stable sort -> range filter
//! -> forward-fill per active series -> chart data
//!
//! Every stage is a pure function of its inputs, so the TUI can rerun filter +
//! assemble on each keypress and the CLI commands can reuse the exact same
//! steps.

use tracing::{debug, warn};

use crate::domain::{ChartData, DateRange, FilledSeries, RateRow, SeriesData, SeriesName, to_iso};
use crate::io::csv_text::{RawRecord, parse_csv};

/// Column holding the SBS date.
pub const DATE_COLUMN: &str = "fecha_sbs";

/// Parse the export text into typed rows sorted by ISO date.
///
/// No row is dropped: a row with a missing or malformed date keeps an empty
/// `fecha_iso`, sorts first, and never falls inside a bounded range.
pub fn load_rows(text: &str) -> Vec<RateRow> {
    let mut rows: Vec<RateRow> = parse_csv(text)
        .iter()
        .enumerate()
        .map(|(idx, record)| build_row(idx + 1, record))
        .collect();
    sort_rows(&mut rows);
    debug!(rows = rows.len(), "built rate rows");
    rows
}

/// Stable ascending sort on `fecha_iso`; equal dates keep their input order.
pub fn sort_rows(rows: &mut [RateRow]) {
    rows.sort_by(|a, b| a.fecha_iso.cmp(&b.fecha_iso));
}

fn build_row(record_no: usize, record: &RawRecord) -> RateRow {
    let fecha_sbs = record.get(DATE_COLUMN).unwrap_or_default().to_string();
    let fecha_iso = match to_iso(&fecha_sbs) {
        Ok(iso) => iso,
        Err(e) => {
            warn!(record = record_no, error = %e, "row kept without ISO date");
            String::new()
        }
    };
    let rates = SeriesName::ALL.map(|name| parse_rate(record.get(name.display_name())));
    RateRow {
        fecha_sbs,
        fecha_iso,
        rates,
    }
}

/// Coerce a raw cell to a rate.
///
/// The cell is trimmed first. Absent, blank or whitespace-only, unparsable,
/// and non-finite (`inf`, `Infinity`, `NaN`) cells are all missing.
pub fn parse_rate(raw: Option<&str>) -> Option<f64> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// Rows with `from <= fecha_iso <= to`.
///
/// `rows` must be sorted (as returned by [`load_rows`]), which makes the match
/// a contiguous sub-slice. An unset bound returns `rows` unchanged; `from > to`
/// returns an empty slice.
pub fn filter_range<'a>(rows: &'a [RateRow], range: &DateRange) -> &'a [RateRow] {
    if !range.is_bounded() {
        return rows;
    }
    let start = rows.partition_point(|r| r.fecha_iso.as_str() < range.from.as_str());
    let end = rows.partition_point(|r| r.fecha_iso.as_str() <= range.to.as_str());
    if start >= end {
        return &rows[..0];
    }
    &rows[start..end]
}

/// Carry the last observed value over missing positions.
///
/// Missing means `None` or a non-finite number. Leading gaps stay `None`
/// (there is no backward fill) and are flagged as not original.
pub fn forward_fill<I>(values: I) -> FilledSeries
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut last = None;
    let mut out = FilledSeries::default();
    for value in values {
        match value.filter(|v| v.is_finite()) {
            Some(v) => {
                last = Some(v);
                out.filled.push(Some(v));
                out.is_original.push(true);
            }
            None => {
                out.filled.push(last);
                out.is_original.push(false);
            }
        }
    }
    out
}

/// Build chart data for `active` (in the given order) over `rows`.
///
/// An empty `active` yields no series; keeping the selection non-empty is the
/// job of [`crate::domain::ActiveSeries`].
pub fn assemble(rows: &[RateRow], active: &[SeriesName]) -> ChartData {
    let labels = rows.iter().map(|r| r.fecha_iso.clone()).collect();
    let series = active
        .iter()
        .map(|&name| {
            let FilledSeries { filled, is_original } = forward_fill(rows.iter().map(|r| r.rate(name)));
            SeriesData {
                name,
                filled,
                is_original,
            }
        })
        .collect();
    ChartData { labels, series }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(iso: &str) -> RateRow {
        RateRow {
            fecha_sbs: String::new(),
            fecha_iso: iso.to_string(),
            rates: [None; SeriesName::COUNT],
        }
    }

    fn dates(rows: &[RateRow]) -> Vec<&str> {
        rows.iter().map(|r| r.fecha_iso.as_str()).collect()
    }

    fn january() -> Vec<RateRow> {
        (1..=5).map(|d| row(&format!("2024-01-0{d}"))).collect()
    }

    #[test]
    fn load_rows_sorts_chronologically() {
        let text = "fecha_sbs,Promedio\n05/01/2024,7.5\n01/01/2024,7.1\n03/01/2024,7.3\n";
        let rows = load_rows(text);
        assert_eq!(dates(&rows), vec!["2024-01-01", "2024-01-03", "2024-01-05"]);
        assert_eq!(rows[0].fecha_sbs, "01/01/2024");
        assert_eq!(rows[0].rate(SeriesName::Promedio), Some(7.1));
    }

    #[test]
    fn load_rows_sort_is_stable() {
        let text = "fecha_sbs,BBVA\n02/01/2024,1\n01/01/2024,2\n02/01/2024,3\n";
        let rows = load_rows(text);
        let bbva: Vec<_> = rows.iter().map(|r| r.rate(SeriesName::Bbva)).collect();
        assert_eq!(bbva, vec![Some(2.0), Some(1.0), Some(3.0)]);
    }

    #[test]
    fn load_rows_types_every_series_column() {
        let text = "fecha_sbs,Promedio,Crédito,Interbank,BBVA,Scotiabank\r\n\
                    02/01/2024,7.1,,abc,NaN,6.9\r\n\
                    03/01/2024,7.2\r\n";
        let rows = load_rows(text);
        assert_eq!(
            rows[0].rates,
            [Some(7.1), None, None, None, Some(6.9)]
        );
        assert_eq!(rows[1].rates, [Some(7.2), None, None, None, None]);
    }

    #[test]
    fn malformed_dates_are_kept_and_sort_first() {
        let text = "fecha_sbs,Promedio\n02/01/2024,7.1\n2024-01-01,7.0\n,6.9\n";
        let rows = load_rows(text);
        assert_eq!(rows.len(), 3);
        assert_eq!(dates(&rows), vec!["", "", "2024-01-02"]);
        assert_eq!(rows[0].fecha_sbs, "2024-01-01");

        let range = DateRange::new("2000-01-01", "2099-12-31");
        assert_eq!(dates(filter_range(&rows, &range)), vec!["2024-01-02"]);
    }

    #[test]
    fn blank_interior_line_becomes_dateless_row() {
        let rows = load_rows("fecha_sbs,Promedio\n01/01/2024,7.0\n\n02/01/2024,7.1\n");
        assert_eq!(rows.len(), 3);
        assert_eq!(dates(&rows), vec!["", "2024-01-01", "2024-01-02"]);
        assert_eq!(rows[0].fecha_sbs, "");
        assert_eq!(rows[0].rate(SeriesName::Promedio), None);

        let full = DateRange::full_span(&rows);
        assert_eq!(full, DateRange::new("", "2024-01-02"));
    }

    #[test]
    fn load_rows_on_header_only_is_empty() {
        assert!(load_rows("fecha_sbs,Promedio\n").is_empty());
        assert!(load_rows("").is_empty());
    }

    #[test]
    fn parse_rate_treats_junk_as_missing() {
        assert_eq!(parse_rate(Some(" 7.25 ")), Some(7.25));
        assert_eq!(parse_rate(Some("")), None);
        assert_eq!(parse_rate(Some("n/a")), None);
        assert_eq!(parse_rate(Some("inf")), None);
        assert_eq!(parse_rate(Some("Infinity")), None);
        assert_eq!(parse_rate(Some("NaN")), None);
        assert_eq!(parse_rate(Some("   ")), None);
        assert_eq!(parse_rate(None), None);
    }

    #[test]
    fn filter_range_is_inclusive() {
        let rows = january();
        let range = DateRange::new("2024-01-02", "2024-01-04");
        assert_eq!(
            dates(filter_range(&rows, &range)),
            vec!["2024-01-02", "2024-01-03", "2024-01-04"]
        );
    }

    #[test]
    fn filter_range_passes_through_unset_bounds() {
        let rows = january();
        assert_eq!(filter_range(&rows, &DateRange::default()).len(), 5);
        assert_eq!(filter_range(&rows, &DateRange::new("2024-01-03", "")).len(), 5);
        assert_eq!(filter_range(&rows, &DateRange::new("", "2024-01-03")).len(), 5);
    }

    #[test]
    fn filter_range_empty_cases() {
        let rows = january();
        assert!(filter_range(&rows, &DateRange::new("2024-01-04", "2024-01-02")).is_empty());
        assert!(filter_range(&rows, &DateRange::new("2025-01-01", "2025-12-31")).is_empty());
        assert!(filter_range(&[], &DateRange::new("2024-01-01", "2024-01-05")).is_empty());
    }

    #[test]
    fn filter_range_with_bounds_between_rows() {
        let rows = vec![row("2024-01-01"), row("2024-01-05"), row("2024-01-09")];
        let range = DateRange::new("2024-01-02", "2024-01-08");
        assert_eq!(dates(filter_range(&rows, &range)), vec!["2024-01-05"]);
    }

    #[test]
    fn forward_fill_carries_last_value() {
        let out = forward_fill([Some(1.0), None, None, Some(2.0), None]);
        assert_eq!(out.filled, vec![Some(1.0), Some(1.0), Some(1.0), Some(2.0), Some(2.0)]);
        assert_eq!(out.is_original, vec![true, false, false, true, false]);
    }

    #[test]
    fn forward_fill_leaves_leading_gap() {
        let out = forward_fill([None, None, Some(3.0)]);
        assert_eq!(out.filled, vec![None, None, Some(3.0)]);
        assert_eq!(out.is_original, vec![false, false, true]);
    }

    #[test]
    fn forward_fill_treats_nan_as_missing() {
        let out = forward_fill([Some(4.0), Some(f64::NAN)]);
        assert_eq!(out.filled, vec![Some(4.0), Some(4.0)]);
        assert_eq!(out.is_original, vec![true, false]);
        assert_eq!(forward_fill(std::iter::empty()), FilledSeries::default());
    }

    #[test]
    fn assemble_fills_each_series_independently() {
        let text = "fecha_sbs,Promedio,BBVA\n\
                    01/01/2024,7.0,\n\
                    02/01/2024,,8.0\n\
                    03/01/2024,7.2,\n";
        let rows = load_rows(text);
        let chart = assemble(&rows, &[SeriesName::Bbva, SeriesName::Promedio]);

        assert_eq!(chart.labels, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(chart.series.len(), 2);

        let bbva = &chart.series[0];
        assert_eq!(bbva.name, SeriesName::Bbva);
        assert_eq!(bbva.filled, vec![None, Some(8.0), Some(8.0)]);
        assert_eq!(bbva.is_original, vec![false, true, false]);

        let promedio = &chart.series[1];
        assert_eq!(promedio.filled, vec![Some(7.0), Some(7.0), Some(7.2)]);
        assert_eq!(promedio.is_original, vec![true, false, true]);
    }

    #[test]
    fn assemble_fill_restarts_inside_range() {
        let text = "fecha_sbs,Promedio\n01/01/2024,7.0\n02/01/2024,\n03/01/2024,7.2\n";
        let rows = load_rows(text);
        let visible = filter_range(&rows, &DateRange::new("2024-01-02", "2024-01-03"));
        let chart = assemble(visible, &[SeriesName::Promedio]);
        assert_eq!(chart.series[0].filled, vec![None, Some(7.2)]);
        assert_eq!(chart.series[0].is_original, vec![false, true]);
    }

    #[test]
    fn assemble_is_idempotent_and_handles_empty_selection() {
        let rows = load_rows("fecha_sbs,Promedio\n01/01/2024,7.0\n02/01/2024,\n");
        let active = [SeriesName::Promedio, SeriesName::Scotiabank];
        assert_eq!(assemble(&rows, &active), assemble(&rows, &active));

        let empty = assemble(&rows, &[]);
        assert_eq!(empty.labels.len(), 2);
        assert!(empty.series.is_empty());
    }
}
