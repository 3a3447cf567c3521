//! Reporting utilities: per-series statistics and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{ChartData, SeriesData, SeriesName};

/// Coverage of one plotted series over the visible rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStats {
    pub name: SeriesName,
    /// Points actually present in the export.
    pub observed: usize,
    /// Points synthesized by forward-fill.
    pub filled: usize,
    /// Leading points with no value at all.
    pub absent: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub last: Option<f64>,
}

/// Compute stats for one series.
pub fn series_stats(series: &SeriesData) -> SeriesStats {
    let observed: Vec<f64> = series
        .points()
        .filter(|(_, _, original)| *original)
        .map(|(_, v, _)| v)
        .collect();

    SeriesStats {
        name: series.name,
        observed: series.observed_count(),
        filled: series.filled_count(),
        absent: series.filled.iter().filter(|v| v.is_none()).count(),
        min: observed.iter().copied().reduce(f64::min),
        max: observed.iter().copied().reduce(f64::max),
        last: series.last_value(),
    }
}

/// Stats for every series in the chart, in chart order.
pub fn chart_stats(chart: &ChartData) -> Vec<SeriesStats> {
    chart.series.iter().map(series_stats).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_split_observed_filled_absent() {
        let series = SeriesData {
            name: SeriesName::Scotiabank,
            filled: vec![None, Some(7.0), Some(7.0), Some(6.5)],
            is_original: vec![false, true, false, true],
        };
        let stats = series_stats(&series);
        assert_eq!(stats.observed, 2);
        assert_eq!(stats.filled, 1);
        assert_eq!(stats.absent, 1);
        assert_eq!(stats.min, Some(6.5));
        assert_eq!(stats.max, Some(7.0));
        assert_eq!(stats.last, Some(6.5));
    }
}
