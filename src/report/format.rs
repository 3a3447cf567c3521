//! Formatted terminal output.
//!
//! Formatting lives in one place so output changes stay localized and the
//! snapshot tests below catch accidental drift.

use crate::app::state::ViewState;
use crate::domain::SeriesName;
use crate::report::chart_stats;

/// Value label for one point: `"BBVA: 7.25%"`, or `"BBVA: sin dato"` when absent.
pub fn format_point_label(name: SeriesName, value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}: {v:.2}%", name.display_name()),
        None => format!("{}: sin dato", name.display_name()),
    }
}

/// Record count line shown under every chart.
pub fn format_record_count(shown: usize) -> String {
    format!("Registros mostrados: {shown}")
}

/// Text summary of the current view for `sbs summary`.
pub fn format_summary(state: &ViewState, source: &str) -> String {
    let chart = state.chart();
    let mut out = String::new();

    out.push_str("=== SBS – Créditos Hipotecarios ===\n");
    out.push_str(&format!("Source: {source}\n"));
    out.push_str(&format!("Rows loaded: {}\n", state.rows.len()));
    out.push_str(&format!(
        "Range: {} → {}\n",
        display_bound(&state.range.from),
        display_bound(&state.range.to)
    ));
    out.push_str(&format_record_count(chart.len()));
    out.push('\n');

    if let (Some(first), Some(last)) = (chart.labels.first(), chart.labels.last()) {
        out.push_str(&format!("Shown: {first} → {last}\n"));
    }

    out.push_str("\nSeries:\n");
    out.push_str(&format!(
        "{:<12} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}\n",
        "name", "observed", "filled", "absent", "min", "max", "last"
    ));
    for stats in chart_stats(&chart) {
        out.push_str(&format!(
            "{:<12} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}\n",
            stats.name.display_name(),
            stats.observed,
            stats.filled,
            stats.absent,
            fmt_opt(stats.min),
            fmt_opt(stats.max),
            fmt_opt(stats.last),
        ));
    }

    out
}

fn display_bound(bound: &str) -> &str {
    if bound.is_empty() { "-" } else { bound }
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.2}"),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::load_rows;
    use crate::app::state::{Action, reduce};
    use crate::domain::ActiveSeries;

    #[test]
    fn point_labels_match_tooltip_style() {
        assert_eq!(format_point_label(SeriesName::Credito, Some(7.456)), "Crédito: 7.46%");
        assert_eq!(format_point_label(SeriesName::Bbva, None), "BBVA: sin dato");
    }

    #[test]
    fn summary_snapshot() {
        let rows = load_rows("fecha_sbs,Promedio,BBVA\n01/01/2024,7.1,\n02/01/2024,,8\n");
        let state = ViewState::new(ActiveSeries::from_names([SeriesName::Promedio, SeriesName::Bbva]));
        let state = reduce(&state, Action::Loaded(rows));

        let expected = concat!(
            "=== SBS – Créditos Hipotecarios ===\n",
            "Source: test.csv\n",
            "Rows loaded: 2\n",
            "Range: 2024-01-01 → 2024-01-02\n",
            "Registros mostrados: 2\n",
            "Shown: 2024-01-01 → 2024-01-02\n",
            "\n",
            "Series:\n",
            "name         observed   filled   absent      min      max     last\n",
            "Promedio            1        1        0     7.10     7.10     7.10\n",
            "BBVA                1        0        1     8.00     8.00     8.00\n",
        );
        assert_eq!(format_summary(&state, "test.csv"), expected);
    }
}
