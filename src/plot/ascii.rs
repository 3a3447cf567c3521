//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual checks in a terminal or a CI log
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed points: one letter per series (`o` Promedio, `c` Crédito, ...)
//! - forward-filled points: `.`
//! - series lines: `-`
//!
//! The x-axis is the label index, like a category axis: business days are
//! evenly spaced regardless of weekends and holidays.

use crate::domain::{ChartData, SeriesName};
use crate::report::format_record_count;

/// Marker for observed points of a series.
pub fn series_marker(name: SeriesName) -> char {
    match name {
        SeriesName::Promedio => 'o',
        SeriesName::Credito => 'c',
        SeriesName::Interbank => 'i',
        SeriesName::Bbva => 'b',
        SeriesName::Scotiabank => 's',
    }
}

const FILLED_MARKER: char = '.';

/// Render chart data as a fixed-size character grid with a header and legend.
pub fn render_ascii_chart(chart: &ChartData, width: usize, height: usize) -> String {
    if chart.is_empty() {
        return format!("Plot: no rows in range\n{}\n", format_record_count(0));
    }

    let width = width.max(10);
    let height = height.max(5);
    let n = chart.len();

    let (y_min, y_max) = chart
        .y_range()
        .map(|(min, max)| pad_range(min, max, 0.05))
        .unwrap_or((0.0, 1.0));

    let mut grid = vec![vec![' '; width]; height];

    // Lines first so markers overlay them.
    for series in &chart.series {
        let mut prev = None;
        for (idx, y, _) in series.points() {
            let x = map_x(idx, n, width);
            let yy = map_y(y, y_min, y_max, height);
            if let Some((x0, y0)) = prev {
                draw_line(&mut grid, x0, y0, x, yy, '-');
            } else if grid[yy][x] == ' ' {
                grid[yy][x] = '-';
            }
            prev = Some((x, yy));
        }
    }

    // Filled markers before observed ones: an observation always wins a shared cell.
    for original_pass in [false, true] {
        for series in &chart.series {
            for (idx, y, original) in series.points() {
                if original != original_pass {
                    continue;
                }
                let ch = if original { series_marker(series.name) } else { FILLED_MARKER };
                grid[map_y(y, y_min, y_max, height)][map_x(idx, n, width)] = ch;
            }
        }
    }

    let first = &chart.labels[0];
    let last = &chart.labels[n - 1];

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: dates=[{first}, {last}] | y=[{y_min:.2}, {y_max:.2}]%\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    let mut legend: Vec<String> = chart
        .series
        .iter()
        .map(|s| format!("{} {}", series_marker(s.name), s.name.display_name()))
        .collect();
    legend.push(format!("{FILLED_MARKER} forward-filled"));
    out.push_str(&legend.join("  "));
    out.push('\n');
    out.push_str(&format_record_count(n));
    out.push('\n');

    out
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    // A flat series still needs some vertical room.
    let pad = if span > 0.0 { span * frac } else { 0.5 };
    (min - pad, max + pad)
}

fn map_x(idx: usize, n: usize, width: usize) -> usize {
    if n < 2 {
        return 0;
    }
    let width = width.max(2);
    let u = (idx as f64 / (n as f64 - 1.0)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SeriesData;

    #[test]
    fn plot_golden_snapshot_small() {
        let chart = ChartData {
            labels: vec![
                "2024-01-01".to_string(),
                "2024-01-02".to_string(),
                "2024-01-03".to_string(),
            ],
            series: vec![SeriesData {
                name: SeriesName::Promedio,
                filled: vec![Some(1.0), Some(1.0), Some(3.0)],
                is_original: vec![true, false, true],
            }],
        };

        let txt = render_ascii_chart(&chart, 10, 5);
        let expected = concat!(
            "Plot: dates=[2024-01-01, 2024-01-03] | y=[0.90, 3.10]%\n",
            "         o\n",
            "        - \n",
            "       -  \n",
            "      -   \n",
            "o----.    \n",
            "o Promedio  . forward-filled\n",
            "Registros mostrados: 3\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_chart_renders_placeholder() {
        let txt = render_ascii_chart(&ChartData::default(), 40, 10);
        assert_eq!(txt, "Plot: no rows in range\nRegistros mostrados: 0\n");
    }

    #[test]
    fn single_row_and_all_absent_values_do_not_panic() {
        let chart = ChartData {
            labels: vec!["2024-01-01".to_string()],
            series: vec![SeriesData {
                name: SeriesName::Bbva,
                filled: vec![None],
                is_original: vec![false],
            }],
        };
        let txt = render_ascii_chart(&chart, 12, 6);
        assert!(txt.starts_with("Plot: dates=[2024-01-01, 2024-01-01] | y=[0.00, 1.00]%\n"));
        assert!(txt.contains("b BBVA"));
    }

    #[test]
    fn flat_series_is_centered() {
        let chart = ChartData {
            labels: vec!["a".to_string(), "b".to_string()],
            series: vec![SeriesData {
                name: SeriesName::Interbank,
                filled: vec![Some(7.0), Some(7.0)],
                is_original: vec![true, true],
            }],
        };
        let txt = render_ascii_chart(&chart, 10, 5);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[3], "i--------i");
    }
}
