//! Ratatui-based terminal UI.
//!
//! The TUI shows the rate chart next to a settings panel for the date range
//! (`Desde`/`Hasta`) and one checkbox per series. Every change dispatches an
//! action to the view-state reducer and re-assembles the chart.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::state::{Action, ViewState, reduce};
use crate::domain::{ChartData, SeriesName, ViewConfig, parse_iso_date};
use crate::error::AppError;
use crate::report::{format_point_label, format_record_count};

mod plotters_chart;

use plotters_chart::{RatesPlottersChart, SeriesLayer, label_at, series_rgb};

/// Settings rows: the two range bounds, then one row per series.
const FIELD_COUNT: usize = 2 + SeriesName::COUNT;

/// Start the TUI with an already-loaded view.
pub fn run(config: ViewConfig, state: ViewState) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, state);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    From,
    To,
}

impl Bound {
    fn label(self) -> &'static str {
        match self {
            Bound::From => "Desde",
            Bound::To => "Hasta",
        }
    }
}

fn field_bound(field: usize) -> Option<Bound> {
    match field {
        0 => Some(Bound::From),
        1 => Some(Bound::To),
        _ => None,
    }
}

fn field_series(field: usize) -> Option<SeriesName> {
    field.checked_sub(2).and_then(|i| SeriesName::ALL.get(i).copied())
}

struct App {
    config: ViewConfig,
    state: ViewState,
    chart: ChartData,
    selected_field: usize,
    editing: Option<Bound>,
    date_input: String,
    status: String,
}

impl App {
    fn new(config: ViewConfig, state: ViewState) -> Self {
        let status = match &state.load_error {
            Some(err) => format!("Load failed: {err}"),
            None => format!("Loaded {} rows.", state.rows.len()),
        };
        let chart = state.chart();
        Self {
            config,
            state,
            chart,
            selected_field: 0,
            editing: None,
            date_input: String::new(),
            status,
        }
    }

    fn dispatch(&mut self, action: Action) {
        self.state = reduce(&self.state, action);
        self.chart = self.state.chart();
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if let Some(bound) = self.editing {
            self.handle_date_edit(bound, code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field + 1 < FIELD_COUNT {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.step_bound(-1),
            KeyCode::Right => self.step_bound(1),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(bound) = field_bound(self.selected_field) {
                    if code == KeyCode::Enter {
                        self.editing = Some(bound);
                        self.date_input = self.bound_value(bound).to_string();
                        self.status = format!(
                            "Editing {} (YYYY-MM-DD, empty = no limit). Enter to apply, Esc to cancel.",
                            bound.label()
                        );
                    }
                } else if let Some(name) = field_series(self.selected_field) {
                    self.toggle_series(name);
                }
            }
            KeyCode::Char('a') => {
                self.dispatch(Action::ResetRange);
                self.status = "Range reset to all rows.".to_string();
            }
            _ => {}
        }

        false
    }

    fn handle_date_edit(&mut self, bound: Bound, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing = None;
                self.apply_date_input(bound);
            }
            KeyCode::Backspace => {
                self.date_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '-' {
                    self.date_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn apply_date_input(&mut self, bound: Bound) {
        let trimmed = self.date_input.trim();
        let value = if trimmed.is_empty() {
            String::new()
        } else {
            match parse_iso_date(trimmed) {
                Some(dt) => dt.format("%Y-%m-%d").to_string(),
                None => {
                    self.status = format!("Invalid date '{trimmed}'.");
                    return;
                }
            }
        };
        self.set_bound(bound, value);
    }

    fn set_bound(&mut self, bound: Bound, value: String) {
        self.status = if value.is_empty() {
            format!("{} cleared: showing all rows.", bound.label())
        } else {
            format!("{}: {value}", bound.label())
        };
        match bound {
            Bound::From => self.dispatch(Action::SetFrom(value)),
            Bound::To => self.dispatch(Action::SetTo(value)),
        }
    }

    fn bound_value(&self, bound: Bound) -> &str {
        match bound {
            Bound::From => &self.state.range.from,
            Bound::To => &self.state.range.to,
        }
    }

    /// Move the selected bound to the previous/next loaded date.
    fn step_bound(&mut self, delta: isize) {
        let Some(bound) = field_bound(self.selected_field) else {
            return;
        };
        let rows = &self.state.rows;
        // Rows without a usable date sort first; never step onto them.
        let dated = &rows[rows.partition_point(|r| r.fecha_iso.is_empty())..];
        if dated.is_empty() {
            return;
        }

        let current = self.bound_value(bound);
        let idx = match bound {
            Bound::From => dated.partition_point(|r| r.fecha_iso.as_str() < current),
            Bound::To => dated
                .partition_point(|r| r.fecha_iso.as_str() <= current)
                .saturating_sub(1),
        };
        let next = (idx as isize + delta).clamp(0, dated.len() as isize - 1) as usize;
        let value = dated[next].fecha_iso.clone();
        self.set_bound(bound, value);
    }

    fn toggle_series(&mut self, name: SeriesName) {
        let was_only = self.state.active.len() == 1 && self.state.active.contains(name);
        self.dispatch(Action::ToggleSeries(name));
        self.status = if was_only {
            format!("{} kept: at least one series stays visible.", SeriesName::DEFAULT)
        } else if self.state.active.contains(name) {
            format!("{name} on")
        } else {
            format!("{name} off")
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("SBS – Créditos Hipotecarios", Style::default().fg(Color::Cyan)),
            Span::raw(format!("  ({})", self.config.source)),
        ]));

        let detail = match &self.state.load_error {
            Some(err) => Span::styled(format!("Load failed: {err}"), Style::default().fg(Color::Red)),
            None => Span::styled(
                format!(
                    "range: {} → {} | {} | last: {}",
                    display_bound(&self.state.range.from),
                    display_bound(&self.state.range.to),
                    format_record_count(self.chart.len()),
                    self.latest_values(),
                ),
                Style::default().fg(Color::Gray),
            ),
        };
        lines.push(Line::from(detail));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn latest_values(&self) -> String {
        let parts: Vec<String> = self
            .chart
            .series
            .iter()
            .map(|s| format_point_label(s.name, s.filled.last().copied().flatten()))
            .collect();
        if parts.is_empty() { "-".to_string() } else { parts.join(", ") }
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(26)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_settings(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Tasa (%)").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if self.chart.is_empty() {
            let msg = if self.state.load_error.is_some() {
                "No data loaded."
            } else {
                "No rows in the selected range."
            };
            let p = Paragraph::new(msg)
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(p, inner);
            return;
        }

        let (layers, x_bounds, y_bounds) = chart_layers(&self.chart);

        let (chart_rect, insets) = chart_layout(inner);
        let widget = RatesPlottersChart {
            layers: &layers,
            labels: &self.chart.labels,
            x_bounds,
            y_bounds,
            x_label: "fecha",
            y_label: "tasa (%)",
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, &self.chart.labels, x_bounds, y_bounds);
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items = Vec::with_capacity(FIELD_COUNT);
        for bound in [Bound::From, Bound::To] {
            let value = if self.editing == Some(bound) {
                format!("{}_", self.date_input)
            } else {
                display_bound(self.bound_value(bound)).to_string()
            };
            items.push(ListItem::new(format!("{}: {value}", bound.label())));
        }
        for name in SeriesName::ALL {
            let mark = if self.state.active.contains(name) { "[x]" } else { "[ ]" };
            let (r, g, b) = series_rgb(name);
            items.push(ListItem::new(Line::from(vec![
                Span::raw(format!("{mark} ")),
                Span::styled(name.display_name(), Style::default().fg(Color::Rgb(r, g, b))),
            ])));
        }

        let list = List::new(items)
            .block(Block::default().title("Filtros").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);

        if self.editing.is_some() {
            let hint = Paragraph::new("Editing date…")
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ step date  Enter edit/toggle  Space toggle  a all  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn display_bound(bound: &str) -> &str {
    if bound.is_empty() { "-" } else { bound }
}

/// Build Plotters layers and bounds from chart data.
fn chart_layers(chart: &ChartData) -> (Vec<SeriesLayer>, [f64; 2], [f64; 2]) {
    let x_max = (chart.len().saturating_sub(1)).max(1) as f64;
    let x_bounds = [0.0, x_max];

    let layers = chart
        .series
        .iter()
        .map(|s| {
            let mut layer = SeriesLayer {
                color: series_rgb(s.name),
                line: Vec::with_capacity(s.filled.len()),
                observed: Vec::new(),
                filled: Vec::new(),
            };
            for (idx, y, original) in s.points() {
                let p = (idx as f64, y);
                layer.line.push(p);
                if original {
                    layer.observed.push(p);
                } else {
                    layer.filled.push(p);
                }
            }
            layer
        })
        .collect();

    let (mut y_min, mut y_max) = chart.y_range().unwrap_or((0.0, 1.0));
    if y_max <= y_min {
        y_min -= 0.5;
        y_max += 0.5;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    let y_bounds = [y_min - pad, y_max + pad];

    (layers, x_bounds, y_bounds)
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 7,
        right: 6,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    labels: &[String],
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let style = Style::default().fg(Color::Gray);

    // ISO dates are 10 columns wide; fewer ticks on narrow terminals.
    let x_ticks = if chart.width >= 60 { 5usize } else { 3 };
    for i in 0..x_ticks {
        let u = i as f64 / (x_ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let label = label_at(labels, x_val);
        if label.is_empty() {
            continue;
        }
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label_len = label.chars().count() as u16;
        let start = x.saturating_sub(label_len / 2).max(inner.x);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 || start + label_len > inner.x + inner.width {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let y_ticks = 5usize;
    for i in 0..y_ticks {
        let u = i as f64 / (y_ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{y_val:.2}");
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("fecha")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("%").style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
