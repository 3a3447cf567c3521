//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - threaded through the pure pipeline stages
//! - exported to JSON/CSV
//! - rendered by any front end (TUI, ASCII plot)

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One of the rate series published in the SBS mortgage export.
///
/// The order of [`SeriesName::ALL`] is the catalog order used for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
pub enum SeriesName {
    #[serde(rename = "Promedio")]
    Promedio,
    #[serde(rename = "Crédito")]
    Credito,
    #[serde(rename = "Interbank")]
    Interbank,
    #[serde(rename = "BBVA")]
    Bbva,
    #[serde(rename = "Scotiabank")]
    Scotiabank,
}

impl SeriesName {
    pub const COUNT: usize = 5;

    pub const ALL: [SeriesName; Self::COUNT] = [
        SeriesName::Promedio,
        SeriesName::Credito,
        SeriesName::Interbank,
        SeriesName::Bbva,
        SeriesName::Scotiabank,
    ];

    /// Series shown when nothing else is selected.
    pub const DEFAULT: SeriesName = SeriesName::Promedio;

    /// Column header in the CSV export (also the label shown to users).
    pub fn display_name(self) -> &'static str {
        match self {
            SeriesName::Promedio => "Promedio",
            SeriesName::Credito => "Crédito",
            SeriesName::Interbank => "Interbank",
            SeriesName::Bbva => "BBVA",
            SeriesName::Scotiabank => "Scotiabank",
        }
    }

    /// Position in catalog order.
    pub fn index(self) -> usize {
        self as usize
    }

    fn bit(self) -> u8 {
        1 << self.index()
    }
}

impl std::fmt::Display for SeriesName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The set of series currently plotted.
///
/// Stored as one bit per catalog entry. Iteration is always in catalog order,
/// so rendering order does not depend on the order of selection.
///
/// The set is never empty once built through [`ActiveSeries::from_names`] or
/// [`ActiveSeries::toggled`]: removing the last member re-adds
/// [`SeriesName::DEFAULT`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveSeries(u8);

impl ActiveSeries {
    /// Build a set from a list of names; duplicates collapse and an empty list
    /// falls back to the default series.
    pub fn from_names<I>(names: I) -> Self
    where
        I: IntoIterator<Item = SeriesName>,
    {
        let bits = names.into_iter().fold(0u8, |acc, name| acc | name.bit());
        if bits == 0 {
            Self::default()
        } else {
            Self(bits)
        }
    }

    /// Flip membership of `name`, keeping the set non-empty.
    pub fn toggled(self, name: SeriesName) -> Self {
        let next = self.0 ^ name.bit();
        if next == 0 {
            Self(SeriesName::DEFAULT.bit())
        } else {
            Self(next)
        }
    }

    pub fn contains(self, name: SeriesName) -> bool {
        self.0 & name.bit() != 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = SeriesName> {
        SeriesName::ALL.into_iter().filter(move |name| self.contains(*name))
    }

    pub fn names(self) -> Vec<SeriesName> {
        self.iter().collect()
    }
}

impl Default for ActiveSeries {
    fn default() -> Self {
        Self(SeriesName::DEFAULT.bit())
    }
}

impl std::fmt::Debug for ActiveSeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// One business day of the SBS export, with numeric fields already coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct RateRow {
    /// Date as written in the export (`DD/MM/YYYY`).
    pub fecha_sbs: String,
    /// Derived `YYYY-MM-DD`; empty when `fecha_sbs` is malformed.
    pub fecha_iso: String,
    /// Rate per series in catalog order; `None` when the cell is empty or not a number.
    pub rates: [Option<f64>; SeriesName::COUNT],
}

impl RateRow {
    pub fn rate(&self, name: SeriesName) -> Option<f64> {
        self.rates[name.index()]
    }
}

/// Inclusive window over ISO dates.
///
/// Either bound left empty means "no filtering". The bounds are compared as
/// strings, exactly like the row dates; `from > to` simply matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: String,
    pub to: String,
}

impl DateRange {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// The span covered by already-sorted rows (empty when there are none).
    pub fn full_span(rows: &[RateRow]) -> Self {
        match (rows.first(), rows.last()) {
            (Some(first), Some(last)) => Self::new(first.fecha_iso.clone(), last.fecha_iso.clone()),
            _ => Self::default(),
        }
    }

    /// Both bounds set; otherwise the filter passes rows through.
    pub fn is_bounded(&self) -> bool {
        !self.from.is_empty() && !self.to.is_empty()
    }
}

/// Forward-fill output for one series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilledSeries {
    pub filled: Vec<Option<f64>>,
    /// `true` where the value was observed, `false` where it was carried forward
    /// (or is still absent because nothing was observed yet).
    pub is_original: Vec<bool>,
}

/// One plotted series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesData {
    pub name: SeriesName,
    pub filled: Vec<Option<f64>>,
    pub is_original: Vec<bool>,
}

impl SeriesData {
    /// `(index, value, is_original)` for every label position that has a value.
    pub fn points(&self) -> impl Iterator<Item = (usize, f64, bool)> + '_ {
        self.filled
            .iter()
            .zip(self.is_original.iter())
            .enumerate()
            .filter_map(|(idx, (value, original))| value.map(|v| (idx, v, *original)))
    }

    pub fn observed_count(&self) -> usize {
        self.is_original.iter().filter(|o| **o).count()
    }

    /// Positions whose value was synthesized by forward-fill.
    pub fn filled_count(&self) -> usize {
        self.points().filter(|(_, _, original)| !original).count()
    }

    pub fn last_value(&self) -> Option<f64> {
        self.filled.iter().rev().find_map(|v| *v)
    }
}

/// Chart-ready output: one label per row plus one entry per active series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub series: Vec<SeriesData>,
}

impl ChartData {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Min/max over all plotted values, or `None` when nothing is plotted.
    pub fn y_range(&self) -> Option<(f64, f64)> {
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for (_, y, _) in self.series.iter().flat_map(|s| s.points()) {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        if min_y.is_finite() && max_y.is_finite() {
            Some((min_y, max_y))
        } else {
            None
        }
    }
}

/// Output format for `sbs export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

/// A full view configuration as understood by the front ends.
///
/// This is derived from CLI flags (plus `.env` and defaults).
#[derive(Debug, Clone)]
pub struct ViewConfig {
    /// File path or `http(s)://` URL of the CSV export.
    pub source: String,
    /// Range bounds requested on the command line; `None` keeps the loaded span.
    pub from: Option<String>,
    pub to: Option<String>,
    pub active: ActiveSeries,
}
