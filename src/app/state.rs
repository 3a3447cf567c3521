//! View state container and its reducer.
//!
//! The front ends never mutate rows, the range, or the series selection in
//! place. They dispatch an [`Action`] and replace their snapshot with the one
//! returned by [`reduce`]. Rows are shared between snapshots.

use std::rc::Rc;

use tracing::debug;

use crate::app::pipeline;
use crate::domain::{ActiveSeries, ChartData, DateRange, RateRow, SeriesName};

/// Immutable snapshot of everything the chart depends on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub rows: Rc<Vec<RateRow>>,
    pub range: DateRange,
    pub active: ActiveSeries,
    /// Set when the export could not be loaded; the view stays empty.
    pub load_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Rows parsed from a fresh load; the range resets to their full span.
    Loaded(Vec<RateRow>),
    LoadFailed(String),
    SetFrom(String),
    SetTo(String),
    /// Back to the full span of the loaded rows.
    ResetRange,
    ToggleSeries(SeriesName),
}

impl ViewState {
    pub fn new(active: ActiveSeries) -> Self {
        Self {
            active,
            ..Self::default()
        }
    }

    /// Rows inside the current range.
    pub fn visible_rows(&self) -> &[RateRow] {
        pipeline::filter_range(&self.rows, &self.range)
    }

    /// Chart data for the current range and selection.
    pub fn chart(&self) -> ChartData {
        pipeline::assemble(self.visible_rows(), &self.active.names())
    }
}

/// Apply `action` to `state`, returning the next snapshot.
pub fn reduce(state: &ViewState, action: Action) -> ViewState {
    debug!(?action, "reduce");
    match action {
        Action::Loaded(rows) => ViewState {
            range: DateRange::full_span(&rows),
            rows: Rc::new(rows),
            active: state.active,
            load_error: None,
        },
        Action::LoadFailed(message) => ViewState {
            rows: Rc::new(Vec::new()),
            range: DateRange::default(),
            active: state.active,
            load_error: Some(message),
        },
        Action::SetFrom(from) => ViewState {
            range: DateRange::new(from, state.range.to.clone()),
            ..state.clone()
        },
        Action::SetTo(to) => ViewState {
            range: DateRange::new(state.range.from.clone(), to),
            ..state.clone()
        },
        Action::ResetRange => ViewState {
            range: DateRange::full_span(&state.rows),
            ..state.clone()
        },
        Action::ToggleSeries(name) => ViewState {
            active: state.active.toggled(name),
            ..state.clone()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> ViewState {
        let rows = pipeline::load_rows(
            "fecha_sbs,Promedio,BBVA\n\
             03/01/2024,7.3,8.0\n\
             01/01/2024,7.1,\n\
             02/01/2024,,7.9\n",
        );
        reduce(&ViewState::default(), Action::Loaded(rows))
    }

    #[test]
    fn loaded_sets_full_span() {
        let state = loaded();
        assert_eq!(state.range, DateRange::new("2024-01-01", "2024-01-03"));
        assert_eq!(state.visible_rows().len(), 3);
        assert!(state.load_error.is_none());
    }

    #[test]
    fn loading_nothing_leaves_range_unset() {
        let state = reduce(&ViewState::default(), Action::Loaded(Vec::new()));
        assert_eq!(state.range, DateRange::default());
        assert!(state.chart().is_empty());
    }

    #[test]
    fn load_failure_shows_empty_dataset() {
        let state = reduce(&loaded(), Action::LoadFailed("boom".to_string()));
        assert_eq!(state.load_error.as_deref(), Some("boom"));
        assert!(state.visible_rows().is_empty());
        assert_eq!(state.chart().series.len(), 1);
    }

    #[test]
    fn range_actions_narrow_and_reset() {
        let state = reduce(&loaded(), Action::SetFrom("2024-01-02".to_string()));
        let state = reduce(&state, Action::SetTo("2024-01-02".to_string()));
        assert_eq!(state.chart().labels, vec!["2024-01-02"]);

        let cleared = reduce(&state, Action::SetTo(String::new()));
        assert_eq!(cleared.visible_rows().len(), 3);

        let reset = reduce(&state, Action::ResetRange);
        assert_eq!(reset.range, DateRange::new("2024-01-01", "2024-01-03"));
    }

    #[test]
    fn toggling_last_series_restores_default() {
        let state = loaded();
        let state = reduce(&state, Action::ToggleSeries(SeriesName::Promedio));
        assert_eq!(state.active.names(), vec![SeriesName::Promedio]);

        let state = reduce(&state, Action::ToggleSeries(SeriesName::Bbva));
        let state = reduce(&state, Action::ToggleSeries(SeriesName::Promedio));
        let chart = state.chart();
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].name, SeriesName::Bbva);
        assert_eq!(chart.series[0].filled, vec![None, Some(7.9), Some(8.0)]);
    }

    #[test]
    fn reducer_does_not_touch_previous_snapshot() {
        let before = loaded();
        let after = reduce(&before, Action::SetFrom("2024-01-03".to_string()));
        assert_eq!(before.range.from, "2024-01-01");
        assert_eq!(after.range.from, "2024-01-03");
        assert!(Rc::ptr_eq(&before.rows, &after.rows));
        assert_eq!(before.chart(), loaded().chart());
    }
}
