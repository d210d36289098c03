//! Pure view derivation: selection state + dataset → charts and notices.
//!
//! Nothing here touches egui; the UI layer only draws what [`render`]
//! returns.

pub mod histogram;
pub mod scatter;

use std::ops::RangeInclusive;

use serde::Serialize;
use thiserror::Error;

use crate::data::model::Dataset;
use crate::data::partition::ColumnPartition;

pub use histogram::HistogramSpec;
pub use scatter::ScatterSpec;

pub const DEFAULT_BINS: usize = 30;
pub const BIN_RANGE: RangeInclusive<usize> = 5..=100;

// ---------------------------------------------------------------------------
// Selection state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramControls {
    /// Persistent toggle: the chart is shown while this is on.
    pub enabled: bool,
    pub column: Option<String>,
    pub bins: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScatterControls {
    pub enabled: bool,
    pub x: Option<String>,
    pub y: Option<String>,
    /// Categorical column used to group points, `None` for a single group.
    pub color: Option<String>,
}

/// Everything the user can change. Session-scoped, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    pub histogram: HistogramControls,
    pub scatter: ScatterControls,
}

impl SelectionState {
    /// Default selections for a freshly loaded table.
    pub fn defaults_for(partition: &ColumnPartition) -> Self {
        let first = partition.numeric.first().cloned();
        let second = partition.numeric.get(1).cloned().or_else(|| first.clone());
        SelectionState {
            histogram: HistogramControls {
                enabled: true,
                column: first.clone(),
                bins: DEFAULT_BINS,
            },
            scatter: ScatterControls {
                enabled: false,
                x: first,
                y: second,
                color: None,
            },
        }
    }

    /// Replace selections that no longer name a column of the right kind
    /// with the defaults, and clamp the bin count.
    pub fn sanitize(&mut self, partition: &ColumnPartition) {
        let defaults = Self::defaults_for(partition);
        let numeric_or = |current: &mut Option<String>, fallback: Option<String>| {
            if !current.as_deref().is_some_and(|c| partition.is_numeric(c)) {
                *current = fallback;
            }
        };

        numeric_or(&mut self.histogram.column, defaults.histogram.column);
        numeric_or(&mut self.scatter.x, defaults.scatter.x);
        numeric_or(&mut self.scatter.y, defaults.scatter.y);
        if !self
            .scatter
            .color
            .as_deref()
            .map_or(true, |c| partition.is_categorical(c))
        {
            self.scatter.color = None;
        }
        self.histogram.bins = self
            .histogram
            .bins
            .clamp(*BIN_RANGE.start(), *BIN_RANGE.end());
    }
}

// ---------------------------------------------------------------------------
// Render output
// ---------------------------------------------------------------------------

/// Conditions shown to the user instead of (or next to) charts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewNotice {
    #[error("the dataset has no numeric columns; nothing to plot")]
    EmptyNumericPartition,

    #[error("scatter plot needs at least two numeric columns (found {found})")]
    InsufficientColumnsForScatter { found: usize },
}

impl ViewNotice {
    /// Whether rendering stopped because of this notice.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ViewNotice::EmptyNumericPartition)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Histogram(HistogramSpec),
    Scatter(ScatterSpec),
}

impl ChartSpec {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ChartSpec::Histogram(_) => "histogram",
            ChartSpec::Scatter(_) => "scatter",
        }
    }
}

/// Result of one render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct View {
    pub partition: ColumnPartition,
    pub notices: Vec<ViewNotice>,
    pub histogram: Option<HistogramSpec>,
    pub scatter: Option<ScatterSpec>,
}

impl View {
    /// Active charts, histogram first.
    pub fn charts(&self) -> Vec<ChartSpec> {
        let mut charts = Vec::new();
        if let Some(h) = &self.histogram {
            charts.push(ChartSpec::Histogram(h.clone()));
        }
        if let Some(s) = &self.scatter {
            charts.push(ChartSpec::Scatter(s.clone()));
        }
        charts
    }

    /// The notice that stopped rendering, if any. Nothing else should be
    /// drawn while one is present.
    pub fn terminal_notice(&self) -> Option<&ViewNotice> {
        self.notices.iter().find(|n| n.is_terminal())
    }

    pub fn scatter_available(&self) -> bool {
        !self
            .notices
            .iter()
            .any(|n| matches!(n, ViewNotice::InsufficientColumnsForScatter { .. }))
    }
}

/// Derive the charts for the current selections. Deterministic: the same
/// state and dataset always give the same view.
pub fn render(state: &SelectionState, dataset: &Dataset) -> View {
    let partition = ColumnPartition::of(dataset);
    let mut view = View {
        partition,
        ..View::default()
    };

    if view.partition.numeric.is_empty() {
        view.notices.push(ViewNotice::EmptyNumericPartition);
        return view;
    }

    let mut state = state.clone();
    state.sanitize(&view.partition);

    if state.histogram.enabled {
        view.histogram = state
            .histogram
            .column
            .as_deref()
            .and_then(|name| dataset.column(name))
            .map(|col| histogram::histogram(col, state.histogram.bins));
    }

    let found = view.partition.numeric.len();
    if found < 2 {
        view.notices
            .push(ViewNotice::InsufficientColumnsForScatter { found });
    } else if state.scatter.enabled {
        if let (Some(x), Some(y)) = (&state.scatter.x, &state.scatter.y) {
            view.scatter = scatter::scatter(dataset, x, y, state.scatter.color.as_deref());
        }
    }

    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn listings() -> Dataset {
        Dataset::new(
            "test",
            vec![
                Column::from_text("speed", &["120", "90", "", "80", "150", "110"]),
                Column::from_text("make", &["ford", "bmw", "kia", "ford", "bmw", "kia"]),
                Column::from_text("price", &["9400", "12000", "5100", "", "30000", "8800"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn defaults_pick_first_two_numeric_columns() {
        let p = ColumnPartition::of(&listings());
        let s = SelectionState::defaults_for(&p);
        assert!(s.histogram.enabled);
        assert_eq!(s.histogram.column.as_deref(), Some("speed"));
        assert_eq!(s.histogram.bins, DEFAULT_BINS);
        assert!(!s.scatter.enabled);
        assert_eq!(s.scatter.x.as_deref(), Some("speed"));
        assert_eq!(s.scatter.y.as_deref(), Some("price"));
        assert_eq!(s.scatter.color, None);
    }

    #[test]
    fn single_numeric_column_defaults_y_to_x() {
        let ds = Dataset::new("t", vec![Column::from_text("price", &["1"])]).unwrap();
        let s = SelectionState::defaults_for(&ColumnPartition::of(&ds));
        assert_eq!(s.scatter.y.as_deref(), Some("price"));
    }

    #[test]
    fn histogram_counts_all_but_missing_rows() {
        let ds = listings();
        let state = SelectionState::defaults_for(&ColumnPartition::of(&ds));
        let view = render(&state, &ds);
        let h = view.histogram.unwrap();
        assert_eq!(h.bins.len(), 30);
        assert_eq!(h.counted, ds.len() - 1);
        assert!(view.scatter.is_none());
    }

    #[test]
    fn scatter_drops_rows_missing_either_axis() {
        let ds = listings();
        let mut state = SelectionState::defaults_for(&ColumnPartition::of(&ds));
        state.scatter.enabled = true;
        state.scatter.x = Some("price".into());
        state.scatter.y = Some("speed".into());

        let view = render(&state, &ds);
        let s = view.scatter.as_ref().unwrap();
        assert_eq!(s.point_count(), ds.len() - 2);
        assert_eq!(view.charts().len(), 2);
    }

    #[test]
    fn toggles_control_which_charts_render() {
        let ds = listings();
        let mut state = SelectionState::defaults_for(&ColumnPartition::of(&ds));
        state.histogram.enabled = false;
        assert!(render(&state, &ds).charts().is_empty());

        state.scatter.enabled = true;
        let charts = render(&state, &ds).charts();
        assert_eq!(charts.len(), 1);
        assert!(matches!(charts[0], ChartSpec::Scatter(_)));
    }

    #[test]
    fn no_numeric_columns_is_terminal() {
        let ds = Dataset::new("t", vec![Column::from_text("make", &["ford", "bmw"])]).unwrap();
        let mut state = SelectionState::defaults_for(&ColumnPartition::of(&ds));
        state.scatter.enabled = true;

        let view = render(&state, &ds);
        assert_eq!(view.notices, vec![ViewNotice::EmptyNumericPartition]);
        assert_eq!(view.terminal_notice(), Some(&ViewNotice::EmptyNumericPartition));
        assert!(view.charts().is_empty());
    }

    #[test]
    fn one_numeric_column_disables_scatter_with_notice() {
        let ds = Dataset::new(
            "t",
            vec![
                Column::from_text("price", &["1", "2"]),
                Column::from_text("make", &["ford", "bmw"]),
            ],
        )
        .unwrap();
        let mut state = SelectionState::defaults_for(&ColumnPartition::of(&ds));
        state.scatter.enabled = true;

        let view = render(&state, &ds);
        assert_eq!(
            view.notices,
            vec![ViewNotice::InsufficientColumnsForScatter { found: 1 }]
        );
        assert!(!view.scatter_available());
        assert_eq!(view.terminal_notice(), None);
        assert!(view.scatter.is_none());
        assert!(view.histogram.is_some());
    }

    #[test]
    fn sanitize_repairs_stale_selections() {
        let ds = listings();
        let p = ColumnPartition::of(&ds);
        let mut state = SelectionState::defaults_for(&p);
        state.histogram.column = Some("make".into());
        state.histogram.bins = 1000;
        state.scatter.x = Some("gone".into());
        state.scatter.color = Some("price".into());

        state.sanitize(&p);
        assert_eq!(state.histogram.column.as_deref(), Some("speed"));
        assert_eq!(state.histogram.bins, 100);
        assert_eq!(state.scatter.x.as_deref(), Some("speed"));
        assert_eq!(state.scatter.color, None);
    }

    #[test]
    fn render_is_deterministic() {
        let ds = listings();
        let mut state = SelectionState::defaults_for(&ColumnPartition::of(&ds));
        state.scatter.enabled = true;
        state.scatter.color = Some("make".into());
        assert_eq!(render(&state, &ds), render(&state, &ds));
    }
}
