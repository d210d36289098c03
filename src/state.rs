use std::sync::Arc;

use crate::color::ColorMap;
use crate::data::model::Dataset;
use crate::data::partition::ColumnPartition;
use crate::view::{self, SelectionState, View};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// How the one-time dataset load ended. A failure is terminal for the
/// session.
pub enum LoadState {
    Ready(Box<AppState>),
    Failed(String),
}

/// The full UI state for a loaded dataset, independent of rendering.
pub struct AppState {
    pub dataset: Arc<Dataset>,

    pub partition: ColumnPartition,

    /// Current widget values.
    pub selection: SelectionState,

    /// View derived from `rendered_for`; recomputed only when the
    /// selection changes.
    pub view: View,
    rendered_for: SelectionState,

    /// Colours of the current scatter groups.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Ingest the loaded dataset, derive the partition and default controls.
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let partition = ColumnPartition::of(&dataset);
        let selection = SelectionState::defaults_for(&partition);
        let view = view::render(&selection, &dataset);

        let mut state = AppState {
            dataset,
            partition,
            rendered_for: selection.clone(),
            selection,
            view,
            color_map: None,
            status_message: None,
        };
        state.rebuild_color_map();
        state
    }

    /// Re-render if any control changed since the last pass.
    pub fn refresh(&mut self) {
        self.selection.sanitize(&self.partition);
        if self.selection == self.rendered_for {
            return;
        }
        self.view = view::render(&self.selection, &self.dataset);
        self.rendered_for = self.selection.clone();
        self.rebuild_color_map();
    }

    /// Rebuild the colour map from the current scatter groups.
    fn rebuild_color_map(&mut self) {
        self.color_map = self
            .view
            .scatter
            .as_ref()
            .map(|s| ColorMap::new(s.groups.iter().map(|g| g.label.as_str())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn state() -> AppState {
        let ds = Dataset::new(
            "test",
            vec![
                Column::from_text("price", &["100", "200", "300"]),
                Column::from_text("odometer", &["5", "", "7"]),
                Column::from_text("fuel", &["gas", "diesel", "gas"]),
            ],
        )
        .unwrap();
        AppState::new(Arc::new(ds))
    }

    #[test]
    fn starts_with_histogram_of_first_numeric_column() {
        let s = state();
        assert_eq!(s.view.histogram.as_ref().unwrap().column, "price");
        assert!(s.view.scatter.is_none());
        assert!(s.color_map.is_none());
    }

    #[test]
    fn refresh_follows_control_changes() {
        let mut s = state();
        s.selection.scatter.enabled = true;
        s.selection.scatter.color = Some("fuel".into());
        s.refresh();

        let scatter = s.view.scatter.as_ref().unwrap();
        assert_eq!(scatter.point_count(), 2);
        assert!(s.color_map.is_some());

        s.selection.histogram.enabled = false;
        s.refresh();
        assert!(s.view.histogram.is_none());
    }

    #[test]
    fn categorical_only_table_stops_rendering() {
        let ds = Dataset::new(
            "test",
            vec![Column::from_text("fuel", &["gas", "diesel", "gas"])],
        )
        .unwrap();
        let s = AppState::new(Arc::new(ds));
        assert_eq!(
            s.view.terminal_notice(),
            Some(&crate::view::ViewNotice::EmptyNumericPartition)
        );
        assert!(s.view.charts().is_empty());
    }

    #[test]
    fn refresh_clamps_bins() {
        let mut s = state();
        s.selection.histogram.bins = 2;
        s.refresh();
        assert_eq!(s.selection.histogram.bins, 5);
        assert_eq!(s.view.histogram.as_ref().unwrap().bins.len(), 5);
    }
}
