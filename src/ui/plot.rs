use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoint, PlotPoints, Points};

use crate::data::model::Dataset;
use crate::state::AppState;
use crate::view::{HistogramSpec, ScatterSpec};

// ---------------------------------------------------------------------------
// Chart area (central panel)
// ---------------------------------------------------------------------------

/// Render every active chart, stacked vertically.
pub fn charts(ui: &mut Ui, state: &AppState) {
    let view = &state.view;

    if let Some(notice) = view.terminal_notice() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(notice.to_string());
        });
        return;
    }

    let active = usize::from(view.histogram.is_some()) + usize::from(view.scatter.is_some());
    if active == 0 {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Tick a chart in the side panel to display it");
        });
        return;
    }

    let height = (ui.available_height() / active as f32 - 8.0).max(120.0);

    if let Some(h) = &view.histogram {
        histogram_plot(ui, h, height);
    }
    if let Some(s) = &view.scatter {
        scatter_plot(ui, s, state, height);
    }
}

fn histogram_plot(ui: &mut Ui, spec: &HistogramSpec, height: f32) {
    ui.strong(format!(
        "{}  ({} values, {} missing)",
        spec.title, spec.counted, spec.dropped
    ));

    let bars: Vec<Bar> = spec
        .bins
        .iter()
        .map(|b| {
            Bar::new((b.start + b.end) / 2.0, b.count as f64)
                .width(b.end - b.start)
                .name(format!("{:.2} – {:.2}", b.start, b.end))
        })
        .collect();

    Plot::new("histogram_plot")
        .height(height)
        .x_axis_label(spec.column.as_str())
        .y_axis_label("count")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .name(spec.column.as_str())
                    .color(Color32::LIGHT_BLUE),
            );
        });
}

fn scatter_plot(ui: &mut Ui, spec: &ScatterSpec, state: &AppState, height: f32) {
    ui.strong(format!(
        "{}  ({} points, {} rows skipped)",
        spec.title,
        spec.point_count(),
        spec.dropped
    ));

    let dataset: &Dataset = &state.dataset;
    let color_map = &state.color_map;

    Plot::new("scatter_plot")
        .height(height)
        .legend(Legend::default())
        .x_axis_label(spec.x.as_str())
        .y_axis_label(spec.y.as_str())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .label_formatter(|_name, value| match nearest_row(spec, value) {
            Some(row) => spec.hover_text(dataset, row),
            None => format!("{} = {:.2}\n{} = {:.2}", spec.x, value.x, spec.y, value.y),
        })
        .show(ui, |plot_ui| {
            for group in &spec.groups {
                let color = color_map
                    .as_ref()
                    .map_or(Color32::LIGHT_BLUE, |cm| cm.color_for(&group.label));

                let points: PlotPoints = group.points.iter().map(|p| [p.x, p.y]).collect();

                let mut series = Points::new(points).color(color).radius(2.5);
                if spec.color.is_some() {
                    series = series.name(&group.label);
                }
                plot_ui.points(series);
            }
        });
}

/// Row of the point closest to the hover position, relative to the data
/// extent on each axis. `None` if nothing is within 2% of the extent.
fn nearest_row(spec: &ScatterSpec, at: &PlotPoint) -> Option<usize> {
    let (mut x_lo, mut x_hi, mut y_lo, mut y_hi) =
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
    for (_, p) in spec.points() {
        x_lo = x_lo.min(p.x);
        x_hi = x_hi.max(p.x);
        y_lo = y_lo.min(p.y);
        y_hi = y_hi.max(p.y);
    }
    let x_span = (x_hi - x_lo).max(f64::EPSILON);
    let y_span = (y_hi - y_lo).max(f64::EPSILON);

    spec.points()
        .map(|(_, p)| {
            let dx = (p.x - at.x) / x_span;
            let dy = (p.y - at.y) / y_span;
            (p.row, dx * dx + dy * dy)
        })
        .filter(|(_, d)| *d <= 0.02 * 0.02)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(row, _)| row)
}
