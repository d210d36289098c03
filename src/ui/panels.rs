use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::export;
use crate::state::AppState;
use crate::view::{BIN_RANGE, ChartSpec};

// ---------------------------------------------------------------------------
// Left side panel – chart controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Columns");
    ui.separator();

    if state.partition.numeric.is_empty() {
        ui.label(
            RichText::new("The dataset has no numeric columns; nothing to plot.")
                .color(Color32::YELLOW),
        );
        return;
    }

    // Clone what we need so we can mutate state inside the closures.
    let numeric = state.partition.numeric.clone();
    let categorical = state.partition.categorical.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.label(format!(
                "{} numeric, {} categorical",
                numeric.len(),
                categorical.len()
            ));
            egui::CollapsingHeader::new("Categorical columns")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    for col in &categorical {
                        let Some(column) = state.dataset.column(col) else {
                            continue;
                        };
                        ui.label(format!(
                            "{col}  ({} values, {} missing)",
                            column.unique_values().len(),
                            column.null_count()
                        ));
                    }
                });
            ui.separator();

            // ---- Histogram ----
            let hist = &mut state.selection.histogram;
            ui.checkbox(&mut hist.enabled, RichText::new("Histogram").strong());
            ui.add_enabled_ui(hist.enabled, |ui: &mut Ui| {
                column_combo(ui, "hist_column", "Column", &mut hist.column, &numeric);
                ui.add(egui::Slider::new(&mut hist.bins, BIN_RANGE).text("Bins"));
            });
            ui.separator();

            // ---- Scatter ----
            if !state.view.scatter_available() {
                ui.label(
                    RichText::new("Scatter plot needs at least two numeric columns.")
                        .color(Color32::YELLOW),
                );
                return;
            }

            let scatter = &mut state.selection.scatter;
            ui.checkbox(&mut scatter.enabled, RichText::new("Scatter plot").strong());
            ui.add_enabled_ui(scatter.enabled, |ui: &mut Ui| {
                column_combo(ui, "scatter_x", "X", &mut scatter.x, &numeric);
                column_combo(ui, "scatter_y", "Y", &mut scatter.y, &numeric);

                let current = scatter.color.clone().unwrap_or_else(|| "none".into());
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("Color by");
                    egui::ComboBox::from_id_salt("scatter_color")
                        .selected_text(current)
                        .show_ui(ui, |ui: &mut Ui| {
                            ui.selectable_value(&mut scatter.color, None, "none");
                            for col in &categorical {
                                ui.selectable_value(
                                    &mut scatter.color,
                                    Some(col.clone()),
                                    col.as_str(),
                                );
                            }
                        });
                });
            });

            if let Some(s) = &state.view.scatter {
                if let Some(cm) = &state.color_map {
                    if s.color.is_some() {
                        ui.add_space(4.0);
                        for group in &s.groups {
                            ui.label(
                                RichText::new(format!("● {}", group.label))
                                    .color(cm.color_for(&group.label)),
                            );
                        }
                    }
                }
            }
        });
}

fn column_combo(ui: &mut Ui, id: &str, label: &str, current: &mut Option<String>, choices: &[String]) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .selected_text(current.clone().unwrap_or_default())
            .show_ui(ui, |ui: &mut Ui| {
                for col in choices {
                    ui.selectable_value(current, Some(col.clone()), col.as_str());
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            let charts = state.view.charts();
            if charts.is_empty() {
                ui.label("No active chart to export");
            }
            for chart in &charts {
                let stem = chart.kind_name();
                if ui.button(format!("Export {stem}…")).clicked() {
                    save_chart_dialog(state, chart, stem);
                    ui.close_menu();
                }
            }
            ui.separator();
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.separator();

        let ds = &state.dataset;
        ui.label(format!(
            "{} rows × {} columns from {}",
            ds.len(),
            ds.columns.len(),
            ds.origin
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

/// Full-window message for a failed dataset load. Shown verbatim.
pub fn load_error(ui: &mut Ui, message: &str) {
    ui.heading(RichText::new("Could not load the dataset").color(Color32::RED));
    ui.separator();
    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        ui.label(RichText::new(message).monospace());
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn save_chart_dialog(state: &mut AppState, chart: &ChartSpec, stem: &str) {
    let file = rfd::FileDialog::new()
        .set_title("Export chart data")
        .set_file_name(format!("{stem}.csv"))
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        match export::export_to_file(chart, &path) {
            Ok(()) => {
                log::info!("Exported {stem} to {}", path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export chart: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
