use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::Dataset;

/// Rows shown in the preview table.
const PREVIEW_ROWS: usize = 100;

// ---------------------------------------------------------------------------
// Data preview (bottom panel)
// ---------------------------------------------------------------------------

/// Render the first rows of the dataset as a table.
pub fn preview(ui: &mut Ui, dataset: &Dataset) {
    let n_rows = dataset.len().min(PREVIEW_ROWS);
    ui.label(RichText::new(format!("Preview: first {n_rows} of {} rows", dataset.len())).strong());

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .id_salt("data_preview")
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(40.0))
            .columns(Column::auto().at_least(70.0), dataset.columns.len())
            .header(20.0, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong("#");
                });
                for col in &dataset.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(&col.name);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, n_rows, |mut row| {
                    let idx = row.index();
                    row.col(|ui: &mut Ui| {
                        ui.label(idx.to_string());
                    });
                    for col in &dataset.columns {
                        row.col(|ui: &mut Ui| {
                            if let Some(value) = col.values.get(idx) {
                                ui.label(value.to_string());
                            }
                        });
                    }
                });
            });
    });
}
