use eframe::egui;

use crate::data::cache;
use crate::data::source::{self, DATA_URL_ENV};
use crate::state::{AppState, LoadState};
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct VehicleDashboardApp {
    pub load: LoadState,
}

impl VehicleDashboardApp {
    /// Load the dataset once for this session.
    pub fn new() -> Self {
        let hint = std::env::var(DATA_URL_ENV).ok();
        let load = match cache::shared().get_or_load(|| source::load_dataset(hint.as_deref())) {
            Ok(dataset) => {
                if dataset.is_empty() {
                    log::warn!("dataset from {} has no rows", dataset.origin);
                }
                log::info!(
                    "Loaded {} rows with columns {:?}",
                    dataset.len(),
                    dataset.column_names().collect::<Vec<_>>()
                );
                LoadState::Ready(Box::new(AppState::new(dataset)))
            }
            Err(e) => {
                log::error!("Failed to load dataset: {e}");
                LoadState::Failed(e.to_string())
            }
        };
        Self { load }
    }
}

impl eframe::App for VehicleDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let state = match &mut self.load {
            LoadState::Ready(state) => state,
            LoadState::Failed(message) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    panels::load_error(ui, message);
                });
                return;
            }
        };

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, state);
        });

        // ---- Left side panel: chart controls ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, state);
            });

        state.refresh();

        // ---- Bottom panel: data preview ----
        if state.view.terminal_notice().is_none() {
            egui::TopBottomPanel::bottom("preview_panel")
                .resizable(true)
                .default_height(180.0)
                .show(ctx, |ui| {
                    table::preview(ui, &state.dataset);
                });
        }

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::charts(ui, state);
        });
    }
}
