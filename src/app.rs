use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct StocksDashboardApp {
    pub state: AppState,
}

impl eframe::App for StocksDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: sliders and overview ----
        egui::SidePanel::left("control_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: the dashboard grid ----
        egui::CentralPanel::default().show(ctx, |ui| {
            match &self.state.spec {
                Some(spec) => plot::dashboard_grid(ui, spec),
                None => {
                    ui.centered_and_justified(|ui: &mut egui::Ui| {
                        ui.heading("Open a data file to build a dashboard  (File → Open…)");
                    });
                }
            }
        });
    }
}
