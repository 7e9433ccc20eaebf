use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::{get_palette, series_color};
use crate::state::AppState;
use crate::style::Alignment;

// ---------------------------------------------------------------------------
// Left side panel – sliders and panel overview
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Controls");
    ui.separator();

    if state.spec.is_none() {
        ui.label("No dashboard loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Sliders driving derived series ----
            let mut changed = false;
            for control in &mut state.engine.controls {
                ui.label(&control.title);
                let response = ui.add(
                    egui::Slider::new(&mut control.value, control.start..=control.end)
                        .step_by(control.step),
                );
                if response.changed() {
                    changed = true;
                }
            }
            if changed {
                state.on_control_changed();
            }
            if !state.engine.controls.is_empty() {
                ui.separator();
            }

            // ---- Per-panel series overview ----
            if let Some(spec) = &state.spec {
                for panel in &spec.panels {
                    let palette = get_palette(panel.group.len());
                    egui::CollapsingHeader::new(RichText::new(&panel.title).strong())
                        .id_salt(&panel.title)
                        .default_open(true)
                        .show(ui, |ui: &mut Ui| {
                            for (i, name) in panel.names.iter().enumerate() {
                                let color = panel
                                    .styles
                                    .get(i)
                                    .map(|s| series_color(s, &palette, i))
                                    .unwrap_or(Color32::LIGHT_BLUE);
                                let side = match panel.alignment.get(i) {
                                    Some((_, Alignment::Right)) => "  (right axis)",
                                    _ => "",
                                };
                                ui.colored_label(color, format!("{name}{side}"));
                            }
                        });
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(spec) = &state.spec {
            let n_series: usize = spec.panels.iter().map(|p| p.group.len()).sum();
            ui.label(format!(
                "{} – {} panels, {} series",
                spec.title,
                spec.panels.len(),
                n_series
            ));
            ui.separator();
        }

        ui.label("Value field:");
        let response = ui.add(
            egui::TextEdit::singleline(&mut state.value_field_edit).desired_width(90.0),
        );
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            state.apply_value_field();
        }

        ui.separator();

        ui.label("Columns:");
        let mut ncols = state.config.ncols;
        egui::ComboBox::from_id_salt("ncols")
            .selected_text(ncols.to_string())
            .show_ui(ui, |ui: &mut Ui| {
                for n in 1..=3 {
                    if ui.selectable_label(ncols == n, n.to_string()).clicked() {
                        ncols = n;
                    }
                }
            });
        state.set_ncols(ncols);

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open dashboard data")
        .add_filter("Supported files", &["json", "csv", "parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.loading = true;
        match crate::data::loader::load_file(&path) {
            Ok(input) => {
                log::info!("Loaded {} panels from {}", input.panel_count(), path.display());
                state.set_input(input);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
                state.loading = false;
            }
        }
    }
}
