use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::PROVIDER_COLUMN;
use crate::state::{AppState, ViewStatus, NO_MATCHES_MESSAGE, NO_SOURCES_MESSAGE};
use crate::ui::panels::save_export_dialog;

// ---------------------------------------------------------------------------
// Result view (central panel)
// ---------------------------------------------------------------------------

/// Render the filtered table, or the message explaining why there is none.
pub fn results(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Site Data Viewer");
    ui.separator();

    match state.view_status() {
        ViewStatus::NoSources => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.label(NO_SOURCES_MESSAGE);
            });
        }
        ViewStatus::NoMatches => {
            ui.label(NO_MATCHES_MESSAGE);
        }
        ViewStatus::Rows(n) => {
            ui.horizontal(|ui: &mut Ui| {
                ui.strong(state.caption());
                if state.form.criteria().is_unconstrained() {
                    ui.label(format!("({n} rows, no filters)"));
                } else {
                    ui.label(format!("({n} rows)"));
                }
                if ui.button("Download data as Excel").clicked() {
                    save_export_dialog(state);
                }
            });
            ui.separator();
            site_table(ui, state);
        }
    }
}

fn site_table(ui: &mut Ui, state: &AppState) {
    let view = &state.view;
    let provider_col = view.column_index(PROVIDER_COLUMN);

    ScrollArea::horizontal()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .columns(
                    Column::auto().at_least(60.0).clip(true),
                    view.column_names.len(),
                )
                .header(24.0, |mut header| {
                    for name in &view.column_names {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(20.0, view.len(), |mut row| {
                        let cells = &view.rows[row.index()];
                        for (i, cell) in cells.iter().enumerate() {
                            row.col(|ui: &mut Ui| {
                                let text = cell.to_string();
                                match (&state.palette, Some(i) == provider_col) {
                                    (Some(palette), true) => {
                                        let color = palette.color_for(&text);
                                        ui.label(RichText::new(text).color(color).strong());
                                    }
                                    _ => {
                                        ui.label(text);
                                    }
                                }
                            });
                        }
                    });
                });
        });
}
